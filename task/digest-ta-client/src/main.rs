// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Digest TA Client
//!
//! Drives the digest TA through its raw entry points the way a normal-world
//! client would: open a session, invoke each command with a message and an
//! output buffer, and check the result code and digest. Exits non-zero if
//! any check fails.

use std::fmt;
use std::process::ExitCode;

use drv_digest_ta::{entry, DefaultProvider, DigestProvider, DigestTa, Param, Parameters};
use drv_digest_ta_api::{
    check_code, Command, HexDigest, ParamType, ParamTypes, TaError, UnknownCode,
    MAX_DIGEST_LEN, TEE_SUCCESS,
};
use log::{error, info, Level};

fn trace_to_stderr(args: fmt::Arguments<'_>) {
    eprint!("{args}");
}

struct Vector {
    command: Command,
    message: &'static [u8],
    digest: &'static str,
}

const VECTORS: &[Vector] = &[
    Vector {
        command: Command::Sha1,
        message: b"abc",
        digest: "a9993e364706816aba3e25717850c26c9cd0d89d",
    },
    Vector {
        command: Command::Sha1,
        message: b"",
        digest: "da39a3ee5e6b4b0d3255bfef95601890afd80709",
    },
    Vector {
        command: Command::Sha256,
        message: b"abc",
        digest: "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad",
    },
    Vector {
        command: Command::Sha256,
        message: b"",
        digest: "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855",
    },
    // The diagnostic command reports the digest of its last step, a plain
    // SHA-1 of the message.
    Vector {
        command: Command::CornerCases,
        message: b"abc",
        digest: "a9993e364706816aba3e25717850c26c9cd0d89d",
    },
];

fn main() -> ExitCode {
    if ta_trace_log::init(trace_to_stderr, Level::Info).is_err() {
        return ExitCode::FAILURE;
    }

    let mut ta = DigestTa::new(DefaultProvider::new());
    let mut failures = 0;

    if entry::create(&mut ta) != TEE_SUCCESS
        || entry::open_session(&mut ta, &Parameters::none()) != TEE_SUCCESS
    {
        error!("could not open a session");
        return ExitCode::FAILURE;
    }

    for vector in VECTORS {
        if let Err(e) = demo_vector(&mut ta, vector) {
            error!("{:?}: {}", vector.command, e);
            failures += 1;
        }
    }

    if let Err(e) = demo_bad_parameters(&mut ta) {
        error!("bad parameters: {}", e);
        failures += 1;
    }

    entry::close_session(&mut ta);
    entry::destroy(&mut ta);

    if failures == 0 {
        info!("all checks passed");
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}

#[derive(Debug)]
enum CheckError {
    Ta(TaError),
    Unknown(UnknownCode),
    Mismatch { expected: &'static str, actual: String },
    Unexpected(u32),
}

impl fmt::Display for CheckError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ta(e) => write!(f, "TA returned {e}"),
            Self::Unknown(code) => write!(f, "TA returned {code}"),
            Self::Mismatch { expected, actual } => {
                write!(f, "expected {expected}, got {actual}")
            }
            Self::Unexpected(code) => write!(f, "unexpected result 0x{code:08x}"),
        }
    }
}

/// Runs one command and compares the reported digest with the vector.
fn demo_vector<P: DigestProvider>(
    ta: &mut DigestTa<P>,
    vector: &Vector,
) -> Result<(), CheckError> {
    let mut digest = [0u8; MAX_DIGEST_LEN];
    let mut params = Parameters::digest(vector.message, &mut digest);

    let code = entry::invoke_command(ta, vector.command.id(), &mut params);
    check_code(code).map_err(|e| match e {
        Ok(e) => CheckError::Ta(e),
        Err(unknown) => CheckError::Unknown(unknown),
    })?;

    let actual = params
        .output()
        .map(|out| HexDigest(out.written()).to_string())
        .unwrap_or_default();
    if actual != vector.digest {
        return Err(CheckError::Mismatch {
            expected: vector.digest,
            actual,
        });
    }
    info!("{:?} ok: {}", vector.command, actual);
    Ok(())
}

/// A value parameter where the output buffer belongs must be refused.
fn demo_bad_parameters<P: DigestProvider>(
    ta: &mut DigestTa<P>,
) -> Result<(), CheckError> {
    let mut params = Parameters::new(
        ParamTypes::new([
            ParamType::MemrefInput,
            ParamType::ValueOutput,
            ParamType::None,
            ParamType::None,
        ]),
        [
            Param::MemrefInput(Some(&b"abc"[..])),
            Param::Value { a: 0, b: 0 },
            Param::None,
            Param::None,
        ],
    );

    match entry::invoke_command(ta, Command::Sha256.id(), &mut params) {
        code if code == TaError::InvalidParameters.code() => Ok(()),
        code => Err(CheckError::Unexpected(code)),
    }
}
