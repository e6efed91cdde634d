// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! API crate for the digest trusted application.
//!
//! Everything a normal-world caller and the TA must agree on lives here:
//! command identifiers, the four-slot parameter signature, result codes and
//! digest sizes. Values use the GlobalPlatform TEE Internal Core API
//! encodings so they can cross the runtime boundary unchanged.

#![no_std]

use core::fmt;

use num_derive::FromPrimitive;
use num_traits::FromPrimitive;

/// Digest sizes in bytes
pub const SHA1_DIGEST_LEN: usize = 20;
pub const SHA256_DIGEST_LEN: usize = 32;

/// Largest digest any command produces
pub const MAX_DIGEST_LEN: usize = SHA256_DIGEST_LEN;

/// Result code reported for a successful call
pub const TEE_SUCCESS: u32 = 0;

/// Number of parameter slots in every call
pub const PARAM_SLOTS: usize = 4;

/// Commands accepted by the invoke entry point.
#[derive(Copy, Clone, Debug, PartialEq, Eq, FromPrimitive)]
#[repr(u32)]
pub enum Command {
    Sha1 = 0,
    Sha256 = 1,
    /// Diagnostic sweep over empty/non-empty update and finalize inputs.
    CornerCases = 2,
}

impl Command {
    pub fn from_id(id: u32) -> Option<Self> {
        Self::from_u32(id)
    }

    pub fn id(self) -> u32 {
        self as u32
    }

    /// Digest algorithm the command runs.
    pub fn algorithm(self) -> Algorithm {
        match self {
            Self::Sha1 | Self::CornerCases => Algorithm::Sha1,
            Self::Sha256 => Algorithm::Sha256,
        }
    }
}

/// Digest algorithm identifiers (GlobalPlatform `TEE_ALG_*` values)
#[derive(Copy, Clone, Debug, PartialEq, Eq, FromPrimitive)]
#[repr(u32)]
pub enum Algorithm {
    Sha1 = 0x5000_0002,
    Sha256 = 0x5000_0004,
}

impl Algorithm {
    /// Returns the digest size in bytes
    pub fn digest_len(self) -> usize {
        match self {
            Self::Sha1 => SHA1_DIGEST_LEN,
            Self::Sha256 => SHA256_DIGEST_LEN,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Sha1 => "SHA-1",
            Self::Sha256 => "SHA-256",
        }
    }
}

/// Errors returned to the caller as the invocation's result code.
#[derive(Copy, Clone, Debug, FromPrimitive, Eq, PartialEq)]
#[repr(u32)]
pub enum TaError {
    /// Finalizing the digest failed.
    DigestFailed = 0xFFFF_0000,

    /// Parameter signature mismatch, null buffer or unknown command.
    InvalidParameters = 0xFFFF_0006,

    /// The digest operation could not be allocated.
    AllocationFailed = 0xFFFF_000C,

    /// The output buffer cannot hold the digest.
    ShortBuffer = 0xFFFF_0010,
}

impl TaError {
    pub fn code(self) -> u32 {
        self as u32
    }

    /// Decodes a failure code. `TEE_SUCCESS` and codes outside the
    /// taxonomy decode to `None`; see [`check_code`] to keep the raw value.
    pub fn from_code(code: u32) -> Option<Self> {
        Self::from_u32(code)
    }
}

impl fmt::Display for TaError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let what = match self {
            Self::DigestFailed => "digest failed",
            Self::InvalidParameters => "invalid parameters",
            Self::AllocationFailed => "allocation failed",
            Self::ShortBuffer => "short buffer",
        };
        write!(f, "{what} (0x{:08x})", self.code())
    }
}

/// Converts an invocation result into the raw code handed back to the
/// runtime.
pub fn result_code(result: Result<(), TaError>) -> u32 {
    match result {
        Ok(()) => TEE_SUCCESS,
        Err(e) => e.code(),
    }
}

/// A result code that is neither success nor one of [`TaError`].
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct UnknownCode(pub u32);

impl fmt::Display for UnknownCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown result code 0x{:08x}", self.0)
    }
}

/// Splits a raw result code into success, a known error, or the raw
/// unknown code.
pub fn check_code(code: u32) -> Result<(), Result<TaError, UnknownCode>> {
    if code == TEE_SUCCESS {
        return Ok(());
    }
    Err(TaError::from_code(code).ok_or(UnknownCode(code)))
}

/// Type tag of one parameter slot.
#[derive(Copy, Clone, Debug, PartialEq, Eq, FromPrimitive)]
#[repr(u8)]
pub enum ParamType {
    None = 0,
    ValueInput = 1,
    ValueOutput = 2,
    ValueInout = 3,
    MemrefInput = 5,
    MemrefOutput = 6,
    MemrefInout = 7,
}

/// Four parameter type tags packed into a `u32`, slot `i` in bits
/// `4i..4i + 4`.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[repr(transparent)]
pub struct ParamTypes(u32);

impl ParamTypes {
    /// The signature every lifecycle hook expects.
    pub const EMPTY: Self = Self::new([ParamType::None; PARAM_SLOTS]);

    /// The signature every digest command expects.
    pub const DIGEST: Self = Self::new([
        ParamType::MemrefInput,
        ParamType::MemrefOutput,
        ParamType::None,
        ParamType::None,
    ]);

    pub const fn new(types: [ParamType; PARAM_SLOTS]) -> Self {
        Self(
            (types[0] as u32)
                | (types[1] as u32) << 4
                | (types[2] as u32) << 8
                | (types[3] as u32) << 12,
        )
    }

    pub const fn from_raw(raw: u32) -> Self {
        Self(raw)
    }

    pub const fn raw(self) -> u32 {
        self.0
    }

    /// Returns the tag of `slot`, or `None` if the slot is out of range or
    /// holds an undefined nibble.
    pub fn get(self, slot: usize) -> Option<ParamType> {
        if slot >= PARAM_SLOTS {
            return None;
        }
        ParamType::from_u32((self.0 >> (4 * slot)) & 0xF)
    }
}

/// Lowercase hex rendering of a digest, for logs.
pub struct HexDigest<'a>(pub &'a [u8]);

impl fmt::Display for HexDigest<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for byte in self.0 {
            write!(f, "{byte:02x}")?;
        }
        Ok(())
    }
}
