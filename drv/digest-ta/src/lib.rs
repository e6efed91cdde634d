// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! # Digest Trusted Application
//!
//! Exposes one-shot SHA-1 and SHA-256 digests to normal-world callers. The
//! TA does no hashing itself: it checks the parameter signature, zeroes the
//! caller's output buffer, and hands the message to a [`DigestProvider`].
//!
//! ## Commands
//!
//! | Command       | Slot 0        | Slot 1         | Output   |
//! |---------------|---------------|----------------|----------|
//! | `Sha1`        | memref input  | memref output  | 20 bytes |
//! | `Sha256`      | memref input  | memref output  | 32 bytes |
//! | `CornerCases` | memref input  | memref output  | 20 bytes |
//!
//! Slots 2 and 3 must be empty. Anything else fails with
//! `InvalidParameters` before the output buffer is touched.
//!
//! ## Providers
//! - `RustCryptoProvider`: software implementation (`rustcrypto` feature)
//! - `MockProvider`: failure injection for tests (`mock` feature)

#![no_std]

use drv_digest_ta_api::{Algorithm, Command, ParamTypes, TaError};
use log::{debug, warn};

mod corner_cases;
pub mod entry;
#[cfg(any(test, feature = "mock"))]
pub mod mock;
mod params;
mod provider;
#[cfg(feature = "rustcrypto")]
mod rustcrypto;

pub use params::{OutputBuffer, Param, Parameters};
pub use provider::{DigestOperation, DigestProvider};
#[cfg(feature = "rustcrypto")]
pub use rustcrypto::{RustCryptoOperation, RustCryptoProvider};

#[cfg(feature = "rustcrypto")]
pub type DefaultProvider = RustCryptoProvider;

/// The TA instance. One invocation runs at a time; `&mut self` enforces it.
/// Nothing but the provider is kept between invocations.
pub struct DigestTa<P: DigestProvider> {
    provider: P,
}

impl<P: DigestProvider> DigestTa<P> {
    pub fn new(provider: P) -> Self {
        Self { provider }
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }

    pub fn create(&mut self) -> Result<(), TaError> {
        debug!("create has been called");
        Ok(())
    }

    pub fn destroy(&mut self) {
        debug!("destroy has been called");
    }

    /// Sessions carry no context; only the empty signature is accepted.
    pub fn open_session(&mut self, params: &Parameters<'_>) -> Result<(), TaError> {
        if params.types() != ParamTypes::EMPTY {
            warn!(
                "open session with parameter types 0x{:04x}",
                params.types().raw()
            );
            return Err(TaError::InvalidParameters);
        }
        debug!("session opened");
        Ok(())
    }

    pub fn close_session(&mut self) {
        debug!("session closed");
    }

    pub fn invoke_command(
        &mut self,
        command: Command,
        params: &mut Parameters<'_>,
    ) -> Result<(), TaError> {
        let (message, out) = params.digest_buffers()?;
        out.zero();
        debug!("{:?}: {} byte message", command, message.len());

        match command {
            Command::Sha1 | Command::Sha256 => {
                let algorithm = command.algorithm();
                let mut op = allocate(&self.provider, algorithm)?;
                let len = op.do_final(message, out.as_mut_slice()).inspect_err(|e| {
                    warn!("{} do_final failed: {}", algorithm.name(), e);
                })?;
                out.set_size(len);
                dump_digest(algorithm, out.written());
                Ok(())
            }
            Command::CornerCases => {
                let mut op = allocate(&self.provider, Algorithm::Sha1)?;
                let (report, result) = corner_cases::run(&mut op, message, out);
                for step in &report {
                    debug!(
                        "update {:?}, final {:?}: {:?} {}",
                        step.update,
                        step.finalize,
                        step.result,
                        drv_digest_ta_api::HexDigest(&step.digest)
                    );
                }
                result
            }
        }
    }
}

fn allocate<P: DigestProvider>(
    provider: &P,
    algorithm: Algorithm,
) -> Result<P::Operation<'_>, TaError> {
    provider.allocate(algorithm).inspect_err(|e| {
        warn!("allocating {} operation failed: {}", algorithm.name(), e);
    })
}

#[cfg(feature = "dump-digests")]
fn dump_digest(algorithm: Algorithm, digest: &[u8]) {
    log::info!(
        "{}: {}",
        algorithm.name(),
        drv_digest_ta_api::HexDigest(digest)
    );
}

#[cfg(not(feature = "dump-digests"))]
fn dump_digest(_algorithm: Algorithm, _digest: &[u8]) {}


#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::{MockCall, MockProvider};
    use crate::test_vectors::*;
    use drv_digest_ta_api::ParamType;

    fn invoke<P: DigestProvider>(
        ta: &mut DigestTa<P>,
        command: Command,
        message: &[u8],
        out: &mut [u8],
    ) -> (Result<(), TaError>, usize) {
        let mut params = Parameters::digest(message, out);
        let result = ta.invoke_command(command, &mut params);
        let size = params.output().map(|o| o.size()).unwrap_or(0);
        (result, size)
    }

    #[test]
    fn test_sha1_abc() {
        let mut ta = DigestTa::new(RustCryptoProvider::new());
        let mut out = [0u8; 20];
        assert_eq!(invoke(&mut ta, Command::Sha1, b"abc", &mut out), (Ok(()), 20));
        assert_eq!(out, SHA1_ABC);
    }

    #[test]
    fn test_sha1_empty_is_deterministic() {
        let mut ta = DigestTa::new(RustCryptoProvider::new());
        let mut first = [0u8; 20];
        let mut second = [0u8; 20];
        invoke(&mut ta, Command::Sha1, b"", &mut first).0.unwrap();
        invoke(&mut ta, Command::Sha1, b"", &mut second).0.unwrap();
        assert_eq!(first, SHA1_EMPTY);
        assert_eq!(first, second);
    }

    #[test]
    fn test_sha256_vectors() {
        let mut ta = DigestTa::new(RustCryptoProvider::new());
        let mut out = [0u8; 32];
        assert_eq!(invoke(&mut ta, Command::Sha256, b"abc", &mut out), (Ok(()), 32));
        assert_eq!(out, SHA256_ABC);

        assert_eq!(invoke(&mut ta, Command::Sha256, b"", &mut out), (Ok(()), 32));
        assert_eq!(out, SHA256_EMPTY);
    }

    #[test]
    fn test_oversized_output_reports_digest_len() {
        let mut ta = DigestTa::new(RustCryptoProvider::new());
        let mut out = [0xAAu8; 64];
        assert_eq!(invoke(&mut ta, Command::Sha1, b"abc", &mut out), (Ok(()), 20));
        assert_eq!(out[..20], SHA1_ABC);
        assert_eq!(out[20..], [0u8; 44]);
    }

    #[test]
    fn test_wrong_signature_writes_nothing() {
        let provider = MockProvider::new();
        let mut ta = DigestTa::new(provider);
        let message = *b"abc";
        let mut out = [0xAAu8; 20];

        let mut params = Parameters::new(
            ParamTypes::new([
                ParamType::MemrefInput,
                ParamType::MemrefOutput,
                ParamType::ValueInput,
                ParamType::None,
            ]),
            [
                Param::MemrefInput(Some(&message[..])),
                Param::MemrefOutput(Some(OutputBuffer::new(&mut out))),
                Param::Value { a: 1, b: 2 },
                Param::None,
            ],
        );
        assert_eq!(
            ta.invoke_command(Command::Sha1, &mut params),
            Err(TaError::InvalidParameters)
        );
        drop(params);

        assert_eq!(out, [0xAAu8; 20]);
        assert_eq!(ta.provider().calls().len(), 0);
    }

    #[test]
    fn test_slots_disagreeing_with_types_rejected() {
        let mut ta = DigestTa::new(MockProvider::new());
        let message = *b"abc";
        let mut out = [0xAAu8; 20];

        let mut params = Parameters::new(
            ParamTypes::DIGEST,
            [
                Param::MemrefInput(Some(&message[..])),
                Param::MemrefInout(Some(OutputBuffer::new(&mut out))),
                Param::None,
                Param::None,
            ],
        );
        assert_eq!(
            ta.invoke_command(Command::Sha256, &mut params),
            Err(TaError::InvalidParameters)
        );
        drop(params);

        assert_eq!(out, [0xAAu8; 20]);
        assert_eq!(ta.provider().allocated(), 0);
    }

    #[test]
    fn test_null_input_rejected() {
        let mut ta = DigestTa::new(MockProvider::new());
        let mut out = [0xAAu8; 20];

        let mut params = Parameters::new(
            ParamTypes::DIGEST,
            [
                Param::MemrefInput(None),
                Param::MemrefOutput(Some(OutputBuffer::new(&mut out))),
                Param::None,
                Param::None,
            ],
        );
        assert_eq!(
            ta.invoke_command(Command::Sha1, &mut params),
            Err(TaError::InvalidParameters)
        );
        drop(params);

        assert_eq!(out, [0xAAu8; 20]);
    }

    #[test]
    fn test_null_output_rejected() {
        let mut ta = DigestTa::new(MockProvider::new());
        let message = *b"abc";

        let mut params = Parameters::new(
            ParamTypes::DIGEST,
            [
                Param::MemrefInput(Some(&message[..])),
                Param::MemrefOutput(None),
                Param::None,
                Param::None,
            ],
        );
        assert_eq!(
            ta.invoke_command(Command::CornerCases, &mut params),
            Err(TaError::InvalidParameters)
        );
        assert_eq!(ta.provider().allocated(), 0);
    }

    #[test]
    fn test_output_zeroed_before_failed_digest() {
        let provider = MockProvider::new();
        provider.fail_final(0);
        let mut ta = DigestTa::new(provider);
        let mut out = [0xAAu8; 32];

        let (result, _) = invoke(&mut ta, Command::Sha256, b"abc", &mut out);
        assert_eq!(result, Err(TaError::DigestFailed));
        assert_eq!(out, [0u8; 32]);
        assert_eq!(ta.provider().allocated(), 1);
        assert_eq!(ta.provider().live(), 0);
    }

    #[test]
    fn test_allocation_failure_propagates() {
        let provider = MockProvider::new();
        provider.fail_allocation();
        let mut ta = DigestTa::new(provider);
        let mut out = [0xAAu8; 20];

        let (result, _) = invoke(&mut ta, Command::Sha1, b"abc", &mut out);
        assert_eq!(result, Err(TaError::AllocationFailed));
        assert_eq!(out, [0u8; 20]);
        assert_eq!(ta.provider().live(), 0);
        assert_eq!(
            ta.provider().calls()[..],
            [MockCall::Allocate(Algorithm::Sha1)]
        );
    }

    #[test]
    fn test_short_output_buffer() {
        let mut ta = DigestTa::new(MockProvider::new());
        let mut out = [0xAAu8; 16];

        let (result, size) = invoke(&mut ta, Command::Sha256, b"abc", &mut out);
        assert_eq!(result, Err(TaError::ShortBuffer));
        assert_eq!(size, 16);
        assert_eq!(out, [0u8; 16]);
        assert_eq!(ta.provider().live(), 0);
    }

    #[test]
    fn test_oneshot_does_single_final() {
        let mut ta = DigestTa::new(MockProvider::new());
        let mut out = [0u8; 32];

        invoke(&mut ta, Command::Sha256, b"abc", &mut out).0.unwrap();
        assert_eq!(out, SHA256_ABC);
        assert_eq!(
            ta.provider().calls()[..],
            [
                MockCall::Allocate(Algorithm::Sha256),
                MockCall::DoFinal(3),
                MockCall::Release,
            ]
        );
    }

    #[test]
    fn test_corner_cases_command() {
        let mut ta = DigestTa::new(MockProvider::new());
        let mut out = [0u8; 20];

        assert_eq!(
            invoke(&mut ta, Command::CornerCases, b"abc", &mut out),
            (Ok(()), 20)
        );
        assert_eq!(out, SHA1_ABC);
        assert_eq!(ta.provider().allocated(), 1);
        assert_eq!(ta.provider().live(), 0);
    }

    #[test]
    fn test_corner_cases_allocation_failure_after_success() {
        let mut ta = DigestTa::new(MockProvider::new());
        let mut out = [0u8; 20];
        invoke(&mut ta, Command::CornerCases, b"abc", &mut out).0.unwrap();
        assert_eq!(out, SHA1_ABC);

        ta.provider().fail_allocation();
        let (result, _) = invoke(&mut ta, Command::CornerCases, b"abc", &mut out);
        assert_eq!(result, Err(TaError::AllocationFailed));
        assert_eq!(out, [0u8; 20]);
        assert_eq!(ta.provider().allocated(), 1);
        assert_eq!(ta.provider().live(), 0);
        assert_eq!(
            ta.provider().calls().last(),
            Some(&MockCall::Allocate(Algorithm::Sha1))
        );
    }

    #[test]
    fn test_session_lifecycle() {
        let mut ta = DigestTa::new(RustCryptoProvider::new());
        assert_eq!(ta.create(), Ok(()));
        assert_eq!(ta.open_session(&Parameters::none()), Ok(()));
        ta.close_session();

        let mut out = [0u8; 20];
        let params = Parameters::digest(b"abc", &mut out);
        assert_eq!(ta.open_session(&params), Err(TaError::InvalidParameters));
        ta.destroy();
    }
}
