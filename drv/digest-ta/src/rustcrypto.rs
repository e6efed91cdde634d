// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Software digest provider built on the RustCrypto hashes.

use digest::{Digest, FixedOutputReset};
use drv_digest_ta_api::{Algorithm, TaError};
use sha1::Sha1;
use sha2::Sha256;

use crate::provider::{DigestOperation, DigestProvider};

/// Provider backed by the `sha1` and `sha2` crates. Allocation never fails.
#[derive(Copy, Clone, Debug, Default)]
pub struct RustCryptoProvider;

impl RustCryptoProvider {
    pub const fn new() -> Self {
        Self
    }
}

impl DigestProvider for RustCryptoProvider {
    type Operation<'p> = RustCryptoOperation
    where
        Self: 'p;

    fn allocate(&self, algorithm: Algorithm) -> Result<RustCryptoOperation, TaError> {
        Ok(RustCryptoOperation {
            context: HashContext::new(algorithm),
        })
    }
}

pub struct RustCryptoOperation {
    context: HashContext,
}

enum HashContext {
    Sha1(Sha1),
    Sha256(Sha256),
}

impl HashContext {
    fn new(algorithm: Algorithm) -> Self {
        match algorithm {
            Algorithm::Sha1 => Self::Sha1(Sha1::new()),
            Algorithm::Sha256 => Self::Sha256(Sha256::new()),
        }
    }

    fn algorithm(&self) -> Algorithm {
        match self {
            Self::Sha1(_) => Algorithm::Sha1,
            Self::Sha256(_) => Algorithm::Sha256,
        }
    }

    fn update(&mut self, data: &[u8]) {
        match self {
            Self::Sha1(ctx) => Digest::update(ctx, data),
            Self::Sha256(ctx) => Digest::update(ctx, data),
        }
    }

    fn finalize_into(&mut self, out: &mut [u8]) -> usize {
        match self {
            Self::Sha1(ctx) => finalize_reset(ctx, out),
            Self::Sha256(ctx) => finalize_reset(ctx, out),
        }
    }

    fn reset(&mut self) {
        match self {
            Self::Sha1(ctx) => Digest::reset(ctx),
            Self::Sha256(ctx) => Digest::reset(ctx),
        }
    }
}

/// `out` must hold at least `D::output_size()` bytes.
fn finalize_reset<D: Digest + FixedOutputReset>(ctx: &mut D, out: &mut [u8]) -> usize {
    let digest = Digest::finalize_reset(ctx);
    out[..digest.len()].copy_from_slice(&digest);
    digest.len()
}

impl DigestOperation for RustCryptoOperation {
    fn algorithm(&self) -> Algorithm {
        self.context.algorithm()
    }

    fn update(&mut self, chunk: &[u8]) {
        self.context.update(chunk);
    }

    fn do_final(&mut self, chunk: &[u8], digest: &mut [u8]) -> Result<usize, TaError> {
        if digest.len() < self.algorithm().digest_len() {
            return Err(TaError::ShortBuffer);
        }
        self.context.update(chunk);
        Ok(self.context.finalize_into(digest))
    }

    fn reset(&mut self) {
        self.context.reset();
    }
}
