// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Digest capability the TA delegates hashing to.

use drv_digest_ta_api::{Algorithm, TaError};

/// Source of digest operations, normally the host's trusted hashing
/// service.
pub trait DigestProvider {
    type Operation<'p>: DigestOperation
    where
        Self: 'p;

    /// Allocates an operation in its initial state.
    fn allocate(&self, algorithm: Algorithm) -> Result<Self::Operation<'_>, TaError>;
}

/// One in-progress digest computation. Dropping it frees the operation.
pub trait DigestOperation {
    fn algorithm(&self) -> Algorithm;

    /// Accumulates `chunk`. There is no status to report.
    fn update(&mut self, chunk: &[u8]);

    /// Accumulates `chunk`, writes the digest to the front of `digest` and
    /// returns its length. The operation is back in its initial state
    /// afterwards.
    ///
    /// Fails with `ShortBuffer` if `digest` is smaller than the algorithm's
    /// digest length, leaving the accumulated state untouched.
    fn do_final(&mut self, chunk: &[u8], digest: &mut [u8]) -> Result<usize, TaError>;

    /// Discards accumulated input.
    fn reset(&mut self);
}
