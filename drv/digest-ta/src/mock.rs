// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Failure-injecting digest provider for tests.
//!
//! Wraps [`RustCryptoProvider`] so successful calls still produce real
//! digests, and records every call against the capability so tests can check
//! ordering and that each allocated operation was released.

use core::cell::{Cell, RefCell};

use drv_digest_ta_api::{Algorithm, TaError};
use heapless::Vec;

use crate::provider::{DigestOperation, DigestProvider};
use crate::rustcrypto::{RustCryptoOperation, RustCryptoProvider};

/// Calls beyond this many are counted but not recorded.
pub const MAX_RECORDED_CALLS: usize = 32;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum MockCall {
    Allocate(Algorithm),
    Update(usize),
    DoFinal(usize),
    Reset,
    Release,
}

#[derive(Default)]
pub struct MockProvider {
    inner: RustCryptoProvider,
    fail_allocate: Cell<bool>,
    fail_final_at: Cell<Option<usize>>,
    finals: Cell<usize>,
    allocated: Cell<usize>,
    released: Cell<usize>,
    calls: RefCell<Vec<MockCall, MAX_RECORDED_CALLS>>,
}

impl MockProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every following `allocate` fail.
    pub fn fail_allocation(&self) {
        self.fail_allocate.set(true);
    }

    /// Makes the `nth` `do_final` call (counting from zero across all
    /// operations) fail with `DigestFailed`.
    pub fn fail_final(&self, nth: usize) {
        self.fail_final_at.set(Some(nth));
    }

    pub fn allocated(&self) -> usize {
        self.allocated.get()
    }

    pub fn released(&self) -> usize {
        self.released.get()
    }

    /// Operations allocated and not yet released.
    pub fn live(&self) -> usize {
        self.allocated() - self.released()
    }

    pub fn calls(&self) -> Vec<MockCall, MAX_RECORDED_CALLS> {
        self.calls.borrow().clone()
    }

    fn record(&self, call: MockCall) {
        // Calls past the record's capacity are not recorded.
        self.calls.borrow_mut().push(call).ok();
    }
}

impl DigestProvider for MockProvider {
    type Operation<'p> = MockOperation<'p>
    where
        Self: 'p;

    fn allocate(&self, algorithm: Algorithm) -> Result<MockOperation<'_>, TaError> {
        self.record(MockCall::Allocate(algorithm));
        if self.fail_allocate.get() {
            return Err(TaError::AllocationFailed);
        }
        let inner = self.inner.allocate(algorithm)?;
        self.allocated.set(self.allocated.get() + 1);
        Ok(MockOperation {
            provider: self,
            inner,
        })
    }
}

pub struct MockOperation<'p> {
    provider: &'p MockProvider,
    inner: RustCryptoOperation,
}

impl DigestOperation for MockOperation<'_> {
    fn algorithm(&self) -> Algorithm {
        self.inner.algorithm()
    }

    fn update(&mut self, chunk: &[u8]) {
        self.provider.record(MockCall::Update(chunk.len()));
        self.inner.update(chunk);
    }

    fn do_final(&mut self, chunk: &[u8], digest: &mut [u8]) -> Result<usize, TaError> {
        let provider = self.provider;
        provider.record(MockCall::DoFinal(chunk.len()));

        let nth = provider.finals.get();
        provider.finals.set(nth + 1);
        if provider.fail_final_at.get() == Some(nth) {
            return Err(TaError::DigestFailed);
        }
        self.inner.do_final(chunk, digest)
    }

    fn reset(&mut self) {
        self.provider.record(MockCall::Reset);
        self.inner.reset();
    }
}

impl Drop for MockOperation<'_> {
    fn drop(&mut self) {
        let provider = self.provider;
        provider.released.set(provider.released.get() + 1);
        provider.record(MockCall::Release);
    }
}
