// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Diagnostic sweep over empty and non-empty inputs to `update` and
//! `do_final`.
//!
//! The sequence, on a single operation:
//!
//! 1. every pairing of {empty, message} update input with {empty, message}
//!    finalize input, resetting after each pairing; failures are only logged
//! 2. `do_final` of an empty input on its own
//! 3. `do_final` of the message on its own, after a reset
//!
//! Steps 2 and 3 propagate failures. The caller sees the output and status
//! of the last finalize; every step's outcome lands in a report that lives
//! only as long as the call.

use drv_digest_ta_api::{TaError, SHA1_DIGEST_LEN};
use heapless::Vec;
use log::{debug, warn};

use crate::params::OutputBuffer;
use crate::provider::DigestOperation;

/// Four pairings plus two standalone finalizes.
pub const CORNER_CASE_STEPS: usize = 6;

pub type CornerCaseReport = Vec<CaseOutcome, CORNER_CASE_STEPS>;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Input {
    Empty,
    Message,
}

impl Input {
    fn select(self, message: &[u8]) -> &[u8] {
        match self {
            Self::Empty => &[],
            Self::Message => message,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CaseOutcome {
    /// `None` for the standalone finalize steps.
    pub update: Option<Input>,
    pub finalize: Input,
    pub result: Result<(), TaError>,
    /// Digest produced by the step, zero if it failed.
    pub digest: [u8; SHA1_DIGEST_LEN],
}

pub(crate) fn run<O: DigestOperation>(
    op: &mut O,
    message: &[u8],
    out: &mut OutputBuffer<'_>,
) -> (CornerCaseReport, Result<(), TaError>) {
    let mut report = CornerCaseReport::new();

    for update in [Input::Empty, Input::Message] {
        for finalize in [Input::Empty, Input::Message] {
            debug!("looping: update {:?}, final {:?}", update, finalize);
            op.update(update.select(message));
            let result = finish(op, finalize.select(message), out);
            record(&mut report, Some(update), finalize, result, out);
            op.reset();
        }
    }

    debug!("final only, empty message");
    let result = finish(op, &[], out);
    record(&mut report, None, Input::Empty, result, out);
    if result.is_err() {
        return (report, result);
    }

    debug!("final only, full message");
    op.reset();
    let result = finish(op, message, out);
    record(&mut report, None, Input::Message, result, out);
    (report, result)
}

fn finish<O: DigestOperation>(
    op: &mut O,
    chunk: &[u8],
    out: &mut OutputBuffer<'_>,
) -> Result<(), TaError> {
    match op.do_final(chunk, out.as_mut_slice()) {
        Ok(len) => {
            out.set_size(len);
            crate::dump_digest(op.algorithm(), out.written());
            Ok(())
        }
        Err(e) => {
            warn!("do_final failed: {}", e);
            Err(e)
        }
    }
}

fn record(
    report: &mut CornerCaseReport,
    update: Option<Input>,
    finalize: Input,
    result: Result<(), TaError>,
    out: &OutputBuffer<'_>,
) {
    let mut digest = [0; SHA1_DIGEST_LEN];
    if result.is_ok() {
        let written = out.written();
        let len = written.len().min(SHA1_DIGEST_LEN);
        digest[..len].copy_from_slice(&written[..len]);
    }
    debug_assert!(report.len() < CORNER_CASE_STEPS);
    report
        .push(CaseOutcome {
            update,
            finalize,
            result,
            digest,
        })
        .ok();
}
