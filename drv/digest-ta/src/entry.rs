// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Entry points in the shape the runtime calls them: raw command ids in,
//! raw result codes out.

use drv_digest_ta_api::{result_code, Command, TaError};
use log::warn;

use crate::params::Parameters;
use crate::provider::DigestProvider;
use crate::DigestTa;

pub fn create<P: DigestProvider>(ta: &mut DigestTa<P>) -> u32 {
    result_code(ta.create())
}

pub fn destroy<P: DigestProvider>(ta: &mut DigestTa<P>) {
    ta.destroy();
}

pub fn open_session<P: DigestProvider>(
    ta: &mut DigestTa<P>,
    params: &Parameters<'_>,
) -> u32 {
    result_code(ta.open_session(params))
}

pub fn close_session<P: DigestProvider>(ta: &mut DigestTa<P>) {
    ta.close_session();
}

/// Unknown command ids fail with `InvalidParameters` without touching the
/// parameters.
pub fn invoke_command<P: DigestProvider>(
    ta: &mut DigestTa<P>,
    cmd_id: u32,
    params: &mut Parameters<'_>,
) -> u32 {
    let result = match Command::from_id(cmd_id) {
        Some(command) => ta.invoke_command(command, params),
        None => {
            warn!("unknown command id {}", cmd_id);
            Err(TaError::InvalidParameters)
        }
    };
    result_code(result)
}
