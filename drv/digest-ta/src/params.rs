// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Parameter slots handed to the TA by the runtime.

use drv_digest_ta_api::{ParamTypes, TaError, PARAM_SLOTS};
use log::warn;

/// Caller-owned writable buffer.
///
/// `size` starts out as the buffer capacity and is rewritten with the
/// number of bytes produced, which is what the runtime reports back to the
/// normal world.
#[derive(Debug)]
pub struct OutputBuffer<'a> {
    buf: &'a mut [u8],
    size: usize,
}

impl<'a> OutputBuffer<'a> {
    pub fn new(buf: &'a mut [u8]) -> Self {
        let size = buf.len();
        Self { buf, size }
    }

    pub fn capacity(&self) -> usize {
        self.buf.len()
    }

    pub fn size(&self) -> usize {
        self.size
    }

    /// The bytes covered by `size`.
    pub fn written(&self) -> &[u8] {
        &self.buf[..self.size.min(self.buf.len())]
    }

    pub(crate) fn as_mut_slice(&mut self) -> &mut [u8] {
        self.buf
    }

    pub(crate) fn set_size(&mut self, size: usize) {
        self.size = size;
    }

    pub(crate) fn zero(&mut self) {
        self.buf.fill(0);
    }
}

/// One parameter slot. A memref holding `None` is a null reference.
#[derive(Debug)]
pub enum Param<'a> {
    None,
    Value { a: u32, b: u32 },
    MemrefInput(Option<&'a [u8]>),
    MemrefOutput(Option<OutputBuffer<'a>>),
    MemrefInout(Option<OutputBuffer<'a>>),
}

/// Declared signature plus the four slots of one call.
#[derive(Debug)]
pub struct Parameters<'a> {
    types: ParamTypes,
    slots: [Param<'a>; PARAM_SLOTS],
}

impl<'a> Parameters<'a> {
    pub fn new(types: ParamTypes, slots: [Param<'a>; PARAM_SLOTS]) -> Self {
        Self { types, slots }
    }

    /// Empty parameter set, as passed to the lifecycle hooks.
    pub fn none() -> Self {
        Self::new(
            ParamTypes::EMPTY,
            [Param::None, Param::None, Param::None, Param::None],
        )
    }

    /// Well-formed parameters for a digest command.
    pub fn digest(message: &'a [u8], digest: &'a mut [u8]) -> Self {
        Self::new(
            ParamTypes::DIGEST,
            [
                Param::MemrefInput(Some(message)),
                Param::MemrefOutput(Some(OutputBuffer::new(digest))),
                Param::None,
                Param::None,
            ],
        )
    }

    pub fn types(&self) -> ParamTypes {
        self.types
    }

    pub fn slot(&self, index: usize) -> Option<&Param<'a>> {
        self.slots.get(index)
    }

    /// The output buffer in slot 1, if there is one.
    pub fn output(&self) -> Option<&OutputBuffer<'a>> {
        match &self.slots[1] {
            Param::MemrefOutput(Some(out)) | Param::MemrefInout(Some(out)) => {
                Some(out)
            }
            _ => None,
        }
    }

    /// Checks the `{input, output, none, none}` shape and hands out the
    /// message and digest buffers. Nothing is written on failure.
    pub(crate) fn digest_buffers(
        &mut self,
    ) -> Result<(&'a [u8], &mut OutputBuffer<'a>), TaError> {
        if self.types != ParamTypes::DIGEST {
            warn!(
                "bad parameter types 0x{:04x}, expected 0x{:04x}",
                self.types.raw(),
                ParamTypes::DIGEST.raw()
            );
            return Err(TaError::InvalidParameters);
        }

        let [input, output, third, fourth] = &mut self.slots;
        match (input, output, third, fourth) {
            (
                Param::MemrefInput(Some(message)),
                Param::MemrefOutput(Some(digest)),
                Param::None,
                Param::None,
            ) => Ok((*message, digest)),
            (
                Param::MemrefInput(message),
                Param::MemrefOutput(digest),
                Param::None,
                Param::None,
            ) => {
                warn!(
                    "null buffer (message: {}, digest: {})",
                    message.is_some(),
                    digest.is_some()
                );
                Err(TaError::InvalidParameters)
            }
            _ => {
                warn!("parameter slots do not match declared types");
                Err(TaError::InvalidParameters)
            }
        }
    }
}
