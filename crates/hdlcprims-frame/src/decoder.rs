//! Frame decoder state machine.
//!
//! The decoder state is an explicit value. [`step`] and [`feed`] consume a
//! state and return the next one, so a stream's state can be inspected,
//! stored, or handed to another owner between calls. [`Decoder`] wraps the
//! same functions for callers that prefer an owned object.

use bytes::{Buf, BufMut, Bytes, BytesMut};

use crate::address::decode_address;
use crate::codec::{Frame, FrameConfig, MIN_FRAME_SIZE};
use crate::error::DecodeError;
use crate::protocol::{compute_fcs, unescape_byte, ESCAPE, FCS_SIZE, FLAG};

/// Outcome of one candidate frame.
pub type DecodeResult = Result<Frame, DecodeError>;

/// Where the decoder is within the byte stream.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum DecoderState {
    /// Discarding bytes until the next flag.
    #[default]
    Searching,
    /// Accumulating unescaped frame content.
    InFrame(BytesMut),
    /// The previous byte was an escape; the next one completes it.
    EscapePending(BytesMut),
}

impl DecoderState {
    /// Unescaped content accumulated for the current candidate frame.
    pub fn buffered(&self) -> &[u8] {
        match self {
            DecoderState::Searching => &[],
            DecoderState::InFrame(buf) | DecoderState::EscapePending(buf) => &buf[..],
        }
    }

    /// Returns true if a frame has been started but not finished.
    pub fn has_partial_frame(&self) -> bool {
        matches!(self, DecoderState::EscapePending(_)) || !self.buffered().is_empty()
    }
}

/// Advance `state` by one byte.
///
/// Returns the next state and, when the byte completes or aborts a candidate
/// frame, its result.
pub fn step(
    state: DecoderState,
    byte: u8,
    config: &FrameConfig,
) -> (DecoderState, Option<DecodeResult>) {
    match state {
        DecoderState::Searching => {
            if byte == FLAG {
                (DecoderState::InFrame(BytesMut::new()), None)
            } else {
                (DecoderState::Searching, None)
            }
        }
        DecoderState::InFrame(mut buf) => match byte {
            // Back-to-back flags delimit nothing.
            FLAG if buf.is_empty() => (DecoderState::InFrame(buf), None),
            FLAG => {
                let content = buf.split().freeze();
                (DecoderState::InFrame(buf), Some(validate(content)))
            }
            ESCAPE => (DecoderState::EscapePending(buf), None),
            _ => append(buf, byte, config),
        },
        DecoderState::EscapePending(mut buf) => match unescape_byte(byte) {
            Ok(unescaped) => append(buf, unescaped, config),
            Err(err) => {
                buf.clear();
                // A flag here still marks a boundary; keep it as the opener
                // of the next frame.
                let next = if byte == FLAG {
                    DecoderState::InFrame(buf)
                } else {
                    DecoderState::Searching
                };
                (next, Some(Err(err)))
            }
        },
    }
}

/// Advance `state` over every byte in `data`.
pub fn feed(
    mut state: DecoderState,
    data: &[u8],
    config: &FrameConfig,
) -> (DecoderState, Vec<DecodeResult>) {
    let mut results = Vec::new();
    for &byte in data {
        let (next, result) = step(state, byte, config);
        state = next;
        results.extend(result);
    }
    (state, results)
}

fn append(
    mut buf: BytesMut,
    byte: u8,
    config: &FrameConfig,
) -> (DecoderState, Option<DecodeResult>) {
    if buf.len() >= config.max_frame_size {
        return (
            DecoderState::Searching,
            Some(Err(DecodeError::FrameTooLong {
                max: config.max_frame_size,
            })),
        );
    }
    buf.put_u8(byte);
    (DecoderState::InFrame(buf), None)
}

/// Split unescaped frame content into fields and verify its FCS.
pub fn validate(content: Bytes) -> DecodeResult {
    if content.len() < MIN_FRAME_SIZE {
        return Err(DecodeError::FrameTooShort {
            len: content.len(),
            min: MIN_FRAME_SIZE,
        });
    }

    let fcs_start = content.len() - FCS_SIZE;
    let expected = u32::from_le_bytes(compute_fcs(&content[..fcs_start]));
    let actual = (&content[fcs_start..]).get_u32_le();
    if expected != actual {
        return Err(DecodeError::ChecksumMismatch { expected, actual });
    }

    let (address, address_len) = decode_address(&content[..fcs_start])?;
    if address_len >= fcs_start {
        return Err(DecodeError::FrameTooShort {
            len: content.len(),
            min: address_len + 1 + FCS_SIZE,
        });
    }

    Ok(Frame {
        address,
        control: content[address_len],
        payload: content.slice(address_len + 1..fcs_start),
    })
}

/// Owns the decoding state of a single byte stream.
#[derive(Debug, Clone, Default)]
pub struct Decoder {
    state: DecoderState,
    config: FrameConfig,
}

impl Decoder {
    /// Create a decoder with default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a decoder with explicit configuration.
    pub fn with_config(config: FrameConfig) -> Self {
        Self::from_state(DecoderState::Searching, config)
    }

    /// Resume decoding from a previously captured state.
    pub fn from_state(state: DecoderState, config: FrameConfig) -> Self {
        Self { state, config }
    }

    /// Process one byte.
    pub fn process(&mut self, byte: u8) -> Option<DecodeResult> {
        if byte != FLAG && matches!(self.state, DecoderState::Searching) {
            tracing::trace!(byte, "discarding byte outside frame");
        }
        let state = std::mem::take(&mut self.state);
        let (next, result) = step(state, byte, &self.config);
        self.state = next;
        if let Some(Err(err)) = &result {
            tracing::debug!(error = %err, "discarding frame");
        }
        result
    }

    /// Process a chunk of bytes, returning every completed result in order.
    pub fn feed(&mut self, data: &[u8]) -> Vec<DecodeResult> {
        data.iter().filter_map(|&byte| self.process(byte)).collect()
    }

    /// Drop any partial frame and go back to searching for a flag.
    pub fn reset(&mut self) {
        if self.state.has_partial_frame() {
            tracing::trace!(
                buffered = self.state.buffered().len(),
                "dropping partial frame"
            );
        }
        self.state = DecoderState::Searching;
    }

    pub fn state(&self) -> &DecoderState {
        &self.state
    }

    pub fn into_state(self) -> DecoderState {
        self.state
    }

    /// Update maximum frame size for subsequent decoding.
    pub fn set_max_frame_size(&mut self, max_frame_size: usize) {
        self.config.max_frame_size = max_frame_size;
    }

    /// Current decoder configuration.
    pub fn config(&self) -> &FrameConfig {
        &self.config
    }
}
