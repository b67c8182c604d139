//! HDLC-style framing for raw serial byte streams.
//!
//! Every frame is laid out as:
//! - A `0x7E` flag byte opening the frame
//! - A varint address, a control octet, and the payload
//! - A 4-byte little-endian CRC-32 over address, control and payload
//! - A closing `0x7E` flag byte
//!
//! Flag and escape bytes inside the frame are byte-stuffed, so the decoder
//! can always find the next frame boundary after line noise or corruption.

pub mod address;
pub mod codec;
pub mod control;
pub mod decoder;
pub mod error;
#[cfg(feature = "async")]
pub mod framed;
pub mod protocol;
pub mod reader;
pub mod writer;

pub use address::{DEFAULT_LOG_ADDRESS, DEFAULT_RPC_ADDRESS, MAX_ADDRESS_SIZE};
pub use codec::{
    encode, encode_frame, encode_ui_frame, max_encoded_frame_size, Frame, FrameConfig,
    DEFAULT_MAX_FRAME_SIZE, MIN_FRAME_SIZE,
};
pub use control::{ControlField, FrameType};
pub use decoder::{feed, step, DecodeResult, Decoder, DecoderState};
pub use error::{DecodeError, FrameError, Result};
#[cfg(feature = "async")]
pub use framed::HdlcCodec;
pub use protocol::{compute_fcs, escape_value, ESCAPE, FCS_SIZE, FLAG, VALID_ESCAPED_BYTES};
pub use reader::FrameReader;
pub use writer::FrameWriter;
