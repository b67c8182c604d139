//! `tokio_util::codec` integration.

use bytes::{Buf, BytesMut};
use tokio_util::codec::Encoder;

use crate::codec::{content_size, encode_frame, Frame, FrameConfig};
use crate::decoder::{DecodeResult, Decoder};
use crate::error::FrameError;

/// Codec for `FramedRead` / `FramedWrite` over an async byte stream.
///
/// Each decoded item is a [`DecodeResult`], so rejected frames reach the
/// caller without terminating the stream. Only I/O failures end it.
#[derive(Debug, Clone, Default)]
pub struct HdlcCodec {
    decoder: Decoder,
}

impl HdlcCodec {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: FrameConfig) -> Self {
        Self {
            decoder: Decoder::with_config(config),
        }
    }

    pub fn config(&self) -> &FrameConfig {
        self.decoder.config()
    }
}

impl tokio_util::codec::Decoder for HdlcCodec {
    type Item = DecodeResult;
    type Error = FrameError;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        let mut consumed = 0;
        let mut found = None;
        for &byte in src.iter() {
            consumed += 1;
            if let Some(result) = self.decoder.process(byte) {
                found = Some(result);
                break;
            }
        }
        src.advance(consumed);
        Ok(found)
    }

    fn decode_eof(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        match self.decode(src)? {
            Some(result) => Ok(Some(result)),
            None => {
                self.decoder.reset();
                Ok(None)
            }
        }
    }
}

impl Encoder<Frame> for HdlcCodec {
    type Error = FrameError;

    fn encode(&mut self, frame: Frame, dst: &mut BytesMut) -> Result<(), Self::Error> {
        let size = content_size(frame.address, frame.payload.len());
        let max = self.config().max_frame_size;
        if size > max {
            return Err(FrameError::FrameTooLarge { size, max });
        }
        encode_frame(frame.address, frame.control, &frame.payload, dst);
        Ok(())
    }
}
