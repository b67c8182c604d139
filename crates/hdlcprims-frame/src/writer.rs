use std::io::{ErrorKind, Write};

use bytes::BytesMut;

use crate::codec::{content_size, encode_frame, Frame, FrameConfig};
use crate::control::ControlField;
use crate::error::{FrameError, Result};

const INITIAL_BUFFER_CAPACITY: usize = 4 * 1024;

/// Writes encoded frames to any `Write` byte sink.
pub struct FrameWriter<T> {
    inner: T,
    buf: BytesMut,
    config: FrameConfig,
}

impl<T: Write> FrameWriter<T> {
    /// Create a new frame writer with default configuration.
    pub fn new(inner: T) -> Self {
        Self::with_config(inner, FrameConfig::default())
    }

    /// Create a new frame writer with explicit configuration.
    pub fn with_config(inner: T, config: FrameConfig) -> Self {
        Self {
            inner,
            buf: BytesMut::with_capacity(INITIAL_BUFFER_CAPACITY),
            config,
        }
    }

    /// Write a complete frame (blocking).
    pub fn write_frame(&mut self, frame: &Frame) -> Result<()> {
        self.send(frame.address, frame.control, frame.payload.as_ref())
    }

    /// Encode and send a payload with an explicit control octet.
    pub fn send(&mut self, address: u64, control: u8, payload: &[u8]) -> Result<()> {
        let size = content_size(address, payload.len());
        if size > self.config.max_frame_size {
            return Err(FrameError::FrameTooLarge {
                size,
                max: self.config.max_frame_size,
            });
        }

        self.buf.clear();
        encode_frame(address, control, payload, &mut self.buf);

        let mut offset = 0usize;
        while offset < self.buf.len() {
            match self.inner.write(&self.buf[offset..]) {
                Ok(0) => return Err(FrameError::ConnectionClosed),
                Ok(n) => offset += n,
                Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                Err(err) if err.kind() == ErrorKind::WouldBlock => continue,
                Err(err) => return Err(FrameError::Io(err)),
            }
        }

        self.flush()
    }

    /// Encode and send an unnumbered information frame.
    pub fn send_ui(&mut self, address: u64, payload: &[u8]) -> Result<()> {
        self.send(
            address,
            ControlField::unnumbered_information().octet(),
            payload,
        )
    }

    /// Flush the underlying stream.
    pub fn flush(&mut self) -> Result<()> {
        loop {
            match self.inner.flush() {
                Ok(()) => return Ok(()),
                Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                Err(err) if err.kind() == ErrorKind::WouldBlock => continue,
                Err(err) => return Err(FrameError::Io(err)),
            }
        }
    }

    /// Borrow the underlying stream.
    pub fn get_ref(&self) -> &T {
        &self.inner
    }

    /// Mutably borrow the underlying stream.
    pub fn get_mut(&mut self) -> &mut T {
        &mut self.inner
    }

    /// Consume the writer and return the inner stream.
    pub fn into_inner(self) -> T {
        self.inner
    }

    /// Update maximum frame size for subsequent frame encoding.
    pub fn set_max_frame_size(&mut self, max_frame_size: usize) {
        self.config.max_frame_size = max_frame_size;
    }

    /// Current frame writer configuration.
    pub fn config(&self) -> &FrameConfig {
        &self.config
    }
}

#[cfg(test)]
mod tests {
    use std::collections::VecDeque;
    use std::io::Cursor;

    use super::*;
    use crate::codec::encode;
    use crate::decoder::Decoder;
    use crate::protocol::FLAG;

    fn decode_written(bytes: &[u8]) -> Vec<Frame> {
        Decoder::new()
            .feed(bytes)
            .into_iter()
            .map(|result| result.unwrap())
            .collect()
    }

    #[test]
    fn write_single_frame() {
        let cursor = Cursor::new(Vec::<u8>::new());
        let mut writer = FrameWriter::new(cursor);

        writer.send(1, 0x03, b"hello").unwrap();

        let wire = writer.into_inner().into_inner();
        assert_eq!(wire, encode(1, 0x03, b"hello").to_vec());
        assert_eq!(decode_written(&wire), vec![Frame::new(1, 0x03, "hello")]);
    }

    #[test]
    fn write_multiple_frames() {
        let cursor = Cursor::new(Vec::<u8>::new());
        let mut writer = FrameWriter::new(cursor);

        writer.send_ui(1, b"one").unwrap();
        writer.send_ui(2, b"two").unwrap();
        writer.send_ui(3, b"three").unwrap();

        let wire = writer.into_inner().into_inner();
        assert_eq!(
            decode_written(&wire),
            vec![
                Frame::ui(1, "one"),
                Frame::ui(2, "two"),
                Frame::ui(3, "three"),
            ]
        );
    }

    #[test]
    fn frame_too_large_rejected() {
        let cfg = FrameConfig { max_frame_size: 8 };
        let cursor = Cursor::new(Vec::<u8>::new());
        let mut writer = FrameWriter::with_config(cursor, cfg);

        let err = writer.send_ui(1, b"oversized").unwrap_err();
        assert!(matches!(err, FrameError::FrameTooLarge { size: 15, max: 8 }));
        assert!(writer.get_ref().get_ref().is_empty());
    }

    #[test]
    fn set_max_frame_size_applies() {
        let mut writer = FrameWriter::new(Cursor::new(Vec::<u8>::new()));
        writer.set_max_frame_size(6);
        assert_eq!(writer.config().max_frame_size, 6);
        writer.send_ui(1, b"").unwrap();
        assert!(writer.send_ui(1, b"x").is_err());
    }

    #[test]
    fn every_send_flushes() {
        let mut writer = FrameWriter::new(ScriptedSink::default());

        writer.send_ui(1, b"x").unwrap();
        writer.send_ui(2, b"y").unwrap();

        assert_eq!(writer.get_ref().flushes, 2);
    }

    #[test]
    fn write_frame_method() {
        let cursor = Cursor::new(Vec::<u8>::new());
        let mut writer = FrameWriter::new(cursor);
        let frame = Frame::new(300, 0x13, "abc");

        writer.write_frame(&frame).unwrap();

        let wire = writer.into_inner().into_inner();
        assert_eq!(decode_written(&wire), vec![frame]);
    }

    #[test]
    fn accessors_expose_the_sink() {
        let mut writer = FrameWriter::new(Cursor::new(Vec::<u8>::new()));
        writer.send_ui(1, b"aaaa").unwrap();
        assert_eq!(writer.get_ref().get_ref(), &encode(1, 0x03, b"aaaa").to_vec());

        // Rewind so the next frame overwrites the first.
        writer.get_mut().set_position(0);
        writer.send_ui(2, b"bbbb").unwrap();

        let wire = writer.into_inner().into_inner();
        assert_eq!(decode_written(&wire), vec![Frame::ui(2, "bbbb")]);
    }

    /// Sink that fails writes and flushes with queued error kinds before
    /// accepting data, and optionally takes at most `max_write` bytes per call.
    #[derive(Default)]
    struct ScriptedSink {
        write_errors: VecDeque<ErrorKind>,
        flush_errors: VecDeque<ErrorKind>,
        max_write: Option<usize>,
        flushes: usize,
        data: Vec<u8>,
    }

    impl Write for ScriptedSink {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            if let Some(kind) = self.write_errors.pop_front() {
                return Err(kind.into());
            }
            let n = self.max_write.map_or(buf.len(), |max| max.min(buf.len()));
            self.data.extend_from_slice(&buf[..n]);
            Ok(n)
        }

        fn flush(&mut self) -> std::io::Result<()> {
            if let Some(kind) = self.flush_errors.pop_front() {
                return Err(kind.into());
            }
            self.flushes += 1;
            Ok(())
        }
    }

    #[test]
    fn retries_transient_write_and_flush_errors() {
        for kind in [ErrorKind::Interrupted, ErrorKind::WouldBlock] {
            let sink = ScriptedSink {
                write_errors: VecDeque::from([kind, kind]),
                flush_errors: VecDeque::from([kind]),
                ..Default::default()
            };
            let mut writer = FrameWriter::new(sink);
            writer.send_ui(5, b"retry").unwrap();

            let sink = writer.into_inner();
            assert_eq!(sink.flushes, 1);
            assert_eq!(decode_written(&sink.data), vec![Frame::ui(5, "retry")]);
        }
    }

    #[test]
    fn short_writes_are_completed() {
        let sink = ScriptedSink {
            max_write: Some(3),
            ..Default::default()
        };
        let mut writer = FrameWriter::new(sink);
        writer.send(300, 0x13, &[FLAG, 0x7D, 0x42]).unwrap();

        let sink = writer.into_inner();
        assert_eq!(sink.data, encode(300, 0x13, &[FLAG, 0x7D, 0x42]).to_vec());
    }

    #[test]
    fn fatal_write_error_propagates() {
        let sink = ScriptedSink {
            write_errors: VecDeque::from([ErrorKind::BrokenPipe]),
            ..Default::default()
        };
        let mut writer = FrameWriter::new(sink);

        let err = writer.send_ui(1, b"x").unwrap_err();
        assert!(matches!(err, FrameError::Io(e) if e.kind() == ErrorKind::BrokenPipe));
        assert_eq!(writer.get_ref().flushes, 0);
    }

    #[test]
    fn connection_closed_when_write_returns_zero() {
        let sink = ScriptedSink {
            max_write: Some(0),
            ..Default::default()
        };
        let mut writer = FrameWriter::new(sink);
        let err = writer.send_ui(1, b"x").unwrap_err();
        assert!(matches!(err, FrameError::ConnectionClosed));
    }

    #[test]
    fn written_bytes_decode() {
        let cursor = Cursor::new(Vec::<u8>::new());
        let mut writer = FrameWriter::new(cursor);

        writer.send_ui(3, b"z").unwrap();

        let wire = writer.into_inner().into_inner();
        let mut framed = crate::reader::FrameReader::new(Cursor::new(wire));
        let frame = framed.read_frame().unwrap();
        assert_eq!(frame.address, 3);
        assert_eq!(frame.payload.as_ref(), b"z");
    }
}
