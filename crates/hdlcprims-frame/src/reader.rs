use std::collections::VecDeque;
use std::io::{ErrorKind, Read};

use crate::codec::{Frame, FrameConfig};
use crate::decoder::{DecodeResult, Decoder};
use crate::error::{FrameError, Result};

const READ_CHUNK_SIZE: usize = 4 * 1024;

/// Reads frames from any `Read` byte source.
///
/// Handles partial reads and resynchronization internally. Rejected frames
/// surface as [`FrameError::Decode`]; the reader keeps working afterwards.
pub struct FrameReader<T> {
    inner: T,
    decoder: Decoder,
    pending: VecDeque<DecodeResult>,
}

impl<T: Read> FrameReader<T> {
    /// Create a new frame reader with default configuration.
    pub fn new(inner: T) -> Self {
        Self::with_config(inner, FrameConfig::default())
    }

    /// Create a new frame reader with explicit configuration.
    pub fn with_config(inner: T, config: FrameConfig) -> Self {
        Self {
            inner,
            decoder: Decoder::with_config(config),
            pending: VecDeque::new(),
        }
    }

    /// Read the next decode result (blocking).
    ///
    /// Returns `Err(FrameError::Decode(_))` for a rejected frame and
    /// `Err(FrameError::ConnectionClosed)` when EOF is reached.
    pub fn read_frame(&mut self) -> Result<Frame> {
        loop {
            if let Some(result) = self.pending.pop_front() {
                return result.map_err(FrameError::from);
            }

            let mut chunk = [0u8; READ_CHUNK_SIZE];
            let read = match self.inner.read(&mut chunk) {
                Ok(n) => n,
                Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                Err(err) => return Err(FrameError::Io(err)),
            };

            if read == 0 {
                self.decoder.reset();
                return Err(FrameError::ConnectionClosed);
            }

            self.pending.extend(self.decoder.feed(&chunk[..read]));
        }
    }

    /// Read the next valid frame, skipping rejected ones.
    pub fn read_valid_frame(&mut self) -> Result<Frame> {
        loop {
            match self.read_frame() {
                Err(err) if err.is_recoverable() => continue,
                other => return other,
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

    /// Consume the reader and return the inner stream.
    ///
    /// Buffered results and any partial frame are dropped.
    pub fn into_inner(self) -> T {
        self.inner
    }

    /// Update maximum frame size for subsequent frame decoding.
    pub fn set_max_frame_size(&mut self, max_frame_size: usize) {
        self.decoder.set_max_frame_size(max_frame_size);
    }

    /// Current frame reader configuration.
    pub fn config(&self) -> &FrameConfig {
        self.decoder.config()
    }
}

impl<T: Read> Iterator for FrameReader<T> {
    type Item = Result<Frame>;

    /// Yields frames and rejections until the stream closes.
    fn next(&mut self) -> Option<Self::Item> {
        match self.read_frame() {
            Err(FrameError::ConnectionClosed) => None,
            other => Some(other),
        }
    }
}
