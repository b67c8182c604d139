/// Reasons a candidate frame is rejected by the decoder.
///
/// Every variant is local to a single frame: the decoder discards the
/// offending bytes and keeps scanning for the next flag.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DecodeError {
    /// An escape byte was followed by something other than 0x5D or 0x5E.
    #[error("malformed escape sequence")]
    MalformedEscape,

    /// The frame is shorter than address + control + FCS.
    #[error("frame too short ({len} bytes, min {min})")]
    FrameTooShort { len: usize, min: usize },

    /// The received FCS does not match the one computed over the content.
    #[error("frame check sequence mismatch (expected {expected:#010x}, received {actual:#010x})")]
    ChecksumMismatch { expected: u32, actual: u32 },

    /// The address field is unterminated or does not fit in 64 bits.
    #[error("invalid frame address")]
    BadAddress,

    /// The unescaped frame content grew past the configured maximum.
    #[error("frame too long (max {max} bytes)")]
    FrameTooLong { max: usize },
}

/// Errors that can occur while reading or writing frames on a byte stream.
#[derive(Debug, thiserror::Error)]
pub enum FrameError {
    /// A candidate frame was rejected. The stream is still usable.
    #[error("frame rejected: {0}")]
    Decode(#[from] DecodeError),

    /// The frame content exceeds the configured maximum size.
    #[error("frame too large ({size} bytes, max {max})")]
    FrameTooLarge { size: usize, max: usize },

    /// An I/O error occurred while reading or writing frames.
    #[error("frame I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The byte stream ended.
    #[error("connection closed")]
    ConnectionClosed,
}

impl FrameError {
    /// Returns true if the stream can keep producing frames after this error.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, FrameError::Decode(_))
    }
}

pub type Result<T> = std::result::Result<T, FrameError>;
