//! Low-level protocol primitives: reserved bytes, byte stuffing, and the
//! frame check sequence.

use bytes::{BufMut, BytesMut};

use crate::error::DecodeError;

/// Delimits frames on the wire.
pub const FLAG: u8 = 0x7E;

/// Precedes an escaped byte inside a frame.
pub const ESCAPE: u8 = 0x7D;

/// The only bytes allowed after an [`ESCAPE`].
pub const VALID_ESCAPED_BYTES: [u8; 2] = [escape_value(ESCAPE), escape_value(FLAG)];

/// Size of the frame check sequence in bytes.
pub const FCS_SIZE: usize = 4;

/// Escapes or unescapes a byte. The transform is its own inverse.
pub const fn escape_value(byte: u8) -> u8 {
    byte ^ 0x20
}

/// Returns true if `byte` must be escaped inside a frame.
pub const fn needs_escape(byte: u8) -> bool {
    byte == FLAG || byte == ESCAPE
}

/// Append `src` to `dst`, escaping every reserved byte.
pub fn escape_into(src: &[u8], dst: &mut BytesMut) {
    dst.reserve(src.len());
    for &byte in src {
        if needs_escape(byte) {
            dst.put_u8(ESCAPE);
            dst.put_u8(escape_value(byte));
        } else {
            dst.put_u8(byte);
        }
    }
}

/// Recover the original byte from the one that followed an [`ESCAPE`].
pub fn unescape_byte(byte: u8) -> Result<u8, DecodeError> {
    if VALID_ESCAPED_BYTES.contains(&byte) {
        Ok(escape_value(byte))
    } else {
        Err(DecodeError::MalformedEscape)
    }
}

/// Reverse [`escape_into`] over a complete escaped region.
///
/// The input must not contain delimiters. A trailing [`ESCAPE`] is malformed.
pub fn unescape(src: &[u8]) -> Result<Vec<u8>, DecodeError> {
    let mut out = Vec::with_capacity(src.len());
    let mut bytes = src.iter().copied();
    while let Some(byte) = bytes.next() {
        if byte == ESCAPE {
            let escaped = bytes.next().ok_or(DecodeError::MalformedEscape)?;
            out.push(unescape_byte(escaped)?);
        } else {
            out.push(byte);
        }
    }
    Ok(out)
}

/// Incremental CRC-32 frame check sequence.
#[derive(Debug, Clone, Default)]
pub struct Fcs {
    hasher: crc32fast::Hasher,
}

impl Fcs {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn update(&mut self, data: &[u8]) {
        self.hasher.update(data);
    }

    /// The FCS as it appears on the wire (least-significant byte first).
    pub fn finalize(self) -> [u8; FCS_SIZE] {
        self.hasher.finalize().to_le_bytes()
    }
}

/// CRC-32 of `data`, least-significant byte first.
pub fn compute_fcs(data: &[u8]) -> [u8; FCS_SIZE] {
    let mut fcs = Fcs::new();
    fcs.update(data);
    fcs.finalize()
}
