//! Frame address encoding.
//!
//! Addresses are one-terminated varints, least-significant group first: each
//! byte carries seven address bits in its upper bits, and a set low bit marks
//! the final byte. Single-byte addresses (0..=127) therefore encode as
//! `address << 1 | 1`.

use crate::error::DecodeError;

/// Longest encoded address (a full `u64`).
pub const MAX_ADDRESS_SIZE: usize = 10;

/// Address reserved for RPC traffic by convention.
pub const DEFAULT_RPC_ADDRESS: u64 = 82;

/// Address reserved for plain-text log output by convention.
pub const DEFAULT_LOG_ADDRESS: u64 = 1;

/// An address in its on-wire (unescaped) form.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EncodedAddress {
    buf: [u8; MAX_ADDRESS_SIZE],
    len: usize,
}

impl EncodedAddress {
    pub fn new(address: u64) -> Self {
        let mut buf = [0u8; MAX_ADDRESS_SIZE];
        let mut len = 0;
        let mut remaining = address;
        loop {
            let group = ((remaining & 0x7F) as u8) << 1;
            remaining >>= 7;
            if remaining == 0 {
                buf[len] = group | 1;
                len += 1;
                break;
            }
            buf[len] = group;
            len += 1;
        }
        Self { buf, len }
    }

    pub fn as_slice(&self) -> &[u8] {
        &self.buf[..self.len]
    }

    #[allow(clippy::len_without_is_empty)]
    pub fn len(&self) -> usize {
        self.len
    }
}

impl AsRef<[u8]> for EncodedAddress {
    fn as_ref(&self) -> &[u8] {
        self.as_slice()
    }
}

/// Number of bytes `address` occupies before escaping.
pub fn encoded_address_size(address: u64) -> usize {
    EncodedAddress::new(address).len()
}

/// Decode an address from the start of `data`.
///
/// Returns the address and the number of bytes it occupied.
pub fn decode_address(data: &[u8]) -> Result<(u64, usize), DecodeError> {
    let mut address = 0u64;
    for (i, &byte) in data.iter().take(MAX_ADDRESS_SIZE).enumerate() {
        let group = u64::from(byte >> 1);
        // The tenth byte holds only the top bit of a u64.
        if i == MAX_ADDRESS_SIZE - 1 && group > 1 {
            return Err(DecodeError::BadAddress);
        }
        address |= group << (7 * i);
        if byte & 1 == 1 {
            return Ok((address, i + 1));
        }
    }
    Err(DecodeError::BadAddress)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_byte_addresses() {
        assert_eq!(EncodedAddress::new(0).as_slice(), &[0x01]);
        assert_eq!(EncodedAddress::new(DEFAULT_LOG_ADDRESS).as_slice(), &[0x03]);
        assert_eq!(EncodedAddress::new(DEFAULT_RPC_ADDRESS).as_slice(), &[0xA5]);
        assert_eq!(EncodedAddress::new(127).as_slice(), &[0xFF]);
    }

    #[test]
    fn multi_byte_addresses() {
        assert_eq!(EncodedAddress::new(128).as_slice(), &[0x00, 0x03]);
        assert_eq!(encoded_address_size(u64::MAX), MAX_ADDRESS_SIZE);
    }

    #[test]
    fn decode_roundtrips() {
        for address in [0, 1, 62, 63, 82, 127, 128, 16_383, 16_384, u32::MAX as u64, u64::MAX] {
            let encoded = EncodedAddress::new(address);
            assert_eq!(
                decode_address(encoded.as_slice()),
                Ok((address, encoded.len()))
            );
        }
    }

    #[test]
    fn decode_stops_at_terminator() {
        assert_eq!(decode_address(&[0xA5, 0x03, 0xFF]), Ok((82, 1)));
    }

    #[test]
    fn unterminated_address_is_rejected() {
        assert_eq!(decode_address(&[0x02, 0x04]), Err(DecodeError::BadAddress));
        assert_eq!(decode_address(&[]), Err(DecodeError::BadAddress));
    }

    #[test]
    fn overflowing_address_is_rejected() {
        let mut bytes = [0xFEu8; MAX_ADDRESS_SIZE];
        bytes[MAX_ADDRESS_SIZE - 1] = 0x05;
        assert_eq!(decode_address(&bytes), Err(DecodeError::BadAddress));
        assert_eq!(decode_address(&[0x00; 11]), Err(DecodeError::BadAddress));
    }
}
