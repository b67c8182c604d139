use bytes::{BufMut, Bytes, BytesMut};

use crate::address::{encoded_address_size, EncodedAddress, MAX_ADDRESS_SIZE};
use crate::control::ControlField;
use crate::protocol::{escape_into, needs_escape, Fcs, FCS_SIZE, FLAG};

/// Smallest valid frame content: address (1) + control (1) + FCS (4).
pub const MIN_FRAME_SIZE: usize = 1 + 1 + FCS_SIZE;

/// Default maximum unescaped frame content: 64 KiB.
pub const DEFAULT_MAX_FRAME_SIZE: usize = 64 * 1024;

/// A decoded frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    /// The address the frame was sent to.
    pub address: u64,
    /// The raw control octet.
    pub control: u8,
    /// The frame payload.
    pub payload: Bytes,
}

impl Frame {
    /// Create a new frame.
    pub fn new(address: u64, control: u8, payload: impl Into<Bytes>) -> Self {
        Self {
            address,
            control,
            payload: payload.into(),
        }
    }

    /// Create an unnumbered information frame.
    pub fn ui(address: u64, payload: impl Into<Bytes>) -> Self {
        Self::new(
            address,
            ControlField::unnumbered_information().octet(),
            payload,
        )
    }

    /// The control octet as a typed field.
    pub fn control_field(&self) -> ControlField {
        ControlField::from_raw(self.control)
    }

    /// Size of address + control + payload + FCS before escaping.
    pub fn content_size(&self) -> usize {
        content_size(self.address, self.payload.len())
    }

    /// Exact number of bytes this frame occupies on the wire.
    pub fn wire_size(&self) -> usize {
        let address = EncodedAddress::new(self.address);
        let mut fcs = Fcs::new();
        fcs.update(address.as_slice());
        fcs.update(&[self.control]);
        fcs.update(&self.payload);
        let escaped = address
            .as_slice()
            .iter()
            .chain(std::iter::once(&self.control))
            .chain(self.payload.iter())
            .chain(fcs.finalize().iter())
            .map(|&byte| if needs_escape(byte) { 2 } else { 1 })
            .sum::<usize>();
        escaped + 2
    }
}

pub(crate) fn content_size(address: u64, payload_len: usize) -> usize {
    encoded_address_size(address) + 1 + payload_len + FCS_SIZE
}

/// Worst-case wire size of a frame carrying `payload_len` bytes, assuming
/// every content byte is escaped and the address takes its maximum size.
pub const fn max_encoded_frame_size(payload_len: usize) -> usize {
    2 + 2 * (MAX_ADDRESS_SIZE + 1 + payload_len + FCS_SIZE)
}

/// Encode a frame into the wire format.
///
/// Wire format:
/// ```text
/// ┌──────┬──────────────────────────────────────────────────┬──────┐
/// │ FLAG │ escaped( address │ control │ payload │ FCS )     │ FLAG │
/// │ 0x7E │          varint  │ 1B      │ n B     │ 4B LE     │ 0x7E │
/// └──────┴──────────────────────────────────────────────────┴──────┘
/// ```
///
/// The FCS is the CRC-32 of the unescaped address, control and payload.
pub fn encode_frame(address: u64, control: u8, payload: &[u8], dst: &mut BytesMut) {
    let address = EncodedAddress::new(address);
    let mut fcs = Fcs::new();
    fcs.update(address.as_slice());
    fcs.update(&[control]);
    fcs.update(payload);
    let fcs = fcs.finalize();

    dst.reserve(2 + address.len() + 1 + payload.len() + FCS_SIZE);
    dst.put_u8(FLAG);
    escape_into(address.as_slice(), dst);
    escape_into(&[control], dst);
    escape_into(payload, dst);
    escape_into(&fcs, dst);
    dst.put_u8(FLAG);
}

/// Encode a frame into a fresh buffer.
pub fn encode(address: u64, control: u8, payload: &[u8]) -> Bytes {
    let mut dst = BytesMut::new();
    encode_frame(address, control, payload, &mut dst);
    dst.freeze()
}

/// Encode an unnumbered information frame.
pub fn encode_ui_frame(address: u64, payload: &[u8], dst: &mut BytesMut) {
    encode_frame(
        address,
        ControlField::unnumbered_information().octet(),
        payload,
        dst,
    );
}

/// Configuration for the frame codec.
#[derive(Debug, Clone)]
pub struct FrameConfig {
    /// Maximum unescaped frame content (address, control, payload and FCS)
    /// in bytes. Default: 64 KiB.
    pub max_frame_size: usize,
}

impl Default for FrameConfig {
    fn default() -> Self {
        Self {
            max_frame_size: DEFAULT_MAX_FRAME_SIZE,
        }
    }
}
