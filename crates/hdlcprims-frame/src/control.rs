//! Control octet construction.
//!
//! The two low bits `0b11` mark an unnumbered frame; the remaining bits carry
//! the frame type. Numbered and supervisory frames are not defined here.

/// Discriminator bits shared by every unnumbered frame.
pub const UNNUMBERED_BITS: u8 = 0x03;

/// Unnumbered frame types.
#[non_exhaustive]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameType {
    /// Unnumbered information (UI): a plain datagram.
    UnnumberedInformation,
}

impl FrameType {
    /// The type bits OR-ed into the control octet.
    pub const fn bits(self) -> u8 {
        match self {
            FrameType::UnnumberedInformation => 0x00,
        }
    }
}

/// A control octet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ControlField(u8);

impl ControlField {
    /// Wrap a raw control octet as received on the wire.
    pub const fn from_raw(octet: u8) -> Self {
        Self(octet)
    }

    /// Build the control octet for an unnumbered frame of `frame_type`.
    pub const fn unnumbered(frame_type: FrameType) -> Self {
        Self(UNNUMBERED_BITS | frame_type.bits())
    }

    /// Control octet for an unnumbered information frame (`0x03`).
    pub const fn unnumbered_information() -> Self {
        Self::unnumbered(FrameType::UnnumberedInformation)
    }

    pub const fn octet(self) -> u8 {
        self.0
    }

    /// Returns true if the low bits mark an unnumbered frame.
    pub const fn is_unnumbered(self) -> bool {
        self.0 & UNNUMBERED_BITS == UNNUMBERED_BITS
    }

    /// The unnumbered frame type, if this octet names a known one.
    pub fn frame_type(self) -> Option<FrameType> {
        if !self.is_unnumbered() {
            return None;
        }
        match self.0 & !UNNUMBERED_BITS {
            0x00 => Some(FrameType::UnnumberedInformation),
            _ => None,
        }
    }

    /// Short display name: `UI`, `U` for other unnumbered octets, or `OTHER`.
    pub fn name(self) -> &'static str {
        match self.frame_type() {
            Some(FrameType::UnnumberedInformation) => "UI",
            None if self.is_unnumbered() => "U",
            None => "OTHER",
        }
    }
}

impl From<ControlField> for u8 {
    fn from(control: ControlField) -> Self {
        control.0
    }
}

impl From<FrameType> for ControlField {
    fn from(frame_type: FrameType) -> Self {
        Self::unnumbered(frame_type)
    }
}
