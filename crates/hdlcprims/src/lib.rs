//! Self-synchronizing HDLC-style framing for serial byte streams.
//!
//! hdlcprims encodes discrete messages into flag-delimited, byte-stuffed
//! frames protected by a CRC-32, and decodes them back out of a noisy byte
//! stream, resynchronizing after any corrupted or truncated frame.
//!
//! # Crate Structure
//!
//! - [`frame`] — Escaping, FCS, control octets, encoder, decoder state
//!   machine, and `Read`/`Write` adapters
//! - `frame::framed` — `tokio_util::codec` integration (behind `async` feature)

/// Re-export frame types.
pub mod frame {
    pub use hdlcprims_frame::*;
}
