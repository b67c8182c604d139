//! Frames sent through a noisy in-memory link still decode in order.
//!
//! Run with:
//!   cargo run --example loopback

use std::io::Cursor;

use hdlcprims::frame::{FrameError, FrameReader, FrameWriter, DEFAULT_LOG_ADDRESS, DEFAULT_RPC_ADDRESS};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let mut writer = FrameWriter::new(Vec::new());
    writer.send_ui(DEFAULT_LOG_ADDRESS, b"boot complete")?;
    writer.send_ui(DEFAULT_RPC_ADDRESS, &[0x7E, 0x7D, 0x00, 0x01])?;
    writer.send_ui(DEFAULT_LOG_ADDRESS, b"heartbeat")?;
    let mut wire = writer.into_inner();

    // Flip a payload bit in the second frame and prepend line noise.
    let second_start = wire
        .iter()
        .enumerate()
        .skip(1)
        .find(|(_, b)| **b == 0x7E)
        .map(|(i, _)| i + 1)
        .unwrap_or(0);
    if let Some(byte) = wire.get_mut(second_start + 3) {
        *byte ^= 0x04;
    }
    let mut stream = b"\x00\xff garbage".to_vec();
    stream.extend_from_slice(&wire);

    let reader = FrameReader::new(Cursor::new(stream));
    for result in reader {
        match result {
            Ok(frame) => println!(
                "address={} control={:#04x} payload={:?}",
                frame.address, frame.control, frame.payload
            ),
            Err(FrameError::Decode(err)) => println!("rejected: {err}"),
            Err(err) => return Err(err.into()),
        }
    }

    Ok(())
}
