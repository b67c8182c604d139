//! Decode frames from an async byte stream with `FramedRead`.
//!
//! Run with:
//!   cargo run --example async-decode --features async

use futures_util::StreamExt;
use hdlcprims::frame::{encode, HdlcCodec};
use tokio_util::codec::FramedRead;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let mut wire = encode(1, 0x03, b"first").to_vec();
    wire.extend_from_slice(&[0x7E, 0x7D, 0x00, 0x7E]);
    wire.extend_from_slice(&encode(82, 0x03, b"second"));

    let mut frames = FramedRead::new(wire.as_slice(), HdlcCodec::new());
    while let Some(item) = frames.next().await {
        match item? {
            Ok(frame) => println!("address={} payload={:?}", frame.address, frame.payload),
            Err(err) => println!("rejected: {err}"),
        }
    }

    Ok(())
}
