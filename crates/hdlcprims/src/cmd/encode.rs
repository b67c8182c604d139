use std::fs;

use bytes::Bytes;
use hdlcprims_frame::{encode, Frame, FrameError};

use crate::cmd::EncodeArgs;
use crate::exit::{frame_error, io_error, CliError, CliResult, DATA_INVALID, SUCCESS, USAGE};
use crate::output::{print_encoded, OutputFormat};

pub fn run(args: EncodeArgs, format: OutputFormat) -> CliResult<i32> {
    let payload = resolve_payload(&args)?;
    let frame = Frame::new(args.address, args.control, payload);
    let wire = encode_checked(&frame, args.max_frame_size)?;

    if let Some(path) = &args.output {
        fs::write(path, &wire)
            .map_err(|err| io_error(&format!("failed writing {}", path.display()), err))?;
        tracing::info!(
            address = frame.address,
            wire_size = wire.len(),
            path = %path.display(),
            "wrote frame"
        );
        // The frame bytes went to the file; stdout only gets a summary.
        if matches!(format, OutputFormat::Raw) {
            return Ok(SUCCESS);
        }
    }

    print_encoded(&frame, &wire, format);
    Ok(SUCCESS)
}

fn encode_checked(frame: &Frame, max_frame_size: usize) -> CliResult<Bytes> {
    let size = frame.content_size();
    if size > max_frame_size {
        return Err(frame_error(
            "encode failed",
            FrameError::FrameTooLarge {
                size,
                max: max_frame_size,
            },
        ));
    }
    Ok(encode(frame.address, frame.control, &frame.payload))
}

fn resolve_payload(args: &EncodeArgs) -> CliResult<Vec<u8>> {
    if let Some(hex) = &args.hex {
        return parse_hex(hex)
            .map_err(|err| CliError::new(USAGE, format!("--hex is not valid hex: {err}")));
    }
    if let Some(data) = &args.data {
        return Ok(data.as_bytes().to_vec());
    }
    if let Some(path) = &args.file {
        return fs::read(path)
            .map_err(|err| io_error(&format!("failed reading {}", path.display()), err));
    }
    Ok(Vec::new())
}

/// Parse hex digits, ignoring whitespace.
fn parse_hex(input: &str) -> Result<Vec<u8>, String> {
    let digits = input
        .chars()
        .filter(|c| !c.is_ascii_whitespace())
        .map(|c| {
            c.to_digit(16)
                .map(|d| d as u8)
                .ok_or_else(|| format!("invalid digit {c:?}"))
        })
        .collect::<Result<Vec<u8>, String>>()?;

    if digits.len() % 2 != 0 {
        return Err("odd number of digits".to_string());
    }
    Ok(digits.chunks(2).map(|pair| (pair[0] << 4) | pair[1]).collect())
}
