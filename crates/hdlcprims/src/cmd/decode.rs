use std::fs::File;
use std::io::{self, Read};
use std::path::Path;

use hdlcprims_frame::{DecodeError, Frame, FrameConfig, FrameError, FrameReader};

use crate::cmd::DecodeArgs;
use crate::exit::{frame_error, io_error, CliResult, DATA_INVALID, SUCCESS};
use crate::output::{print_frame, print_rejection, OutputFormat};

#[derive(Debug, Default, PartialEq, Eq)]
struct DecodeSummary {
    decoded: usize,
    printed: usize,
    rejected: usize,
}

pub fn run(args: DecodeArgs, format: OutputFormat) -> CliResult<i32> {
    let source = open_source(&args.path)?;
    let config = FrameConfig {
        max_frame_size: args.max_frame_size,
    };
    let reader = FrameReader::with_config(source, config);

    let summary = decode_stream(reader, &args, |event| match event {
        Event::Frame(frame) => print_frame(frame, format),
        Event::Rejected(err) => print_rejection(err, format),
    })?;

    tracing::info!(
        decoded = summary.decoded,
        printed = summary.printed,
        rejected = summary.rejected,
        "decode finished"
    );

    if args.fail_on_error && summary.rejected > 0 {
        return Ok(DATA_INVALID);
    }
    Ok(SUCCESS)
}

fn open_source(path: &Path) -> CliResult<Box<dyn Read>> {
    if path.as_os_str() == "-" {
        return Ok(Box::new(io::stdin().lock()));
    }
    let file = File::open(path)
        .map_err(|err| io_error(&format!("failed opening {}", path.display()), err))?;
    Ok(Box::new(file))
}

enum Event<'a> {
    Frame(&'a Frame),
    Rejected(&'a DecodeError),
}

fn decode_stream<R: Read>(
    mut reader: FrameReader<R>,
    args: &DecodeArgs,
    mut emit: impl FnMut(Event<'_>),
) -> CliResult<DecodeSummary> {
    let mut summary = DecodeSummary::default();

    loop {
        let frame = match reader.read_frame() {
            Ok(frame) => frame,
            Err(FrameError::Decode(err)) => {
                summary.rejected = summary.rejected.saturating_add(1);
                tracing::warn!(error = %err, "frame rejected");
                if args.show_errors {
                    emit(Event::Rejected(&err));
                }
                continue;
            }
            Err(FrameError::ConnectionClosed) => break,
            Err(err) => return Err(frame_error("read failed", err)),
        };
        summary.decoded = summary.decoded.saturating_add(1);

        if let Some(address) = args.address {
            if frame.address != address {
                tracing::debug!(address = frame.address, "skipping frame for other address");
                continue;
            }
        }

        if args.count.is_some_and(|count| summary.printed >= count) {
            break;
        }
        emit(Event::Frame(&frame));
        summary.printed = summary.printed.saturating_add(1);
        if args.count == Some(summary.printed) {
            break;
        }
    }

    Ok(summary)
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use hdlcprims_frame::{encode, FLAG};

    use super::*;

    fn args() -> DecodeArgs {
        DecodeArgs {
            path: "-".into(),
            address: None,
            count: None,
            max_frame_size: hdlcprims_frame::DEFAULT_MAX_FRAME_SIZE,
            show_errors: false,
            fail_on_error: false,
        }
    }

    fn run_on(bytes: Vec<u8>, args: &DecodeArgs) -> (DecodeSummary, Vec<String>) {
        let mut seen = Vec::new();
        let summary = decode_stream(FrameReader::new(Cursor::new(bytes)), args, |event| {
            seen.push(match event {
                Event::Frame(frame) => format!("{}:{:?}", frame.address, frame.payload),
                Event::Rejected(err) => format!("rejected:{err}"),
            })
        })
        .expect("decode should succeed");
        (summary, seen)
    }

    fn stream() -> Vec<u8> {
        let mut bytes = encode(1, 0x03, b"log").to_vec();
        bytes.extend_from_slice(&[FLAG, 0x10, FLAG]);
        bytes.extend_from_slice(&encode(82, 0x03, b"rpc"));
        bytes.extend_from_slice(&encode(1, 0x03, b"log2"));
        bytes
    }

    #[test]
    fn emits_frames_in_order() {
        let (summary, seen) = run_on(stream(), &args());
        assert_eq!(
            summary,
            DecodeSummary {
                decoded: 3,
                printed: 3,
                rejected: 1
            }
        );
        assert_eq!(seen, vec!["1:b\"log\"", "82:b\"rpc\"", "1:b\"log2\""]);
    }

    #[test]
    fn filters_by_address() {
        let args = DecodeArgs {
            address: Some(1),
            ..args()
        };
        let (summary, seen) = run_on(stream(), &args);
        assert_eq!(summary.printed, 2);
        assert_eq!(seen, vec!["1:b\"log\"", "1:b\"log2\""]);
    }

    #[test]
    fn stops_after_count() {
        let args = DecodeArgs {
            count: Some(1),
            ..args()
        };
        let (summary, seen) = run_on(stream(), &args);
        assert_eq!(summary.printed, 1);
        assert_eq!(seen.len(), 1);
    }

    #[test]
    fn zero_count_prints_nothing() {
        let args = DecodeArgs {
            count: Some(0),
            ..args()
        };
        let (summary, seen) = run_on(stream(), &args);
        assert_eq!(summary.printed, 0);
        assert!(seen.is_empty());
    }

    #[test]
    fn shows_rejections_when_asked() {
        let args = DecodeArgs {
            show_errors: true,
            ..args()
        };
        let (_, seen) = run_on(stream(), &args);
        assert_eq!(
            seen[1],
            format!(
                "rejected:{}",
                DecodeError::FrameTooShort {
                    len: 1,
                    min: hdlcprims_frame::MIN_FRAME_SIZE
                }
            )
        );
    }
}
