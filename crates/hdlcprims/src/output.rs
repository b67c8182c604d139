use std::fmt::Write as _;
use std::io::{IsTerminal, Write};
use std::time::{SystemTime, UNIX_EPOCH};

use clap::ValueEnum;
use comfy_table::{presets::UTF8_FULL, ContentArrangement, Table};
use hdlcprims_frame::{DecodeError, Frame, DEFAULT_LOG_ADDRESS, DEFAULT_RPC_ADDRESS};
use serde::Serialize;

#[derive(Clone, Debug, Copy, ValueEnum)]
pub enum OutputFormat {
    Json,
    Table,
    Pretty,
    Raw,
}

impl OutputFormat {
    pub fn default_for_stdout() -> Self {
        if std::io::stdout().is_terminal() {
            Self::Table
        } else {
            Self::Json
        }
    }
}

#[derive(Serialize)]
struct FrameOutput<'a> {
    schema_id: &'a str,
    address: u64,
    address_name: &'a str,
    control: u8,
    control_name: &'a str,
    payload_size: usize,
    payload: String,
    timestamp: String,
}

#[derive(Serialize)]
struct RejectionOutput<'a> {
    schema_id: &'a str,
    error: String,
    timestamp: String,
}

#[derive(Serialize)]
struct EncodedOutput<'a> {
    schema_id: &'a str,
    address: u64,
    control: u8,
    payload_size: usize,
    wire_size: usize,
    wire: String,
}

pub fn print_frame(frame: &Frame, format: OutputFormat) {
    match format {
        OutputFormat::Json => {
            let out = FrameOutput {
                schema_id: "https://schemas.3leaps.dev/hdlcprims/cli/v1/frame-decoded.schema.json",
                address: frame.address,
                address_name: address_name(frame.address),
                control: frame.control,
                control_name: frame.control_field().name(),
                payload_size: frame.payload.len(),
                payload: payload_preview(frame.payload.as_ref()),
                timestamp: now_unix_seconds(),
            };
            print_json(&out);
        }
        OutputFormat::Table => {
            let mut table = Table::new();
            table
                .load_preset(UTF8_FULL)
                .set_content_arrangement(ContentArrangement::Dynamic)
                .set_header(vec!["ADDRESS", "CONTROL", "SIZE", "PAYLOAD"])
                .add_row(vec![
                    format!("{} ({})", frame.address, address_name(frame.address)),
                    format!("{:#04x} ({})", frame.control, frame.control_field().name()),
                    frame.payload.len().to_string(),
                    payload_preview(frame.payload.as_ref()),
                ]);
            println!("{table}");
        }
        OutputFormat::Pretty => {
            println!(
                "address={} ({}) control={:#04x} ({}) size={} payload={}",
                frame.address,
                address_name(frame.address),
                frame.control,
                frame.control_field().name(),
                frame.payload.len(),
                payload_preview(frame.payload.as_ref())
            );
        }
        OutputFormat::Raw => {
            print_raw(frame.payload.as_ref());
        }
    }
}

pub fn print_rejection(err: &DecodeError, format: OutputFormat) {
    match format {
        OutputFormat::Json => {
            let out = RejectionOutput {
                schema_id: "https://schemas.3leaps.dev/hdlcprims/cli/v1/frame-rejected.schema.json",
                error: err.to_string(),
                timestamp: now_unix_seconds(),
            };
            print_json(&out);
        }
        OutputFormat::Table | OutputFormat::Pretty => {
            println!("rejected: {err}");
        }
        // Raw output carries payload bytes only.
        OutputFormat::Raw => {}
    }
}

pub fn print_encoded(frame: &Frame, wire: &[u8], format: OutputFormat) {
    match format {
        OutputFormat::Json => {
            let out = EncodedOutput {
                schema_id: "https://schemas.3leaps.dev/hdlcprims/cli/v1/frame-encoded.schema.json",
                address: frame.address,
                control: frame.control,
                payload_size: frame.payload.len(),
                wire_size: wire.len(),
                wire: to_hex(wire),
            };
            print_json(&out);
        }
        OutputFormat::Table => {
            let mut table = Table::new();
            table
                .load_preset(UTF8_FULL)
                .set_content_arrangement(ContentArrangement::Dynamic)
                .set_header(vec!["ADDRESS", "CONTROL", "SIZE", "WIRE"])
                .add_row(vec![
                    frame.address.to_string(),
                    format!("{:#04x}", frame.control),
                    wire.len().to_string(),
                    to_hex(wire),
                ]);
            println!("{table}");
        }
        OutputFormat::Pretty => println!("{}", to_hex(wire)),
        OutputFormat::Raw => print_raw(wire),
    }
}

pub fn print_raw(data: &[u8]) {
    let mut out = std::io::stdout();
    let _ = out.write_all(data);
    let _ = out.flush();
}

pub fn address_name(address: u64) -> &'static str {
    match address {
        DEFAULT_RPC_ADDRESS => "RPC",
        DEFAULT_LOG_ADDRESS => "LOG",
        _ => "USER",
    }
}

pub fn to_hex(data: &[u8]) -> String {
    let mut out = String::with_capacity(data.len() * 2);
    for byte in data {
        let _ = write!(out, "{byte:02x}");
    }
    out
}

fn print_json<T: Serialize>(value: &T) {
    println!(
        "{}",
        serde_json::to_string(value).unwrap_or_else(|_| "{}".to_string())
    );
}

fn payload_preview(payload: &[u8]) -> String {
    match std::str::from_utf8(payload) {
        Ok(text) => text.to_string(),
        Err(_) => format!("<binary {} bytes>", payload.len()),
    }
}

fn now_unix_seconds() -> String {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs().to_string())
        .unwrap_or_else(|_| "0".to_string())
}
