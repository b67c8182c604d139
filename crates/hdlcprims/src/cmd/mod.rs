use clap::{Args, Subcommand};
use std::path::PathBuf;

use hdlcprims_frame::DEFAULT_MAX_FRAME_SIZE;

use crate::exit::CliResult;
use crate::output::OutputFormat;

pub mod decode;
pub mod encode;
pub mod version;

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Encode a payload into a single wire frame.
    Encode(EncodeArgs),
    /// Decode frames from a byte stream and print them.
    Decode(DecodeArgs),
    /// Show version information.
    Version(VersionArgs),
}

pub fn run(command: Command, format: OutputFormat) -> CliResult<i32> {
    match command {
        Command::Encode(args) => encode::run(args, format),
        Command::Decode(args) => decode::run(args, format),
        Command::Version(args) => version::run(args),
    }
}

#[derive(Args, Debug)]
pub struct EncodeArgs {
    /// Frame address.
    #[arg(long, short = 'a')]
    pub address: u64,
    /// Control octet (decimal or 0x-prefixed hex). Default: UI frame.
    #[arg(long, short = 'c', default_value = "0x03", value_parser = parse_octet)]
    pub control: u8,
    /// Raw string payload.
    #[arg(long, conflicts_with_all = ["hex", "file"])]
    pub data: Option<String>,
    /// Hex-encoded payload.
    #[arg(long, conflicts_with_all = ["data", "file"])]
    pub hex: Option<String>,
    /// Read payload from file.
    #[arg(long, conflicts_with_all = ["data", "hex"])]
    pub file: Option<PathBuf>,
    /// Write the encoded frame to a file instead of stdout.
    #[arg(long, short = 'o')]
    pub output: Option<PathBuf>,
    /// Maximum frame size (address, control, payload and FCS) in bytes.
    #[arg(long, default_value_t = DEFAULT_MAX_FRAME_SIZE)]
    pub max_frame_size: usize,
}

#[derive(Args, Debug)]
pub struct DecodeArgs {
    /// Byte stream to read: a capture file, a device node, or `-` for stdin.
    #[arg(default_value = "-")]
    pub path: PathBuf,
    /// Only print frames sent to this address.
    #[arg(long, short = 'a')]
    pub address: Option<u64>,
    /// Exit after printing N frames.
    #[arg(long, value_parser = parse_count)]
    pub count: Option<usize>,
    /// Maximum frame size (address, control, payload and FCS) in bytes.
    #[arg(long, default_value_t = DEFAULT_MAX_FRAME_SIZE)]
    pub max_frame_size: usize,
    /// Print rejected frames alongside decoded ones.
    #[arg(long)]
    pub show_errors: bool,
    /// Exit with a data error if any frame was rejected.
    #[arg(long)]
    pub fail_on_error: bool,
}

#[derive(Args, Debug)]
pub struct VersionArgs {
    /// Show extended build provenance.
    #[arg(long)]
    pub extended: bool,
}

pub fn parse_octet(input: &str) -> Result<u8, String> {
    let input = input.trim();
    let parsed = match input
        .strip_prefix("0x")
        .or_else(|| input.strip_prefix("0X"))
    {
        Some(hex) => u8::from_str_radix(hex, 16),
        None => input.parse::<u8>(),
    };
    parsed.map_err(|_| format!("invalid octet: {input} (expected 0-255 or 0x00-0xff)"))
}

pub fn parse_count(input: &str) -> Result<usize, String> {
    match input.trim().parse::<usize>() {
        Ok(0) => Err("count must be at least 1".to_string()),
        Ok(count) => Ok(count),
        Err(_) => Err(format!("invalid count: {input}")),
    }
}
