use std::time::Duration;

use clap::{Args, Subcommand};
use ibclink_channel::{SerialChannel, SerialConfig, DEFAULT_BAUD_RATE};
use ibclink_exchange::{ExchangeConfig, DEFAULT_REPLY_SIZE};
use ibclink_frame::{ControlFrame, EncodeMode};

use crate::exit::{channel_error, CliError, CliResult};
use crate::output::OutputFormat;
use crate::parse::{parse_duration, parse_field, parse_hex_bytes, parse_reply_size};

pub mod codec;
pub mod menu;
pub mod ports;
pub mod presets;
pub mod send;
pub mod version;

#[derive(Subcommand, Debug)]
pub enum Command {
    /// List serial ports on this host.
    Ports(PortsArgs),
    /// List the built-in request presets.
    Presets(PresetsArgs),
    /// Send one frame and print the decoded reply.
    Send(SendArgs),
    /// Interactive preset selector.
    Menu(MenuArgs),
    /// Encode a frame from field values without touching a port.
    Encode(EncodeArgs),
    /// Decode a hex frame without touching a port.
    Decode(DecodeArgs),
    /// Show version information.
    Version(VersionArgs),
}

pub fn run(command: Command, format: OutputFormat) -> CliResult<i32> {
    match command {
        Command::Ports(args) => ports::run(args, format),
        Command::Presets(args) => presets::run(args, format),
        Command::Send(args) => send::run(args, format),
        Command::Menu(args) => menu::run(args),
        Command::Encode(args) => codec::run_encode(args, format),
        Command::Decode(args) => codec::run_decode(args, format),
        Command::Version(args) => version::run(args),
    }
}

/// Serial link and exchange settings shared by port-using commands.
#[derive(Args, Debug, Clone)]
pub struct LinkArgs {
    /// Serial port to open (e.g. /dev/ttyUSB0, COM3).
    #[arg(env = "IBCLINK_PORT")]
    pub port: String,
    /// Line rate in baud.
    #[arg(long, default_value_t = DEFAULT_BAUD_RATE)]
    pub baud: u32,
    /// Read timeout for each reply (e.g. 1s, 500ms).
    #[arg(long, default_value = "1s", value_parser = parse_duration)]
    pub timeout: Duration,
    /// Number of reply bytes to read after each request.
    #[arg(
        long,
        default_value_t = DEFAULT_REPLY_SIZE,
        env = "IBCLINK_REPLY_SIZE",
        value_parser = parse_reply_size
    )]
    pub reply_size: usize,
    /// Reject out-of-range header fields instead of masking them.
    #[arg(long)]
    pub strict: bool,
}

impl LinkArgs {
    pub fn serial_config(&self) -> SerialConfig {
        SerialConfig {
            port: self.port.clone(),
            baud_rate: self.baud,
            timeout: self.timeout,
        }
    }

    pub fn exchange_config(&self) -> ExchangeConfig {
        ExchangeConfig {
            reply_size: self.reply_size,
            encode_mode: if self.strict {
                EncodeMode::Strict
            } else {
                EncodeMode::Lenient
            },
        }
    }

    pub fn open(&self) -> CliResult<SerialChannel> {
        SerialChannel::open(self.serial_config()).map_err(|err| channel_error("open failed", err))
    }
}

#[derive(Args, Debug)]
pub struct SendArgs {
    #[command(flatten)]
    pub link: LinkArgs,
    /// Preset to send, by name or index (see `presets`).
    #[arg(long, conflicts_with_all = ["attn", "ttl", "data_length", "packet_id", "payload"])]
    pub preset: Option<String>,
    /// Attention / target selector (0-15).
    #[arg(long, value_parser = parse_field, required_unless_present = "preset")]
    pub attn: Option<u8>,
    /// Hop/priority class (0-3).
    #[arg(long, value_parser = parse_field, required_unless_present = "preset")]
    pub ttl: Option<u8>,
    /// Declared payload length (0-7). Defaults to the payload size.
    #[arg(long, value_parser = parse_field)]
    pub data_length: Option<u8>,
    /// Opcode (0-31).
    #[arg(long, value_parser = parse_field, required_unless_present = "preset")]
    pub packet_id: Option<u8>,
    /// Payload bytes as hex (e.g. 00000005).
    #[arg(long)]
    pub payload: Option<String>,
    /// Do not wait for a reply.
    #[arg(long)]
    pub no_reply: bool,
}

#[derive(Args, Debug)]
pub struct MenuArgs {
    #[command(flatten)]
    pub link: LinkArgs,
}

#[derive(Args, Debug)]
pub struct EncodeArgs {
    /// Attention / target selector (0-15).
    #[arg(long, value_parser = parse_field)]
    pub attn: u8,
    /// Hop/priority class (0-3).
    #[arg(long, value_parser = parse_field)]
    pub ttl: u8,
    /// Declared payload length (0-7). Defaults to the payload size.
    #[arg(long, value_parser = parse_field)]
    pub data_length: Option<u8>,
    /// Opcode (0-31).
    #[arg(long, value_parser = parse_field)]
    pub packet_id: u8,
    /// Payload bytes as hex (e.g. 00000005).
    #[arg(long)]
    pub payload: Option<String>,
    /// Reject out-of-range header fields instead of masking them.
    #[arg(long)]
    pub strict: bool,
}

#[derive(Args, Debug)]
pub struct DecodeArgs {
    /// Frame bytes as hex (e.g. F28400000005).
    pub hex: String,
}

#[derive(Args, Debug, Default)]
pub struct PortsArgs {}

#[derive(Args, Debug, Default)]
pub struct PresetsArgs {}

#[derive(Args, Debug)]
pub struct VersionArgs {
    /// Show extended build provenance.
    #[arg(long)]
    pub extended: bool,
}

/// Build a frame from operator-supplied fields.
///
/// Without an explicit declared length, the payload size is declared.
pub fn frame_from_parts(
    attn: u8,
    ttl: u8,
    data_length: Option<u8>,
    packet_id: u8,
    payload: Option<&str>,
) -> CliResult<ControlFrame> {
    let payload = match payload {
        Some(hex) => parse_hex_bytes(hex).map_err(CliError::usage)?,
        None => Vec::new(),
    };
    Ok(match data_length {
        Some(declared) => ControlFrame::new(attn, ttl, declared, packet_id, payload),
        None => ControlFrame::with_payload(attn, ttl, packet_id, payload),
    })
}
