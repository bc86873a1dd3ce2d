use std::fmt;
use std::io;

use ibclink_channel::ChannelError;
use ibclink_exchange::ExchangeError;
use ibclink_frame::FrameError;

pub const SUCCESS: i32 = 0;
pub const TRANSPORT_ERROR: i32 = 3;
pub const PERMISSION_DENIED: i32 = 50;
pub const DATA_INVALID: i32 = 60;
pub const USAGE: i32 = 64;
pub const TIMEOUT: i32 = 124;
pub const INTERNAL: i32 = 125;

pub type CliResult<T> = Result<T, CliError>;

#[derive(Debug)]
pub struct CliError {
    pub code: i32,
    pub message: String,
}

impl CliError {
    pub fn new(code: i32, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    pub fn usage(message: impl Into<String>) -> Self {
        Self::new(USAGE, message)
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for CliError {}

pub fn io_error(context: &str, err: io::Error) -> CliError {
    let code = match err.kind() {
        io::ErrorKind::PermissionDenied => PERMISSION_DENIED,
        io::ErrorKind::TimedOut | io::ErrorKind::WouldBlock => TIMEOUT,
        io::ErrorKind::NotFound
        | io::ErrorKind::BrokenPipe
        | io::ErrorKind::NotConnected
        | io::ErrorKind::UnexpectedEof => TRANSPORT_ERROR,
        _ => INTERNAL,
    };
    CliError::new(code, format!("{context}: {err}"))
}

pub fn channel_error(context: &str, err: ChannelError) -> CliError {
    match err {
        ChannelError::Write(source) | ChannelError::Read(source) => io_error(context, source),
        ChannelError::Timeout { .. } => CliError::new(TIMEOUT, format!("{context}: {err}")),
        other => CliError::new(TRANSPORT_ERROR, format!("{context}: {other}")),
    }
}

pub fn frame_error(context: &str, err: FrameError) -> CliError {
    CliError::new(DATA_INVALID, format!("{context}: {err}"))
}

pub fn exchange_error(context: &str, err: ExchangeError) -> CliError {
    match err {
        ExchangeError::Encode(err) => frame_error(context, err),
        ExchangeError::ChannelWrite(err) | ExchangeError::ChannelRead(err) => {
            channel_error(context, err)
        }
        ExchangeError::ChannelTimeout { .. } => {
            CliError::new(TIMEOUT, format!("{context}: {err}"))
        }
        ExchangeError::ReplyMalformed(_) => {
            CliError::new(DATA_INVALID, format!("{context}: {err}"))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn timeout_maps_to_timeout_code() {
        let err = exchange_error(
            "exchange failed",
            ExchangeError::ChannelTimeout {
                expected: 12,
                received: 0,
                timeout: None,
            },
        );
        assert_eq!(err.code, TIMEOUT);
        assert!(err.message.starts_with("exchange failed: reply timed out"));
    }

    #[test]
    fn encode_and_malformed_map_to_data_invalid() {
        let out_of_range = FrameError::FieldOutOfRange {
            field: "attn",
            value: 0x1F,
            max: 0xF,
        };
        assert_eq!(
            exchange_error("x", ExchangeError::Encode(out_of_range)).code,
            DATA_INVALID
        );
        let short = FrameError::FrameTooShort { len: 1 };
        assert_eq!(
            exchange_error("x", ExchangeError::ReplyMalformed(short)).code,
            DATA_INVALID
        );
    }

    #[test]
    fn device_fault_maps_to_transport_error() {
        let err = exchange_error(
            "x",
            ExchangeError::ChannelRead(ChannelError::Read(io::Error::from(
                io::ErrorKind::BrokenPipe,
            ))),
        );
        assert_eq!(err.code, TRANSPORT_ERROR);
    }

    #[test]
    fn disconnect_maps_to_transport_error() {
        let err = channel_error("exchange failed", ChannelError::Disconnected);
        assert_eq!(err.code, TRANSPORT_ERROR);
        assert_eq!(err.message, "exchange failed: channel disconnected");
        assert_eq!(
            exchange_error(
                "x",
                ExchangeError::ChannelRead(ChannelError::Disconnected)
            )
            .code,
            TRANSPORT_ERROR
        );
    }
}
