use std::time::Duration;

/// Errors that can occur on a byte channel.
#[derive(Debug, thiserror::Error)]
pub enum ChannelError {
    /// The device reported a fault while transmitting.
    #[error("channel write failed: {0}")]
    Write(#[source] std::io::Error),

    /// The device reported a fault while receiving.
    #[error("channel read failed: {0}")]
    Read(#[source] std::io::Error),

    /// Fewer than the requested bytes arrived before the read deadline.
    #[error("channel read timed out ({received} of {expected} bytes received)")]
    Timeout {
        expected: usize,
        received: usize,
        timeout: Option<Duration>,
    },

    /// The underlying stream reached end-of-file or accepted zero bytes.
    #[error("channel disconnected")]
    Disconnected,

    /// Failed to open the serial port.
    #[cfg(feature = "serial")]
    #[error("failed to open {port}: {source}")]
    Open {
        port: String,
        source: serialport::Error,
    },

    /// Failed to enumerate serial ports.
    #[cfg(feature = "serial")]
    #[error("failed to enumerate serial ports: {0}")]
    Enumerate(#[source] serialport::Error),
}

impl ChannelError {
    /// True when the error came from the read deadline rather than a device fault.
    pub fn is_timeout(&self) -> bool {
        matches!(self, ChannelError::Timeout { .. })
    }
}

pub type Result<T> = std::result::Result<T, ChannelError>;
