use std::time::Duration;

use ibclink_channel::ChannelError;
use ibclink_frame::FrameError;

/// Errors that can occur during one exchange.
///
/// None of these are retried; the channel stays open and reusable.
#[derive(Debug, thiserror::Error)]
pub enum ExchangeError {
    /// The request frame could not be encoded (strict mode only).
    #[error("request encoding failed: {0}")]
    Encode(#[source] FrameError),

    /// The channel reported a fault while sending the request.
    #[error("channel write failed: {0}")]
    ChannelWrite(#[source] ChannelError),

    /// The channel reported a fault while receiving the reply.
    #[error("channel read failed: {0}")]
    ChannelRead(#[source] ChannelError),

    /// The full reply did not arrive before the channel deadline.
    #[error("reply timed out ({received} of {expected} bytes received)")]
    ChannelTimeout {
        expected: usize,
        received: usize,
        timeout: Option<Duration>,
    },

    /// The reply bytes could not be decoded into a frame.
    #[error("reply malformed: {0}")]
    ReplyMalformed(#[source] FrameError),
}

impl ExchangeError {
    pub fn is_timeout(&self) -> bool {
        matches!(self, ExchangeError::ChannelTimeout { .. })
    }

    pub(crate) fn from_read(err: ChannelError) -> Self {
        match err {
            ChannelError::Timeout {
                expected,
                received,
                timeout,
            } => ExchangeError::ChannelTimeout {
                expected,
                received,
                timeout,
            },
            other => ExchangeError::ChannelRead(other),
        }
    }
}

pub type Result<T> = std::result::Result<T, ExchangeError>;
