use bytes::BytesMut;
use ibclink_channel::ByteChannel;
use ibclink_frame::{decode_bytes, encode_into, ControlFrame, EncodeMode, HEADER_SIZE};
use tracing::debug;

use crate::error::{ExchangeError, Result};

/// Reply length the peer has been observed to send.
pub const DEFAULT_REPLY_SIZE: usize = 12;

/// Per-exchanger settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExchangeConfig {
    /// Bytes to read back after each request.
    pub reply_size: usize,
    /// How out-of-range request header values are handled.
    pub encode_mode: EncodeMode,
}

impl Default for ExchangeConfig {
    fn default() -> Self {
        Self {
            reply_size: DEFAULT_REPLY_SIZE,
            encode_mode: EncodeMode::Lenient,
        }
    }
}

/// Where an exchange currently stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExchangeState {
    Idle,
    /// Request written, reply not yet fully read.
    AwaitingReply,
}

/// Drives request/response cycles over a borrowed channel.
///
/// Holding `&mut` to the channel keeps at most one exchange in flight. The
/// channel is never closed here.
pub struct Exchanger<'a, C: ?Sized> {
    channel: &'a mut C,
    config: ExchangeConfig,
    state: ExchangeState,
    buf: BytesMut,
}

impl<'a, C: ByteChannel + ?Sized> Exchanger<'a, C> {
    pub fn new(channel: &'a mut C) -> Self {
        Self::with_config(channel, ExchangeConfig::default())
    }

    pub fn with_config(channel: &'a mut C, config: ExchangeConfig) -> Self {
        Self {
            channel,
            config,
            state: ExchangeState::Idle,
            buf: BytesMut::with_capacity(HEADER_SIZE + 8),
        }
    }

    pub fn config(&self) -> &ExchangeConfig {
        &self.config
    }

    pub fn state(&self) -> ExchangeState {
        self.state
    }

    /// Send `frame` and read back a reply of the configured size.
    pub fn exchange(&mut self, frame: &ControlFrame) -> Result<ControlFrame> {
        self.exchange_sized(frame, self.config.reply_size)
    }

    /// Send `frame` and read back exactly `reply_size` bytes.
    pub fn exchange_sized(
        &mut self,
        frame: &ControlFrame,
        reply_size: usize,
    ) -> Result<ControlFrame> {
        self.request(frame)?;
        self.receive_sized(reply_size)
    }

    /// First half of an exchange: write `frame` and move to
    /// [`ExchangeState::AwaitingReply`].
    ///
    /// The state is `Idle` when encoding or writing fails.
    pub fn request(&mut self, frame: &ControlFrame) -> Result<usize> {
        self.state = ExchangeState::Idle;
        let written = self.send_frame(frame)?;
        self.state = ExchangeState::AwaitingReply;
        Ok(written)
    }

    /// Second half of an exchange: read a reply of the configured size.
    pub fn receive(&mut self) -> Result<ControlFrame> {
        self.receive_sized(self.config.reply_size)
    }

    /// Read exactly `reply_size` bytes and decode them.
    ///
    /// The state is back to `Idle` afterwards, whether or not a reply was
    /// decoded.
    pub fn receive_sized(&mut self, reply_size: usize) -> Result<ControlFrame> {
        let reply = self.read_reply(reply_size);
        self.state = ExchangeState::Idle;
        reply
    }

    /// Send `frame` without waiting for a reply.
    pub fn send_frame(&mut self, frame: &ControlFrame) -> Result<usize> {
        self.buf.clear();
        encode_into(frame, self.config.encode_mode, &mut self.buf)
            .map_err(ExchangeError::Encode)?;
        debug!(header = frame.header_word(), len = self.buf.len(), "sending frame");
        send_only(&mut *self.channel, &self.buf)
    }

    fn read_reply(&mut self, reply_size: usize) -> Result<ControlFrame> {
        let bytes = self
            .channel
            .read(reply_size)
            .map_err(ExchangeError::from_read)?;
        let reply = decode_bytes(bytes).map_err(ExchangeError::ReplyMalformed)?;
        debug!(
            attn = reply.attn,
            packet_id = reply.packet_id,
            data_length = reply.data_length,
            payload_len = reply.payload.len(),
            "received reply"
        );
        Ok(reply)
    }
}

/// Run one exchange: encode `frame`, write it, read `reply_size` bytes, decode.
pub fn exchange<C: ByteChannel + ?Sized>(
    channel: &mut C,
    frame: &ControlFrame,
    reply_size: usize,
) -> Result<ControlFrame> {
    Exchanger::new(channel).exchange_sized(frame, reply_size)
}

/// Write raw bytes with no read-back.
pub fn send_only<C: ByteChannel + ?Sized>(channel: &mut C, bytes: &[u8]) -> Result<usize> {
    let written = channel.write(bytes).map_err(ExchangeError::ChannelWrite)?;
    channel.flush().map_err(ExchangeError::ChannelWrite)?;
    Ok(written)
}
