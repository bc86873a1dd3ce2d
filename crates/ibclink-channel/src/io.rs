use std::io::{ErrorKind, Read, Write};
use std::time::{Duration, Instant};

use bytes::{Bytes, BytesMut};
use tracing::trace;

use crate::error::{ChannelError, Result};

/// A duplex, blocking byte transport.
///
/// `read` either returns exactly `n` bytes or fails; a short read is only
/// ever reported through [`ChannelError::Timeout`].
pub trait ByteChannel {
    /// Transmit all of `bytes`, returning the number written.
    fn write(&mut self, bytes: &[u8]) -> Result<usize>;

    /// Block until exactly `n` bytes have arrived or the channel deadline fires.
    fn read(&mut self, n: usize) -> Result<Bytes>;

    /// Flush any bytes buffered by the transport.
    fn flush(&mut self) -> Result<()> {
        Ok(())
    }
}

impl<C: ByteChannel + ?Sized> ByteChannel for &mut C {
    fn write(&mut self, bytes: &[u8]) -> Result<usize> {
        (**self).write(bytes)
    }

    fn read(&mut self, n: usize) -> Result<Bytes> {
        (**self).read(n)
    }

    fn flush(&mut self) -> Result<()> {
        (**self).flush()
    }
}

impl<C: ByteChannel + ?Sized> ByteChannel for Box<C> {
    fn write(&mut self, bytes: &[u8]) -> Result<usize> {
        (**self).write(bytes)
    }

    fn read(&mut self, n: usize) -> Result<Bytes> {
        (**self).read(n)
    }

    fn flush(&mut self) -> Result<()> {
        (**self).flush()
    }
}

/// Adapts any `Read + Write` stream into a [`ByteChannel`].
///
/// Partial reads and writes are looped internally. When a timeout is
/// recorded it bounds the whole `read(n)`, not each inner read: once it has
/// passed, or the stream reports `TimedOut`/`WouldBlock`, the read fails with
/// [`ChannelError::Timeout`] and the bytes received so far are dropped.
/// Writes never retry `WouldBlock`; a stalled stream is a write fault.
pub struct IoChannel<T> {
    inner: T,
    timeout: Option<Duration>,
}

impl<T: Read + Write> IoChannel<T> {
    /// Wrap a stream whose read deadline is unknown to the channel.
    pub fn new(inner: T) -> Self {
        Self {
            inner,
            timeout: None,
        }
    }

    /// Wrap a stream and bound every `read(n)` by `timeout`.
    ///
    /// The stream's own per-call timeout should be no longer than this, or a
    /// silent peer can hold a single inner read past the deadline.
    pub fn with_timeout(inner: T, timeout: Duration) -> Self {
        Self {
            inner,
            timeout: Some(timeout),
        }
    }

    /// The read deadline recorded for this channel.
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout
    }

    /// Borrow the underlying stream.
    pub fn get_ref(&self) -> &T {
        &self.inner
    }

    /// Mutably borrow the underlying stream.
    pub fn get_mut(&mut self) -> &mut T {
        &mut self.inner
    }

    /// Consume the channel and return the inner stream.
    pub fn into_inner(self) -> T {
        self.inner
    }
}

impl<T: Read + Write> IoChannel<T> {
    /// Read exactly `n` bytes, treating the recorded timeout as one deadline
    /// for the whole call.
    ///
    /// `before_read` runs ahead of every inner read with the time left until
    /// the deadline, so streams that support it can shorten their own wait.
    pub(crate) fn read_within<F>(&mut self, n: usize, mut before_read: F) -> Result<Bytes>
    where
        F: FnMut(&mut T, Duration) -> std::io::Result<()>,
    {
        let deadline = self.timeout.map(|timeout| Instant::now() + timeout);
        let mut buf = BytesMut::zeroed(n);
        let mut filled = 0usize;
        while filled < n {
            if let Some(deadline) = deadline {
                let remaining = deadline.saturating_duration_since(Instant::now());
                if remaining.is_zero() {
                    return Err(self.timed_out(n, filled));
                }
                before_read(&mut self.inner, remaining).map_err(ChannelError::Read)?;
            }
            match self.inner.read(&mut buf[filled..]) {
                Ok(0) => return Err(ChannelError::Disconnected),
                Ok(read) => filled += read,
                Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                Err(err) if matches!(err.kind(), ErrorKind::TimedOut | ErrorKind::WouldBlock) => {
                    return Err(self.timed_out(n, filled));
                }
                Err(err) => return Err(ChannelError::Read(err)),
            }
        }
        trace!(len = n, "channel read complete");
        Ok(buf.freeze())
    }

    fn timed_out(&self, expected: usize, received: usize) -> ChannelError {
        ChannelError::Timeout {
            expected,
            received,
            timeout: self.timeout,
        }
    }
}

impl<T: Read + Write> ByteChannel for IoChannel<T> {
    fn write(&mut self, bytes: &[u8]) -> Result<usize> {
        let mut offset = 0usize;
        while offset < bytes.len() {
            match self.inner.write(&bytes[offset..]) {
                Ok(0) => return Err(ChannelError::Disconnected),
                Ok(n) => offset += n,
                Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                Err(err) => return Err(ChannelError::Write(err)),
            }
        }
        trace!(len = offset, "channel write complete");
        Ok(offset)
    }

    fn read(&mut self, n: usize) -> Result<Bytes> {
        self.read_within(n, |_, _| Ok(()))
    }

    fn flush(&mut self) -> Result<()> {
        loop {
            match self.inner.flush() {
                Ok(()) => return Ok(()),
                Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                Err(err) => return Err(ChannelError::Write(err)),
            }
        }
    }
}

impl<T> std::fmt::Debug for IoChannel<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IoChannel")
            .field("timeout", &self.timeout)
            .finish_non_exhaustive()
    }
}
