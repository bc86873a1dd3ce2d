//! Blocking byte channel abstraction.
//!
//! The exchange layer never opens, configures or closes a transport. It is
//! handed something implementing [`ByteChannel`] and borrows it for the
//! duration of one write-then-read cycle.
//!
//! Two implementations are provided:
//! - [`IoChannel`] over any `Read + Write` stream (pipes, sockets, test doubles)
//! - [`SerialChannel`] over a serial port (behind the `serial` feature)

pub mod error;
pub mod io;
#[cfg(feature = "serial")]
pub mod serial;

pub use error::{ChannelError, Result};
pub use io::{ByteChannel, IoChannel};

#[cfg(feature = "serial")]
pub use serial::{
    list_ports, PortInfo, SerialChannel, SerialConfig, DEFAULT_BAUD_RATE, DEFAULT_TIMEOUT,
};
