//! Exchange bit-packed control frames with a device over a serial link.
//!
//! # Crate Structure
//!
//! - [`channel`]: Blocking byte channel abstraction (serial ports, any `Read + Write`)
//! - [`frame`]: Two-byte header control frame codec
//! - [`exchange`]: Single-frame request/response exchange and preset table
//!
//! ```no_run
//! use ibclink::channel::{SerialChannel, SerialConfig};
//! use ibclink::exchange::{exchange, PresetTable, DEFAULT_REPLY_SIZE};
//!
//! let mut port = SerialChannel::open(SerialConfig::new("/dev/ttyUSB0"))?;
//! let presets = PresetTable::default();
//! let request = &presets.find("Set regA=5").expect("preset exists").frame;
//! let reply = exchange(&mut port, request, DEFAULT_REPLY_SIZE)?;
//! println!("{reply}");
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

/// Re-export channel types.
pub mod channel {
    pub use ibclink_channel::*;
}

/// Re-export frame codec types.
pub mod frame {
    pub use ibclink_frame::*;
}

/// Re-export exchange types.
pub mod exchange {
    pub use ibclink_exchange::*;
}
