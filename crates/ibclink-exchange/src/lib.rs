//! Request/response exchange over a byte channel.
//!
//! One exchange is one write followed by one fixed-size read:
//! encode the request, write it in full, read exactly `reply_size` bytes,
//! decode them. There is no session, sequencing or retry; every call is
//! independent and every failure is returned to the caller.

pub mod error;
pub mod exchanger;
pub mod presets;

pub use error::{ExchangeError, Result};
pub use exchanger::{
    exchange, send_only, ExchangeConfig, ExchangeState, Exchanger, DEFAULT_REPLY_SIZE,
};
pub use presets::{Preset, PresetTable};
