//! Control frame codec.
//!
//! A control frame is a two-byte big-endian header packing four small
//! fields, followed by an opaque payload:
//!
//! ```text
//! byte 0    byte 1    byte 2..
//! AAAA xxTT DDDP PPPP payload
//! ```
//!
//! A = attn (4), T = ttl (2), D = data_length (3), P = packet_id (5),
//! x = reserved (written as zero, ignored on decode). No checksum, no
//! delimiter, no escaping. The codec is pure; it never touches I/O.

pub mod codec;
pub mod error;
pub mod header;

pub use codec::{
    decode, decode_bytes, encode, encode_into, encode_strict, ControlFrame, EncodeMode,
};
pub use error::{FrameError, Result};
pub use header::{
    HeaderField, HeaderFields, ATTN, DATA_LENGTH, FIELDS, HEADER_SIZE, PACKET_ID, RESERVED_MASK,
    TTL,
};
