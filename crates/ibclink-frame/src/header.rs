//! Bit layout of the two-byte frame header.
//!
//! The header is a single big-endian `u16`:
//!
//! ```text
//!  15  14  13  12  11  10   9   8   7   6   5   4   3   2   1   0
//! ┌───────────────┬───────┬───────┬───────────┬───────────────────┐
//! │ attn (4)      │ rsvd  │ttl (2)│ dlen (3)  │ packet_id (5)     │
//! └───────────────┴───────┴───────┴───────────┴───────────────────┘
//! ```
//!
//! Reserved bits are written as zero and ignored when read.

use tracing::debug;

use crate::error::{FrameError, Result};

/// Header length in bytes.
pub const HEADER_SIZE: usize = 2;

/// Position and width of one packed header field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HeaderField {
    pub name: &'static str,
    pub width: u32,
    pub shift: u32,
}

impl HeaderField {
    /// Largest value the field can hold.
    pub const fn max(self) -> u8 {
        ((1u16 << self.width) - 1) as u8
    }

    /// Mask selecting this field inside the header word.
    pub const fn mask(self) -> u16 {
        (self.max() as u16) << self.shift
    }

    pub const fn fits(self, value: u8) -> bool {
        value <= self.max()
    }

    /// Place `value` in the header word, truncating to the field width.
    pub const fn pack(self, value: u8) -> u16 {
        ((value as u16) & self.max() as u16) << self.shift
    }

    /// Extract this field from a header word.
    pub const fn unpack(self, word: u16) -> u8 {
        ((word >> self.shift) & self.max() as u16) as u8
    }
}

/// Target/channel selector.
pub const ATTN: HeaderField = HeaderField {
    name: "attn",
    width: 4,
    shift: 12,
};

/// Hop/priority class.
pub const TTL: HeaderField = HeaderField {
    name: "ttl",
    width: 2,
    shift: 8,
};

/// Declared payload length.
pub const DATA_LENGTH: HeaderField = HeaderField {
    name: "data_length",
    width: 3,
    shift: 5,
};

/// Opcode.
pub const PACKET_ID: HeaderField = HeaderField {
    name: "packet_id",
    width: 5,
    shift: 0,
};

/// All header fields, most significant first.
pub const FIELDS: [HeaderField; 4] = [ATTN, TTL, DATA_LENGTH, PACKET_ID];

/// Bits not covered by any field.
pub const RESERVED_MASK: u16 = !(ATTN.mask() | TTL.mask() | DATA_LENGTH.mask() | PACKET_ID.mask());

/// The four header values of a frame.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct HeaderFields {
    pub attn: u8,
    pub ttl: u8,
    pub data_length: u8,
    pub packet_id: u8,
}

impl HeaderFields {
    fn values(&self) -> [(HeaderField, u8); 4] {
        [
            (ATTN, self.attn),
            (TTL, self.ttl),
            (DATA_LENGTH, self.data_length),
            (PACKET_ID, self.packet_id),
        ]
    }

    /// Pack into a header word, masking each value to its width.
    pub fn pack(&self) -> u16 {
        self.values().iter().fold(0u16, |word, &(field, value)| {
            if !field.fits(value) {
                debug!(
                    field = field.name,
                    value,
                    max = field.max(),
                    "truncating out-of-range header field"
                );
            }
            word | field.pack(value)
        })
    }

    /// Pack into a header word, rejecting values wider than their field.
    pub fn pack_strict(&self) -> Result<u16> {
        self.values()
            .iter()
            .try_fold(0u16, |word, &(field, value)| {
                if field.fits(value) {
                    Ok(word | field.pack(value))
                } else {
                    Err(FrameError::FieldOutOfRange {
                        field: field.name,
                        value,
                        max: field.max(),
                    })
                }
            })
    }

    /// Unpack a header word. Reserved bits are ignored.
    pub fn unpack(word: u16) -> Self {
        Self {
            attn: ATTN.unpack(word),
            ttl: TTL.unpack(word),
            data_length: DATA_LENGTH.unpack(word),
            packet_id: PACKET_ID.unpack(word),
        }
    }
}
