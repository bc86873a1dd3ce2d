use std::fmt;

use bytes::{BufMut, Bytes, BytesMut};

use crate::error::{FrameError, Result};
use crate::header::{HeaderFields, DATA_LENGTH, HEADER_SIZE};

/// One control frame: packed header values plus an opaque payload.
///
/// `data_length` is the length *declared* in the header. It is carried as-is
/// and never reconciled with `payload.len()`, neither when encoding nor when
/// decoding.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct ControlFrame {
    pub attn: u8,
    pub ttl: u8,
    pub data_length: u8,
    pub packet_id: u8,
    pub payload: Bytes,
}

impl ControlFrame {
    /// Create a frame with an explicit declared length.
    pub fn new(
        attn: u8,
        ttl: u8,
        data_length: u8,
        packet_id: u8,
        payload: impl Into<Bytes>,
    ) -> Self {
        Self {
            attn,
            ttl,
            data_length,
            packet_id,
            payload: payload.into(),
        }
    }

    /// Create a frame whose declared length is the payload length.
    ///
    /// Payloads longer than the field can express declare the masked value.
    pub fn with_payload(attn: u8, ttl: u8, packet_id: u8, payload: impl Into<Bytes>) -> Self {
        let payload = payload.into();
        let declared = (payload.len() & usize::from(DATA_LENGTH.max())) as u8;
        Self::new(attn, ttl, declared, packet_id, payload)
    }

    /// The header values of this frame.
    pub fn header_fields(&self) -> HeaderFields {
        HeaderFields {
            attn: self.attn,
            ttl: self.ttl,
            data_length: self.data_length,
            packet_id: self.packet_id,
        }
    }

    /// The header word as it would be sent (leniently masked).
    pub fn header_word(&self) -> u16 {
        self.header_fields().pack()
    }

    /// True when the declared length equals the actual payload length.
    pub fn declared_length_matches(&self) -> bool {
        usize::from(self.data_length) == self.payload.len()
    }

    /// The total wire size of this frame (header + payload).
    pub fn wire_size(&self) -> usize {
        HEADER_SIZE + self.payload.len()
    }
}

impl fmt::Display for ControlFrame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "ControlFrame(attn=0x{:X}, ttl=0x{:X}, data_length={}, packet_id=0x{:02X}, payload=0x{})",
            self.attn,
            self.ttl,
            self.data_length,
            self.packet_id,
            hex::encode_upper(&self.payload)
        )
    }
}

/// How out-of-range header values are treated when encoding.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum EncodeMode {
    /// Mask each value to its bit width.
    #[default]
    Lenient,
    /// Fail with [`FrameError::FieldOutOfRange`].
    Strict,
}

/// Encode a frame, masking out-of-range header values.
///
/// Output is always `2 + payload.len()` bytes: the big-endian header word
/// followed by the payload verbatim.
pub fn encode(frame: &ControlFrame) -> Bytes {
    let mut dst = BytesMut::with_capacity(frame.wire_size());
    put_frame(frame.header_fields().pack(), &frame.payload, &mut dst);
    dst.freeze()
}

/// Encode a frame, rejecting header values wider than their field.
pub fn encode_strict(frame: &ControlFrame) -> Result<Bytes> {
    let word = frame.header_fields().pack_strict()?;
    let mut dst = BytesMut::with_capacity(frame.wire_size());
    put_frame(word, &frame.payload, &mut dst);
    Ok(dst.freeze())
}

/// Append an encoded frame to `dst` using `mode`.
pub fn encode_into(frame: &ControlFrame, mode: EncodeMode, dst: &mut BytesMut) -> Result<()> {
    let word = match mode {
        EncodeMode::Lenient => frame.header_fields().pack(),
        EncodeMode::Strict => frame.header_fields().pack_strict()?,
    };
    put_frame(word, &frame.payload, dst);
    Ok(())
}

fn put_frame(word: u16, payload: &[u8], dst: &mut BytesMut) {
    dst.reserve(HEADER_SIZE + payload.len());
    dst.put_u16(word);
    dst.put_slice(payload);
}

/// Decode a frame from a byte slice.
///
/// Every byte after the header becomes payload, whatever `data_length` says.
pub fn decode(src: &[u8]) -> Result<ControlFrame> {
    decode_bytes(Bytes::copy_from_slice(src))
}

/// Decode a frame without copying the payload out of `src`.
pub fn decode_bytes(mut src: Bytes) -> Result<ControlFrame> {
    if src.len() < HEADER_SIZE {
        return Err(FrameError::FrameTooShort { len: src.len() });
    }

    let payload = src.split_off(HEADER_SIZE);
    let fields = HeaderFields::unpack(u16::from_be_bytes([src[0], src[1]]));

    Ok(ControlFrame {
        attn: fields.attn,
        ttl: fields.ttl,
        data_length: fields.data_length,
        packet_id: fields.packet_id,
        payload,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::header::{ATTN, PACKET_ID, TTL};

    fn set_reg_a_5() -> ControlFrame {
        ControlFrame::new(0xF, 2, 4, 4, vec![0x00, 0x00, 0x00, 0x05])
    }

    #[test]
    fn bit_layout_fixture() {
        let wire = encode(&set_reg_a_5());
        assert_eq!(wire.as_ref(), &[0xF2, 0x84, 0x00, 0x00, 0x00, 0x05]);
    }

    #[test]
    fn encoded_length_is_header_plus_payload() {
        let frame = ControlFrame::new(1, 1, 7, 9, vec![0xAA; 3]);
        assert_eq!(encode(&frame).len(), HEADER_SIZE + 3);
        assert_eq!(frame.wire_size(), 5);
    }

    #[test]
    fn roundtrip_all_header_values() {
        let payloads: [&[u8]; 3] = [&[], &[0x5A], &[1, 2, 3, 4, 5, 6, 7]];
        for attn in 0..=ATTN.max() {
            for ttl in 0..=TTL.max() {
                for data_length in 0..=DATA_LENGTH.max() {
                    for packet_id in 0..=PACKET_ID.max() {
                        let payload = payloads[usize::from(packet_id) % payloads.len()];
                        let frame = ControlFrame::new(
                            attn,
                            ttl,
                            data_length,
                            packet_id,
                            payload.to_vec(),
                        );
                        let decoded = decode(&encode(&frame)).unwrap();
                        assert_eq!(decoded, frame);
                    }
                }
            }
        }
    }

    #[test]
    fn lenient_encode_masks_attn() {
        let mut frame = set_reg_a_5();
        frame.attn = 0x1F;
        let wire = encode(&frame);
        assert_eq!(decode(&wire).unwrap().attn, 0xF);
        assert_eq!(&wire[..2], &[0xF2, 0x84]);
    }

    #[test]
    fn strict_encode_rejects_attn() {
        let mut frame = set_reg_a_5();
        frame.attn = 0x1F;
        let err = encode_strict(&frame).unwrap_err();
        assert_eq!(
            err,
            FrameError::FieldOutOfRange {
                field: "attn",
                value: 0x1F,
                max: 0xF
            }
        );
    }

    #[test]
    fn strict_encode_rejects_each_field() {
        let cases = [
            (ControlFrame::new(0, 4, 0, 0, Bytes::new()), "ttl"),
            (ControlFrame::new(0, 0, 8, 0, Bytes::new()), "data_length"),
            (ControlFrame::new(0, 0, 0, 32, Bytes::new()), "packet_id"),
        ];
        for (frame, expected) in cases {
            match encode_strict(&frame) {
                Err(FrameError::FieldOutOfRange { field, .. }) => assert_eq!(field, expected),
                other => panic!("expected {expected} rejection, got {other:?}"),
            }
        }
    }

    #[test]
    fn strict_encode_matches_lenient_in_range() {
        let frame = set_reg_a_5();
        assert_eq!(encode_strict(&frame).unwrap(), encode(&frame));
    }

    #[test]
    fn encode_into_appends() {
        let mut buf = BytesMut::from(&b"xx"[..]);
        encode_into(&set_reg_a_5(), EncodeMode::Strict, &mut buf).unwrap();
        assert_eq!(buf.as_ref(), &[b'x', b'x', 0xF2, 0x84, 0, 0, 0, 5]);

        let mut frame = set_reg_a_5();
        frame.packet_id = 0xFF;
        let mut buf = BytesMut::new();
        assert!(encode_into(&frame, EncodeMode::Strict, &mut buf).is_err());
        encode_into(&frame, EncodeMode::Lenient, &mut buf).unwrap();
        assert_eq!(buf.len(), 6);
    }

    #[test]
    fn short_frames_rejected() {
        assert_eq!(decode(&[]), Err(FrameError::FrameTooShort { len: 0 }));
        assert_eq!(decode(&[0xF2]), Err(FrameError::FrameTooShort { len: 1 }));
    }

    #[test]
    fn header_only_frame_has_empty_payload() {
        let frame = decode(&[0xF2, 0x84]).unwrap();
        assert!(frame.payload.is_empty());
        assert_eq!(frame.data_length, 4);
    }

    #[test]
    fn declared_length_independent_of_payload() {
        let header = ControlFrame::new(0x3, 1, 7, 0x11, Bytes::new()).header_word();
        let mut wire = header.to_be_bytes().to_vec();
        wire.extend_from_slice(&[0xAB, 0xCD, 0xEF]);

        let frame = decode(&wire).unwrap();
        assert_eq!(frame.data_length, 7);
        assert_eq!(frame.payload.as_ref(), &[0xAB, 0xCD, 0xEF]);
        assert!(!frame.declared_length_matches());
    }

    #[test]
    fn encode_ignores_declared_length() {
        let frame = ControlFrame::new(0xF, 2, 1, 4, vec![1, 2, 3, 4, 5]);
        let wire = encode(&frame);
        assert_eq!(wire.len(), 7);
        assert_eq!(&wire[2..], &[1, 2, 3, 4, 5]);
    }

    #[test]
    fn decode_bytes_keeps_payload_slice() {
        let wire = Bytes::from_static(&[0xF2, 0x84, 0x00, 0x00, 0x00, 0x05]);
        let frame = decode_bytes(wire).unwrap();
        assert_eq!(frame, set_reg_a_5());
    }

    #[test]
    fn with_payload_declares_payload_length() {
        let frame = ControlFrame::with_payload(0xF, 3, 0xF, vec![0x00]);
        assert_eq!(frame.data_length, 1);
        assert!(frame.declared_length_matches());
    }

    #[test]
    fn with_payload_masks_long_payload_length() {
        assert_eq!(ControlFrame::with_payload(0, 0, 0, vec![0u8; 256]).data_length, 0);
        assert_eq!(ControlFrame::with_payload(0, 0, 0, vec![0u8; 9]).data_length, 1);
        assert_eq!(ControlFrame::with_payload(0, 0, 0, vec![0u8; 7]).data_length, 7);
    }

    #[test]
    fn display_format() {
        assert_eq!(
            set_reg_a_5().to_string(),
            "ControlFrame(attn=0xF, ttl=0x2, data_length=4, packet_id=0x04, payload=0x00000005)"
        );
    }
}
