/// Errors that can occur during frame encoding/decoding.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FrameError {
    /// A header field does not fit its bit width (strict encoding only).
    #[error("header field {field} out of range ({value}, max {max})")]
    FieldOutOfRange {
        field: &'static str,
        value: u8,
        max: u8,
    },

    /// Fewer bytes than a header were supplied to the decoder.
    #[error("frame too short ({len} bytes, header needs 2)")]
    FrameTooShort { len: usize },
}

pub type Result<T> = std::result::Result<T, FrameError>;
