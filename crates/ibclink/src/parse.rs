//! Parsers for operator-entered values.

use std::time::Duration;

use ibclink_frame::HEADER_SIZE;

/// Parse a header field value: `0x`-prefixed hex or plain decimal.
pub fn parse_field(input: &str) -> Result<u8, String> {
    let input = input.trim();
    let parsed = match input
        .strip_prefix("0x")
        .or_else(|| input.strip_prefix("0X"))
    {
        Some(digits) => u8::from_str_radix(digits, 16),
        None => input.parse::<u8>(),
    };
    parsed.map_err(|_| format!("invalid field value {input:?} (expected 0-255 or 0x00-0xFF)"))
}

/// Parse a bare hex value as typed at the interactive prompts (`F`, `0x1c`).
pub fn parse_hex_u8(input: &str) -> Result<u8, String> {
    let input = input.trim();
    let digits = input
        .strip_prefix("0x")
        .or_else(|| input.strip_prefix("0X"))
        .unwrap_or(input);
    u8::from_str_radix(digits, 16).map_err(|_| format!("invalid hex byte {input:?}"))
}

/// Parse a hex byte string. Whitespace, `:` and `_` separators and a
/// leading `0x` are accepted: `00000005`, `0x00 00 00 05`, `de:ad`.
pub fn parse_hex_bytes(input: &str) -> Result<Vec<u8>, String> {
    let trimmed = input.trim();
    let trimmed = trimmed
        .strip_prefix("0x")
        .or_else(|| trimmed.strip_prefix("0X"))
        .unwrap_or(trimmed);
    let digits: String = trimmed
        .chars()
        .filter(|c| !c.is_whitespace() && *c != ':' && *c != '_')
        .collect();
    hex::decode(&digits).map_err(|err| format!("invalid hex bytes {input:?}: {err}"))
}

/// Largest reply the CLI will wait for.
pub const MAX_REPLY_SIZE: usize = 4096;

/// Parse a reply size: at least a header, at most [`MAX_REPLY_SIZE`] bytes.
pub fn parse_reply_size(input: &str) -> Result<usize, String> {
    let input = input.trim();
    let value: usize = input
        .parse()
        .map_err(|_| format!("invalid reply size {input:?}"))?;
    if !(HEADER_SIZE..=MAX_REPLY_SIZE).contains(&value) {
        return Err(format!(
            "reply size must be between {HEADER_SIZE} and {MAX_REPLY_SIZE} bytes"
        ));
    }
    Ok(value)
}

/// Parse a duration such as `500ms`, `2s` or `3` (seconds).
pub fn parse_duration(input: &str) -> Result<Duration, String> {
    let input = input.trim();
    if input.is_empty() {
        return Err("duration must not be empty".to_string());
    }

    let (number, millis) = if let Some(num) = input.strip_suffix("ms") {
        (num, true)
    } else if let Some(num) = input.strip_suffix('s') {
        (num, false)
    } else {
        (input, false)
    };

    let value: u64 = number
        .trim()
        .parse()
        .map_err(|_| format!("invalid duration value: {input}"))?;

    if value == 0 {
        return Err("duration must be greater than zero".to_string());
    }

    Ok(if millis {
        Duration::from_millis(value)
    } else {
        Duration::from_secs(value)
    })
}
