// SPDX-License-Identifier: MIT

//! Bounded field accumulator.
//!
//! One logical field at a time collects here while the state machines run.
//! The buffer is shared across fields, so each push carries the bound of the
//! field kind currently being received; the overflowing byte is rejected
//! before it is stored.

use heapless::Vec;

use crate::protocol::error::ParseError;
use crate::protocol::messages::FIELD_BUF_CAP;

/// Receive buffer with position tracking for the active field.
#[derive(Debug, Default)]
pub struct FieldBuffer {
    bytes: Vec<u8, FIELD_BUF_CAP>,
}

impl FieldBuffer {
    pub const fn new() -> Self {
        Self { bytes: Vec::new() }
    }

    /// Append one byte, enforcing `limit` as the bound of the active field.
    pub fn push(&mut self, byte: u8, limit: usize) -> Result<(), ParseError> {
        if self.bytes.len() >= limit {
            return Err(ParseError::FieldOverflow);
        }
        self.bytes.push(byte).map_err(|_| ParseError::FieldOverflow)
    }

    /// Reset for the next field. Called at every field boundary and every
    /// terminal transition.
    pub fn clear(&mut self) {
        self.bytes.clear();
    }

    #[inline]
    pub fn as_slice(&self) -> &[u8] {
        &self.bytes
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

/// Parse an ASCII decimal field into a `u32`.
///
/// Empty fields, non-digit bytes, and values past `u32::MAX` are all decode
/// failures; nothing is truncated.
pub fn parse_decimal(bytes: &[u8]) -> Result<u32, ParseError> {
    if bytes.is_empty() {
        return Err(ParseError::DecodeFailure);
    }
    let mut value: u32 = 0;
    for &b in bytes {
        if !b.is_ascii_digit() {
            return Err(ParseError::DecodeFailure);
        }
        value = value
            .checked_mul(10)
            .and_then(|v| v.checked_add(u32::from(b - b'0')))
            .ok_or(ParseError::DecodeFailure)?;
    }
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn push_respects_field_limit() {
        let mut buf = FieldBuffer::new();
        for b in 0..3u8 {
            buf.push(b, 3).unwrap();
        }
        assert_eq!(buf.push(9, 3), Err(ParseError::FieldOverflow));
        // The rejected byte was never stored.
        assert_eq!(buf.as_slice(), &[0, 1, 2]);
    }

    #[test]
    fn push_respects_buffer_capacity() {
        let mut buf = FieldBuffer::new();
        for _ in 0..FIELD_BUF_CAP {
            buf.push(b'x', FIELD_BUF_CAP).unwrap();
        }
        assert_eq!(
            buf.push(b'x', FIELD_BUF_CAP + 10),
            Err(ParseError::FieldOverflow)
        );
    }

    #[test]
    fn clear_resets_position() {
        let mut buf = FieldBuffer::new();
        buf.push(b'1', 4).unwrap();
        buf.clear();
        assert!(buf.is_empty());
        assert_eq!(buf.len(), 0);
    }

    #[test]
    fn decimal_parsing() {
        assert_eq!(parse_decimal(b"0"), Ok(0));
        assert_eq!(parse_decimal(b"200"), Ok(200));
        assert_eq!(parse_decimal(b"4294967295"), Ok(u32::MAX));
        assert_eq!(parse_decimal(b""), Err(ParseError::DecodeFailure));
        assert_eq!(parse_decimal(b"12a"), Err(ParseError::DecodeFailure));
        assert_eq!(parse_decimal(b"4294967296"), Err(ParseError::DecodeFailure));
    }
}
