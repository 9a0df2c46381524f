// SPDX-License-Identifier: MIT

//! Build-side helpers for the framed binary protocol.
//!
//! Frame layout:
//!
//! ```text
//! STX            Header                    Payload  CRC  ETX
//!      device_id length msg_id flag1 flag2
//!  1       4        1      1     1     1     0-37    2    1
//! ```
//!
//! The CRC-16 covers the header and payload. Header flags travel as two
//! bit-packed bytes on the wire but are carried as the tagged
//! [`FrameFlags`] struct here and packed only at encode time. There is no
//! parse-side state machine for this protocol in this crate.

use crc::{Crc, CRC_16_XMODEM};
use heapless::Vec;

pub const FRAME_STX: u8 = 0x02;
pub const FRAME_ETX: u8 = 0x03;

pub const HEADER_LEN: usize = 8;
pub const MAX_PAYLOAD_LEN: usize = 37;
/// STX + header + max payload + CRC + ETX.
pub const MAX_FRAME_LEN: usize = 1 + HEADER_LEN + MAX_PAYLOAD_LEN + 2 + 1;

/// Sequence numbers wrap within a 4-bit field.
pub const MAX_SEQUENCE: u8 = 0x0F;
/// Error codes occupy a 2-bit field.
pub const MAX_FRAME_ERROR: u8 = 0x03;

const CRC16: Crc<u16> = Crc::<u16>::new(&CRC_16_XMODEM);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameError {
    PayloadTooLong,
    SequenceOutOfRange,
    ErrorOutOfRange,
}

/// Frame class carried in the header flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageClass {
    Command,
    Response,
    Event,
}

impl MessageClass {
    const fn wire_value(self) -> u8 {
        match self {
            MessageClass::Command => 0,
            MessageClass::Response => 1,
            MessageClass::Event => 2,
        }
    }
}

/// Header flag fields, unpacked.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameFlags {
    pub class: MessageClass,
    /// 4-bit sequence number (0..=15).
    pub sequence: u8,
    /// Whether the sender expects a return frame.
    pub return_expected: bool,
    /// 2-bit error code (0..=3); nonzero only on responses.
    pub error: u8,
}

impl FrameFlags {
    /// Pack into the two wire flag bytes.
    ///
    /// flag1: bit 0 reserved, bits 1-2 class, bit 3 return-expected,
    /// bits 4-7 sequence. flag2: bits 0-5 reserved, bits 6-7 error.
    fn encode(&self) -> Result<[u8; 2], FrameError> {
        if self.sequence > MAX_SEQUENCE {
            return Err(FrameError::SequenceOutOfRange);
        }
        if self.error > MAX_FRAME_ERROR {
            return Err(FrameError::ErrorOutOfRange);
        }
        let flag1 = (self.class.wire_value() << 1)
            | (u8::from(self.return_expected) << 3)
            | (self.sequence << 4);
        let flag2 = self.error << 6;
        Ok([flag1, flag2])
    }
}

/// Frame header, minus the derived length byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameHeader {
    /// Unique device id on the shared bus (RS-422/RS-485).
    pub device_id: u32,
    pub message_id: u8,
    pub flags: FrameFlags,
}

/// Assemble a complete frame: STX, header, payload, CRC, ETX.
pub fn build(header: &FrameHeader, payload: &[u8]) -> Result<Vec<u8, MAX_FRAME_LEN>, FrameError> {
    if payload.len() > MAX_PAYLOAD_LEN {
        return Err(FrameError::PayloadTooLong);
    }
    let flags = header.flags.encode()?;
    // Everything after the length byte: msg_id, flags, payload, CRC, ETX.
    let length = (3 + payload.len() + 2 + 1) as u8;

    // All pushes below fit by construction: 1 + 8 + 37 + 2 + 1 = 49.
    let mut out: Vec<u8, MAX_FRAME_LEN> = Vec::new();
    let _ = out.push(FRAME_STX);
    let _ = out.extend_from_slice(&header.device_id.to_le_bytes());
    let _ = out.push(length);
    let _ = out.push(header.message_id);
    let _ = out.extend_from_slice(&flags);
    let _ = out.extend_from_slice(payload);

    let crc = CRC16.checksum(&out[1..]);
    let _ = out.extend_from_slice(&crc.to_le_bytes());
    let _ = out.push(FRAME_ETX);
    Ok(out)
}

/// Build a command frame.
pub fn build_command(
    device_id: u32,
    message_id: u8,
    sequence: u8,
    return_expected: bool,
    payload: &[u8],
) -> Result<Vec<u8, MAX_FRAME_LEN>, FrameError> {
    build(
        &FrameHeader {
            device_id,
            message_id,
            flags: FrameFlags {
                class: MessageClass::Command,
                sequence,
                return_expected,
                error: 0,
            },
        },
        payload,
    )
}

/// Build a response frame echoing the command's sequence number.
pub fn build_response(
    device_id: u32,
    message_id: u8,
    sequence: u8,
    error: u8,
    payload: &[u8],
) -> Result<Vec<u8, MAX_FRAME_LEN>, FrameError> {
    build(
        &FrameHeader {
            device_id,
            message_id,
            flags: FrameFlags {
                class: MessageClass::Response,
                sequence,
                return_expected: false,
                error,
            },
        },
        payload,
    )
}

/// Build an unsolicited event frame.
pub fn build_event(
    device_id: u32,
    message_id: u8,
    sequence: u8,
    payload: &[u8],
) -> Result<Vec<u8, MAX_FRAME_LEN>, FrameError> {
    build(
        &FrameHeader {
            device_id,
            message_id,
            flags: FrameFlags {
                class: MessageClass::Event,
                sequence,
                return_expected: false,
                error: 0,
            },
        },
        payload,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn frame_layout() {
        let frame = build_command(0x0102_0304, 0x21, 5, true, &[0xAA, 0xBB]).unwrap();
        assert_eq!(frame.len(), 1 + HEADER_LEN + 2 + 2 + 1);
        assert_eq!(frame[0], FRAME_STX);
        assert_eq!(&frame[1..5], &[0x04, 0x03, 0x02, 0x01]); // device id, LE
        assert_eq!(frame[5], 3 + 2 + 2 + 1); // length byte
        assert_eq!(frame[6], 0x21); // message id
        assert_eq!(frame[frame.len() - 1], FRAME_ETX);
        assert_eq!(&frame[9..11], &[0xAA, 0xBB]);
    }

    #[test]
    fn flag_packing() {
        let flags = FrameFlags {
            class: MessageClass::Response,
            sequence: 0xF,
            return_expected: true,
            error: 0x3,
        };
        let [flag1, flag2] = flags.encode().unwrap();
        assert_eq!(flag1, (1 << 1) | (1 << 3) | (0xF << 4));
        assert_eq!(flag2, 0x3 << 6);

        let flags = FrameFlags {
            class: MessageClass::Command,
            sequence: 0,
            return_expected: false,
            error: 0,
        };
        assert_eq!(flags.encode().unwrap(), [0, 0]);
    }

    #[test]
    fn crc_covers_header_and_payload() {
        let frame = build_event(7, 0x10, 2, b"ping").unwrap();
        let crc_offset = frame.len() - 3;
        let expected = CRC16.checksum(&frame[1..crc_offset]);
        assert_eq!(
            &frame[crc_offset..crc_offset + 2],
            &expected.to_le_bytes()
        );

        // A payload change must change the CRC.
        let other = build_event(7, 0x10, 2, b"pong").unwrap();
        assert_ne!(frame[crc_offset..crc_offset + 2], other[crc_offset..crc_offset + 2]);
    }

    #[test]
    fn bounds_are_enforced() {
        assert_eq!(
            build_command(1, 0x21, MAX_SEQUENCE + 1, false, &[]),
            Err(FrameError::SequenceOutOfRange)
        );
        assert_eq!(
            build_response(1, 0x21, 0, MAX_FRAME_ERROR + 1, &[]),
            Err(FrameError::ErrorOutOfRange)
        );
        assert_eq!(
            build_command(1, 0x21, 0, false, &[0; MAX_PAYLOAD_LEN + 1]),
            Err(FrameError::PayloadTooLong)
        );
        // Largest legal frame fills the buffer exactly.
        let frame = build_command(1, 0x21, 0, false, &[0; MAX_PAYLOAD_LEN]).unwrap();
        assert_eq!(frame.len(), MAX_FRAME_LEN);
    }
}
