// SPDX-License-Identifier: MIT

//! Command message encoder.
//!
//! Produces the command grammar for a [`TxtMessage`]; the inverse of
//! [`TxtParser::parse_command_byte`]. Used by host-side clients and to
//! check the encode/reparse round trip.
//!
//! [`TxtParser::parse_command_byte`]: crate::protocol::parser::TxtParser::parse_command_byte

use core::fmt::Write as _;

use heapless::String;

use crate::protocol::messages::{MsgId, TxtMessage, TxtPayload};

/// Upper bound of an encoded text message.
pub const MAX_ENCODED_LEN: usize = 64;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EncodeError {
    /// Output buffer too small for the message.
    BufferFull,
    /// The payload variant does not match the message id.
    PayloadMismatch,
}

/// Encode `msg` into the command grammar, terminator included.
pub fn encode_command(msg: &TxtMessage) -> Result<String<MAX_ENCODED_LEN>, EncodeError> {
    let mut out = String::new();
    write!(out, "{}:{}", msg.msg_id.mnemonic(), msg.device_id)
        .map_err(|_| EncodeError::BufferFull)?;

    match (msg.msg_id, &msg.payload) {
        (MsgId::ReadHwVersion | MsgId::ReadFwVersion, TxtPayload::None) => {}
        (MsgId::RegisterAccess, TxtPayload::RegisterAccess(ra)) => {
            write!(
                out,
                ",{},{},{},{}",
                ra.mode.wire_value(),
                ra.bus,
                ra.dev_addr,
                ra.reg_addr
            )
            .map_err(|_| EncodeError::BufferFull)?;
            if let Some(value) = ra.value {
                write!(out, ",{value}").map_err(|_| EncodeError::BufferFull)?;
            }
        }
        _ => return Err(EncodeError::PayloadMismatch),
    }

    out.push('\n').map_err(|_| EncodeError::BufferFull)?;
    Ok(out)
}
