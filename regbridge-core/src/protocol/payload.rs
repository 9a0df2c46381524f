// SPDX-License-Identifier: MIT

//! Payload decoder: maps `(message id, argument index, field bytes)` onto a
//! typed payload slot.
//!
//! Numeric arguments are checked against their destination width; an
//! out-of-range value is a hard [`ParseError::DecodeFailure`] rather than a
//! silent truncation. Any `(id, index)` combination without a slot is a
//! decode failure as well.

use crate::protocol::error::ParseError;
use crate::protocol::field::parse_decimal;
use crate::protocol::messages::{MsgId, RegisterAccess, RwMode, TxtPayload, Version};

/// Decode one command-grammar argument into `payload`.
pub fn decode_command_arg(
    msg_id: MsgId,
    index: u8,
    field: &[u8],
    payload: &mut TxtPayload,
) -> Result<(), ParseError> {
    match msg_id {
        MsgId::RegisterAccess => decode_register_access_arg(index, field, payload),
        // Version reports take no command arguments.
        MsgId::ReadHwVersion | MsgId::ReadFwVersion => Err(ParseError::DecodeFailure),
    }
}

/// Decode one response/event-grammar argument into `payload`.
///
/// Only the version-report ids carry arguments on this path, and their sole
/// argument is copied verbatim with no numeric interpretation.
pub fn decode_response_arg(
    msg_id: MsgId,
    index: u8,
    field: &[u8],
    payload: &mut TxtPayload,
) -> Result<(), ParseError> {
    match (msg_id, index) {
        (MsgId::ReadHwVersion, 0) => {
            let version = Version::from_bytes(field).ok_or(ParseError::FieldOverflow)?;
            *payload = TxtPayload::HwVersion(version);
            Ok(())
        }
        (MsgId::ReadFwVersion, 0) => {
            let version = Version::from_bytes(field).ok_or(ParseError::FieldOverflow)?;
            *payload = TxtPayload::FwVersion(version);
            Ok(())
        }
        _ => Err(ParseError::DecodeFailure),
    }
}

fn decode_register_access_arg(
    index: u8,
    field: &[u8],
    payload: &mut TxtPayload,
) -> Result<(), ParseError> {
    if index == 0 {
        let mode = match parse_decimal(field)? {
            0 => RwMode::Read,
            1 => RwMode::Write,
            _ => return Err(ParseError::DecodeFailure),
        };
        *payload = TxtPayload::RegisterAccess(RegisterAccess::with_mode(mode));
        return Ok(());
    }

    let ra = register_access_mut(payload)?;
    match index {
        1 => ra.bus = parse_u8(field)?,
        2 => ra.dev_addr = parse_u16(field)?,
        3 => ra.reg_addr = parse_u16(field)?,
        4 => {
            // A value argument is only valid for writes.
            if ra.mode != RwMode::Write {
                return Err(ParseError::UnexpectedArgument);
            }
            ra.value = Some(parse_decimal(field)?);
        }
        _ => return Err(ParseError::UnexpectedArgument),
    }
    Ok(())
}

// Arguments past index 0 require the slot created by the mode argument;
// anything else means the state machine skipped a step.
fn register_access_mut(payload: &mut TxtPayload) -> Result<&mut RegisterAccess, ParseError> {
    match payload {
        TxtPayload::RegisterAccess(ra) => Ok(ra),
        _ => Err(ParseError::InternalState),
    }
}

fn parse_u8(field: &[u8]) -> Result<u8, ParseError> {
    u8::try_from(parse_decimal(field)?).map_err(|_| ParseError::DecodeFailure)
}

fn parse_u16(field: &[u8]) -> Result<u16, ParseError> {
    u16::try_from(parse_decimal(field)?).map_err(|_| ParseError::DecodeFailure)
}
