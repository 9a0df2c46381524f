// SPDX-License-Identifier: MIT

//! Incremental text message parser.
//!
//! Commands and responses/events share one parser instance but run through
//! separate grammars: feed every received byte to either
//! [`TxtParser::parse_command_byte`] or [`TxtParser::parse_response_byte`].
//! Neither call blocks, allocates, or performs I/O, so both are safe to
//! drive from a receive interrupt.
//!
//! A malformed byte fails the whole in-flight message and latches the
//! parser in its failed state; the caller decides resynchronization
//! (typically: discard bytes up to the next terminator) and must call
//! [`TxtParser::clear`] before the next message.

use crate::protocol::error::ParseError;
use crate::protocol::field::{parse_decimal, FieldBuffer};
use crate::protocol::hooks::{NoHooks, ParseHooks};
use crate::protocol::messages::{
    MsgId, RwMode, TxtMessage, TxtPayload, ARG_DELIMITER, DEVICE_DELIMITER,
    DEVICE_ID_MAX_DIGITS, ERROR_CODE_MAX_DIGITS, FIELD_BUF_CAP, MAX_ARG_COUNT,
    MNEMONIC_FIELD_MAX, MSG_TAIL,
};
use crate::protocol::payload;

/// Receive state of the in-flight message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ReceiveState {
    MsgId,
    DeviceId,
    ErrorCode,
    ArgData,
    Done,
    Failed,
}

/// Result of feeding one byte.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseOutcome {
    /// Mid-message; feed the next byte.
    Pending,
    /// A full message was parsed.
    Complete(TxtMessage),
}

/// What happens to parser state after a successful response/event parse.
///
/// The command path always clears itself. The response path defaults to
/// [`ClearPolicy::Manual`]: state stays in place so the caller can inspect
/// the last message through the accessors, and an explicit
/// [`TxtParser::clear`] is required before the next one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ClearPolicy {
    #[default]
    Manual,
    Auto,
}

/// Byte-at-a-time parser for the text protocol.
///
/// One instance per session, owned by the caller, reused across messages.
/// [`TxtParser::clear`] resets everything except the registered hooks and
/// the configured clear policy.
pub struct TxtParser<H: ParseHooks = NoHooks> {
    state: ReceiveState,
    buf: FieldBuffer,
    msg_id: Option<MsgId>,
    device_id: u32,
    error_code: u8,
    arg_count: u8,
    payload: TxtPayload,
    response_clear: ClearPolicy,
    hooks: H,
}

impl TxtParser<NoHooks> {
    pub fn new() -> Self {
        Self::with_hooks(NoHooks)
    }
}

impl Default for TxtParser<NoHooks> {
    fn default() -> Self {
        Self::new()
    }
}

impl<H: ParseHooks> TxtParser<H> {
    pub fn with_hooks(hooks: H) -> Self {
        Self {
            state: ReceiveState::MsgId,
            buf: FieldBuffer::new(),
            msg_id: None,
            device_id: 0,
            error_code: 0,
            arg_count: 0,
            payload: TxtPayload::None,
            response_clear: ClearPolicy::default(),
            hooks,
        }
    }

    pub fn with_response_clear_policy(mut self, policy: ClearPolicy) -> Self {
        self.response_clear = policy;
        self
    }

    /// Reset for the next message. Hooks and configuration survive.
    pub fn clear(&mut self) {
        self.state = ReceiveState::MsgId;
        self.buf.clear();
        self.msg_id = None;
        self.device_id = 0;
        self.error_code = 0;
        self.arg_count = 0;
        self.payload = TxtPayload::None;
    }

    /// Ready to receive the first byte of a new message.
    pub fn is_idle(&self) -> bool {
        self.state == ReceiveState::MsgId && self.buf.is_empty()
    }

    pub fn msg_id(&self) -> Option<MsgId> {
        self.msg_id
    }

    pub fn device_id(&self) -> u32 {
        self.device_id
    }

    pub fn error_code(&self) -> u8 {
        self.error_code
    }

    pub fn arg_count(&self) -> u8 {
        self.arg_count
    }

    pub fn payload(&self) -> &TxtPayload {
        &self.payload
    }

    pub fn hooks(&self) -> &H {
        &self.hooks
    }

    pub fn hooks_mut(&mut self) -> &mut H {
        &mut self.hooks
    }

    /// Feed one byte of a command message.
    pub fn parse_command_byte(&mut self, byte: u8) -> Result<ParseOutcome, ParseError> {
        match self.step_command(byte) {
            Ok(outcome) => Ok(outcome),
            Err(err) => Err(self.fail(err)),
        }
    }

    /// Feed one byte of a response or event message.
    pub fn parse_response_byte(&mut self, byte: u8) -> Result<ParseOutcome, ParseError> {
        match self.step_response(byte) {
            Ok(outcome) => Ok(outcome),
            Err(err) => Err(self.fail(err)),
        }
    }

    fn step_command(&mut self, byte: u8) -> Result<ParseOutcome, ParseError> {
        match self.state {
            ReceiveState::MsgId => {
                if byte == DEVICE_DELIMITER {
                    self.resolve_msg_id()?;
                    self.next_field(ReceiveState::DeviceId);
                    Ok(ParseOutcome::Pending)
                } else if is_mnemonic_char(byte) {
                    if self.buf.is_empty() {
                        self.hooks.on_parse_started();
                    }
                    self.buf.push(byte, MNEMONIC_FIELD_MAX)?;
                    Ok(ParseOutcome::Pending)
                } else {
                    // A byte that can never be part of a mnemonic.
                    Err(ParseError::UnknownMnemonic)
                }
            }

            ReceiveState::DeviceId => {
                if byte.is_ascii_digit() {
                    self.buf.push(byte, DEVICE_ID_MAX_DIGITS)?;
                    Ok(ParseOutcome::Pending)
                } else if byte == ARG_DELIMITER {
                    self.take_device_id()?;
                    if !self.current_msg_id()?.takes_arguments() {
                        return Err(ParseError::UnexpectedArgument);
                    }
                    self.next_field(ReceiveState::ArgData);
                    Ok(ParseOutcome::Pending)
                } else if byte == MSG_TAIL {
                    self.take_device_id()?;
                    self.finish_command()
                } else {
                    Err(ParseError::DecodeFailure)
                }
            }

            ReceiveState::ArgData => {
                if byte == ARG_DELIMITER || byte == MSG_TAIL {
                    self.decode_command_argument()?;
                    self.next_field(ReceiveState::ArgData);
                    if byte == MSG_TAIL {
                        self.finish_command()
                    } else {
                        Ok(ParseOutcome::Pending)
                    }
                } else {
                    self.buf.push(byte, FIELD_BUF_CAP)?;
                    Ok(ParseOutcome::Pending)
                }
            }

            // The error-code state belongs to the response grammar; reaching
            // it here, or feeding past a terminal state, needs a clear first.
            ReceiveState::ErrorCode | ReceiveState::Done | ReceiveState::Failed => {
                Err(ParseError::InternalState)
            }
        }
    }

    fn step_response(&mut self, byte: u8) -> Result<ParseOutcome, ParseError> {
        match self.state {
            ReceiveState::MsgId => {
                if byte == DEVICE_DELIMITER {
                    self.resolve_msg_id()?;
                    self.next_field(ReceiveState::DeviceId);
                    Ok(ParseOutcome::Pending)
                } else if is_mnemonic_char(byte) {
                    self.buf.push(byte, MNEMONIC_FIELD_MAX)?;
                    Ok(ParseOutcome::Pending)
                } else {
                    Err(ParseError::UnknownMnemonic)
                }
            }

            ReceiveState::DeviceId => {
                if byte.is_ascii_digit() {
                    self.buf.push(byte, DEVICE_ID_MAX_DIGITS)?;
                    Ok(ParseOutcome::Pending)
                } else if byte == ARG_DELIMITER {
                    self.take_device_id()?;
                    if self.is_event_frame() {
                        self.next_field(ReceiveState::ArgData);
                    } else {
                        self.next_field(ReceiveState::ErrorCode);
                    }
                    Ok(ParseOutcome::Pending)
                } else {
                    // The response grammar requires an error code before the
                    // terminator.
                    Err(ParseError::DecodeFailure)
                }
            }

            ReceiveState::ErrorCode => {
                if byte.is_ascii_digit() {
                    self.buf.push(byte, ERROR_CODE_MAX_DIGITS)?;
                    Ok(ParseOutcome::Pending)
                } else if byte == ARG_DELIMITER {
                    self.take_error_code()?;
                    self.next_field(ReceiveState::ArgData);
                    Ok(ParseOutcome::Pending)
                } else if byte == MSG_TAIL {
                    self.take_error_code()?;
                    self.finish_response()
                } else {
                    Err(ParseError::DecodeFailure)
                }
            }

            ReceiveState::ArgData => {
                if byte == ARG_DELIMITER || byte == MSG_TAIL {
                    self.decode_response_argument()?;
                    self.next_field(ReceiveState::ArgData);
                    if byte == MSG_TAIL {
                        self.finish_response()
                    } else {
                        Ok(ParseOutcome::Pending)
                    }
                } else {
                    self.buf.push(byte, FIELD_BUF_CAP)?;
                    Ok(ParseOutcome::Pending)
                }
            }

            ReceiveState::Done | ReceiveState::Failed => Err(ParseError::InternalState),
        }
    }

    /// Event-vs-response framing decision after the device id closes.
    ///
    /// Hook point only: no event ids are defined in the current catalog, so
    /// every inbound message carries an error code.
    fn is_event_frame(&self) -> bool {
        false
    }

    /// Advance to the next field: switch state and clear the shared buffer.
    fn next_field(&mut self, state: ReceiveState) {
        self.state = state;
        self.buf.clear();
    }

    fn resolve_msg_id(&mut self) -> Result<(), ParseError> {
        let id = MsgId::resolve(self.buf.as_slice()).ok_or(ParseError::UnknownMnemonic)?;
        self.msg_id = Some(id);
        Ok(())
    }

    fn current_msg_id(&self) -> Result<MsgId, ParseError> {
        self.msg_id.ok_or(ParseError::InternalState)
    }

    fn take_device_id(&mut self) -> Result<(), ParseError> {
        self.device_id = parse_decimal(self.buf.as_slice())?;
        Ok(())
    }

    fn take_error_code(&mut self) -> Result<(), ParseError> {
        let code = parse_decimal(self.buf.as_slice())?;
        self.error_code = u8::try_from(code).map_err(|_| ParseError::DecodeFailure)?;
        Ok(())
    }

    fn decode_command_argument(&mut self) -> Result<(), ParseError> {
        let id = self.current_msg_id()?;
        if self.arg_count >= MAX_ARG_COUNT {
            return Err(ParseError::UnexpectedArgument);
        }
        payload::decode_command_arg(id, self.arg_count, self.buf.as_slice(), &mut self.payload)?;
        self.arg_count += 1;
        Ok(())
    }

    fn decode_response_argument(&mut self) -> Result<(), ParseError> {
        let id = self.current_msg_id()?;
        if self.arg_count >= MAX_ARG_COUNT {
            return Err(ParseError::UnexpectedArgument);
        }
        payload::decode_response_arg(id, self.arg_count, self.buf.as_slice(), &mut self.payload)?;
        self.arg_count += 1;
        Ok(())
    }

    /// Arguments the command grammar still requires at the terminator.
    fn required_command_args(&self) -> Result<u8, ParseError> {
        match self.current_msg_id()? {
            MsgId::RegisterAccess => match &self.payload {
                TxtPayload::RegisterAccess(ra) if ra.mode == RwMode::Write => Ok(5),
                _ => Ok(4),
            },
            MsgId::ReadHwVersion | MsgId::ReadFwVersion => Ok(0),
        }
    }

    fn finish_command(&mut self) -> Result<ParseOutcome, ParseError> {
        let id = self.current_msg_id()?;
        if self.arg_count < self.required_command_args()? {
            return Err(ParseError::MissingArgument);
        }
        self.state = ReceiveState::Done;
        self.buf.clear();
        let msg = self.snapshot(id, None);
        self.hooks.on_parse_ended();
        self.hooks.on_parsed(&msg);
        // The command path always leaves the parser ready for the next
        // message.
        self.clear();
        Ok(ParseOutcome::Complete(msg))
    }

    fn finish_response(&mut self) -> Result<ParseOutcome, ParseError> {
        let id = self.current_msg_id()?;
        self.state = ReceiveState::Done;
        self.buf.clear();
        let msg = self.snapshot(id, Some(self.error_code));
        self.hooks.on_parsed(&msg);
        if self.response_clear == ClearPolicy::Auto {
            self.clear();
        }
        Ok(ParseOutcome::Complete(msg))
    }

    fn snapshot(&self, msg_id: MsgId, error: Option<u8>) -> TxtMessage {
        TxtMessage {
            device_id: self.device_id,
            msg_id,
            error,
            payload: self.payload.clone(),
        }
    }

    fn fail(&mut self, err: ParseError) -> ParseError {
        // Keep the failed state observable, but never a stale field.
        if self.state != ReceiveState::Failed {
            self.state = ReceiveState::Failed;
            self.buf.clear();
        }
        err
    }
}

fn is_mnemonic_char(byte: u8) -> bool {
    byte.is_ascii_alphanumeric()
}
