// SPDX-License-Identifier: MIT

//! Notification hooks fired by the parser.
//!
//! The hook object is injected as a generic parameter and carries its own
//! state. Hooks survive [`TxtParser::clear`].
//!
//! [`TxtParser::clear`]: crate::protocol::parser::TxtParser::clear

use crate::protocol::messages::TxtMessage;

/// Optional callbacks around a parse. All methods default to no-ops.
pub trait ParseHooks {
    /// First byte of a new command message was accepted.
    fn on_parse_started(&mut self) {}

    /// A command message reached its terminal state successfully.
    fn on_parse_ended(&mut self) {}

    /// A message parsed completely; `msg` is the snapshot the caller would
    /// otherwise receive from the byte-feed call.
    fn on_parsed(&mut self, msg: &TxtMessage) {
        let _ = msg;
    }
}

/// Default hook set: does nothing.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoHooks;

impl ParseHooks for NoHooks {}
