// SPDX-License-Identifier: MIT

//! Incremental text protocol: message catalog, field accumulation, payload
//! decoding, and the command/response state machines.

pub mod builder;
pub mod error;
pub mod field;
pub mod hooks;
pub mod messages;
pub mod parser;
pub mod payload;

pub use error::ParseError;
pub use hooks::{NoHooks, ParseHooks};
pub use messages::{MsgId, RegisterAccess, RwMode, TxtMessage, TxtPayload, Version};
pub use parser::{ClearPolicy, ParseOutcome, TxtParser};
