// SPDX-License-Identifier: MIT

//! Parse failure taxonomy.

use core::fmt;

/// Why a byte-feed call failed.
///
/// Every variant is terminal for the in-flight message: the parser moves to
/// its failed state and stays there until the caller clears it. Recovery
/// policy (typically: discard input up to the next terminator, then clear)
/// belongs to the caller, never to the parser.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseError {
    /// A field grew past its declared bound. The overflowing byte is
    /// rejected before it is stored.
    FieldOverflow,
    /// The mnemonic field did not resolve against the catalog.
    UnknownMnemonic,
    /// An argument was supplied to a command that takes none, or beyond
    /// the declared arity.
    UnexpectedArgument,
    /// The terminator arrived before all required arguments were supplied.
    MissingArgument,
    /// An argument could not be mapped to its typed field, including
    /// out-of-range decimal values (never silently truncated).
    DecodeFailure,
    /// A byte arrived in a state that cannot accept one, e.g. after a
    /// terminal state without an intervening clear.
    InternalState,
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ParseError::FieldOverflow => "field exceeds its length bound",
            ParseError::UnknownMnemonic => "unknown message mnemonic",
            ParseError::UnexpectedArgument => "argument beyond declared arity",
            ParseError::MissingArgument => "terminator before required arguments",
            ParseError::DecodeFailure => "argument does not decode to its typed field",
            ParseError::InternalState => "parser in an unexpected state",
        };
        f.write_str(s)
    }
}

impl core::error::Error for ParseError {}
