// SPDX-License-Identifier: MIT

//! Message definitions for the regbridge text protocol.
//!
//! A command is `<mnemonic>':'<device_id>[','<arg>]*'\n'`; a response or
//! event additionally carries an error code as its first argument. Mnemonics
//! are fixed-width ASCII and resolved against the catalog in [`MsgId`].

use heapless::Vec;

/// Separator between the mnemonic and the device id.
pub const DEVICE_DELIMITER: u8 = b':';
/// Separator between the device id, the error code, and arguments.
pub const ARG_DELIMITER: u8 = b',';
/// Message terminator.
pub const MSG_TAIL: u8 = b'\n';

/// Exact mnemonic length of every catalog entry.
pub const MNEMONIC_LEN: usize = 3;
/// Bound of the mnemonic field accumulator.
///
/// Deliberately wider than [`MNEMONIC_LEN`] so that a wrong-length mnemonic
/// reaches the delimiter and fails catalog resolution (`UnknownMnemonic`)
/// instead of tripping the buffer bound first.
pub const MNEMONIC_FIELD_MAX: usize = 8;
/// Maximum digit count of a device id field (fits a decimal `u32`).
pub const DEVICE_ID_MAX_DIGITS: usize = 10;
/// Maximum digit count of an error code field.
pub const ERROR_CODE_MAX_DIGITS: usize = 3;
/// Receive buffer capacity, which also bounds a single argument field.
pub const FIELD_BUF_CAP: usize = 32;
/// Maximum byte length of a version-report payload.
pub const VERSION_MAX_LEN: usize = 16;
/// Maximum argument count of any catalog entry (register write).
pub const MAX_ARG_COUNT: u8 = 5;

/// Message identifier catalog.
///
/// Extending the protocol means adding a variant here plus its arms in
/// [`MsgId::resolve`] and [`MsgId::takes_arguments`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MsgId {
    /// `RHV` - report the hardware version (no command arguments).
    ReadHwVersion,
    /// `RFV` - report the firmware version (no command arguments).
    ReadFwVersion,
    /// `RwI` - register access: mode, bus, device address, register
    /// address, and (write only) a value.
    RegisterAccess,
}

impl MsgId {
    /// Resolve a completed mnemonic field. Exact-length, case-sensitive,
    /// no prefix matching.
    pub fn resolve(mnemonic: &[u8]) -> Option<MsgId> {
        match mnemonic {
            b"RHV" => Some(MsgId::ReadHwVersion),
            b"RFV" => Some(MsgId::ReadFwVersion),
            b"RwI" => Some(MsgId::RegisterAccess),
            _ => None,
        }
    }

    pub const fn mnemonic(self) -> &'static str {
        match self {
            MsgId::ReadHwVersion => "RHV",
            MsgId::ReadFwVersion => "RFV",
            MsgId::RegisterAccess => "RwI",
        }
    }

    /// Whether the command grammar for this id carries arguments at all.
    pub const fn takes_arguments(self) -> bool {
        matches!(self, MsgId::RegisterAccess)
    }
}

/// Register access direction, decoded from the first `RwI` argument.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RwMode {
    Read,
    Write,
}

impl RwMode {
    /// Numeric value used on the wire (0 = read, 1 = write).
    pub const fn wire_value(self) -> u8 {
        match self {
            RwMode::Read => 0,
            RwMode::Write => 1,
        }
    }
}

/// Typed `RwI` payload, populated field by field as arguments decode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RegisterAccess {
    pub mode: RwMode,
    /// Index of the peripheral bus carrying the target device.
    pub bus: u8,
    pub dev_addr: u16,
    pub reg_addr: u16,
    /// Present only for write commands.
    pub value: Option<u32>,
}

impl RegisterAccess {
    /// Payload skeleton created when the mode argument decodes; remaining
    /// fields are filled in by later arguments.
    pub(crate) fn with_mode(mode: RwMode) -> Self {
        Self {
            mode,
            bus: 0,
            dev_addr: 0,
            reg_addr: 0,
            value: None,
        }
    }
}

/// Version bytes copied verbatim from a version-report argument.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Version {
    bytes: Vec<u8, VERSION_MAX_LEN>,
}

impl Version {
    pub(crate) fn from_bytes(bytes: &[u8]) -> Option<Version> {
        let mut v = Version::default();
        v.bytes.extend_from_slice(bytes).ok()?;
        Some(v)
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Version text, if the peer sent valid ASCII.
    pub fn as_str(&self) -> Option<&str> {
        core::str::from_utf8(&self.bytes).ok()
    }
}

/// Payload tagged by message id. Every variant is populated by explicit
/// decoding only, never by reinterpreting raw buffer bytes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum TxtPayload {
    #[default]
    None,
    HwVersion(Version),
    FwVersion(Version),
    RegisterAccess(RegisterAccess),
}

/// Immutable snapshot of one fully parsed message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TxtMessage {
    pub device_id: u32,
    pub msg_id: MsgId,
    /// Status code; populated only on the response/event path.
    pub error: Option<u8>,
    pub payload: TxtPayload,
}
