// SPDX-License-Identifier: MIT

//! Command dispatch: turns a parsed message into a register access and a
//! formatted text response.
//!
//! Runs strictly after the parser reaches a terminal state, so a failing or
//! slow bus access can never corrupt parser state. Hardware access goes
//! through the [`RegisterIo`] capability; the register width is resolved
//! here from a static address table, never by the parser.

use core::fmt::Write as _;

use heapless::String;
use log::{debug, warn};

use crate::protocol::messages::{MsgId, RegisterAccess, TxtMessage, TxtPayload, MSG_TAIL};

/// Upper bound of a formatted response line.
pub const RESPONSE_MAX_LEN: usize = 64;

/// Status code reported in responses.
pub const STATUS_OK: u8 = 0;
pub const STATUS_ERROR: u8 = 1;

/// Hardware version reported by `RHV`.
pub const HW_VERSION: (u8, u8, u8) = (1, 0, 0);
/// Firmware version reported by `RFV`.
pub const FW_VERSION: (u8, u8, u8) = (1, 2, 3);

/// Access width of a sensor register.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegWidth {
    Byte,
    Word,
    DWord,
}

impl RegWidth {
    pub const fn bytes(self) -> usize {
        match self {
            RegWidth::Byte => 1,
            RegWidth::Word => 2,
            RegWidth::DWord => 4,
        }
    }
}

/// Register read/write capability consumed by the dispatcher.
///
/// Implementations may block with their own timeout; by the time this runs
/// the parser is already done with the message.
pub trait RegisterIo {
    type Error;

    fn read(&mut self, width: RegWidth, dev_addr: u16, reg_addr: u16) -> Result<u32, Self::Error>;

    fn write(
        &mut self,
        width: RegWidth,
        dev_addr: u16,
        reg_addr: u16,
        value: u32,
    ) -> Result<(), Self::Error>;
}

/// VL6180X register map: address to access width.
#[rustfmt::skip]
const REG_WIDTHS: &[(u16, RegWidth)] = &[
    (0x0000, RegWidth::Byte),
    (0x0001, RegWidth::Byte),
    (0x0002, RegWidth::Byte),
    (0x0003, RegWidth::Byte),
    (0x0004, RegWidth::Byte),
    (0x0006, RegWidth::Byte),
    (0x0007, RegWidth::Byte),
    (0x0008, RegWidth::Word),
    (0x0010, RegWidth::Byte),
    (0x0011, RegWidth::Byte),
    (0x0012, RegWidth::Byte),
    (0x0014, RegWidth::Byte),
    (0x0015, RegWidth::Byte),
    (0x0016, RegWidth::Byte),
    (0x0017, RegWidth::Byte),
    (0x0018, RegWidth::Byte),
    (0x0019, RegWidth::Byte),
    (0x001A, RegWidth::Byte),
    (0x001B, RegWidth::Byte),
    (0x001C, RegWidth::Byte),
    (0x001E, RegWidth::Word),
    (0x0021, RegWidth::Byte),
    (0x0022, RegWidth::Word),
    (0x0024, RegWidth::Byte),
    (0x0025, RegWidth::Byte),
    (0x0026, RegWidth::Word),
    (0x002C, RegWidth::Byte),
    (0x002D, RegWidth::Byte),
    (0x002E, RegWidth::Byte),
    (0x0031, RegWidth::Byte),
    (0x0038, RegWidth::Byte),
    (0x003A, RegWidth::Word),
    (0x003C, RegWidth::Word),
    (0x003E, RegWidth::Byte),
    (0x003F, RegWidth::Byte),
    (0x0040, RegWidth::Word),
    (0x004D, RegWidth::Byte),
    (0x004E, RegWidth::Byte),
    (0x004F, RegWidth::Byte),
    (0x0050, RegWidth::Word),
    (0x0062, RegWidth::Byte),
    (0x0066, RegWidth::Word),
    (0x0068, RegWidth::Word),
    (0x006C, RegWidth::DWord),
    (0x0070, RegWidth::DWord),
    (0x0074, RegWidth::DWord),
    (0x0078, RegWidth::DWord),
    (0x007C, RegWidth::DWord),
    (0x010A, RegWidth::Byte),
    (0x0119, RegWidth::Byte),
    (0x0120, RegWidth::Byte),
    (0x0212, RegWidth::Byte),
    (0x02A3, RegWidth::Byte),
];

/// Access width of `reg_addr`, or `None` for an unmapped register.
pub fn reg_width(reg_addr: u16) -> Option<RegWidth> {
    REG_WIDTHS
        .iter()
        .find(|(addr, _)| *addr == reg_addr)
        .map(|(_, width)| *width)
}

/// Per-device dispatcher state.
pub struct Relay {
    device_id: u32,
}

impl Relay {
    pub fn new(device_id: u32) -> Self {
        Self { device_id }
    }

    pub fn device_id(&self) -> u32 {
        self.device_id
    }

    /// Handle one parsed command, writing the response line into `out`.
    ///
    /// Returns `false` (with `out` empty) when the message is addressed to
    /// a different device and must be ignored.
    pub fn handle<B: RegisterIo>(
        &self,
        msg: &TxtMessage,
        bus: &mut B,
        out: &mut String<RESPONSE_MAX_LEN>,
    ) -> bool {
        out.clear();
        if msg.device_id != self.device_id {
            return false;
        }

        match (msg.msg_id, &msg.payload) {
            (MsgId::ReadHwVersion, _) => version_response(out, msg, HW_VERSION),
            (MsgId::ReadFwVersion, _) => version_response(out, msg, FW_VERSION),
            (MsgId::RegisterAccess, TxtPayload::RegisterAccess(ra)) => {
                self.register_access(msg, ra, bus, out)
            }
            (MsgId::RegisterAccess, _) => error_response(out, msg),
        }
        !out.is_empty()
    }

    fn register_access<B: RegisterIo>(
        &self,
        msg: &TxtMessage,
        ra: &RegisterAccess,
        bus: &mut B,
        out: &mut String<RESPONSE_MAX_LEN>,
    ) {
        let Some(width) = reg_width(ra.reg_addr) else {
            warn!("unmapped register {:#06x}", ra.reg_addr);
            error_response(out, msg);
            return;
        };

        match ra.value {
            None => match bus.read(width, ra.dev_addr, ra.reg_addr) {
                Ok(value) => {
                    debug!("read {:#06x} -> {value:#x}", ra.reg_addr);
                    let _ = write!(
                        out,
                        "{}:{},{},{},{},{},{},{value}{}",
                        msg.msg_id.mnemonic(),
                        msg.device_id,
                        STATUS_OK,
                        ra.mode.wire_value(),
                        ra.bus,
                        ra.dev_addr,
                        ra.reg_addr,
                        MSG_TAIL as char
                    );
                }
                Err(_) => {
                    warn!("register read failed at {:#06x}", ra.reg_addr);
                    error_response(out, msg);
                }
            },
            Some(value) => match bus.write(width, ra.dev_addr, ra.reg_addr, value) {
                Ok(()) => {
                    debug!("wrote {value:#x} to {:#06x}", ra.reg_addr);
                    ok_response(out, msg);
                }
                Err(_) => {
                    warn!("register write failed at {:#06x}", ra.reg_addr);
                    error_response(out, msg);
                }
            },
        }
    }
}

fn version_response(out: &mut String<RESPONSE_MAX_LEN>, msg: &TxtMessage, v: (u8, u8, u8)) {
    let _ = write!(
        out,
        "{}:{},{},{}.{}.{}{}",
        msg.msg_id.mnemonic(),
        msg.device_id,
        STATUS_OK,
        v.0,
        v.1,
        v.2,
        MSG_TAIL as char
    );
}

fn ok_response(out: &mut String<RESPONSE_MAX_LEN>, msg: &TxtMessage) {
    let _ = write!(
        out,
        "{}:{},{}{}",
        msg.msg_id.mnemonic(),
        msg.device_id,
        STATUS_OK,
        MSG_TAIL as char
    );
}

fn error_response(out: &mut String<RESPONSE_MAX_LEN>, msg: &TxtMessage) {
    out.clear();
    let _ = write!(
        out,
        "{}:{},{}{}",
        msg.msg_id.mnemonic(),
        msg.device_id,
        STATUS_ERROR,
        MSG_TAIL as char
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::messages::RwMode;

    /// In-memory register bus for dispatcher tests.
    #[derive(Default)]
    struct FakeBus {
        read_value: u32,
        fail: bool,
        last_read: Option<(RegWidth, u16, u16)>,
        last_write: Option<(RegWidth, u16, u16, u32)>,
    }

    impl RegisterIo for FakeBus {
        type Error = ();

        fn read(&mut self, width: RegWidth, dev: u16, reg: u16) -> Result<u32, ()> {
            self.last_read = Some((width, dev, reg));
            if self.fail {
                Err(())
            } else {
                Ok(self.read_value)
            }
        }

        fn write(&mut self, width: RegWidth, dev: u16, reg: u16, value: u32) -> Result<(), ()> {
            self.last_write = Some((width, dev, reg, value));
            if self.fail {
                Err(())
            } else {
                Ok(())
            }
        }
    }

    fn register_msg(reg_addr: u16, value: Option<u32>) -> TxtMessage {
        TxtMessage {
            device_id: 1,
            msg_id: MsgId::RegisterAccess,
            error: None,
            payload: TxtPayload::RegisterAccess(RegisterAccess {
                mode: if value.is_some() {
                    RwMode::Write
                } else {
                    RwMode::Read
                },
                bus: 1,
                dev_addr: 0x29,
                reg_addr,
                value,
            }),
        }
    }

    #[test]
    fn width_table_lookup() {
        assert_eq!(reg_width(0x0000), Some(RegWidth::Byte));
        assert_eq!(reg_width(0x0040), Some(RegWidth::Word));
        assert_eq!(reg_width(0x006C), Some(RegWidth::DWord));
        assert_eq!(reg_width(0x9999), None);
        assert_eq!(RegWidth::DWord.bytes(), 4);
    }

    #[test]
    fn register_read_response() {
        let relay = Relay::new(1);
        let mut bus = FakeBus {
            read_value: 42,
            ..FakeBus::default()
        };
        let mut out = String::new();

        assert!(relay.handle(&register_msg(0x0040, None), &mut bus, &mut out));
        assert_eq!(out.as_str(), "RwI:1,0,0,1,41,64,42\n");
        assert_eq!(bus.last_read, Some((RegWidth::Word, 0x29, 0x0040)));
    }

    #[test]
    fn register_write_response() {
        let relay = Relay::new(1);
        let mut bus = FakeBus::default();
        let mut out = String::new();

        assert!(relay.handle(&register_msg(0x0000, Some(255)), &mut bus, &mut out));
        assert_eq!(out.as_str(), "RwI:1,0\n");
        assert_eq!(bus.last_write, Some((RegWidth::Byte, 0x29, 0x0000, 255)));
    }

    #[test]
    fn unmapped_register_is_an_error_response() {
        let relay = Relay::new(1);
        let mut bus = FakeBus::default();
        let mut out = String::new();

        assert!(relay.handle(&register_msg(0x9999, None), &mut bus, &mut out));
        assert_eq!(out.as_str(), "RwI:1,1\n");
        // The bus was never touched.
        assert_eq!(bus.last_read, None);
    }

    #[test]
    fn bus_failure_is_an_error_response() {
        let relay = Relay::new(1);
        let mut bus = FakeBus {
            fail: true,
            ..FakeBus::default()
        };
        let mut out = String::new();

        assert!(relay.handle(&register_msg(0x0000, None), &mut bus, &mut out));
        assert_eq!(out.as_str(), "RwI:1,1\n");
    }

    #[test]
    fn version_responses() {
        let relay = Relay::new(1);
        let mut bus = FakeBus::default();
        let mut out = String::new();

        let msg = TxtMessage {
            device_id: 1,
            msg_id: MsgId::ReadHwVersion,
            error: None,
            payload: TxtPayload::None,
        };
        assert!(relay.handle(&msg, &mut bus, &mut out));
        assert_eq!(out.as_str(), "RHV:1,0,1.0.0\n");

        let msg = TxtMessage {
            msg_id: MsgId::ReadFwVersion,
            ..msg
        };
        assert!(relay.handle(&msg, &mut bus, &mut out));
        assert_eq!(out.as_str(), "RFV:1,0,1.2.3\n");
    }

    #[test]
    fn other_devices_are_ignored() {
        let relay = Relay::new(1);
        let mut bus = FakeBus::default();
        let mut out = String::new();

        let mut msg = register_msg(0x0000, None);
        msg.device_id = 2;
        assert!(!relay.handle(&msg, &mut bus, &mut out));
        assert!(out.is_empty());
        assert_eq!(bus.last_read, None);
    }
}
