// SPDX-License-Identifier: MIT

//! End-to-end relay loop: command bytes in, response bytes out, response
//! reparsed on the peer side.

use heapless::String;

use regbridge_core::dispatch::{RegWidth, RegisterIo, Relay, RESPONSE_MAX_LEN};
use regbridge_core::protocol::builder::encode_command;
use regbridge_core::protocol::{
    MsgId, ParseOutcome, RegisterAccess, RwMode, TxtMessage, TxtParser, TxtPayload,
};

struct ScriptedBus {
    read_value: u32,
    writes: Vec<(RegWidth, u16, u16, u32)>,
}

impl RegisterIo for ScriptedBus {
    type Error = ();

    fn read(&mut self, _width: RegWidth, _dev: u16, _reg: u16) -> Result<u32, ()> {
        Ok(self.read_value)
    }

    fn write(&mut self, width: RegWidth, dev: u16, reg: u16, value: u32) -> Result<(), ()> {
        self.writes.push((width, dev, reg, value));
        Ok(())
    }
}

/// Feed `input` one byte at a time, as the receive interrupt would.
fn parse_command_bytes(parser: &mut TxtParser, input: &[u8]) -> TxtMessage {
    let mut complete = None;
    for &b in input {
        if let ParseOutcome::Complete(msg) = parser.parse_command_byte(b).unwrap() {
            complete = Some(msg);
        }
    }
    complete.expect("no complete message")
}

fn parse_response_bytes(parser: &mut TxtParser, input: &[u8]) -> TxtMessage {
    let mut complete = None;
    for &b in input {
        if let ParseOutcome::Complete(msg) = parser.parse_response_byte(b).unwrap() {
            complete = Some(msg);
        }
    }
    complete.expect("no complete message")
}

#[test]
fn register_read_full_loop() {
    let mut parser = TxtParser::new();
    let relay = Relay::new(1);
    let mut bus = ScriptedBus {
        read_value: 200,
        writes: Vec::new(),
    };

    let msg = parse_command_bytes(&mut parser, b"RwI:1,0,1,41,0\n");
    let mut out = String::<RESPONSE_MAX_LEN>::new();
    assert!(relay.handle(&msg, &mut bus, &mut out));
    assert_eq!(out.as_str(), "RwI:1,0,0,1,41,0,200\n");
}

#[test]
fn register_write_full_loop() {
    let mut parser = TxtParser::new();
    let relay = Relay::new(1);
    let mut bus = ScriptedBus {
        read_value: 0,
        writes: Vec::new(),
    };

    // Build the command through the encoder instead of a literal.
    let command = TxtMessage {
        device_id: 1,
        msg_id: MsgId::RegisterAccess,
        error: None,
        payload: TxtPayload::RegisterAccess(RegisterAccess {
            mode: RwMode::Write,
            bus: 1,
            dev_addr: 41,
            reg_addr: 0x0022,
            value: Some(1000),
        }),
    };
    let encoded = encode_command(&command).unwrap();
    let parsed = parse_command_bytes(&mut parser, encoded.as_bytes());
    assert_eq!(parsed, command);

    let mut out = String::<RESPONSE_MAX_LEN>::new();
    assert!(relay.handle(&parsed, &mut bus, &mut out));
    assert_eq!(out.as_str(), "RwI:1,0\n");
    assert_eq!(bus.writes, vec![(RegWidth::Word, 41, 0x0022, 1000)]);
}

#[test]
fn version_request_response_reparses_on_the_peer() {
    let mut device_parser = TxtParser::new();
    let mut host_parser = TxtParser::new();
    let relay = Relay::new(7);
    let mut bus = ScriptedBus {
        read_value: 0,
        writes: Vec::new(),
    };

    // Device side: parse the command and produce the response.
    let msg = parse_command_bytes(&mut device_parser, b"RFV:7\n");
    let mut out = String::<RESPONSE_MAX_LEN>::new();
    assert!(relay.handle(&msg, &mut bus, &mut out));

    // Host side: the response parses back into a typed message.
    let reply = parse_response_bytes(&mut host_parser, out.as_bytes());
    assert_eq!(reply.device_id, 7);
    assert_eq!(reply.msg_id, MsgId::ReadFwVersion);
    assert_eq!(reply.error, Some(0));
    match reply.payload {
        TxtPayload::FwVersion(v) => assert_eq!(v.as_str(), Some("1.2.3")),
        other => panic!("unexpected payload: {other:?}"),
    }
}

#[test]
fn commands_for_other_devices_produce_no_response() {
    let mut parser = TxtParser::new();
    let relay = Relay::new(7);
    let mut bus = ScriptedBus {
        read_value: 0,
        writes: Vec::new(),
    };

    let msg = parse_command_bytes(&mut parser, b"RHV:8\n");
    let mut out = String::<RESPONSE_MAX_LEN>::new();
    assert!(!relay.handle(&msg, &mut bus, &mut out));
    assert!(out.is_empty());
}
