// SPDX-License-Identifier: MIT

#![no_main]
#![no_std]

use cortex_m_rt::entry;
use panic_halt as _;

use hal::{
    i2c::{BlockingI2c, Mode},
    pac,
    prelude::*,
    serial::{Config, Serial},
};
use stm32f7xx_hal as hal;

use heapless::String;

use regbridge_core::dispatch::{Relay, RESPONSE_MAX_LEN};
use regbridge_core::protocol::{messages::MSG_TAIL, ParseOutcome, TxtParser};

mod hw;
use hw::{Led, RegisterBus, Usart};

// TODO: read the device id from the DIP switch once the carrier board has one.
const DEVICE_ID: u32 = 1;

#[entry]
fn main() -> ! {
    // Peripherals
    let dp = pac::Peripherals::take().unwrap();

    // Clocks
    let rcc = dp.RCC.constrain();
    let clocks = rcc.cfgr.freeze();
    let mut apb1 = rcc.apb1;

    // GPIO
    let gpiob = dp.GPIOB.split();
    let gpiod = dp.GPIOD.split();

    // LED (LD1 on the Nucleo-F722ZE)
    let mut led_green = Led::active_high(gpiob.pb0);

    // USART3 (ST-LINK virtual COM port)
    let tx = gpiod.pd8.into_alternate::<7>();
    let rx = gpiod.pd9.into_alternate::<7>();
    let usart_cfg = Config {
        baud_rate: 115_200.bps(),
        ..Default::default()
    };
    let serial = Serial::new(dp.USART3, (tx, rx), &clocks, usart_cfg);
    let mut usart = Usart::new(serial);

    // I2C1 to the VL6180X
    let scl = gpiob.pb8.into_alternate_open_drain::<4>();
    let sda = gpiob.pb9.into_alternate_open_drain::<4>();
    let i2c = BlockingI2c::i2c1(
        dp.I2C1,
        (scl, sda),
        Mode::standard(100_000.Hz()),
        &clocks,
        &mut apb1,
        10_000,
    );
    let mut bus = RegisterBus::new(i2c);

    let mut parser = TxtParser::new();
    let relay = Relay::new(DEVICE_ID);
    let mut response = String::<RESPONSE_MAX_LEN>::new();

    // After a parse error, discard bytes until the next terminator so the
    // parser restarts on a message boundary.
    let mut resync = false;

    loop {
        let byte = match usart.read_byte() {
            Ok(b) => b,
            Err(_) => {
                cortex_m::asm::nop();
                continue;
            }
        };

        if resync {
            if byte == MSG_TAIL {
                parser.clear();
                resync = false;
            }
            continue;
        }

        match parser.parse_command_byte(byte) {
            Ok(ParseOutcome::Pending) => {}
            Ok(ParseOutcome::Complete(msg)) => {
                if relay.handle(&msg, &mut bus, &mut response) {
                    usart.write_str(response.as_str());
                    usart.flush();
                    led_green.toggle();
                }
            }
            Err(_) => {
                resync = byte != MSG_TAIL;
                if !resync {
                    parser.clear();
                }
            }
        }
    }
}
