// SPDX-License-Identifier: MIT

//! USART abstraction layer.
//!
//! Wraps a configured HAL serial instance with blocking transmit helpers
//! and a non-blocking single-byte receive, which is all the byte-at-a-time
//! protocol path needs.

use nb::block;

use stm32f7xx_hal::{
    prelude::*,
    serial::{Error, Instance, Pins, Rx, Serial, Tx},
};

pub struct Usart<U: Instance> {
    tx: Tx<U>,
    rx: Rx<U>,
}

impl<U: Instance> Usart<U> {
    pub fn new<PINS: Pins<U>>(serial: Serial<U, PINS>) -> Self {
        let (tx, rx) = serial.split();
        Self { tx, rx }
    }

    /// Read one byte if the receive register holds one.
    #[inline]
    pub fn read_byte(&mut self) -> nb::Result<u8, Error> {
        self.rx.read()
    }

    #[inline]
    pub fn write_byte(&mut self, b: u8) {
        let _ = block!(self.tx.write(b));
    }

    pub fn write_str(&mut self, s: &str) {
        for &b in s.as_bytes() {
            self.write_byte(b);
        }
    }

    /// Block until the hardware TX FIFO/drain is flushed.
    #[inline]
    pub fn flush(&mut self) {
        let _ = block!(self.tx.flush());
    }
}
