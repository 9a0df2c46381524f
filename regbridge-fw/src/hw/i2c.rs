// SPDX-License-Identifier: MIT

//! I2C register access for the attached sensor.
//!
//! The VL6180X uses 16-bit big-endian register addresses and big-endian
//! multi-byte values. Reads are issued as an address write followed by a
//! separate receive (the sensor tolerates the stop between them).

use embedded_hal::i2c::I2c;

use regbridge_core::dispatch::{RegWidth, RegisterIo};

/// [`RegisterIo`] implementation over any blocking I2C bus.
pub struct RegisterBus<I2C> {
    i2c: I2C,
}

impl<I2C: I2c> RegisterBus<I2C> {
    pub fn new(i2c: I2C) -> Self {
        Self { i2c }
    }

    pub fn free(self) -> I2C {
        self.i2c
    }
}

impl<I2C: I2c> RegisterIo for RegisterBus<I2C> {
    type Error = I2C::Error;

    fn read(&mut self, width: RegWidth, dev_addr: u16, reg_addr: u16) -> Result<u32, Self::Error> {
        let addr = dev_addr as u8;
        let mut buf = [0u8; 4];
        let n = width.bytes();

        self.i2c.write(addr, &reg_addr.to_be_bytes())?;
        self.i2c.read(addr, &mut buf[..n])?;

        let mut value = 0u32;
        for &b in &buf[..n] {
            value = (value << 8) | u32::from(b);
        }
        Ok(value)
    }

    fn write(
        &mut self,
        width: RegWidth,
        dev_addr: u16,
        reg_addr: u16,
        value: u32,
    ) -> Result<(), Self::Error> {
        let addr = dev_addr as u8;
        let n = width.bytes();

        // Register address followed by the value, both big-endian.
        let mut buf = [0u8; 6];
        buf[..2].copy_from_slice(&reg_addr.to_be_bytes());
        buf[2..2 + n].copy_from_slice(&value.to_be_bytes()[4 - n..]);

        self.i2c.write(addr, &buf[..2 + n])
    }
}
