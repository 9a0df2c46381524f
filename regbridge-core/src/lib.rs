// SPDX-License-Identifier: MIT

//! # regbridge core
//!
//! Portable core of the regbridge command relay: ASCII commands arriving
//! byte by byte over a serial link are parsed, dispatched as register
//! accesses on an attached sensor, and answered with formatted text
//! responses. Everything here is `no_std`, allocation-free, and
//! hardware-independent; the firmware crate supplies the serial and I2C
//! plumbing.
//!
//! ## Crate Structure
//!
//! | Module | Purpose |
//! | ------ | -------- |
//! | [`protocol`] | Text message catalog, byte-at-a-time parser, encoder |
//! | [`dispatch`] | Register-access dispatch and response formatting |
//! | [`frame`] | Build-side helpers for the framed binary protocol |

#![cfg_attr(not(test), no_std)]

pub mod dispatch;
pub mod frame;
pub mod protocol;
