//! Hardware abstractions over the HAL peripherals.

pub mod i2c;
pub mod led;
pub mod usart;

pub use i2c::RegisterBus;
pub use led::Led;
pub use usart::Usart;
