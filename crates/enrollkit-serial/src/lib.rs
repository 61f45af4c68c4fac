//! Serial byte-channel abstraction for the card reader link.
//!
//! The enrollment station talks to its contactless reader over an exclusive
//! serial link. This crate defines the [`SerialTransport`] capability trait
//! plus two backends: [`NativeSerial`] over a real system port and
//! [`MockSerial`] for tests and development without hardware.

#![allow(async_fn_in_trait)]

pub mod config;
pub mod mock;
pub mod native;
pub mod traits;

pub use config::{DataBits, DeviceFilter, FlowControl, Parity, SerialParams, StopBits};
pub use mock::{MockSerial, MockSerialHandle};
pub use native::NativeSerial;
pub use traits::SerialTransport;
