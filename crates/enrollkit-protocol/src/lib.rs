//! Card wire protocol for the enrollment reader link.
//!
//! Implements the APDU-like half-duplex framing spoken to the contactless
//! reader: fixed 4-byte command header, one length byte, payload, and a
//! trailing XOR checksum. Responses end with an ISO 7816-style status pair;
//! `90 00` is the success marker.
//!
//! The [`CardProtocolEngine`] drives a [`SerialTransport`] in strict
//! request/response order: a new command is never issued before the previous
//! response's terminal marker (or its timeout) has been observed.
//!
//! [`SerialTransport`]: enrollkit_serial::SerialTransport

pub mod commands;
pub mod engine;
pub mod frame;
pub mod response;

pub use commands::CardCommand;
pub use engine::CardProtocolEngine;
pub use frame::Frame;
pub use response::{CardResponse, ends_with_status};
