//! Serial link configuration types.
//!
//! Port parameters default to the ACR122U-class reader profile the station
//! ships with: 115200 baud, 8 data bits, 1 stop bit, no parity, no flow
//! control.

use enrollkit_core::constants::{DEFAULT_BAUD_RATE, READER_USB_VENDOR_ID};

/// Number of data bits per character.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataBits {
    Five,
    Six,
    Seven,
    Eight,
}

/// Number of stop bits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopBits {
    One,
    Two,
}

/// Parity checking mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Parity {
    None,
    Odd,
    Even,
}

/// Flow control mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlowControl {
    None,
    Software,
    Hardware,
}

/// Parameters used when opening a serial link.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SerialParams {
    pub baud_rate: u32,
    pub data_bits: DataBits,
    pub stop_bits: StopBits,
    pub parity: Parity,
    pub flow_control: FlowControl,
}

impl Default for SerialParams {
    fn default() -> Self {
        Self {
            baud_rate: DEFAULT_BAUD_RATE,
            data_bits: DataBits::Eight,
            stop_bits: StopBits::One,
            parity: Parity::None,
            flow_control: FlowControl::None,
        }
    }
}

/// Device selection filter used when opening a link.
///
/// A port matches when its USB vendor ID equals `usb_vendor_id` (if set), or
/// when its system path equals `path` (if set). An explicit path takes
/// precedence over enumeration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceFilter {
    /// USB vendor ID to match during enumeration.
    pub usb_vendor_id: Option<u16>,

    /// Explicit port path (e.g. `/dev/ttyUSB0`), bypassing enumeration.
    pub path: Option<String>,
}

impl Default for DeviceFilter {
    fn default() -> Self {
        Self {
            usb_vendor_id: Some(READER_USB_VENDOR_ID),
            path: None,
        }
    }
}

impl DeviceFilter {
    /// Filter matching an explicit port path.
    #[must_use]
    pub fn for_path(path: impl Into<String>) -> Self {
        Self {
            usb_vendor_id: None,
            path: Some(path.into()),
        }
    }

    /// Filter matching a USB vendor ID during enumeration.
    #[must_use]
    pub fn for_vendor(vendor_id: u16) -> Self {
        Self {
            usb_vendor_id: Some(vendor_id),
            path: None,
        }
    }
}
