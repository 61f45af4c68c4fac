//! Native serial backend over system ports.
//!
//! Wraps the blocking `serialport` API. Reads and writes run on the blocking
//! thread pool (`spawn_blocking`); the port handle is moved into the closure
//! and returned, so the link is never shared between tasks. Reads poll in
//! short bounded slices so that the overall `read_until` deadline is honored
//! without holding a blocking thread past it.

use crate::{
    config::{DataBits, DeviceFilter, FlowControl, Parity, SerialParams, StopBits},
    traits::SerialTransport,
};
use enrollkit_core::{Error, Result};
use std::io::Read;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

/// Per-slice read timeout for the underlying port.
///
/// Short enough to keep `read_until` responsive near its deadline, long
/// enough to avoid spinning.
const POLL_SLICE_MS: u64 = 50;

/// Read buffer size for one slice.
const READ_CHUNK: usize = 256;

/// Serial link over a real system port.
///
/// Opened with [`NativeSerial::open`]; owned by one protocol engine for the
/// duration of a workflow step and closed on step exit.
pub struct NativeSerial {
    /// Underlying port; `None` once closed.
    port: Option<Box<dyn serialport::SerialPort>>,

    /// System path of the opened port.
    path: String,
}

impl std::fmt::Debug for NativeSerial {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NativeSerial")
            .field("path", &self.path)
            .field("open", &self.port.is_some())
            .finish()
    }
}

impl NativeSerial {
    /// Open a serial link to the first device matching the filter.
    ///
    /// # Errors
    ///
    /// Returns `Error::Connection` if:
    /// - no port matches the filter
    /// - the port cannot be opened (permission denied, already in use)
    pub fn open(filter: &DeviceFilter, params: &SerialParams) -> Result<Self> {
        let path = resolve_path(filter)?;

        let port = serialport::new(path.as_str(), params.baud_rate)
            .data_bits(map_data_bits(params.data_bits))
            .stop_bits(map_stop_bits(params.stop_bits))
            .parity(map_parity(params.parity))
            .flow_control(map_flow_control(params.flow_control))
            .timeout(Duration::from_millis(POLL_SLICE_MS))
            .open()
            .map_err(|e| Error::connection(format!("failed to open {path}: {e}")))?;

        info!(path = %path, baud = params.baud_rate, "serial link opened");

        Ok(Self {
            port: Some(port),
            path,
        })
    }

    /// System path of the opened port.
    pub fn path(&self) -> &str {
        &self.path
    }

    fn take_port(&mut self) -> Result<Box<dyn serialport::SerialPort>> {
        self.port
            .take()
            .ok_or_else(|| Error::connection(format!("link to {} is closed", self.path)))
    }
}

impl SerialTransport for NativeSerial {
    async fn write(&mut self, bytes: &[u8]) -> Result<()> {
        let mut port = self.take_port()?;
        let data = bytes.to_vec();

        let (port, outcome) = tokio::task::spawn_blocking(move || {
            let outcome = std::io::Write::write_all(&mut port, &data)
                .and_then(|()| std::io::Write::flush(&mut port));
            (port, outcome)
        })
        .await
        .map_err(|e| Error::connection(format!("serial write task failed: {e}")))?;

        self.port = Some(port);
        outcome.map_err(|e| Error::connection(format!("write failed on {}: {e}", self.path)))
    }

    async fn read_until<F>(&mut self, mut predicate: F, timeout: Duration) -> Result<Vec<u8>>
    where
        F: FnMut(&[u8]) -> bool + Send,
    {
        let deadline = Instant::now() + timeout;
        let mut buffer: Vec<u8> = Vec::new();

        loop {
            if predicate(&buffer) {
                return Ok(buffer);
            }
            if Instant::now() >= deadline {
                debug!(path = %self.path, received = buffer.len(), "read deadline expired");
                return Err(Error::timeout(timeout.as_millis() as u64));
            }

            let port = self.take_port()?;
            let (port, slice) = tokio::task::spawn_blocking(move || {
                let mut port = port;
                let mut scratch = [0u8; READ_CHUNK];
                let slice = match port.read(&mut scratch) {
                    // A zero-length read means the device went away.
                    Ok(0) => Ok(None),
                    Ok(n) => Ok(Some(scratch[..n].to_vec())),
                    // Slice timeout: nothing arrived in this poll window.
                    Err(e) if e.kind() == std::io::ErrorKind::TimedOut => Ok(Some(Vec::new())),
                    Err(e) => Err(e),
                };
                (port, slice)
            })
            .await
            .map_err(|e| Error::connection(format!("serial read task failed: {e}")))?;
            self.port = Some(port);

            match slice {
                Ok(Some(chunk)) => buffer.extend_from_slice(&chunk),
                Ok(None) => {
                    warn!(path = %self.path, "stream ended mid-read");
                    return Err(Error::connection(format!(
                        "stream from {} ended before terminal condition",
                        self.path
                    )));
                }
                Err(e) => {
                    return Err(Error::connection(format!(
                        "read failed on {}: {e}",
                        self.path
                    )));
                }
            }
        }
    }

    async fn close(&mut self) -> Result<()> {
        if let Some(port) = self.port.take() {
            drop(port);
            info!(path = %self.path, "serial link closed");
        }
        Ok(())
    }

    fn is_open(&self) -> bool {
        self.port.is_some()
    }
}

/// Resolve the system path of the port to open.
fn resolve_path(filter: &DeviceFilter) -> Result<String> {
    if let Some(path) = &filter.path {
        return Ok(path.clone());
    }

    let ports = serialport::available_ports()
        .map_err(|e| Error::connection(format!("port enumeration failed: {e}")))?;

    ports
        .iter()
        .find(|info| vendor_matches(filter.usb_vendor_id, usb_vendor_id(&info.port_type)))
        .map(|info| info.port_name.clone())
        .ok_or_else(|| {
            Error::connection(match filter.usb_vendor_id {
                Some(vid) => format!("no serial device with vendor ID {vid:#06X}"),
                None => "no serial device available".to_string(),
            })
        })
}

/// Extract the USB vendor ID from a port type, if it is a USB port.
fn usb_vendor_id(port_type: &serialport::SerialPortType) -> Option<u16> {
    match port_type {
        serialport::SerialPortType::UsbPort(usb) => Some(usb.vid),
        _ => None,
    }
}

/// Whether a port with the given vendor ID satisfies the filter.
fn vendor_matches(wanted: Option<u16>, found: Option<u16>) -> bool {
    match wanted {
        Some(vid) => found == Some(vid),
        None => true,
    }
}

fn map_data_bits(bits: DataBits) -> serialport::DataBits {
    match bits {
        DataBits::Five => serialport::DataBits::Five,
        DataBits::Six => serialport::DataBits::Six,
        DataBits::Seven => serialport::DataBits::Seven,
        DataBits::Eight => serialport::DataBits::Eight,
    }
}

fn map_stop_bits(bits: StopBits) -> serialport::StopBits {
    match bits {
        StopBits::One => serialport::StopBits::One,
        StopBits::Two => serialport::StopBits::Two,
    }
}

fn map_parity(parity: Parity) -> serialport::Parity {
    match parity {
        Parity::None => serialport::Parity::None,
        Parity::Odd => serialport::Parity::Odd,
        Parity::Even => serialport::Parity::Even,
    }
}

fn map_flow_control(flow: FlowControl) -> serialport::FlowControl {
    match flow {
        FlowControl::None => serialport::FlowControl::None,
        FlowControl::Software => serialport::FlowControl::Software,
        FlowControl::Hardware => serialport::FlowControl::Hardware,
    }
}
