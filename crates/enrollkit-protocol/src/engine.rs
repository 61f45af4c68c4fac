//! Card protocol engine.
//!
//! Drives one serial link in strict request/response order. The engine owns
//! the transport for the duration of a workflow step: the step hands the
//! opened link in, and the link is closed through [`CardProtocolEngine::shutdown`]
//! (or by recovering the transport with [`CardProtocolEngine::into_transport`])
//! when the step is left.
//!
//! # Design Principles
//!
//! - **No automatic retry**: a failed authentication or write is surfaced to
//!   the operator, who decides whether to retry. Re-driving a write against a
//!   possibly damaged sector must be a human decision.
//! - **Strict half-duplex**: `&mut self` receivers make it impossible to
//!   issue a second command before the first response's terminal marker or
//!   timeout has been observed.
//! - **Bounded reads**: every response read is limited by the configured
//!   window; there are no unbounded waits.

use crate::{
    commands::CardCommand,
    frame::Frame,
    response::{CardResponse, ends_with_status},
};
use enrollkit_core::{
    Error, Result,
    constants::{DEFAULT_READ_TIMEOUT_MS, DEFAULT_SECTOR_KEY, SECTOR_KEY_LEN, STATUS_SUCCESS},
};
use enrollkit_serial::SerialTransport;
use std::time::Duration;
use tracing::{debug, trace, warn};

/// Protocol engine over one exclusive serial link.
///
/// # Examples
///
/// ```
/// use enrollkit_protocol::CardProtocolEngine;
/// use enrollkit_serial::MockSerial;
///
/// #[tokio::main]
/// async fn main() -> enrollkit_core::Result<()> {
///     let (link, mut handle) = MockSerial::new();
///     let mut engine = CardProtocolEngine::new(link);
///
///     // The simulated card acknowledges the authentication and the write.
///     handle.push_chunk(vec![0x90, 0x00]).await;
///     handle.push_chunk(vec![0x90, 0x00]).await;
///
///     engine.write_block(5, 20, b"NFC-12345").await?;
///     engine.shutdown().await?;
///     Ok(())
/// }
/// ```
pub struct CardProtocolEngine<T: SerialTransport> {
    transport: T,
    read_timeout: Duration,
}

impl<T: SerialTransport> CardProtocolEngine<T> {
    /// Create an engine with the default response window.
    pub fn new(transport: T) -> Self {
        Self::with_timeout(transport, Duration::from_millis(DEFAULT_READ_TIMEOUT_MS))
    }

    /// Create an engine with a custom response window.
    pub fn with_timeout(transport: T, read_timeout: Duration) -> Self {
        Self {
            transport,
            read_timeout,
        }
    }

    /// Send a frame and read the response up to its terminal status pair.
    ///
    /// # Errors
    ///
    /// - `Error::Timeout` if no terminal marker arrives within the window
    /// - `Error::Connection` if the link is closed or the stream ends early
    pub async fn send_command(&mut self, frame: &Frame) -> Result<CardResponse> {
        trace!(size = frame.size(), "sending frame");
        self.transport.write(frame.as_bytes()).await?;

        let buf = self
            .transport
            .read_until(ends_with_status, self.read_timeout)
            .await?;

        let response = CardResponse::from_bytes(buf);
        debug!(%response, "response received");
        Ok(response)
    }

    /// Authenticate a sector with the factory-default key.
    ///
    /// # Errors
    ///
    /// Returns `Error::Auth` carrying the card's status pair when the card
    /// rejects the key, plus any transport error from [`Self::send_command`].
    pub async fn authenticate_sector(&mut self, sector: u8) -> Result<()> {
        let mut payload = Vec::with_capacity(1 + SECTOR_KEY_LEN);
        payload.push(sector);
        payload.extend_from_slice(&DEFAULT_SECTOR_KEY);

        let frame = Frame::build(CardCommand::AuthenticateSector, &payload)?;
        let response = self.send_command(&frame).await?;

        match response.status() {
            Some(STATUS_SUCCESS) => {
                debug!(sector, "sector authenticated");
                Ok(())
            }
            Some(status) => {
                warn!(sector, ?status, "sector authentication rejected");
                Err(Error::auth(sector, status))
            }
            None => Err(Error::invalid_frame(
                "authentication response carries no status pair",
            )),
        }
    }

    /// Write a data block: authenticate the sector, then send the write
    /// frame addressed by block index.
    ///
    /// # Errors
    ///
    /// - `Error::Auth` if sector authentication fails
    /// - `Error::Write` carrying the card's status pair if the write is
    ///   rejected
    /// - transport errors from [`Self::send_command`]
    pub async fn write_block(&mut self, sector: u8, block: u8, data: &[u8]) -> Result<()> {
        self.authenticate_sector(sector).await?;

        let frame = Frame::build(CardCommand::WriteBlock { block }, data)?;
        let response = self.send_command(&frame).await?;

        match response.status() {
            Some(STATUS_SUCCESS) => {
                debug!(sector, block, bytes = data.len(), "block written");
                Ok(())
            }
            Some(status) => {
                warn!(block, ?status, "block write rejected");
                Err(Error::write(block, status))
            }
            None => Err(Error::invalid_frame(
                "write response carries no status pair",
            )),
        }
    }

    /// Read the UID of the card in the field.
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidFrame` when the card answers with a failure
    /// status, plus any transport error from [`Self::send_command`].
    pub async fn read_uid(&mut self) -> Result<Vec<u8>> {
        let frame = Frame::build(CardCommand::ReadUid, &[])?;
        let response = self.send_command(&frame).await?;

        if response.is_success() {
            Ok(response.data().to_vec())
        } else {
            Err(Error::invalid_frame(format!(
                "UID read rejected with status {:02X?}",
                response.status()
            )))
        }
    }

    /// Close the underlying link. Safe to call repeatedly.
    ///
    /// # Errors
    ///
    /// Propagates a failure from releasing the underlying device.
    pub async fn shutdown(&mut self) -> Result<()> {
        self.transport.close().await
    }

    /// Whether the underlying link is open.
    pub fn is_open(&self) -> bool {
        self.transport.is_open()
    }

    /// Recover the transport, consuming the engine.
    pub fn into_transport(self) -> T {
        self.transport
    }
}
