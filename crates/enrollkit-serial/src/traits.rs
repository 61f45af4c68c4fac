//! Serial transport trait definition.
//!
//! The trait establishes the contract between the card protocol engine and
//! the byte channel underneath it, enabling substitution between the native
//! serial backend and the mock.
//!
//! The trait uses native `async fn` methods (Edition 2024 RPITIT), so no
//! `async_trait` macro is involved.

use enrollkit_core::Result;
use std::time::Duration;

/// Exclusive byte channel to a reader device.
///
/// A transport represents one opened link. The link is owned by exactly one
/// protocol engine at a time, and the `&mut self` receivers guarantee that at
/// most one read or write is outstanding per link.
///
/// # Examples
///
/// ```no_run
/// use enrollkit_serial::SerialTransport;
/// use enrollkit_core::Result;
/// use std::time::Duration;
///
/// async fn probe<T: SerialTransport>(link: &mut T) -> Result<Vec<u8>> {
///     link.write(&[0xFF, 0xCA, 0x00, 0x00, 0x00, 0x35]).await?;
///     link.read_until(|buf| buf.len() >= 2, Duration::from_secs(3)).await
/// }
/// ```
pub trait SerialTransport: Send {
    /// Write all bytes to the link.
    ///
    /// # Errors
    ///
    /// Returns `Error::Connection` if the link is closed or the device is
    /// gone.
    async fn write(&mut self, bytes: &[u8]) -> Result<()>;

    /// Read from the link until the predicate over the accumulated buffer is
    /// satisfied, then return the buffer.
    ///
    /// The predicate is re-evaluated each time bytes arrive. The call
    /// suspends the caller but is always time-bounded.
    ///
    /// # Errors
    ///
    /// - `Error::Timeout` if the predicate is not satisfied within `timeout`
    /// - `Error::Connection` if the link is closed or the stream ends before
    ///   the predicate is satisfied
    async fn read_until<F>(&mut self, predicate: F, timeout: Duration) -> Result<Vec<u8>>
    where
        F: FnMut(&[u8]) -> bool + Send;

    /// Close the link. Safe to call repeatedly.
    ///
    /// # Errors
    ///
    /// Returns an error only if releasing the underlying device fails.
    async fn close(&mut self) -> Result<()>;

    /// Whether the link is currently open.
    fn is_open(&self) -> bool;
}
