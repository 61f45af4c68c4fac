//! Mock serial link for testing and development.
//!
//! Simulates the reader side of the link: tests queue response chunks through
//! the handle and observe the frames the code under test wrote.

use crate::traits::SerialTransport;
use enrollkit_core::{Error, Result};
use std::time::Duration;
use tokio::sync::mpsc;

/// Mock serial link.
///
/// Created together with a [`MockSerialHandle`] that plays the device role.
///
/// # Examples
///
/// ```
/// use enrollkit_serial::{MockSerial, SerialTransport};
/// use std::time::Duration;
///
/// #[tokio::main]
/// async fn main() -> enrollkit_core::Result<()> {
///     let (mut link, mut handle) = MockSerial::new();
///
///     handle.push_chunk(vec![0x90, 0x00]).await;
///
///     link.write(&[0x01, 0x02]).await?;
///     let response = link
///         .read_until(|buf| buf.len() >= 2, Duration::from_secs(1))
///         .await?;
///     assert_eq!(response, vec![0x90, 0x00]);
///
///     assert_eq!(handle.next_write().await, Some(vec![0x01, 0x02]));
///     Ok(())
/// }
/// ```
#[derive(Debug)]
pub struct MockSerial {
    /// Queued response chunks from the simulated device.
    incoming_rx: mpsc::Receiver<Vec<u8>>,

    /// Written frames, observed by the handle.
    writes_tx: mpsc::UnboundedSender<Vec<u8>>,

    /// Open/closed state.
    open: bool,
}

impl MockSerial {
    /// Create a new mock link and its controlling handle.
    pub fn new() -> (Self, MockSerialHandle) {
        let (incoming_tx, incoming_rx) = mpsc::channel(32);
        let (writes_tx, writes_rx) = mpsc::unbounded_channel();

        let link = Self {
            incoming_rx,
            writes_tx,
            open: true,
        };

        let handle = MockSerialHandle {
            incoming_tx,
            writes_rx,
        };

        (link, handle)
    }
}

impl SerialTransport for MockSerial {
    async fn write(&mut self, bytes: &[u8]) -> Result<()> {
        if !self.open {
            return Err(Error::connection("mock link is closed"));
        }
        self.writes_tx
            .send(bytes.to_vec())
            .map_err(|_| Error::connection("mock handle dropped"))?;
        Ok(())
    }

    async fn read_until<F>(&mut self, mut predicate: F, timeout: Duration) -> Result<Vec<u8>>
    where
        F: FnMut(&[u8]) -> bool + Send,
    {
        if !self.open {
            return Err(Error::connection("mock link is closed"));
        }

        let deadline = tokio::time::Instant::now() + timeout;
        let mut buffer: Vec<u8> = Vec::new();

        loop {
            if predicate(&buffer) {
                return Ok(buffer);
            }

            let chunk = tokio::time::timeout_at(deadline, self.incoming_rx.recv())
                .await
                .map_err(|_| Error::timeout(timeout.as_millis() as u64))?;

            match chunk {
                Some(bytes) => buffer.extend_from_slice(&bytes),
                None => {
                    return Err(Error::connection(
                        "mock stream ended before terminal condition",
                    ));
                }
            }
        }
    }

    async fn close(&mut self) -> Result<()> {
        self.open = false;
        Ok(())
    }

    fn is_open(&self) -> bool {
        self.open
    }
}

/// Handle playing the reader-device role of a [`MockSerial`] link.
#[derive(Debug)]
pub struct MockSerialHandle {
    incoming_tx: mpsc::Sender<Vec<u8>>,
    writes_rx: mpsc::UnboundedReceiver<Vec<u8>>,
}

impl MockSerialHandle {
    /// Queue a chunk of response bytes for the link to read.
    pub async fn push_chunk(&mut self, bytes: Vec<u8>) {
        // Ignore send failure: the link side may already be dropped in
        // teardown-order tests.
        let _ = self.incoming_tx.send(bytes).await;
    }

    /// Simulate the device going away: no further chunks will ever arrive.
    pub fn end_stream(self) -> mpsc::UnboundedReceiver<Vec<u8>> {
        drop(self.incoming_tx);
        self.writes_rx
    }

    /// Wait for the next frame written by the code under test.
    pub async fn next_write(&mut self) -> Option<Vec<u8>> {
        self.writes_rx.recv().await
    }

    /// Take the next written frame without waiting, if any.
    pub fn try_next_write(&mut self) -> Option<Vec<u8>> {
        self.writes_rx.try_recv().ok()
    }
}
