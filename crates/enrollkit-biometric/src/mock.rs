//! Mock capture service for testing and development.
//!
//! Simulates the camera and recognition pipeline: tests queue detections and
//! empty frames through the handle, inject initialization or stream
//! failures, and observe how often the stream was released.

use crate::capture::{
    BiometricCaptureService, BoundingBox, CaptureConstraints, FaceDescriptor, FaceDetection,
};
use enrollkit_core::{Error, Result};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use tokio::sync::mpsc;

/// One scripted frame outcome.
#[derive(Debug, Clone)]
enum MockFrame {
    Detection(FaceDetection),
    Empty,
}

#[derive(Debug, Default)]
struct MockCaptureState {
    initialized: AtomicBool,
    capturing: AtomicBool,
    stop_calls: AtomicUsize,
    fail_initialize: AtomicBool,
    fail_start: AtomicBool,
}

/// Mock biometric capture service.
///
/// # Examples
///
/// ```
/// use enrollkit_biometric::{BiometricCaptureService, CaptureConstraints, MockCapture};
///
/// #[tokio::main]
/// async fn main() -> enrollkit_core::Result<()> {
///     let (mut service, mut handle) = MockCapture::new();
///
///     service.initialize().await?;
///     service.start_capture(&CaptureConstraints::default()).await?;
///
///     handle.queue_detection(vec![0.5; 128]).await?;
///     let detection = service.detect_face().await?;
///     assert!(detection.is_some());
///
///     service.stop_capture().await?;
///     Ok(())
/// }
/// ```
#[derive(Debug)]
pub struct MockCapture {
    frames_rx: mpsc::Receiver<MockFrame>,
    state: Arc<MockCaptureState>,
}

impl MockCapture {
    /// Create a new mock capture service and its controlling handle.
    pub fn new() -> (Self, MockCaptureHandle) {
        let (frames_tx, frames_rx) = mpsc::channel(64);
        let state = Arc::new(MockCaptureState::default());

        let service = Self {
            frames_rx,
            state: Arc::clone(&state),
        };

        let handle = MockCaptureHandle { frames_tx, state };

        (service, handle)
    }
}

impl BiometricCaptureService for MockCapture {
    async fn initialize(&mut self) -> Result<()> {
        if self.state.initialized.load(Ordering::SeqCst) {
            return Ok(());
        }
        if self.state.fail_initialize.load(Ordering::SeqCst) {
            return Err(Error::model_load(
                crate::models::LOCALIZER_ARTIFACT,
                "artifact unavailable",
            ));
        }
        self.state.initialized.store(true, Ordering::SeqCst);
        Ok(())
    }

    async fn start_capture(&mut self, _constraints: &CaptureConstraints) -> Result<()> {
        if !self.state.initialized.load(Ordering::SeqCst) {
            return Err(Error::device("models not initialized"));
        }
        if self.state.fail_start.load(Ordering::SeqCst) {
            return Err(Error::device("video stream unavailable"));
        }
        if self.state.capturing.swap(true, Ordering::SeqCst) {
            return Err(Error::device("capture already active"));
        }
        Ok(())
    }

    async fn detect_face(&mut self) -> Result<Option<FaceDetection>> {
        if !self.state.capturing.load(Ordering::SeqCst) {
            return Err(Error::device("no active stream"));
        }

        // One attempt per call: take at most one scripted frame, never wait
        // for one to be queued.
        match self.frames_rx.try_recv() {
            Ok(MockFrame::Detection(detection)) => Ok(Some(detection)),
            Ok(MockFrame::Empty) | Err(_) => Ok(None),
        }
    }

    async fn stop_capture(&mut self) -> Result<()> {
        self.state.capturing.store(false, Ordering::SeqCst);
        self.state.stop_calls.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn is_capturing(&self) -> bool {
        self.state.capturing.load(Ordering::SeqCst)
    }
}

/// Handle controlling a [`MockCapture`] service.
#[derive(Debug, Clone)]
pub struct MockCaptureHandle {
    frames_tx: mpsc::Sender<MockFrame>,
    state: Arc<MockCaptureState>,
}

impl MockCaptureHandle {
    /// Queue a detection whose descriptor is the given vector.
    ///
    /// The bounding box and confidence are filled with plausible values.
    ///
    /// # Errors
    ///
    /// Returns `Error::Validation` if the descriptor is empty.
    pub async fn queue_detection(&mut self, descriptor: Vec<f32>) -> Result<()> {
        let detection = FaceDetection::new(
            BoundingBox {
                x: 180.0,
                y: 96.0,
                width: 280.0,
                height: 280.0,
            },
            FaceDescriptor::new(descriptor)?,
            0.92,
        );
        self.queue_detection_full(detection).await;
        Ok(())
    }

    /// Queue a fully specified detection.
    pub async fn queue_detection_full(&mut self, detection: FaceDetection) {
        let _ = self.frames_tx.send(MockFrame::Detection(detection)).await;
    }

    /// Queue a frame with no visible face.
    pub async fn queue_empty_frame(&mut self) {
        let _ = self.frames_tx.send(MockFrame::Empty).await;
    }

    /// Make the next `initialize` call fail with a model-load error.
    pub fn fail_initialize(&self, fail: bool) {
        self.state.fail_initialize.store(fail, Ordering::SeqCst);
    }

    /// Make `start_capture` fail with a device error.
    pub fn fail_start_capture(&self, fail: bool) {
        self.state.fail_start.store(fail, Ordering::SeqCst);
    }

    /// How many times `stop_capture` has been called.
    pub fn stop_call_count(&self) -> usize {
        self.state.stop_calls.load(Ordering::SeqCst)
    }

    /// Whether a stream is currently active.
    pub fn is_capturing(&self) -> bool {
        self.state.capturing.load(Ordering::SeqCst)
    }
}
