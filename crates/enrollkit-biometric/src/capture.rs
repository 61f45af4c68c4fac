//! Capture service trait and detection types.

use enrollkit_core::{
    Error, Result,
    constants::{CAPTURE_HEIGHT, CAPTURE_WIDTH},
};
use serde::{Deserialize, Serialize};

/// Fixed-length feature vector summarizing a detected face.
///
/// Produced by the descriptor-extraction model; 128 components in this
/// system. Individual samples are discarded after accumulation — only the
/// smoothed vector survives the capture step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FaceDescriptor(Vec<f32>);

impl FaceDescriptor {
    /// Wrap a descriptor vector.
    ///
    /// # Errors
    ///
    /// Returns `Error::Validation` if the vector is empty.
    pub fn new(components: Vec<f32>) -> Result<Self> {
        if components.is_empty() {
            return Err(Error::validation("descriptor", "must not be empty"));
        }
        Ok(FaceDescriptor(components))
    }

    /// Number of components.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Always false: empty descriptors are rejected at construction.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Components as a slice.
    #[must_use]
    pub fn as_slice(&self) -> &[f32] {
        &self.0
    }

    /// Consume into the component vector.
    #[must_use]
    pub fn into_vec(self) -> Vec<f32> {
        self.0
    }
}

/// Pixel-space bounding box of a detection.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

/// One face found in one frame.
#[derive(Debug, Clone, PartialEq)]
pub struct FaceDetection {
    /// Where the face sits in the frame.
    pub bounding_box: BoundingBox,

    /// Feature vector for the face.
    pub descriptor: FaceDescriptor,

    /// Detector confidence in `0.0..=1.0`.
    pub confidence: f32,
}

impl FaceDetection {
    /// Create a detection.
    #[must_use]
    pub fn new(bounding_box: BoundingBox, descriptor: FaceDescriptor, confidence: f32) -> Self {
        Self {
            bounding_box,
            descriptor,
            confidence,
        }
    }
}

/// Which camera to open.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CameraFacing {
    /// Operator-facing camera (the enrollment default).
    Front,
    Rear,
}

/// Video stream constraints requested at capture start.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CaptureConstraints {
    pub width: u32,
    pub height: u32,
    pub facing: CameraFacing,
}

impl Default for CaptureConstraints {
    fn default() -> Self {
        Self {
            width: CAPTURE_WIDTH,
            height: CAPTURE_HEIGHT,
            facing: CameraFacing::Front,
        }
    }
}

/// Biometric capture device abstraction.
///
/// Implementations manage the recognition models and an exclusive video
/// stream. The workflow only ever holds one capture service per station, and
/// the stream belongs to the in-progress biometric step alone.
///
/// # Examples
///
/// ```no_run
/// use enrollkit_biometric::{BiometricCaptureService, CaptureConstraints};
/// use enrollkit_core::Result;
///
/// async fn warm_up<S: BiometricCaptureService>(service: &mut S) -> Result<()> {
///     service.initialize().await?;
///     service.start_capture(&CaptureConstraints::default()).await?;
///     let first = service.detect_face().await?;
///     println!("face visible: {}", first.is_some());
///     service.stop_capture().await
/// }
/// ```
pub trait BiometricCaptureService: Send {
    /// Load the localization, landmark, and descriptor-extraction model
    /// artifacts.
    ///
    /// Loading happens exactly once per process; subsequent calls are
    /// no-ops.
    ///
    /// # Errors
    ///
    /// Returns `Error::ModelLoad` naming the first unavailable artifact.
    async fn initialize(&mut self) -> Result<()>;

    /// Acquire an exclusive video stream matching the constraints.
    ///
    /// # Errors
    ///
    /// Returns `Error::Device` if the device is unavailable, access is
    /// denied, or a stream is already active.
    async fn start_capture(&mut self, constraints: &CaptureConstraints) -> Result<()>;

    /// Run one detection attempt against the current frame.
    ///
    /// Returns at most the highest-confidence detection, or `None` when no
    /// face is visible. Never blocks indefinitely.
    ///
    /// # Errors
    ///
    /// Returns `Error::Device` if no stream is active or the stream failed.
    async fn detect_face(&mut self) -> Result<Option<FaceDetection>>;

    /// Release the video stream. Safe to call repeatedly.
    ///
    /// # Errors
    ///
    /// Returns an error only if releasing the device fails.
    async fn stop_capture(&mut self) -> Result<()>;

    /// Whether a stream is currently active.
    fn is_capturing(&self) -> bool;
}
