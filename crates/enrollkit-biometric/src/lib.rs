//! Facial biometric capture pipeline.
//!
//! The pipeline turns a live video stream into one stable face descriptor:
//! frames are sampled on a fixed interval, each frame yields at most one
//! detection, and successive descriptors are smoothed by the
//! [`FeatureAccumulator`] until the target sample count is reached. The
//! stabilized descriptor is then handed to the credential layer for ID
//! derivation.
//!
//! Camera and recognition-model access sit behind the
//! [`BiometricCaptureService`] capability trait so that the workflow can run
//! against [`MockCapture`] in tests and against an embedded recognition
//! backend in production.

#![allow(async_fn_in_trait)]

pub mod accumulator;
pub mod capture;
pub mod mock;
pub mod models;
pub mod sampler;

pub use accumulator::FeatureAccumulator;
pub use capture::{
    BiometricCaptureService, BoundingBox, CameraFacing, CaptureConstraints, FaceDescriptor,
    FaceDetection,
};
pub use mock::{MockCapture, MockCaptureHandle};
pub use models::{ModelBundle, load_models};
pub use sampler::{SamplerConfig, sample_descriptor};
