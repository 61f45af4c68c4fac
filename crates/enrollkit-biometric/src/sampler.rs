//! Bounded descriptor sampling loop.
//!
//! Polls the capture service on a fixed interval until the target number of
//! detections has been folded into the accumulator. The whole loop runs
//! under one overall deadline so the biometric step can never hang against a
//! dead stream, and dropping the returned future cancels the timer
//! immediately. Releasing the stream is the caller's job and must happen on
//! every exit path, including this function's error returns.

use crate::{
    accumulator::FeatureAccumulator,
    capture::{BiometricCaptureService, FaceDescriptor},
};
use enrollkit_core::{
    Error, Result,
    constants::{SAMPLE_INTERVAL_MS, SAMPLE_TARGET},
};
use std::time::Duration;
use tracing::{debug, trace};

/// Sampling loop configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SamplerConfig {
    /// Number of accepted detections required.
    pub target_samples: usize,

    /// Delay between detection attempts.
    pub interval: Duration,

    /// Overall deadline for the whole loop.
    pub overall_timeout: Duration,
}

impl Default for SamplerConfig {
    fn default() -> Self {
        Self {
            target_samples: SAMPLE_TARGET,
            interval: Duration::from_millis(SAMPLE_INTERVAL_MS),
            overall_timeout: Duration::from_secs(30),
        }
    }
}

/// Run the sampling loop to convergence and return the smoothed descriptor.
///
/// # Errors
///
/// - `Error::Timeout` if the target count is not reached before the overall
///   deadline
/// - `Error::Validation` if the config requests zero samples
/// - any error surfaced by `detect_face` (missing stream, stream failure)
pub async fn sample_descriptor<S: BiometricCaptureService>(
    service: &mut S,
    config: &SamplerConfig,
) -> Result<FaceDescriptor> {
    if config.target_samples == 0 {
        return Err(Error::validation(
            "target_samples",
            "must be at least one",
        ));
    }

    let accumulator = tokio::time::timeout(config.overall_timeout, async {
        let mut ticker = tokio::time::interval(config.interval);
        let mut accumulator = FeatureAccumulator::new();

        loop {
            ticker.tick().await;

            match service.detect_face().await? {
                Some(detection) => {
                    trace!(confidence = detection.confidence, "detection accepted");
                    accumulator.accumulate(&detection.descriptor)?;

                    if accumulator.sample_count() >= config.target_samples {
                        debug!(samples = accumulator.sample_count(), "sampling converged");
                        return Ok::<_, Error>(accumulator);
                    }
                }
                None => trace!("no face in frame"),
            }
        }
    })
    .await
    .map_err(|_| Error::timeout(config.overall_timeout.as_millis() as u64))??;

    accumulator
        .into_descriptor()
        .ok_or_else(|| Error::device("sampling produced no descriptor"))
}
