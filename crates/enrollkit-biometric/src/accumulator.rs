//! Descriptor smoothing across capture samples.

use crate::capture::FaceDescriptor;
use enrollkit_core::{Error, Result};

/// Running smoothed descriptor over successive capture samples.
///
/// The first sample is stored verbatim; each subsequent sample replaces the
/// stored vector with the elementwise average of stored and new sample. The
/// result is recency-weighted: later samples contribute exponentially more
/// than earlier ones, so the vector tracks the most recent captures. For
/// samples `[v1, v2, v3]` the stored vector is `((v1+v2)/2 + v3)/2`.
///
/// # Examples
///
/// ```
/// use enrollkit_biometric::{FaceDescriptor, FeatureAccumulator};
///
/// let mut acc = FeatureAccumulator::new();
/// acc.accumulate(&FaceDescriptor::new(vec![1.0, 0.0]).unwrap()).unwrap();
/// acc.accumulate(&FaceDescriptor::new(vec![0.0, 1.0]).unwrap()).unwrap();
///
/// assert_eq!(acc.sample_count(), 2);
/// assert_eq!(acc.current(), Some(&[0.5, 0.5][..]));
/// ```
#[derive(Debug, Clone, Default)]
pub struct FeatureAccumulator {
    stored: Option<Vec<f32>>,
    samples: usize,
}

impl FeatureAccumulator {
    /// Create an empty accumulator.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold one sample into the stored vector.
    ///
    /// # Errors
    ///
    /// Returns `Error::Device` if the sample's dimension differs from the
    /// stored vector's.
    pub fn accumulate(&mut self, sample: &FaceDescriptor) -> Result<()> {
        match &mut self.stored {
            None => {
                self.stored = Some(sample.as_slice().to_vec());
            }
            Some(stored) => {
                if stored.len() != sample.len() {
                    return Err(Error::device(format!(
                        "descriptor dimension mismatch: expected {}, got {}",
                        stored.len(),
                        sample.len()
                    )));
                }
                for (held, new) in stored.iter_mut().zip(sample.as_slice()) {
                    *held = (*held + *new) / 2.0;
                }
            }
        }

        self.samples += 1;
        Ok(())
    }

    /// Number of samples folded in so far.
    #[must_use]
    pub fn sample_count(&self) -> usize {
        self.samples
    }

    /// The current smoothed vector, if any sample has been accumulated.
    #[must_use]
    pub fn current(&self) -> Option<&[f32]> {
        self.stored.as_deref()
    }

    /// Consume the accumulator into the smoothed descriptor.
    ///
    /// Returns `None` when no sample was ever accumulated.
    #[must_use]
    pub fn into_descriptor(self) -> Option<FaceDescriptor> {
        // Non-empty by construction: samples only enter through
        // FaceDescriptor, which rejects empty vectors.
        self.stored.and_then(|v| FaceDescriptor::new(v).ok())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn descriptor(components: &[f32]) -> FaceDescriptor {
        FaceDescriptor::new(components.to_vec()).unwrap()
    }

    #[test]
    fn test_first_sample_stored_verbatim() {
        let mut acc = FeatureAccumulator::new();
        acc.accumulate(&descriptor(&[0.25, -0.5, 1.0])).unwrap();

        assert_eq!(acc.sample_count(), 1);
        assert_eq!(acc.current(), Some(&[0.25, -0.5, 1.0][..]));
    }

    #[test]
    fn test_three_samples_are_recency_weighted() {
        let v1 = [1.0f32, 0.0];
        let v2 = [0.0f32, 1.0];
        let v3 = [1.0f32, 1.0];

        let mut acc = FeatureAccumulator::new();
        acc.accumulate(&descriptor(&v1)).unwrap();
        acc.accumulate(&descriptor(&v2)).unwrap();
        acc.accumulate(&descriptor(&v3)).unwrap();

        // ((v1+v2)/2 + v3)/2, not (v1+v2+v3)/3.
        let expected = [((1.0 + 0.0) / 2.0 + 1.0) / 2.0, ((0.0 + 1.0) / 2.0 + 1.0) / 2.0];
        assert_eq!(acc.current(), Some(&expected[..]));

        let uniform_mean = [2.0f32 / 3.0, 2.0 / 3.0];
        assert_ne!(acc.current(), Some(&uniform_mean[..]));
    }

    #[test]
    fn test_dimension_mismatch_rejected() {
        let mut acc = FeatureAccumulator::new();
        acc.accumulate(&descriptor(&[0.1, 0.2])).unwrap();

        let result = acc.accumulate(&descriptor(&[0.1, 0.2, 0.3]));
        assert!(matches!(result, Err(Error::Device { .. })));
        // The failed sample does not count.
        assert_eq!(acc.sample_count(), 1);
    }

    #[test]
    fn test_into_descriptor() {
        let mut acc = FeatureAccumulator::new();
        assert!(acc.clone().into_descriptor().is_none());

        acc.accumulate(&descriptor(&[0.5])).unwrap();
        let result = acc.into_descriptor().unwrap();
        assert_eq!(result.as_slice(), &[0.5]);
    }

    #[test]
    fn test_identical_samples_are_stable() {
        let sample = descriptor(&[0.25, 0.75]);
        let mut acc = FeatureAccumulator::new();
        for _ in 0..10 {
            acc.accumulate(&sample).unwrap();
        }
        assert_eq!(acc.sample_count(), 10);
        assert_eq!(acc.current(), Some(&[0.25, 0.75][..]));
    }
}
