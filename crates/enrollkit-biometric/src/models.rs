//! Recognition model artifact management.
//!
//! Three artifacts back the capture pipeline: a face localizer, a landmark
//! model, and a descriptor extractor. They are located and verified once per
//! process; every capture backend afterwards reads the same bundle.

use enrollkit_core::{Error, Result};
use std::path::{Path, PathBuf};
use tokio::sync::OnceCell;
use tracing::info;

/// File name of the face localization model.
pub const LOCALIZER_ARTIFACT: &str = "face_localizer.onnx";

/// File name of the landmark model.
pub const LANDMARK_ARTIFACT: &str = "face_landmarks.onnx";

/// File name of the descriptor-extraction model.
pub const DESCRIPTOR_ARTIFACT: &str = "face_descriptor.onnx";

/// Verified locations of the three model artifacts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelBundle {
    pub localizer: PathBuf,
    pub landmarks: PathBuf,
    pub descriptor: PathBuf,
}

impl ModelBundle {
    /// Locate and verify all artifacts under a model directory.
    ///
    /// # Errors
    ///
    /// Returns `Error::ModelLoad` naming the first artifact that is missing
    /// or empty.
    pub fn from_dir(dir: &Path) -> Result<Self> {
        Ok(Self {
            localizer: verify_artifact(dir, LOCALIZER_ARTIFACT)?,
            landmarks: verify_artifact(dir, LANDMARK_ARTIFACT)?,
            descriptor: verify_artifact(dir, DESCRIPTOR_ARTIFACT)?,
        })
    }
}

fn verify_artifact(dir: &Path, name: &str) -> Result<PathBuf> {
    let path = dir.join(name);

    let metadata = std::fs::metadata(&path)
        .map_err(|e| Error::model_load(name, format!("{}: {e}", path.display())))?;

    if metadata.len() == 0 {
        return Err(Error::model_load(
            name,
            format!("{} is empty", path.display()),
        ));
    }

    Ok(path)
}

static BUNDLE: OnceCell<ModelBundle> = OnceCell::const_new();

/// Load the model bundle, exactly once per process.
///
/// The first successful call verifies the artifacts under `dir` and caches
/// the bundle; every later call returns the cached bundle regardless of the
/// directory passed. A failed load is not cached, so a corrected model
/// directory can be retried.
///
/// # Errors
///
/// Returns `Error::ModelLoad` if the bundle has not been loaded yet and an
/// artifact under `dir` is missing or empty.
pub async fn load_models(dir: &Path) -> Result<&'static ModelBundle> {
    BUNDLE
        .get_or_try_init(|| async {
            let bundle = ModelBundle::from_dir(dir)?;
            info!(dir = %dir.display(), "recognition models loaded");
            Ok(bundle)
        })
        .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn write_artifacts(dir: &Path) {
        for name in [LOCALIZER_ARTIFACT, LANDMARK_ARTIFACT, DESCRIPTOR_ARTIFACT] {
            fs::write(dir.join(name), b"model-bytes").unwrap();
        }
    }

    #[test]
    fn test_bundle_from_complete_dir() {
        let dir = tempfile::tempdir().unwrap();
        write_artifacts(dir.path());

        let bundle = ModelBundle::from_dir(dir.path()).unwrap();
        assert_eq!(bundle.localizer, dir.path().join(LOCALIZER_ARTIFACT));
        assert_eq!(bundle.landmarks, dir.path().join(LANDMARK_ARTIFACT));
        assert_eq!(bundle.descriptor, dir.path().join(DESCRIPTOR_ARTIFACT));
    }

    #[test]
    fn test_missing_artifact_is_named() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join(LOCALIZER_ARTIFACT), b"model-bytes").unwrap();
        // Landmark model deliberately absent.

        let result = ModelBundle::from_dir(dir.path());
        match result {
            Err(Error::ModelLoad { artifact, .. }) => {
                assert_eq!(artifact, LANDMARK_ARTIFACT);
            }
            other => panic!("expected ModelLoad error, got {other:?}"),
        }
    }

    #[test]
    fn test_empty_artifact_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        write_artifacts(dir.path());
        fs::write(dir.path().join(DESCRIPTOR_ARTIFACT), b"").unwrap();

        let result = ModelBundle::from_dir(dir.path());
        assert!(matches!(result, Err(Error::ModelLoad { .. })));
    }

    #[tokio::test]
    async fn test_load_models_is_process_wide_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        write_artifacts(dir.path());

        let first = load_models(dir.path()).await.unwrap();

        // A second call returns the same cached bundle, even when pointed at
        // a directory that would not verify.
        let other_dir = tempfile::tempdir().unwrap();
        let second = load_models(other_dir.path()).await.unwrap();

        assert_eq!(first, second);
        assert!(std::ptr::eq(first, second));
    }
}
