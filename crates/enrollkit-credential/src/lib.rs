//! Credential ID derivation.
//!
//! Two ID families are produced here:
//!
//! - **Proximity IDs** are random: 8 bytes from the operating system's CSPRNG,
//!   hex-encoded and prefixed `NFC-`. The random source must be
//!   cryptographically secure because the ID doubles as the value written to
//!   the card.
//! - **Face IDs** are derived: each descriptor component maps to
//!   `abs(component * 100)` truncated to a byte, two-hex-digit encoded and
//!   prefixed `FACE-`. The derivation is deterministic so the same stabilized
//!   descriptor always yields the same credential.

use enrollkit_core::{
    FaceId, ProximityId, Result,
    constants::{FACE_ID_PREFIX, PROXIMITY_ID_PREFIX, PROXIMITY_ID_RANDOM_BYTES},
};
use rand::RngCore;
use rand::rngs::OsRng;
use std::fmt::Write as _;

/// Generate a fresh proximity credential ID.
///
/// Always matches `NFC-[0-9a-f]{16}`.
///
/// # Errors
///
/// Returns `Error::Validation` only if the generated value fails its own
/// format check, which indicates a bug rather than an environmental failure.
pub fn generate_proximity_id() -> Result<ProximityId> {
    let mut random = [0u8; PROXIMITY_ID_RANDOM_BYTES];
    OsRng.fill_bytes(&mut random);

    ProximityId::new(&format!("{PROXIMITY_ID_PREFIX}{}", hex::encode(random)))
}

/// Derive a facial credential ID from a stabilized descriptor.
///
/// Deterministic: identical descriptors yield identical IDs.
///
/// # Errors
///
/// Returns `Error::Validation` if the descriptor is empty.
pub fn generate_face_id(descriptor: &[f32]) -> Result<FaceId> {
    let mut id = String::with_capacity(FACE_ID_PREFIX.len() + descriptor.len() * 2);
    id.push_str(FACE_ID_PREFIX);

    for component in descriptor {
        // Saturating float-to-int cast truncates toward zero.
        let byte = (component * 100.0).abs() as u8;
        let _ = write!(id, "{byte:02x}");
    }

    FaceId::new(&id)
}
