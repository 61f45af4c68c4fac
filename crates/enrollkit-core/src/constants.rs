//! Shared constants for the credential enrollment subsystem.
//!
//! These cover the card wire protocol, the serial reader profile, the
//! biometric sampling pipeline, and the credential ID formats. Values marked
//! as reader-profile constants come from the ACR122U-class contactless
//! readers this system is deployed with; changing them breaks compatibility
//! with fielded hardware.
//!
//! # Frame layout
//!
//! Every command frame on the serial link has the same shape:
//!
//! ```text
//! +--------+--------+--------+--------+--------+=========+----------+
//! |  CLA   |  INS   |   P1   |   P2   | LENGTH | PAYLOAD | CHECKSUM |
//! +--------+--------+--------+--------+--------+=========+----------+
//!  \________________________________/
//!            4-byte header
//! ```
//!
//! The checksum is the XOR of every preceding byte, so the XOR of a complete
//! frame is always zero.

// ============================================================================
// Frame layout
// ============================================================================

/// Header length in bytes (CLA + INS + P1 + P2).
pub const FRAME_HEADER_LEN: usize = 4;

/// Fixed frame overhead in bytes: header + length byte + checksum byte.
pub const FRAME_OVERHEAD: usize = FRAME_HEADER_LEN + 2;

/// Maximum payload size in bytes.
///
/// The payload length is carried in a single byte.
pub const MAX_FRAME_PAYLOAD: usize = 255;

/// Command class byte shared by all reader commands.
pub const CLA_READER: u8 = 0xFF;

/// Instruction byte: read the card UID.
pub const INS_READ_UID: u8 = 0xCA;

/// Instruction byte: authenticate a sector with a key.
pub const INS_AUTHENTICATE: u8 = 0x82;

/// Instruction byte: write a data block. The target block index is carried
/// in the P2 header byte.
pub const INS_WRITE_BLOCK: u8 = 0xD6;

// ============================================================================
// Response status
// ============================================================================

/// Terminal status pair indicating success (`SW1 SW2` = `90 00`).
///
/// Any other trailing pair is a failure and is surfaced verbatim in the
/// resulting error.
pub const STATUS_SUCCESS: [u8; 2] = [0x90, 0x00];

// ============================================================================
// Sector authentication
// ============================================================================

/// Sector key length in bytes.
pub const SECTOR_KEY_LEN: usize = 6;

/// Factory-default sector key (all `0xFF`).
///
/// This is the transport key cards ship with. It provides negligible access
/// control; key diversification is handled outside this subsystem.
pub const DEFAULT_SECTOR_KEY: [u8; SECTOR_KEY_LEN] = [0xFF; SECTOR_KEY_LEN];

// ============================================================================
// Credential layout on card
// ============================================================================

/// Sector that stores the proximity credential.
pub const CREDENTIAL_SECTOR: u8 = 5;

/// Block that stores the proximity credential.
pub const CREDENTIAL_BLOCK: u8 = 20;

// ============================================================================
// Serial reader profile
// ============================================================================

/// USB vendor ID of the supported reader family (ACS).
pub const READER_USB_VENDOR_ID: u16 = 0x072F;

/// Default baud rate for the reader serial link.
pub const DEFAULT_BAUD_RATE: u32 = 115_200;

/// Default bounded window for a card response (milliseconds).
///
/// No read on the serial link may wait longer than this; a missing terminal
/// marker within the window is reported as a timeout.
pub const DEFAULT_READ_TIMEOUT_MS: u64 = 3_000;

// ============================================================================
// Biometric pipeline
// ============================================================================

/// Length of a face descriptor produced by the recognition model.
pub const DESCRIPTOR_LENGTH: usize = 128;

/// Number of accepted detections required before an ID is derived.
pub const SAMPLE_TARGET: usize = 10;

/// Polling interval between detection attempts (milliseconds).
pub const SAMPLE_INTERVAL_MS: u64 = 100;

/// Default capture frame width in pixels.
pub const CAPTURE_WIDTH: u32 = 640;

/// Default capture frame height in pixels.
pub const CAPTURE_HEIGHT: u32 = 480;

// ============================================================================
// Credential ID formats
// ============================================================================

/// Prefix of proximity credential IDs.
pub const PROXIMITY_ID_PREFIX: &str = "NFC-";

/// Number of random bytes backing a proximity credential ID.
pub const PROXIMITY_ID_RANDOM_BYTES: usize = 8;

/// Prefix of facial credential IDs.
pub const FACE_ID_PREFIX: &str = "FACE-";

// ============================================================================
// Identity validation
// ============================================================================

/// Minimum accepted password length for a new account.
pub const MIN_PASSWORD_LENGTH: usize = 8;
