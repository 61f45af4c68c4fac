//! Card command codes and their frame headers.

use enrollkit_core::constants::{CLA_READER, INS_AUTHENTICATE, INS_READ_UID, INS_WRITE_BLOCK};
use std::fmt;

/// Commands understood by the reader.
///
/// Each command maps to a fixed 4-byte frame header `[CLA, INS, P1, P2]`.
/// The class byte is the same for the whole family; the instruction byte
/// selects the operation; the write command carries its target block index
/// in P2.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CardCommand {
    /// Read the UID of the card in the field.
    ReadUid,

    /// Authenticate a sector. The sector index and key travel in the
    /// payload.
    AuthenticateSector,

    /// Write one data block, addressed by block index.
    WriteBlock { block: u8 },
}

impl CardCommand {
    /// The 4-byte frame header for this command.
    #[must_use]
    pub fn header(&self) -> [u8; 4] {
        match self {
            CardCommand::ReadUid => [CLA_READER, INS_READ_UID, 0x00, 0x00],
            CardCommand::AuthenticateSector => [CLA_READER, INS_AUTHENTICATE, 0x00, 0x00],
            CardCommand::WriteBlock { block } => [CLA_READER, INS_WRITE_BLOCK, 0x00, *block],
        }
    }

    /// The instruction byte of this command.
    #[must_use]
    pub fn ins(&self) -> u8 {
        self.header()[1]
    }

    /// Human-readable command name for logging.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            CardCommand::ReadUid => "ReadUid",
            CardCommand::AuthenticateSector => "AuthenticateSector",
            CardCommand::WriteBlock { .. } => "WriteBlock",
        }
    }
}

impl fmt::Display for CardCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CardCommand::WriteBlock { block } => write!(f, "WriteBlock(block={block})"),
            other => write!(f, "{}", other.name()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_uid_header() {
        assert_eq!(CardCommand::ReadUid.header(), [0xFF, 0xCA, 0x00, 0x00]);
    }

    #[test]
    fn test_authenticate_header() {
        assert_eq!(
            CardCommand::AuthenticateSector.header(),
            [0xFF, 0x82, 0x00, 0x00]
        );
    }

    #[test]
    fn test_write_block_header_carries_block_index() {
        let cmd = CardCommand::WriteBlock { block: 20 };
        assert_eq!(cmd.header(), [0xFF, 0xD6, 0x00, 20]);
        assert_eq!(cmd.ins(), 0xD6);
    }

    #[test]
    fn test_display() {
        assert_eq!(CardCommand::ReadUid.to_string(), "ReadUid");
        assert_eq!(
            CardCommand::WriteBlock { block: 4 }.to_string(),
            "WriteBlock(block=4)"
        );
    }
}
