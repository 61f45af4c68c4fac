//! Command frame construction and parsing.
//!
//! # Wire Format
//!
//! ```text
//! +--------+--------+--------+--------+--------+=========+----------+
//! |  CLA   |  INS   |   P1   |   P2   | LENGTH | PAYLOAD | CHECKSUM |
//! +--------+--------+--------+--------+--------+=========+----------+
//!  \________________________________/   1 byte   N bytes    1 byte
//!            4-byte header
//! ```
//!
//! The checksum byte is the XOR of header, length, and payload, which makes
//! the XOR of a complete frame equal zero. That invariant is what the parser
//! verifies and what the property tests pin down.

use crate::commands::CardCommand;
use bytes::{BufMut, Bytes, BytesMut};
use enrollkit_core::{
    Error, Result,
    constants::{FRAME_HEADER_LEN, FRAME_OVERHEAD, MAX_FRAME_PAYLOAD},
};
use std::fmt;

/// A complete command frame in wire format.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    /// Raw bytes of the frame: header + length + payload + checksum.
    data: Bytes,
}

impl Frame {
    /// Build a frame for a command and payload.
    ///
    /// This is a pure function of its inputs: the same command and payload
    /// always produce the same bytes.
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidFrame` if the payload exceeds
    /// [`MAX_FRAME_PAYLOAD`] bytes (the length field is a single byte).
    ///
    /// # Examples
    ///
    /// ```
    /// use enrollkit_protocol::{CardCommand, Frame};
    ///
    /// let frame = Frame::build(CardCommand::WriteBlock { block: 20 }, b"NFC-12345").unwrap();
    /// assert_eq!(frame.size(), 15); // 4 + 1 + 9 + 1
    /// assert_eq!(frame.as_bytes().iter().fold(0u8, |acc, b| acc ^ b), 0);
    /// ```
    pub fn build(command: CardCommand, payload: &[u8]) -> Result<Self> {
        if payload.len() > MAX_FRAME_PAYLOAD {
            return Err(Error::invalid_frame(format!(
                "payload of {} bytes exceeds the {MAX_FRAME_PAYLOAD}-byte limit",
                payload.len()
            )));
        }

        let mut buf = BytesMut::with_capacity(FRAME_OVERHEAD + payload.len());
        buf.put_slice(&command.header());
        buf.put_u8(payload.len() as u8);
        buf.put_slice(payload);
        buf.put_u8(xor_fold(&buf));

        Ok(Frame { data: buf.freeze() })
    }

    /// Parse and validate a frame from raw bytes.
    ///
    /// # Errors
    ///
    /// - `Error::InvalidFrame` if the byte count is below the fixed overhead
    ///   or disagrees with the length field
    /// - `Error::ChecksumMismatch` if the trailing checksum does not match
    pub fn parse(bytes: &[u8]) -> Result<Self> {
        if bytes.len() < FRAME_OVERHEAD {
            return Err(Error::invalid_frame(format!(
                "frame of {} bytes is shorter than the {FRAME_OVERHEAD}-byte minimum",
                bytes.len()
            )));
        }

        let declared = bytes[FRAME_HEADER_LEN] as usize;
        if bytes.len() != FRAME_OVERHEAD + declared {
            return Err(Error::invalid_frame(format!(
                "length field declares {declared} payload bytes, frame carries {}",
                bytes.len() - FRAME_OVERHEAD
            )));
        }

        let expected = xor_fold(&bytes[..bytes.len() - 1]);
        let actual = bytes[bytes.len() - 1];
        if expected != actual {
            return Err(Error::ChecksumMismatch { expected, actual });
        }

        Ok(Frame {
            data: Bytes::copy_from_slice(bytes),
        })
    }

    /// Raw bytes of the frame.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    /// Frame size in bytes.
    #[must_use]
    pub fn size(&self) -> usize {
        self.data.len()
    }

    /// The 4-byte command header.
    #[must_use]
    pub fn header(&self) -> &[u8] {
        &self.data[..FRAME_HEADER_LEN]
    }

    /// The payload bytes.
    #[must_use]
    pub fn payload(&self) -> &[u8] {
        &self.data[FRAME_HEADER_LEN + 1..self.data.len() - 1]
    }

    /// The trailing checksum byte.
    #[must_use]
    pub fn checksum(&self) -> u8 {
        self.data[self.data.len() - 1]
    }

    /// Verify the checksum invariant: the XOR of the complete frame is zero.
    ///
    /// # Errors
    ///
    /// Returns `Error::ChecksumMismatch` if the invariant does not hold.
    pub fn verify_checksum(&self) -> Result<()> {
        let expected = xor_fold(&self.data[..self.data.len() - 1]);
        let actual = self.checksum();
        if expected == actual {
            Ok(())
        } else {
            Err(Error::ChecksumMismatch { expected, actual })
        }
    }
}

impl fmt::Display for Frame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let hex: String = self
            .data
            .iter()
            .map(|b| format!("{b:02X}"))
            .collect::<Vec<_>>()
            .join(" ");
        write!(f, "Frame[size={}, bytes={hex}]", self.size())
    }
}

/// XOR-fold a byte slice.
fn xor_fold(bytes: &[u8]) -> u8 {
    bytes.iter().fold(0u8, |acc, b| acc ^ b)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn test_build_empty_payload() {
        let frame = Frame::build(CardCommand::ReadUid, &[]).unwrap();

        assert_eq!(frame.size(), FRAME_OVERHEAD);
        assert_eq!(frame.header(), &[0xFF, 0xCA, 0x00, 0x00]);
        assert_eq!(frame.payload(), &[] as &[u8]);
        // Checksum over FF CA 00 00 00
        assert_eq!(frame.checksum(), 0xFF ^ 0xCA);
    }

    #[test]
    fn test_write_block_frame_layout() {
        let payload = *b"NFC-12345"; // 9 bytes
        let frame = Frame::build(CardCommand::WriteBlock { block: 20 }, &payload).unwrap();

        assert_eq!(frame.size(), 15); // 4 + 1 + 9 + 1
        assert_eq!(frame.header(), &[0xFF, 0xD6, 0x00, 20]);
        assert_eq!(frame.as_bytes()[4], 9); // length byte
        assert_eq!(frame.payload(), &payload);

        let xor_of_first_14 = xor_fold(&frame.as_bytes()[..14]);
        assert_eq!(frame.checksum(), xor_of_first_14);
    }

    #[rstest]
    #[case(CardCommand::ReadUid, vec![])]
    #[case(CardCommand::AuthenticateSector, vec![0x05, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF])]
    #[case(CardCommand::WriteBlock { block: 7 }, vec![0xDE, 0xAD, 0xBE, 0xEF])]
    fn test_full_frame_xors_to_zero(#[case] command: CardCommand, #[case] payload: Vec<u8>) {
        let frame = Frame::build(command, &payload).unwrap();
        assert_eq!(xor_fold(frame.as_bytes()), 0);
        frame.verify_checksum().unwrap();
    }

    #[test]
    fn test_build_is_deterministic() {
        let a = Frame::build(CardCommand::WriteBlock { block: 3 }, b"abc").unwrap();
        let b = Frame::build(CardCommand::WriteBlock { block: 3 }, b"abc").unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_build_rejects_oversized_payload() {
        let payload = vec![0u8; MAX_FRAME_PAYLOAD + 1];
        let result = Frame::build(CardCommand::ReadUid, &payload);
        assert!(matches!(result, Err(Error::InvalidFrame { .. })));
    }

    #[test]
    fn test_build_accepts_maximum_payload() {
        let payload = vec![0xA5; MAX_FRAME_PAYLOAD];
        let frame = Frame::build(CardCommand::ReadUid, &payload).unwrap();
        assert_eq!(frame.size(), FRAME_OVERHEAD + MAX_FRAME_PAYLOAD);
        assert_eq!(frame.as_bytes()[4], 255);
    }

    #[test]
    fn test_parse_round_trip() {
        let original = Frame::build(CardCommand::WriteBlock { block: 9 }, b"hello").unwrap();
        let parsed = Frame::parse(original.as_bytes()).unwrap();
        assert_eq!(parsed, original);
    }

    #[test]
    fn test_parse_rejects_short_frame() {
        let result = Frame::parse(&[0xFF, 0xCA, 0x00]);
        assert!(matches!(result, Err(Error::InvalidFrame { .. })));
    }

    #[test]
    fn test_parse_rejects_length_disagreement() {
        // Length field says 2, but only 1 payload byte present.
        let bytes = [0xFF, 0xCA, 0x00, 0x00, 0x02, 0x42, 0x00];
        let result = Frame::parse(&bytes);
        assert!(matches!(result, Err(Error::InvalidFrame { .. })));
    }

    #[test]
    fn test_parse_rejects_corrupted_checksum() {
        let mut bytes = Frame::build(CardCommand::ReadUid, b"uid")
            .unwrap()
            .as_bytes()
            .to_vec();
        let last = bytes.len() - 1;
        bytes[last] ^= 0xFF;

        let result = Frame::parse(&bytes);
        assert!(matches!(result, Err(Error::ChecksumMismatch { .. })));
    }

    #[test]
    fn test_display_is_hex() {
        let frame = Frame::build(CardCommand::ReadUid, &[]).unwrap();
        let display = format!("{frame}");
        assert!(display.contains("size=6"));
        assert!(display.contains("FF CA 00 00"));
    }
}
