//! Property-based tests for frame construction.
//!
//! These tests use proptest to generate random commands and payloads and
//! verify that the framing invariants hold for the whole input space.

use proptest::prelude::*;
use enrollkit_protocol::{CardCommand, Frame};

/// Strategy for generating any supported card command.
fn any_command() -> impl Strategy<Value = CardCommand> {
    prop_oneof![
        Just(CardCommand::ReadUid),
        Just(CardCommand::AuthenticateSector),
        any::<u8>().prop_map(|block| CardCommand::WriteBlock { block }),
    ]
}

/// Strategy for generating payloads within the one-byte length limit.
fn any_payload() -> impl Strategy<Value = Vec<u8>> {
    prop::collection::vec(any::<u8>(), 0..=255)
}

proptest! {
    /// Property: the XOR of every complete frame is zero.
    ///
    /// The checksum byte is defined as the XOR of everything before it, so
    /// folding XOR over the whole frame must always cancel out.
    #[test]
    fn prop_frame_xors_to_zero(command in any_command(), payload in any_payload()) {
        let frame = Frame::build(command, &payload).unwrap();

        let folded = frame.as_bytes().iter().fold(0u8, |acc, b| acc ^ b);
        prop_assert_eq!(folded, 0);
    }

    /// Property: frame layout is header + length + payload + checksum.
    #[test]
    fn prop_frame_layout(command in any_command(), payload in any_payload()) {
        let frame = Frame::build(command, &payload).unwrap();

        prop_assert_eq!(frame.size(), 6 + payload.len());
        prop_assert_eq!(frame.header(), &command.header());
        prop_assert_eq!(frame.as_bytes()[4] as usize, payload.len());
        prop_assert_eq!(frame.payload(), payload.as_slice());
    }

    /// Property: built frames parse back to themselves.
    #[test]
    fn prop_frame_parse_round_trip(command in any_command(), payload in any_payload()) {
        let frame = Frame::build(command, &payload).unwrap();
        let parsed = Frame::parse(frame.as_bytes()).unwrap();

        prop_assert_eq!(parsed, frame);
    }

    /// Property: corrupting any single byte of a frame is detected.
    ///
    /// A one-byte flip either breaks the checksum or (for the length byte)
    /// the declared/actual payload length agreement.
    #[test]
    fn prop_single_byte_corruption_detected(
        command in any_command(),
        payload in prop::collection::vec(any::<u8>(), 0..64),
        position in any::<prop::sample::Index>(),
        flip in 1u8..=255,
    ) {
        let frame = Frame::build(command, &payload).unwrap();
        let mut corrupted = frame.as_bytes().to_vec();
        let index = position.index(corrupted.len());
        corrupted[index] ^= flip;

        prop_assert!(Frame::parse(&corrupted).is_err());
    }
}
