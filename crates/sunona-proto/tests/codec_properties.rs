//! Property-based tests for signal framing.
//!
//! Verifies that the line decoder reassembles signals regardless of how the
//! byte stream is chunked, and that arbitrary input never panics.

use proptest::prelude::*;
use sunona_proto::{
    ClientSignal, LineDecoder, ServerSignal, WireMessage, decode_signal, encode_signal,
};

fn name_strategy() -> impl Strategy<Value = String> {
    "[A-Za-z][A-Za-z0-9 _]{0,24}"
}

fn message_strategy() -> impl Strategy<Value = WireMessage> {
    (any::<u64>(), name_strategy(), "\\PC{1,64}", any::<u64>(), any::<bool>()).prop_map(
        |(id, sender, text, ts, system)| {
            if system {
                WireMessage::system(id, text, ts)
            } else {
                WireMessage::chat(id, sender, text, ts)
            }
        },
    )
}

fn server_signal_strategy() -> impl Strategy<Value = ServerSignal> {
    prop_oneof![
        name_strategy().prop_map(ServerSignal::RoomNotice),
        message_strategy().prop_map(ServerSignal::ChatMessage),
        name_strategy().prop_map(ServerSignal::Typing),
        name_strategy().prop_map(ServerSignal::StopTyping),
    ]
}

proptest! {
    #[test]
    fn prop_chunking_preserves_signals(
        signals in prop::collection::vec(server_signal_strategy(), 1..20),
        chunk in 1usize..64,
    ) {
        let mut stream = Vec::new();
        for signal in &signals {
            stream.extend(encode_signal(signal).unwrap());
        }

        let mut decoder = LineDecoder::default();
        let mut decoded = Vec::new();
        for piece in stream.chunks(chunk) {
            decoder.extend(piece);
            while let Some(result) = decoder.next_signal::<ServerSignal>() {
                decoded.push(result.unwrap());
            }
        }

        prop_assert_eq!(decoded, signals);
        prop_assert_eq!(decoder.buffered(), 0);
    }

    #[test]
    fn prop_decode_never_panics(bytes in prop::collection::vec(any::<u8>(), 0..512)) {
        let _ = decode_signal::<ClientSignal>(&bytes);
        let _ = decode_signal::<ServerSignal>(&bytes);

        let mut decoder = LineDecoder::new(128);
        decoder.extend(&bytes);
        while decoder.next_line().is_some() {}
        prop_assert!(decoder.buffered() <= 128);
    }
}
