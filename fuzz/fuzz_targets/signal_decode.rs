//! Fuzz target for signal decoding
//!
//! # Strategy
//!
//! - Random bytes: arbitrary input as a single line
//! - Envelope-shaped: a JSON envelope with a fuzzed event name and payload
//!
//! # Invariants
//!
//! - Decoding NEVER panics, whatever the input
//! - Anything that decodes re-encodes to a line that decodes to the same value

#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use sunona_proto::{ClientSignal, ServerSignal, decode_signal, encode_signal};

#[derive(Debug, Clone, Arbitrary)]
enum Input {
    RandomBytes(Vec<u8>),
    Envelope { event: EventName, data: String },
}

#[derive(Debug, Clone, Arbitrary)]
enum EventName {
    JoinRoom,
    ChatMessage,
    Typing,
    StopTyping,
    RoomNotice,
    Other(String),
}

impl EventName {
    fn as_str(&self) -> &str {
        match self {
            Self::JoinRoom => "joinRoom",
            Self::ChatMessage => "chatMessage",
            Self::Typing => "typing",
            Self::StopTyping => "stopTyping",
            Self::RoomNotice => "roomNotice",
            Self::Other(name) => name,
        }
    }
}

fuzz_target!(|input: Input| {
    let bytes = match input {
        Input::RandomBytes(bytes) => bytes,
        Input::Envelope { event, data } => {
            format!(r#"{{"event":{:?},"data":{data}}}"#, event.as_str()).into_bytes()
        },
    };

    if let Ok(signal) = decode_signal::<ClientSignal>(&bytes) {
        let line = encode_signal(&signal).expect("decoded signal must encode");
        let again: ClientSignal = decode_signal(&line).expect("encoded signal must decode");
        assert_eq!(again, signal);
    }

    if let Ok(signal) = decode_signal::<ServerSignal>(&bytes) {
        let line = encode_signal(&signal).expect("decoded signal must encode");
        let again: ServerSignal = decode_signal(&line).expect("encoded signal must decode");
        assert_eq!(again, signal);
    }
});
