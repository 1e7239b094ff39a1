//! Fuzz target for line reassembly
//!
//! # Strategy
//!
//! - Arbitrary stream split into arbitrary chunks
//! - Small line limit so oversized lines are common
//!
//! # Invariants
//!
//! - Returned lines never contain the terminator and never exceed the limit
//! - Blank lines are never returned
//! - After draining, at most `max_len` bytes stay buffered
//! - Chunking does not change which lines are returned

#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use sunona_proto::LineDecoder;

#[derive(Debug, Clone, Arbitrary)]
struct Stream {
    max_len: u8,
    bytes: Vec<u8>,
    cuts: Vec<u8>,
}

fn drain(decoder: &mut LineDecoder, max_len: usize, lines: &mut Vec<Vec<u8>>) {
    while let Some(result) = decoder.next_line() {
        if let Ok(line) = result {
            assert!(!line.contains(&b'\n'));
            assert!(line.len() <= max_len);
            assert!(!line.iter().all(u8::is_ascii_whitespace));
            lines.push(line.to_vec());
        }
    }
    assert!(decoder.buffered() <= max_len);
}

fuzz_target!(|stream: Stream| {
    let max_len = usize::from(stream.max_len).max(1);

    let mut whole = LineDecoder::new(max_len);
    let mut expected = Vec::new();
    whole.extend(&stream.bytes);
    drain(&mut whole, max_len, &mut expected);

    let mut chunked = LineDecoder::new(max_len);
    let mut actual = Vec::new();
    let mut rest = stream.bytes.as_slice();
    for cut in stream.cuts.iter().copied().map(usize::from) {
        let (chunk, tail) = rest.split_at(cut.min(rest.len()));
        chunked.extend(chunk);
        drain(&mut chunked, max_len, &mut actual);
        rest = tail;
    }
    chunked.extend(rest);
    drain(&mut chunked, max_len, &mut actual);

    assert_eq!(actual, expected);
});
