//! Newline-delimited JSON framing.
//!
//! Every signal is one JSON object followed by `\n`. JSON string escaping
//! guarantees the encoded object never contains a raw newline, so the
//! terminator is unambiguous.
//!
//! # Invariants
//!
//! - Bounded Buffering: [`LineDecoder`] never holds more than
//!   [`MAX_LINE_LEN`] bytes of an unterminated line. An oversized line is
//!   reported once and then discarded up to its terminator, after which
//!   decoding resumes on the next line.
//! - Line Isolation: a malformed line never affects the lines around it.

use bytes::{Buf, BytesMut};
use serde::{Serialize, de::DeserializeOwned};

use crate::errors::{ProtocolError, Result};

/// Maximum accepted line length in bytes, terminator excluded (64 KiB).
pub const MAX_LINE_LEN: usize = 64 * 1024;

/// Encode a signal as a single terminated line.
pub fn encode_signal<T: Serialize>(signal: &T) -> Result<Vec<u8>> {
    let mut line = serde_json::to_vec(signal)?;
    line.push(b'\n');
    Ok(line)
}

/// Decode one line (terminator optional) into a signal.
///
/// Trailing `\r` is tolerated so hand-typed `nc` sessions work.
pub fn decode_signal<T: DeserializeOwned>(line: &[u8]) -> Result<T> {
    let line = line.strip_suffix(b"\n").unwrap_or(line);
    let line = line.strip_suffix(b"\r").unwrap_or(line);
    let text = std::str::from_utf8(line).map_err(|_| ProtocolError::InvalidUtf8)?;
    Ok(serde_json::from_str(text)?)
}

/// Reassembles lines from an arbitrarily chunked byte stream.
#[derive(Debug)]
pub struct LineDecoder {
    buf: BytesMut,
    max_len: usize,
    /// Dropping bytes until the next terminator after an oversized line.
    discarding: bool,
}

impl Default for LineDecoder {
    fn default() -> Self {
        Self::new(MAX_LINE_LEN)
    }
}

impl LineDecoder {
    /// Create a decoder with the given per-line limit.
    pub fn new(max_len: usize) -> Self {
        Self { buf: BytesMut::with_capacity(4096), max_len, discarding: false }
    }

    /// Mutable access to the receive buffer for `read_buf`-style reads.
    pub fn buffer_mut(&mut self) -> &mut BytesMut {
        &mut self.buf
    }

    /// Append received bytes.
    pub fn extend(&mut self, bytes: &[u8]) {
        self.buf.extend_from_slice(bytes);
    }

    /// Number of buffered bytes not yet returned as a line.
    pub fn buffered(&self) -> usize {
        self.buf.len()
    }

    /// Next complete line without its terminator.
    ///
    /// Returns `None` when more bytes are needed. Empty lines are skipped.
    pub fn next_line(&mut self) -> Option<Result<BytesMut>> {
        loop {
            let Some(pos) = self.buf.iter().position(|&b| b == b'\n') else {
                if self.discarding {
                    self.buf.clear();
                    return None;
                }
                if self.buf.len() > self.max_len {
                    let len = self.buf.len();
                    self.buf.clear();
                    self.discarding = true;
                    return Some(Err(ProtocolError::LineTooLong { len, max: self.max_len }));
                }
                return None;
            };

            let line = self.buf.split_to(pos);
            self.buf.advance(1);

            if self.discarding {
                self.discarding = false;
                continue;
            }
            if line.len() > self.max_len {
                return Some(Err(ProtocolError::LineTooLong {
                    len: line.len(),
                    max: self.max_len,
                }));
            }
            if line.iter().all(u8::is_ascii_whitespace) {
                continue;
            }
            return Some(Ok(line));
        }
    }

    /// Next complete line decoded as a signal.
    pub fn next_signal<T: DeserializeOwned>(&mut self) -> Option<Result<T>> {
        self.next_line().map(|line| line.and_then(|line| decode_signal(&line)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{ClientSignal, ServerSignal, WireMessage};

    #[test]
    fn encode_terminates_line() {
        let line = encode_signal(&ClientSignal::Typing("Alice".into())).unwrap();
        assert_eq!(line.last(), Some(&b'\n'));
        assert_eq!(line.iter().filter(|&&b| b == b'\n').count(), 1);
    }

    #[test]
    fn newline_in_text_is_escaped() {
        let msg = WireMessage::chat(1, "Alice", "two\nlines", 5);
        let line = encode_signal(&ClientSignal::ChatMessage(msg.clone())).unwrap();
        assert_eq!(line.iter().filter(|&&b| b == b'\n').count(), 1);

        let decoded: ClientSignal = decode_signal(&line).unwrap();
        assert_eq!(decoded, ClientSignal::ChatMessage(msg));
    }

    #[test]
    fn decoder_reassembles_split_chunks() {
        let line = encode_signal(&ServerSignal::RoomNotice("Bob".into())).unwrap();
        let (a, b) = line.split_at(7);

        let mut decoder = LineDecoder::default();
        decoder.extend(a);
        assert!(decoder.next_signal::<ServerSignal>().is_none());

        decoder.extend(b);
        let signal = decoder.next_signal::<ServerSignal>().unwrap().unwrap();
        assert_eq!(signal, ServerSignal::RoomNotice("Bob".into()));
        assert_eq!(decoder.buffered(), 0);
    }

    #[test]
    fn decoder_yields_multiple_lines_in_order() {
        let mut decoder = LineDecoder::default();
        decoder.extend(&encode_signal(&ServerSignal::Typing("Bob".into())).unwrap());
        decoder.extend(&encode_signal(&ServerSignal::StopTyping("Bob".into())).unwrap());

        let first = decoder.next_signal::<ServerSignal>().unwrap().unwrap();
        let second = decoder.next_signal::<ServerSignal>().unwrap().unwrap();

        assert_eq!(first, ServerSignal::Typing("Bob".into()));
        assert_eq!(second, ServerSignal::StopTyping("Bob".into()));
        assert!(decoder.next_line().is_none());
    }

    #[test]
    fn crlf_tolerated() {
        let signal: ClientSignal =
            decode_signal(b"{\"event\":\"typing\",\"data\":\"A\"}\r\n").unwrap();
        assert_eq!(signal, ClientSignal::Typing("A".into()));
    }

    #[test]
    fn blank_lines_skipped() {
        let mut decoder = LineDecoder::default();
        decoder.extend(b"\n  \n{\"event\":\"typing\",\"data\":\"A\"}\n");

        let signal = decoder.next_signal::<ServerSignal>().unwrap().unwrap();
        assert_eq!(signal, ServerSignal::Typing("A".into()));
    }

    #[test]
    fn oversized_line_reported_once_then_skipped() {
        let mut decoder = LineDecoder::new(64);
        decoder.extend(&[b'x'; 80]);

        assert!(matches!(decoder.next_line(), Some(Err(ProtocolError::LineTooLong { .. }))));
        assert_eq!(decoder.buffered(), 0);

        // Remainder of the oversized line, then a good line
        decoder.extend(b"xxxx\n{\"event\":\"typing\",\"data\":\"A\"}\n");
        let decoder_result = decoder.next_line().unwrap().unwrap();
        assert_eq!(&decoder_result[..], b"{\"event\":\"typing\",\"data\":\"A\"}");
    }

    #[test]
    fn malformed_line_does_not_poison_stream() {
        let mut decoder = LineDecoder::default();
        decoder.extend(b"{not json}\n{\"event\":\"typing\",\"data\":\"A\"}\n");

        assert!(matches!(
            decoder.next_signal::<ServerSignal>(),
            Some(Err(ProtocolError::Malformed(_)))
        ));
        assert_eq!(
            decoder.next_signal::<ServerSignal>().unwrap().unwrap(),
            ServerSignal::Typing("A".into())
        );
    }

    #[test]
    fn invalid_utf8_rejected() {
        let result = decode_signal::<ServerSignal>(&[0xff, 0xfe, b'\n']);
        assert!(matches!(result, Err(ProtocolError::InvalidUtf8)));
    }
}
