//! Line terminator normaliser (§4.G): turns the inbound NVT byte stream into
//! `LINE_END`/`RECORD_END` boundaries plus interleaved data, or passes bytes
//! through untouched when `BINARY` is in effect.

extern crate alloc;

use bytes::{Bytes, BytesMut};

/// One decision the normaliser made about a span of inbound bytes.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum LineEvent {
    /// Plain data with no terminator in it (yet).
    Data(Bytes),
    /// A line boundary: `CR LF`, `CR NUL`, or a bare `LF`.
    LineEnd,
}

/// Tracks whether the last byte seen was a bare `CR`, across calls.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct Normalizer {
    pending_cr: bool,
}

impl Normalizer {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed one chunk of already-IAC-unescaped, non-BINARY inbound bytes.
    /// `IAC EOR` is not handled here; the caller strips that before this runs
    /// since it is a command, not line data.
    pub fn feed(&mut self, chunk: &[u8]) -> alloc::vec::Vec<LineEvent> {
        let mut out = alloc::vec::Vec::new();
        let mut data = BytesMut::new();
        let mut iter = chunk.iter().copied().peekable();

        while let Some(byte) = iter.next() {
            if self.pending_cr {
                self.pending_cr = false;
                match byte {
                    b'\n' | 0 => {
                        flush_data(&mut out, &mut data);
                        out.push(LineEvent::LineEnd);
                        continue;
                    }
                    _ => {
                        flush_data(&mut out, &mut data);
                        out.push(LineEvent::LineEnd);
                        // fall through: re-process `byte` as ordinary data below
                    }
                }
            }
            if byte == b'\r' {
                self.pending_cr = true;
                continue;
            }
            if byte == b'\n' {
                flush_data(&mut out, &mut data);
                out.push(LineEvent::LineEnd);
                continue;
            }
            data.extend_from_slice(&[byte]);
        }
        flush_data(&mut out, &mut data);
        out
    }

    /// True if a bare `CR` is buffered, waiting to see the next byte.
    #[must_use]
    pub fn has_pending_cr(&self) -> bool {
        self.pending_cr
    }
}

fn flush_data(out: &mut alloc::vec::Vec<LineEvent>, data: &mut BytesMut) {
    if !data.is_empty() {
        out.push(LineEvent::Data(data.split().freeze()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cr_lf_emits_one_line_end() {
        let mut n = Normalizer::new();
        let events = n.feed(b"hello\r\n");
        assert_eq!(
            events,
            vec![
                LineEvent::Data(Bytes::from_static(b"hello")),
                LineEvent::LineEnd,
            ]
        );
    }

    #[test]
    fn cr_nul_emits_one_line_end() {
        let mut n = Normalizer::new();
        let events = n.feed(b"hello\r\0");
        assert_eq!(
            events,
            vec![
                LineEvent::Data(Bytes::from_static(b"hello")),
                LineEvent::LineEnd,
            ]
        );
    }

    #[test]
    fn cr_other_emits_line_end_then_data() {
        let mut n = Normalizer::new();
        let events = n.feed(b"ab\rcd");
        assert_eq!(
            events,
            vec![
                LineEvent::Data(Bytes::from_static(b"ab")),
                LineEvent::LineEnd,
                LineEvent::Data(Bytes::from_static(b"cd")),
            ]
        );
    }

    #[test]
    fn bare_lf_emits_line_end() {
        let mut n = Normalizer::new();
        let events = n.feed(b"ab\ncd");
        assert_eq!(
            events,
            vec![
                LineEvent::Data(Bytes::from_static(b"ab")),
                LineEvent::LineEnd,
                LineEvent::Data(Bytes::from_static(b"cd")),
            ]
        );
    }

    #[test]
    fn cr_split_across_feed_calls_still_resolves() {
        let mut n = Normalizer::new();
        let first = n.feed(b"hello\r");
        assert_eq!(first, vec![LineEvent::Data(Bytes::from_static(b"hello"))]);
        assert!(n.has_pending_cr());
        let second = n.feed(b"\n");
        assert_eq!(second, vec![LineEvent::LineEnd]);
    }

    #[test]
    fn repeated_feeding_is_idempotent_on_already_normalised_data() {
        let mut n = Normalizer::new();
        let once = n.feed(b"a\r\nb\r\n");
        let mut n2 = Normalizer::new();
        let twice: alloc::vec::Vec<_> = once
            .iter()
            .flat_map(|ev| match ev {
                LineEvent::Data(d) => n2.feed(d),
                LineEvent::LineEnd => n2.feed(b"\r\n"),
            })
            .collect();
        assert_eq!(once, twice);
    }
}
