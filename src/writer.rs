//! Encoder/writer (§4.H): IAC escaping, outbound framing for commands and
//! subnegotiations, and the line-ending policy inverse of [`crate::line`].

use bytes::{BufMut, Bytes, BytesMut};

use crate::telnet::op_command::{DO, DONT, GA, IAC, SB, SE, WILL, WONT};

/// Double every `0xFF` byte in `data` (IAC escaping for outbound payloads).
#[must_use]
pub fn escape_iac(data: &[u8]) -> Bytes {
    if !data.contains(&IAC) {
        return Bytes::copy_from_slice(data);
    }
    let mut out = BytesMut::with_capacity(data.len() + 4);
    for &byte in data {
        out.put_u8(byte);
        if byte == IAC {
            out.put_u8(IAC);
        }
    }
    out.freeze()
}

/// Undo [`escape_iac`]: collapse every doubled `0xFF` back to one. Used when
/// re-deriving the original payload from an already-escaped buffer (tests,
/// and the arbitrary-derived round trip of [`crate::events::Subnegotiation`]).
#[must_use]
pub fn unescape_iac(data: &[u8]) -> Bytes {
    if !data.contains(&IAC) {
        return Bytes::copy_from_slice(data);
    }
    let mut out = BytesMut::with_capacity(data.len());
    let mut iter = data.iter().copied().peekable();
    while let Some(byte) = iter.next() {
        out.put_u8(byte);
        if byte == IAC && iter.peek() == Some(&IAC) {
            iter.next();
        }
    }
    out.freeze()
}

/// Frame a bare negotiation command: `IAC <verb> <option>`.
#[must_use]
pub fn negotiation(verb: u8, option: u8) -> Bytes {
    Bytes::copy_from_slice(&[IAC, verb, option])
}

#[must_use]
pub fn will(option: u8) -> Bytes {
    negotiation(WILL, option)
}

#[must_use]
pub fn wont(option: u8) -> Bytes {
    negotiation(WONT, option)
}

#[must_use]
pub fn do_(option: u8) -> Bytes {
    negotiation(DO, option)
}

#[must_use]
pub fn dont(option: u8) -> Bytes {
    negotiation(DONT, option)
}

/// Frame `IAC SB <option> <payload, IAC-escaped> IAC SE`.
#[must_use]
pub fn send_sb(option: u8, payload: &[u8]) -> Bytes {
    let escaped = escape_iac(payload);
    let mut buf = BytesMut::with_capacity(escaped.len() + 5);
    buf.put_u8(IAC);
    buf.put_u8(SB);
    buf.put_u8(option);
    buf.put(escaped);
    buf.put_u8(IAC);
    buf.put_u8(SE);
    buf.freeze()
}

/// Frame a bare `IAC GA`.
#[must_use]
pub fn send_ga() -> Bytes {
    Bytes::copy_from_slice(&[IAC, GA])
}

/// The line-ending policy to apply when writing text (§4.G, inverse direction).
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum EolPolicy {
    /// `BINARY` is enabled: pass data through unchanged.
    Binary,
    /// `SGA` enabled but not `BINARY`: legacy BSD behaviour, `\n` becomes `CR NUL`.
    SuppressGoAhead,
    /// Plain NVT: `\n` becomes `CR LF`.
    Nvt,
}

/// Apply IAC doubling and, for text payloads, the outbound EOL policy.
#[must_use]
pub fn write(data: &[u8], policy: EolPolicy) -> Bytes {
    if policy == EolPolicy::Binary {
        return escape_iac(data);
    }
    let mut expanded = BytesMut::with_capacity(data.len() + 2);
    for &byte in data {
        if byte == b'\n' {
            expanded.put_u8(b'\r');
            match policy {
                EolPolicy::Nvt => expanded.put_u8(b'\n'),
                EolPolicy::SuppressGoAhead => expanded.put_u8(0),
                EolPolicy::Binary => unreachable!(),
            }
        } else {
            expanded.put_u8(byte);
        }
    }
    escape_iac(&expanded)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn escape_iac_doubles_0xff_bytes() {
        let escaped = escape_iac(&[0x01, IAC, 0x02]);
        assert_eq!(&escaped[..], &[0x01, IAC, IAC, 0x02]);
    }

    #[test]
    fn escape_then_unescape_roundtrips() {
        let data = [0x00, IAC, IAC, 0xfe, IAC];
        let escaped = escape_iac(&data);
        assert_eq!(&unescape_iac(&escaped)[..], &data[..]);
    }

    #[test]
    fn write_nvt_turns_newline_into_cr_lf() {
        let out = write(b"hi\n", EolPolicy::Nvt);
        assert_eq!(&out[..], b"hi\r\n");
    }

    #[test]
    fn write_suppress_go_ahead_turns_newline_into_cr_nul() {
        let out = write(b"hi\n", EolPolicy::SuppressGoAhead);
        assert_eq!(&out[..], b"hi\r\0");
    }

    #[test]
    fn write_binary_passes_through_and_still_escapes_iac() {
        let out = write(&[b'h', IAC, b'\n'], EolPolicy::Binary);
        assert_eq!(&out[..], &[b'h', IAC, IAC, b'\n']);
    }

    #[test]
    fn send_sb_frames_and_escapes_payload() {
        let framed = send_sb(24, &[IAC, 0x01]);
        assert_eq!(&framed[..], &[IAC, SB, 24, IAC, IAC, 0x01, IAC, SE]);
    }

    #[test]
    fn will_wont_do_dont_frame_three_bytes() {
        assert_eq!(&will(1)[..], &[IAC, WILL, 1]);
        assert_eq!(&wont(1)[..], &[IAC, WONT, 1]);
        assert_eq!(&do_(31)[..], &[IAC, DO, 31]);
        assert_eq!(&dont(31)[..], &[IAC, DONT, 31]);
    }
}
