//! TSPEED (RFC 1079), XDISPLOC (RFC 1096), SNDLOC (RFC 779): simple
//! `IS`/`SEND` string exchanges sharing the same `TERMINAL-TYPE`-style tokens.

use alloc::string::String;
use alloc::vec::Vec;

use crate::telnet::ttype_token::{IS, SEND};

/// Build an `IS <value>` payload.
#[must_use]
pub fn encode_is(value: &str) -> Vec<u8> {
    let mut out = Vec::with_capacity(value.len() + 1);
    out.push(IS);
    out.extend_from_slice(value.as_bytes());
    out
}

/// Build a bare `SEND` payload.
#[must_use]
pub fn encode_send() -> [u8; 1] {
    [SEND]
}

/// Decode an `IS <value>` payload into its string value.
#[must_use]
pub fn decode_is(payload: &[u8]) -> Option<String> {
    match payload.split_first() {
        Some((&IS, rest)) => Some(String::from_utf8_lossy(rest).into_owned()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encode_decode_is_roundtrip() {
        let encoded = encode_is("38400,38400");
        assert_eq!(decode_is(&encoded).as_deref(), Some("38400,38400"));
    }

    #[test]
    fn decode_rejects_non_is_payload() {
        assert_eq!(decode_is(&[SEND]), None);
    }
}
