//! CHARSET (RFC 2066): character-set negotiation.

use alloc::string::{String, ToString};
use alloc::vec::Vec;

use crate::telnet::charset_token::{ACCEPTED, REJECTED, REQUEST};

/// Normalise a small set of common charset aliases to their canonical IANA name.
#[must_use]
pub fn normalize_alias(name: &str) -> String {
    match name.to_ascii_uppercase().as_str() {
        "ISO-8859-02" | "ISO8859-2" | "LATIN2" => "ISO-8859-2".to_string(),
        "ISO-8859-01" | "ISO8859-1" | "LATIN1" => "ISO-8859-1".to_string(),
        "UTF8" => "UTF-8".to_string(),
        "US-ASCII" | "ASCII" | "ANSI_X3.4-1968" => "US-ASCII".to_string(),
        _ => name.to_string(),
    }
}

/// Build a `REQUEST` payload: a delimiter byte followed by delimiter-joined names.
#[must_use]
pub fn encode_request(names: &[&str], delimiter: u8) -> Vec<u8> {
    let mut out = Vec::with_capacity(1 + names.iter().map(|n| n.len() + 1).sum::<usize>());
    out.push(REQUEST);
    out.push(delimiter);
    for (i, name) in names.iter().enumerate() {
        if i > 0 {
            out.push(delimiter);
        }
        out.extend_from_slice(name.as_bytes());
    }
    out
}

/// Parse a `REQUEST` payload's delimiter-separated names (skips the leading
/// `REQUEST` token and delimiter byte, both already stripped by the caller).
#[must_use]
pub fn parse_offered_names(delimiter: u8, body: &[u8]) -> Vec<String> {
    body.split(|b| *b == delimiter)
        .filter(|piece| !piece.is_empty())
        .map(|piece| String::from_utf8_lossy(piece).into_owned())
        .collect()
}

/// Pick the first offered name (after alias normalisation) that `supported`
/// recognises, returning the canonical name to accept.
#[must_use]
pub fn select<'a>(offered: &'a [String], supported: &[&str]) -> Option<&'a str> {
    offered.iter().find_map(|name| {
        let canon = normalize_alias(name);
        supported
            .iter()
            .any(|s| s.eq_ignore_ascii_case(&canon))
            .then_some(name.as_str())
    })
}

#[must_use]
pub fn encode_accepted(name: &str) -> Vec<u8> {
    let mut out = Vec::with_capacity(name.len() + 1);
    out.push(ACCEPTED);
    out.extend_from_slice(name.as_bytes());
    out
}

#[must_use]
pub fn encode_rejected() -> Vec<u8> {
    alloc::vec![REJECTED]
}
