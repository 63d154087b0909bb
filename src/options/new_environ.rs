//! NEW_ENVIRON (RFC 1572): VAR/VALUE/ESC/USERVAR environment exchange.

use alloc::string::String;
use alloc::vec::Vec;

use crate::events::EnvironKind;
use crate::telnet::environ_token::{ESC, INFO, IS, SEND, USERVAR, VALUE, VAR};

/// One decoded `(name, value, kind)` record.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct EnvironVar {
    pub name: String,
    pub value: String,
    pub kind: EnvironKind,
}

/// Unescape a NEW_ENVIRON field: `ESC` followed by any byte yields that byte
/// literally (RFC 1572 §2 — `ESC` escapes `VAR`/`VALUE`/`ESC`/`USERVAR`).
fn unescape(field: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(field.len());
    let mut iter = field.iter().copied();
    while let Some(byte) = iter.next() {
        if byte == ESC {
            if let Some(next) = iter.next() {
                out.push(next);
            }
        } else {
            out.push(byte);
        }
    }
    out
}

/// Escape `VAR`/`VALUE`/`ESC`/`USERVAR` bytes appearing literally in a field.
#[must_use]
pub fn escape(field: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(field.len());
    for &byte in field {
        if matches!(byte, VAR | VALUE | ESC | USERVAR) {
            out.push(ESC);
        }
        out.push(byte);
    }
    out
}

/// Parse an `IS`/`INFO` body (the leading `IS`/`INFO` token already stripped)
/// into ordered `(name, value, kind)` records. Truncated trailing records are
/// dropped silently, keeping every prior valid one (§4.E).
#[must_use]
pub fn parse_records(body: &[u8]) -> Vec<EnvironVar> {
    let mut records = Vec::new();
    let mut i = 0;
    while i < body.len() {
        let kind = match body[i] {
            VAR => EnvironKind::Var,
            USERVAR => EnvironKind::UserVar,
            _ => break,
        };
        i += 1;
        let (name_field, after_name) = take_field(body, i);
        i = after_name;
        if i >= body.len() || body[i] != VALUE {
            break;
        }
        i += 1;
        let (value_field, after_value) = take_field(body, i);
        i = after_value;
        records.push(EnvironVar {
            name: String::from_utf8_lossy(&unescape(name_field)).into_owned(),
            value: String::from_utf8_lossy(&unescape(value_field)).into_owned(),
            kind,
        });
    }
    records
}

/// Scan forward from `start` to the next unescaped `VAR`/`VALUE`/`USERVAR`
/// token (or end of buffer), returning the raw (still-escaped) field slice.
fn take_field(body: &[u8], start: usize) -> (&[u8], usize) {
    let mut i = start;
    while i < body.len() {
        if body[i] == ESC {
            i += 2;
            continue;
        }
        if matches!(body[i], VAR | VALUE | USERVAR) {
            break;
        }
        i += 1;
    }
    (&body[start..i.min(body.len())], i.min(body.len()))
}

/// Build a `SEND` request body for an allowlist of variable names (empty
/// allowlist means "send all": an empty payload).
#[must_use]
pub fn encode_send(names: &[&str]) -> Vec<u8> {
    let mut out = Vec::new();
    out.push(SEND);
    for name in names {
        out.push(VAR);
        out.extend_from_slice(&escape(name.as_bytes()));
    }
    out
}

/// Build an `IS` response body from `(name, value, kind)` triples.
#[must_use]
pub fn encode_is(vars: &[(&str, &str, EnvironKind)]) -> Vec<u8> {
    let mut out = Vec::new();
    out.push(IS);
    for (name, value, kind) in vars {
        out.push(match kind {
            EnvironKind::Var => VAR,
            EnvironKind::UserVar => USERVAR,
        });
        out.extend_from_slice(&escape(name.as_bytes()));
        out.push(VALUE);
        out.extend_from_slice(&escape(value.as_bytes()));
    }
    out
}

/// True if the leading token is `INFO` rather than `IS`/`SEND`.
#[must_use]
pub fn is_info(leading_token: u8) -> bool {
    leading_token == INFO
}
