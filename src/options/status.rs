//! STATUS (RFC 859): mirror the negotiated state back to a peer that asks.

use alloc::vec::Vec;

use crate::compatibility::Table;
use crate::telnet::op_command::{DO, WILL};

/// Build the `IS` body: one `(WILL opt)`/`(DO opt)` pair per side currently
/// ENABLED, in ascending option-byte order.
#[must_use]
pub fn encode_is(table: &Table) -> Vec<u8> {
    let mut out = Vec::new();
    out.push(0); // IS token (STATUS reuses the generic IS=0 convention)
    for opt in 0u16..=255 {
        let opt = opt as u8;
        let entry = table.option(opt);
        if entry.local_enabled() {
            out.push(WILL);
            out.push(opt);
        }
        if entry.remote_enabled() {
            out.push(DO);
            out.push(opt);
        }
    }
    out
}

/// Parse an `IS` body into `(command, option)` pairs for comparison against
/// the local view (§4.E, §9 — log-only, never re-negotiated automatically).
#[must_use]
pub fn parse_is(body: &[u8]) -> Vec<(u8, u8)> {
    // body[0] is the IS token.
    body.get(1..)
        .unwrap_or(&[])
        .chunks_exact(2)
        .map(|pair| (pair[0], pair[1]))
        .collect()
}

/// Compare a peer's `IS` report against our local view; returns the
/// mismatches found (logged at INFO by the caller, never acted on).
#[must_use]
pub fn diff_against(table: &Table, reported: &[(u8, u8)]) -> Vec<(u8, u8)> {
    reported
        .iter()
        .copied()
        .filter(|&(command, option)| {
            let entry = table.option(option);
            let expected = match command {
                WILL => entry.remote_enabled(),
                DO => entry.local_enabled(),
                _ => return true,
            };
            !expected
        })
        .collect()
}
