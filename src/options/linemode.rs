//! LINEMODE (RFC 1184): MODE negotiation, FORWARDMASK storage, and the SLC
//! table sub-protocol (the triple-level negotiation itself lives in
//! [`crate::slc`]; this module owns the MODE handshake and SB framing).

use alloc::vec::Vec;

use crate::slc::{SlcEntry, SlcFlags, SlcFunction, SlcTable};
use crate::telnet::linemode_token::{FORWARDMASK, MODE, MODE_ACK, SLC};

/// The negotiated MODE flags and their acknowledgement state (§4.E).
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct ModeState {
    pub flags: u8,
    /// We proposed `flags` and are waiting for the peer to echo it with ACK.
    pub pending_ack: bool,
}

impl ModeState {
    /// Process an inbound MODE byte. Returns `Some(reply_flags)` if we must
    /// echo a MODE reply (setting ACK), or `None` if this is our own
    /// proposal being acknowledged (or a redundant repeat, §4.E).
    pub fn on_mode_byte(&mut self, byte: u8) -> Option<u8> {
        let acked = byte & MODE_ACK != 0;
        let flags = byte & !MODE_ACK;
        if acked {
            if self.pending_ack && flags == self.flags {
                self.pending_ack = false;
            }
            return None;
        }
        if !self.pending_ack && flags == self.flags {
            // Peer re-sent the same MODE without ACK: no-op, don't loop.
            return None;
        }
        self.flags = flags;
        self.pending_ack = false;
        Some(flags | MODE_ACK)
    }

    /// Propose a new MODE to the peer; returns the byte to send (no ACK set).
    pub fn propose(&mut self, flags: u8) -> u8 {
        self.flags = flags;
        self.pending_ack = true;
        flags
    }
}

/// Build the `SB LINEMODE MODE <flags>` payload.
#[must_use]
pub fn encode_mode(flags: u8) -> [u8; 2] {
    [MODE, flags]
}

/// Build the `SB LINEMODE FORWARDMASK <32 bytes>` payload.
#[must_use]
pub fn encode_forwardmask(mask: &[u8; 32]) -> Vec<u8> {
    let mut out = Vec::with_capacity(33);
    out.push(FORWARDMASK);
    out.extend_from_slice(mask);
    out
}

/// Build the `SB LINEMODE SLC <triples>` payload for a sequence of functions.
#[must_use]
pub fn encode_slc(entries: &[(SlcFunction, SlcEntry)]) -> Vec<u8> {
    let mut out = Vec::with_capacity(1 + entries.len() * 3);
    out.push(SLC);
    for (func, entry) in entries {
        out.push(*func as u8);
        out.push(entry.flags.to_byte());
        out.push(entry.value);
    }
    out
}

/// Parse an `SLC <triples>` body (the leading `SLC` token already stripped)
/// into `(func, entry)` pairs, applying [`crate::slc::negotiate_slc_entry`]
/// against `table` and returning the replies that must be echoed back.
pub fn negotiate_slc_body(table: &mut SlcTable, body: &[u8]) -> Vec<u8> {
    let mut replies = Vec::new();
    for triple in body.chunks_exact(3) {
        let Some(func) = SlcFunction::from_code(triple[0]) else {
            continue;
        };
        let peer_entry = SlcEntry {
            flags: SlcFlags::from_byte(triple[1]),
            value: triple[2],
        };
        let local_entry = table.get(func);
        let (new_local, reply) = crate::slc::negotiate_slc_entry(local_entry, peer_entry);
        table.set(func, new_local);
        if let Some(reply) = reply {
            replies.push(func as u8);
            replies.push(reply.flags.to_byte());
            replies.push(reply.value);
        }
    }
    if replies.is_empty() {
        replies
    } else {
        let mut out = Vec::with_capacity(replies.len() + 1);
        out.push(SLC);
        out.extend_from_slice(&replies);
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::telnet::linemode_token::{MODE_EDIT, MODE_TRAPSIG};

    #[test]
    fn mode_byte_without_ack_triggers_ack_reply() {
        let mut state = ModeState::default();
        let reply = state.on_mode_byte(MODE_EDIT | MODE_TRAPSIG);
        assert_eq!(reply, Some(MODE_EDIT | MODE_TRAPSIG | MODE_ACK));
    }

    #[test]
    fn repeated_mode_without_ack_is_a_no_op() {
        let mut state = ModeState::default();
        state.on_mode_byte(MODE_EDIT);
        let reply = state.on_mode_byte(MODE_EDIT);
        assert_eq!(reply, None);
    }

    #[test]
    fn proposal_is_cleared_once_peer_acks() {
        let mut state = ModeState::default();
        let proposed = state.propose(MODE_EDIT);
        assert!(state.pending_ack);
        state.on_mode_byte(proposed | MODE_ACK);
        assert!(!state.pending_ack);
    }

    #[test]
    fn slc_negotiation_produces_reply_for_lower_peer_level() {
        let mut table = SlcTable::bsd_defaults();
        let body = [SlcFunction::Ip as u8, crate::telnet::linemode_token::SLC_VARIABLE, 0x63];
        let reply = negotiate_slc_body(&mut table, &body);
        assert_eq!(reply[0], SLC);
        assert_eq!(reply[1], SlcFunction::Ip as u8);
    }
}
