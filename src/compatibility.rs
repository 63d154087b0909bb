//! Per-option, per-side negotiation state (§3, §4.C of the design).
//!
//! This is a generalisation of the teacher crate's single-byte `Entry`
//! bitmask: instead of one enabled/disabled bit per side we track the
//! four-valued {DISABLED, ENABLED, PENDING-ON, PENDING-OFF} state the
//! design calls for, while keeping the same `Table`/`Entry`/`option()`
//! indexing shape. This is deliberately *not* the RFC 1143 Q-method
//! (no queued-opposite state) — see the crate's non-goals.

use alloc::vec::Vec;
use core::fmt::{Debug, Formatter};

/// Negotiation state of a single option on a single side.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum OptionState {
    /// The option is off and no negotiation is in flight.
    Disabled,
    /// The option is on.
    Enabled,
    /// We asked to turn the option on and are waiting for the peer's reply.
    PendingOn,
    /// We asked to turn the option off and are waiting for the peer's reply.
    PendingOff,
}

impl OptionState {
    #[must_use]
    pub fn is_enabled(self) -> bool {
        matches!(self, OptionState::Enabled)
    }

    #[must_use]
    pub fn is_pending(self) -> bool {
        matches!(self, OptionState::PendingOn | OptionState::PendingOff)
    }
}

impl Default for OptionState {
    fn default() -> Self {
        OptionState::Disabled
    }
}

/// Support + negotiation state for one option, tracked independently for
/// each side of the connection.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct Entry {
    local_support: bool,
    remote_support: bool,
    local: OptionState,
    remote: OptionState,
}

impl Entry {
    #[must_use]
    pub fn new(local_support: bool, remote_support: bool) -> Self {
        Self {
            local_support,
            remote_support,
            local: OptionState::Disabled,
            remote: OptionState::Disabled,
        }
    }

    #[must_use]
    pub fn local_support(&self) -> bool {
        self.local_support
    }

    pub fn set_local_support(&mut self, value: bool) {
        self.local_support = value;
    }

    #[must_use]
    pub fn remote_support(&self) -> bool {
        self.remote_support
    }

    pub fn set_remote_support(&mut self, value: bool) {
        self.remote_support = value;
    }

    #[must_use]
    pub fn local(&self) -> OptionState {
        self.local
    }

    #[must_use]
    pub fn remote(&self) -> OptionState {
        self.remote
    }

    #[must_use]
    pub fn local_enabled(&self) -> bool {
        self.local.is_enabled()
    }

    #[must_use]
    pub fn remote_enabled(&self) -> bool {
        self.remote.is_enabled()
    }

    pub(crate) fn set_local(&mut self, state: OptionState) {
        self.local = state;
    }

    pub(crate) fn set_remote(&mut self, state: OptionState) {
        self.remote = state;
    }

    pub fn clear(&mut self) {
        self.local = OptionState::Disabled;
        self.remote = OptionState::Disabled;
    }
}

const TABLE_SIZE: usize = 1 + u8::MAX as usize;

/// A table of options and their current support/negotiation state, indexed
/// by the raw option byte.
#[derive(Clone)]
pub struct Table {
    options: [Entry; TABLE_SIZE],
}

impl Debug for Table {
    fn fmt(&self, f: &mut Formatter<'_>) -> core::fmt::Result {
        let enabled: Vec<(u8, bool, bool)> = self
            .options
            .iter()
            .enumerate()
            .filter(|(_, e)| e.local_enabled() || e.remote_enabled())
            .map(|(opt, e)| (opt as u8, e.local_enabled(), e.remote_enabled()))
            .collect();
        f.debug_struct("Table").field("enabled", &enabled).finish()
    }
}

impl Default for Table {
    fn default() -> Self {
        Self {
            options: [Entry::default(); TABLE_SIZE],
        }
    }
}

impl Table {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a table from a list of `(option, local_support, remote_support)` triples.
    #[must_use]
    pub fn from_support(values: &[(u8, bool, bool)]) -> Self {
        let mut table = Self::default();
        for &(opt, local, remote) in values {
            table.options[opt as usize] = Entry::new(local, remote);
        }
        table
    }

    /// Enable local support for an option (we are capable of turning it on if asked).
    pub fn support_local(&mut self, option: u8) {
        self.option_mut(option).set_local_support(true);
    }

    /// Enable remote support for an option (we may ask the peer to turn it on).
    pub fn support_remote(&mut self, option: u8) {
        self.option_mut(option).set_remote_support(true);
    }

    /// Enable both local and remote support for an option.
    pub fn support(&mut self, option: u8) {
        let entry = self.option_mut(option);
        entry.set_local_support(true);
        entry.set_remote_support(true);
    }

    #[must_use]
    pub fn option(&self, option: u8) -> &Entry {
        &self.options[option as usize]
    }

    pub fn option_mut(&mut self, option: u8) -> &mut Entry {
        &mut self.options[option as usize]
    }

    /// Reset all negotiated states to `Disabled`, keeping support flags.
    pub fn reset_states(&mut self) {
        for opt in &mut self.options {
            opt.clear();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::telnet::op_option::NAWS;

    #[test]
    fn entry_default_is_disabled_and_unsupported() {
        let table = Table::default();
        let entry = table.option(NAWS);
        assert!(!entry.local_support());
        assert!(!entry.remote_support());
        assert_eq!(entry.local(), OptionState::Disabled);
        assert_eq!(entry.remote(), OptionState::Disabled);
    }

    #[test]
    fn reset_states_clears_negotiation_but_keeps_support() {
        let mut table = Table::default();
        table.support(NAWS);
        table.option_mut(NAWS).set_remote(OptionState::Enabled);
        table.reset_states();
        let entry = table.option(NAWS);
        assert!(entry.local_support());
        assert!(entry.remote_support());
        assert_eq!(entry.remote(), OptionState::Disabled);
    }

    #[test]
    fn pending_state_predicates() {
        assert!(OptionState::PendingOn.is_pending());
        assert!(OptionState::PendingOff.is_pending());
        assert!(!OptionState::Enabled.is_pending());
        assert!(!OptionState::Disabled.is_pending());
        assert!(OptionState::Enabled.is_enabled());
        assert!(!OptionState::PendingOn.is_enabled());
    }
}
