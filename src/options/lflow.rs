//! TOGGLE-FLOW-CONTROL (RFC 1372): LFLOW on/off and restart policy.

use crate::telnet::lflow_token::{OFF, ON, RESTART_ANY, RESTART_XON};

/// The LFLOW session state (§3).
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct LflowState {
    pub enabled: bool,
    pub restart_on_any: bool,
}

/// One decoded LFLOW SB byte.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum LflowCommand {
    Off,
    On,
    RestartAny,
    RestartXon,
}

#[must_use]
pub fn decode(byte: u8) -> Option<LflowCommand> {
    match byte {
        OFF => Some(LflowCommand::Off),
        ON => Some(LflowCommand::On),
        RESTART_ANY => Some(LflowCommand::RestartAny),
        RESTART_XON => Some(LflowCommand::RestartXon),
        _ => None,
    }
}

#[must_use]
pub fn encode(command: LflowCommand) -> u8 {
    match command {
        LflowCommand::Off => OFF,
        LflowCommand::On => ON,
        LflowCommand::RestartAny => RESTART_ANY,
        LflowCommand::RestartXon => RESTART_XON,
    }
}

impl LflowState {
    pub fn apply(&mut self, command: LflowCommand) {
        match command {
            LflowCommand::Off => self.enabled = false,
            LflowCommand::On => self.enabled = true,
            LflowCommand::RestartAny => self.restart_on_any = true,
            LflowCommand::RestartXon => self.restart_on_any = false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decode_encode_roundtrip_all_commands() {
        for command in [
            LflowCommand::Off,
            LflowCommand::On,
            LflowCommand::RestartAny,
            LflowCommand::RestartXon,
        ] {
            assert_eq!(decode(encode(command)), Some(command));
        }
    }

    #[test]
    fn unknown_byte_decodes_to_none() {
        assert_eq!(decode(99), None);
    }

    #[test]
    fn apply_updates_state() {
        let mut state = LflowState::default();
        state.apply(LflowCommand::On);
        assert!(state.enabled);
        state.apply(LflowCommand::RestartAny);
        assert!(state.restart_on_any);
        state.apply(LflowCommand::Off);
        assert!(!state.enabled);
    }
}
