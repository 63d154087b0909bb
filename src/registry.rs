//! Option registry (§4.B): static per-option metadata the negotiation core
//! and subnegotiation dispatcher consult, keyed by the raw option byte.

use crate::telnet::op_option::{
    BINARY, CHARSET, ECHO, END_OF_RECORD, LINEMODE, LOGOUT, NAWS, NEW_ENVIRON, SEND_LOCATION,
    STATUS, SUPPRESS_GO_AHEAD, TERMINAL_SPEED, TERMINAL_TYPE, TIMING_MARK, TOGGLE_FLOW_CONTROL,
    X_DISPLAY_LOCATION,
};

/// Which side is expected to be the one offering (`WILL`) an option.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Initiator {
    /// Either side may offer it.
    Either,
    /// Only a client process is expected to `WILL` this option; a peer
    /// offering it the other way round is refused, not an error (§4.C).
    ClientOnly,
    /// Only a server process is expected to request it with `DO`.
    ServerOnly,
}

/// The per-option subnegotiation handler this option routes to (§4.D), if any.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum SbHandler {
    None,
    Ttype,
    Charset,
    NewEnviron,
    Naws,
    Linemode,
    Lflow,
    Status,
    Tspeed,
    Xdisploc,
    Sndloc,
}

/// A registry entry for a single option byte.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Descriptor {
    pub name: &'static str,
    pub initiator: Initiator,
    pub sb_handler: SbHandler,
}

const UNKNOWN: Descriptor = Descriptor {
    name: "unknown",
    initiator: Initiator::Either,
    sb_handler: SbHandler::None,
};

/// Look up the descriptor for `option`. Unrecognised options get a generic
/// entry with no handler; the dispatcher's default refusal policy applies.
#[must_use]
pub fn descriptor(option: u8) -> Descriptor {
    match option {
        BINARY => Descriptor {
            name: "BINARY",
            initiator: Initiator::Either,
            sb_handler: SbHandler::None,
        },
        ECHO => Descriptor {
            name: "ECHO",
            initiator: Initiator::Either,
            sb_handler: SbHandler::None,
        },
        SUPPRESS_GO_AHEAD => Descriptor {
            name: "SUPPRESS-GO-AHEAD",
            initiator: Initiator::Either,
            sb_handler: SbHandler::None,
        },
        STATUS => Descriptor {
            name: "STATUS",
            initiator: Initiator::Either,
            sb_handler: SbHandler::Status,
        },
        TIMING_MARK => Descriptor {
            name: "TIMING-MARK",
            initiator: Initiator::Either,
            sb_handler: SbHandler::None,
        },
        SEND_LOCATION => Descriptor {
            name: "SEND-LOCATION",
            initiator: Initiator::ClientOnly,
            sb_handler: SbHandler::Sndloc,
        },
        TERMINAL_TYPE => Descriptor {
            name: "TERMINAL-TYPE",
            initiator: Initiator::ClientOnly,
            sb_handler: SbHandler::Ttype,
        },
        END_OF_RECORD => Descriptor {
            name: "END-OF-RECORD",
            initiator: Initiator::Either,
            sb_handler: SbHandler::None,
        },
        NAWS => Descriptor {
            name: "NAWS",
            initiator: Initiator::ClientOnly,
            sb_handler: SbHandler::Naws,
        },
        TERMINAL_SPEED => Descriptor {
            name: "TERMINAL-SPEED",
            initiator: Initiator::ClientOnly,
            sb_handler: SbHandler::Tspeed,
        },
        TOGGLE_FLOW_CONTROL => Descriptor {
            name: "TOGGLE-FLOW-CONTROL",
            initiator: Initiator::Either,
            sb_handler: SbHandler::Lflow,
        },
        LINEMODE => Descriptor {
            name: "LINEMODE",
            initiator: Initiator::ServerOnly,
            sb_handler: SbHandler::Linemode,
        },
        X_DISPLAY_LOCATION => Descriptor {
            name: "X-DISPLAY-LOCATION",
            initiator: Initiator::ClientOnly,
            sb_handler: SbHandler::Xdisploc,
        },
        NEW_ENVIRON => Descriptor {
            name: "NEW-ENVIRON",
            initiator: Initiator::ClientOnly,
            sb_handler: SbHandler::NewEnviron,
        },
        CHARSET => Descriptor {
            name: "CHARSET",
            initiator: Initiator::Either,
            sb_handler: SbHandler::Charset,
        },
        LOGOUT => Descriptor {
            name: "LOGOUT",
            initiator: Initiator::Either,
            sb_handler: SbHandler::None,
        },
        _ => UNKNOWN,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn naws_is_client_only_with_a_handler() {
        let d = descriptor(NAWS);
        assert_eq!(d.initiator, Initiator::ClientOnly);
        assert_eq!(d.sb_handler, SbHandler::Naws);
    }

    #[test]
    fn linemode_is_server_only() {
        assert_eq!(descriptor(LINEMODE).initiator, Initiator::ServerOnly);
    }

    #[test]
    fn unknown_option_gets_generic_descriptor() {
        let d = descriptor(200);
        assert_eq!(d.name, "unknown");
        assert_eq!(d.sb_handler, SbHandler::None);
    }
}
