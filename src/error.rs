//! Typed error surface (§4.I, §7 case 4-5). Parse anomalies (§7 cases 1-3)
//! are not errors at all — they go through `log` call sites in the modules
//! that detect them and are never raised here.

/// Caller misuse of the outbound negotiation API (§7 case 5). Returned from
/// `Engine::request_*`; nothing is written to the wire when this fires.
#[derive(Clone, Copy, Debug, Eq, PartialEq, thiserror::Error)]
pub enum CallerError {
    /// A request for this option+side is already awaiting the peer's reply.
    #[error("a negotiation request for option {option} is already pending")]
    PendingRequestInFlight {
        /// The option byte the caller tried to negotiate.
        option: u8,
    },
    /// The option is already in the state the caller asked for.
    #[error("option {option} is already in the requested state")]
    OptionAlreadyInDesiredState {
        /// The option byte the caller tried to negotiate.
        option: u8,
    },
    /// This side has no local support registered for the option.
    #[error("option {option} has no local support registered")]
    UnsupportedLocally {
        /// The option byte the caller tried to negotiate.
        option: u8,
    },
    /// This side has no remote support registered for the option.
    #[error("option {option} has no remote support registered")]
    UnsupportedRemotely {
        /// The option byte the caller tried to negotiate.
        option: u8,
    },
}

/// Transport-level failure (§7 case 4), fed back into the engine by the
/// caller's own transport driver — the engine never opens a socket itself.
#[derive(Clone, Copy, Debug, Eq, PartialEq, thiserror::Error)]
pub enum EngineError {
    /// The underlying transport closed or failed; all pending waiters are
    /// resolved with this outcome and no further negotiation is possible.
    #[error("the connection was closed")]
    ConnectionClosed,
}
