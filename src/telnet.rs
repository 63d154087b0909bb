//! Wire-level constants: IAC command bytes, option bytes, and the token
//! values used inside individual subnegotiation payloads.
//!
//! Values are transcribed from RFC 854 (base protocol), RFC 855
//! (subnegotiation framing), and the per-option RFCs named on each
//! submodule.

/// The telnet command bytes that follow `IAC` (RFC 854 §4).
pub mod op_command {
    /// Interpret As Command.
    pub const IAC: u8 = 255;
    /// End of subnegotiation parameters.
    pub const SE: u8 = 240;
    /// No operation.
    pub const NOP: u8 = 241;
    /// Data Mark (Synch event placeholder; the Urgent/Synch mechanism itself is out of scope).
    pub const DM: u8 = 242;
    /// Break.
    pub const BRK: u8 = 243;
    /// Interrupt Process.
    pub const IP: u8 = 244;
    /// Abort Output.
    pub const AO: u8 = 245;
    /// Are You There.
    pub const AYT: u8 = 246;
    /// Erase Character.
    pub const EC: u8 = 247;
    /// Erase Line.
    pub const EL: u8 = 248;
    /// Go Ahead.
    pub const GA: u8 = 249;
    /// Subnegotiation Begin.
    pub const SB: u8 = 250;
    /// Indicates the sender wants to enable an option.
    pub const WILL: u8 = 251;
    /// Indicates the sender refuses to enable, or wants to disable, an option.
    pub const WONT: u8 = 252;
    /// Indicates the sender wants the receiver to enable an option.
    pub const DO: u8 = 253;
    /// Indicates the sender wants the receiver to disable an option.
    pub const DONT: u8 = 254;
    /// End of Record (RFC 885). Distinct from IAC SE; used bare as `IAC EOR`.
    pub const EOR: u8 = 239;

    /// The single-byte IAC commands that need no following option/argument byte.
    pub const SIMPLE_COMMANDS: [u8; 9] = [NOP, DM, BRK, IP, AO, AYT, EC, EL, GA];
}

/// The telnet option bytes this engine knows about (RFC 855 / IANA telnet options registry).
pub mod op_option {
    pub const BINARY: u8 = 0;
    pub const ECHO: u8 = 1;
    pub const SUPPRESS_GO_AHEAD: u8 = 3;
    pub const STATUS: u8 = 5;
    pub const TIMING_MARK: u8 = 6;
    pub const SEND_LOCATION: u8 = 23;
    pub const TERMINAL_TYPE: u8 = 24;
    pub const END_OF_RECORD: u8 = 25;
    pub const NAWS: u8 = 31;
    pub const TERMINAL_SPEED: u8 = 32;
    pub const TOGGLE_FLOW_CONTROL: u8 = 33;
    pub const LINEMODE: u8 = 34;
    pub const X_DISPLAY_LOCATION: u8 = 35;
    pub const NEW_ENVIRON: u8 = 39;
    pub const CHARSET: u8 = 42;
    pub const LOGOUT: u8 = 18;

    /// Out-of-scope MUD overlay options: still routable through the generic
    /// subnegotiation dispatcher, but this engine ships no handler for them.
    pub const MCCP2: u8 = 86;
    pub const MCCP3: u8 = 87;
}

/// Tokens used inside `IAC SB TERMINAL_TYPE ... IAC SE` (RFC 1091).
pub mod ttype_token {
    pub const IS: u8 = 0;
    pub const SEND: u8 = 1;
}

/// Tokens used inside `IAC SB NEW_ENVIRON ... IAC SE` (RFC 1572).
pub mod environ_token {
    pub const IS: u8 = 0;
    pub const SEND: u8 = 1;
    pub const INFO: u8 = 2;
    pub const VAR: u8 = 0;
    pub const VALUE: u8 = 1;
    pub const ESC: u8 = 2;
    pub const USERVAR: u8 = 3;
}

/// Tokens used inside `IAC SB CHARSET ... IAC SE` (RFC 2066).
pub mod charset_token {
    pub const REQUEST: u8 = 1;
    pub const ACCEPTED: u8 = 2;
    pub const REJECTED: u8 = 3;
    pub const TTABLE_IS: u8 = 4;
    pub const TTABLE_REJECTED: u8 = 5;
    pub const TTABLE_ACK: u8 = 6;
    pub const TTABLE_NAK: u8 = 7;
}

/// Sub-commands used inside `IAC SB LINEMODE ... IAC SE` (RFC 1184).
pub mod linemode_token {
    pub const MODE: u8 = 1;
    pub const FORWARDMASK: u8 = 2;
    pub const SLC: u8 = 3;

    /// `MODE` byte flags (RFC 1184 §3.3.1).
    pub const MODE_EDIT: u8 = 0x01;
    pub const MODE_TRAPSIG: u8 = 0x02;
    pub const MODE_SOFT_TAB: u8 = 0x08;
    pub const MODE_LIT_ECHO: u8 = 0x10;
    /// High bit: the acknowledgement flag a MODE reply sets to confirm it took effect.
    pub const MODE_ACK: u8 = 0x80;

    /// SLC triple flag levels (low 2 bits) and modifiers (upper bits).
    pub const SLC_NOSUPPORT: u8 = 0;
    pub const SLC_CANTCHANGE: u8 = 1;
    pub const SLC_VARIABLE: u8 = 2;
    pub const SLC_DEFAULT: u8 = 3;
    pub const SLC_LEVEL_MASK: u8 = 3;
    pub const SLC_FLUSHIN: u8 = 32;
    pub const SLC_FLUSHOUT: u8 = 64;
    pub const SLC_ACK: u8 = 128;
}

/// Values sent in `IAC SB TOGGLE_FLOW_CONTROL ... IAC SE` (RFC 1372).
pub mod lflow_token {
    pub const OFF: u8 = 0;
    pub const ON: u8 = 1;
    pub const RESTART_ANY: u8 = 2;
    pub const RESTART_XON: u8 = 3;
}
