//! The typed event vocabulary the engine produces from a raw byte stream,
//! and the small wire-framing structs used to serialise outbound commands.

extern crate alloc;

use alloc::string::String;
use bytes::{BufMut, Bytes, BytesMut};

use crate::slc::SlcFunction;
use crate::telnet::op_command::{IAC, SB, SE};

/// A bare 2-byte IAC sequence, e.g. `IAC NOP`.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Ord, PartialOrd, Hash)]
#[cfg_attr(feature = "arbitrary", derive(arbitrary::Arbitrary))]
pub struct Iac {
    pub command: u8,
}

impl From<Iac> for Bytes {
    fn from(iac: Iac) -> Self {
        Bytes::copy_from_slice(&[IAC, iac.command])
    }
}

/// A 3-byte negotiation sequence, e.g. `IAC WILL ECHO`.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Ord, PartialOrd, Hash)]
#[cfg_attr(feature = "arbitrary", derive(arbitrary::Arbitrary))]
pub struct Negotiation {
    pub command: u8,
    pub option: u8,
}

impl From<Negotiation> for Bytes {
    fn from(negotiation: Negotiation) -> Self {
        Bytes::copy_from_slice(&[IAC, negotiation.command, negotiation.option])
    }
}

/// An arbitrary-length `IAC SB <option> ... IAC SE` sequence. `buffer` is the
/// unescaped payload (IAC doubling is applied/undone at the wire boundary).
#[derive(Clone, Debug, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct Subnegotiation {
    pub option: u8,
    pub buffer: Bytes,
}

impl From<Subnegotiation> for Bytes {
    fn from(sub: Subnegotiation) -> Self {
        let escaped = crate::writer::escape_iac(&sub.buffer);
        let mut buf = BytesMut::with_capacity(escaped.len() + 5);
        buf.put_u8(IAC);
        buf.put_u8(SB);
        buf.put_u8(sub.option);
        buf.put(escaped);
        buf.put_u8(IAC);
        buf.put_u8(SE);
        buf.freeze()
    }
}

#[cfg(feature = "arbitrary")]
impl<'a> arbitrary::Arbitrary<'a> for Subnegotiation {
    fn arbitrary(u: &mut arbitrary::Unstructured<'a>) -> arbitrary::Result<Self> {
        let option = u.arbitrary()?;
        let buffer: alloc::vec::Vec<u8> = u.arbitrary()?;
        Ok(Self {
            option,
            buffer: Bytes::from(buffer),
        })
    }
}

/// The namespace a `NEW_ENVIRON` variable belongs to (RFC 1572 §2).
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum EnvironKind {
    /// A well-known system variable (`VAR`).
    Var,
    /// An application-defined variable (`USERVAR`).
    UserVar,
}

/// A decoded LFLOW signal (RFC 1372), surfaced so a host can pause/resume
/// its own writer without duplicating the engine's SB parsing.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum LflowSignal {
    /// Peer sent LFLOW OFF: stop writing until `ResumeWrite`.
    PauseWrite,
    /// Peer sent LFLOW ON: writing may resume.
    ResumeWrite,
    /// Peer sent LFLOW RESTART-ANY: any byte restarts output, not just XON.
    RestartAny,
    /// Peer sent LFLOW RESTART-XON: only XON restarts output.
    RestartXonOnly,
}

/// The effective editing mode the engine has derived from negotiated options (§4.F).
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum Mode {
    /// Peer negotiated LINEMODE: it edits locally and sends whole lines.
    Remote,
    /// Character-at-a-time with local ECHO+SGA: the engine simulates SLC locally.
    Kludge,
    /// Half-duplex default NVT: neither SGA nor ECHO enabled locally.
    Local,
    /// Character-at-a-time, neither kludge nor remote conditions apply.
    Character,
}

/// One decoded/derived unit of meaning produced by [`crate::engine::Engine::receive`].
#[derive(Clone, Debug, PartialEq)]
pub enum Event {
    /// Plain application data (present when line normalisation is not deframing,
    /// or in BINARY mode).
    DataReceive(Bytes),
    /// A complete normalised line (`CR LF` / `CR NUL` / bare `LF`), trailing
    /// terminator stripped.
    LineReceive(Bytes),
    /// `IAC EOR` — a record boundary, distinct from a line boundary.
    RecordEnd,
    /// A simple one-byte IAC command (`NOP`, `DM`, `BRK`, `IP`, `AO`, `AYT`, `EC`, `EL`, `GA`).
    Command(u8),
    /// An IAC byte we don't recognise as a defined command; never fatal.
    UnknownCommand(u8),
    /// A negotiation state transition that actually happened (redundant
    /// peer acks that change nothing produce no event at all — §4.C).
    Negotiation(Negotiation),
    /// A subnegotiation for an option with no built-in handler (or one
    /// explicitly left generic), handed to the caller unmodified.
    Subnegotiation(Subnegotiation),
    /// A subnegotiation that was truncated or malformed; logged at WARN and
    /// otherwise discarded, but surfaced here too for testability.
    SbMalformed { option: u8, partial: Bytes },
    /// An SLC editing function fired while the engine is doing local editing
    /// (KLUDGE/LOCAL mode) or was reported via LINEMODE SB (REMOTE mode).
    Function(SlcFunction),
    /// NAWS window dimensions, in columns then rows. Zero means "unspecified".
    Naws { cols: u16, rows: u16 },
    /// A TTYPE `IS` reply received during the cycle (§4.E); the full chain is
    /// also queryable from the engine afterwards.
    Ttype(String),
    /// A NEW_ENVIRON variable the peer sent us.
    Environ {
        name: String,
        value: String,
        kind: EnvironKind,
    },
    /// The charset the peer accepted from our REQUEST offer.
    Charset(String),
    /// TSPEED `IS` payload (e.g. `"38400,38400"`).
    Tspeed(String),
    /// XDISPLOC `IS` payload.
    Xdisploc(String),
    /// SNDLOC `IS` payload.
    Sndloc(String),
    /// LINEMODE `MODE` flags, once acknowledged both ways (§4.E).
    LinemodeMode(u8),
    /// Peer asked us to log out (RFC 727); the caller decides how to close.
    Logout,
    /// An LFLOW pause/resume/restart signal (§4.E).
    Lflow(LflowSignal),
    /// Bytes that must be written to the transport. The only outbound event
    /// variant; the engine never writes to a transport itself.
    DataSend(Bytes),
}

impl From<Iac> for Event {
    fn from(iac: Iac) -> Self {
        Event::Command(iac.command)
    }
}

impl From<Negotiation> for Event {
    fn from(neg: Negotiation) -> Self {
        Event::Negotiation(neg)
    }
}

impl From<Subnegotiation> for Event {
    fn from(sub: Subnegotiation) -> Self {
        Event::Subnegotiation(sub)
    }
}
