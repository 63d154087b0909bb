//! Special Linemode Characters (RFC 1184 §3.3.6): the table of per-function
//! byte bindings negotiated by `IAC SB LINEMODE SLC ... IAC SE`, and the
//! editing functions the input editor (§4.F) recognises in KLUDGE/LOCAL mode.

use crate::telnet::linemode_token::{
    SLC_ACK, SLC_CANTCHANGE, SLC_DEFAULT, SLC_FLUSHIN, SLC_FLUSHOUT, SLC_LEVEL_MASK, SLC_NOSUPPORT,
    SLC_VARIABLE,
};

/// The editing/signal functions this engine recognises (a subset of RFC 1184's
/// full function table — the ones named in §4.F of the design).
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Ord, PartialOrd)]
#[repr(u8)]
pub enum SlcFunction {
    /// Erase the previous character.
    Ec = 1,
    /// Erase the current line.
    El = 2,
    /// Interrupt the running process.
    Ip = 3,
    /// Discard pending output.
    Ao = 4,
    /// Are-you-there probe.
    Ayt = 5,
    /// Break/attention signal.
    Brk = 6,
    /// End-of-file marker.
    Eof = 7,
    /// Suspend the running process.
    Susp = 8,
    /// Erase the previous word.
    Ew = 9,
    /// Repaint the current line.
    Rp = 10,
    /// Treat the next character literally.
    Lnext = 11,
    /// Resume output (flow control).
    Xon = 12,
    /// Pause output (flow control).
    Xoff = 13,
}

impl SlcFunction {
    const ALL: [SlcFunction; 13] = [
        SlcFunction::Ec,
        SlcFunction::El,
        SlcFunction::Ip,
        SlcFunction::Ao,
        SlcFunction::Ayt,
        SlcFunction::Brk,
        SlcFunction::Eof,
        SlcFunction::Susp,
        SlcFunction::Ew,
        SlcFunction::Rp,
        SlcFunction::Lnext,
        SlcFunction::Xon,
        SlcFunction::Xoff,
    ];

    #[must_use]
    pub fn from_code(code: u8) -> Option<Self> {
        Self::ALL.into_iter().find(|f| *f as u8 == code)
    }
}

/// Level + modifier flags for one SLC table entry (RFC 1184 §3.3.6).
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct SlcFlags(u8);

impl SlcFlags {
    #[must_use]
    pub fn new(level: u8, flush_in: bool, flush_out: bool, ack: bool) -> Self {
        let mut bits = level & SLC_LEVEL_MASK;
        if flush_in {
            bits |= SLC_FLUSHIN;
        }
        if flush_out {
            bits |= SLC_FLUSHOUT;
        }
        if ack {
            bits |= SLC_ACK;
        }
        Self(bits)
    }

    #[must_use]
    pub fn from_byte(byte: u8) -> Self {
        Self(byte)
    }

    #[must_use]
    pub fn to_byte(self) -> u8 {
        self.0
    }

    #[must_use]
    pub fn level(self) -> u8 {
        self.0 & SLC_LEVEL_MASK
    }

    #[must_use]
    pub fn is_nosupport(self) -> bool {
        self.level() == SLC_NOSUPPORT
    }

    #[must_use]
    pub fn is_cantchange(self) -> bool {
        self.level() == SLC_CANTCHANGE
    }

    #[must_use]
    pub fn flush_in(self) -> bool {
        self.0 & SLC_FLUSHIN != 0
    }

    #[must_use]
    pub fn flush_out(self) -> bool {
        self.0 & SLC_FLUSHOUT != 0
    }

    #[must_use]
    pub fn ack(self) -> bool {
        self.0 & SLC_ACK != 0
    }

    #[must_use]
    pub fn with_ack(self) -> Self {
        Self(self.0 | SLC_ACK)
    }
}

/// A single `(func, flags, value)` SLC triple.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct SlcEntry {
    pub flags: SlcFlags,
    pub value: u8,
}

impl SlcEntry {
    #[must_use]
    pub fn new(level: u8, value: u8) -> Self {
        Self {
            flags: SlcFlags::new(level, false, false, false),
            value,
        }
    }

    #[must_use]
    pub fn nosupport() -> Self {
        Self {
            flags: SlcFlags::new(SLC_NOSUPPORT, false, false, false),
            value: 0,
        }
    }
}

/// The 13-function SLC table, seeded from BSD `ttydefaults.h` values.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct SlcTable {
    entries: [SlcEntry; 13],
}

impl SlcTable {
    /// BSD's traditional SLC defaults: the termios control characters that
    /// have a conventional binding get `DEFAULT`-level entries; the two
    /// functions BSD termios has no key for (AYT, BRK) are `NOSUPPORT`.
    #[must_use]
    pub fn bsd_defaults() -> Self {
        use SlcFunction::*;
        let mut entries = [SlcEntry::nosupport(); 13];
        let set = |entries: &mut [SlcEntry; 13], f: SlcFunction, value: u8| {
            entries[f as usize - 1] = SlcEntry::new(SLC_DEFAULT, value);
        };
        set(&mut entries, Ec, 0x7f); // VERASE (DEL)
        set(&mut entries, El, 0x15); // VKILL (^U)
        set(&mut entries, Ip, 0x03); // VINTR (^C)
        set(&mut entries, Ao, 0x0f); // VDISCARD (^O)
        set(&mut entries, Eof, 0x04); // VEOF (^D)
        set(&mut entries, Susp, 0x1a); // VSUSP (^Z)
        set(&mut entries, Ew, 0x17); // VWERASE (^W)
        set(&mut entries, Rp, 0x12); // VREPRINT (^R)
        set(&mut entries, Lnext, 0x16); // VLNEXT (^V)
        set(&mut entries, Xon, 0x11); // VSTART (^Q)
        set(&mut entries, Xoff, 0x13); // VSTOP (^S)
        // Ayt, Brk: BSD termios has no conventional binding; left NOSUPPORT.
        Self { entries }
    }

    #[must_use]
    pub fn get(&self, func: SlcFunction) -> SlcEntry {
        self.entries[func as usize - 1]
    }

    pub fn set(&mut self, func: SlcFunction, entry: SlcEntry) {
        self.entries[func as usize - 1] = entry;
    }

    /// Find an SLC function currently bound to `byte`, for the input editor.
    #[must_use]
    pub fn function_for_byte(&self, byte: u8) -> Option<SlcFunction> {
        SlcFunction::ALL.into_iter().find(|f| {
            let entry = self.get(*f);
            !entry.flags.is_nosupport() && entry.value == byte
        })
    }

    pub fn iter(&self) -> impl Iterator<Item = (SlcFunction, SlcEntry)> + '_ {
        SlcFunction::ALL.into_iter().map(|f| (f, self.get(f)))
    }
}

impl Default for SlcTable {
    fn default() -> Self {
        Self::bsd_defaults()
    }
}

/// Resolve the peer's offered triple against ours, per §4.E's negotiation rule.
///
/// Returns `(new_local_entry, reply)` where `reply` is `Some(entry)` when we
/// must echo a triple back (either our own value with ACK set, or the peer's
/// value acked to confirm acceptance).
#[must_use]
pub fn negotiate_slc_entry(local: SlcEntry, peer: SlcEntry) -> (SlcEntry, Option<SlcEntry>) {
    if peer.flags.ack() {
        return (peer, None);
    }
    if peer.flags.is_nosupport() {
        return (SlcEntry::nosupport(), None);
    }
    if local.flags.is_cantchange() {
        return (local, Some(SlcEntry {
            flags: local.flags.with_ack(),
            value: local.value,
        }));
    }
    match local.flags.level().cmp(&peer.flags.level()) {
        core::cmp::Ordering::Greater => (
            local,
            Some(SlcEntry {
                flags: local.flags.with_ack(),
                value: local.value,
            }),
        ),
        core::cmp::Ordering::Less => (peer, Some(SlcEntry {
            flags: peer.flags.with_ack(),
            value: peer.value,
        })),
        core::cmp::Ordering::Equal => {
            let default = SlcEntry::new(SLC_DEFAULT, local.value);
            (
                default,
                Some(SlcEntry {
                    flags: default.flags.with_ack(),
                    value: default.value,
                }),
            )
        }
    }
}
