//! The session engine (§3–§4): owns all per-connection state and drives the
//! byte classifier, negotiation core, subnegotiation dispatcher, input
//! editor, and line normaliser over a received chunk, producing a batch of
//! [`Event`]s and accumulating outbound bytes for [`Engine::drain`].

use alloc::boxed::Box;
use alloc::string::{String, ToString};
use alloc::vec::Vec;

use bytes::{Bytes, BytesMut};
use log::{debug, info, warn};

use crate::compatibility::{OptionState, Table};
use crate::error::{CallerError, EngineError};
use crate::events::{EnvironKind, Event, LflowSignal, Mode};
use crate::line::{LineEvent, Normalizer};
use crate::options::linemode::ModeState;
use crate::options::new_environ::EnvironVar;
use crate::options::{
    charset, lflow::LflowCommand, lflow::LflowState, linemode, naws, new_environ, status, strings,
    ttype::TtypeCycle,
};
use crate::registry::{self, SbHandler};
use crate::slc::{SlcFunction, SlcTable};
use crate::telnet::linemode_token::{FORWARDMASK, MODE, SLC};
use crate::telnet::op_command::{DO, DONT, EOR, IAC, SB, SE, SIMPLE_COMMANDS, WILL, WONT};
use crate::telnet::op_option::{
    BINARY, CHARSET, ECHO, LINEMODE, LOGOUT, NAWS as NAWS_OPT, NEW_ENVIRON, STATUS,
    SUPPRESS_GO_AHEAD, TERMINAL_TYPE, TIMING_MARK,
};
use crate::writer;

/// Caller-tunable knobs (§6).
#[derive(Clone, Debug)]
pub struct EngineConfig {
    pub force_binary: bool,
    pub term: Option<String>,
    pub speed: Option<String>,
    pub send_environ: Vec<String>,
    pub never_send_ga: bool,
    pub sb_buffer_cap: usize,
    pub ttype_cycle_cap: usize,
    pub supported_charsets: Vec<String>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            force_binary: false,
            term: None,
            speed: None,
            send_environ: Vec::new(),
            never_send_ga: false,
            sb_buffer_cap: 65_535,
            ttype_cycle_cap: 20,
            supported_charsets: Vec::new(),
        }
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
enum Phase {
    Stream,
    SawIac,
    SawNeg(u8),
    SawSb,
    InSb,
    InSbIac,
}

/// LINEMODE session state (§3).
#[derive(Clone, Debug, Default)]
pub struct LinemodeState {
    pub mode: ModeState,
    pub slc_table: SlcTable,
    pub forward_mask: [u8; 32],
}

/// A registered `wait_for` predicate (§5).
struct Waiter {
    id: u64,
    option: u8,
    remote_side: bool,
    target: OptionState,
}

/// The outcome delivered to a fired or cancelled waiter.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum WaitOutcome {
    Settled,
    Closed,
}

/// The protocol engine. Pure: it never performs I/O, only classifies inbound
/// bytes and accumulates outbound ones for the caller to drain.
pub struct Engine {
    config: EngineConfig,
    options: Table,
    phase: Phase,
    sb_option: u8,
    sb_buffer: BytesMut,
    out: BytesMut,
    normalizer: Normalizer,
    line_buffer: BytesMut,
    mode: Mode,
    ttype: TtypeCycle,
    environ: Vec<EnvironVar>,
    charset: Option<String>,
    linemode: LinemodeState,
    naws: (u16, u16),
    lflow: LflowState,
    tspeed: Option<String>,
    xdisploc: Option<String>,
    sndloc: Option<String>,
    waiters: Vec<Waiter>,
    next_waiter_id: u64,
    closed: bool,
    closed_error: Option<EngineError>,
    status_mismatch_hook: Option<Box<dyn FnMut(&[(u8, u8)])>>,
}

impl Engine {
    #[must_use]
    pub fn new(config: EngineConfig) -> Self {
        let ttype_cap = config.ttype_cycle_cap;
        Self {
            config,
            options: Table::default(),
            phase: Phase::Stream,
            sb_option: 0,
            sb_buffer: BytesMut::with_capacity(64),
            out: BytesMut::with_capacity(128),
            normalizer: Normalizer::new(),
            line_buffer: BytesMut::with_capacity(128),
            mode: Mode::Local,
            ttype: TtypeCycle::new(ttype_cap),
            environ: Vec::new(),
            charset: None,
            linemode: LinemodeState::default(),
            naws: (0, 0),
            lflow: LflowState::default(),
            tspeed: None,
            xdisploc: None,
            sndloc: None,
            waiters: Vec::new(),
            next_waiter_id: 0,
            closed: false,
            closed_error: None,
            status_mismatch_hook: None,
        }
    }

    #[must_use]
    pub fn options(&self) -> &Table {
        &self.options
    }

    pub fn support(&mut self, option: u8, local: bool, remote: bool) {
        if local {
            self.options.support_local(option);
        }
        if remote {
            self.options.support_remote(option);
        }
    }

    #[must_use]
    pub fn mode(&self) -> Mode {
        self.mode
    }

    #[must_use]
    pub fn naws(&self) -> (u16, u16) {
        self.naws
    }

    #[must_use]
    pub fn ttype_chain(&self) -> &[String] {
        self.ttype.chain()
    }

    #[must_use]
    pub fn environ(&self) -> &[EnvironVar] {
        &self.environ
    }

    #[must_use]
    pub fn charset(&self) -> Option<&str> {
        self.charset.as_deref()
    }

    #[must_use]
    pub fn tspeed(&self) -> Option<&str> {
        self.tspeed.as_deref()
    }

    #[must_use]
    pub fn xdisploc(&self) -> Option<&str> {
        self.xdisploc.as_deref()
    }

    #[must_use]
    pub fn sndloc(&self) -> Option<&str> {
        self.sndloc.as_deref()
    }

    #[must_use]
    pub fn linemode(&self) -> &LinemodeState {
        &self.linemode
    }

    /// The negotiation state of `option` as last reported by the peer.
    #[must_use]
    pub fn remote_option(&self, option: u8) -> OptionState {
        self.options.option(option).remote()
    }

    /// The negotiation state of `option` on our own side.
    #[must_use]
    pub fn local_option(&self, option: u8) -> OptionState {
        self.options.option(option).local()
    }

    /// True if ECHO is enabled on our side (§4.H: we are echoing for the peer).
    #[must_use]
    pub fn will_echo(&self) -> bool {
        self.options.option(ECHO).local_enabled()
    }

    /// Queue `bytes` for the transport, but only if ECHO is locally enabled.
    pub fn echo(&mut self, bytes: &[u8]) {
        if self.will_echo() {
            self.out.extend_from_slice(&writer::escape_iac(bytes));
        }
    }

    /// The outbound EOL policy derived from BINARY/SGA/LINEMODE session
    /// state (§4.G inverse, §4.H): BINARY on either side passes data through
    /// unchanged; otherwise the derived [`Mode`] (which already folds in
    /// LINEMODE and local SGA/ECHO) picks NVT `CR LF` or legacy `CR NUL`.
    fn eol_policy(&self) -> writer::EolPolicy {
        if self.config.force_binary
            || self.options.option(BINARY).local_enabled()
            || self.options.option(BINARY).remote_enabled()
        {
            return writer::EolPolicy::Binary;
        }
        match self.mode {
            Mode::Kludge if self.options.option(SUPPRESS_GO_AHEAD).local_enabled() => {
                writer::EolPolicy::SuppressGoAhead
            }
            _ => writer::EolPolicy::Nvt,
        }
    }

    /// True if a trailing `IAC GA` should follow prompt-like output: SGA is
    /// not enabled on our side and the caller has not opted out (§4.H).
    fn should_send_ga(&self) -> bool {
        !self.config.never_send_ga && !self.options.option(SUPPRESS_GO_AHEAD).local_enabled()
    }

    /// Queue `bytes` as outbound application/text data: apply the outbound
    /// EOL policy, IAC-double, and follow with `IAC GA` when appropriate
    /// (§4.H). The only path by which text data leaves the engine.
    pub fn write(&mut self, bytes: &[u8]) {
        let framed = writer::write(bytes, self.eol_policy());
        self.out.extend_from_slice(&framed);
        if self.should_send_ga() {
            self.out.extend_from_slice(&writer::send_ga());
        }
    }

    /// Install a callback invoked whenever a STATUS `IS` reply disagrees with
    /// our local view (§4.E, §9). Never triggers automatic re-negotiation;
    /// purely an opt-in observation hook.
    pub fn on_status_mismatch(&mut self, hook: impl FnMut(&[(u8, u8)]) + 'static) {
        self.status_mismatch_hook = Some(Box::new(hook));
    }

    /// Pop all bytes queued for the transport since the last call.
    pub fn drain(&mut self) -> Bytes {
        self.out.split().freeze()
    }

    /// Tear the session down: mark every pending option DISABLED. Registered
    /// waiters are resolved with `Closed` the next time [`Engine::poll_waiters`]
    /// runs (§5).
    pub fn close(&mut self) {
        self.closed = true;
        self.options.reset_states();
    }

    /// Tear the session down because the caller's transport driver observed
    /// a failure (§7 case 4): same effect as [`Engine::close`], but records
    /// `error` so [`Engine::closed_error`] reports it and `receive` starts
    /// returning no further events (EOF).
    pub fn close_with_error(&mut self, error: EngineError) {
        self.closed_error = Some(error);
        self.close();
    }

    /// The error that closed this session, if [`Engine::close_with_error`]
    /// was used rather than a plain [`Engine::close`].
    #[must_use]
    pub fn closed_error(&self) -> Option<EngineError> {
        self.closed_error
    }

    // ---- outbound negotiation requests (§4.C) ----------------------------

    pub fn request_will(&mut self, option: u8) -> Result<(), CallerError> {
        let entry = self.options.option(option);
        if !entry.local_support() {
            return Err(CallerError::UnsupportedLocally { option });
        }
        if entry.local().is_pending() {
            return Err(CallerError::PendingRequestInFlight { option });
        }
        if entry.local_enabled() {
            return Err(CallerError::OptionAlreadyInDesiredState { option });
        }
        self.options.option_mut(option).set_local(OptionState::PendingOn);
        self.out.extend_from_slice(&writer::will(option));
        Ok(())
    }

    pub fn request_wont(&mut self, option: u8) -> Result<(), CallerError> {
        let entry = self.options.option(option);
        if entry.local().is_pending() {
            return Err(CallerError::PendingRequestInFlight { option });
        }
        if !entry.local_enabled() {
            return Err(CallerError::OptionAlreadyInDesiredState { option });
        }
        self.options.option_mut(option).set_local(OptionState::PendingOff);
        self.out.extend_from_slice(&writer::wont(option));
        Ok(())
    }

    pub fn request_do(&mut self, option: u8) -> Result<(), CallerError> {
        let entry = self.options.option(option);
        if !entry.remote_support() {
            return Err(CallerError::UnsupportedRemotely { option });
        }
        if entry.remote().is_pending() {
            return Err(CallerError::PendingRequestInFlight { option });
        }
        if entry.remote_enabled() {
            return Err(CallerError::OptionAlreadyInDesiredState { option });
        }
        self.options.option_mut(option).set_remote(OptionState::PendingOn);
        self.out.extend_from_slice(&writer::do_(option));
        Ok(())
    }

    pub fn request_dont(&mut self, option: u8) -> Result<(), CallerError> {
        let entry = self.options.option(option);
        if entry.remote().is_pending() {
            return Err(CallerError::PendingRequestInFlight { option });
        }
        if !entry.remote_enabled() {
            return Err(CallerError::OptionAlreadyInDesiredState { option });
        }
        self.options.option_mut(option).set_remote(OptionState::PendingOff);
        self.out.extend_from_slice(&writer::dont(option));
        Ok(())
    }

    /// Propose a LINEMODE MODE byte (server side driving the handshake of
    /// scenario 5): queues `SB LINEMODE MODE <flags>` and arms `pending_ack`.
    pub fn propose_linemode_mode(&mut self, flags: u8) {
        let byte = self.linemode.mode.propose(flags);
        self.out
            .extend_from_slice(&writer::send_sb(LINEMODE, &linemode::encode_mode(byte)));
    }

    /// Register interest in an option reaching `target` on `remote_side`
    /// (`false` = local side). Evaluate with [`Engine::poll_waiters`].
    pub fn wait_for(&mut self, option: u8, remote_side: bool, target: OptionState) -> u64 {
        let id = self.next_waiter_id;
        self.next_waiter_id += 1;
        self.waiters.push(Waiter {
            id,
            option,
            remote_side,
            target,
        });
        id
    }

    /// Drain and return the waiters that have reached their target state
    /// since the last poll (§5: evaluated after every state transition).
    pub fn poll_waiters(&mut self) -> Vec<(u64, WaitOutcome)> {
        if self.closed {
            let fired: Vec<_> = self
                .waiters
                .drain(..)
                .map(|w| (w.id, WaitOutcome::Closed))
                .collect();
            return fired;
        }
        let options = &self.options;
        let (fired, remaining): (Vec<_>, Vec<_>) = core::mem::take(&mut self.waiters)
            .into_iter()
            .partition(|w| {
                let entry = options.option(w.option);
                let state = if w.remote_side { entry.remote() } else { entry.local() };
                state == w.target
            });
        self.waiters = remaining;
        fired.into_iter().map(|w| (w.id, WaitOutcome::Settled)).collect()
    }

    // ---- inbound byte processing (§4.A → §4.C/D/F/G) --------------------

    /// Feed one chunk of raw inbound bytes, returning the events it produced.
    /// Once the session is closed, this always returns empty (EOF, §7 case 4).
    pub fn receive(&mut self, chunk: &[u8]) -> Vec<Event> {
        if self.closed {
            return Vec::new();
        }
        let mut events = Vec::new();
        let mut data_run = Vec::new();
        for &byte in chunk {
            match self.phase {
                Phase::Stream => {
                    if byte == IAC {
                        self.phase = Phase::SawIac;
                    } else {
                        data_run.push(byte);
                    }
                }
                Phase::SawIac => {
                    if byte == IAC {
                        // Doubled IAC: a literal 0xFF data byte, not a boundary.
                        data_run.push(IAC);
                        self.phase = Phase::Stream;
                    } else if byte == SB {
                        self.flush_data_run(&mut data_run, &mut events);
                        self.phase = Phase::SawSb;
                    } else if matches!(byte, WILL | WONT | DO | DONT) {
                        self.flush_data_run(&mut data_run, &mut events);
                        self.phase = Phase::SawNeg(byte);
                    } else if SIMPLE_COMMANDS.contains(&byte) {
                        self.flush_data_run(&mut data_run, &mut events);
                        events.push(Event::Command(byte));
                        self.phase = Phase::Stream;
                    } else if byte == EOR {
                        self.flush_data_run(&mut data_run, &mut events);
                        events.push(Event::RecordEnd);
                        self.phase = Phase::Stream;
                    } else {
                        self.flush_data_run(&mut data_run, &mut events);
                        warn!(target: "decoder", "unknown IAC command 0x{byte:02x}");
                        events.push(Event::UnknownCommand(byte));
                        self.phase = Phase::Stream;
                    }
                }
                Phase::SawNeg(verb) => {
                    self.handle_negotiation(verb, byte, &mut events);
                    self.phase = Phase::Stream;
                }
                Phase::SawSb => {
                    self.sb_option = byte;
                    self.sb_buffer.clear();
                    self.phase = Phase::InSb;
                }
                Phase::InSb => {
                    if byte == IAC {
                        self.phase = Phase::InSbIac;
                    } else if self.sb_buffer.len() >= self.config.sb_buffer_cap {
                        warn!(target: "subnegotiation", "sb buffer cap exceeded for option {}, abandoning", self.sb_option);
                        self.phase = Phase::Stream;
                    } else {
                        self.sb_buffer.extend_from_slice(&[byte]);
                    }
                }
                Phase::InSbIac => {
                    if byte == IAC {
                        self.sb_buffer.extend_from_slice(&[IAC]);
                        self.phase = Phase::InSb;
                    } else if byte == SE {
                        let option = self.sb_option;
                        let payload = self.sb_buffer.split().freeze();
                        self.phase = Phase::Stream;
                        self.dispatch_subnegotiation(option, &payload, &mut events);
                    } else {
                        warn!(target: "subnegotiation", "malformed SB for option {}", self.sb_option);
                        events.push(Event::SbMalformed {
                            option: self.sb_option,
                            partial: self.sb_buffer.split().freeze(),
                        });
                        self.phase = Phase::Stream;
                    }
                }
            }
        }
        self.flush_data_run(&mut data_run, &mut events);
        events
    }

    fn binary_in_effect(&self) -> bool {
        self.config.force_binary || self.options.option(BINARY).remote_enabled()
    }

    fn flush_data_run(&mut self, data_run: &mut Vec<u8>, events: &mut Vec<Event>) {
        if data_run.is_empty() {
            return;
        }
        let run = core::mem::take(data_run);
        if self.binary_in_effect() {
            events.push(Event::DataReceive(Bytes::from(run)));
            return;
        }
        for line_event in self.normalizer.feed(&run) {
            match line_event {
                LineEvent::Data(bytes) => self.feed_editor(&bytes, events),
                LineEvent::LineEnd => {
                    let line = self.line_buffer.split().freeze();
                    events.push(Event::LineReceive(line));
                }
            }
        }
    }

    fn feed_editor(&mut self, data: &[u8], events: &mut Vec<Event>) {
        let editing = matches!(self.mode, Mode::Kludge | Mode::Local);
        if !editing {
            self.line_buffer.extend_from_slice(data);
            return;
        }
        for &byte in data {
            if let Some(func) = self.linemode.slc_table.function_for_byte(byte) {
                events.push(Event::Function(func));
                self.apply_edit(func);
            } else {
                self.line_buffer.extend_from_slice(&[byte]);
            }
        }
    }

    fn apply_edit(&mut self, func: SlcFunction) {
        match func {
            SlcFunction::Ec => {
                self.line_buffer.truncate(self.line_buffer.len().saturating_sub(1));
            }
            SlcFunction::El => {
                self.line_buffer.clear();
            }
            SlcFunction::Ew => {
                while matches!(self.line_buffer.last(), Some(b) if b.is_ascii_whitespace()) {
                    self.line_buffer.truncate(self.line_buffer.len() - 1);
                }
                while matches!(self.line_buffer.last(), Some(b) if !b.is_ascii_whitespace()) {
                    self.line_buffer.truncate(self.line_buffer.len() - 1);
                }
            }
            // AO, AYT, BRK, EOF, SUSP, IP, RP, LNEXT, XON, XOFF: signal only.
            _ => {}
        }
    }

    fn transition_mode(&mut self) {
        let remote_linemode = self.options.option(LINEMODE).remote_enabled();
        let local_sga = self.options.option(SUPPRESS_GO_AHEAD).local_enabled();
        let local_echo = self.options.option(ECHO).local_enabled();
        self.mode = if remote_linemode {
            Mode::Remote
        } else if local_sga && local_echo {
            Mode::Kludge
        } else if !local_sga && !local_echo {
            Mode::Local
        } else {
            Mode::Character
        };
    }

    // ---- negotiation core (§4.C) ------------------------------------------

    fn handle_negotiation(&mut self, verb: u8, option: u8, events: &mut Vec<Event>) {
        match verb {
            WILL => self.handle_will(option, events),
            WONT => self.handle_wont(option, events),
            DO => self.handle_do(option, events),
            DONT => self.handle_dont(option, events),
            _ => unreachable!("handle_negotiation only called for WILL/WONT/DO/DONT"),
        }
    }

    fn handle_will(&mut self, option: u8, events: &mut Vec<Event>) {
        let entry = self.options.option(option);
        if entry.remote_enabled() && !entry.remote().is_pending() {
            debug!(target: "negotiation", "redundant WILL {option} ignored (already enabled)");
            return;
        }
        if entry.remote().is_pending() {
            self.options.option_mut(option).set_remote(OptionState::Enabled);
        } else {
            // Whether a reversed-direction WILL (e.g. a server offering a
            // client-only option) is acceptable is entirely encoded in
            // `remote_support`: the host only flags support for directions
            // it actually expects (§4.B/§4.C "directional options").
            let accept = entry.remote_support();
            self.options
                .option_mut(option)
                .set_remote(if accept { OptionState::Enabled } else { OptionState::Disabled });
            self.out
                .extend_from_slice(&if accept { writer::do_(option) } else { writer::dont(option) });
            if !accept {
                info!(target: "negotiation", "refused WILL {option}");
                return;
            }
        }
        events.push(Event::Negotiation(crate::events::Negotiation { command: WILL, option }));
        self.run_post_enable_remote(option);
        self.transition_mode();
    }

    fn handle_wont(&mut self, option: u8, events: &mut Vec<Event>) {
        let entry = self.options.option(option);
        if !entry.remote_enabled() && !entry.remote().is_pending() {
            debug!(target: "negotiation", "redundant WONT {option} ignored (already disabled)");
            return;
        }
        if !entry.remote().is_pending() {
            self.out.extend_from_slice(&writer::dont(option));
        }
        self.options.option_mut(option).set_remote(OptionState::Disabled);
        events.push(Event::Negotiation(crate::events::Negotiation { command: WONT, option }));
        self.transition_mode();
    }

    fn handle_do(&mut self, option: u8, events: &mut Vec<Event>) {
        let entry = self.options.option(option);
        if entry.local_enabled() && !entry.local().is_pending() {
            debug!(target: "negotiation", "redundant DO {option} ignored (already enabled)");
            return;
        }
        if entry.local().is_pending() {
            self.options.option_mut(option).set_local(OptionState::Enabled);
        } else {
            let accept = if option == LINEMODE {
                false
            } else {
                entry.local_support()
            };
            self.options
                .option_mut(option)
                .set_local(if accept { OptionState::Enabled } else { OptionState::Disabled });
            self.out
                .extend_from_slice(&if accept { writer::will(option) } else { writer::wont(option) });
            if !accept {
                info!(target: "negotiation", "refused DO {option}");
                return;
            }
        }
        events.push(Event::Negotiation(crate::events::Negotiation { command: DO, option }));
        self.run_post_enable_local(option);
        self.transition_mode();
    }

    fn handle_dont(&mut self, option: u8, events: &mut Vec<Event>) {
        let entry = self.options.option(option);
        if !entry.local_enabled() && !entry.local().is_pending() {
            debug!(target: "negotiation", "redundant DONT {option} ignored (already disabled)");
            return;
        }
        if !entry.local().is_pending() {
            self.out.extend_from_slice(&writer::wont(option));
        }
        self.options.option_mut(option).set_local(OptionState::Disabled);
        events.push(Event::Negotiation(crate::events::Negotiation { command: DONT, option }));
        self.transition_mode();
    }

    fn run_post_enable_remote(&mut self, option: u8) {
        match option {
            TERMINAL_TYPE => {
                self.ttype = TtypeCycle::new(self.config.ttype_cycle_cap);
                self.out
                    .extend_from_slice(&writer::send_sb(TERMINAL_TYPE, &strings::encode_send()));
            }
            CHARSET => {
                let names: Vec<&str> = self.config.supported_charsets.iter().map(String::as_str).collect();
                self.out.extend_from_slice(&writer::send_sb(
                    CHARSET,
                    &charset::encode_request(&names, b';'),
                ));
            }
            TIMING_MARK => {
                self.out.extend_from_slice(&writer::will(TIMING_MARK));
            }
            NEW_ENVIRON => {
                self.out
                    .extend_from_slice(&writer::send_sb(NEW_ENVIRON, &new_environ::encode_send(&[])));
            }
            _ => {}
        }
    }

    fn run_post_enable_local(&mut self, option: u8) {
        if option == NAWS_OPT {
            let (cols, rows) = self.naws;
            self.out
                .extend_from_slice(&writer::send_sb(NAWS_OPT, &naws::encode(cols, rows)));
        }
    }

    // ---- subnegotiation dispatcher (§4.D) ---------------------------------

    fn dispatch_subnegotiation(&mut self, option: u8, payload: &[u8], events: &mut Vec<Event>) {
        let descriptor = registry::descriptor(option);
        match descriptor.sb_handler {
            SbHandler::Naws => self.dispatch_naws(payload, events),
            SbHandler::Ttype => self.dispatch_ttype(payload, events),
            SbHandler::Charset => self.dispatch_charset(payload, events),
            SbHandler::NewEnviron => self.dispatch_new_environ(payload, events),
            SbHandler::Linemode => self.dispatch_linemode(payload, events),
            SbHandler::Lflow => self.dispatch_lflow(payload, events),
            SbHandler::Status => self.dispatch_status(payload, events),
            SbHandler::Tspeed => self.dispatch_string(payload, events, |engine, value| {
                engine.tspeed = Some(value.clone());
                Event::Tspeed(value)
            }),
            SbHandler::Xdisploc => self.dispatch_string(payload, events, |engine, value| {
                engine.xdisploc = Some(value.clone());
                Event::Xdisploc(value)
            }),
            SbHandler::Sndloc => self.dispatch_string(payload, events, |engine, value| {
                engine.sndloc = Some(value.clone());
                Event::Sndloc(value)
            }),
            SbHandler::None => {
                if option == LOGOUT {
                    events.push(Event::Logout);
                    return;
                }
                warn!(target: "subnegotiation", "no handler for option {option}, dropping {} bytes", payload.len());
                events.push(Event::Subnegotiation(crate::events::Subnegotiation {
                    option,
                    buffer: Bytes::copy_from_slice(payload),
                }));
            }
        }
    }

    fn dispatch_naws(&mut self, payload: &[u8], events: &mut Vec<Event>) {
        match naws::decode(payload) {
            Some((cols, rows)) => {
                self.naws = (cols, rows);
                events.push(Event::Naws { cols, rows });
            }
            None => {
                warn!(target: "subnegotiation", "malformed NAWS payload, length {}", payload.len());
            }
        }
    }

    fn dispatch_ttype(&mut self, payload: &[u8], events: &mut Vec<Event>) {
        use crate::telnet::ttype_token::IS;
        if payload.first() != Some(&IS) {
            return;
        }
        let name = String::from_utf8_lossy(&payload[1..]).into_owned();
        let continue_cycle = self.ttype.record(&name);
        events.push(Event::Ttype(name));
        if continue_cycle {
            self.out
                .extend_from_slice(&writer::send_sb(TERMINAL_TYPE, &strings::encode_send()));
        }
    }

    fn dispatch_charset(&mut self, payload: &[u8], events: &mut Vec<Event>) {
        use crate::telnet::charset_token::{ACCEPTED, REJECTED, REQUEST};
        match payload.first() {
            Some(&REQUEST) if payload.len() > 1 => {
                let delimiter = payload[1];
                let offered = charset::parse_offered_names(delimiter, &payload[2..]);
                let supported: Vec<&str> = self.config.supported_charsets.iter().map(String::as_str).collect();
                match charset::select(&offered, &supported) {
                    Some(name) => {
                        self.charset = Some(name.to_string());
                        let body = charset::encode_accepted(name);
                        self.out.extend_from_slice(&writer::send_sb(CHARSET, &body));
                        events.push(Event::Charset(name.to_string()));
                    }
                    None => {
                        self.out
                            .extend_from_slice(&writer::send_sb(CHARSET, &charset::encode_rejected()));
                    }
                }
            }
            Some(&ACCEPTED) => {
                let name = String::from_utf8_lossy(&payload[1..]).into_owned();
                self.charset = Some(name.clone());
                events.push(Event::Charset(name));
            }
            Some(&REJECTED) => {
                info!(target: "negotiation", "peer rejected all offered charsets");
            }
            _ => {
                // TTABLE-* variants: acknowledged without translation-table semantics (§4.E).
            }
        }
    }

    fn dispatch_new_environ(&mut self, payload: &[u8], events: &mut Vec<Event>) {
        use crate::telnet::environ_token::{INFO, IS, SEND};
        match payload.first() {
            Some(&IS) | Some(&INFO) => {
                let records = new_environ::parse_records(&payload[1..]);
                for record in records {
                    events.push(Event::Environ {
                        name: record.name.clone(),
                        value: record.value.clone(),
                        kind: record.kind,
                    });
                    match self.environ.iter_mut().find(|v| v.name == record.name) {
                        Some(existing) => *existing = record,
                        None => self.environ.push(record),
                    }
                }
            }
            Some(&SEND) => {
                let names: Vec<(&str, &str, EnvironKind)> = self
                    .config
                    .send_environ
                    .iter()
                    .filter_map(|name| {
                        self.environ
                            .iter()
                            .find(|v| &v.name == name)
                            .map(|v| (v.name.as_str(), v.value.as_str(), v.kind))
                    })
                    .collect();
                let body = new_environ::encode_is(&names);
                self.out.extend_from_slice(&writer::send_sb(NEW_ENVIRON, &body));
            }
            _ => {}
        }
    }

    fn dispatch_linemode(&mut self, payload: &[u8], events: &mut Vec<Event>) {
        match payload.first() {
            Some(&MODE) if payload.len() == 2 => {
                if let Some(reply) = self.linemode.mode.on_mode_byte(payload[1]) {
                    self.out
                        .extend_from_slice(&writer::send_sb(LINEMODE, &linemode::encode_mode(reply)));
                }
                events.push(Event::LinemodeMode(self.linemode.mode.flags));
            }
            Some(&FORWARDMASK) => {
                if payload.len() == 33 {
                    self.linemode.forward_mask.copy_from_slice(&payload[1..33]);
                    info!(target: "negotiation", "stored FORWARDMASK (not enforced)");
                } else {
                    warn!(target: "subnegotiation", "malformed FORWARDMASK, length {}", payload.len());
                }
            }
            Some(&SLC) => {
                let reply = linemode::negotiate_slc_body(&mut self.linemode.slc_table, &payload[1..]);
                if !reply.is_empty() {
                    self.out.extend_from_slice(&writer::send_sb(LINEMODE, &reply));
                }
                for triple in payload[1..].chunks_exact(3) {
                    if let Some(func) = SlcFunction::from_code(triple[0]) {
                        events.push(Event::Function(func));
                    }
                }
            }
            _ => {}
        }
    }

    fn dispatch_lflow(&mut self, payload: &[u8], events: &mut Vec<Event>) {
        if let Some(&byte) = payload.first() {
            if let Some(command) = crate::options::lflow::decode(byte) {
                self.lflow.apply(command);
                events.push(Event::Lflow(match command {
                    LflowCommand::Off => LflowSignal::PauseWrite,
                    LflowCommand::On => LflowSignal::ResumeWrite,
                    LflowCommand::RestartAny => LflowSignal::RestartAny,
                    LflowCommand::RestartXon => LflowSignal::RestartXonOnly,
                }));
            }
        }
    }

    fn dispatch_status(&mut self, payload: &[u8], _events: &mut Vec<Event>) {
        use crate::telnet::ttype_token::{IS, SEND};
        match payload.first() {
            Some(&SEND) => {
                let body = status::encode_is(&self.options);
                self.out.extend_from_slice(&writer::send_sb(STATUS, &body));
            }
            Some(&IS) => {
                let reported = status::parse_is(payload);
                let mismatches = status::diff_against(&self.options, &reported);
                if !mismatches.is_empty() {
                    for &(command, option) in &mismatches {
                        info!(target: "negotiation", "STATUS mismatch: peer reports {command:02x} {option} which disagrees with local view");
                    }
                    if let Some(hook) = &mut self.status_mismatch_hook {
                        hook(&mismatches);
                    }
                }
            }
            _ => {}
        }
    }

    fn dispatch_string(
        &mut self,
        payload: &[u8],
        events: &mut Vec<Event>,
        on_is: impl FnOnce(&mut Self, String) -> Event,
    ) {
        use crate::telnet::ttype_token::SEND;
        if payload.first() == Some(&SEND) {
            return;
        }
        if let Some(value) = strings::decode_is(payload) {
            let event = on_is(self, value);
            events.push(event);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::telnet::op_command::NOP;
    use crate::telnet::op_option::{NAWS as NAWS_OPT, TERMINAL_TYPE as TTYPE_OPT};

    fn server_engine() -> Engine {
        let mut engine = Engine::new(EngineConfig::default());
        engine.support(NAWS_OPT, false, true);
        engine.support(TTYPE_OPT, false, true);
        engine.support(LINEMODE, true, false);
        engine
    }

    #[test]
    fn scenario_basic_naws() {
        let mut engine = server_engine();
        engine.request_do(NAWS_OPT).unwrap();
        assert_eq!(&engine.drain()[..], &[IAC, DO, NAWS_OPT]);
        let events = engine.receive(&[IAC, WILL, NAWS_OPT]);
        assert_eq!(
            events,
            vec![Event::Negotiation(crate::events::Negotiation { command: WILL, option: NAWS_OPT })]
        );
        let events = engine.receive(&[IAC, SB, NAWS_OPT, 0, 80, 0, 24, IAC, SE]);
        assert_eq!(events, vec![Event::Naws { cols: 80, rows: 24 }]);
        assert_eq!(engine.naws(), (80, 24));
        assert!(engine.options().option(NAWS_OPT).remote_enabled());
    }

    #[test]
    fn scenario_ttype_cycle_terminates_on_repeat() {
        let mut engine = server_engine();
        engine.request_do(TTYPE_OPT).unwrap();
        engine.drain();
        engine.receive(&[IAC, WILL, TTYPE_OPT]);
        let sent = engine.drain();
        assert_eq!(&sent[..], &writer::send_sb(TERMINAL_TYPE, &strings::encode_send())[..]);

        let mut sb = alloc::vec![IAC, SB, TTYPE_OPT, 0];
        sb.extend_from_slice(b"xterm");
        sb.extend_from_slice(&[IAC, SE]);
        engine.receive(&sb);
        assert!(!engine.drain().is_empty());

        let mut sb2 = alloc::vec![IAC, SB, TTYPE_OPT, 0];
        sb2.extend_from_slice(b"xterm-256color");
        sb2.extend_from_slice(&[IAC, SE]);
        engine.receive(&sb2);
        assert!(!engine.drain().is_empty());

        let mut sb3 = alloc::vec![IAC, SB, TTYPE_OPT, 0];
        sb3.extend_from_slice(b"xterm-256color");
        sb3.extend_from_slice(&[IAC, SE]);
        engine.receive(&sb3);
        assert!(engine.drain().is_empty());

        assert_eq!(engine.ttype_chain(), &["xterm".to_string(), "xterm-256color".to_string()]);
    }

    #[test]
    fn scenario_iac_in_data_roundtrips() {
        let mut engine = Engine::new(EngineConfig {
            force_binary: true,
            ..EngineConfig::default()
        });
        let outbound = writer::write(&[0xaa, IAC, 0xbb], writer::EolPolicy::Binary);
        assert_eq!(&outbound[..], &[0xaa, IAC, IAC, 0xbb]);
        let events = engine.receive(&outbound);
        assert_eq!(events, vec![Event::DataReceive(Bytes::from_static(&[0xaa, IAC, 0xbb]))]);
    }

    #[test]
    fn scenario_no_loop_acknowledgment_produces_no_outbound() {
        let mut engine = server_engine();
        engine.options.support_remote(ECHO);
        engine.options.option_mut(ECHO).set_remote(OptionState::Enabled);
        let events = engine.receive(&[IAC, WILL, ECHO]);
        assert!(events.is_empty());
        assert!(engine.drain().is_empty());
    }

    #[test]
    fn scenario_linemode_mode_ack() {
        let mut engine = server_engine();
        engine.propose_linemode_mode(0x03);
        assert_eq!(&engine.drain()[..], &[IAC, SB, LINEMODE, MODE, 0x03, IAC, SE]);
        let events = engine.receive(&[IAC, SB, LINEMODE, MODE, 0x83, IAC, SE]);
        assert_eq!(events, vec![Event::LinemodeMode(0x03)]);
        assert!(!engine.linemode().mode.pending_ack);
        assert!(engine.drain().is_empty());
    }

    #[test]
    fn scenario_malformed_naws_recovers() {
        let mut engine = server_engine();
        let events = engine.receive(&[IAC, SB, NAWS_OPT, 0, 0x50, IAC, SE]);
        assert!(events.is_empty());
        assert_eq!(engine.naws(), (0, 0));
        let events = engine.receive(&[IAC, NOP]);
        assert_eq!(events, vec![Event::Command(NOP)]);
    }

    #[test]
    fn write_applies_nvt_eol_policy_and_trailing_ga() {
        let mut engine = Engine::new(EngineConfig::default());
        engine.write(b"hi\n");
        let mut expected = alloc::vec![b'h', b'i', b'\r', b'\n'];
        expected.extend_from_slice(&[IAC, crate::telnet::op_command::GA]);
        assert_eq!(&engine.drain()[..], &expected[..]);
    }

    #[test]
    fn write_suppresses_ga_once_local_sga_is_enabled() {
        let mut engine = Engine::new(EngineConfig::default());
        engine
            .options
            .option_mut(SUPPRESS_GO_AHEAD)
            .set_local(OptionState::Enabled);
        engine.write(b"ok");
        assert_eq!(&engine.drain()[..], b"ok");
    }

    #[test]
    fn write_suppresses_ga_when_never_send_ga_is_set() {
        let mut engine = Engine::new(EngineConfig {
            never_send_ga: true,
            ..EngineConfig::default()
        });
        engine.write(b"ok\n");
        assert_eq!(&engine.drain()[..], b"ok\r\n");
    }

    #[test]
    fn write_passes_through_unchanged_in_binary() {
        let mut engine = Engine::new(EngineConfig {
            force_binary: true,
            never_send_ga: true,
            ..EngineConfig::default()
        });
        engine.write(&[b'h', IAC, b'\n']);
        assert_eq!(&engine.drain()[..], &[b'h', IAC, IAC, b'\n']);
    }

    #[test]
    fn close_with_error_surfaces_and_makes_receive_eof() {
        let mut engine = server_engine();
        engine.request_do(NAWS_OPT).unwrap();
        engine.drain();
        let waiter = engine.wait_for(NAWS_OPT, true, OptionState::Enabled);

        engine.close_with_error(crate::error::EngineError::ConnectionClosed);
        assert_eq!(engine.closed_error(), Some(crate::error::EngineError::ConnectionClosed));

        let fired = engine.poll_waiters();
        assert_eq!(fired, alloc::vec![(waiter, WaitOutcome::Closed)]);

        let events = engine.receive(&[IAC, WILL, NAWS_OPT]);
        assert!(events.is_empty());
        assert!(engine.drain().is_empty());
    }

    #[test]
    fn lflow_command_surfaces_as_pause_and_resume_events() {
        use crate::events::LflowSignal;
        use crate::telnet::lflow_token::{OFF, ON};
        use crate::telnet::op_option::TOGGLE_FLOW_CONTROL as LFLOW_OPT;

        let mut engine = server_engine();
        engine.support(LFLOW_OPT, false, true);

        let events = engine.receive(&[IAC, SB, LFLOW_OPT, OFF, IAC, SE]);
        assert_eq!(events, alloc::vec![Event::Lflow(LflowSignal::PauseWrite)]);
        assert!(!engine.lflow.enabled);

        let events = engine.receive(&[IAC, SB, LFLOW_OPT, ON, IAC, SE]);
        assert_eq!(events, alloc::vec![Event::Lflow(LflowSignal::ResumeWrite)]);
        assert!(engine.lflow.enabled);
    }

    #[test]
    fn new_environ_post_enable_sends_send_all_request() {
        use crate::telnet::environ_token::SEND;
        use crate::telnet::op_option::NEW_ENVIRON as NEW_ENVIRON_OPT;

        let mut engine = server_engine();
        engine.support(NEW_ENVIRON_OPT, false, true);
        engine.request_do(NEW_ENVIRON_OPT).unwrap();
        engine.drain();

        engine.receive(&[IAC, WILL, NEW_ENVIRON_OPT]);
        let sent = engine.drain();
        assert_eq!(&sent[..], &writer::send_sb(NEW_ENVIRON_OPT, &[SEND])[..]);
    }
}
