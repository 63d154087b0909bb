//! End-to-end scenario tests against literal byte sequences, run as crate-level
//! integration tests (the same scenarios also live as unit tests inside
//! `engine.rs`, kept in sync deliberately — these exercise the public API only).

use telnet_engine::engine::{Engine, EngineConfig};
use telnet_engine::events::{Event, Negotiation};
use telnet_engine::telnet::op_command::{DO, IAC, NOP, SB, SE, WILL};
use telnet_engine::telnet::op_option::{LINEMODE, NAWS, TERMINAL_TYPE};

fn server_engine() -> Engine {
    let mut engine = Engine::new(EngineConfig::default());
    engine.support(NAWS, false, true);
    engine.support(TERMINAL_TYPE, false, true);
    engine.support(LINEMODE, true, false);
    engine
}

#[test]
fn basic_naws_negotiation_and_dimensions() {
    let mut engine = server_engine();
    engine.request_do(NAWS).unwrap();
    assert_eq!(&engine.drain()[..], &[IAC, DO, NAWS]);

    let events = engine.receive(&[IAC, WILL, NAWS]);
    assert_eq!(
        events,
        vec![Event::Negotiation(Negotiation { command: WILL, option: NAWS })]
    );

    let events = engine.receive(&[IAC, SB, NAWS, 0, 80, 0, 24, IAC, SE]);
    assert_eq!(events, vec![Event::Naws { cols: 80, rows: 24 }]);
    assert_eq!(engine.naws(), (80, 24));
}

#[test]
fn ttype_cycle_terminates_on_case_insensitive_repeat() {
    let mut engine = server_engine();
    engine.request_do(TERMINAL_TYPE).unwrap();
    engine.drain();
    engine.receive(&[IAC, WILL, TERMINAL_TYPE]);
    assert!(!engine.drain().is_empty());

    let mut first = vec![IAC, SB, TERMINAL_TYPE, 0];
    first.extend_from_slice(b"xterm");
    first.extend_from_slice(&[IAC, SE]);
    engine.receive(&first);
    assert!(!engine.drain().is_empty(), "first reply is new, cycle continues");

    let mut second = vec![IAC, SB, TERMINAL_TYPE, 0];
    second.extend_from_slice(b"XTERM");
    second.extend_from_slice(&[IAC, SE]);
    engine.receive(&second);
    assert!(engine.drain().is_empty(), "case-insensitive repeat terminates the cycle");

    assert_eq!(engine.ttype_chain(), &["xterm".to_string()]);
}

#[test]
fn unsupported_option_negotiation_is_refused_silently() {
    let mut engine = server_engine();
    // Peer asks us to DO an option we never flagged local support for: no
    // event surfaces to the application, only a silent WONT on the wire.
    let events = engine.receive(&[IAC, DO, 250]);
    assert!(events.is_empty());
    assert_eq!(&engine.drain()[..], &[IAC, telnet_engine::telnet::op_command::WONT, 250]);
}

#[test]
fn plain_data_with_no_negotiation_is_not_choked_on() {
    // A degenerate peer (e.g. netcat) that never negotiates anything.
    let mut engine = Engine::new(EngineConfig { force_binary: true, ..EngineConfig::default() });
    let events = engine.receive(b"plain text, no telnet at all\n");
    assert_eq!(events.len(), 1);
    match &events[0] {
        Event::DataReceive(bytes) => assert_eq!(&bytes[..], b"plain text, no telnet at all\n"),
        other => panic!("expected DataReceive, got {other:?}"),
    }
}

#[test]
fn nop_command_surfaces_as_event() {
    let mut engine = server_engine();
    let events = engine.receive(&[IAC, NOP]);
    assert_eq!(events, vec![Event::Command(NOP)]);
}

#[test]
fn write_frames_text_with_ga_by_default() {
    let mut engine = Engine::new(EngineConfig::default());
    engine.write(b"hello\n");
    assert_eq!(
        &engine.drain()[..],
        &[b'h', b'e', b'l', b'l', b'o', b'\r', b'\n', IAC, telnet_engine::telnet::op_command::GA]
    );
}

#[test]
fn close_with_error_is_observable_and_ends_the_session() {
    use telnet_engine::error::EngineError;

    let mut engine = server_engine();
    engine.close_with_error(EngineError::ConnectionClosed);
    assert_eq!(engine.closed_error(), Some(EngineError::ConnectionClosed));
    assert!(engine.receive(&[IAC, WILL, NAWS]).is_empty());
}
