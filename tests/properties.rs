//! §8 invariants, exercised as deterministic tests over literal byte
//! sequences (the engine has no randomness source of its own to drive
//! property-style fuzzing beyond the `arbitrary`-derived wire structs).

use telnet_engine::compatibility::{OptionState, Table};
use telnet_engine::engine::{Engine, EngineConfig};
use telnet_engine::events::Event;
use telnet_engine::line::Normalizer;
use telnet_engine::telnet::op_command::{DO, IAC, SB, SE, WILL, WONT};
use telnet_engine::telnet::op_option::{ECHO, LINEMODE, NAWS};
use telnet_engine::writer;

#[test]
fn decode_of_encode_roundtrips_arbitrary_data_with_embedded_iac() {
    let payload = [0x00, 0xaa, IAC, 0x42, IAC, IAC, 0xff_u8.wrapping_sub(1)];
    let encoded = writer::escape_iac(&payload);
    let mut engine = Engine::new(EngineConfig { force_binary: true, ..EngineConfig::default() });
    let events = engine.receive(&encoded);
    assert_eq!(events.len(), 1);
    match &events[0] {
        Event::DataReceive(bytes) => assert_eq!(&bytes[..], &payload[..]),
        other => panic!("expected DataReceive, got {other:?}"),
    }
}

#[test]
fn at_most_one_of_enabled_pending_on_pending_off_holds() {
    let mut table = Table::default();
    table.support(NAWS);
    for state in [
        OptionState::Disabled,
        OptionState::Enabled,
        OptionState::PendingOn,
        OptionState::PendingOff,
    ] {
        table.option_mut(NAWS).set_remote(state);
        let entry = table.option(NAWS);
        let flags = [
            entry.remote_enabled(),
            entry.remote().is_pending(),
        ];
        assert!(flags.iter().filter(|&&b| b).count() <= 1);
    }
}

#[test]
fn redundant_will_for_already_enabled_option_produces_no_outbound_bytes() {
    let mut engine = Engine::new(EngineConfig::default());
    engine.support(ECHO, false, true);
    // Drive it to ENABLED the normal way first.
    engine.request_do(ECHO).unwrap();
    engine.drain();
    engine.receive(&[IAC, WILL, ECHO]);
    engine.drain();

    let events = engine.receive(&[IAC, WILL, ECHO]);
    assert!(events.is_empty());
    assert!(engine.drain().is_empty());
}

#[test]
fn do_linemode_is_always_refused_with_wont() {
    let mut engine = Engine::new(EngineConfig::default());
    // No local support registered for LINEMODE at all: a client-side engine.
    let events = engine.receive(&[IAC, DO, LINEMODE]);
    assert!(events.is_empty());
    assert_eq!(&engine.drain()[..], &[IAC, WONT, LINEMODE]);
}

#[test]
fn naws_with_wrong_length_leaves_state_untouched() {
    let mut engine = Engine::new(EngineConfig::default());
    engine.support(NAWS, false, true);
    let events = engine.receive(&[IAC, SB, NAWS, 0, 80, 0, IAC, SE]);
    assert!(events.is_empty());
    assert_eq!(engine.naws(), (0, 0));
}

#[test]
fn line_normalisation_is_idempotent() {
    let mut once = Normalizer::new();
    let first_pass = once.feed(b"hello\r\nworld\r\n");

    let mut twice = Normalizer::new();
    let mut second_pass = Vec::new();
    for event in &first_pass {
        match event {
            telnet_engine::line::LineEvent::Data(d) => second_pass.extend(twice.feed(d)),
            telnet_engine::line::LineEvent::LineEnd => second_pass.extend(twice.feed(b"\r\n")),
        }
    }
    assert_eq!(first_pass, second_pass);
}
