//! Thin `tokio_util::codec` façade (§4.J), gated behind the `tokio-util`
//! feature mirroring the dependency's own optional wiring. Performs no I/O:
//! it only frames [`Engine`] over any `AsyncRead`/`AsyncWrite` via
//! `tokio_util::codec::Framed`.

use std::io;

use bytes::{Buf, BufMut, BytesMut};
use tokio_util::codec::{Decoder, Encoder};

use crate::engine::{Engine, EngineConfig};
use crate::events::{Event, Negotiation, Subnegotiation};

/// Items a caller may write through the codec.
pub enum OutboundItem {
    /// Raw application/text bytes, routed through [`Engine::write`] so the
    /// outbound EOL policy, IAC doubling, and `IAC GA` all apply exactly as
    /// they would for a caller driving the engine directly.
    Raw(bytes::Bytes),
    /// A bare negotiation command.
    Negotiation(Negotiation),
    /// A full subnegotiation.
    Subnegotiation(Subnegotiation),
}

/// Wraps an [`Engine`], exposing it as a `Decoder`/`Encoder` pair.
pub struct Codec {
    engine: Engine,
}

impl Codec {
    #[must_use]
    pub fn new(config: EngineConfig) -> Self {
        Self {
            engine: Engine::new(config),
        }
    }

    #[must_use]
    pub fn engine(&self) -> &Engine {
        &self.engine
    }

    #[must_use]
    pub fn engine_mut(&mut self) -> &mut Engine {
        &mut self.engine
    }
}

impl Decoder for Codec {
    type Item = Vec<Event>;
    type Error = io::Error;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        if src.is_empty() {
            return Ok(None);
        }
        let chunk = src.split().freeze();
        let events = self.engine.receive(&chunk);
        Ok(Some(events))
    }
}

impl Encoder<OutboundItem> for Codec {
    type Error = io::Error;

    fn encode(&mut self, item: OutboundItem, dst: &mut BytesMut) -> Result<(), Self::Error> {
        match item {
            OutboundItem::Raw(bytes) => {
                self.engine.write(&bytes);
                let framed = self.engine.drain();
                dst.reserve(framed.len());
                dst.put(framed);
            }
            OutboundItem::Negotiation(neg) => {
                let framed = bytes::Bytes::from(neg);
                dst.reserve(framed.len());
                dst.put(framed);
            }
            OutboundItem::Subnegotiation(sub) => {
                let framed = bytes::Bytes::from(sub);
                dst.reserve(framed.len());
                dst.put(framed);
            }
        }
        Ok(())
    }
}

/// Pop any bytes the engine queued (negotiation replies, post-enable
/// subnegotiations) and frame them for the transport, without going through
/// `Encoder::encode` (those originate inside the engine, not from the caller).
pub fn drain_engine_output(codec: &mut Codec, dst: &mut BytesMut) {
    let pending = codec.engine_mut().drain();
    if !pending.is_empty() {
        dst.reserve(pending.len());
        dst.put(pending);
    }
}
