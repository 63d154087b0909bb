#![cfg_attr(not(feature = "std"), no_std)]

#[cfg(not(feature = "std"))]
extern crate alloc;
extern crate core;
#[cfg(feature = "std")]
extern crate std as alloc;

pub mod compatibility;
#[cfg(feature = "std")]
pub mod engine;
#[cfg(feature = "std")]
pub mod error;
pub mod events;
pub mod line;
#[cfg(feature = "std")]
pub mod options;
pub mod registry;
pub mod slc;
pub mod telnet;
pub mod writer;

#[cfg(all(feature = "std", feature = "tokio-util"))]
pub mod codec;

#[cfg(feature = "std")]
pub use engine::{Engine, EngineConfig, LinemodeState, WaitOutcome};
#[cfg(feature = "std")]
pub use error::{CallerError, EngineError};
pub use events::{Event, Iac, Mode, Negotiation, Subnegotiation};
