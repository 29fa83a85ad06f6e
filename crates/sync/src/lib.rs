//! Client sync: turns client messages into registry calls and registry
//! events into addressed outbound messages.
//!
//! # Invariants
//! - Every mutating call flushes the registry's events before returning, so
//!   broadcasts go out in the same turn as the mutation.
//! - A client's removal requests are checked against the map it last joined.

mod client_sync;
mod message;
mod transport;

pub use client_sync::{ClientSync, SyncOptions};
pub use message::{ClientMessage, ProtocolError, ServerMessage};
pub use transport::{Outbox, Recipient, Transport};
