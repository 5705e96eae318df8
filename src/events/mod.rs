//! Loader events: types, synchronous emitter and broadcast bus.
//!
//! ## Contents
//! - [`EventKind`], [`EventPayload`], [`Event`] event classification and payload
//! - [`Emitter`], [`Subscription`] inline handlers (`Loader::on`)
//! - [`Bus`] thin wrapper over `tokio::sync::broadcast` (`Loader::subscribe`)
//!
//! ## Quick reference
//! - **Publisher**: the loader's settlement path (`start`, task settlement, finalization).
//! - **Consumers**: user handlers, the sub-loader bridge, broadcast receivers.

mod bus;
mod emitter;
mod event;

pub use bus::Bus;
pub use emitter::{Emitter, Subscription};
pub use event::{Event, EventKind, EventPayload, TaskResults};
