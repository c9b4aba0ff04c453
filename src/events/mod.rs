//! Worker events: types and broadcast bus.
//!
//! ## Contents
//! - [`EventKind`], [`Event`] what happened to a task execution, and its metadata
//! - [`Bus`] thin wrapper over `tokio::sync::broadcast`
//!
//! ## Quick reference
//! - **Publisher**: [`Worker`](crate::Worker), once per decision point of the
//!   failure pipeline.
//! - **Consumers**: anything holding a receiver from [`Bus::subscribe`]
//!   (tests, log forwarders, metrics).

mod bus;
mod event;

pub use bus::Bus;
pub use event::{Event, EventKind};
