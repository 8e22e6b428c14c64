//! Client store synchronization.
//!
//! # Responsibility
//! - Keep subscribers supplied with the latest full snapshot of all clients.
//! - Route every write through the store so each change is published.
//!
//! # Invariants
//! - Deliveries are whole-snapshot replacements, never deltas.

pub mod client_store;
pub mod snapshot;

pub use client_store::{ClientStore, Subscription};
pub use snapshot::Snapshot;
