//! Domain model for client engagements.
//!
//! # Responsibility
//! - Define the client document and its child tasks and meeting logs.
//! - Keep the stored JSON document shape in one place.
//!
//! # Invariants
//! - Every client is identified by a stable `ClientId`.
//! - Tasks and meeting logs are owned by exactly one client.

pub mod client;
pub mod meeting_log;
pub mod task;
pub mod wire;
