//! Repository layer abstractions and persistence implementations.
//!
//! # Responsibility
//! - Define the document-store contract for client records.
//! - Isolate SQLite query details from service orchestration.
//!
//! # Invariants
//! - Repository writes must enforce `Client::validate()` before persistence.
//! - Repository APIs return semantic errors (`NotFound`) in addition to DB
//!   transport errors.

pub mod client_repo;
