//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate repository calls into use-case level APIs.
//! - Keep callers decoupled from storage and AI service details.

pub mod assistant_service;
pub mod client_service;
pub mod error;
