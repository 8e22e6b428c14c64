//! Pure projections over a client snapshot.
//!
//! # Responsibility
//! - Derive the dashboard grid, counters and the cross-client task board.
//! - Stay free of I/O so callers can recompute on every change.

pub mod dashboard;
pub mod task_board;
