//! Utility functions and helpers
//!
//! Atomic file writes and timestamp formatting.

pub mod atomic;
pub mod time;

pub use atomic::{atomic_write, atomic_write_with, remove_stale_temp, AtomicError, AtomicResult};
pub use time::{display_date, format_iso, now_iso};
