//! Foundational low-level utilities shared across Warden crates.
//!
//! Provides the atomic file-write helper used by config persistence and
//! timestamp parsing/formatting helpers used by retrieval and the
//! grace-period calculations.

pub mod atomic_io;
pub mod time_utils;

pub use atomic_io::write_text_atomic;
pub use time_utils::{format_rfc3339, parse_rfc3339, parse_rfc3339_lenient};
