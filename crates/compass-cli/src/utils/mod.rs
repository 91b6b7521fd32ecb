//! Utility functions for string formatting.

pub mod format;

pub use format::{or_placeholder, schedule_label, truncate_string};
