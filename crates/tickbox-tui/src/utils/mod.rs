//! Utility functions for string formatting and manipulation.

pub mod format;

pub use format::{format_date, items_left_label, tail, truncate_string};
