//! Small helpers with no domain knowledge.

pub mod text;

pub use text::{exceeds_chars, truncate_chars};
