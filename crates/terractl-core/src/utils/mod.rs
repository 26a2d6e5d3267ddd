//! Small pure helpers shared across services.

pub mod format;

pub use format::{format_bytes, strip_ansi_codes};
