//! Payload tree navigation.
//!
//! Dotted-path lookups over encoded payload trees.

pub mod json_path;

pub use json_path::*;
