//! Configuration module.
//!
//! JSON-loadable reporter settings with fail-fast validation.

pub mod settings;

pub use settings::*;
