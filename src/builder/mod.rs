//! Record construction.
//!
//! Turns a message, wrapped error or exception plus per-call context into a
//! complete [`crate::model::Record`].

pub mod data_builder;
pub mod error_codes;
pub mod input;

pub use data_builder::*;
pub use error_codes::*;
pub use input::*;
