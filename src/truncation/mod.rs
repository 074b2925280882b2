//! Payload size reduction.
//!
//! An [`EncodedPayload`] over the size ceiling is passed through an ordered list
//! of strategies until it fits or the list runs out.

pub mod encoded;
pub mod engine;
pub mod strategy;

pub use encoded::*;
pub use engine::*;
pub use strategy::*;
