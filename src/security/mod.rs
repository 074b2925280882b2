//! Payload scrubbing.
//!
//! Redacts sensitive fields and query-string parameters before a payload is
//! encoded.

pub mod scrubber;

pub use scrubber::*;
