//! Report orchestration.
//!
//! The [`Reporter`] service ties together:
//! - record assembly
//! - ignore decisions
//! - scrubbing and serialization
//! - truncation
//! - the transport [`Sender`]

pub mod reporter;
pub mod sender;

pub use reporter::*;
pub use sender::*;
