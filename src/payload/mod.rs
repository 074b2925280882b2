//! Wire payload assembly.

pub mod serializer;

pub use serializer::*;
