//! Stack frame and trace normalization.
//!
//! Turns captured stacks, exceptions and wrapped errors into the frame
//! ordering the collection API expects:
//! - oldest call first
//! - optional method shift (`<main>` on the outermost frame)
//! - optional source code context
//! - cause chains walked with a cycle guard

pub mod capture;
pub mod normalize;
pub mod source;
pub mod throwable;
pub mod trace;

pub use capture::*;
pub use normalize::*;
pub use source::*;
pub use throwable::*;
pub use trace::*;
