//! Send-or-drop decisions.
//!
//! Decides whether a built record is sent:
//! - below the configured minimum level
//! - wrapped error code outside the included mask
//! - vetoed by the host's ignore check

pub mod decision;

pub use decision::*;
