//! Structured logging with report context.
//!
//! Provides the logger bootstrap plus macros that prefix every line with the
//! report uuid for easy correlation.

pub mod structured;

pub use structured::*;

/// Install the `env_logger` backend. Safe to call more than once.
pub fn init_logger() {
    let _ = env_logger::builder()
        .filter_level(log::LevelFilter::Info)
        .format_timestamp_millis()
        .try_init();
}
