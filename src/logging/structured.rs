//! Structured logging utilities.
//!
//! Every diagnostic line carries the report uuid (and the level once it is
//! known) so a single report can be followed from build to hand-off.

use std::fmt;

use crate::model::Level;

/// Logging context for a single report.
#[derive(Debug, Clone)]
pub struct LogContext {
    pub report_id: String,
    pub level: Option<Level>,
}

impl LogContext {
    pub fn new(report_id: &str) -> Self {
        Self {
            report_id: report_id.to_string(),
            level: None,
        }
    }

    pub fn with_level(&self, level: Level) -> Self {
        Self {
            report_id: self.report_id.clone(),
            level: Some(level),
        }
    }
}

impl fmt::Display for LogContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.level {
            Some(level) => write!(f, "[report={}] [level={}]", self.report_id, level),
            None => write!(f, "[report={}]", self.report_id),
        }
    }
}

/// Render `key=value` pairs for the logging macros.
#[doc(hidden)]
pub fn render_fields(fields: &[(&str, String)]) -> String {
    fields
        .iter()
        .map(|(key, value)| format!("{}={}", key, value))
        .collect::<Vec<_>>()
        .join(" ")
}

/// Log an info message with context.
#[macro_export]
macro_rules! log_info {
    ($ctx:expr, $event:expr $(, $key:ident = $value:expr)* $(,)?) => {
        log::info!(
            "{} {} {}",
            $ctx,
            $event,
            $crate::logging::render_fields(&[$((stringify!($key), format!("{:?}", $value))),*])
        )
    };
}

/// Log a warning message with context.
#[macro_export]
macro_rules! log_warn {
    ($ctx:expr, $event:expr $(, $key:ident = $value:expr)* $(,)?) => {
        log::warn!(
            "{} {} {}",
            $ctx,
            $event,
            $crate::logging::render_fields(&[$((stringify!($key), format!("{:?}", $value))),*])
        )
    };
}

/// Log an error message with context.
#[macro_export]
macro_rules! log_error {
    ($ctx:expr, $event:expr $(, $key:ident = $value:expr)* $(,)?) => {
        log::error!(
            "{} {} {}",
            $ctx,
            $event,
            $crate::logging::render_fields(&[$((stringify!($key), format!("{:?}", $value))),*])
        )
    };
}

/// Log a debug message with context.
#[macro_export]
macro_rules! log_debug {
    ($ctx:expr, $event:expr $(, $key:ident = $value:expr)* $(,)?) => {
        log::debug!(
            "{} {} {}",
            $ctx,
            $event,
            $crate::logging::render_fields(&[$((stringify!($key), format!("{:?}", $value))),*])
        )
    };
}
