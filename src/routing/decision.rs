//! Send-or-drop decision logic.
//!
//! Decides whether a built record goes on to serialization.

use std::sync::Arc;

use crate::builder::ToLog;
use crate::config::ReporterConfig;
use crate::logging::structured::LogContext;
use crate::model::{Level, Record};

/// Host veto over a built record. Returning `true` drops it.
pub trait CheckIgnore: Send + Sync {
    fn check_ignore(&self, to_log: &ToLog<'_>, record: &Record) -> bool;
}

impl<F> CheckIgnore for F
where
    F: Fn(&ToLog<'_>, &Record) -> bool + Send + Sync,
{
    fn check_ignore(&self, to_log: &ToLog<'_>, record: &Record) -> bool {
        self(to_log, record)
    }
}

/// Outcome for one record.
#[derive(Debug, Clone, PartialEq)]
pub enum IgnoreDecision {
    Send,
    BelowMinimumLevel(Level),
    ErrorCodeExcluded(i64),
    HostFilter,
}

impl IgnoreDecision {
    pub fn as_str(&self) -> &str {
        match self {
            IgnoreDecision::Send => "send",
            IgnoreDecision::BelowMinimumLevel(_) => "below_minimum_level",
            IgnoreDecision::ErrorCodeExcluded(_) => "error_code_excluded",
            IgnoreDecision::HostFilter => "host_filter",
        }
    }

    pub fn is_ignored(&self) -> bool {
        *self != IgnoreDecision::Send
    }
}

#[derive(Clone, Default)]
pub struct IgnoreFilter {
    minimum_level: Option<Level>,
    included_errno: Option<i64>,
    check: Option<Arc<dyn CheckIgnore>>,
}

impl IgnoreFilter {
    pub fn new(minimum_level: Option<Level>, included_errno: Option<i64>) -> Self {
        Self {
            minimum_level,
            included_errno,
            check: None,
        }
    }

    pub fn from_config(config: &ReporterConfig) -> Self {
        Self::new(config.minimum_level, config.included_errno)
    }

    pub fn with_check<C>(mut self, check: C) -> Self
    where
        C: CheckIgnore + 'static,
    {
        self.check = Some(Arc::new(check));
        self
    }

    /// Decide whether `record` should be sent.
    ///
    /// # Decision Tree
    /// 1. Level below `minimum_level` -> BelowMinimumLevel
    /// 2. Wrapped error whose code is outside the `included_errno` mask -> ErrorCodeExcluded
    /// 3. Host check returns true -> HostFilter
    /// 4. Otherwise -> Send
    pub fn should_ignore(
        &self,
        to_log: &ToLog<'_>,
        record: &Record,
        ctx: &LogContext,
    ) -> IgnoreDecision {
        if let Some(minimum) = self.minimum_level {
            if record.level < minimum {
                log::debug!(
                    "{} IGNORE_DECISION reason=level level={} minimum={}",
                    ctx,
                    record.level,
                    minimum
                );
                return IgnoreDecision::BelowMinimumLevel(record.level);
            }
        }

        if let (Some(mask), ToLog::WrappedError(error)) = (self.included_errno, to_log) {
            if error.code & mask != error.code {
                log::debug!(
                    "{} IGNORE_DECISION reason=errno code={} mask={}",
                    ctx,
                    error.code,
                    mask
                );
                return IgnoreDecision::ErrorCodeExcluded(error.code);
            }
        }

        if let Some(check) = &self.check {
            if check.check_ignore(to_log, record) {
                log::info!("{} IGNORE_DECISION reason=host_filter", ctx);
                return IgnoreDecision::HostFilter;
            }
        }

        IgnoreDecision::Send
    }
}
