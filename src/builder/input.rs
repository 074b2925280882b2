//! What the host hands to a report call.

use serde_json::{Map, Value};

use crate::frames::{ErrorWrapper, Exception, Throwable};
use crate::model::{Request, TelemetryEvent};

/// The thing being reported.
#[derive(Clone, Copy)]
pub enum ToLog<'a> {
    Text(&'a str),
    WrappedError(&'a ErrorWrapper),
    Throwable(&'a dyn Throwable),
}

impl<'a> ToLog<'a> {
    /// Wrapped errors count as throwables for custom-data merging.
    pub fn is_throwable(&self) -> bool {
        !matches!(self, ToLog::Text(_))
    }

    pub fn kind(&self) -> &'static str {
        match self {
            ToLog::Text(_) => "message",
            ToLog::WrappedError(_) => "error",
            ToLog::Throwable(_) => "exception",
        }
    }

    /// Short description used in diagnostics.
    pub fn describe(&self) -> String {
        match self {
            ToLog::Text(text) => (*text).to_string(),
            ToLog::WrappedError(error) => format!("error {}: {}", error.code, error.message),
            ToLog::Throwable(exception) => {
                format!("{}: {}", exception.class_name(), exception.message())
            }
        }
    }
}

impl<'a> From<&'a str> for ToLog<'a> {
    fn from(text: &'a str) -> Self {
        ToLog::Text(text)
    }
}

impl<'a> From<&'a String> for ToLog<'a> {
    fn from(text: &'a String) -> Self {
        ToLog::Text(text.as_str())
    }
}

impl<'a> From<&'a ErrorWrapper> for ToLog<'a> {
    fn from(error: &'a ErrorWrapper) -> Self {
        ToLog::WrappedError(error)
    }
}

impl<'a> From<&'a Exception> for ToLog<'a> {
    fn from(exception: &'a Exception) -> Self {
        ToLog::Throwable(exception)
    }
}

/// Per-call context.
#[derive(Debug, Clone, Default)]
pub struct ReportContext {
    /// Free-form key/values: message extras for text, merged into `custom` otherwise.
    pub extra: Map<String, Value>,
    pub request: Option<Request>,
    pub telemetry: Vec<TelemetryEvent>,
    /// Short label for where the report came from (`controller#action`).
    pub label: Option<String>,
}

impl ReportContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_extra(mut self, key: impl Into<String>, value: Value) -> Self {
        self.extra.insert(key.into(), value);
        self
    }

    pub fn with_request(mut self, request: Request) -> Self {
        self.request = Some(request);
        self
    }

    pub fn with_telemetry(mut self, telemetry: Vec<TelemetryEvent>) -> Self {
        self.telemetry = telemetry;
        self
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }
}
