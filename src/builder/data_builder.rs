//! Record assembly.
//!
//! `make_data` dispatches on what is being reported, resolves the level,
//! gathers person/custom/server data and produces one [`Record`].
//!
//! Failure policy:
//! - person lookup and custom-data callbacks are logged and skipped
//! - fingerprint and title callbacks propagate their error to the caller

use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

use chrono::Utc;
use serde_json::{Map, Value};
use uuid::Uuid;

use crate::config::{LevelDefaults, ReporterConfig};
use crate::error::{ConfigError, ReportError};
use crate::frames::{
    capture_raw_frames, error_trace, exception_body, normalize_frames, FrameOptions,
    FsSourceReader, SourceReader,
};
use crate::logging::LogContext;
use crate::model::{
    Body, BodyContent, Level, Message, Notifier, Person, PsrLevel, Record, Server, LANGUAGE,
};

use super::error_codes::ErrorCodeTable;
use super::input::{ReportContext, ToLog};

pub type PersonFn = Arc<dyn Fn() -> anyhow::Result<Option<Map<String, Value>>> + Send + Sync>;
pub type LabelFn =
    Arc<dyn Fn(&ToLog<'_>, &ReportContext) -> anyhow::Result<Option<String>> + Send + Sync>;
pub type CustomDataFn =
    Arc<dyn Fn(&ToLog<'_>, &Map<String, Value>) -> anyhow::Result<Map<String, Value>> + Send + Sync>;

pub struct DataBuilder {
    environment: String,
    server: Server,
    framework: Option<String>,
    code_version: Option<String>,
    notifier: Notifier,

    person: Option<Person>,
    person_fn: Option<PersonFn>,
    custom: Map<String, Value>,
    custom_data_fn: Option<CustomDataFn>,
    fingerprint_fn: Option<LabelFn>,
    title_fn: Option<LabelFn>,

    levels: LevelDefaults,
    error_codes: ErrorCodeTable,

    include_error_code_context: bool,
    include_exception_code_context: bool,
    shift_function: bool,
    capture_error_stacktrace: bool,
    send_message_trace: bool,
    local_vars_dump: bool,
    max_chain_depth: usize,
    source_reader: Arc<dyn SourceReader>,
}

impl DataBuilder {
    pub fn new(config: &ReporterConfig) -> Result<Self, ConfigError> {
        config.validate()?;

        let server = Server {
            host: config.host.clone().or_else(detect_host),
            root: config.root.clone().or_else(|| {
                std::env::current_dir()
                    .ok()
                    .map(|dir| dir.display().to_string())
            }),
            branch: config.branch.clone(),
            code_version: config.code_version.clone(),
            extra: Map::new(),
        };

        Ok(Self {
            environment: config.environment.clone(),
            server,
            framework: config.framework.clone(),
            code_version: config.code_version.clone(),
            notifier: Notifier::default(),
            person: config.person(),
            person_fn: None,
            custom: config.custom.clone(),
            custom_data_fn: None,
            fingerprint_fn: None,
            title_fn: None,
            levels: config.levels,
            error_codes: ErrorCodeTable::with_overrides(&config.error_codes),
            include_error_code_context: config.include_error_code_context,
            include_exception_code_context: config.include_exception_code_context,
            shift_function: config.shift_function,
            capture_error_stacktrace: config.capture_error_stacktrace,
            send_message_trace: config.send_message_trace,
            local_vars_dump: config.local_vars_dump,
            max_chain_depth: config.max_chain_depth,
            source_reader: Arc::new(FsSourceReader),
        })
    }

    pub fn with_person_fn<F>(mut self, f: F) -> Self
    where
        F: Fn() -> anyhow::Result<Option<Map<String, Value>>> + Send + Sync + 'static,
    {
        self.person_fn = Some(Arc::new(f));
        self
    }

    pub fn with_custom_data_fn<F>(mut self, f: F) -> Self
    where
        F: Fn(&ToLog<'_>, &Map<String, Value>) -> anyhow::Result<Map<String, Value>>
            + Send
            + Sync
            + 'static,
    {
        self.custom_data_fn = Some(Arc::new(f));
        self
    }

    pub fn with_fingerprint_fn<F>(mut self, f: F) -> Self
    where
        F: Fn(&ToLog<'_>, &ReportContext) -> anyhow::Result<Option<String>> + Send + Sync + 'static,
    {
        self.fingerprint_fn = Some(Arc::new(f));
        self
    }

    pub fn with_title_fn<F>(mut self, f: F) -> Self
    where
        F: Fn(&ToLog<'_>, &ReportContext) -> anyhow::Result<Option<String>> + Send + Sync + 'static,
    {
        self.title_fn = Some(Arc::new(f));
        self
    }

    pub fn with_source_reader(mut self, reader: Arc<dyn SourceReader>) -> Self {
        self.source_reader = reader;
        self
    }

    pub fn with_server_extra(mut self, key: impl Into<String>, value: Value) -> Self {
        self.server.extra.insert(key.into(), value);
        self
    }

    pub fn error_codes(&self) -> &ErrorCodeTable {
        &self.error_codes
    }

    /// Build the record for one report call.
    pub fn make_data(
        &self,
        level: Option<PsrLevel>,
        to_log: ToLog<'_>,
        context: &ReportContext,
    ) -> Result<Record, ReportError> {
        let uuid = Uuid::new_v4().to_string();
        let level = self.resolve_level(level, &to_log);
        let ctx = LogContext::new(&uuid).with_level(level);

        let content = self.make_body(&to_log, context, &ctx);
        crate::log_debug!(ctx, "RECORD_BODY_BUILT", kind = content.kind());

        let mut body = Body::new(content);
        if !context.telemetry.is_empty() {
            body.telemetry = Some(context.telemetry.clone());
        }

        let custom = self.resolve_custom(&to_log, context, &ctx);
        let person = self.resolve_person(&ctx);

        let fingerprint = match &self.fingerprint_fn {
            Some(f) => f(&to_log, context).map_err(|e| ReportError::callback("fingerprint", e))?,
            None => None,
        };
        let title = match &self.title_fn {
            Some(f) => f(&to_log, context).map_err(|e| ReportError::callback("title", e))?,
            None => None,
        };

        Ok(Record {
            environment: self.environment.clone(),
            body,
            level,
            timestamp: Utc::now().timestamp(),
            code_version: self.code_version.clone(),
            platform: Some(std::env::consts::OS.to_string()),
            language: LANGUAGE.to_string(),
            framework: self.framework.clone(),
            context: context.label.clone(),
            request: context.request.clone(),
            person,
            server: if self.server.is_empty() {
                None
            } else {
                Some(self.server.clone())
            },
            custom,
            fingerprint,
            title,
            uuid,
            notifier: self.notifier.clone(),
        })
    }

    /// Explicit level wins; otherwise the default for the kind of report.
    pub fn resolve_level(&self, level: Option<PsrLevel>, to_log: &ToLog<'_>) -> Level {
        if let Some(level) = level {
            return Level::from(level);
        }
        match to_log {
            ToLog::Text(_) => self.levels.message,
            ToLog::Throwable(_) => self.levels.exception,
            ToLog::WrappedError(error) => self
                .error_codes
                .level_for(error.code)
                .unwrap_or(self.levels.error),
        }
    }

    fn frame_options(&self, include_context: bool) -> FrameOptions {
        FrameOptions {
            include_context,
            shift_function: self.shift_function,
            local_vars: self.local_vars_dump,
        }
    }

    fn make_body(&self, to_log: &ToLog<'_>, context: &ReportContext, ctx: &LogContext) -> BodyContent {
        let reader = self.source_reader.as_ref();
        match *to_log {
            ToLog::Text(text) => {
                let mut message = Message::new(text);
                let skipped = message.extend_extra(&context.extra);
                if !skipped.is_empty() {
                    crate::log_debug!(ctx, "MESSAGE_EXTRA_SKIPPED", keys = skipped);
                }
                if self.send_message_trace {
                    let raw = capture_raw_frames();
                    message.backtrace = Some(normalize_frames(&raw, self.frame_options(false), reader));
                }
                BodyContent::Message(message)
            }
            ToLog::WrappedError(error) => {
                let class = self.error_codes.class_for(error.code);
                BodyContent::Trace(error_trace(
                    error,
                    &class,
                    self.capture_error_stacktrace,
                    self.frame_options(self.include_error_code_context),
                    reader,
                ))
            }
            ToLog::Throwable(exception) => exception_body(
                exception,
                self.frame_options(self.include_exception_code_context),
                reader,
                self.max_chain_depth,
                ctx,
            ),
        }
    }

    /// Configured custom data, then the custom-data callback, then (for
    /// throwables only) the call context, later sources winning on collision.
    fn resolve_custom(
        &self,
        to_log: &ToLog<'_>,
        context: &ReportContext,
        ctx: &LogContext,
    ) -> Map<String, Value> {
        let mut custom = self.custom.clone();

        if let Some(f) = &self.custom_data_fn {
            match f(to_log, &context.extra) {
                Ok(extra) => custom.extend(extra),
                Err(e) => crate::log_warn!(ctx, "CUSTOM_DATA_FAILED", error = e.to_string()),
            }
        }

        if to_log.is_throwable() {
            custom.extend(context.extra.clone());
        }

        custom
    }

    fn resolve_person(&self, ctx: &LogContext) -> Option<Person> {
        if let Some(person) = &self.person {
            return Some(person.clone());
        }
        let f = self.person_fn.as_ref()?;

        match panic::catch_unwind(AssertUnwindSafe(|| f())) {
            Ok(Ok(Some(map))) => {
                let person = Person::from_map(map);
                if person.is_none() {
                    crate::log_debug!(ctx, "PERSON_SKIPPED", reason = "missing id");
                }
                person
            }
            Ok(Ok(None)) => None,
            Ok(Err(e)) => {
                crate::log_warn!(ctx, "PERSON_LOOKUP_FAILED", error = e.to_string());
                None
            }
            Err(_) => {
                crate::log_warn!(ctx, "PERSON_LOOKUP_FAILED", error = "panic");
                None
            }
        }
    }
}

fn detect_host() -> Option<String> {
    std::env::var("HOSTNAME")
        .or_else(|_| std::env::var("COMPUTERNAME"))
        .ok()
        .filter(|h| !h.is_empty())
}
