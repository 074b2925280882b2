//! Exceptions, wrapped errors and cause-chain walking.

use std::collections::HashSet;
use std::error::Error as StdError;

use crate::logging::LogContext;

use super::capture::capture_raw_frames;
use super::normalize::RawFrame;

/// Conservative bound on cause-chain length.
pub const MAX_CHAIN_DEPTH: usize = 32;

/// Anything that can be reported as an exception with a cause chain.
///
/// `previous` may point back into the chain; [`walk_chain`] guards against it.
pub trait Throwable {
    fn class_name(&self) -> &str;
    fn message(&self) -> &str;
    fn description(&self) -> Option<&str> {
        None
    }
    /// Where the exception was raised.
    fn file(&self) -> Option<&str>;
    fn line(&self) -> Option<u32>;
    /// Call stack above the raise site, most recent first.
    fn trace(&self) -> &[RawFrame];
    fn previous(&self) -> Option<&dyn Throwable>;
}

/// Owned exception value.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Exception {
    pub class: String,
    pub message: String,
    pub description: Option<String>,
    pub file: Option<String>,
    pub line: Option<u32>,
    pub trace: Vec<RawFrame>,
    pub previous: Option<Box<Exception>>,
}

impl Exception {
    pub fn new(class: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            class: class.into(),
            message: message.into(),
            ..Default::default()
        }
    }

    pub fn at(mut self, file: impl Into<String>, line: u32) -> Self {
        self.file = Some(file.into());
        self.line = Some(line);
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_trace(mut self, trace: Vec<RawFrame>) -> Self {
        self.trace = trace;
        self
    }

    pub fn with_previous(mut self, previous: Exception) -> Self {
        self.previous = Some(Box::new(previous));
        self
    }

    /// An exception raised at the caller, with the current stack as its trace.
    pub fn capture(class: impl Into<String>, message: impl Into<String>) -> Self {
        let mut trace = capture_raw_frames();
        let site = if trace.is_empty() {
            RawFrame::default()
        } else {
            trace.remove(0)
        };

        Self {
            class: class.into(),
            message: message.into(),
            file: site.file,
            line: site.line,
            trace,
            ..Default::default()
        }
    }

    /// Convert a Rust error and its `source()` chain.
    pub fn from_error(err: &(dyn StdError + 'static)) -> Self {
        let mut errors: Vec<&(dyn StdError + 'static)> = vec![err];
        let mut current = err.source();
        while let Some(source) = current {
            if errors.len() >= MAX_CHAIN_DEPTH {
                break;
            }
            errors.push(source);
            current = source.source();
        }

        errors
            .into_iter()
            .rev()
            .fold(None, |previous: Option<Exception>, e| {
                let mut exception = Exception::new(class_from_debug(e), e.to_string());
                exception.previous = previous.map(Box::new);
                Some(exception)
            })
            .unwrap_or_default()
    }
}

/// Best-effort type name from a `Debug` rendering (`ParseIntError { .. }` -> `ParseIntError`).
fn class_from_debug(err: &dyn StdError) -> String {
    let debug = format!("{:?}", err);
    let name: String = debug
        .chars()
        .take_while(|c| c.is_alphanumeric() || *c == '_' || *c == ':')
        .collect();
    if name.is_empty() {
        "Error".to_string()
    } else {
        name
    }
}

impl Throwable for Exception {
    fn class_name(&self) -> &str {
        &self.class
    }

    fn message(&self) -> &str {
        &self.message
    }

    fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    fn file(&self) -> Option<&str> {
        self.file.as_deref()
    }

    fn line(&self) -> Option<u32> {
        self.line
    }

    fn trace(&self) -> &[RawFrame] {
        &self.trace
    }

    fn previous(&self) -> Option<&dyn Throwable> {
        self.previous.as_deref().map(|p| p as &dyn Throwable)
    }
}

/// A non-exception runtime error identified by a numeric code.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ErrorWrapper {
    pub code: i64,
    pub message: String,
    pub file: Option<String>,
    pub line: Option<u32>,
    /// Stack captured at the error, most recent first.
    pub backtrace: Vec<RawFrame>,
}

impl ErrorWrapper {
    pub fn new(code: i64, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            ..Default::default()
        }
    }

    pub fn at(mut self, file: impl Into<String>, line: u32) -> Self {
        self.file = Some(file.into());
        self.line = Some(line);
        self
    }

    pub fn with_backtrace(mut self, backtrace: Vec<RawFrame>) -> Self {
        self.backtrace = backtrace;
        self
    }

    /// An error raised at the caller, with the current stack attached.
    pub fn capture(code: i64, message: impl Into<String>) -> Self {
        let backtrace = capture_raw_frames();
        let (file, line) = backtrace
            .first()
            .map(|f| (f.file.clone(), f.line))
            .unwrap_or((None, None));

        Self {
            code,
            message: message.into(),
            file,
            line,
            backtrace,
        }
    }
}

/// Collect `root` and its causes, outermost first.
///
/// Stops at the first node already visited or after `max_depth` nodes.
pub fn walk_chain<'a>(
    root: &'a dyn Throwable,
    max_depth: usize,
    ctx: &LogContext,
) -> Vec<&'a dyn Throwable> {
    let mut seen: HashSet<(*const (), String)> = HashSet::new();
    let mut chain: Vec<&'a dyn Throwable> = Vec::new();
    let mut current = Some(root);

    while let Some(exception) = current {
        let key = (
            exception as *const _ as *const (),
            exception.class_name().to_string(),
        );
        if !seen.insert(key) {
            crate::log_warn!(ctx, "TRACE_CHAIN_TRUNCATED", reason = "cycle", length = chain.len());
            break;
        }
        if chain.len() >= max_depth {
            crate::log_warn!(ctx, "TRACE_CHAIN_TRUNCATED", reason = "depth", length = chain.len());
            break;
        }
        chain.push(exception);
        current = exception.previous();
    }

    chain
}
