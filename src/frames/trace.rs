//! Trace and trace-chain construction from exceptions and wrapped errors.

use crate::logging::LogContext;
use crate::model::{BodyContent, ExceptionInfo, Trace, TraceChain};

use super::normalize::{normalize_frames, FrameOptions, RawFrame};
use super::source::SourceReader;
use super::throwable::{walk_chain, ErrorWrapper, Throwable};

/// Trace for one exception. The raise site is added as the most recent frame,
/// so it ends up last after normalization.
pub fn exception_trace(
    exception: &dyn Throwable,
    options: FrameOptions,
    reader: &dyn SourceReader,
) -> Trace {
    let mut raw = Vec::with_capacity(exception.trace().len() + 1);
    raw.push(RawFrame::location(exception.file(), exception.line()));
    raw.extend_from_slice(exception.trace());

    Trace {
        frames: normalize_frames(&raw, options, reader),
        exception: ExceptionInfo {
            class: exception.class_name().to_string(),
            message: exception.message().to_string(),
            description: exception.description().map(|d| d.to_string()),
        },
    }
}

/// A `Trace` body for a lone exception, a `TraceChain` when it has causes.
pub fn exception_body(
    exception: &dyn Throwable,
    options: FrameOptions,
    reader: &dyn SourceReader,
    max_depth: usize,
    ctx: &LogContext,
) -> BodyContent {
    let mut traces: Vec<Trace> = walk_chain(exception, max_depth, ctx)
        .into_iter()
        .map(|e| exception_trace(e, options, reader))
        .collect();

    if traces.len() <= 1 {
        match traces.pop() {
            Some(trace) => BodyContent::Trace(trace),
            // walk_chain always yields the root unless max_depth is zero
            None => BodyContent::Trace(exception_trace(exception, options, reader)),
        }
    } else {
        let first = traces.remove(0);
        BodyContent::TraceChain(TraceChain::new(first, traces))
    }
}

/// Trace for a wrapped error.
///
/// With `use_backtrace` the captured stack is used as-is (no synthetic raise
/// frame); otherwise the trace is the single error location.
pub fn error_trace(
    error: &ErrorWrapper,
    class: &str,
    use_backtrace: bool,
    options: FrameOptions,
    reader: &dyn SourceReader,
) -> Trace {
    let raw = if use_backtrace && !error.backtrace.is_empty() {
        error.backtrace.clone()
    } else {
        vec![RawFrame::location(error.file.as_deref(), error.line)]
    };

    Trace {
        frames: normalize_frames(&raw, options, reader),
        exception: ExceptionInfo {
            class: class.to_string(),
            message: error.message.clone(),
            description: None,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frames::source::FsSourceReader;
    use crate::frames::throwable::Exception;

    fn ctx() -> LogContext {
        LogContext::new("test")
    }

    #[test]
    fn test_raise_site_is_trailing_frame() {
        let exception = Exception::new("Boom", "bad")
            .at("src/raise.rs", 40)
            .with_trace(vec![
                RawFrame::new("src/caller.rs", 20, "handler"),
                RawFrame::new("src/main.rs", 5, "main"),
            ]);

        let trace = exception_trace(&exception, FrameOptions::default(), &FsSourceReader);

        let files: Vec<&str> = trace.frames.iter().map(|f| f.filename.as_str()).collect();
        assert_eq!(files, vec!["src/main.rs", "src/caller.rs", "src/raise.rs"]);
        let last = trace.frames.last().unwrap();
        assert_eq!(last.lineno, 40);
        assert_eq!(last.method.as_deref(), Some("handler"));
        assert_eq!(trace.exception.class, "Boom");
    }

    #[test]
    fn test_single_exception_is_plain_trace() {
        let exception = Exception::new("Solo", "x");
        let body = exception_body(&exception, FrameOptions::default(), &FsSourceReader, 32, &ctx());
        assert!(matches!(body, BodyContent::Trace(_)));
    }

    #[test]
    fn test_chained_exception_is_trace_chain() {
        let exception = Exception::new("Outer", "wrapped").with_previous(Exception::new("Inner", "cause"));
        let body = exception_body(&exception, FrameOptions::default(), &FsSourceReader, 32, &ctx());

        match body {
            BodyContent::TraceChain(chain) => {
                let classes: Vec<&str> = chain
                    .traces()
                    .iter()
                    .map(|t| t.exception.class.as_str())
                    .collect();
                assert_eq!(classes, vec!["Outer", "Inner"]);
            }
            other => panic!("expected trace chain, got {}", other.kind()),
        }
    }

    /// Two exceptions that name each other as the cause.
    struct Linked {
        class: &'static str,
        next: &'static Linked,
    }

    static FIRST: Linked = Linked { class: "First", next: &SECOND };
    static SECOND: Linked = Linked { class: "Second", next: &FIRST };

    impl Throwable for Linked {
        fn class_name(&self) -> &str {
            self.class
        }
        fn message(&self) -> &str {
            "linked"
        }
        fn file(&self) -> Option<&str> {
            None
        }
        fn line(&self) -> Option<u32> {
            None
        }
        fn trace(&self) -> &[RawFrame] {
            &[]
        }
        fn previous(&self) -> Option<&dyn Throwable> {
            Some(self.next)
        }
    }

    #[test]
    fn test_cyclic_chain_is_bounded() {
        let body = exception_body(&FIRST, FrameOptions::default(), &FsSourceReader, 32, &ctx());

        match body {
            BodyContent::TraceChain(chain) => {
                assert_eq!(chain.len(), 2);
                assert_eq!(chain.traces()[0].exception.class, "First");
                assert_eq!(chain.traces()[1].exception.class, "Second");
            }
            other => panic!("expected trace chain, got {}", other.kind()),
        }
    }

    #[test]
    fn test_error_trace_without_backtrace_uses_location() {
        let error = ErrorWrapper::new(2, "division by zero")
            .at("src/math.rs", 9)
            .with_backtrace(vec![RawFrame::new("src/other.rs", 1, "f")]);

        let options = FrameOptions {
            shift_function: false,
            ..Default::default()
        };
        let trace = error_trace(&error, "Warning", false, options, &FsSourceReader);
        assert_eq!(trace.frames.len(), 1);
        assert_eq!(trace.frames[0].filename, "src/math.rs");
        assert_eq!(trace.exception.class, "Warning");

        let trace = error_trace(&error, "Warning", true, options, &FsSourceReader);
        assert_eq!(trace.frames[0].filename, "src/other.rs");
    }
}
