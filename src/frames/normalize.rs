//! Raw stack frames into API-ordered frames.
//!
//! Raw traces arrive most-recent-call-first. The API wants the oldest call
//! first, and (optionally) each frame's method naming the call made *from* that
//! frame rather than the function it sits in.

use serde_json::{Map, Value};

use crate::model::{Frame, INTERNAL_FILENAME, MAIN_METHOD};

use super::source::{code_context, SourceCache, SourceReader};

/// One frame as captured, before normalization.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawFrame {
    pub file: Option<String>,
    pub line: Option<u32>,
    pub function: Option<String>,
    pub args: Option<Vec<Value>>,
    pub kwargs: Option<Map<String, Value>>,
}

impl RawFrame {
    pub fn new(file: impl Into<String>, line: u32, function: impl Into<String>) -> Self {
        Self {
            file: Some(file.into()),
            line: Some(line),
            function: Some(function.into()),
            ..Default::default()
        }
    }

    /// A frame that only knows where it is.
    pub fn location(file: Option<&str>, line: Option<u32>) -> Self {
        Self {
            file: file.map(|f| f.to_string()),
            line,
            ..Default::default()
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameOptions {
    pub include_context: bool,
    pub shift_function: bool,
    pub local_vars: bool,
}

impl Default for FrameOptions {
    fn default() -> Self {
        Self {
            include_context: false,
            shift_function: true,
            local_vars: false,
        }
    }
}

/// Normalize a most-recent-first raw trace into oldest-first frames.
pub fn normalize_frames(
    raw: &[RawFrame],
    options: FrameOptions,
    reader: &dyn SourceReader,
) -> Vec<Frame> {
    let mut cache = SourceCache::new(reader);
    let mut frames: Vec<Frame> = raw
        .iter()
        .map(|r| build_frame(r, options, &mut cache))
        .collect();

    frames.reverse();

    if options.shift_function && !frames.is_empty() {
        for i in (1..frames.len()).rev() {
            frames[i].method = frames[i - 1].method.take();
        }
        frames[0].method = Some(MAIN_METHOD.to_string());
    }

    frames
}

fn build_frame(raw: &RawFrame, options: FrameOptions, cache: &mut SourceCache<'_>) -> Frame {
    let filename = raw
        .file
        .clone()
        .unwrap_or_else(|| INTERNAL_FILENAME.to_string());
    let lineno = raw.line.unwrap_or(0);

    let mut frame = Frame::new(filename)
        .with_lineno(lineno)
        .with_method(raw.function.clone());

    if options.local_vars {
        frame.args = raw.args.clone();
        frame.kwargs = raw.kwargs.clone();
    }

    if options.include_context {
        if let Some(file) = raw.file.as_deref() {
            if let Some(lines) = cache.lines(file) {
                let (code, context) = code_context(lines, lineno);
                frame.code = code;
                frame.context = context;
            }
        }
    }

    frame
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frames::source::FsSourceReader;
    use serde_json::json;
    use std::io;

    struct FakeReader;

    impl SourceReader for FakeReader {
        fn read_lines(&self, path: &str) -> io::Result<Vec<String>> {
            match path {
                "src/app.rs" => Ok((1..=10).map(|i| format!("app {}", i)).collect()),
                _ => Err(io::Error::new(io::ErrorKind::NotFound, "missing")),
            }
        }
    }

    fn methods(frames: &[Frame]) -> Vec<Option<&str>> {
        frames.iter().map(|f| f.method.as_deref()).collect()
    }

    #[test]
    fn test_shift_and_reverse() {
        // Most recent first: C was called by B, B by A.
        let raw = vec![
            RawFrame::new("c.rs", 3, "C"),
            RawFrame::new("b.rs", 2, "B"),
            RawFrame::new("a.rs", 1, "A"),
        ];

        let frames = normalize_frames(&raw, FrameOptions::default(), &FsSourceReader);

        assert_eq!(
            frames.iter().map(|f| f.filename.as_str()).collect::<Vec<_>>(),
            vec!["a.rs", "b.rs", "c.rs"]
        );
        assert_eq!(methods(&frames), vec![Some("<main>"), Some("A"), Some("B")]);
    }

    #[test]
    fn test_reverse_without_shift() {
        let raw = vec![RawFrame::new("b.rs", 2, "B"), RawFrame::new("a.rs", 1, "A")];
        let options = FrameOptions {
            shift_function: false,
            ..Default::default()
        };

        let frames = normalize_frames(&raw, options, &FsSourceReader);
        assert_eq!(methods(&frames), vec![Some("A"), Some("B")]);
    }

    #[test]
    fn test_missing_fields_fall_back() {
        let frames = normalize_frames(
            &[RawFrame::default()],
            FrameOptions {
                shift_function: false,
                ..Default::default()
            },
            &FsSourceReader,
        );

        assert_eq!(frames[0].filename, "<internal>");
        assert_eq!(frames[0].lineno, 0);
        assert_eq!(frames[0].method, None);
    }

    #[test]
    fn test_empty_trace() {
        assert!(normalize_frames(&[], FrameOptions::default(), &FsSourceReader).is_empty());
    }

    #[test]
    fn test_code_context_attached_when_readable() {
        let raw = vec![
            RawFrame::new("src/app.rs", 5, "run"),
            RawFrame::new("src/gone.rs", 5, "main"),
        ];
        let options = FrameOptions {
            include_context: true,
            ..Default::default()
        };

        let frames = normalize_frames(&raw, options, &FakeReader);

        let gone = &frames[0];
        assert!(gone.code.is_none());
        assert!(gone.context.is_none());

        let app = &frames[1];
        assert_eq!(app.code.as_deref(), Some("app 5"));
        let context = app.context.as_ref().unwrap();
        assert_eq!(context.pre.len(), 4);
        assert_eq!(context.post.len(), 5);
    }

    #[test]
    fn test_unknown_line_skips_code_context() {
        let options = FrameOptions {
            include_context: true,
            ..Default::default()
        };

        let frames = normalize_frames(&[RawFrame::location(Some("src/app.rs"), None)], options, &FakeReader);

        assert_eq!(frames[0].lineno, 0);
        assert!(frames[0].code.is_none());
        assert!(frames[0].context.is_none());
    }

    #[test]
    fn test_locals_only_when_enabled() {
        let mut raw = RawFrame::new("a.rs", 1, "f");
        raw.args = Some(vec![json!(1), json!("two")]);

        let without = normalize_frames(&[raw.clone()], FrameOptions::default(), &FsSourceReader);
        assert!(without[0].args.is_none());

        let options = FrameOptions {
            local_vars: true,
            ..Default::default()
        };
        let with = normalize_frames(&[raw], options, &FsSourceReader);
        assert_eq!(with[0].args, Some(vec![json!(1), json!("two")]));
    }
}
