//! Source-line lookup for frame code context.
//!
//! A missing or unreadable file is never an error here: the frame simply goes
//! out without `code`/`context`.

use std::collections::HashMap;
use std::fs;
use std::io;

use crate::model::Context;

/// Lines shown before and after the frame's line.
pub const CONTEXT_LINES: usize = 6;

/// Reads a source file as a sequence of lines.
pub trait SourceReader: Send + Sync {
    fn read_lines(&self, path: &str) -> io::Result<Vec<String>>;
}

/// Reads straight from the local filesystem.
#[derive(Debug, Default, Clone, Copy)]
pub struct FsSourceReader;

impl SourceReader for FsSourceReader {
    fn read_lines(&self, path: &str) -> io::Result<Vec<String>> {
        let content = fs::read_to_string(path)?;
        Ok(content.lines().map(|l| l.to_string()).collect())
    }
}

/// Per-normalization cache so a file shared by many frames is read once.
pub(crate) struct SourceCache<'r> {
    reader: &'r dyn SourceReader,
    files: HashMap<String, Option<Vec<String>>>,
}

impl<'r> SourceCache<'r> {
    pub(crate) fn new(reader: &'r dyn SourceReader) -> Self {
        Self {
            reader,
            files: HashMap::new(),
        }
    }

    pub(crate) fn lines(&mut self, path: &str) -> Option<&[String]> {
        let reader = self.reader;
        self.files
            .entry(path.to_string())
            .or_insert_with(|| match reader.read_lines(path) {
                Ok(lines) => Some(lines),
                Err(e) => {
                    log::debug!("SOURCE_UNAVAILABLE path={} error={}", path, e);
                    None
                }
            })
            .as_deref()
    }
}

/// The source line for `lineno` (1-based) and the lines around it.
///
/// Returns `(None, None)` when the line lies outside the file.
pub fn code_context(lines: &[String], lineno: u32) -> (Option<String>, Option<Context>) {
    // Line 0 means the line is unknown.
    let Some(index) = (lineno as usize).checked_sub(1) else {
        return (None, None);
    };
    let Some(code) = lines.get(index) else {
        return (None, None);
    };

    let start = index.saturating_sub(CONTEXT_LINES);
    let end = (index + 1 + CONTEXT_LINES).min(lines.len());
    let context = Context {
        pre: lines[start..index].to_vec(),
        post: lines[index + 1..end].to_vec(),
    };

    let context = if context.is_empty() { None } else { Some(context) };
    (Some(code.clone()), context)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn numbered(n: usize) -> Vec<String> {
        (1..=n).map(|i| format!("line {}", i)).collect()
    }

    #[test]
    fn test_context_in_middle_of_file() {
        let lines = numbered(20);
        let (code, context) = code_context(&lines, 10);
        let context = context.unwrap();

        assert_eq!(code.as_deref(), Some("line 10"));
        assert_eq!(context.pre, numbered(9)[3..].to_vec());
        assert_eq!(context.pre.len(), 6);
        assert_eq!(context.post.first().map(String::as_str), Some("line 11"));
        assert_eq!(context.post.len(), 6);
    }

    #[test]
    fn test_context_clamped_to_file_bounds() {
        let lines = numbered(3);
        let (code, context) = code_context(&lines, 1);
        let context = context.unwrap();

        assert_eq!(code.as_deref(), Some("line 1"));
        assert!(context.pre.is_empty());
        assert_eq!(context.post, vec!["line 2", "line 3"]);
    }

    #[test]
    fn test_line_past_end_of_file() {
        let lines = numbered(3);
        assert_eq!(code_context(&lines, 9), (None, None));
    }

    #[test]
    fn test_unknown_line_has_no_context() {
        let lines = numbered(10);
        assert_eq!(code_context(&lines, 0), (None, None));
    }

    #[test]
    fn test_single_line_file_has_no_context() {
        let lines = numbered(1);
        let (code, context) = code_context(&lines, 1);
        assert_eq!(code.as_deref(), Some("line 1"));
        assert!(context.is_none());
    }

    #[test]
    fn test_fs_reader_and_cache() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "fn main() {{").unwrap();
        writeln!(file, "    panic!();").unwrap();
        writeln!(file, "}}").unwrap();
        let path = file.path().to_string_lossy().to_string();

        let reader = FsSourceReader;
        let mut cache = SourceCache::new(&reader);
        assert_eq!(cache.lines(&path).map(|l| l.len()), Some(3));
        assert!(cache.lines("/definitely/not/here.rs").is_none());
    }
}
