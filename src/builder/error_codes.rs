//! Wrapped-error code table.
//!
//! Maps numeric error codes to a class label and a default level. The default
//! table can be overridden entry by entry from configuration.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::model::Level;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorCodeEntry {
    pub class: String,
    pub level: Level,
}

impl ErrorCodeEntry {
    pub fn new(class: &str, level: Level) -> Self {
        Self {
            class: class.to_string(),
            level,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ErrorCodeTable {
    entries: BTreeMap<i64, ErrorCodeEntry>,
}

impl Default for ErrorCodeTable {
    fn default() -> Self {
        let defaults = [
            (1, "FatalError", Level::Critical),
            (2, "Warning", Level::Warning),
            (4, "ParseError", Level::Critical),
            (8, "Notice", Level::Info),
            (16, "CoreError", Level::Critical),
            (32, "CoreWarning", Level::Warning),
            (64, "CompileError", Level::Critical),
            (128, "CompileWarning", Level::Warning),
            (256, "UserError", Level::Error),
            (512, "UserWarning", Level::Warning),
            (1024, "UserNotice", Level::Info),
            (2048, "Strict", Level::Info),
            (4096, "RecoverableError", Level::Error),
            (8192, "Deprecated", Level::Info),
            (16384, "UserDeprecated", Level::Info),
        ];

        Self {
            entries: defaults
                .into_iter()
                .map(|(code, class, level)| (code, ErrorCodeEntry::new(class, level)))
                .collect(),
        }
    }
}

impl ErrorCodeTable {
    /// Default table with `overrides` replacing or adding entries.
    pub fn with_overrides(overrides: &BTreeMap<i64, ErrorCodeEntry>) -> Self {
        let mut table = Self::default();
        for (code, entry) in overrides {
            table.entries.insert(*code, entry.clone());
        }
        table
    }

    pub fn lookup(&self, code: i64) -> Option<&ErrorCodeEntry> {
        self.entries.get(&code)
    }

    pub fn class_for(&self, code: i64) -> String {
        match self.lookup(code) {
            Some(entry) => entry.class.clone(),
            None => format!("Unknown error ({})", code),
        }
    }

    pub fn level_for(&self, code: i64) -> Option<Level> {
        self.lookup(code).map(|entry| entry.level)
    }
}
