//! Severity levels.
//!
//! The destination only understands five levels. Hosts speak the eight PSR-style
//! level names, which collapse onto those five through [`PsrLevel`].

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Reduced level set accepted by the collection API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", try_from = "String")]
pub enum Level {
    Critical,
    Error,
    Warning,
    Info,
    Debug,
}

impl Level {
    pub const ALL: [Level; 5] = [
        Level::Critical,
        Level::Error,
        Level::Warning,
        Level::Info,
        Level::Debug,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Level::Critical => "critical",
            Level::Error => "error",
            Level::Warning => "warning",
            Level::Info => "info",
            Level::Debug => "debug",
        }
    }

    /// Ordinal severity, larger is more severe.
    pub fn severity(&self) -> u32 {
        match self {
            Level::Critical => 100_000,
            Level::Error => 10_000,
            Level::Warning => 1_000,
            Level::Info => 100,
            Level::Debug => 10,
        }
    }
}

impl PartialOrd for Level {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Level {
    fn cmp(&self, other: &Self) -> Ordering {
        self.severity().cmp(&other.severity())
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Accepts both the reduced names and the PSR names (`notice` -> info, ...).
impl FromStr for Level {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.parse::<PsrLevel>().map(Level::from)
    }
}

impl TryFrom<String> for Level {
    type Error = String;

    fn try_from(value: String) -> Result<Self, String> {
        value.parse()
    }
}

/// Host-facing level names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PsrLevel {
    Emergency,
    Alert,
    Critical,
    Error,
    Warning,
    Notice,
    Info,
    Debug,
}

impl FromStr for PsrLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "emergency" => Ok(PsrLevel::Emergency),
            "alert" => Ok(PsrLevel::Alert),
            "critical" => Ok(PsrLevel::Critical),
            "error" => Ok(PsrLevel::Error),
            "warning" => Ok(PsrLevel::Warning),
            "notice" => Ok(PsrLevel::Notice),
            "info" => Ok(PsrLevel::Info),
            "debug" => Ok(PsrLevel::Debug),
            other => Err(format!("unknown level: {}", other)),
        }
    }
}

impl From<PsrLevel> for Level {
    fn from(level: PsrLevel) -> Self {
        match level {
            PsrLevel::Emergency | PsrLevel::Alert | PsrLevel::Critical => Level::Critical,
            PsrLevel::Error => Level::Error,
            PsrLevel::Warning => Level::Warning,
            PsrLevel::Notice | PsrLevel::Info => Level::Info,
            PsrLevel::Debug => Level::Debug,
        }
    }
}
