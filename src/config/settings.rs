//! Reporter configuration.
//!
//! Everything here is plain data that can be loaded from JSON. Host callables
//! (person provider, fingerprint, title, ignore filter, custom truncation) are
//! attached to the [`crate::pipeline::Reporter`] and [`crate::builder::DataBuilder`]
//! directly.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use lazy_static::lazy_static;
use regex::Regex;
use serde::Deserialize;
use serde_json::{Map, Value};

use crate::builder::ErrorCodeEntry;
use crate::error::ConfigError;
use crate::frames::MAX_CHAIN_DEPTH;
use crate::model::{Level, Person};
use crate::security::DEFAULT_SCRUB_FIELDS;
use crate::truncation::{
    FRAMES_OPTIMIZATION_RANGE, MAX_PAYLOAD_SIZE, TELEMETRY_OPTIMIZATION_RANGE,
};

/// Prefix for environment overrides.
pub const ENV_PREFIX: &str = "FAULTWIRE_";

lazy_static! {
    static ref ACCESS_TOKEN_PATTERN: Regex = Regex::new(r"^[A-Za-z0-9]{32}$").unwrap();
}

/// Levels used when the caller does not pass one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct LevelDefaults {
    pub message: Level,
    pub exception: Level,
    pub error: Level,
}

impl Default for LevelDefaults {
    fn default() -> Self {
        Self {
            message: Level::Warning,
            exception: Level::Error,
            error: Level::Error,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ReporterConfig {
    pub access_token: String,
    pub environment: String,

    // Server description
    pub host: Option<String>,
    pub root: Option<String>,
    pub branch: Option<String>,
    pub code_version: Option<String>,
    pub framework: Option<String>,

    /// Explicit person; must contain `id`.
    pub person: Option<Map<String, Value>>,
    pub custom: Map<String, Value>,

    // Scrubbing
    pub scrub_fields: Vec<String>,
    pub scrub_patterns: Vec<String>,
    pub scrub_safelist: Vec<String>,
    pub scrub_replacement: char,

    // Frames
    pub include_error_code_context: bool,
    pub include_exception_code_context: bool,
    pub shift_function: bool,
    pub capture_error_stacktrace: bool,
    pub send_message_trace: bool,
    pub local_vars_dump: bool,
    pub max_chain_depth: usize,

    // Filtering
    pub minimum_level: Option<Level>,
    /// Bitmask of wrapped-error codes to report; `None` reports all.
    pub included_errno: Option<i64>,

    // Truncation
    pub max_payload_size: usize,
    pub frames_range: usize,
    pub telemetry_range: usize,

    pub levels: LevelDefaults,
    /// Merged over the default error-code table.
    pub error_codes: BTreeMap<i64, ErrorCodeEntry>,
}

impl Default for ReporterConfig {
    fn default() -> Self {
        Self {
            access_token: String::new(),
            environment: "production".to_string(),
            host: None,
            root: None,
            branch: None,
            code_version: None,
            framework: None,
            person: None,
            custom: Map::new(),
            scrub_fields: DEFAULT_SCRUB_FIELDS.iter().map(|f| f.to_string()).collect(),
            scrub_patterns: Vec::new(),
            scrub_safelist: Vec::new(),
            scrub_replacement: '*',
            include_error_code_context: false,
            include_exception_code_context: false,
            shift_function: true,
            capture_error_stacktrace: true,
            send_message_trace: false,
            local_vars_dump: false,
            max_chain_depth: MAX_CHAIN_DEPTH,
            minimum_level: None,
            included_errno: None,
            max_payload_size: MAX_PAYLOAD_SIZE,
            frames_range: FRAMES_OPTIMIZATION_RANGE,
            telemetry_range: TELEMETRY_OPTIMIZATION_RANGE,
            levels: LevelDefaults::default(),
            error_codes: BTreeMap::new(),
        }
    }
}

impl ReporterConfig {
    pub fn new(access_token: impl Into<String>) -> Self {
        Self {
            access_token: access_token.into(),
            ..Default::default()
        }
    }

    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: ReporterConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path.as_ref())?;
        log::info!(
            "CONFIG_LOADED path={} bytes={}",
            path.as_ref().display(),
            content.len()
        );
        Self::from_json_str(&content)
    }

    /// Apply `FAULTWIRE_ACCESS_TOKEN`, `FAULTWIRE_ENVIRONMENT` and
    /// `FAULTWIRE_CODE_VERSION` when set.
    pub fn apply_env_overrides(self) -> Self {
        self.apply_overrides(|key| std::env::var(format!("{}{}", ENV_PREFIX, key)).ok())
    }

    fn apply_overrides(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(token) = lookup("ACCESS_TOKEN") {
            self.access_token = token;
        }
        if let Some(environment) = lookup("ENVIRONMENT") {
            self.environment = environment;
        }
        if let Some(code_version) = lookup("CODE_VERSION") {
            self.code_version = Some(code_version);
        }
        self
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !ACCESS_TOKEN_PATTERN.is_match(&self.access_token) {
            return Err(ConfigError::InvalidAccessToken);
        }
        if let Some(person) = &self.person {
            if Person::from_map(person.clone()).is_none() {
                return Err(ConfigError::MissingPersonId);
            }
        }
        for pattern in &self.scrub_patterns {
            Regex::new(pattern).map_err(|source| ConfigError::InvalidScrubPattern {
                pattern: pattern.clone(),
                source,
            })?;
        }
        if self.max_payload_size == 0 {
            return Err(ConfigError::Validation(
                "max_payload_size must be positive".to_string(),
            ));
        }
        if self.frames_range == 0 || self.telemetry_range == 0 {
            return Err(ConfigError::Validation(
                "truncation ranges must be positive".to_string(),
            ));
        }
        if self.max_chain_depth == 0 {
            return Err(ConfigError::Validation(
                "max_chain_depth must be positive".to_string(),
            ));
        }
        Ok(())
    }

    /// The configured person, if valid.
    pub fn person(&self) -> Option<Person> {
        self.person.clone().and_then(Person::from_map)
    }
}
