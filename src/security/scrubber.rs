//! Sensitive-field scrubbing for serialized payloads.
//!
//! Redacts values whose key matches a configured field name (case-insensitive)
//! or regex. Matching values are replaced wholesale by a fixed-length redaction
//! string, so the redacted length says nothing about the original.
//!
//! Rules, per key/value pair:
//! - the dotted path from the root (`request.POST.password`) in the safelist
//!   passes through untouched
//! - a matching key replaces the whole value, nested or not
//! - objects and arrays are walked with the extended path
//! - strings carrying a query string (`https://host/?token=...`, `a=1&b=2`) have
//!   their parameters scrubbed with the same rules and are spliced back

use std::collections::HashSet;

use regex::Regex;
use serde_json::{Map, Value};
use url::form_urlencoded;

use crate::config::ReporterConfig;
use crate::error::ConfigError;
use crate::logging::LogContext;

/// Length of every redaction.
pub const REDACTION_LENGTH: usize = 8;

/// Field names scrubbed when nothing else is configured.
pub const DEFAULT_SCRUB_FIELDS: &[&str] = &[
    "passwd",
    "password",
    "secret",
    "confirm_password",
    "password_confirmation",
    "auth_token",
    "csrf_token",
    "access_token",
];

/// Scrub counters.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct ScrubResult {
    pub fields_redacted: usize,
    pub query_strings_rewritten: usize,
}

#[derive(Debug, Clone)]
pub struct Scrubber {
    fields: HashSet<String>,
    patterns: Vec<Regex>,
    safelist: HashSet<String>,
    redaction: String,
}

impl Scrubber {
    pub fn new(
        fields: &[String],
        patterns: &[String],
        safelist: &[String],
        replacement: char,
    ) -> Result<Self, ConfigError> {
        let patterns = patterns
            .iter()
            .map(|p| {
                Regex::new(p).map_err(|source| ConfigError::InvalidScrubPattern {
                    pattern: p.clone(),
                    source,
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            fields: fields.iter().map(|f| f.to_lowercase()).collect(),
            patterns,
            safelist: safelist.iter().cloned().collect(),
            redaction: std::iter::repeat(replacement).take(REDACTION_LENGTH).collect(),
        })
    }

    pub fn from_config(config: &ReporterConfig) -> Result<Self, ConfigError> {
        Self::new(
            &config.scrub_fields,
            &config.scrub_patterns,
            &config.scrub_safelist,
            config.scrub_replacement,
        )
    }

    pub fn redaction(&self) -> &str {
        &self.redaction
    }

    /// Return a scrubbed copy of `data`.
    pub fn scrub(&self, data: &Value, ctx: &LogContext) -> (Value, ScrubResult) {
        let mut result = ScrubResult::default();
        let scrubbed = self.scrub_value(data, "", &mut result);

        if result.fields_redacted > 0 {
            crate::log_debug!(
                ctx,
                "SCRUB_COMPLETE",
                redacted = result.fields_redacted,
                query_strings = result.query_strings_rewritten,
            );
        }

        (scrubbed, result)
    }

    fn key_matches(&self, key: &str) -> bool {
        self.fields.contains(&key.to_lowercase()) || self.patterns.iter().any(|p| p.is_match(key))
    }

    fn scrub_value(&self, value: &Value, path: &str, result: &mut ScrubResult) -> Value {
        match value {
            Value::Object(obj) => Value::Object(self.scrub_object(obj, path, result)),
            Value::Array(items) => Value::Array(
                items
                    .iter()
                    .enumerate()
                    .map(|(i, item)| self.scrub_value(item, &join_path(path, &i.to_string()), result))
                    .collect(),
            ),
            Value::String(s) => Value::String(self.scrub_string(s, path, result)),
            _ => value.clone(),
        }
    }

    fn scrub_object(
        &self,
        obj: &Map<String, Value>,
        path: &str,
        result: &mut ScrubResult,
    ) -> Map<String, Value> {
        let mut scrubbed = Map::new();
        for (key, val) in obj {
            let current = join_path(path, key);
            let value = if self.safelist.contains(&current) {
                val.clone()
            } else if self.key_matches(key) {
                result.fields_redacted += 1;
                Value::String(self.redaction.clone())
            } else {
                self.scrub_value(val, &current, result)
            };
            scrubbed.insert(key.clone(), value);
        }
        scrubbed
    }

    /// Scrub parameters of an embedded query string. Strings with no matching
    /// parameter come back unchanged.
    fn scrub_string(&self, s: &str, path: &str, result: &mut ScrubResult) -> String {
        let Some(parts) = QueryParts::split(s) else {
            return s.to_string();
        };

        let mut redacted = 0;
        let segments: Vec<String> = parts
            .query
            .split('&')
            .map(|segment| {
                let Some((key, _)) = form_urlencoded::parse(segment.as_bytes()).next() else {
                    return segment.to_string();
                };
                let current = join_path(path, &key);
                if self.safelist.contains(&current) || !self.key_matches(&key) {
                    return segment.to_string();
                }
                redacted += 1;
                // Only the value changes; the key keeps its original encoding.
                let raw_key = segment.split_once('=').map_or(segment, |(k, _)| k);
                let value: String = form_urlencoded::byte_serialize(self.redaction.as_bytes()).collect();
                format!("{}={}", raw_key, value)
            })
            .collect();

        if redacted == 0 {
            return s.to_string();
        }
        result.fields_redacted += redacted;
        result.query_strings_rewritten += 1;

        let query = segments.join("&");
        match parts.fragment {
            Some(fragment) => format!("{}{}#{}", parts.prefix, query, fragment),
            None => format!("{}{}", parts.prefix, query),
        }
    }
}

fn join_path(path: &str, key: &str) -> String {
    if path.is_empty() {
        key.to_string()
    } else {
        format!("{}.{}", path, key)
    }
}

/// A string split around its query string.
struct QueryParts<'a> {
    /// Everything up to and including `?` (empty for a bare query string).
    prefix: &'a str,
    query: &'a str,
    fragment: Option<&'a str>,
}

impl<'a> QueryParts<'a> {
    fn split(s: &'a str) -> Option<Self> {
        let (prefix, rest) = match s.find('?') {
            Some(idx) => s.split_at(idx + 1),
            None if looks_like_query(s) => ("", s),
            None => return None,
        };

        let (query, fragment) = match rest.split_once('#') {
            Some((query, fragment)) => (query, Some(fragment)),
            None => (rest, None),
        };

        if query.contains('=') {
            Some(Self {
                prefix,
                query,
                fragment,
            })
        } else {
            None
        }
    }
}

/// `key=value` pairs joined by `&`, no whitespace.
fn looks_like_query(s: &str) -> bool {
    !s.is_empty()
        && !s.chars().any(char::is_whitespace)
        && s.split('&').all(|pair| {
            pair.split_once('=')
                .map(|(key, _)| !key.is_empty())
                .unwrap_or(false)
        })
}
