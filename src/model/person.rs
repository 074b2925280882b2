//! The identified user affected by a report.

use serde::Serialize;
use serde_json::{Map, Value};

/// `id` is required; everything else is optional and extra keys are merged at
/// the top level on serialization.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Person {
    pub id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Person {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            username: None,
            email: None,
            extra: Map::new(),
        }
    }

    /// Build a person from a loose map.
    ///
    /// Returns `None` when `id` is missing, null or empty. Numeric ids are
    /// accepted and stringified.
    pub fn from_map(mut map: Map<String, Value>) -> Option<Self> {
        let id = match map.remove("id")? {
            Value::String(s) if !s.is_empty() => s,
            Value::Number(n) => n.to_string(),
            _ => return None,
        };
        let username = take_string(&mut map, "username");
        let email = take_string(&mut map, "email");

        Some(Self {
            id,
            username,
            email,
            extra: map,
        })
    }
}

fn take_string(map: &mut Map<String, Value>, key: &str) -> Option<String> {
    match map.remove(key) {
        Some(Value::String(s)) => Some(s),
        Some(Value::Null) | None => None,
        Some(other) => Some(other.to_string()),
    }
}
