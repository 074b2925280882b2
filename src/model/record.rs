//! The reportable record.
//!
//! Built once per report call by the data builder and handed to the payload
//! serializer; it is not mutated afterwards.

use serde::Serialize;
use serde_json::{Map, Value};

use super::body::Body;
use super::level::Level;
use super::person::Person;
use super::request::{Request, Server};

pub const LANGUAGE: &str = "rust";

/// Library identification sent with every record.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Notifier {
    pub name: String,
    pub version: String,
}

impl Default for Notifier {
    fn default() -> Self {
        Self {
            name: env!("CARGO_PKG_NAME").to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Record {
    pub environment: String,
    pub body: Body,
    pub level: Level,
    /// Unix seconds.
    pub timestamp: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code_version: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub platform: Option<String>,
    pub language: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub framework: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub context: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request: Option<Request>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub person: Option<Person>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub server: Option<Server>,
    #[serde(skip_serializing_if = "Map::is_empty")]
    pub custom: Map<String, Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fingerprint: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    pub uuid: String,
    pub notifier: Notifier,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{BodyContent, Message};

    fn record() -> Record {
        Record {
            environment: "test".to_string(),
            body: Body::new(BodyContent::Message(Message::new("hi"))),
            level: Level::Info,
            timestamp: 1_700_000_000,
            code_version: None,
            platform: None,
            language: LANGUAGE.to_string(),
            framework: None,
            context: None,
            request: None,
            person: None,
            server: None,
            custom: Map::new(),
            fingerprint: None,
            title: None,
            uuid: "u-1".to_string(),
            notifier: Notifier::default(),
        }
    }

    #[test]
    fn test_absent_fields_are_omitted() {
        let value = serde_json::to_value(record()).unwrap();
        let obj = value.as_object().unwrap();

        for key in ["request", "person", "server", "custom", "fingerprint", "title"] {
            assert!(!obj.contains_key(key), "{} should be omitted", key);
        }
        assert_eq!(value["level"], "info");
        assert_eq!(value["language"], "rust");
        assert_eq!(value["notifier"]["name"], "faultwire-core");
    }
}
