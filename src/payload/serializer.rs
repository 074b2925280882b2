//! Record to wire tree.

use serde::Serialize;
use serde_json::{Map, Value};

use crate::config::ReporterConfig;
use crate::error::{ConfigError, ReportError};
use crate::logging::LogContext;
use crate::model::Record;
use crate::security::Scrubber;
use crate::truncation::EncodedPayload;

/// Top-level wire object.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Payload {
    pub access_token: String,
    pub data: Record,
}

impl Payload {
    pub fn new(access_token: impl Into<String>, data: Record) -> Self {
        Self {
            access_token: access_token.into(),
            data,
        }
    }
}

/// Serialize a record into the API's field layout.
pub fn serialize_record(record: &Record) -> Result<Value, serde_json::Error> {
    serde_json::to_value(record)
}

/// Serializes payloads and scrubs their `data` subtree before encoding.
#[derive(Debug, Clone)]
pub struct PayloadSerializer {
    scrubber: Scrubber,
}

impl PayloadSerializer {
    pub fn new(scrubber: Scrubber) -> Self {
        Self { scrubber }
    }

    pub fn from_config(config: &ReporterConfig) -> Result<Self, ConfigError> {
        Ok(Self::new(Scrubber::from_config(config)?))
    }

    pub fn scrubber(&self) -> &Scrubber {
        &self.scrubber
    }

    pub fn serialize(
        &self,
        payload: &Payload,
        ctx: &LogContext,
    ) -> Result<EncodedPayload, ReportError> {
        let data = serialize_record(&payload.data)?;
        let (data, _) = self.scrubber.scrub(&data, ctx);

        let mut tree = Map::new();
        tree.insert(
            "access_token".to_string(),
            Value::String(payload.access_token.clone()),
        );
        tree.insert("data".to_string(), data);

        Ok(EncodedPayload::new(Value::Object(tree))?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Body, BodyContent, Level, Message, Notifier, Request};
    use serde_json::json;

    fn record(request: Option<Request>) -> Record {
        Record {
            environment: "test".to_string(),
            body: Body::new(BodyContent::Message(Message::new("Hello world"))),
            level: Level::Warning,
            timestamp: 1_700_000_000,
            code_version: None,
            platform: None,
            language: "rust".to_string(),
            framework: None,
            context: None,
            request,
            person: None,
            server: None,
            custom: Map::new(),
            fingerprint: None,
            title: None,
            uuid: "00000000-0000-4000-8000-000000000000".to_string(),
            notifier: Notifier::default(),
        }
    }

    fn serializer(fields: &[&str]) -> PayloadSerializer {
        let fields: Vec<String> = fields.iter().map(|f| f.to_string()).collect();
        PayloadSerializer::new(Scrubber::new(&fields, &[], &[], '*').unwrap())
    }

    #[test]
    fn test_wire_layout() {
        let payload = Payload::new("abcdef0123456789abcdef0123456789", record(None));
        let encoded = serializer(&[]).serialize(&payload, &LogContext::new("t")).unwrap();
        let tree = encoded.data();

        assert_eq!(tree["access_token"], "abcdef0123456789abcdef0123456789");
        assert_eq!(tree["data"]["body"]["message"]["body"], "Hello world");
        assert!(tree["data"].get("person").is_none());
        assert!(tree["data"].get("custom").is_none());
        assert!(tree["data"].get("request").is_none());
        assert_eq!(encoded.encoded(), serde_json::to_vec(tree).unwrap().as_slice());
    }

    #[test]
    fn test_request_scrubbed_and_headers_kept_as_object() {
        let mut post = Map::new();
        post.insert("sensitive".to_string(), json!("abc"));
        post.insert("name".to_string(), json!("ann"));
        let request = Request {
            url: Some("https://example.com/login?sensitive=1&page=2".to_string()),
            post: Some(post),
            ..Default::default()
        };

        let payload = Payload::new("abcdef0123456789abcdef0123456789", record(Some(request)));
        let encoded = serializer(&["sensitive"])
            .serialize(&payload, &LogContext::new("t"))
            .unwrap();
        let request = &encoded.data()["data"]["request"];

        assert_eq!(request["headers"], json!({}));
        assert_eq!(request["POST"]["sensitive"], "********");
        assert_eq!(request["POST"]["name"], "ann");
        assert_eq!(request["url"], "https://example.com/login?sensitive=********&page=2");
    }

    #[test]
    fn test_access_token_never_scrubbed() {
        let payload = Payload::new("abcdef0123456789abcdef0123456789", record(None));
        let encoded = serializer(&["access_token"])
            .serialize(&payload, &LogContext::new("t"))
            .unwrap();
        assert_eq!(encoded.data()["access_token"], "abcdef0123456789abcdef0123456789");
    }
}
