//! Report body: a message, a single trace, or a chain of traces.

use serde::Serialize;
use serde_json::{Map, Value};

use super::level::Level;

/// Filename used when a frame has no known file.
pub const INTERNAL_FILENAME: &str = "<internal>";

/// Method placed on the outermost frame after the method shift.
pub const MAIN_METHOD: &str = "<main>";

/// Source lines around a frame's line.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct Context {
    pub pre: Vec<String>,
    pub post: Vec<String>,
}

impl Context {
    pub fn is_empty(&self) -> bool {
        self.pre.is_empty() && self.post.is_empty()
    }
}

/// One normalized stack frame.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Frame {
    pub filename: String,
    pub lineno: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub method: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub context: Option<Context>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub args: Option<Vec<Value>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kwargs: Option<Map<String, Value>>,
}

impl Frame {
    pub fn new(filename: impl Into<String>) -> Self {
        Self {
            filename: filename.into(),
            lineno: 0,
            method: None,
            code: None,
            context: None,
            args: None,
            kwargs: None,
        }
    }

    pub fn with_lineno(mut self, lineno: u32) -> Self {
        self.lineno = lineno;
        self
    }

    pub fn with_method(mut self, method: Option<String>) -> Self {
        self.method = method;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExceptionInfo {
    pub class: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Frames (oldest call first) plus the exception they belong to.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Trace {
    pub frames: Vec<Frame>,
    pub exception: ExceptionInfo,
}

/// Causally linked traces, outermost exception first. Never empty.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct TraceChain(Vec<Trace>);

impl TraceChain {
    pub fn new(first: Trace, causes: Vec<Trace>) -> Self {
        let mut traces = Vec::with_capacity(causes.len() + 1);
        traces.push(first);
        traces.extend(causes);
        TraceChain(traces)
    }

    /// `None` when `traces` is empty.
    pub fn from_vec(traces: Vec<Trace>) -> Option<Self> {
        if traces.is_empty() {
            None
        } else {
            Some(TraceChain(traces))
        }
    }

    pub fn traces(&self) -> &[Trace] {
        &self.0
    }

    /// At least 1: a chain always holds its first trace.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Always `false`; `new` takes the first trace and `from_vec` rejects an
    /// empty list.
    pub fn is_empty(&self) -> bool {
        false
    }

    pub fn into_vec(self) -> Vec<Trace> {
        self.0
    }
}

/// Keys owned by [`Message`] itself; extras may not use them.
pub const MESSAGE_RESERVED_KEYS: &[&str] = &["body", "backtrace"];

/// A plain message; extra context keys sit next to `body`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Message {
    pub body: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub backtrace: Option<Vec<Frame>>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Message {
    pub fn new(body: impl Into<String>) -> Self {
        Self {
            body: body.into(),
            backtrace: None,
            extra: Map::new(),
        }
    }

    /// Copy `extra` next to the body, skipping reserved keys.
    ///
    /// Returns the skipped keys.
    pub fn extend_extra(&mut self, extra: &Map<String, Value>) -> Vec<String> {
        let mut skipped = Vec::new();
        for (key, value) in extra {
            if MESSAGE_RESERVED_KEYS.contains(&key.as_str()) {
                skipped.push(key.clone());
            } else {
                self.extra.insert(key.clone(), value.clone());
            }
        }
        skipped
    }
}

/// Exactly one of the three body kinds.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BodyContent {
    Message(Message),
    Trace(Trace),
    TraceChain(TraceChain),
}

impl BodyContent {
    pub fn kind(&self) -> &'static str {
        match self {
            BodyContent::Message(_) => "message",
            BodyContent::Trace(_) => "trace",
            BodyContent::TraceChain(_) => "trace_chain",
        }
    }
}

/// A breadcrumb recorded before the report.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TelemetryEvent {
    pub level: Level,
    #[serde(rename = "type")]
    pub kind: String,
    pub source: String,
    pub timestamp_ms: i64,
    pub body: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Body {
    #[serde(flatten)]
    pub content: BodyContent,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub telemetry: Option<Vec<TelemetryEvent>>,
}

impl Body {
    pub fn new(content: BodyContent) -> Self {
        Self {
            content,
            telemetry: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn trace(class: &str) -> Trace {
        Trace {
            frames: vec![Frame::new("a.rs").with_lineno(3)],
            exception: ExceptionInfo {
                class: class.to_string(),
                message: "boom".to_string(),
                description: None,
            },
        }
    }

    #[test]
    fn test_message_body_shape() {
        let mut message = Message::new("Hello world");
        message
            .extra
            .insert("order_id".to_string(), json!(7));
        let body = Body::new(BodyContent::Message(message));

        assert_eq!(
            serde_json::to_value(&body).unwrap(),
            json!({"message": {"body": "Hello world", "order_id": 7}})
        );
    }

    #[test]
    fn test_extend_extra_skips_reserved_keys() {
        let mut extra = Map::new();
        extra.insert("body".to_string(), json!("other"));
        extra.insert("backtrace".to_string(), json!("fake"));
        extra.insert("user".to_string(), json!("ann"));

        let mut message = Message::new("real");
        let skipped = message.extend_extra(&extra);

        assert_eq!(skipped, vec!["backtrace".to_string(), "body".to_string()]);
        assert_eq!(
            serde_json::to_value(&message).unwrap(),
            json!({"body": "real", "user": "ann"})
        );
    }

    #[test]
    fn test_trace_chain_shape() {
        let chain = TraceChain::new(trace("Outer"), vec![trace("Inner")]);
        let body = Body::new(BodyContent::TraceChain(chain));
        let value = serde_json::to_value(&body).unwrap();

        let chain = value["trace_chain"].as_array().unwrap();
        assert_eq!(chain.len(), 2);
        assert_eq!(chain[0]["exception"]["class"], "Outer");
        assert_eq!(chain[1]["exception"]["class"], "Inner");
    }

    #[test]
    fn test_frame_omits_absent_fields() {
        let value = serde_json::to_value(Frame::new(INTERNAL_FILENAME)).unwrap();
        assert_eq!(value, json!({"filename": "<internal>", "lineno": 0}));
    }

    #[test]
    fn test_trace_chain_from_empty_vec() {
        assert!(TraceChain::from_vec(Vec::new()).is_none());
        let single = TraceChain::from_vec(vec![trace("A")]).unwrap();
        assert_eq!(single.len(), 1);
        assert!(!single.is_empty());
    }

    #[test]
    fn test_telemetry_sits_next_to_content() {
        let mut body = Body::new(BodyContent::Trace(trace("E")));
        body.telemetry = Some(vec![TelemetryEvent {
            level: Level::Info,
            kind: "log".to_string(),
            source: "server".to_string(),
            timestamp_ms: 1,
            body: Map::new(),
        }]);
        let value = serde_json::to_value(&body).unwrap();
        assert!(value.get("trace").is_some());
        assert_eq!(value["telemetry"][0]["type"], "log");
    }
}
