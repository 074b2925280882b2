//! Size-reduction strategies.
//!
//! Each strategy mutates the payload tree in place and re-encodes it before
//! returning, so the engine can re-check the size between steps.

use serde_json::Value;

use crate::extraction::{array_at_mut, resolve_json_path, resolve_json_path_mut};

use super::encoded::EncodedPayload;

/// Frames kept at each end of a long frame list.
pub const FRAMES_OPTIMIZATION_RANGE: usize = 75;
/// Telemetry events kept at each end of a long telemetry list.
pub const TELEMETRY_OPTIMIZATION_RANGE: usize = 50;
/// Exception messages are cut to this many characters by the min-body pass.
pub const MIN_BODY_MESSAGE_LIMIT: usize = 256;
/// Frames kept at each end by the min-body pass.
pub const MIN_BODY_FRAMES_RANGE: usize = 1;
/// String length thresholds, tried largest first.
pub const STRING_THRESHOLDS: [usize; 3] = [1024, 512, 256];

const BODY_PATH: &str = "data.body";
const TELEMETRY_PATH: &str = "data.body.telemetry";

pub trait TruncationStrategy: Send + Sync {
    fn name(&self) -> &str;

    fn applies(&self, _payload: &EncodedPayload) -> bool {
        true
    }

    /// Reduce `payload`, re-encoding it before returning.
    fn execute(&self, payload: &mut EncodedPayload, max_size: usize)
        -> Result<(), serde_json::Error>;
}

/// Paths of every trace object in the body, for both `trace` and `trace_chain`.
pub fn trace_paths(data: &Value) -> Vec<String> {
    let Some(body) = resolve_json_path(data, BODY_PATH) else {
        return Vec::new();
    };

    if body.get("trace").is_some() {
        return vec![format!("{}.trace", BODY_PATH)];
    }
    match body.get("trace_chain").and_then(Value::as_array) {
        Some(chain) => (0..chain.len())
            .map(|i| format!("{}.trace_chain.{}", BODY_PATH, i))
            .collect(),
        None => Vec::new(),
    }
}

/// Paths of every frame list: each trace's `frames` and a message backtrace.
pub fn frame_list_paths(data: &Value) -> Vec<String> {
    let mut paths: Vec<String> = trace_paths(data)
        .into_iter()
        .map(|path| format!("{}.frames", path))
        .collect();

    let backtrace = format!("{}.message.backtrace", BODY_PATH);
    if resolve_json_path(data, &backtrace).map_or(false, Value::is_array) {
        paths.push(backtrace);
    }
    paths
}

/// Collapse `items` to its first `range` and last `range` entries.
pub fn collapse_middle(items: &mut Vec<Value>, range: usize) -> bool {
    let len = items.len();
    if len <= range * 2 {
        return false;
    }
    items.drain(range..len - range);
    true
}

/// Cut `s` to at most `limit` characters.
pub fn clamp_chars(s: &mut String, limit: usize) -> bool {
    match s.char_indices().nth(limit) {
        Some((idx, _)) => {
            s.truncate(idx);
            true
        }
        None => false,
    }
}

fn frame_list_longer_than(data: &Value, range: usize) -> bool {
    frame_list_paths(data).iter().any(|path| {
        resolve_json_path(data, path)
            .and_then(Value::as_array)
            .map_or(false, |frames| frames.len() > range * 2)
    })
}

/// Keeps the outermost and innermost frames of every trace and message backtrace.
#[derive(Debug, Clone)]
pub struct FramesStrategy {
    range: usize,
}

impl FramesStrategy {
    pub fn new(range: usize) -> Self {
        Self { range }
    }
}

impl Default for FramesStrategy {
    fn default() -> Self {
        Self::new(FRAMES_OPTIMIZATION_RANGE)
    }
}

impl TruncationStrategy for FramesStrategy {
    fn name(&self) -> &str {
        "frames"
    }

    fn applies(&self, payload: &EncodedPayload) -> bool {
        frame_list_longer_than(payload.data(), self.range)
    }

    fn execute(
        &self,
        payload: &mut EncodedPayload,
        _max_size: usize,
    ) -> Result<(), serde_json::Error> {
        let paths = frame_list_paths(payload.data());
        for path in paths {
            if let Some(frames) = array_at_mut(payload.data_mut(), &path) {
                collapse_middle(frames, self.range);
            }
        }
        payload.encode()
    }
}

/// Keeps the oldest and newest telemetry events.
#[derive(Debug, Clone)]
pub struct TelemetryStrategy {
    range: usize,
}

impl TelemetryStrategy {
    pub fn new(range: usize) -> Self {
        Self { range }
    }
}

impl Default for TelemetryStrategy {
    fn default() -> Self {
        Self::new(TELEMETRY_OPTIMIZATION_RANGE)
    }
}

impl TruncationStrategy for TelemetryStrategy {
    fn name(&self) -> &str {
        "telemetry"
    }

    fn applies(&self, payload: &EncodedPayload) -> bool {
        resolve_json_path(payload.data(), TELEMETRY_PATH)
            .and_then(Value::as_array)
            .map_or(false, |events| events.len() > self.range * 2)
    }

    fn execute(
        &self,
        payload: &mut EncodedPayload,
        _max_size: usize,
    ) -> Result<(), serde_json::Error> {
        if let Some(events) = array_at_mut(payload.data_mut(), TELEMETRY_PATH) {
            collapse_middle(events, self.range);
        }
        payload.encode()
    }
}

/// Strips every trace down to its exception summary and two frames.
#[derive(Debug, Clone, Default)]
pub struct MinBodyStrategy;

impl TruncationStrategy for MinBodyStrategy {
    fn name(&self) -> &str {
        "min_body"
    }

    fn applies(&self, payload: &EncodedPayload) -> bool {
        !trace_paths(payload.data()).is_empty()
    }

    fn execute(
        &self,
        payload: &mut EncodedPayload,
        _max_size: usize,
    ) -> Result<(), serde_json::Error> {
        let paths = trace_paths(payload.data());
        for path in paths {
            let Some(trace) = resolve_json_path_mut(payload.data_mut(), &path) else {
                continue;
            };

            if let Some(exception) = trace.get_mut("exception").and_then(Value::as_object_mut) {
                exception.remove("description");
                if let Some(Value::String(message)) = exception.get_mut("message") {
                    clamp_chars(message, MIN_BODY_MESSAGE_LIMIT);
                }
            }
            if let Some(frames) = trace.get_mut("frames").and_then(Value::as_array_mut) {
                collapse_middle(frames, MIN_BODY_FRAMES_RANGE);
            }
        }
        payload.encode()
    }
}

/// Clamps every string leaf, trying smaller thresholds until the payload fits.
#[derive(Debug, Clone)]
pub struct StringsStrategy {
    thresholds: Vec<usize>,
}

impl StringsStrategy {
    pub fn new(mut thresholds: Vec<usize>) -> Self {
        thresholds.sort_unstable_by(|a, b| b.cmp(a));
        Self { thresholds }
    }
}

impl Default for StringsStrategy {
    fn default() -> Self {
        Self::new(STRING_THRESHOLDS.to_vec())
    }
}

fn clamp_strings(value: &mut Value, limit: usize) -> usize {
    match value {
        Value::String(s) => usize::from(clamp_chars(s, limit)),
        Value::Array(items) => items.iter_mut().map(|v| clamp_strings(v, limit)).sum(),
        Value::Object(obj) => obj.values_mut().map(|v| clamp_strings(v, limit)).sum(),
        _ => 0,
    }
}

impl TruncationStrategy for StringsStrategy {
    fn name(&self) -> &str {
        "strings"
    }

    fn execute(&self, payload: &mut EncodedPayload, max_size: usize) -> Result<(), serde_json::Error> {
        for &threshold in &self.thresholds {
            if clamp_strings(payload.data_mut(), threshold) > 0 {
                payload.encode()?;
            }
            if payload.size() <= max_size {
                break;
            }
        }
        Ok(())
    }
}

/// Terminal step: nothing left to reduce, the payload goes out as is.
#[derive(Debug, Clone, Default)]
pub struct RawStrategy;

impl TruncationStrategy for RawStrategy {
    fn name(&self) -> &str {
        "raw"
    }

    fn execute(
        &self,
        _payload: &mut EncodedPayload,
        _max_size: usize,
    ) -> Result<(), serde_json::Error> {
        Ok(())
    }
}
