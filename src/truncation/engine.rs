//! Ordered application of truncation strategies.

use crate::config::ReporterConfig;
use crate::logging::LogContext;

use super::encoded::EncodedPayload;
use super::strategy::{
    FramesStrategy, MinBodyStrategy, RawStrategy, StringsStrategy, TelemetryStrategy,
    TruncationStrategy,
};

/// Encoded size ceiling for a single payload, in bytes.
pub const MAX_PAYLOAD_SIZE: usize = 512 * 1024;

/// Runs custom strategies (in insertion order) and then the built-ins,
/// re-checking the size after each one and stopping as soon as it fits.
pub struct Truncation {
    max_size: usize,
    custom: Vec<Box<dyn TruncationStrategy>>,
    builtin: Vec<Box<dyn TruncationStrategy>>,
}

impl Truncation {
    pub fn new(max_size: usize, frames_range: usize, telemetry_range: usize) -> Self {
        Self {
            max_size,
            custom: Vec::new(),
            builtin: vec![
                Box::new(FramesStrategy::new(frames_range)),
                Box::new(TelemetryStrategy::new(telemetry_range)),
                Box::new(MinBodyStrategy),
                Box::new(StringsStrategy::default()),
                Box::new(RawStrategy),
            ],
        }
    }

    pub fn from_config(config: &ReporterConfig) -> Self {
        Self::new(
            config.max_payload_size,
            config.frames_range,
            config.telemetry_range,
        )
    }

    /// Add a strategy that runs before the built-in ones.
    pub fn with_strategy(mut self, strategy: Box<dyn TruncationStrategy>) -> Self {
        self.custom.push(strategy);
        self
    }

    pub fn max_size(&self) -> usize {
        self.max_size
    }

    pub fn needs_truncating(&self, payload: &EncodedPayload) -> bool {
        payload.size() > self.max_size
    }

    pub fn strategy_names(&self) -> Vec<&str> {
        self.custom
            .iter()
            .chain(self.builtin.iter())
            .map(|s| s.name())
            .collect()
    }

    /// Bring `payload` under the size ceiling if possible.
    ///
    /// Running out of strategies is not an error: the oversized payload is
    /// returned as is.
    pub fn truncate(
        &self,
        mut payload: EncodedPayload,
        ctx: &LogContext,
    ) -> Result<EncodedPayload, serde_json::Error> {
        if !self.needs_truncating(&payload) {
            return Ok(payload);
        }

        let original = payload.size();
        for strategy in self.custom.iter().chain(self.builtin.iter()) {
            if !strategy.applies(&payload) {
                continue;
            }

            strategy.execute(&mut payload, self.max_size)?;
            crate::log_debug!(
                ctx,
                "TRUNCATION_STEP",
                strategy = strategy.name(),
                size = payload.size(),
            );

            if !self.needs_truncating(&payload) {
                crate::log_info!(
                    ctx,
                    "TRUNCATION_COMPLETE",
                    strategy = strategy.name(),
                    original = original,
                    size = payload.size(),
                );
                return Ok(payload);
            }
        }

        crate::log_warn!(
            ctx,
            "TRUNCATION_EXHAUSTED",
            size = payload.size(),
            limit = self.max_size,
        );
        Ok(payload)
    }
}

impl Default for Truncation {
    fn default() -> Self {
        Self::new(
            MAX_PAYLOAD_SIZE,
            super::strategy::FRAMES_OPTIMIZATION_RANGE,
            super::strategy::TELEMETRY_OPTIMIZATION_RANGE,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::truncation::FRAMES_OPTIMIZATION_RANGE;
    use proptest::prelude::*;
    use serde_json::{json, Value};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    fn ctx() -> LogContext {
        LogContext::new("test")
    }

    fn big_trace(frame_count: usize, code_len: usize) -> EncodedPayload {
        let frames: Vec<Value> = (0..frame_count)
            .map(|i| json!({"filename": "src/main.rs", "lineno": i, "code": "c".repeat(code_len)}))
            .collect();
        EncodedPayload::new(json!({
            "access_token": "abcdef0123456789abcdef0123456789",
            "data": {"body": {"trace": {"frames": frames, "exception": {"class": "E", "message": "m"}}}}
        }))
        .unwrap()
    }

    #[test]
    fn test_compliant_payload_untouched() {
        let payload = big_trace(10, 10);
        let out = Truncation::default().truncate(payload.clone(), &ctx()).unwrap();
        assert_eq!(out, payload);
    }

    #[test]
    fn test_frames_bring_payload_under_limit() {
        let payload = big_trace(1000, 1000);
        assert!(payload.size() > MAX_PAYLOAD_SIZE);

        let out = Truncation::default().truncate(payload, &ctx()).unwrap();

        assert!(out.size() <= MAX_PAYLOAD_SIZE);
        let frames = out.data()["data"]["body"]["trace"]["frames"].as_array().unwrap();
        assert_eq!(frames.len(), 2 * FRAMES_OPTIMIZATION_RANGE);
        assert_eq!(frames[0]["code"].as_str().unwrap().len(), 1000);
    }

    #[test]
    fn test_strings_used_for_oversized_message() {
        let payload = EncodedPayload::new(json!({
            "data": {"body": {"message": {"body": "x".repeat(MAX_PAYLOAD_SIZE * 2)}}}
        }))
        .unwrap();

        let out = Truncation::default().truncate(payload, &ctx()).unwrap();
        assert_eq!(out.data()["data"]["body"]["message"]["body"].as_str().unwrap().len(), 1024);
    }

    #[test]
    fn test_exhaustion_returns_payload() {
        let items: Vec<Value> = (0..200).map(|i| json!(i)).collect();
        let payload = EncodedPayload::new(json!({"data": {"custom": {"items": items}}})).unwrap();

        let out = Truncation::new(10, 75, 50).truncate(payload.clone(), &ctx()).unwrap();
        assert_eq!(out.data(), payload.data());
        assert!(out.size() > 10);
    }

    struct Counting(Arc<AtomicUsize>);

    impl TruncationStrategy for Counting {
        fn name(&self) -> &str {
            "counting"
        }

        fn execute(
            &self,
            payload: &mut EncodedPayload,
            _max_size: usize,
        ) -> Result<(), serde_json::Error> {
            self.0.fetch_add(1, Ordering::SeqCst);
            *payload.data_mut() = json!({});
            payload.encode()
        }
    }

    #[test]
    fn test_custom_strategy_runs_first() {
        let calls = Arc::new(AtomicUsize::new(0));
        let engine = Truncation::default().with_strategy(Box::new(Counting(calls.clone())));

        assert_eq!(engine.strategy_names()[0], "counting");
        let out = engine.truncate(big_trace(1000, 1000), &ctx()).unwrap();

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(out.data(), &json!({}));
    }

    proptest! {
        #[test]
        fn prop_truncate_is_idempotent(frame_count in 0usize..400, code_len in 0usize..3000) {
            let engine = Truncation::default();
            let once = engine.truncate(big_trace(frame_count, code_len), &ctx()).unwrap();
            let twice = engine.truncate(once.clone(), &ctx()).unwrap();
            prop_assert_eq!(once, twice);
        }
    }
}
