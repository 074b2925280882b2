//! A payload tree paired with its serialized bytes.

use std::sync::atomic::{AtomicU64, Ordering};

use serde_json::Value;

static ENCODE_COUNT: AtomicU64 = AtomicU64::new(0);

/// Number of `encode` calls made by this process. Diagnostic only.
pub fn encode_count() -> u64 {
    ENCODE_COUNT.load(Ordering::Relaxed)
}

/// Payload tree plus its current JSON encoding.
///
/// Mutating the tree through [`EncodedPayload::data_mut`] leaves the bytes stale
/// until [`EncodedPayload::encode`] is called again; `size()` always reports the
/// last encoding.
#[derive(Debug, Clone, PartialEq)]
pub struct EncodedPayload {
    data: Value,
    encoded: Vec<u8>,
}

impl EncodedPayload {
    pub fn new(data: Value) -> Result<Self, serde_json::Error> {
        let mut payload = Self {
            data,
            encoded: Vec::new(),
        };
        payload.encode()?;
        Ok(payload)
    }

    pub fn encode(&mut self) -> Result<(), serde_json::Error> {
        self.encoded = serde_json::to_vec(&self.data)?;
        ENCODE_COUNT.fetch_add(1, Ordering::Relaxed);
        Ok(())
    }

    pub fn size(&self) -> usize {
        self.encoded.len()
    }

    pub fn data(&self) -> &Value {
        &self.data
    }

    pub fn data_mut(&mut self) -> &mut Value {
        &mut self.data
    }

    pub fn encoded(&self) -> &[u8] {
        &self.encoded
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.encoded
    }
}
