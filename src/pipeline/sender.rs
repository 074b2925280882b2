//! Transport boundary.
//!
//! The reporter hands a scrubbed, size-bounded payload to a [`Sender`]; HTTP,
//! retries and queuing live on the other side of this trait.

use crate::truncation::EncodedPayload;

/// Outcome of a send, or of a report that never reached the sender.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    /// HTTP status, or 0 when nothing was sent.
    pub status: u16,
    pub info: String,
    pub uuid: Option<String>,
}

impl Response {
    pub fn new(status: u16, info: impl Into<String>, uuid: Option<String>) -> Self {
        Self {
            status,
            info: info.into(),
            uuid,
        }
    }

    pub fn ignored() -> Self {
        Self::new(0, "Ignored", None)
    }

    pub fn failed(info: impl Into<String>) -> Self {
        Self::new(0, info, None)
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

pub trait Sender: Send + Sync {
    fn send(&self, payload: &EncodedPayload, access_token: &str) -> Response;

    fn send_batch(&self, payloads: &[EncodedPayload], access_token: &str) -> Vec<Response> {
        payloads
            .iter()
            .map(|payload| self.send(payload, access_token))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    struct Echo;

    impl Sender for Echo {
        fn send(&self, payload: &EncodedPayload, access_token: &str) -> Response {
            Response::new(200, format!("{}:{}", access_token, payload.size()), None)
        }
    }

    #[test]
    fn test_default_batch_sends_each() {
        let payloads = vec![
            EncodedPayload::new(json!(1)).unwrap(),
            EncodedPayload::new(json!("ab")).unwrap(),
        ];
        let responses = Echo.send_batch(&payloads, "t");

        assert_eq!(responses.len(), 2);
        assert_eq!(responses[0].info, "t:1");
        assert_eq!(responses[1].info, "t:4");
        assert!(responses.iter().all(Response::is_success));
    }

    #[test]
    fn test_unsent_responses() {
        assert!(!Response::ignored().is_success());
        assert_eq!(Response::failed("boom").status, 0);
    }
}
