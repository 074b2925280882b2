//! Request and server descriptions attached to a record.

use std::collections::BTreeMap;

use serde::Serialize;
use serde_json::{Map, Value};

/// The HTTP request being served when the report was made.
///
/// `headers` is always emitted, as `{}` when empty; the other optional parts
/// are omitted when absent.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct Request {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub method: Option<String>,
    pub headers: BTreeMap<String, String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub params: Option<Map<String, Value>>,
    #[serde(rename = "GET", skip_serializing_if = "Option::is_none")]
    pub get: Option<Map<String, Value>>,
    #[serde(rename = "POST", skip_serializing_if = "Option::is_none")]
    pub post: Option<Map<String, Value>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub query_string: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub body: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_ip: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// The machine and checkout the process is running from.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct Server {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub host: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub root: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub branch: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code_version: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Server {
    pub fn is_empty(&self) -> bool {
        self.host.is_none()
            && self.root.is_none()
            && self.branch.is_none()
            && self.code_version.is_none()
            && self.extra.is_empty()
    }
}
