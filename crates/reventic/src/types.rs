//! Wire types and serialization.

use serde::Serialize;
use serde_json::{Map, Value};
use std::fmt;

/// Arbitrary key/value properties attached to an event or user update.
pub type Properties = Map<String, Value>;

/// API endpoint a payload is posted to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endpoint {
    /// `POST {base}/event`
    Event,
    /// `POST {base}/user`
    User,
}

impl Endpoint {
    /// Path segment relative to the base URL.
    pub fn path(self) -> &'static str {
        match self {
            Endpoint::Event => "event",
            Endpoint::User => "user",
        }
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.path())
    }
}

/// Body posted to the API.
///
/// Identity and origin fields are omitted from the JSON when absent,
/// never sent as `null`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OutboundRequest {
    pub properties: Properties,
    pub api_key: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub session_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rev_ip: Option<String>,
}

/// Parsed JSON response from the API.
///
/// The body is kept as-is; `user.id` and `session.id` are read from it
/// to refresh the tracker's identity.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiResponse {
    body: Value,
}

impl ApiResponse {
    pub(crate) fn new(body: Value) -> Self {
        Self { body }
    }

    /// `user.id` from the response, if present and non-empty.
    pub fn user_id(&self) -> Option<String> {
        nested_id(&self.body, "user")
    }

    /// `session.id` from the response, if present and non-empty.
    pub fn session_id(&self) -> Option<String> {
        nested_id(&self.body, "session")
    }

    /// The full response body.
    pub fn body(&self) -> &Value {
        &self.body
    }

    /// Consume the response, returning the body.
    pub fn into_body(self) -> Value {
        self.body
    }
}

impl From<Value> for ApiResponse {
    fn from(body: Value) -> Self {
        Self::new(body)
    }
}

fn nested_id(body: &Value, object: &str) -> Option<String> {
    match body.get(object)?.get("id")? {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}
