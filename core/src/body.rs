//! Request payloads and their conversion into a wire body.

use bytes::Bytes;
use http::header::{HeaderValue, CONTENT_TYPE};
use http::HeaderMap;
use serde::Serialize;
use serde_json::{Map, Value};

use crate::error::{HttpError, Result};
use crate::http::Body;

const BODY_CONVERSION_FAILED: &str = "Error while trying to convert the data to body request.";
const JSON: &str = "application/json";

/// Logical payload of a request before encoding.
#[derive(Debug, Clone, PartialEq)]
pub enum HttpData {
    /// Sent unchanged.
    Text(String),
    /// Serialized to JSON when the request is built.
    Json(Value),
    /// Passed through unchanged.
    Binary(Bytes),
    /// Passed through unchanged; the transport encodes the fields.
    Form(Vec<(String, String)>),
}

impl HttpData {
    /// Capture any serializable value as a JSON payload.
    ///
    /// Fails with a request error when the value cannot be represented as
    /// JSON, e.g. a map with non-string keys.
    pub fn json<T: Serialize + ?Sized>(value: &T) -> Result<Self> {
        serde_json::to_value(value)
            .map(HttpData::Json)
            .map_err(|e| HttpError::request(e.to_string(), Some(BODY_CONVERSION_FAILED)))
    }

    /// Mutable access to the fields of a JSON object payload.
    pub fn as_record_mut(&mut self) -> Option<&mut Map<String, Value>> {
        match self {
            HttpData::Json(Value::Object(map)) => Some(map),
            _ => None,
        }
    }
}

impl From<String> for HttpData {
    fn from(text: String) -> Self {
        HttpData::Text(text)
    }
}

impl From<&str> for HttpData {
    fn from(text: &str) -> Self {
        HttpData::Text(text.to_string())
    }
}

impl From<Value> for HttpData {
    fn from(value: Value) -> Self {
        HttpData::Json(value)
    }
}

impl From<Bytes> for HttpData {
    fn from(bytes: Bytes) -> Self {
        HttpData::Binary(bytes)
    }
}

impl From<Vec<u8>> for HttpData {
    fn from(bytes: Vec<u8>) -> Self {
        HttpData::Binary(Bytes::from(bytes))
    }
}

/// Convert a payload into the body handed to the transport.
///
/// `None` means no body. Strings, binary and form payloads pass through;
/// everything else is serialized to JSON.
pub fn define_body(data: Option<&HttpData>) -> Result<Option<Body>> {
    let Some(data) = data else {
        return Ok(None);
    };
    let body = match data {
        HttpData::Text(text) => Body::Text(text.clone()),
        HttpData::Binary(bytes) => Body::Binary(bytes.clone()),
        HttpData::Form(fields) => Body::Form(fields.clone()),
        HttpData::Json(Value::Null) => return Ok(None),
        HttpData::Json(value) => serde_json::to_string(value)
            .map(Body::Text)
            .map_err(|e| HttpError::request(e.to_string(), Some(BODY_CONVERSION_FAILED)))?,
    };
    Ok(Some(body))
}

/// Give pass-through bodies a matching `content-type`.
///
/// Form and binary bodies replace a missing or `application/json` content
/// type, which is what every client sends by default. Any other value the
/// caller set is kept.
pub fn label_body(body: Option<&Body>, headers: &mut HeaderMap) {
    let label = match body {
        Some(Body::Form(_)) => "application/x-www-form-urlencoded",
        Some(Body::Binary(_)) => "application/octet-stream",
        _ => return,
    };
    let replaceable = headers.get(CONTENT_TYPE).map_or(true, |value| value == JSON);
    if replaceable {
        headers.insert(CONTENT_TYPE, HeaderValue::from_static(label));
    }
}
