//! Outcome returned by the transport.
//!
//! The body is held in memory and every reader consumes the response, so a
//! body can be read exactly once.

use bytes::Bytes;
use http::{HeaderMap, StatusCode};
use serde::de::DeserializeOwned;

use crate::error::{HttpError, Result};

/// An HTTP response described as plain data.
///
/// Built by a `Transport` after the exchange completes. Non-success statuses
/// are still plain responses at this layer; the client decides what counts
/// as a failure.
#[derive(Debug)]
pub struct HttpResponse {
    status: StatusCode,
    status_text: String,
    headers: HeaderMap,
    body: Bytes,
}

impl HttpResponse {
    pub fn new(status: StatusCode, headers: HeaderMap, body: impl Into<Bytes>) -> Self {
        Self {
            status,
            status_text: status.canonical_reason().unwrap_or_default().to_string(),
            headers,
            body: body.into(),
        }
    }

    /// Replace the reason phrase derived from the status code.
    pub fn with_status_text(mut self, status_text: impl Into<String>) -> Self {
        self.status_text = status_text.into();
        self
    }

    /// `true` for any 2xx status.
    pub fn ok(&self) -> bool {
        self.status.is_success()
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn status_text(&self) -> &str {
        &self.status_text
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    pub fn bytes(self) -> Bytes {
        self.body
    }

    pub fn text(self) -> Result<String> {
        String::from_utf8(self.body.to_vec())
            .map_err(|e| HttpError::Transport(format!("response body is not valid UTF-8: {e}")))
    }

    pub fn json<T: DeserializeOwned>(self) -> Result<T> {
        serde_json::from_slice(&self.body)
            .map_err(|e| HttpError::Transport(format!("response body is not valid JSON: {e}")))
    }

    /// Decode an `application/x-www-form-urlencoded` body into ordered pairs.
    pub fn form_data(self) -> Result<Vec<(String, String)>> {
        serde_urlencoded::from_bytes(&self.body)
            .map_err(|e| HttpError::Transport(format!("response body is not form data: {e}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_text_follows_status() {
        let response = HttpResponse::new(StatusCode::BAD_REQUEST, HeaderMap::new(), "");
        assert!(!response.ok());
        assert_eq!(response.status_text(), "Bad Request");
    }

    #[test]
    fn status_text_can_be_overridden() {
        let response = HttpResponse::new(StatusCode::OK, HeaderMap::new(), "")
            .with_status_text("Fine");
        assert!(response.ok());
        assert_eq!(response.status_text(), "Fine");
    }

    #[test]
    fn json_reads_body() {
        let response = HttpResponse::new(StatusCode::OK, HeaderMap::new(), r#"{"id":123}"#);
        let value: serde_json::Value = response.json().unwrap();
        assert_eq!(value["id"], 123);
    }

    #[test]
    fn json_rejects_garbage() {
        let response = HttpResponse::new(StatusCode::OK, HeaderMap::new(), "not json");
        let err = response.json::<serde_json::Value>().unwrap_err();
        assert!(matches!(err, HttpError::Transport(_)));
    }

    #[test]
    fn form_data_preserves_order() {
        let response = HttpResponse::new(StatusCode::OK, HeaderMap::new(), "b=2&a=1&b=3");
        let pairs = response.form_data().unwrap();
        assert_eq!(
            pairs,
            vec![
                ("b".to_string(), "2".to_string()),
                ("a".to_string(), "1".to_string()),
                ("b".to_string(), "3".to_string()),
            ]
        );
    }
}
