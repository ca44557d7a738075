//! Error types for the HTTP client.
//!
//! # Design
//! Failures are split by the stage that produced them. `Request` and `Url`
//! are raised while the wire request is being built and never reach the
//! network. `Response` wraps a completed call whose status indicated failure
//! and keeps the outcome so callers can still read status and body.
//! `Aborted` is the cancellation token firing and is never wrapped in a
//! response failure.
//!
//! Every build/response failure carries a raw `message` plus a
//! `quick_message`: a friendlier annotation that defaults to the raw message
//! and can be overridden, typically by a response-error interceptor.

use std::fmt;

use thiserror::Error;

use crate::response::HttpResponse;

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, HttpError>;

/// Discriminant of [`HttpError`] for callers that only need the failure class.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Request,
    Url,
    Response,
    Aborted,
    Transport,
}

/// Errors returned by `HttpClient` verb methods.
#[derive(Debug, Error)]
pub enum HttpError {
    /// The outgoing payload could not be encoded.
    #[error("HttpRequestError: {message}")]
    Request { message: String, quick_message: String },

    /// The target URL or its query parameters are malformed.
    #[error("HttpUrlError: {message}")]
    Url { message: String, quick_message: String },

    /// The transport completed with a non-success status.
    #[error("HttpResponseError: {}", .0.message)]
    Response(Box<ResponseError>),

    /// The cancellation token fired before the transport completed.
    #[error("AbortError: the request was aborted")]
    Aborted,

    /// The transport could not complete the exchange at all.
    #[error("TransportError: {0}")]
    Transport(String),
}

impl HttpError {
    pub fn request(message: impl Into<String>, quick_message: Option<&str>) -> Self {
        let message = message.into();
        let quick_message = quick_message.map_or_else(|| message.clone(), str::to_string);
        HttpError::Request { message, quick_message }
    }

    pub fn url(message: impl Into<String>, quick_message: Option<&str>) -> Self {
        let message = message.into();
        let quick_message = quick_message.map_or_else(|| message.clone(), str::to_string);
        HttpError::Url { message, quick_message }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            HttpError::Request { .. } => ErrorKind::Request,
            HttpError::Url { .. } => ErrorKind::Url,
            HttpError::Response(_) => ErrorKind::Response,
            HttpError::Aborted => ErrorKind::Aborted,
            HttpError::Transport(_) => ErrorKind::Transport,
        }
    }

    /// Class name of the failure, e.g. `HttpUrlError` or `AbortError`.
    pub fn name(&self) -> &'static str {
        match self {
            HttpError::Request { .. } => "HttpRequestError",
            HttpError::Url { .. } => "HttpUrlError",
            HttpError::Response(_) => ResponseError::NAME,
            HttpError::Aborted => "AbortError",
            HttpError::Transport(_) => "TransportError",
        }
    }

    /// Raw message without the class name prefix.
    pub fn message(&self) -> &str {
        match self {
            HttpError::Request { message, .. } | HttpError::Url { message, .. } => message,
            HttpError::Response(err) => &err.message,
            HttpError::Aborted => "the request was aborted",
            HttpError::Transport(message) => message,
        }
    }

    /// Friendly message; falls back to the raw message when none was given.
    pub fn quick_message(&self) -> &str {
        match self {
            HttpError::Request { quick_message, .. } | HttpError::Url { quick_message, .. } => {
                quick_message
            }
            HttpError::Response(err) => &err.quick_message,
            other => other.message(),
        }
    }

    /// Replace the friendly message. Only request, URL and response errors
    /// carry one; other variants are returned unchanged.
    pub fn with_quick_message(self, quick_message: impl Into<String>) -> Self {
        match self {
            HttpError::Request { message, .. } => HttpError::Request {
                message,
                quick_message: quick_message.into(),
            },
            HttpError::Url { message, .. } => HttpError::Url {
                message,
                quick_message: quick_message.into(),
            },
            HttpError::Response(err) => {
                HttpError::Response(Box::new(err.with_quick_message(quick_message)))
            }
            other => other,
        }
    }

    /// `"{name}: {message}"`.
    pub fn get_message(&self) -> String {
        format!("{}: {}", self.name(), self.message())
    }

    pub fn is_aborted(&self) -> bool {
        matches!(self, HttpError::Aborted)
    }

    /// The failed outcome, when the transport completed.
    pub fn response(&self) -> Option<&HttpResponse> {
        match self {
            HttpError::Response(err) => Some(&err.response),
            _ => None,
        }
    }

    pub fn into_response_error(self) -> Option<ResponseError> {
        match self {
            HttpError::Response(err) => Some(*err),
            _ => None,
        }
    }
}

impl From<ResponseError> for HttpError {
    fn from(err: ResponseError) -> Self {
        HttpError::Response(Box::new(err))
    }
}

/// A completed call whose status indicated failure.
///
/// This is the value response-error interceptors receive and return, so a
/// chain can rewrite the message or annotate it but cannot turn it into a
/// successful outcome.
pub struct ResponseError {
    pub message: String,
    pub quick_message: String,
    pub response: HttpResponse,
}

impl ResponseError {
    const NAME: &'static str = "HttpResponseError";

    pub fn new(message: impl Into<String>, response: HttpResponse) -> Self {
        let message = message.into();
        Self {
            quick_message: message.clone(),
            message,
            response,
        }
    }

    pub fn with_quick_message(mut self, quick_message: impl Into<String>) -> Self {
        self.quick_message = quick_message.into();
        self
    }

    pub fn status(&self) -> http::StatusCode {
        self.response.status()
    }

    pub fn get_message(&self) -> String {
        format!("{}: {}", Self::NAME, self.message)
    }

    pub fn into_response(self) -> HttpResponse {
        self.response
    }
}

impl fmt::Debug for ResponseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResponseError")
            .field("message", &self.message)
            .field("quick_message", &self.quick_message)
            .field("status", &self.response.status())
            .finish()
    }
}
