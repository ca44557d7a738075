//! Wire-level request types handed to the transport.
//!
//! # Design
//! The client never touches the network itself. It assembles an
//! `HttpRequest` as plain data and passes it to whatever `Transport` the host
//! supplied, which keeps every pipeline stage before dispatch deterministic
//! and easy to test.

use std::fmt;

use bytes::Bytes;
use http::HeaderMap;
use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;

/// HTTP method for a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HttpMethod {
    #[default]
    Get,
    Post,
    Put,
    Patch,
    Delete,
}

impl HttpMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Patch => "PATCH",
            HttpMethod::Delete => "DELETE",
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<HttpMethod> for http::Method {
    fn from(method: HttpMethod) -> Self {
        match method {
            HttpMethod::Get => http::Method::GET,
            HttpMethod::Post => http::Method::POST,
            HttpMethod::Put => http::Method::PUT,
            HttpMethod::Patch => http::Method::PATCH,
            HttpMethod::Delete => http::Method::DELETE,
        }
    }
}

/// Cache hint passed through to the transport untouched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CacheMode {
    Default,
    NoStore,
    Reload,
    NoCache,
    ForceCache,
    OnlyIfCached,
}

impl CacheMode {
    /// `cache-control` value a plain HTTP transport can send for this mode.
    pub fn cache_control(&self) -> Option<&'static str> {
        match self {
            CacheMode::NoStore => Some("no-store"),
            CacheMode::NoCache | CacheMode::Reload => Some("no-cache"),
            CacheMode::Default | CacheMode::ForceCache | CacheMode::OnlyIfCached => None,
        }
    }
}

/// Transport-ready request body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Body {
    /// Sent byte-for-byte, including JSON produced by the encoder.
    Text(String),
    Binary(Bytes),
    /// Form fields, encoded by the transport.
    Form(Vec<(String, String)>),
}

/// A fully built request: the last value produced before dispatch.
#[derive(Debug, Clone)]
pub struct HttpRequest {
    pub url: String,
    pub method: HttpMethod,
    pub headers: HeaderMap,
    pub body: Option<Body>,
    pub signal: Option<CancellationToken>,
    pub cache: Option<CacheMode>,
}
