//! Request-shaping HTTP client with interceptor pipelines.
//!
//! # Overview
//! Wraps a host-supplied transport and adds the parts every application ends
//! up writing around it: base-URL resolution, header and query merging, body
//! encoding, and ordered request/response interceptors.
//!
//! # Design
//! - `HttpClient` holds an immutable base `Config` and two shared
//!   `InterceptorRegistry`s; every verb call works on its own config snapshot.
//! - The network is behind the `Transport` trait. `ReqwestTransport` is the
//!   default implementation (feature `reqwest`).
//! - Failures are a single `HttpError` enum tagged by stage, so callers can
//!   tell build failures, failed responses and aborts apart by matching.
//!
//! ```no_run
//! use hopper_core::{HttpClient, RequestConfig};
//!
//! # async fn run() -> hopper_core::Result<()> {
//! let client = HttpClient::new(RequestConfig::new().base_url("https://buscacode.com"));
//! let response = client.get("/user", RequestConfig::new()).await?;
//! let user: serde_json::Value = response.json()?;
//! # Ok(())
//! # }
//! ```

pub mod body;
pub mod client;
pub mod config;
pub mod error;
pub mod http;
pub mod interceptor;
pub mod response;
pub mod transport;
pub mod url_format;

pub use body::{define_body, label_body, HttpData};
pub use client::HttpClient;
pub use config::{merge_config, merge_headers, ClientSettings, Config, Params, RequestConfig};
pub use error::{ErrorKind, HttpError, ResponseError, Result};
pub use http::{Body, CacheMode, HttpMethod, HttpRequest};
pub use interceptor::{
    fulfilled, fulfilled_sync, rejected, InterceptorId, InterceptorRegistry, Interceptors,
};
pub use response::HttpResponse;
#[cfg(feature = "reqwest")]
pub use transport::ReqwestTransport;
pub use transport::Transport;
pub use url_format::{build_request_url, format_query_params, format_url, format_url_value};

pub use tokio_util::sync::CancellationToken;
