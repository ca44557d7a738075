//! HTTP client with interceptor pipelines.
//!
//! # Design
//! `HttpClient` owns a base `Config`, two interceptor registries and a
//! `Transport`. The base config is fixed at construction; the registries
//! change over the client's lifetime and are shared by every in-flight call.
//!
//! Each verb call runs the same pipeline:
//! 1. merge the call's `RequestConfig` over the base config and pin the verb's
//!    method and payload;
//! 2. drain the request interceptors over that config, one at a time;
//! 3. resolve the URL, merge the query, encode the body and label
//!    pass-through bodies with a matching content type;
//! 4. hand the request to the transport;
//! 5. return a successful outcome as-is, or wrap a failed one in a
//!    `ResponseError`, drain the response-error interceptors over it and
//!    raise the result.
//!
//! Failures from steps 2 and 3 return before anything is sent. An abort from
//! the transport is returned unmodified and never reaches the response
//! interceptors.

use std::fmt;
use std::sync::Arc;

use tracing::{debug, warn};

use crate::body::{define_body, label_body, HttpData};
use crate::config::{merge_config, Config, RequestConfig};
use crate::error::{ResponseError, Result};
use crate::http::{HttpMethod, HttpRequest};
use crate::interceptor::Interceptors;
use crate::response::HttpResponse;
use crate::transport::Transport;
use crate::url_format::{build_request_url, format_url};

/// Client bound to one base configuration.
///
/// Cloning is cheap and the clone shares the interceptor registries and the
/// transport with the original.
#[derive(Clone)]
pub struct HttpClient {
    config: Config,
    interceptors: Interceptors,
    transport: Arc<dyn Transport>,
}

impl HttpClient {
    /// Create a client using the default `reqwest` transport.
    ///
    /// The base config carries no payload; every verb sets `data` itself.
    #[cfg(feature = "reqwest")]
    pub fn new(config: RequestConfig) -> Self {
        Self::with_transport(config, crate::transport::ReqwestTransport::new())
    }

    /// Create a client from deserialized settings.
    #[cfg(feature = "reqwest")]
    pub fn from_settings(settings: crate::config::ClientSettings) -> Result<Self> {
        Ok(Self::new(RequestConfig::try_from(settings)?))
    }

    /// Create a client that dispatches through `transport`.
    ///
    /// As with [`HttpClient::new`], the base config has no `data`.
    pub fn with_transport(config: RequestConfig, transport: impl Transport + 'static) -> Self {
        Self {
            config: merge_config(&Config::client_default(), &config),
            interceptors: Interceptors::default(),
            transport: Arc::new(transport),
        }
    }

    /// Base configuration every call starts from.
    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn interceptors(&self) -> &Interceptors {
        &self.interceptors
    }

    pub async fn get(&self, url: &str, config: RequestConfig) -> Result<HttpResponse> {
        self.fetch_http(url, self.call_config(HttpMethod::Get, None, &config))
            .await
    }

    pub async fn post(
        &self,
        url: &str,
        data: Option<HttpData>,
        config: RequestConfig,
    ) -> Result<HttpResponse> {
        self.fetch_http(url, self.call_config(HttpMethod::Post, data, &config))
            .await
    }

    pub async fn put(
        &self,
        url: &str,
        data: Option<HttpData>,
        config: RequestConfig,
    ) -> Result<HttpResponse> {
        self.fetch_http(url, self.call_config(HttpMethod::Put, data, &config))
            .await
    }

    pub async fn patch(
        &self,
        url: &str,
        data: Option<HttpData>,
        config: RequestConfig,
    ) -> Result<HttpResponse> {
        self.fetch_http(url, self.call_config(HttpMethod::Patch, data, &config))
            .await
    }

    pub async fn delete(&self, url: &str, config: RequestConfig) -> Result<HttpResponse> {
        self.fetch_http(url, self.call_config(HttpMethod::Delete, None, &config))
            .await
    }

    fn call_config(
        &self,
        method: HttpMethod,
        data: Option<HttpData>,
        overrides: &RequestConfig,
    ) -> Config {
        Config {
            method,
            data,
            ..merge_config(&self.config, overrides)
        }
    }

    async fn fetch_http(&self, url: &str, config: Config) -> Result<HttpResponse> {
        let config = self.interceptors.request.run_fulfilled(config).await?;

        let formatted = format_url(url, config.base_url.as_deref())?;
        let full_url = build_request_url(&formatted, config.params.as_ref())?;
        let body = define_body(config.data.as_ref())?;
        let mut headers = config.headers;
        label_body(body.as_ref(), &mut headers);

        let request = HttpRequest {
            url: full_url,
            method: config.method,
            headers,
            body,
            signal: config.signal,
            cache: config.cache,
        };
        debug!(method = %request.method, url = %request.url, "dispatching request");

        let response = self.transport.fetch(request).await?;
        if response.ok() {
            return Ok(response);
        }

        warn!(status = response.status().as_u16(), "request failed");
        let error = ResponseError::new(response.status_text().to_string(), response);
        Err(self.interceptors.response.run_rejected(error).into())
    }
}

impl fmt::Debug for HttpClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HttpClient")
            .field("config", &self.config)
            .field("interceptors", &self.interceptors)
            .finish_non_exhaustive()
    }
}
