//! The boundary between the client and the network.
//!
//! # Design
//! `Transport` is the host-supplied capability that turns an `HttpRequest`
//! into an `HttpResponse`. A completed exchange is always `Ok`, whatever its
//! status; only aborts and network failures are errors here. Tests and
//! embedders plug in their own implementation; `ReqwestTransport` is the
//! default one.

use async_trait::async_trait;

use crate::error::Result;
use crate::http::HttpRequest;
use crate::response::HttpResponse;

/// Performs one HTTP exchange.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Execute `request`. Must return `HttpError::Aborted` when the request's
    /// cancellation token fires before the exchange completes.
    async fn fetch(&self, request: HttpRequest) -> Result<HttpResponse>;
}

#[cfg(feature = "reqwest")]
pub use self::reqwest_transport::ReqwestTransport;

#[cfg(feature = "reqwest")]
mod reqwest_transport {
    use async_trait::async_trait;
    use http::header::CACHE_CONTROL;
    use http::HeaderValue;
    use tracing::debug;

    use super::Transport;
    use crate::error::{HttpError, Result};
    use crate::http::{Body, HttpRequest};
    use crate::response::HttpResponse;

    /// `Transport` backed by a `reqwest::Client`.
    #[derive(Debug, Clone, Default)]
    pub struct ReqwestTransport {
        inner: reqwest::Client,
    }

    impl ReqwestTransport {
        pub fn new() -> Self {
            Self::default()
        }

        /// Use a preconfigured client, e.g. one with a proxy or custom TLS.
        pub fn with_client(inner: reqwest::Client) -> Self {
            Self { inner }
        }

        fn prepare(&self, request: HttpRequest) -> reqwest::RequestBuilder {
            let mut headers = request.headers;
            if let Some(directive) = request.cache.and_then(|mode| mode.cache_control()) {
                if !headers.contains_key(CACHE_CONTROL) {
                    headers.insert(CACHE_CONTROL, HeaderValue::from_static(directive));
                }
            }

            let builder = self
                .inner
                .request(request.method.into(), &request.url)
                .headers(headers);
            match request.body {
                None => builder,
                Some(Body::Text(text)) => builder.body(text),
                Some(Body::Binary(bytes)) => builder.body(bytes),
                Some(Body::Form(fields)) => builder.form(&fields),
            }
        }

        async fn send(&self, builder: reqwest::RequestBuilder) -> Result<HttpResponse> {
            let response = builder.send().await.map_err(|e| HttpError::Transport(e.to_string()))?;
            let status = response.status();
            let headers = response.headers().clone();
            let body = response.bytes().await.map_err(|e| HttpError::Transport(e.to_string()))?;
            Ok(HttpResponse::new(status, headers, body))
        }
    }

    #[async_trait]
    impl Transport for ReqwestTransport {
        async fn fetch(&self, request: HttpRequest) -> Result<HttpResponse> {
            let signal = request.signal.clone();
            let builder = self.prepare(request);

            match signal {
                None => self.send(builder).await,
                Some(signal) => {
                    if signal.is_cancelled() {
                        debug!("signal already cancelled, not dispatching");
                        return Err(HttpError::Aborted);
                    }
                    tokio::select! {
                        _ = signal.cancelled() => {
                            debug!("request aborted by signal");
                            Err(HttpError::Aborted)
                        }
                        result = self.send(builder) => result,
                    }
                }
            }
        }
    }

    #[cfg(test)]
    mod tests {
        use http::HeaderMap;
        use tokio_util::sync::CancellationToken;

        use super::*;
        use crate::http::{CacheMode, HttpMethod};

        fn request(cache: Option<CacheMode>, headers: HeaderMap) -> HttpRequest {
            HttpRequest {
                url: "http://127.0.0.1:9/api/echo".to_string(),
                method: HttpMethod::Get,
                headers,
                body: None,
                signal: None,
                cache,
            }
        }

        fn cache_control(request: HttpRequest) -> Option<String> {
            let built = ReqwestTransport::new().prepare(request).build().unwrap();
            built
                .headers()
                .get(CACHE_CONTROL)
                .map(|value| value.to_str().unwrap().to_string())
        }

        #[test]
        fn cache_hint_becomes_cache_control() {
            let no_store = request(Some(CacheMode::NoStore), HeaderMap::new());
            assert_eq!(cache_control(no_store).as_deref(), Some("no-store"));
            let reload = request(Some(CacheMode::Reload), HeaderMap::new());
            assert_eq!(cache_control(reload).as_deref(), Some("no-cache"));
        }

        #[test]
        fn default_cache_mode_adds_no_header() {
            assert_eq!(cache_control(request(Some(CacheMode::Default), HeaderMap::new())), None);
            assert_eq!(cache_control(request(None, HeaderMap::new())), None);
        }

        #[test]
        fn caller_cache_control_is_kept() {
            let mut headers = HeaderMap::new();
            headers.insert(CACHE_CONTROL, HeaderValue::from_static("max-age=60"));
            let request = request(Some(CacheMode::NoStore), headers);
            assert_eq!(cache_control(request).as_deref(), Some("max-age=60"));
        }

        #[tokio::test]
        async fn cancelled_signal_is_rejected_before_dispatch() {
            let signal = CancellationToken::new();
            signal.cancel();
            // Nothing listens on the discard port, so only an early abort succeeds here.
            let request = HttpRequest {
                signal: Some(signal),
                ..request(None, HeaderMap::new())
            };
            let err = ReqwestTransport::new().fetch(request).await.unwrap_err();
            assert!(err.is_aborted());
        }
    }
}
