//! Request configuration and the rules for combining two of them.
//!
//! # Design
//! `RequestConfig` is what callers hand to the client factory and to each
//! verb call. It has no `method` or `data`: verbs pin those. `Config` is the
//! effective description of one call and is what request interceptors see
//! and rewrite.
//!
//! Merging never mutates its inputs. Scalars are replaced when the override
//! carries them, headers are overlaid name by name, and params are
//! shallow-merged.

use std::collections::BTreeMap;

use http::header::{HeaderName, HeaderValue, CONTENT_TYPE};
use http::HeaderMap;
use serde::Deserialize;
use serde_json::Value;
use tokio_util::sync::CancellationToken;

use crate::body::HttpData;
use crate::error::{HttpError, Result};
use crate::http::{CacheMode, HttpMethod};

/// Insertion-ordered string map of query parameters.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Params(Vec<(String, String)>);

impl Params {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set `key`, replacing an existing value in place or appending.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        let value = value.into();
        match self.0.iter_mut().find(|(k, _)| *k == key) {
            Some(slot) => slot.1 = value,
            None => self.0.push((key, value)),
        }
    }

    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.insert(key, value);
        self
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.iter().find(|(k, _)| k == key).map(|(_, v)| v.as_str())
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// `other` over `self`; keys in `other` win.
    pub fn merged(&self, other: &Params) -> Params {
        let mut merged = self.clone();
        for (key, value) in other.iter() {
            merged.insert(key, value);
        }
        merged
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Params {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut params = Params::new();
        for (key, value) in iter {
            params.insert(key, value);
        }
        params
    }
}

impl TryFrom<Value> for Params {
    type Error = HttpError;

    /// Accepts a JSON object whose values are scalars. Strings are taken
    /// verbatim, numbers and booleans are stringified, nulls are dropped.
    fn try_from(value: Value) -> Result<Self> {
        let map = match value {
            Value::Object(map) => map,
            Value::Array(_) => {
                return Err(HttpError::url(
                    "params should be object: Record<string,string> not Array",
                    None,
                ))
            }
            other => {
                return Err(HttpError::url(
                    format!("params should be object, got {other}"),
                    None,
                ))
            }
        };

        let mut params = Params::new();
        for (key, value) in map {
            match value {
                Value::Null => {}
                Value::String(s) => params.insert(key, s),
                Value::Number(n) => params.insert(key, n.to_string()),
                Value::Bool(b) => params.insert(key, b.to_string()),
                nested => {
                    return Err(HttpError::url(
                        format!("param `{key}` must be a scalar, got {nested}"),
                        None,
                    ))
                }
            }
        }
        Ok(params)
    }
}

/// Per-client or per-call options supplied by the caller.
#[derive(Debug, Clone, Default)]
pub struct RequestConfig {
    pub base_url: Option<String>,
    pub headers: HeaderMap,
    pub params: Option<Params>,
    pub signal: Option<CancellationToken>,
    pub cache: Option<CacheMode>,
}

impl RequestConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    /// Add a header, replacing previous values under the same name.
    ///
    /// Fails with a URL error when the name or value is not valid HTTP.
    pub fn header(mut self, name: &str, value: &str) -> Result<Self> {
        let (name, value) = parse_header(name, value)?;
        self.headers.insert(name, value);
        Ok(self)
    }

    pub fn headers(mut self, headers: HeaderMap) -> Self {
        self.headers = headers;
        self
    }

    pub fn params(mut self, params: Params) -> Self {
        self.params = Some(params);
        self
    }

    pub fn signal(mut self, signal: CancellationToken) -> Self {
        self.signal = Some(signal);
        self
    }

    pub fn cache(mut self, cache: CacheMode) -> Self {
        self.cache = Some(cache);
        self
    }
}

/// Effective description of one call.
#[derive(Debug, Clone, Default)]
pub struct Config {
    pub method: HttpMethod,
    pub base_url: Option<String>,
    pub headers: HeaderMap,
    pub params: Option<Params>,
    pub data: Option<HttpData>,
    pub signal: Option<CancellationToken>,
    pub cache: Option<CacheMode>,
}

impl Config {
    /// Base configuration every client starts from: `GET` with a JSON
    /// content type.
    pub fn client_default() -> Self {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        Self {
            method: HttpMethod::Get,
            headers,
            ..Self::default()
        }
    }
}

fn parse_header(name: &str, value: &str) -> Result<(HeaderName, HeaderValue)> {
    let header_name = HeaderName::from_bytes(name.as_bytes())
        .map_err(|e| HttpError::url(format!("invalid header name `{name}`: {e}"), None))?;
    let header_value = HeaderValue::from_str(value)
        .map_err(|e| HttpError::url(format!("invalid value for header `{name}`: {e}"), None))?;
    Ok((header_name, header_value))
}

/// Overlay `overrides` on `base` name by name.
///
/// Every value stored under a name present in `overrides` replaces all of
/// `base`'s values for that name; other names are kept.
pub fn merge_headers(base: &HeaderMap, overrides: &HeaderMap) -> HeaderMap {
    let mut merged = base.clone();
    for name in overrides.keys() {
        merged.remove(name);
        for value in overrides.get_all(name) {
            merged.append(name.clone(), value.clone());
        }
    }
    merged
}

/// Combine a base configuration with caller overrides.
///
/// `method` and `data` come from `base` only; verbs pin them afterwards.
/// Params stay `None` only when neither side has any.
pub fn merge_config(base: &Config, overrides: &RequestConfig) -> Config {
    let params = match (&base.params, &overrides.params) {
        (None, None) => None,
        (Some(base), None) => Some(base.clone()),
        (None, Some(overrides)) => Some(overrides.clone()),
        (Some(base), Some(overrides)) => Some(base.merged(overrides)),
    };

    Config {
        method: base.method,
        base_url: overrides.base_url.clone().or_else(|| base.base_url.clone()),
        headers: merge_headers(&base.headers, &overrides.headers),
        params,
        data: base.data.clone(),
        signal: overrides.signal.clone().or_else(|| base.signal.clone()),
        cache: overrides.cache.or(base.cache),
    }
}

/// Client options in a form hosts can load with serde from any format.
///
/// The library never reads the environment; build one of these from
/// whatever configuration source the host uses.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ClientSettings {
    pub base_url: Option<String>,
    pub headers: BTreeMap<String, String>,
    pub params: Option<BTreeMap<String, String>>,
    pub cache: Option<CacheMode>,
}

impl TryFrom<ClientSettings> for RequestConfig {
    type Error = HttpError;

    fn try_from(settings: ClientSettings) -> Result<Self> {
        let mut headers = HeaderMap::new();
        for (name, value) in &settings.headers {
            let (name, value) = parse_header(name, value)?;
            headers.insert(name, value);
        }
        Ok(RequestConfig {
            base_url: settings.base_url,
            headers,
            params: settings.params.map(|p| p.into_iter().collect()),
            signal: None,
            cache: settings.cache,
        })
    }
}
