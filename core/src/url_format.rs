//! URL resolution and query string composition.
//!
//! # Design
//! Resolution happens in two steps. `format_url` turns the path a caller
//! passed to a verb into an absolute URL using the configured base.
//! `build_request_url` then merges the query string already embedded in that
//! URL with the explicit params and drops any fragment or credentials,
//! leaving `origin + path + ?query`.
//!
//! Query merging is a positional union: the URL's own pairs come first, the
//! explicit params follow, and repeated names are kept on both sides.

use serde_json::Value;
use url::form_urlencoded;
use url::Url;

use crate::config::Params;
use crate::error::{HttpError, Result};

const URL_NOT_GENERATED: &str = "Not possible to generate Url endpoint.";

/// Resolve `path` against `base_url`.
///
/// Absolute `http(s)` paths are returned unchanged and `base_url` is
/// ignored. Without a base the path is returned as given.
pub fn format_url(path: &str, base_url: Option<&str>) -> Result<String> {
    if path.starts_with("http://") || path.starts_with("https://") {
        return Ok(path.to_string());
    }

    let base = match base_url {
        Some(base) if !base.is_empty() => base,
        _ => return Ok(path.to_string()),
    };

    if !base.starts_with("http") {
        return Err(HttpError::url("baseURL should be a complete base url.", None));
    }

    let endpoint = path.strip_prefix('/').unwrap_or(path);
    let base = if base.ends_with('/') {
        base.to_string()
    } else {
        format!("{base}/")
    };

    Url::parse(&base)
        .and_then(|base| base.join(endpoint))
        .map(String::from)
        .map_err(|e| HttpError::url(e.to_string(), Some(URL_NOT_GENERATED)))
}

/// `format_url` for loosely typed input, e.g. a path read from JSON.
pub fn format_url_value(path: &Value, base_url: Option<&str>) -> Result<String> {
    match path {
        Value::String(path) => format_url(path, base_url),
        _ => Err(HttpError::url("Only string is allowed as url", None)),
    }
}

/// Encode params as `key=value&...`; empty or absent params give `""`.
pub fn format_query_params(params: Option<&Params>) -> String {
    match params {
        Some(params) if !params.is_empty() => form_urlencoded::Serializer::new(String::new())
            .extend_pairs(params.iter())
            .finish(),
        _ => String::new(),
    }
}

/// Final URL handed to the transport.
///
/// Fails with a URL error when `formatted` is not an absolute `http(s)` URL,
/// which is the case for a relative path on a client without a base.
pub fn build_request_url(formatted: &str, params: Option<&Params>) -> Result<String> {
    let url = Url::parse(formatted)
        .map_err(|e| HttpError::url(format!("{e}: {formatted}"), Some(URL_NOT_GENERATED)))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(HttpError::url(
            format!("unsupported scheme `{}` in {formatted}", url.scheme()),
            Some(URL_NOT_GENERATED),
        ));
    }

    let explicit = format_query_params(params);
    let mut query = form_urlencoded::Serializer::new(String::new());
    query.extend_pairs(url.query_pairs());
    query.extend_pairs(form_urlencoded::parse(explicit.as_bytes()));
    let query = query.finish();

    let base_and_path = format!("{}{}", url.origin().ascii_serialization(), url.path());
    if query.is_empty() {
        Ok(base_and_path)
    } else {
        Ok(format!("{base_and_path}?{query}"))
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn absolute_path_ignores_base() {
        assert_eq!(format_url("http://x/y", Some("http://z")).unwrap(), "http://x/y");
        assert_eq!(
            format_url("https://buscacode.com/api/user/2/pet", Some("https://other.com")).unwrap(),
            "https://buscacode.com/api/user/2/pet"
        );
    }

    #[test]
    fn relative_path_without_base_is_unchanged() {
        assert_eq!(format_url("/user", None).unwrap(), "/user");
        assert_eq!(format_url("user", Some("")).unwrap(), "user");
    }

    #[test]
    fn joins_path_onto_base_directory() {
        assert_eq!(
            format_url("/resource", Some("https://buscacode.com/api")).unwrap(),
            "https://buscacode.com/api/resource"
        );
        assert_eq!(
            format_url("resource", Some("https://buscacode.com/api/")).unwrap(),
            "https://buscacode.com/api/resource"
        );
        assert_eq!(
            format_url("/user", Some("https://buscacode.com")).unwrap(),
            "https://buscacode.com/user"
        );
    }

    #[test]
    fn base_without_scheme_is_rejected() {
        let err = format_url("/user", Some("buscacode.com")).unwrap_err();
        assert!(matches!(err, HttpError::Url { .. }));
        assert_eq!(err.message(), "baseURL should be a complete base url.");
    }

    #[test]
    fn unparseable_base_keeps_cause() {
        let err = format_url("/user", Some("http://[::1")).unwrap_err();
        assert!(matches!(err, HttpError::Url { .. }));
        assert_eq!(err.quick_message(), URL_NOT_GENERATED);
        assert_ne!(err.message(), URL_NOT_GENERATED);
    }

    #[test]
    fn non_string_path_is_rejected() {
        let err = format_url_value(&json!(42), Some("https://buscacode.com")).unwrap_err();
        assert_eq!(err.message(), "Only string is allowed as url");
        assert_eq!(
            format_url_value(&json!("/user"), Some("https://buscacode.com")).unwrap(),
            "https://buscacode.com/user"
        );
    }

    #[test]
    fn query_params_encoding() {
        assert_eq!(format_query_params(None), "");
        assert_eq!(format_query_params(Some(&Params::new())), "");
        let params = Params::new().with("q", "a b").with("lang", "日本");
        assert_eq!(format_query_params(Some(&params)), "q=a+b&lang=%E6%97%A5%E6%9C%AC");
    }

    #[test]
    fn merges_embedded_and_explicit_query() {
        let params = Params::new().with("b", "2");
        assert_eq!(
            build_request_url("https://buscacode.com/resource?a=1", Some(&params)).unwrap(),
            "https://buscacode.com/resource?a=1&b=2"
        );
    }

    #[test]
    fn repeated_names_are_preserved() {
        let params = Params::new().with("a", "2");
        assert_eq!(
            build_request_url("http://localhost:3000/x?a=1&a=3", Some(&params)).unwrap(),
            "http://localhost:3000/x?a=1&a=3&a=2"
        );
    }

    #[test]
    fn drops_fragment_and_empty_query() {
        assert_eq!(
            build_request_url("https://buscacode.com/api/wait#top", None).unwrap(),
            "https://buscacode.com/api/wait"
        );
    }

    #[test]
    fn relative_url_cannot_be_dispatched() {
        let err = build_request_url("/user", None).unwrap_err();
        assert!(matches!(err, HttpError::Url { .. }));
    }
}
