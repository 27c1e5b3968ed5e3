//! HTTP transport types shared by the client and its transports.
//!
//! # Design
//! Requests and responses are plain data. `NotionClient::build_*` methods
//! produce an `HttpRequest` without touching the network, a `Transport`
//! executes it, and `parse` classifies the resulting `HttpResponse`. Keeping
//! the values owned (`String`, `Vec`) lets tests construct and inspect them
//! freely.

use std::fmt;

/// HTTP method for a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
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

/// An HTTP request described as plain data.
///
/// `url` is absolute; `query` pairs are appended by the transport.
#[derive(Debug, Clone, PartialEq)]
pub struct HttpRequest {
    pub method: HttpMethod,
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub query: Vec<(String, String)>,
    pub body: Option<String>,
}

impl HttpRequest {
    /// Case-insensitive header lookup.
    pub fn header(&self, name: &str) -> Option<&str> {
        find_header(&self.headers, name)
    }
}

/// An HTTP response described as plain data.
#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub body: String,
}

impl HttpResponse {
    /// Case-insensitive header lookup.
    pub fn header(&self, name: &str) -> Option<&str> {
        find_header(&self.headers, name)
    }

    /// True when the `Content-Type` header announces a JSON body.
    pub fn is_json(&self) -> bool {
        self.header("content-type")
            .is_some_and(|value| value.contains("application/json"))
    }
}

fn find_header<'a>(headers: &'a [(String, String)], name: &str) -> Option<&'a str> {
    headers
        .iter()
        .find(|(key, _)| key.eq_ignore_ascii_case(name))
        .map(|(_, value)| value.as_str())
}

/// Overlay `overrides` onto `base`. An override replaces every base header
/// with the same name (compared case-insensitively); the rest are appended.
pub fn merge_headers(
    base: &[(String, String)],
    overrides: &[(String, String)],
) -> Vec<(String, String)> {
    let mut merged: Vec<(String, String)> = base
        .iter()
        .filter(|(key, _)| !overrides.iter().any(|(o, _)| o.eq_ignore_ascii_case(key)))
        .cloned()
        .collect();
    merged.extend(overrides.iter().cloned());
    merged
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pair(k: &str, v: &str) -> (String, String) {
        (k.to_string(), v.to_string())
    }

    #[test]
    fn header_lookup_ignores_case() {
        let response = HttpResponse {
            status: 200,
            headers: vec![pair("Content-Type", "application/json; charset=utf-8")],
            body: String::new(),
        };
        assert_eq!(
            response.header("content-type"),
            Some("application/json; charset=utf-8")
        );
        assert!(response.is_json());
    }

    #[test]
    fn missing_content_type_is_not_json() {
        let response = HttpResponse {
            status: 200,
            headers: Vec::new(),
            body: "{}".to_string(),
        };
        assert!(!response.is_json());
    }

    #[test]
    fn override_replaces_base_header_of_same_name() {
        let base = vec![
            pair("Content-Type", "application/json"),
            pair("Authorization", "Bearer secret"),
        ];
        let overrides = vec![pair("authorization", "Basic abc")];
        let merged = merge_headers(&base, &overrides);
        assert_eq!(
            merged,
            vec![
                pair("Content-Type", "application/json"),
                pair("authorization", "Basic abc"),
            ]
        );
    }

    #[test]
    fn merge_without_overrides_keeps_base() {
        let base = vec![pair("Accept", "application/json")];
        assert_eq!(merge_headers(&base, &[]), base);
    }

    #[test]
    fn method_display_is_uppercase() {
        assert_eq!(HttpMethod::Patch.to_string(), "PATCH");
    }
}
