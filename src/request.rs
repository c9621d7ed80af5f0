//! Owned request and response values exchanged with the host framework.

use indexmap::IndexMap;
use serde_json::{Map, Value};
use url::{form_urlencoded, Url};

use crate::error::Result;

const RELATIVE_BASE: &str = "http://relative.invalid";

/// HTTP request data a form reads during submission handling.
///
/// The host framework converts its own request type into a `FormRequest`;
/// the crate never touches sockets or framework types. All values stay
/// untrusted: fields escape them on output and validation runs on them as
/// submitted.
///
/// # Examples
///
/// ```
/// use form_core::FormRequest;
///
/// let request = FormRequest::new("post", "https://example.org/contact?step=2")
///     .with_header("Referer", "https://example.org/contact")
///     .with_form_body("email=jane%40example.org&topics[]=a&topics[]=b");
///
/// assert!(request.is_method("POST"));
/// assert_eq!(request.header("referer"), Some("https://example.org/contact"));
/// assert_eq!(request.query()["step"], "2");
/// assert_eq!(request.body()["email"], "jane@example.org");
/// assert_eq!(request.body()["topics"][1], "b");
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct FormRequest {
    method: String,
    url: String,
    headers: IndexMap<String, String>,
    query: Value,
    body: Value,
    files: Value,
}

impl Default for FormRequest {
    fn default() -> Self {
        Self::new("GET", "/")
    }
}

impl FormRequest {
    /// Creates a request; query parameters are decoded from `url`.
    pub fn new(method: impl Into<String>, url: impl Into<String>) -> Self {
        let url = url.into();
        let query = url
            .split_once('?')
            .map(|(_, rest)| {
                let query = rest.split('#').next().unwrap_or_default();
                parse_urlencoded(query)
            })
            .unwrap_or_else(|| Value::Object(Map::new()));
        Self {
            method: method.into().to_ascii_uppercase(),
            url,
            headers: IndexMap::new(),
            query,
            body: Value::Object(Map::new()),
            files: Value::Object(Map::new()),
        }
    }

    /// Adds a header; names are case-insensitive.
    pub fn with_header(mut self, name: &str, value: impl Into<String>) -> Self {
        self.headers.insert(name.to_ascii_lowercase(), value.into());
        self
    }

    /// Sets already decoded body fields.
    pub fn with_body(mut self, body: Value) -> Self {
        self.body = body;
        self
    }

    /// Decodes an `application/x-www-form-urlencoded` body.
    pub fn with_form_body(mut self, body: &str) -> Self {
        self.body = parse_urlencoded(body);
        self
    }

    /// Sets uploaded file metadata, keyed by field name.
    pub fn with_files(mut self, files: Value) -> Self {
        self.files = files;
        self
    }

    /// Upper-cased request method.
    pub fn method(&self) -> &str {
        &self.method
    }

    /// Case-insensitive method check.
    pub fn is_method(&self, method: &str) -> bool {
        self.method.eq_ignore_ascii_case(method)
    }

    /// Full request URL as received.
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Case-insensitive header lookup.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .get(&name.to_ascii_lowercase())
            .map(String::as_str)
    }

    /// Decoded query parameters.
    pub fn query(&self) -> &Value {
        &self.query
    }

    /// Decoded body fields.
    pub fn body(&self) -> &Value {
        &self.body
    }

    /// Uploaded file metadata.
    pub fn files(&self) -> &Value {
        &self.files
    }
}

/// Decodes urlencoded pairs into a JSON object.
///
/// `name[]` keys collect into arrays and `name[key]` keys into objects;
/// a repeated plain key keeps its last value.
pub fn parse_urlencoded(input: &str) -> Value {
    let mut root = Map::new();
    for (key, value) in form_urlencoded::parse(input.as_bytes()) {
        let value = Value::String(value.into_owned());
        match key.split_once('[') {
            Some((base, rest)) if rest.ends_with(']') => {
                let inner = &rest[..rest.len() - 1];
                let slot = root.entry(base.to_string()).or_insert(Value::Null);
                if inner.is_empty() {
                    if let Value::Array(items) = slot {
                        items.push(value);
                    } else {
                        *slot = Value::Array(vec![value]);
                    }
                } else {
                    if !slot.is_object() {
                        *slot = Value::Object(Map::new());
                    }
                    if let Value::Object(map) = slot {
                        map.insert(inner.to_string(), value);
                    }
                }
            }
            _ => {
                root.insert(key.into_owned(), value);
            }
        }
    }
    Value::Object(root)
}

/// Redirection answer to a handled submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RedirectResponse {
    /// Target URL
    pub location: String,
    /// HTTP status, always `302`
    pub status: u16,
}

impl RedirectResponse {
    /// Temporary redirection to `location`.
    pub fn to(location: impl Into<String>) -> Self {
        Self {
            location: location.into(),
            status: 302,
        }
    }
}

/// Rewrites redirect URLs: drops query keys and sets the fragment.
///
/// Relative URLs are accepted and rendered back relative.
///
/// ```
/// use form_core::UrlManipulator;
///
/// let url = UrlManipulator::parse("/contact?email=a%40b.c&page=2&_token=x")
///     .unwrap()
///     .without(&["email", "_token"])
///     .with_fragment("Form--contact");
/// assert_eq!(url.render(), "/contact?page=2#Form--contact");
/// ```
#[derive(Debug, Clone)]
pub struct UrlManipulator {
    url: Url,
    relative: bool,
}

impl UrlManipulator {
    /// Parses an absolute or relative URL.
    pub fn parse(input: &str) -> Result<Self> {
        match Url::parse(input) {
            Ok(url) => Ok(Self {
                url,
                relative: false,
            }),
            Err(url::ParseError::RelativeUrlWithoutBase) => {
                let base = Url::parse(RELATIVE_BASE)?;
                Ok(Self {
                    url: base.join(input)?,
                    relative: true,
                })
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Removes the query parameters named in `keys`, including their
    /// `key[...]` variants.
    pub fn without(mut self, keys: &[&str]) -> Self {
        let kept: Vec<(String, String)> = self
            .url
            .query_pairs()
            .filter(|(k, _)| {
                let k: &str = k.as_ref();
                !keys.iter().any(|key| {
                    k == *key || k.strip_prefix(*key).is_some_and(|rest| rest.starts_with('['))
                })
            })
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect();

        if kept.is_empty() {
            self.url.set_query(None);
        } else {
            self.url.query_pairs_mut().clear().extend_pairs(kept);
        }
        self
    }

    /// Sets the fragment; an empty string removes it.
    pub fn with_fragment(mut self, fragment: &str) -> Self {
        let fragment = fragment.trim_start_matches('#');
        if fragment.is_empty() {
            self.url.set_fragment(None);
        } else {
            self.url.set_fragment(Some(fragment));
        }
        self
    }

    /// Renders the URL back to a string.
    pub fn render(&self) -> String {
        if !self.relative {
            return self.url.to_string();
        }
        let mut out = self.url.path().to_string();
        if let Some(query) = self.url.query() {
            out.push('?');
            out.push_str(query);
        }
        if let Some(fragment) = self.url.fragment() {
            out.push('#');
            out.push_str(fragment);
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn default_request_is_get_root() {
        let request = FormRequest::default();
        assert!(request.is_method("get"));
        assert_eq!(request.url(), "/");
        assert_eq!(request.query(), &json!({}));
    }

    #[test]
    fn urlencoded_keys_nest() {
        let value = parse_urlencoded("a=1&a=2&b[]=x&c[k]=v&d=%3Cb%3E");
        assert_eq!(
            value,
            json!({"a": "2", "b": ["x"], "c": {"k": "v"}, "d": "<b>"})
        );
    }

    #[test]
    fn query_ignores_fragment() {
        let request = FormRequest::new("GET", "/search?q=rust#results");
        assert_eq!(request.query(), &json!({"q": "rust"}));
    }

    #[test]
    fn absolute_urls_render_absolute() {
        let url = UrlManipulator::parse("https://example.org/form?x=1#old")
            .unwrap()
            .with_fragment("");
        assert_eq!(url.render(), "https://example.org/form?x=1");
    }

    #[test]
    fn without_drops_array_variants_and_empty_query() {
        let url = UrlManipulator::parse("/f?tags[]=a&tags[]=b")
            .unwrap()
            .without(&["tags"]);
        assert_eq!(url.render(), "/f");
    }

    #[test]
    fn invalid_urls_are_errors() {
        assert!(UrlManipulator::parse("http://[::1").is_err());
    }

    #[test]
    fn redirect_defaults_to_302() {
        let response = RedirectResponse::to("/done");
        assert_eq!(response.status, 302);
        assert_eq!(response.location, "/done");
    }
}
