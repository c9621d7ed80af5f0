//! HTML escaping, attribute linearisation and naming helpers.

use serde_json::{Map, Value};

const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "source", "track",
    "wbr",
];

/// Escapes `& < > " '` as HTML entities.
///
/// # Examples
///
/// ```
/// use form_core::html::escape;
///
/// assert_eq!(escape(r#"<a href="x">"#), "&lt;a href=&quot;x&quot;&gt;");
/// ```
pub fn escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#039;"),
            _ => out.push(c),
        }
    }
    out
}

/// Linearises an attribute map.
///
/// `true` renders the bare attribute name, `false` and `null` omit it,
/// arrays are joined with a space and objects are JSON encoded.
///
/// # Examples
///
/// ```
/// use form_core::html::attrs;
/// use serde_json::json;
///
/// let map = json!({"id": "name", "required": true, "disabled": false, "class": ["a", "b"]});
/// assert_eq!(attrs(map.as_object().unwrap()), r#"id="name" required class="a b""#);
/// ```
pub fn attrs(map: &Map<String, Value>) -> String {
    let mut parts = Vec::with_capacity(map.len());
    for (key, value) in map {
        match value {
            Value::Null | Value::Bool(false) => {}
            Value::Bool(true) => parts.push(escape(key)),
            Value::String(s) => parts.push(format!("{}=\"{}\"", escape(key), escape(s))),
            Value::Number(n) => parts.push(format!("{}=\"{}\"", escape(key), n)),
            Value::Array(items) => {
                let joined = items
                    .iter()
                    .filter_map(|v| match v {
                        Value::String(s) => Some(s.clone()),
                        Value::Number(n) => Some(n.to_string()),
                        _ => None,
                    })
                    .collect::<Vec<_>>()
                    .join(" ");
                parts.push(format!("{}=\"{}\"", escape(key), escape(&joined)));
            }
            Value::Object(_) => {
                parts.push(format!("{}=\"{}\"", escape(key), escape(&value.to_string())));
            }
        }
    }
    parts.join(" ")
}

/// Renders an element. Void elements ignore `content` and self-close.
pub fn tag(name: &str, attributes: &Map<String, Value>, content: &str) -> String {
    let name = if name.is_empty() { "div" } else { name };
    let linear = attrs(attributes);
    let open = if linear.is_empty() {
        name.to_string()
    } else {
        format!("{} {}", name, linear)
    };
    if VOID_ELEMENTS.contains(&name.to_ascii_lowercase().as_str()) {
        format!("<{}/>", open)
    } else {
        format!("<{}>{}</{}>", open, content, name)
    }
}

/// Renders a `{tag, attrs, content}` description.
pub fn tag_from(params: &Value) -> String {
    let name = params.get("tag").and_then(Value::as_str).unwrap_or("div");
    let attributes = match params.get("attrs") {
        Some(Value::Object(map)) => map.clone(),
        _ => Map::new(),
    };
    let content = params
        .get("content")
        .and_then(crate::params::as_text)
        .unwrap_or_default();
    tag(name, &attributes, &content)
}

/// Combines a configured class with a default one.
///
/// A user class containing `%s` receives the default in place of the
/// placeholder; any other user class replaces the default.
///
/// # Examples
///
/// ```
/// use form_core::html::merge_class;
///
/// assert_eq!(merge_class(Some("%s wide"), "FormRow"), "FormRow wide");
/// assert_eq!(merge_class(Some("custom"), "FormRow"), "custom");
/// assert_eq!(merge_class(None, "FormRow"), "FormRow");
/// ```
pub fn merge_class(user: Option<&str>, default: &str) -> String {
    match user {
        Some(class) if class.contains("%s") => class.replace("%s", default).trim().to_string(),
        Some(class) => class.to_string(),
        None => default.to_string(),
    }
}

/// Turns an identifier into a human label: `_` and `-` become spaces and
/// the first character is upper-cased.
pub fn human_words(s: &str) -> String {
    let spaced: String = s
        .chars()
        .map(|c| if c == '_' || c == '-' { ' ' } else { c })
        .collect();
    let mut chars = spaced.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// camelCase of an alias; `-`, `_`, `.` and spaces separate words.
///
/// # Examples
///
/// ```
/// use form_core::html::tag_name;
///
/// assert_eq!(tag_name("contact-form"), "contactForm");
/// assert_eq!(tag_name("Site.newsletter_box"), "siteNewsletterBox");
/// ```
pub fn tag_name(alias: &str) -> String {
    let mut out = String::with_capacity(alias.len());
    let words = alias
        .split(|c: char| c == '-' || c == '_' || c == '.' || c.is_whitespace())
        .filter(|w| !w.is_empty());
    for word in words {
        let mut chars = word.chars();
        if let Some(first) = chars.next() {
            if out.is_empty() {
                out.extend(first.to_lowercase());
            } else {
                out.extend(first.to_uppercase());
            }
            out.push_str(chars.as_str());
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn escape_covers_quotes() {
        assert_eq!(escape("Tom & 'Jerry'"), "Tom &amp; &#039;Jerry&#039;");
    }

    #[test]
    fn void_elements_self_close() {
        let map = json!({"type": "text", "name": "q"});
        assert_eq!(
            tag("input", map.as_object().unwrap(), "ignored"),
            r#"<input type="text" name="q"/>"#
        );
        assert_eq!(tag("span", &Map::new(), "*"), "<span>*</span>");
    }

    #[test]
    fn attrs_escapes_values_and_encodes_objects() {
        let map = json!({"title": "a\"b", "data-opts": {"x": 1}, "tabindex": 3});
        assert_eq!(
            attrs(map.as_object().unwrap()),
            r#"title="a&quot;b" data-opts="{&quot;x&quot;:1}" tabindex="3""#
        );
    }

    #[test]
    fn tag_from_reads_description() {
        let html = tag_from(&json!({"tag": "p", "attrs": {"class": "x"}, "content": "hi"}));
        assert_eq!(html, r#"<p class="x">hi</p>"#);
        assert_eq!(tag_from(&json!({})), "<div></div>");
    }

    #[test]
    fn human_words_capitalises() {
        assert_eq!(human_words("first_name"), "First name");
        assert_eq!(human_words("e-mail"), "E mail");
        assert_eq!(human_words(""), "");
    }

    #[test]
    fn tag_name_lowercases_first_letter() {
        assert_eq!(tag_name("Contact"), "contact");
        assert_eq!(tag_name("my form"), "myForm");
        assert_eq!(tag_name("--"), "");
    }
}
