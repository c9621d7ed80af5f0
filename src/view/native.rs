use serde_json::{json, Map, Value};

use crate::html;
use crate::params::as_text;
use crate::view::FieldRenderer;

const INPUT_TYPES: &[&str] = &[
    "color",
    "date",
    "datetime-local",
    "email",
    "file",
    "image",
    "month",
    "number",
    "password",
    "range",
    "reset",
    "search",
    "submit",
    "tel",
    "text",
    "time",
    "url",
    "week",
];

/// Plain HTML controls.
///
/// # Examples
///
/// ```
/// use form_core::view::{FieldRenderer, NativeFieldRenderer};
/// use serde_json::json;
///
/// let html = NativeFieldRenderer.render(
///     "select",
///     &json!({"name": "color", "value": "b", "choices": {"a": "Red", "b": "Blue"}}),
/// );
/// assert_eq!(
///     html,
///     r#"<select name="color"><option value="a">Red</option><option value="b" selected>Blue</option></select>"#
/// );
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct NativeFieldRenderer;

impl FieldRenderer for NativeFieldRenderer {
    fn render(&self, field_type: &str, args: &Value) -> String {
        match field_type {
            "button" => button(args),
            "checkbox" => checkable("checkbox", args),
            "checkbox-collection" => collection("checkbox", args),
            "hidden" => input("hidden", args, true),
            "label" => label(args),
            "radio" => checkable("radio", args),
            "radio-collection" => collection("radio", args),
            "select" | "select-js" => select(args),
            "tag" => tag(args),
            "textarea" => textarea(args),
            "password" | "file" => input(field_type, args, false),
            other if INPUT_TYPES.contains(&other) => input(other, args, true),
            _ => input("text", args, true),
        }
    }
}

fn attrs_of(args: &Value) -> Map<String, Value> {
    match args.get("attrs") {
        Some(Value::Object(map)) => map.clone(),
        _ => Map::new(),
    }
}

fn text_of(args: &Value, key: &str) -> String {
    args.get(key).and_then(as_text).unwrap_or_default()
}

/// Leading attributes followed by the configured ones, which win on
/// conflicts.
fn with_leading(leading: Map<String, Value>, args: &Value) -> Map<String, Value> {
    let mut map = leading;
    for (key, value) in attrs_of(args) {
        map.insert(key, value);
    }
    map
}

fn name_attr(args: &Value) -> Value {
    match text_of(args, "name") {
        name if name.is_empty() => Value::Null,
        name => Value::String(name),
    }
}

fn input(input_type: &str, args: &Value, with_value: bool) -> String {
    let mut leading = Map::new();
    leading.insert("type".to_string(), json!(input_type));
    leading.insert("name".to_string(), name_attr(args));
    if with_value {
        let value = match args.get("value") {
            None | Some(Value::Null) => Value::Null,
            Some(value) => as_text(value).map_or(Value::Null, Value::String),
        };
        leading.insert("value".to_string(), value);
    }
    html::tag("input", &with_leading(leading, args), "")
}

fn checkable(input_type: &str, args: &Value) -> String {
    let checked_value = args
        .get("checked")
        .and_then(as_text)
        .filter(|v| !v.is_empty())
        .unwrap_or_else(|| "on".to_string());
    let is_checked = args.get("value").and_then(as_text).as_deref() == Some(checked_value.as_str());

    let mut leading = Map::new();
    leading.insert("type".to_string(), json!(input_type));
    leading.insert("name".to_string(), name_attr(args));
    leading.insert("value".to_string(), Value::String(checked_value));
    leading.insert("checked".to_string(), Value::Bool(is_checked));
    html::tag("input", &with_leading(leading, args), "")
}

/// `(value, label)` pairs of the `choices` argument: an object maps values
/// to labels, a list uses each item as both.
fn choices(args: &Value) -> Vec<(String, String)> {
    match args.get("choices") {
        Some(Value::Object(map)) => map
            .iter()
            .map(|(value, label)| (value.clone(), as_text(label).unwrap_or_default()))
            .collect(),
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(as_text)
            .map(|item| (item.clone(), item))
            .collect(),
        _ => Vec::new(),
    }
}

fn selected_values(args: &Value) -> Vec<String> {
    match args.get("value") {
        Some(Value::Array(items)) => items.iter().filter_map(as_text).collect(),
        None | Some(Value::Null) => Vec::new(),
        Some(value) => as_text(value).into_iter().collect(),
    }
}

fn select(args: &Value) -> String {
    let selected = selected_values(args);
    let options: String = choices(args)
        .into_iter()
        .map(|(value, label)| {
            let mut attrs = Map::new();
            let is_selected = selected.contains(&value);
            attrs.insert("value".to_string(), Value::String(value));
            attrs.insert("selected".to_string(), Value::Bool(is_selected));
            html::tag("option", &attrs, &html::escape(&label))
        })
        .collect();

    let mut leading = Map::new();
    leading.insert("name".to_string(), name_attr(args));
    html::tag("select", &with_leading(leading, args), &options)
}

fn collection(input_type: &str, args: &Value) -> String {
    let selected = selected_values(args);
    let name = text_of(args, "name");
    let item_name = if input_type == "checkbox" && !name.is_empty() {
        format!("{}[]", name)
    } else {
        name
    };

    let items: String = choices(args)
        .into_iter()
        .map(|(value, label)| {
            let mut attrs = Map::new();
            attrs.insert("type".to_string(), json!(input_type));
            attrs.insert("name".to_string(), json!(item_name));
            let is_checked = selected.contains(&value);
            attrs.insert("value".to_string(), Value::String(value));
            attrs.insert("checked".to_string(), Value::Bool(is_checked));
            let control = html::tag("input", &attrs, "");
            format!("<label>{} {}</label>", control, html::escape(&label))
        })
        .collect();
    html::tag("div", &attrs_of(args), &items)
}

fn textarea(args: &Value) -> String {
    let mut leading = Map::new();
    leading.insert("name".to_string(), name_attr(args));
    let content = html::escape(&text_of(args, "value"));
    html::tag("textarea", &with_leading(leading, args), &content)
}

fn button(args: &Value) -> String {
    let mut leading = Map::new();
    let button_type = text_of(args, "type");
    leading.insert(
        "type".to_string(),
        json!(if button_type.is_empty() { "button" } else { button_type.as_str() }),
    );
    leading.insert("name".to_string(), name_attr(args));
    html::tag("button", &with_leading(leading, args), &text_of(args, "content"))
}

fn label(args: &Value) -> String {
    let name = args
        .get("tag")
        .and_then(Value::as_str)
        .filter(|t| !t.is_empty())
        .unwrap_or("label");
    let content = match text_of(args, "content") {
        content if content.is_empty() => html::escape(&text_of(args, "value")),
        content => content,
    };
    html::tag(name, &attrs_of(args), &content)
}

fn tag(args: &Value) -> String {
    let content = match args.get("content") {
        Some(content) if !content.is_null() => content.clone(),
        _ => args.get("value").cloned().unwrap_or(Value::Null),
    };
    let mut params = json!({"tag": "div", "attrs": {}});
    if let Some(name) = args.get("tag").filter(|t| t.is_string()) {
        params["tag"] = name.clone();
    }
    params["attrs"] = Value::Object(attrs_of(args));
    params["content"] = content;
    html::tag_from(&params)
}
