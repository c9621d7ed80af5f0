//! Hierarchical parameter bags with dotted-path access.
//!
//! Every form, driver and factory keeps its configuration in a [`ParamsBag`]:
//! a JSON object whose nested keys are addressed with dotted paths such as
//! `wrapper.attrs.class`. Numeric segments index into arrays when reading.

use serde_json::{Map, Value};

/// Hierarchical key/value store backed by a JSON object.
///
/// Insertion order is preserved, which matters for field and button
/// declarations that render in the order they were written.
///
/// # Examples
///
/// ```
/// use form_core::ParamsBag;
/// use serde_json::json;
///
/// let mut params = ParamsBag::with_defaults(
///     json!({"tag": "div", "attrs": {"class": "Row"}}),
///     json!({"attrs": {"id": "row-1"}}),
/// );
///
/// assert_eq!(params.get_str("attrs.class"), Some("Row"));
/// assert_eq!(params.get_str("attrs.id"), Some("row-1"));
///
/// params.set("attrs.data-index", json!(3));
/// assert!(params.has("attrs.data-index"));
/// assert_eq!(params.pull("attrs.id"), Some(json!("row-1")));
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct ParamsBag {
    root: Value,
}

impl Default for ParamsBag {
    fn default() -> Self {
        Self::new()
    }
}

impl ParamsBag {
    /// Creates an empty bag.
    pub fn new() -> Self {
        Self {
            root: Value::Object(Map::new()),
        }
    }

    /// Wraps a JSON value. Anything other than an object yields an empty bag.
    pub fn from_value(value: Value) -> Self {
        match value {
            Value::Object(_) => Self { root: value },
            _ => Self::new(),
        }
    }

    /// Deep-merges `params` over `defaults`.
    pub fn with_defaults(defaults: Value, params: Value) -> Self {
        let mut root = defaults;
        merge(&mut root, params);
        Self::from_value(root)
    }

    /// Returns the whole bag as a JSON value.
    pub fn all(&self) -> &Value {
        &self.root
    }

    /// Consumes the bag.
    pub fn into_value(self) -> Value {
        self.root
    }

    /// Returns the value at `path`.
    pub fn get(&self, path: &str) -> Option<&Value> {
        let mut current = &self.root;
        for segment in path.split('.') {
            current = match current {
                Value::Object(map) => map.get(segment)?,
                Value::Array(items) => items.get(segment.parse::<usize>().ok()?)?,
                _ => return None,
            };
        }
        Some(current)
    }

    /// Returns a mutable reference to the value at `path`.
    pub fn get_mut(&mut self, path: &str) -> Option<&mut Value> {
        let mut current = &mut self.root;
        for segment in path.split('.') {
            current = match current {
                Value::Object(map) => map.get_mut(segment)?,
                Value::Array(items) => items.get_mut(segment.parse::<usize>().ok()?)?,
                _ => return None,
            };
        }
        Some(current)
    }

    /// Returns the value at `path`, or `default` when absent.
    pub fn get_or(&self, path: &str, default: Value) -> Value {
        self.get(path).cloned().unwrap_or(default)
    }

    /// Returns the string at `path`.
    pub fn get_str(&self, path: &str) -> Option<&str> {
        self.get(path).and_then(Value::as_str)
    }

    /// Returns the truthiness of the value at `path` (absent is false).
    pub fn get_bool(&self, path: &str) -> bool {
        self.get(path).is_some_and(is_truthy)
    }

    /// Returns the value at `path` cast to an integer (absent is 0).
    pub fn get_i64(&self, path: &str) -> i64 {
        self.get(path).map(as_int).unwrap_or(0)
    }

    /// Returns the items of the array at `path`, or an empty list.
    pub fn get_array(&self, path: &str) -> Vec<Value> {
        match self.get(path) {
            Some(Value::Array(items)) => items.clone(),
            _ => Vec::new(),
        }
    }

    /// Returns the string items of the array at `path`.
    pub fn get_strings(&self, path: &str) -> Vec<String> {
        match self.get(path) {
            Some(Value::Array(items)) => items
                .iter()
                .filter_map(|v| v.as_str().map(str::to_string))
                .collect(),
            Some(Value::String(s)) => vec![s.clone()],
            _ => Vec::new(),
        }
    }

    /// Returns the object at `path`, or an empty map.
    pub fn get_object(&self, path: &str) -> Map<String, Value> {
        match self.get(path) {
            Some(Value::Object(map)) => map.clone(),
            _ => Map::new(),
        }
    }

    /// Returns true if `path` exists, even when its value is `null`.
    pub fn has(&self, path: &str) -> bool {
        self.get(path).is_some()
    }

    /// Sets the value at `path`, creating intermediate objects.
    pub fn set(&mut self, path: &str, value: Value) {
        *self.slot_mut(path) = value;
    }

    /// Sets several dotted paths at once.
    pub fn set_many(&mut self, values: Map<String, Value>) {
        for (path, value) in values {
            self.set(&path, value);
        }
    }

    /// Removes and returns the value at `path`.
    pub fn pull(&mut self, path: &str) -> Option<Value> {
        let (parent, key) = match path.rsplit_once('.') {
            Some((parent, key)) => (self.get_mut(parent)?, key),
            None => (&mut self.root, path),
        };
        match parent {
            Value::Object(map) => map.shift_remove(key),
            Value::Array(items) => {
                let index = key.parse::<usize>().ok().filter(|i| *i < items.len())?;
                Some(items.remove(index))
            }
            _ => None,
        }
    }

    /// Removes the value at `path`.
    pub fn forget(&mut self, path: &str) {
        self.pull(path);
    }

    /// Appends `value` to the array at `path`.
    ///
    /// A missing or `null` slot becomes a one-item array; a scalar slot is
    /// turned into an array holding the previous value first.
    pub fn push(&mut self, path: &str, value: Value) {
        let slot = self.slot_mut(path);
        if let Value::Array(items) = slot {
            items.push(value);
            return;
        }
        let previous = std::mem::take(slot);
        *slot = if previous.is_null() {
            Value::Array(vec![value])
        } else {
            Value::Array(vec![previous, value])
        };
    }

    /// Deep-merges `values` into the bag.
    pub fn merge(&mut self, values: Value) {
        merge(&mut self.root, values);
    }

    fn slot_mut(&mut self, path: &str) -> &mut Value {
        let mut current = &mut self.root;
        for segment in path.split('.') {
            current = child_mut(current, segment);
        }
        current
    }
}

fn child_mut<'a>(current: &'a mut Value, segment: &str) -> &'a mut Value {
    let index = match &*current {
        Value::Array(items) => segment.parse::<usize>().ok().filter(|i| *i < items.len()),
        _ => None,
    };
    match (index, current) {
        (Some(i), Value::Array(items)) => &mut items[i],
        (_, other) => {
            if !other.is_object() {
                *other = Value::Object(Map::new());
            }
            &mut other[segment]
        }
    }
}

/// Deep-merges `overlay` into `base`.
///
/// Objects merge key by key; any other overlay value replaces the base.
pub fn merge(base: &mut Value, overlay: Value) {
    match (base, overlay) {
        (Value::Object(base), Value::Object(overlay)) => {
            for (key, value) in overlay {
                let nested = value.is_object() && base.get(&key).is_some_and(Value::is_object);
                if nested {
                    if let Some(slot) = base.get_mut(&key) {
                        merge(slot, value);
                    }
                } else {
                    base.insert(key, value);
                }
            }
        }
        (base, overlay) => *base = overlay,
    }
}

/// Loose truthiness used for configuration flags.
///
/// `null`, `false`, `0`, `""`, `"0"`, empty arrays and empty objects are
/// falsy; everything else is truthy.
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty() && s != "0",
        Value::Array(items) => !items.is_empty(),
        Value::Object(map) => !map.is_empty(),
    }
}

/// Integer cast of a configuration value.
pub fn as_int(value: &Value) -> i64 {
    match value {
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().map(|f| f as i64))
            .unwrap_or(0),
        Value::Bool(true) => 1,
        Value::String(s) => {
            let s = s.trim();
            s.parse::<i64>()
                .ok()
                .or_else(|| s.parse::<f64>().ok().map(|f| f as i64))
                .unwrap_or(0)
        }
        _ => 0,
    }
}

/// Text rendering of a scalar value; `None` for arrays and objects.
pub fn as_text(value: &Value) -> Option<String> {
    match value {
        Value::Null => Some(String::new()),
        Value::Bool(true) => Some("1".to_string()),
        Value::Bool(false) => Some(String::new()),
        Value::Number(n) => Some(n.to_string()),
        Value::String(s) => Some(s.clone()),
        Value::Array(_) | Value::Object(_) => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn get_walks_objects_and_arrays() {
        let params = ParamsBag::from_value(json!({
            "attrs": {"class": "a"},
            "supports": ["label", "wrapper"],
        }));

        assert_eq!(params.get_str("attrs.class"), Some("a"));
        assert_eq!(params.get_str("supports.1"), Some("wrapper"));
        assert!(params.get("supports.7").is_none());
        assert!(params.get("attrs.class.deeper").is_none());
    }

    #[test]
    fn has_is_true_for_null_values() {
        let params = ParamsBag::from_value(json!({"group": null}));
        assert!(params.has("group"));
        assert!(!params.get_bool("group"));
        assert!(!params.has("title"));
    }

    #[test]
    fn set_creates_intermediate_objects() {
        let mut params = ParamsBag::new();
        params.set("wrapper.attrs.id", json!("row"));
        assert_eq!(params.all(), &json!({"wrapper": {"attrs": {"id": "row"}}}));
    }

    #[test]
    fn set_replaces_scalar_intermediates() {
        let mut params = ParamsBag::from_value(json!({"wrapper": true}));
        params.set("wrapper.tag", json!("div"));
        assert_eq!(params.get_str("wrapper.tag"), Some("div"));
    }

    #[test]
    fn set_many_treats_keys_as_paths() {
        let mut params = ParamsBag::new();
        let mut values = Map::new();
        values.insert("extras.placeholder".to_string(), json!("Your name"));
        values.insert("position".to_string(), json!(4));
        params.set_many(values);

        assert_eq!(params.get_str("extras.placeholder"), Some("Your name"));
        assert_eq!(params.get_i64("position"), 4);
    }

    #[test]
    fn pull_removes_and_keeps_order() {
        let mut params = ParamsBag::from_value(json!({"a": 1, "b": 2, "c": 3}));
        assert_eq!(params.pull("a"), Some(json!(1)));
        let keys: Vec<_> = params.all().as_object().unwrap().keys().cloned().collect();
        assert_eq!(keys, vec!["b", "c"]);
        assert_eq!(params.pull("missing.path"), None);
    }

    #[test]
    fn push_appends_and_creates() {
        let mut params = ParamsBag::new();
        params.push("supports", json!("label"));
        params.push("supports", json!("wrapper"));
        assert_eq!(params.get_strings("supports"), vec!["label", "wrapper"]);

        params.set("single", json!("x"));
        params.push("single", json!("y"));
        assert_eq!(params.get("single"), Some(&json!(["x", "y"])));
    }

    #[test]
    fn with_defaults_merges_nested_objects() {
        let params = ParamsBag::with_defaults(
            json!({"error": {"title": "", "show": -1}, "anchor": false}),
            json!({"error": {"title": "Oops"}, "anchor": "top"}),
        );

        assert_eq!(params.get_str("error.title"), Some("Oops"));
        assert_eq!(params.get_i64("error.show"), -1);
        assert_eq!(params.get_str("anchor"), Some("top"));
    }

    #[test]
    fn non_object_values_yield_empty_bags() {
        assert_eq!(ParamsBag::from_value(json!([1, 2])).all(), &json!({}));
    }

    #[test]
    fn truthiness_follows_loose_rules() {
        for falsy in [json!(null), json!(false), json!(0), json!(""), json!("0"), json!([]), json!({})] {
            assert!(!is_truthy(&falsy), "{falsy} should be falsy");
        }
        for truthy in [json!(true), json!(1), json!("a"), json!([0]), json!({"a": 0})] {
            assert!(is_truthy(&truthy), "{truthy} should be truthy");
        }
    }

    #[test]
    fn int_casts() {
        assert_eq!(as_int(&json!(" 12 ")), 12);
        assert_eq!(as_int(&json!(3.9)), 3);
        assert_eq!(as_int(&json!(null)), 0);
        assert_eq!(as_int(&json!("abc")), 0);
    }

    #[test]
    fn text_of_scalars() {
        assert_eq!(as_text(&json!(5)), Some("5".to_string()));
        assert_eq!(as_text(&json!(null)), Some(String::new()));
        assert_eq!(as_text(&json!([1])), None);
    }
}
