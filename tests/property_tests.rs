//! Property tests for the building blocks forms are assembled from.

use form_core::html::{escape, merge_class, tag_name};
use form_core::{FormRequest, ParamsBag, UrlManipulator};
use proptest::prelude::*;
use serde_json::{json, Value};

// Strategy: dotted paths of plain identifiers
fn arb_path() -> impl Strategy<Value = String> {
    prop::collection::vec("[a-z][a-z0-9_]{0,6}", 1..4).prop_map(|segments| segments.join("."))
}

// Strategy: scalar JSON values
fn arb_scalar() -> impl Strategy<Value = Value> {
    prop_oneof![
        Just(Value::Null),
        any::<bool>().prop_map(Value::Bool),
        any::<i32>().prop_map(|n| json!(n)),
        "[ -~]{0,12}".prop_map(Value::String),
    ]
}

proptest! {
    /// Property: a value set at a path reads back unchanged
    #[test]
    fn proptest_params_set_then_get(path in arb_path(), value in arb_scalar()) {
        let mut params = ParamsBag::new();
        params.set(&path, value.clone());
        prop_assert_eq!(params.get(&path), Some(&value));
        prop_assert!(params.has(&path));
    }

    /// Property: pulling a path removes it and returns the stored value
    #[test]
    fn proptest_params_pull_removes(path in arb_path(), value in arb_scalar()) {
        let mut params = ParamsBag::new();
        params.set(&path, value.clone());
        prop_assert_eq!(params.pull(&path), Some(value));
        prop_assert!(!params.has(&path));
    }

    /// Property: defaults never override configured values
    #[test]
    fn proptest_defaults_yield_to_params(path in arb_path(), default in arb_scalar(), own in arb_scalar()) {
        let mut defaults = ParamsBag::new();
        defaults.set(&path, default);
        let mut params = ParamsBag::new();
        params.set(&path, own.clone());

        let merged = ParamsBag::with_defaults(defaults.into_value(), params.into_value());
        prop_assert_eq!(merged.get(&path), Some(&own));
    }

    /// Property: a class with a placeholder keeps both the default and the
    /// user classes
    #[test]
    fn proptest_merge_class_placeholder(
        default in "[A-Za-z][A-Za-z-]{0,10}",
        extra in "[a-z][a-z-]{0,10}",
    ) {
        let merged = merge_class(Some(&format!("%s {}", extra)), &default);
        prop_assert_eq!(merged, format!("{} {}", default, extra));
    }

    /// Property: a class without placeholder replaces the default
    #[test]
    fn proptest_merge_class_replaces(default in "[A-Za-z-]{1,10}", user in "[a-z-]{1,10}") {
        prop_assert_eq!(merge_class(Some(&user), &default), user);
    }

    /// Property: tag names only keep alphanumeric characters and start
    /// lowercase
    #[test]
    fn proptest_tag_name_is_identifier(alias in "[A-Za-z0-9._ -]{0,20}") {
        let name = tag_name(&alias);
        prop_assert!(name.chars().all(char::is_alphanumeric));
        if let Some(first) = name.chars().next() {
            prop_assert!(!first.is_uppercase());
        }
    }

    /// Property: escaped text never contains markup delimiters
    #[test]
    fn proptest_escape_neutralises_markup(text in ".{0,40}") {
        let escaped = escape(&text);
        prop_assert!(!escaped.contains('<'));
        prop_assert!(!escaped.contains('>'));
        prop_assert!(!escaped.contains('"'));
    }

    /// Property: removed query keys never survive, other keys do
    #[test]
    fn proptest_url_without_drops_keys(
        kept in "[a-z]{1,6}",
        dropped in "[A-Z]{1,6}",
        value in "[a-z0-9]{0,6}",
    ) {
        let input = format!("/page?{kept}={value}&{dropped}=x&{dropped}[]=y");
        let url = UrlManipulator::parse(&input).unwrap().without(&[dropped.as_str()]).render();
        prop_assert_eq!(url, format!("/page?{kept}={value}"));
    }

    /// Property: urlencoded bodies decode into the submitted pairs
    #[test]
    fn proptest_form_body_decodes(key in "[a-z]{1,8}", value in "[ -~]{0,16}") {
        let encoded: String = url::form_urlencoded::Serializer::new(String::new())
            .append_pair(&key, &value)
            .finish();
        let request = FormRequest::new("POST", "/").with_form_body(&encoded);
        prop_assert_eq!(request.body().get(&key), Some(&Value::String(value)));
    }
}
