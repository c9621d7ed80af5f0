//! Built-in validation rules.
//!
//! Rules are predicates over a submitted value and a list of arguments.
//! Names are matched case-insensitively with `_` ignored, so `not_empty`,
//! `NotEmpty` and `notEmpty` designate the same rule.

use std::sync::{Arc, LazyLock};

use regex::{Regex, RegexBuilder};
use serde_json::Value;

use crate::params::{as_text, ParamsBag};

/// A validation rule: `(value, args) -> valid`.
pub type RuleFn = Arc<dyn Fn(&Value, &[Value]) -> bool + Send + Sync>;

static EMAIL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z0-9.!#$%&'*+/=?^_`{|}~-]+@[A-Za-z0-9](?:[A-Za-z0-9-]*[A-Za-z0-9])?(?:\.[A-Za-z0-9](?:[A-Za-z0-9-]*[A-Za-z0-9])?)+$")
        .expect("BUG: invalid EMAIL regex literal")
});

static DATA_TAG: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"%%(.*?)%%").expect("BUG: invalid DATA_TAG regex literal")
});

/// Normalised lookup key of a rule name.
pub fn normalize_rule_name(name: &str) -> String {
    name.chars()
        .filter(|c| *c != '_')
        .flat_map(char::to_lowercase)
        .collect()
}

/// Runs the built-in rule `name` (already normalised).
///
/// Returns `None` when no built-in rule has that name. `data` is the
/// submitted data bag consulted by `compare`.
pub fn builtin(name: &str, value: &Value, args: &[Value], data: &ParamsBag) -> Option<bool> {
    let valid = match name {
        "default" => true,
        "notempty" => not_empty(value),
        "equals" => args.first().is_some_and(|expected| loose_eq(value, expected)),
        "email" => text(value).is_some_and(|s| EMAIL.is_match(&s)),
        "url" => text(value).is_some_and(|s| is_url(&s)),
        "numeric" => number(value).is_some(),
        "integer" | "int" => text(value).is_some_and(|s| s.trim().parse::<i64>().is_ok()),
        "alpha" => chars_match(value, args, char::is_alphabetic),
        "alnum" => chars_match(value, args, char::is_alphanumeric),
        "length" => length(value, args),
        "min" => compare_number(value, args, |v, bound| v >= bound),
        "max" => compare_number(value, args, |v, bound| v <= bound),
        "regex" => regex(value, args),
        "in" => contains(value, args),
        "compare" => args
            .first()
            .is_some_and(|tags| loose_eq(value, &interpolate(tags, data))),
        _ => return None,
    };
    Some(valid)
}

fn text(value: &Value) -> Option<String> {
    as_text(value)
}

fn number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok().filter(|f| f.is_finite()),
        _ => None,
    }
}

/// `null`, `false`, blank strings and empty collections are empty. `"0"`
/// and the number zero are values.
fn not_empty(value: &Value) -> bool {
    match value {
        Value::Null | Value::Bool(false) => false,
        Value::String(s) => !s.trim().is_empty(),
        Value::Array(items) => !items.is_empty(),
        Value::Object(map) => !map.is_empty(),
        Value::Bool(true) | Value::Number(_) => true,
    }
}

fn loose_eq(a: &Value, b: &Value) -> bool {
    match (text(a), text(b)) {
        (Some(a), Some(b)) => a == b,
        _ => a == b,
    }
}

fn is_url(s: &str) -> bool {
    url::Url::parse(s).is_ok_and(|u| u.has_host())
}

fn chars_match(value: &Value, args: &[Value], class: fn(char) -> bool) -> bool {
    let extra = args.first().and_then(Value::as_str).unwrap_or_default();
    match text(value) {
        Some(s) if !s.is_empty() => s.chars().all(|c| class(c) || extra.contains(c)),
        _ => false,
    }
}

fn length(value: &Value, args: &[Value]) -> bool {
    let len = match value {
        Value::Array(items) => items.len(),
        Value::Object(map) => map.len(),
        other => match text(other) {
            Some(s) => s.chars().count(),
            None => return false,
        },
    } as f64;
    let min = args.first().and_then(number);
    let max = args.get(1).and_then(number);
    min.map_or(true, |m| len >= m) && max.map_or(true, |m| len <= m)
}

fn compare_number(value: &Value, args: &[Value], cmp: fn(f64, f64) -> bool) -> bool {
    match (number(value), args.first().and_then(number)) {
        (Some(v), Some(bound)) => cmp(v, bound),
        _ => false,
    }
}

/// Accepts plain patterns and `/pattern/flags` delimited ones.
fn regex(value: &Value, args: &[Value]) -> bool {
    let (Some(pattern), Some(subject)) = (args.first().and_then(Value::as_str), text(value)) else {
        return false;
    };
    let (body, flags) = match pattern.strip_prefix('/').and_then(|p| p.rsplit_once('/')) {
        Some((body, flags)) => (body, flags),
        None => (pattern, ""),
    };
    RegexBuilder::new(body)
        .case_insensitive(flags.contains('i'))
        .multi_line(flags.contains('m'))
        .dot_matches_new_line(flags.contains('s'))
        .ignore_whitespace(flags.contains('x'))
        .build()
        .is_ok_and(|re| re.is_match(&subject))
}

fn contains(value: &Value, args: &[Value]) -> bool {
    let haystack: &[Value] = match args {
        [Value::Array(items)] => items.as_slice(),
        [Value::Object(map)] => {
            return map.keys().any(|k| loose_eq(value, &Value::String(k.clone())));
        }
        list => list,
    };
    haystack.iter().any(|candidate| loose_eq(value, candidate))
}

/// Replaces `%%name%%` tags with submitted data; unknown names are left as
/// the bare name.
pub fn interpolate(tags: &Value, data: &ParamsBag) -> Value {
    match tags {
        Value::String(s) => {
            let replaced = DATA_TAG.replace_all(s, |caps: &regex::Captures<'_>| {
                let name = &caps[1];
                data.get(name)
                    .and_then(as_text)
                    .unwrap_or_else(|| name.to_string())
            });
            Value::String(replaced.into_owned())
        }
        Value::Array(items) => Value::Array(items.iter().map(|i| interpolate(i, data)).collect()),
        other => other.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn check(name: &str, value: Value, args: &[Value]) -> bool {
        builtin(&normalize_rule_name(name), &value, args, &ParamsBag::new())
            .unwrap_or_else(|| panic!("{name} is not a built-in rule"))
    }

    #[test]
    fn names_are_normalised() {
        assert_eq!(normalize_rule_name("Not_Empty"), "notempty");
        assert!(builtin("unknown", &json!(1), &[], &ParamsBag::new()).is_none());
    }

    #[test]
    fn not_empty_treats_zero_as_value() {
        assert!(check("notEmpty", json!("0"), &[]));
        assert!(check("notEmpty", json!(0), &[]));
        assert!(!check("notEmpty", json!("  "), &[]));
        assert!(!check("notEmpty", json!(null), &[]));
        assert!(!check("notEmpty", json!([]), &[]));
    }

    #[test]
    fn equals_compares_as_text() {
        assert!(check("equals", json!("1"), &[json!(1)]));
        assert!(!check("equals", json!("a"), &[json!("b")]));
        assert!(!check("equals", json!("a"), &[]));
    }

    #[test]
    fn email_and_url() {
        assert!(check("email", json!("jane.doe@example.org"), &[]));
        assert!(!check("email", json!("jane@"), &[]));
        assert!(!check("email", json!("jane@localhost"), &[]));
        assert!(check("url", json!("https://example.org/a?b=c"), &[]));
        assert!(!check("url", json!("example.org"), &[]));
    }

    #[test]
    fn numbers() {
        assert!(check("numeric", json!(" 3.5 "), &[]));
        assert!(!check("numeric", json!("3,5"), &[]));
        assert!(check("integer", json!("-12"), &[]));
        assert!(!check("integer", json!("1.2"), &[]));
        assert!(check("min", json!("18"), &[json!(18)]));
        assert!(!check("max", json!("120"), &[json!("99")]));
    }

    #[test]
    fn character_classes() {
        assert!(check("alpha", json!("Zoé"), &[]));
        assert!(!check("alpha", json!("Zoe 2"), &[]));
        assert!(check("alpha", json!("Jean-Luc"), &[json!("-")]));
        assert!(check("alnum", json!("abc123"), &[]));
        assert!(!check("alnum", json!(""), &[]));
    }

    #[test]
    fn length_bounds_are_inclusive_and_optional() {
        assert!(check("length", json!("abc"), &[json!(3), json!(3)]));
        assert!(!check("length", json!("abcd"), &[json!(1), json!(3)]));
        assert!(check("length", json!("abcd"), &[json!(2)]));
        assert!(check("length", json!("ab"), &[json!(null), json!(5)]));
        assert!(check("length", json!(["a", "b"]), &[json!(2)]));
    }

    #[test]
    fn regex_accepts_delimited_patterns() {
        assert!(check("regex", json!("ABC"), &[json!("/^[a-c]+$/i")]));
        assert!(!check("regex", json!("ABC"), &[json!("^[a-c]+$")]));
        assert!(!check("regex", json!("a"), &[json!("(")]));
    }

    #[test]
    fn in_accepts_lists_and_maps() {
        assert!(check("in", json!("b"), &[json!(["a", "b"])]));
        assert!(check("in", json!("fr"), &[json!({"fr": "French"})]));
        assert!(check("in", json!("2"), &[json!(1), json!(2)]));
        assert!(!check("in", json!("c"), &[json!(["a", "b"])]));
    }

    #[test]
    fn compare_reads_submitted_data() {
        let data = ParamsBag::from_value(json!({"password": "s3cret"}));
        let args = [json!("%%password%%")];
        assert_eq!(builtin("compare", &json!("s3cret"), &args, &data), Some(true));
        assert_eq!(builtin("compare", &json!("other"), &args, &data), Some(false));
        assert_eq!(interpolate(&json!("%%missing%%!"), &data), json!("missing!"));
    }
}
