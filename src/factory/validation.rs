use std::fmt;
use std::sync::Arc;

use indexmap::IndexMap;
use serde_json::Value;

use crate::factory::EventFactory;
use crate::params::ParamsBag;
use crate::validation::{builtin, normalize_rule_name, RuleFn};

/// Resolves and runs validation rules for a form.
///
/// Custom rules registered on the manager or the form definition shadow the
/// built-in rules of the same name.
///
/// # Examples
///
/// ```
/// use std::sync::Arc;
/// use form_core::factory::ValidationFactory;
/// use form_core::ParamsBag;
/// use serde_json::json;
///
/// let mut validation = ValidationFactory::default();
/// validation.register("even", Arc::new(|value, _args| {
///     value.as_str().and_then(|s| s.parse::<i64>().ok()).is_some_and(|n| n % 2 == 0)
/// }));
///
/// let data = ParamsBag::new();
/// assert!(validation.call("even", &json!("4"), &[], &data));
/// assert!(validation.call("!even", &json!("3"), &[], &data));
/// assert!(validation.call("not_empty", &json!("x"), &[], &data));
/// assert!(!validation.call("no-such-rule", &json!("x"), &[], &data));
/// ```
#[derive(Clone, Default)]
pub struct ValidationFactory {
    rules: IndexMap<String, RuleFn>,
    booted: bool,
}

impl fmt::Debug for ValidationFactory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ValidationFactory")
            .field("rules", &self.rules.keys().collect::<Vec<_>>())
            .field("booted", &self.booted)
            .finish()
    }
}

impl ValidationFactory {
    pub(crate) fn new(rules: IndexMap<String, RuleFn>) -> Self {
        let mut factory = Self::default();
        for (name, rule) in rules {
            factory.register(&name, rule);
        }
        factory
    }

    /// Fires the `validate.booting` and `validate.booted` events.
    pub fn boot(&mut self, events: &EventFactory) {
        if self.booted {
            return;
        }
        events.trigger("validate.booting");
        self.booted = true;
        events.trigger("validate.booted");
    }

    /// Returns true once booted.
    pub fn is_booted(&self) -> bool {
        self.booted
    }

    /// Registers a custom rule.
    pub fn register(&mut self, name: &str, rule: RuleFn) {
        self.rules.insert(normalize_rule_name(name), rule);
    }

    /// Returns true if `name` resolves to a custom or built-in rule.
    pub fn has_rule(&self, name: &str) -> bool {
        let key = normalize_rule_name(name.trim_start_matches('!'));
        self.rules.contains_key(&key)
            || builtin(&key, &Value::Null, &[], &ParamsBag::new()).is_some()
    }

    /// Runs `rule` against `value`.
    ///
    /// A leading `!` negates the rule. Unknown rules fail.
    pub fn call(&self, rule: &str, value: &Value, args: &[Value], data: &ParamsBag) -> bool {
        let (negate, name) = match rule.strip_prefix('!') {
            Some(name) => (true, name),
            None => (false, rule),
        };
        let key = normalize_rule_name(name.trim());

        let outcome = match self.rules.get(&key) {
            Some(custom) => Some(custom(value, args)),
            None => builtin(&key, value, args, data),
        };

        match outcome {
            Some(valid) => valid != negate,
            None => {
                tracing::warn!(rule = %rule, "unknown validation rule");
                false
            }
        }
    }
}

impl From<IndexMap<String, RuleFn>> for ValidationFactory {
    fn from(rules: IndexMap<String, RuleFn>) -> Self {
        Self::new(rules)
    }
}

/// Wraps a closure as a [`RuleFn`].
pub fn rule<F>(f: F) -> RuleFn
where
    F: Fn(&Value, &[Value]) -> bool + Send + Sync + 'static,
{
    Arc::new(f)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn negation_inverts_builtins() {
        let validation = ValidationFactory::default();
        let data = ParamsBag::new();
        assert!(validation.call("!equals", &json!("a"), &[json!("none")], &data));
        assert!(!validation.call("!equals", &json!("none"), &[json!("none")], &data));
    }

    #[test]
    fn custom_rules_shadow_builtins() {
        let mut rules = IndexMap::new();
        rules.insert("Email".to_string(), rule(|_, _| true));
        let validation = ValidationFactory::new(rules);

        assert!(validation.call("email", &json!("not an email"), &[], &ParamsBag::new()));
    }

    #[test]
    fn unknown_rules_fail_even_when_negated() {
        let validation = ValidationFactory::default();
        let data = ParamsBag::new();
        assert!(!validation.call("frobnicate", &json!("x"), &[], &data));
        assert!(!validation.call("!frobnicate", &json!("x"), &[], &data));
        assert!(!validation.has_rule("frobnicate"));
        assert!(validation.has_rule("!notEmpty"));
    }
}
