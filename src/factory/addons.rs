use indexmap::IndexMap;
use serde_json::Value;

use crate::addon::AddonDriver;
use crate::error::Result;
use crate::form::FormContext;
use crate::manager::DriverRegistry;

/// Addons attached to a form, keyed by alias.
#[derive(Debug, Clone, Default)]
pub struct AddonsFactory {
    drivers: IndexMap<String, AddonDriver>,
    booted: bool,
}

impl AddonsFactory {
    /// Resolves every addon declared in the form `addons` parameter.
    ///
    /// The parameter is either an object (alias to params, `false` skips the
    /// addon) or a list of aliases.
    pub fn boot(&mut self, ctx: &FormContext, registry: &DriverRegistry) -> Result<()> {
        if self.booted {
            return Ok(());
        }
        ctx.events().trigger("addons.booting");

        for (alias, params) in declared(ctx.params().get("addons")) {
            if params == Value::Bool(false) {
                continue;
            }
            let mut driver = registry.addon_driver(&alias)?;
            driver.boot(params);
            self.drivers.insert(alias, driver);
        }

        self.booted = true;
        ctx.events().trigger("addons.booted");
        Ok(())
    }

    /// Returns true once booted.
    pub fn is_booted(&self) -> bool {
        self.booted
    }

    /// Addon registered under `alias`.
    pub fn get(&self, alias: &str) -> Option<&AddonDriver> {
        self.drivers.get(alias)
    }

    /// Every addon, keyed by alias.
    pub fn all(&self) -> &IndexMap<String, AddonDriver> {
        &self.drivers
    }

    /// Iterates over the addons in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = &AddonDriver> {
        self.drivers.values()
    }

    /// Number of addons.
    pub fn count(&self) -> usize {
        self.drivers.len()
    }
}

/// Alias/params pairs of an object or list declaration.
pub(crate) fn declared(declaration: Option<&Value>) -> Vec<(String, Value)> {
    match declaration {
        Some(Value::Object(map)) => map.iter().map(|(k, v)| (k.clone(), v.clone())).collect(),
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(Value::as_str)
            .map(|alias| (alias.to_string(), Value::Object(Default::default())))
            .collect(),
        _ => Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn declarations_accept_objects_and_lists() {
        let object = json!({"captcha": {"theme": "dark"}, "honeypot": false});
        let pairs = declared(Some(&object));
        assert_eq!(pairs[0], ("captcha".to_string(), json!({"theme": "dark"})));
        assert_eq!(pairs[1], ("honeypot".to_string(), json!(false)));

        let list = json!(["captcha", 3]);
        assert_eq!(declared(Some(&list)), vec![("captcha".to_string(), json!({}))]);

        assert!(declared(Some(&json!("captcha"))).is_empty());
        assert!(declared(None).is_empty());
    }
}
