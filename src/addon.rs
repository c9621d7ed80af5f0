//! Form addons.
//!
//! An addon contributes default options to the form (under
//! `addons.<alias>`) and to every field of the form.

use std::fmt;
use std::sync::Arc;

use serde_json::{json, Map, Value};

use crate::error::{DriverKind, Error, Result};
use crate::params::ParamsBag;

/// Defaults contributed by an addon.
pub trait AddonKind: Send + Sync + fmt::Debug {
    /// Form-level options the configured ones are merged over.
    fn default_form_options(&self) -> Value {
        json!({})
    }

    /// Options merged into `addons.<alias>` of every field.
    fn default_field_options(&self) -> Value {
        json!({})
    }
}

/// Addon without defaults.
#[derive(Debug, Clone, Copy, Default)]
pub struct PlainAddon;

impl AddonKind for PlainAddon {}

/// Addon attached to a form.
#[derive(Debug, Clone)]
pub struct AddonDriver {
    alias: Option<String>,
    kind: Arc<dyn AddonKind>,
    params: ParamsBag,
    built: bool,
    booted: bool,
}

impl Default for AddonDriver {
    fn default() -> Self {
        Self::new(PlainAddon)
    }
}

impl AddonDriver {
    /// Creates a prototype of the given kind.
    pub fn new(kind: impl AddonKind + 'static) -> Self {
        Self {
            alias: None,
            kind: Arc::new(kind),
            params: ParamsBag::new(),
            built: false,
            booted: false,
        }
    }

    /// Sets the alias unless one is already set.
    pub fn set_alias(&mut self, alias: &str) -> &mut Self {
        if self.alias.is_none() {
            self.alias = Some(alias.to_string());
        }
        self
    }

    /// Checks the driver identity.
    pub fn build(&mut self) -> Result<()> {
        if self.built {
            return Ok(());
        }
        if self.alias.as_deref().map_or(true, str::is_empty) {
            return Err(Error::MissingAlias {
                kind: DriverKind::Addon,
            });
        }
        self.built = true;
        Ok(())
    }

    /// Merges the form addon params over the form defaults of the kind.
    pub fn boot(&mut self, params: Value) {
        if self.booted {
            return;
        }
        let params = if params.is_object() { params } else { json!({}) };
        self.params = ParamsBag::with_defaults(self.kind.default_form_options(), params);
        self.booted = true;
    }

    /// Returns true once built.
    pub fn is_built(&self) -> bool {
        self.built
    }

    /// Returns true once booted.
    pub fn is_booted(&self) -> bool {
        self.booted
    }

    /// Alias of the addon, `""` before it is set.
    pub fn alias(&self) -> &str {
        self.alias.as_deref().unwrap_or_default()
    }

    /// Resolved form options.
    pub fn params(&self) -> &ParamsBag {
        &self.params
    }

    /// Field defaults contributed by the kind.
    pub fn default_field_options(&self) -> Map<String, Value> {
        match self.kind.default_field_options() {
            Value::Object(map) => map,
            _ => Map::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug)]
    struct Captcha;

    impl AddonKind for Captcha {
        fn default_form_options(&self) -> Value {
            json!({"theme": "light", "size": "normal"})
        }

        fn default_field_options(&self) -> Value {
            json!({"enabled": false})
        }
    }

    #[test]
    fn boot_merges_over_kind_defaults() {
        let mut addon = AddonDriver::new(Captcha);
        addon.set_alias("captcha");
        addon.build().unwrap();
        addon.boot(json!({"theme": "dark"}));

        assert_eq!(addon.params().get_str("theme"), Some("dark"));
        assert_eq!(addon.params().get_str("size"), Some("normal"));
        assert_eq!(addon.default_field_options().get("enabled"), Some(&json!(false)));
    }

    #[test]
    fn build_requires_alias() {
        let mut addon = AddonDriver::default();
        assert!(matches!(
            addon.build(),
            Err(Error::MissingAlias { kind: DriverKind::Addon })
        ));
    }
}
