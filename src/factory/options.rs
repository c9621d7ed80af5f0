use serde_json::{json, Value};

use crate::config::ManagerConfig;
use crate::factory::EventFactory;
use crate::params::ParamsBag;

/// Display options of a form, read from its `options` parameter.
#[derive(Debug, Clone, Default)]
pub struct OptionsFactory {
    params: ParamsBag,
    booted: bool,
}

impl OptionsFactory {
    /// Default options; `success` comes from the manager configuration.
    pub fn default_params(config: &ManagerConfig) -> Value {
        json!({
            "anchor": false,
            "error": {
                "title": "",
                "show": -1,
                "teaser": "...",
                "field": false,
                "dismissible": false,
            },
            "success": config.success_message,
        })
    }

    /// Merges the form `options` over the defaults.
    pub fn boot(&mut self, events: &EventFactory, form_params: &ParamsBag, config: &ManagerConfig) {
        if self.booted {
            return;
        }
        events.trigger("options.booting");
        let options = form_params.get("options").cloned().unwrap_or(Value::Null);
        let options = if options.is_object() { options } else { json!({}) };
        self.params = ParamsBag::with_defaults(Self::default_params(config), options);
        events.trigger("options.booted");
        self.booted = true;
    }

    /// Returns true once booted.
    pub fn is_booted(&self) -> bool {
        self.booted
    }

    /// Looks up an option by dotted path.
    pub fn option(&self, path: &str) -> Option<&Value> {
        self.params.get(path)
    }

    /// Every option.
    pub fn params(&self) -> &ParamsBag {
        &self.params
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::EventDispatcher;
    use std::sync::Arc;

    #[test]
    fn options_merge_over_defaults() {
        let events = EventFactory::new("f", Arc::new(EventDispatcher::new()), Vec::new());
        let form_params = ParamsBag::from_value(json!({
            "options": {"anchor": "top", "error": {"title": "Oops"}}
        }));
        let mut options = OptionsFactory::default();
        options.boot(&events, &form_params, &ManagerConfig::default());

        assert_eq!(options.option("anchor"), Some(&json!("top")));
        assert_eq!(options.option("error.title"), Some(&json!("Oops")));
        assert_eq!(options.option("error.teaser"), Some(&json!("...")));
        assert_eq!(
            options.option("success"),
            Some(&json!("The form was submitted with success."))
        );
    }

    #[test]
    fn non_object_options_are_ignored() {
        let events = EventFactory::new("f", Arc::new(EventDispatcher::new()), Vec::new());
        let form_params = ParamsBag::from_value(json!({"options": "nope"}));
        let mut options = OptionsFactory::default();
        options.boot(&events, &form_params, &ManagerConfig::default());
        assert_eq!(options.option("anchor"), Some(&json!(false)));
    }
}
