//! Form buttons.

use serde_json::{json, Value};

use crate::error::{DriverKind, Error, Result};
use crate::form::FormContext;
use crate::html;
use crate::params::{as_text, merge, ParamsBag};

/// Button of a form.
///
/// A prototype carries its own defaults, merged over the common ones when
/// the button boots.
///
/// # Examples
///
/// ```
/// use form_core::button::ButtonDriver;
/// use serde_json::json;
///
/// let mut reset = ButtonDriver::new(json!({"type": "reset", "content": "Clear"}));
/// reset.set_alias("reset");
/// reset.build().unwrap();
/// reset.boot(json!({"position": 2}));
///
/// assert_eq!(reset.params().get_str("type"), Some("reset"));
/// assert_eq!(reset.position(), 2);
/// assert!(reset.has_wrapper());
/// ```
#[derive(Debug, Clone)]
pub struct ButtonDriver {
    alias: Option<String>,
    defaults: Value,
    params: ParamsBag,
    built: bool,
    booted: bool,
    rendering: bool,
}

impl Default for ButtonDriver {
    fn default() -> Self {
        Self::new(json!({}))
    }
}

impl ButtonDriver {
    /// Creates a prototype with its own defaults.
    pub fn new(defaults: Value) -> Self {
        Self {
            alias: None,
            defaults,
            params: ParamsBag::new(),
            built: false,
            booted: false,
            rendering: false,
        }
    }

    /// Prototype of the `submit` button.
    pub fn submit() -> Self {
        Self::new(json!({"type": "submit", "content": "Send"}))
    }

    /// Common defaults merged with the prototype ones.
    pub fn default_params(&self) -> Value {
        let mut defaults = json!({
            "after": "",
            "attrs": {},
            "before": "",
            "label": "",
            "position": 0,
            "type": "",
            "wrapper": true,
        });
        merge(&mut defaults, self.defaults.clone());
        defaults
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
                kind: DriverKind::Button,
            });
        }
        self.built = true;
        Ok(())
    }

    /// Merges the form button params over the defaults.
    pub fn boot(&mut self, params: Value) {
        if self.booted {
            return;
        }
        let params = if params.is_object() { params } else { json!({}) };
        self.params = ParamsBag::with_defaults(self.default_params(), params);
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

    /// Alias of the button, `""` before it is set.
    pub fn alias(&self) -> &str {
        self.alias.as_deref().unwrap_or_default()
    }

    /// Resolved parameters.
    pub fn params(&self) -> &ParamsBag {
        &self.params
    }

    /// Display position.
    pub fn position(&self) -> i64 {
        self.params.get_i64("position")
    }

    pub(crate) fn set_position(&mut self, position: i64) {
        self.params.set("position", json!(position));
    }

    /// Returns true if a wrapper is rendered.
    pub fn has_wrapper(&self) -> bool {
        self.params.get_bool("wrapper")
    }

    /// Markup rendered before the button.
    pub fn before(&self) -> String {
        self.params.get("before").and_then(as_text).unwrap_or_default()
    }

    /// Markup rendered after the button.
    pub fn after(&self) -> String {
        self.params.get("after").and_then(as_text).unwrap_or_default()
    }

    /// Normalises the wrapper. Runs once.
    pub fn pre_render(&mut self, ctx: &FormContext) {
        if self.rendering {
            return;
        }
        if self.has_wrapper() {
            let mut wrapper = json!({"tag": "div", "attrs": {}});
            if let Some(own) = self.params.get("wrapper").filter(|w| w.is_object()) {
                merge(&mut wrapper, own.clone());
            }
            self.params.set("wrapper", wrapper);

            let alias = self.alias().to_string();
            if !self.params.has("wrapper.attrs.id") {
                self.params.set(
                    "wrapper.attrs.id",
                    json!(format!("FormButton--{}_{}", alias, ctx.index())),
                );
            }
            if !self.params.get_bool("wrapper.attrs.id") {
                self.params.forget("wrapper.attrs.id");
            }
            let user = self.params.get("wrapper.attrs.class").and_then(as_text);
            let class = html::merge_class(user.as_deref(), &format!("FormButton FormButton--{}", alias));
            if class.is_empty() {
                self.params.forget("wrapper.attrs.class");
            } else {
                self.params.set("wrapper.attrs.class", json!(class));
            }
        }
        self.rendering = true;
    }

    /// Native `button` markup.
    pub fn render(&self, ctx: &FormContext) -> String {
        ctx.renderer().render("button", self.params.all())
    }
}
