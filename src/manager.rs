//! Form registry and driver prototypes.

use std::fmt;
use std::sync::Arc;

use indexmap::IndexMap;
use serde_json::Value;

use crate::addon::AddonDriver;
use crate::button::ButtonDriver;
use crate::config::ManagerConfig;
use crate::error::{DriverKind, Error, Result};
use crate::event::EventDispatcher;
use crate::field::FormFieldDriver;
use crate::form::{Form, FormBuilder, FormDefinition, FormServices};
use crate::session::{MemorySession, SessionStore};
use crate::validation::RuleFn;
use crate::view::{DefaultTemplate, FieldRenderer, FormTemplate, NativeFieldRenderer};

/// Prototypes of the addon, button and field drivers, keyed by alias.
///
/// Resolving an alias clones its prototype, assigns the alias and builds
/// the clone.
#[derive(Debug, Clone, Default)]
pub struct DriverRegistry {
    addons: IndexMap<String, AddonDriver>,
    buttons: IndexMap<String, ButtonDriver>,
    fields: IndexMap<String, FormFieldDriver>,
}

impl DriverRegistry {
    /// Registers the built-in drivers that are not registered yet:
    /// the `submit` button and the `html` and `tag` fields.
    pub fn register_defaults(&mut self) {
        self.buttons
            .entry("submit".to_string())
            .or_insert_with(ButtonDriver::submit);
        self.fields
            .entry("html".to_string())
            .or_insert_with(FormFieldDriver::html);
        self.fields
            .entry("tag".to_string())
            .or_insert_with(FormFieldDriver::tag);
    }

    /// Registers an addon prototype.
    pub fn register_addon(&mut self, alias: &str, driver: AddonDriver) -> Result<()> {
        insert_unique(&mut self.addons, DriverKind::Addon, alias, driver)
    }

    /// Registers a button prototype.
    pub fn register_button(&mut self, alias: &str, driver: ButtonDriver) -> Result<()> {
        insert_unique(&mut self.buttons, DriverKind::Button, alias, driver)
    }

    /// Registers a field prototype.
    pub fn register_form_field(&mut self, alias: &str, driver: FormFieldDriver) -> Result<()> {
        insert_unique(&mut self.fields, DriverKind::Field, alias, driver)
    }

    /// Returns true if an addon prototype is registered under `alias`.
    pub fn has_addon(&self, alias: &str) -> bool {
        self.addons.contains_key(alias)
    }

    /// Returns true if a button prototype is registered under `alias`.
    pub fn has_button(&self, alias: &str) -> bool {
        self.buttons.contains_key(alias)
    }

    /// Returns true if a field prototype is registered under `alias`.
    pub fn has_form_field(&self, alias: &str) -> bool {
        self.fields.contains_key(alias)
    }

    /// Built addon driver resolved from its prototype.
    pub fn addon_driver(&self, alias: &str) -> Result<AddonDriver> {
        let mut driver = self
            .addons
            .get(alias)
            .cloned()
            .ok_or_else(|| unresolvable(DriverKind::Addon, alias))?;
        driver.set_alias(alias);
        driver.build()?;
        Ok(driver)
    }

    /// Built button driver resolved from its prototype.
    pub fn button_driver(&self, alias: &str) -> Result<ButtonDriver> {
        let mut driver = self
            .buttons
            .get(alias)
            .cloned()
            .ok_or_else(|| unresolvable(DriverKind::Button, alias))?;
        driver.set_alias(alias);
        driver.build()?;
        Ok(driver)
    }

    /// Built field driver resolved from its prototype. Unknown aliases
    /// resolve to the generic field.
    pub fn form_field_driver(&self, alias: &str) -> Result<FormFieldDriver> {
        let mut driver = self
            .fields
            .get(alias)
            .cloned()
            .unwrap_or_else(FormFieldDriver::generic);
        driver.set_alias(alias);
        driver.build()?;
        Ok(driver)
    }
}

fn insert_unique<T>(
    map: &mut IndexMap<String, T>,
    kind: DriverKind,
    alias: &str,
    driver: T,
) -> Result<()> {
    if map.contains_key(alias) {
        return Err(Error::DuplicateAlias {
            kind,
            alias: alias.to_string(),
        });
    }
    map.insert(alias.to_string(), driver);
    Ok(())
}

fn unresolvable(kind: DriverKind, alias: &str) -> Error {
    Error::DriverUnresolvable {
        kind,
        alias: alias.to_string(),
    }
}

/// Entry point: registers forms and drivers, builds forms on demand and
/// shares the session, event dispatcher and rendering services with them.
///
/// # Examples
///
/// ```
/// use form_core::{FormDefinition, FormManager};
/// use serde_json::json;
///
/// let mut manager = FormManager::default();
/// manager
///     .register_form(
///         "newsletter",
///         FormDefinition::from_value(json!({
///             "fields": {"email": {"type": "email", "required": true}},
///         }))
///         .unwrap(),
///     )
///     .unwrap();
///
/// let form = manager.get("newsletter").unwrap().get().unwrap();
/// assert!(form.is_booted());
/// assert_eq!(form.fields().count(), 1);
/// assert!(form.button("submit").is_some());
/// ```
pub struct FormManager {
    config: Arc<ManagerConfig>,
    registry: DriverRegistry,
    definitions: IndexMap<String, FormDefinition>,
    forms: IndexMap<String, Form>,
    current: Option<String>,
    events: Arc<EventDispatcher>,
    session: Arc<dyn SessionStore>,
    renderer: Arc<dyn FieldRenderer>,
    template: Arc<dyn FormTemplate>,
    rules: IndexMap<String, RuleFn>,
    booted: bool,
}

impl fmt::Debug for FormManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FormManager")
            .field("config", &self.config)
            .field("registry", &self.registry)
            .field("definitions", &self.definitions.keys().collect::<Vec<_>>())
            .field("forms", &self.forms.keys().collect::<Vec<_>>())
            .field("current", &self.current)
            .field("rules", &self.rules.keys().collect::<Vec<_>>())
            .field("booted", &self.booted)
            .finish_non_exhaustive()
    }
}

impl Default for FormManager {
    fn default() -> Self {
        Self::new(ManagerConfig::default())
    }
}

impl FormManager {
    /// Creates a manager with an in-memory session, the native field
    /// renderer and the default template. Boots unless the configuration
    /// disables it.
    pub fn new(config: ManagerConfig) -> Self {
        let boot_enabled = config.boot_enabled;
        let mut manager = Self {
            config: Arc::new(config),
            registry: DriverRegistry::default(),
            definitions: IndexMap::new(),
            forms: IndexMap::new(),
            current: None,
            events: Arc::new(EventDispatcher::new()),
            session: Arc::new(MemorySession::new()),
            renderer: Arc::new(NativeFieldRenderer),
            template: Arc::new(DefaultTemplate),
            rules: IndexMap::new(),
            booted: false,
        };
        if boot_enabled {
            manager.boot();
        }
        manager
    }

    /// Registers the default drivers. Runs once.
    pub fn boot(&mut self) {
        if self.booted {
            return;
        }
        self.registry.register_defaults();
        self.booted = true;
        tracing::debug!("form manager booted");
    }

    /// Returns true once booted.
    pub fn is_booted(&self) -> bool {
        self.booted
    }

    /// Manager configuration.
    pub fn config(&self) -> &ManagerConfig {
        &self.config
    }

    /// Dispatcher shared by every form.
    pub fn events(&self) -> &Arc<EventDispatcher> {
        &self.events
    }

    /// Replaces the event dispatcher of the forms built afterwards.
    pub fn set_event_dispatcher(&mut self, events: Arc<EventDispatcher>) -> &mut Self {
        self.events = events;
        self
    }

    /// Session store shared by every form.
    pub fn session(&self) -> &Arc<dyn SessionStore> {
        &self.session
    }

    /// Replaces the session store of the forms built afterwards.
    pub fn set_session(&mut self, session: Arc<dyn SessionStore>) -> &mut Self {
        self.session = session;
        self
    }

    /// Replaces the field renderer of the forms built afterwards.
    pub fn set_renderer(&mut self, renderer: Arc<dyn FieldRenderer>) -> &mut Self {
        self.renderer = renderer;
        self
    }

    /// Replaces the template of the forms built afterwards.
    pub fn set_template(&mut self, template: Arc<dyn FormTemplate>) -> &mut Self {
        self.template = template;
        self
    }

    /// Registers a validation rule for the forms built afterwards.
    pub fn register_rule<F>(&mut self, name: &str, rule: F) -> &mut Self
    where
        F: Fn(&Value, &[Value]) -> bool + Send + Sync + 'static,
    {
        self.rules.insert(name.to_string(), Arc::new(rule));
        self
    }

    /// Driver prototypes.
    pub fn registry(&self) -> &DriverRegistry {
        &self.registry
    }

    /// Registers a form definition, built on first access.
    pub fn register_form(&mut self, alias: &str, mut definition: FormDefinition) -> Result<&mut Self> {
        if self.definitions.contains_key(alias) || self.forms.contains_key(alias) {
            return Err(Error::DuplicateAlias {
                kind: DriverKind::Form,
                alias: alias.to_string(),
            });
        }
        definition.set_alias(alias);
        self.definitions.insert(alias.to_string(), definition);
        Ok(self)
    }

    /// Builds a form right away.
    pub fn build_form(&mut self, definition: FormDefinition) -> Result<FormBuilder<'_>> {
        let alias = definition.alias().to_string();
        if alias.is_empty() {
            return Err(Error::MissingAlias {
                kind: DriverKind::Form,
            });
        }
        if self.forms.contains_key(&alias) || self.definitions.contains_key(&alias) {
            return Err(Error::DuplicateAlias {
                kind: DriverKind::Form,
                alias,
            });
        }
        self.insert_form(definition)?;
        self.get(&alias)
    }

    fn insert_form(&mut self, definition: FormDefinition) -> Result<()> {
        let services = FormServices {
            config: Arc::clone(&self.config),
            events: Arc::clone(&self.events),
            session: Arc::clone(&self.session),
            renderer: Arc::clone(&self.renderer),
            template: Arc::clone(&self.template),
            rules: self.rules.clone(),
        };
        let alias = definition.alias().to_string();
        let mut form = Form::new(definition, self.forms.len(), &services);
        form.build()?;
        tracing::debug!(form = %alias, index = form.index(), "form built");
        self.forms.insert(alias, form);
        Ok(())
    }

    /// Built form, or registered definition built now. The form boots when
    /// the returned builder hands it over.
    pub fn get(&mut self, alias: &str) -> Result<FormBuilder<'_>> {
        if !self.forms.contains_key(alias) {
            let definition = self
                .definitions
                .shift_remove(alias)
                .ok_or_else(|| Error::FormUnresolvable {
                    alias: alias.to_string(),
                })?;
            self.insert_form(definition)?;
        }
        let form = self
            .forms
            .get_mut(alias)
            .ok_or_else(|| Error::FormUnresolvable {
                alias: alias.to_string(),
            })?;
        Ok(FormBuilder::new(form, &self.registry))
    }

    /// Built form, without booting it.
    pub fn form(&self, alias: &str) -> Option<&Form> {
        self.forms.get(alias)
    }

    /// Every built form, in build order.
    pub fn all(&self) -> impl Iterator<Item = &Form> {
        self.forms.values()
    }

    /// Position of a built form.
    pub fn form_index(&self, alias: &str) -> Option<usize> {
        self.forms.get_index_of(alias)
    }

    /// Registers an addon prototype.
    pub fn register_addon_driver(&mut self, alias: &str, driver: AddonDriver) -> Result<&mut Self> {
        self.registry.register_addon(alias, driver)?;
        Ok(self)
    }

    /// Registers a button prototype.
    pub fn register_button_driver(&mut self, alias: &str, driver: ButtonDriver) -> Result<&mut Self> {
        self.registry.register_button(alias, driver)?;
        Ok(self)
    }

    /// Registers a field prototype.
    pub fn register_form_field_driver(&mut self, alias: &str, driver: FormFieldDriver) -> Result<&mut Self> {
        self.registry.register_form_field(alias, driver)?;
        Ok(self)
    }

    /// Built addon driver resolved from its prototype.
    pub fn get_addon_driver(&self, alias: &str) -> Result<AddonDriver> {
        self.registry.addon_driver(alias)
    }

    /// Built button driver resolved from its prototype.
    pub fn get_button_driver(&self, alias: &str) -> Result<ButtonDriver> {
        self.registry.button_driver(alias)
    }

    /// Built field driver resolved from its prototype.
    pub fn get_form_field_driver(&self, alias: &str) -> Result<FormFieldDriver> {
        self.registry.form_field_driver(alias)
    }

    /// Marks a built form as current, replacing the previous one.
    pub fn set_current_form(&mut self, alias: &str) -> Result<&mut Self> {
        if !self.forms.contains_key(alias) {
            return Err(Error::FormUnresolvable {
                alias: alias.to_string(),
            });
        }
        self.unset_current_form();
        if let Some(form) = self.forms.get(alias) {
            form.on_set_current();
        }
        self.current = Some(alias.to_string());
        Ok(self)
    }

    /// Clears the current form.
    pub fn unset_current_form(&mut self) -> &mut Self {
        if let Some(previous) = self.current.take() {
            if let Some(form) = self.forms.get(&previous) {
                form.on_unset_current();
            }
        }
        self
    }

    /// Form marked as current.
    pub fn current_form(&self) -> Option<&Form> {
        self.current.as_deref().and_then(|alias| self.forms.get(alias))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn defaults_do_not_override_registrations() {
        let mut registry = DriverRegistry::default();
        registry
            .register_button("submit", ButtonDriver::new(json!({"type": "submit", "content": "Go"})))
            .unwrap();
        registry.register_defaults();

        let mut submit = registry.button_driver("submit").unwrap();
        submit.boot(json!({}));
        assert_eq!(submit.params().get_str("content"), Some("Go"));
        assert!(registry.has_form_field("html"));
        assert!(registry.has_form_field("tag"));
    }

    #[test]
    fn unknown_drivers() {
        let registry = DriverRegistry::default();
        assert!(matches!(
            registry.button_driver("reset"),
            Err(Error::DriverUnresolvable { kind: DriverKind::Button, .. })
        ));
        assert!(matches!(
            registry.addon_driver("captcha"),
            Err(Error::DriverUnresolvable { kind: DriverKind::Addon, .. })
        ));
        let field = registry.form_field_driver("email").unwrap();
        assert_eq!(field.alias(), Some("email"));
        assert!(field.is_built());
    }

    #[test]
    fn duplicate_registrations_fail() {
        let mut manager = FormManager::default();
        assert!(matches!(
            manager.register_button_driver("submit", ButtonDriver::submit()),
            Err(Error::DuplicateAlias { kind: DriverKind::Button, .. })
        ));
        manager.register_form("a", FormDefinition::new("ignored")).unwrap();
        assert!(matches!(
            manager.build_form(FormDefinition::new("a")),
            Err(Error::DuplicateAlias { kind: DriverKind::Form, .. })
        ));
        assert!(matches!(
            manager.build_form(FormDefinition::new("")),
            Err(Error::MissingAlias { kind: DriverKind::Form })
        ));
    }

    #[test]
    fn forms_are_indexed_in_build_order() {
        let mut manager = FormManager::default();
        manager.build_form(FormDefinition::new("first")).unwrap();
        manager.register_form("second", FormDefinition::new("second")).unwrap();

        assert_eq!(manager.form_index("second"), None);
        manager.get("second").unwrap();
        assert_eq!(manager.form_index("first"), Some(0));
        assert_eq!(manager.form_index("second"), Some(1));
        assert!(matches!(
            manager.get("third"),
            Err(Error::FormUnresolvable { .. })
        ));
    }

    #[test]
    fn current_form_events() {
        let events = Arc::new(EventDispatcher::with_history());
        let mut manager = FormManager::default();
        manager.set_event_dispatcher(Arc::clone(&events));
        manager.build_form(FormDefinition::new("a")).unwrap();
        manager.build_form(FormDefinition::new("b")).unwrap();

        manager.set_current_form("a").unwrap();
        manager.set_current_form("b").unwrap();
        assert_eq!(manager.current_form().map(|f| f.alias()), Some("b"));
        manager.unset_current_form();
        assert!(manager.current_form().is_none());

        assert_eq!(
            events.history(),
            vec![
                "form.factory.events.a.form.set.current",
                "form.factory.events.a.form.unset.current",
                "form.factory.events.b.form.set.current",
                "form.factory.events.b.form.unset.current",
            ]
        );
    }

    #[test]
    fn boot_can_be_deferred() {
        let manager = FormManager::new(ManagerConfig {
            boot_enabled: false,
            ..ManagerConfig::default()
        });
        assert!(!manager.is_booted());
        assert!(!manager.registry().has_button("submit"));
    }
}
