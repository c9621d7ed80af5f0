use std::sync::Arc;

use serde_json::{Map, Value};

use crate::factory::EventFactory;
use crate::session::SessionStore;

/// Form-scoped access to the [`SessionStore`].
///
/// Attributes and flash values live under the `form.<alias>` namespace and
/// the CSRF token is registered under `Form|<alias>`.
#[derive(Debug, Clone)]
pub struct SessionFactory {
    store: Arc<dyn SessionStore>,
    namespace: String,
    token_id: String,
    booted: bool,
}

impl SessionFactory {
    pub(crate) fn new(alias: &str, store: Arc<dyn SessionStore>) -> Self {
        Self {
            store,
            namespace: format!("form.{}", alias),
            token_id: format!("Form|{}", alias),
            booted: false,
        }
    }

    /// Fires the `session.booting` and `session.booted` events.
    pub fn boot(&mut self, events: &EventFactory) {
        if self.booted {
            return;
        }
        events.trigger("session.booting");
        self.booted = true;
        events.trigger("session.booted");
    }

    /// Returns true once booted.
    pub fn is_booted(&self) -> bool {
        self.booted
    }

    /// Namespace of the form attributes.
    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    /// Reads an attribute.
    pub fn get(&self, key: &str) -> Option<Value> {
        self.store.get(&self.namespace, key)
    }

    /// Writes an attribute.
    pub fn set(&self, key: &str, value: Value) {
        self.store.set(&self.namespace, key, value);
    }

    /// Drops every attribute and the CSRF token of the form.
    pub fn clear(&self) {
        self.store.remove_token(&self.token_id);
        self.store.clear_namespace(&self.namespace);
    }

    /// Reads a flash value of the form.
    pub fn flash_get(&self, key: &str) -> Option<Value> {
        self.store.flash_get(&self.flash_key(key))
    }

    /// Flashes every entry of `values` under the form namespace.
    pub fn flash_set(&self, values: Map<String, Value>) {
        for (key, value) in values {
            self.store.flash_set(&self.flash_key(&key), value);
        }
    }

    /// Appends to a flash list of the form.
    pub fn flash_push(&self, key: &str, value: Value) {
        self.store.flash_push(&self.flash_key(key), value);
    }

    /// CSRF token of the form.
    pub fn token(&self) -> String {
        self.store.token(&self.token_id)
    }

    /// Checks a submitted CSRF token.
    pub fn verify_token(&self, value: &str) -> bool {
        self.store.verify_token(value, &self.token_id)
    }

    /// Shared store.
    pub fn store(&self) -> &Arc<dyn SessionStore> {
        &self.store
    }

    fn flash_key(&self, key: &str) -> String {
        format!("{}.{}", self.namespace, key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::EventDispatcher;
    use crate::session::MemorySession;
    use serde_json::json;

    fn factory(alias: &str, store: &Arc<MemorySession>) -> SessionFactory {
        let store: Arc<dyn SessionStore> = store.clone();
        SessionFactory::new(alias, store)
    }

    #[test]
    fn boot_fires_lifecycle_events() {
        let dispatcher = Arc::new(EventDispatcher::with_history());
        let events = EventFactory::new("contact", Arc::clone(&dispatcher), Vec::new());
        let mut session = factory("contact", &Arc::new(MemorySession::new()));

        session.boot(&events);
        session.boot(&events);

        assert!(session.is_booted());
        assert_eq!(dispatcher.history().len(), 2);
    }

    #[test]
    fn clear_drops_attributes_and_token() {
        let store = Arc::new(MemorySession::new());
        let session = factory("contact", &store);
        session.set("request.email", json!("a@b.c"));
        let token = session.token();

        session.clear();

        assert_eq!(session.get("request.email"), None);
        assert!(!session.verify_token(&token));
    }

    #[test]
    fn flash_keys_are_namespaced() {
        let store = Arc::new(MemorySession::new());
        let contact = factory("contact", &store);
        let other = factory("other", &store);

        let mut values = Map::new();
        values.insert("successful".to_string(), json!(true));
        contact.flash_set(values);
        contact.flash_push("notices.error", json!({"message": "x"}));

        assert_eq!(contact.flash_get("successful"), Some(json!(true)));
        assert_eq!(other.flash_get("successful"), None);
        assert_eq!(
            store.flash_get("form.contact.notices.error"),
            Some(json!([{"message": "x"}]))
        );
    }
}
