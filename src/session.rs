//! Session storage shared by every form of a manager.

use std::collections::HashMap;
use std::fmt;
use std::sync::{Mutex, MutexGuard, PoisonError};

use rand::Rng;
use serde_json::Value;

use crate::params::ParamsBag;

/// Session services a form relies on.
///
/// Attributes live in named namespaces and are addressed with dotted keys.
/// Flash values survive exactly one request rotation: a value set during a
/// request becomes readable after [`age_flash`](SessionStore::age_flash)
/// and is dropped at the following rotation.
///
/// Implementations must be shareable between threads; the host framework
/// typically wraps its own session in an adapter implementing this trait.
pub trait SessionStore: Send + Sync + fmt::Debug {
    /// Reads a namespaced attribute.
    fn get(&self, namespace: &str, key: &str) -> Option<Value>;

    /// Writes a namespaced attribute.
    fn set(&self, namespace: &str, key: &str, value: Value);

    /// Removes a namespaced attribute.
    fn remove(&self, namespace: &str, key: &str);

    /// Drops every attribute of `namespace`.
    fn clear_namespace(&self, namespace: &str);

    /// Reads a flash value, set either during a previous request or the
    /// current one.
    fn flash_get(&self, key: &str) -> Option<Value>;

    /// Sets a flash value for the next request.
    fn flash_set(&self, key: &str, value: Value);

    /// Appends to a flash list for the next request.
    fn flash_push(&self, key: &str, value: Value);

    /// Start-of-request rotation of flash values.
    fn age_flash(&self);

    /// Returns the CSRF token registered under `id`, generating it on first
    /// use.
    fn token(&self, id: &str) -> String;

    /// Checks `value` against the token registered under `id`.
    fn verify_token(&self, value: &str, id: &str) -> bool;

    /// Forgets the token registered under `id`.
    fn remove_token(&self, id: &str);
}

#[derive(Debug, Default)]
struct SessionData {
    attributes: HashMap<String, ParamsBag>,
    flash_current: ParamsBag,
    flash_next: ParamsBag,
    tokens: HashMap<String, String>,
}

/// In-process [`SessionStore`], one instance per user session.
///
/// # Examples
///
/// ```
/// use form_core::{MemorySession, SessionStore};
/// use serde_json::json;
///
/// let session = MemorySession::new();
/// session.flash_set("form.contact.successful", json!(true));
///
/// // next request
/// session.age_flash();
/// assert_eq!(session.flash_get("form.contact.successful"), Some(json!(true)));
///
/// // and the one after
/// session.age_flash();
/// assert_eq!(session.flash_get("form.contact.successful"), None);
///
/// let token = session.token("Form|contact");
/// assert_eq!(token.len(), 40);
/// assert!(session.verify_token(&token, "Form|contact"));
/// ```
#[derive(Debug, Default)]
pub struct MemorySession {
    data: Mutex<SessionData>,
}

impl MemorySession {
    /// Creates an empty session.
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, SessionData> {
        self.data.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl SessionStore for MemorySession {
    fn get(&self, namespace: &str, key: &str) -> Option<Value> {
        self.lock()
            .attributes
            .get(namespace)
            .and_then(|bag| bag.get(key).cloned())
    }

    fn set(&self, namespace: &str, key: &str, value: Value) {
        self.lock()
            .attributes
            .entry(namespace.to_string())
            .or_default()
            .set(key, value);
    }

    fn remove(&self, namespace: &str, key: &str) {
        if let Some(bag) = self.lock().attributes.get_mut(namespace) {
            bag.forget(key);
        }
    }

    fn clear_namespace(&self, namespace: &str) {
        self.lock().attributes.remove(namespace);
    }

    fn flash_get(&self, key: &str) -> Option<Value> {
        let data = self.lock();
        data.flash_current
            .get(key)
            .or_else(|| data.flash_next.get(key))
            .cloned()
    }

    fn flash_set(&self, key: &str, value: Value) {
        self.lock().flash_next.set(key, value);
    }

    fn flash_push(&self, key: &str, value: Value) {
        self.lock().flash_next.push(key, value);
    }

    fn age_flash(&self) {
        let mut data = self.lock();
        data.flash_current = std::mem::take(&mut data.flash_next);
    }

    fn token(&self, id: &str) -> String {
        self.lock()
            .tokens
            .entry(id.to_string())
            .or_insert_with(generate_token)
            .clone()
    }

    fn verify_token(&self, value: &str, id: &str) -> bool {
        match self.lock().tokens.get(id) {
            Some(token) => constant_time_eq(token.as_bytes(), value.as_bytes()),
            None => false,
        }
    }

    fn remove_token(&self, id: &str) {
        self.lock().tokens.remove(id);
    }
}

/// 40 hexadecimal characters of randomness.
pub fn generate_token() -> String {
    let mut bytes = [0u8; 20];
    rand::rng().fill(&mut bytes);
    bytes.iter().map(|b| format!("{:02x}", b)).collect()
}

fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn attributes_are_namespaced() {
        let session = MemorySession::new();
        session.set("form.a", "request.email", json!("a@b.c"));
        session.set("form.b", "request.email", json!("x@y.z"));

        assert_eq!(session.get("form.a", "request.email"), Some(json!("a@b.c")));
        assert_eq!(session.get("form.a", "request"), Some(json!({"email": "a@b.c"})));

        session.clear_namespace("form.a");
        assert_eq!(session.get("form.a", "request.email"), None);
        assert_eq!(session.get("form.b", "request.email"), Some(json!("x@y.z")));

        session.remove("form.b", "request.email");
        assert_eq!(session.get("form.b", "request.email"), None);
    }

    #[test]
    fn flash_values_are_readable_in_the_setting_request() {
        let session = MemorySession::new();
        session.flash_push("notices.error", json!({"message": "a"}));
        session.flash_push("notices.error", json!({"message": "b"}));

        assert_eq!(
            session.flash_get("notices.error"),
            Some(json!([{"message": "a"}, {"message": "b"}]))
        );
    }

    #[test]
    fn tokens_are_stable_until_removed() {
        let session = MemorySession::new();
        let first = session.token("Form|a");
        assert_eq!(first, session.token("Form|a"));
        assert!(first.chars().all(|c| c.is_ascii_hexdigit()));
        assert!(!session.verify_token("forged", "Form|a"));
        assert!(!session.verify_token(&first, "Form|b"));

        session.remove_token("Form|a");
        assert!(!session.verify_token(&first, "Form|a"));
        assert_ne!(first, session.token("Form|a"));
    }

    #[test]
    fn constant_time_comparison() {
        assert!(constant_time_eq(b"abc", b"abc"));
        assert!(!constant_time_eq(b"abc", b"abd"));
        assert!(!constant_time_eq(b"abc", b"abcd"));
    }
}
