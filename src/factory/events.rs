use std::fmt;
use std::sync::{Arc, Mutex, PoisonError};

use serde_json::Value;

use crate::event::{EventDispatcher, FormEvent, Listener, ListenerId};

/// Listener declared on a form definition, attached when the form boots.
#[derive(Clone)]
pub struct ListenerDefinition {
    /// Event name relative to the form namespace
    pub name: String,
    /// Higher runs first
    pub priority: i32,
    /// Callback
    pub listener: Listener,
}

impl fmt::Debug for ListenerDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ListenerDefinition")
            .field("name", &self.name)
            .field("priority", &self.priority)
            .finish_non_exhaustive()
    }
}

/// Form-scoped view of the shared [`EventDispatcher`].
///
/// Names are namespaced as `form.factory.events.<alias>.<name>`. Listeners
/// attached through the factory are detached when it drops, so forms built
/// per request on a shared dispatcher do not pile up listeners.
#[derive(Debug)]
pub struct EventFactory {
    alias: String,
    dispatcher: Arc<EventDispatcher>,
    pending: Vec<ListenerDefinition>,
    attached: Mutex<Vec<ListenerId>>,
    booted: bool,
}

impl EventFactory {
    pub(crate) fn new(
        alias: &str,
        dispatcher: Arc<EventDispatcher>,
        listeners: Vec<ListenerDefinition>,
    ) -> Self {
        Self {
            alias: alias.to_string(),
            dispatcher,
            pending: listeners,
            attached: Mutex::new(Vec::new()),
            booted: false,
        }
    }

    /// Attaches the listeners of the form definition, then fires
    /// `events.booted`.
    pub fn boot(&mut self) {
        if self.booted {
            return;
        }
        for definition in std::mem::take(&mut self.pending) {
            self.on(&definition.name, definition.priority, definition.listener);
        }
        self.booted = true;
        self.trigger("events.booted");
    }

    /// Returns true once booted.
    pub fn is_booted(&self) -> bool {
        self.booted
    }

    /// Full dispatcher name of a form event.
    pub fn namespaced(&self, name: &str) -> String {
        format!("form.factory.events.{}.{}", self.alias, name)
    }

    /// Attaches a listener to a form event, for the lifetime of the form.
    pub fn on(&self, name: &str, priority: i32, listener: Listener) -> ListenerId {
        let id = self.dispatcher.on(&self.namespaced(name), priority, listener);
        self.attached
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(id);
        id
    }

    /// Fires a payload-less event.
    pub fn trigger(&self, name: &str) -> FormEvent {
        self.trigger_with(name, None, None)
    }

    /// Fires an event about `subject` carrying `value`; returns the event
    /// as left by the listeners.
    pub fn trigger_with(&self, name: &str, subject: Option<&str>, value: Option<Value>) -> FormEvent {
        let mut event = FormEvent::new(name, self.alias.as_str());
        event.subject = subject.map(str::to_string);
        event.value = value;
        self.dispatcher.dispatch(&self.namespaced(name), &mut event);
        event
    }

    /// Shared dispatcher.
    pub fn dispatcher(&self) -> &Arc<EventDispatcher> {
        &self.dispatcher
    }
}

impl Drop for EventFactory {
    fn drop(&mut self) {
        let attached = self.attached.get_mut().unwrap_or_else(PoisonError::into_inner);
        for id in attached.drain(..) {
            self.dispatcher.off(id);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn listeners_are_namespaced_per_form() {
        let dispatcher = Arc::new(EventDispatcher::new());
        let contact = EventFactory::new("contact", Arc::clone(&dispatcher), Vec::new());
        let newsletter = EventFactory::new("newsletter", Arc::clone(&dispatcher), Vec::new());

        contact.on(
            "field.get.value",
            0,
            Arc::new(|event: &mut FormEvent| event.value = Some(json!("changed"))),
        );

        let event = contact.trigger_with("field.get.value", Some("email"), Some(json!("a")));
        assert_eq!(event.value, Some(json!("changed")));
        assert_eq!(event.subject.as_deref(), Some("email"));

        let event = newsletter.trigger_with("field.get.value", None, Some(json!("a")));
        assert_eq!(event.value, Some(json!("a")));
    }

    #[test]
    fn boot_attaches_pending_listeners_once() {
        let dispatcher = Arc::new(EventDispatcher::with_history());
        let listener: Listener = Arc::new(|event: &mut FormEvent| {
            let count = event.value.as_ref().and_then(Value::as_i64).unwrap_or(0);
            event.value = Some(json!(count + 1));
        });
        let mut events = EventFactory::new(
            "contact",
            Arc::clone(&dispatcher),
            vec![ListenerDefinition {
                name: "count".to_string(),
                priority: 0,
                listener,
            }],
        );

        events.boot();
        events.boot();

        assert!(events.is_booted());
        assert_eq!(events.trigger("count").value, Some(json!(1)));
        assert_eq!(
            dispatcher.history()[0],
            "form.factory.events.contact.events.booted"
        );
    }

    #[test]
    fn dropping_the_factory_detaches_its_listeners() {
        let dispatcher = Arc::new(EventDispatcher::new());
        let host: Listener = Arc::new(|_event: &mut FormEvent| {});
        dispatcher.on("form.factory.events.contact.count", 0, host);

        let events = EventFactory::new("contact", Arc::clone(&dispatcher), Vec::new());
        events.on("count", 0, Arc::new(|_event: &mut FormEvent| {}));
        events.on("other", 0, Arc::new(|_event: &mut FormEvent| {}));
        drop(events);

        assert!(dispatcher.has_listeners("form.factory.events.contact.count"));
        assert!(!dispatcher.has_listeners("form.factory.events.contact.other"));
    }
}
