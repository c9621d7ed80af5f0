//! Named event dispatching.
//!
//! A single [`EventDispatcher`] is shared by a manager and all its forms.
//! Forms namespace their event names (see
//! [`EventFactory`](crate::factory::EventFactory)) so listeners attached to
//! one form never see the lifecycle of another.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError, RwLock};

use indexmap::IndexMap;
use serde_json::{Map, Value};

use crate::messages::{Notice, NoticeLevel};

/// Callback attached to an event name.
pub type Listener = Arc<dyn Fn(&mut FormEvent) + Send + Sync>;

/// Payload handed to listeners.
///
/// `value` is the mutable payload of value-carrying events such as
/// `field.get.value` or `handle.succeed.redirect_url`. Notices pushed by a
/// listener are applied by the form when the event supports it (currently
/// `handle.validated`).
#[derive(Debug, Clone, PartialEq)]
pub struct FormEvent {
    /// Event name relative to the form namespace
    pub name: String,
    /// Alias of the form raising the event
    pub form: String,
    /// Slug or alias of the item concerned (field, group, button)
    pub subject: Option<String>,
    /// Mutable payload
    pub value: Option<Value>,
    /// Notices raised by listeners
    pub notices: Vec<Notice>,
}

impl FormEvent {
    /// Creates an event without payload.
    pub fn new(name: impl Into<String>, form: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            form: form.into(),
            subject: None,
            value: None,
            notices: Vec::new(),
        }
    }

    /// Records an error notice, optionally scoped to a field slug.
    pub fn error(&mut self, message: impl Into<String>, field: Option<&str>) {
        let mut context = Map::new();
        if let Some(slug) = field {
            context.insert("field".to_string(), Value::String(slug.to_string()));
        }
        self.notices.push(Notice {
            level: NoticeLevel::Error,
            message: message.into(),
            context,
        });
    }
}

/// Handle of an attached listener, used to detach it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

struct Registered {
    id: ListenerId,
    priority: i32,
    listener: Listener,
}

/// Priority-ordered event dispatcher.
///
/// Higher priorities run first; equal priorities run in registration order.
///
/// # Examples
///
/// ```
/// use std::sync::Arc;
/// use form_core::{EventDispatcher, FormEvent};
/// use serde_json::json;
///
/// let events = EventDispatcher::new();
/// events.on("upper", 0, Arc::new(|event: &mut FormEvent| {
///     if let Some(value) = event.value.as_mut() {
///         *value = json!(value.as_str().unwrap_or_default().to_uppercase());
///     }
/// }));
///
/// let mut event = FormEvent::new("upper", "contact");
/// event.value = Some(json!("jane"));
/// events.dispatch("upper", &mut event);
/// assert_eq!(event.value, Some(json!("JANE")));
/// ```
#[derive(Default)]
pub struct EventDispatcher {
    listeners: RwLock<IndexMap<String, Vec<Registered>>>,
    history: Mutex<Option<Vec<String>>>,
    next_id: AtomicU64,
}

impl fmt::Debug for EventDispatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let listeners = self.listeners.read().unwrap_or_else(PoisonError::into_inner);
        f.debug_struct("EventDispatcher")
            .field("events", &listeners.keys().collect::<Vec<_>>())
            .finish()
    }
}

impl EventDispatcher {
    /// Creates a dispatcher without listeners.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a dispatcher recording every dispatched name.
    pub fn with_history() -> Self {
        let dispatcher = Self::new();
        dispatcher.record_history(true);
        dispatcher
    }

    /// Turns history recording on or off. Turning it off drops the history.
    pub fn record_history(&self, enabled: bool) {
        let mut history = self.history.lock().unwrap_or_else(PoisonError::into_inner);
        match (enabled, history.is_some()) {
            (true, false) => *history = Some(Vec::new()),
            (false, _) => *history = None,
            _ => {}
        }
    }

    /// Names dispatched since recording started.
    pub fn history(&self) -> Vec<String> {
        self.history
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
            .unwrap_or_default()
    }

    /// Attaches a listener.
    pub fn on(&self, name: &str, priority: i32, listener: Listener) -> ListenerId {
        let id = ListenerId(self.next_id.fetch_add(1, Ordering::Relaxed));
        let mut listeners = self.listeners.write().unwrap_or_else(PoisonError::into_inner);
        let entries = listeners.entry(name.to_string()).or_default();
        entries.push(Registered { id, priority, listener });
        entries.sort_by(|a, b| b.priority.cmp(&a.priority));
        id
    }

    /// Detaches a listener. Returns false if it was not attached.
    pub fn off(&self, id: ListenerId) -> bool {
        let mut listeners = self.listeners.write().unwrap_or_else(PoisonError::into_inner);
        let mut removed = false;
        for entries in listeners.values_mut() {
            let before = entries.len();
            entries.retain(|registered| registered.id != id);
            removed |= entries.len() != before;
        }
        listeners.retain(|_, entries| !entries.is_empty());
        removed
    }

    /// Returns true if a listener is attached to `name`.
    pub fn has_listeners(&self, name: &str) -> bool {
        self.listeners
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(name)
            .is_some_and(|entries| !entries.is_empty())
    }

    /// Runs every listener of `name` against `event`.
    pub fn dispatch(&self, name: &str, event: &mut FormEvent) {
        if let Some(history) = self
            .history
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .as_mut()
        {
            history.push(name.to_string());
        }

        // Listeners run outside the lock so they may register new ones.
        let listeners: Vec<Listener> = {
            let guard = self.listeners.read().unwrap_or_else(PoisonError::into_inner);
            match guard.get(name) {
                Some(entries) => entries.iter().map(|r| Arc::clone(&r.listener)).collect(),
                None => return,
            }
        };
        for listener in listeners {
            listener(event);
        }
    }
}
