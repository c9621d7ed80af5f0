//! Configuration-driven HTML forms with CSRF-protected submission handling.
//!
//! A form is declared as a JSON document (fields, buttons, groups, addons,
//! options) and turned into a [`Form`] by a [`FormManager`]. The form then:
//! - **Renders** itself through a [`FormTemplate`](view::FormTemplate) and a
//!   [`FieldRenderer`](view::FieldRenderer)
//! - **Handles** a [`FormRequest`]: CSRF check, validation, success or
//!   failure, and the [`RedirectResponse`] to send back
//! - **Remembers** submitted values and notices across the redirect through
//!   a [`SessionStore`]
//!
//! # Core Types
//!
//! - [`FormManager`]: registry of forms and driver prototypes
//! - [`FormDefinition`]: declaration of a form, its listeners and rules
//! - [`Form`]: built form with its fields, groups, buttons and addons
//! - [`Handler`](factory::Handler): submission handling of one request
//! - [`EventDispatcher`]: lifecycle hooks shared by every form
//!
//! # Examples
//!
//! ```
//! use std::sync::Arc;
//! use form_core::{FormDefinition, FormManager, FormRequest, MemorySession, SessionStore};
//! use serde_json::json;
//!
//! let session = Arc::new(MemorySession::new());
//! let definition = json!({
//!     "alias": "contact",
//!     "token": false,
//!     "fields": {
//!         "email": {"type": "email", "required": true, "validations": "email"},
//!     },
//! });
//!
//! // The visitor submits an invalid address.
//! let mut manager = FormManager::default();
//! manager.set_session(session.clone());
//! manager.build_form(FormDefinition::from_value(definition.clone()).unwrap()).unwrap();
//! let request = FormRequest::new("POST", "/contact")
//!     .with_form_body("email=not-an-address");
//! let form = manager.get("contact").unwrap().with_request(request).get().unwrap();
//!
//! let redirect = form.handle_mut().proceed().unwrap().unwrap();
//! assert_eq!(redirect.location, "/contact");
//! assert!(form.has_error());
//!
//! // The redirected page shows the error and the submitted value.
//! session.age_flash();
//! let mut manager = FormManager::default();
//! manager.set_session(session.clone());
//! manager.build_form(FormDefinition::from_value(definition).unwrap()).unwrap();
//! let form = manager.get("contact").unwrap().get().unwrap();
//!
//! let html = form.render();
//! assert!(html.contains("FormNotice--error"));
//! assert!(html.contains(r#"value="not-an-address""#));
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod addon;
pub mod button;
mod config;
mod error;
mod event;
pub mod factory;
pub mod field;
mod form;
pub mod group;
pub mod html;
mod logging;
mod manager;
mod messages;
pub mod params;
mod request;
mod session;
pub mod validation;
pub mod view;

pub use config::ManagerConfig;
pub use error::{DriverKind, Error, FieldValidationError, Result};
pub use event::{EventDispatcher, FormEvent, Listener, ListenerId};
pub use form::{Form, FormBuilder, FormContext, FormDefinition, Labels};
pub use logging::FormLog;
pub use manager::{DriverRegistry, FormManager};
pub use messages::{MessagesBag, Notice, NoticeLevel};
pub use params::ParamsBag;
pub use request::{parse_urlencoded, FormRequest, RedirectResponse, UrlManipulator};
pub use session::{generate_token, MemorySession, SessionStore};
