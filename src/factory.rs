//! Per-form factories.
//!
//! Each factory owns one concern of a [`Form`](crate::Form) and boots once.
//! The services every driver needs (events, session, options, validation)
//! live in the [`FormContext`](crate::FormContext); the collections of
//! drivers (addons, fields, groups, buttons) and the submission handler are
//! held next to it by the form.

mod addons;
mod buttons;
mod events;
mod fields;
mod groups;
mod handle;
mod options;
mod session;
mod validation;

pub use addons::AddonsFactory;
pub use buttons::ButtonsFactory;
pub use events::{EventFactory, ListenerDefinition};
pub use fields::FormFieldsFactory;
pub use groups::FieldGroupsFactory;
pub use handle::{HandleFactory, Handler};
pub use options::OptionsFactory;
pub use session::SessionFactory;
pub use validation::{rule, ValidationFactory};
