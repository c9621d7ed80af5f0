//! Markup generation.
//!
//! Rendering is split between two seams: a [`FormTemplate`] lays out the
//! form (wrapper, notices, sections, groups, rows, buttons) and a
//! [`FieldRenderer`] produces the native control of each field type.

use std::fmt;

use serde_json::Value;

mod native;
mod template;

pub use native::NativeFieldRenderer;
pub use template::{DefaultTemplate, FormTemplate};

/// Renders the native control of a field type from its arguments.
///
/// Arguments carry at least `name`, `attrs` and `value`; collections also
/// receive `choices`, buttons and labels their `content`.
pub trait FieldRenderer: Send + Sync + fmt::Debug {
    /// Markup of a `field_type` control.
    fn render(&self, field_type: &str, args: &Value) -> String;
}
