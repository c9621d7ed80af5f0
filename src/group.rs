//! Field groups.

use serde_json::{json, Map, Value};

use crate::factory::FormFieldsFactory;
use crate::field::FormFieldDriver;
use crate::form::FormContext;
use crate::html;
use crate::params::{as_int, as_text, ParamsBag};

/// Group of fields rendered in a common container.
#[derive(Debug, Clone)]
pub struct FieldGroupDriver {
    alias: String,
    index: usize,
    params: ParamsBag,
    booted: bool,
}

impl FieldGroupDriver {
    /// Creates the group registered under `alias`.
    pub fn new(alias: &str) -> Self {
        Self {
            alias: alias.to_string(),
            index: 0,
            params: ParamsBag::new(),
            booted: false,
        }
    }

    /// Default parameters of every group.
    pub fn default_params() -> Value {
        json!({
            "after": "",
            "before": "",
            "attrs": {},
            "position": null,
        })
    }

    /// Reads `groups.<alias>` from the form and resolves class and
    /// position.
    pub fn boot(&mut self, ctx: &FormContext) {
        if self.booted {
            return;
        }
        let events = ctx.events();
        events.trigger_with("group.booting", Some(&self.alias), None);

        let own = ctx
            .params()
            .get_object("groups")
            .get(&self.alias)
            .filter(|v| v.is_object())
            .cloned()
            .unwrap_or_else(|| json!({}));
        self.params = ParamsBag::with_defaults(Self::default_params(), own);

        let user = self.params.get("attrs.class").and_then(as_text);
        let class = html::merge_class(
            user.as_deref(),
            &format!("FormFieldsGroup FormFieldsGroup--{}", self.alias),
        );
        if class.is_empty() {
            self.params.forget("attrs.class");
        } else {
            self.params.set("attrs.class", json!(class));
        }

        let position = self.params.get("position").map(as_int).unwrap_or(0);
        self.params.set("position", json!(position));

        self.booted = true;
        events.trigger_with("group.booted", Some(&self.alias), None);
    }

    /// Returns true once booted.
    pub fn is_booted(&self) -> bool {
        self.booted
    }

    /// Alias of the group, `""` for ungrouped fields.
    pub fn alias(&self) -> &str {
        &self.alias
    }

    /// Registration order within the form.
    pub fn index(&self) -> usize {
        self.index
    }

    pub(crate) fn set_index(&mut self, index: usize) {
        self.index = index;
    }

    /// Display position.
    pub fn position(&self) -> i64 {
        self.params.get_i64("position")
    }

    pub(crate) fn set_position(&mut self, position: i64) {
        self.params.set("position", json!(position));
    }

    /// HTML attributes of the container.
    pub fn attrs_map(&self) -> Map<String, Value> {
        self.params.get_object("attrs")
    }

    /// HTML attributes of the container, linearised.
    pub fn attrs(&self) -> String {
        html::attrs(&self.attrs_map())
    }

    /// Markup rendered before the group.
    pub fn before(&self) -> String {
        self.params.get("before").and_then(as_text).unwrap_or_default()
    }

    /// Markup rendered after the group.
    pub fn after(&self) -> String {
        self.params.get("after").and_then(as_text).unwrap_or_default()
    }

    /// Resolved parameters.
    pub fn params(&self) -> &ParamsBag {
        &self.params
    }

    /// Fields of the group, in declaration order.
    pub fn fields<'a>(&'a self, fields: &'a FormFieldsFactory) -> Vec<&'a FormFieldDriver> {
        fields.for_group(&self.alias).collect()
    }

    /// Slugs of the fields of the group.
    pub fn field_slugs(&self, fields: &FormFieldsFactory) -> Vec<String> {
        fields
            .for_group(&self.alias)
            .map(|field| field.slug().to_string())
            .collect()
    }
}

/// Returns `position`, or the next slot after `max` when it is 0.
pub(crate) fn position_or_next(position: i64, pad: &mut i64, max: i64) -> i64 {
    if position != 0 {
        return position;
    }
    *pad += 1;
    pad.saturating_add(max)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn next_position_pads_after_max() {
        let mut pad = 0;
        assert_eq!(position_or_next(7, &mut pad, 10), 7);
        assert_eq!(position_or_next(0, &mut pad, 10), 11);
        assert_eq!(position_or_next(0, &mut pad, 10), 12);
    }

    #[test]
    fn next_position_saturates() {
        let mut pad = 0;
        assert_eq!(position_or_next(0, &mut pad, i64::MAX), i64::MAX);
    }

    #[test]
    fn unbooted_group_has_no_attrs() {
        let group = FieldGroupDriver::new("contact");
        assert_eq!(group.alias(), "contact");
        assert_eq!(group.attrs(), "");
        assert_eq!(group.position(), 0);
    }
}
