//! Form fields.
//!
//! A [`FormFieldDriver`] carries the configuration of one field of a form
//! and the behaviour shared by every field type: parameter normalisation,
//! value access, validation and the render preparation. What differs per
//! field family is delegated to a [`FieldKind`].

use std::fmt;
use std::sync::Arc;

use serde_json::{json, Map, Value};

use crate::config::{sprintf, ManagerConfig};
use crate::error::{DriverKind, Error, FieldValidationError, Result};
use crate::factory::AddonsFactory;
use crate::form::FormContext;
use crate::html;
use crate::messages::NoticeLevel;
use crate::params::{as_text, is_truthy, merge, ParamsBag};

const DEFAULT_SUPPORTS: &[&str] = &["label", "request", "tabindex", "transport", "wrapper"];

/// Supports of the well-known field types.
fn type_supports(field_type: &str) -> Option<&'static [&'static str]> {
    let supports: &'static [&'static str] = match field_type {
        "button" => &["request", "wrapper"],
        "checkbox" => &["checking", "label", "request", "wrapper", "tabindex", "transport"],
        "checkbox-collection" => &["choices", "label", "request", "tabindexes", "transport", "wrapper"],
        "datetime-js" => &["label", "request", "tabindexes", "transport", "wrapper"],
        "file" => &["label", "request", "upload", "tabindex", "wrapper"],
        "hidden" => &["request", "transport"],
        "label" => &["wrapper"],
        "password" => &["label", "request", "tabindex", "wrapper"],
        "radio" => &["label", "request", "tabindex", "transport", "wrapper"],
        "radio-collection" => &["choices", "label", "request", "tabindexes", "transport", "wrapper"],
        "repeater" => &["label", "request", "tabindexes", "transport", "wrapper"],
        "select" | "select-js" => &["choices", "label", "request", "tabindex", "transport", "wrapper"],
        "submit" => &["request", "tabindex", "wrapper"],
        "toggle-switch" => &["request", "tabindex", "transport", "wrapper"],
        _ => return None,
    };
    Some(supports)
}

/// Behaviour specific to a family of fields.
pub trait FieldKind: Send + Sync + fmt::Debug {
    /// Supports imposed by the kind; `None` defers to the field type table.
    fn supports(&self) -> Option<Vec<String>> {
        None
    }

    /// Field markup, without label nor wrapper.
    fn render(&self, field: &FormFieldDriver, ctx: &FormContext) -> String {
        field.render_native(ctx)
    }
}

/// Kind of every field type without a dedicated driver.
#[derive(Debug, Clone, Copy, Default)]
pub struct GenericField;

impl FieldKind for GenericField {}

/// Raw HTML block; its value is rendered verbatim.
#[derive(Debug, Clone, Copy, Default)]
pub struct HtmlField;

impl FieldKind for HtmlField {
    fn supports(&self) -> Option<Vec<String>> {
        Some(Vec::new())
    }

    fn render(&self, field: &FormFieldDriver, ctx: &FormContext) -> String {
        as_text(&field.value(ctx, true)).unwrap_or_default()
    }
}

/// Arbitrary HTML element whose content is the field value.
#[derive(Debug, Clone, Copy, Default)]
pub struct TagField;

impl FieldKind for TagField {
    fn supports(&self) -> Option<Vec<String>> {
        Some(vec!["wrapper".to_string()])
    }

    fn render(&self, field: &FormFieldDriver, ctx: &FormContext) -> String {
        let mut args = json!({
            "tag": "div",
            "attrs": field.params.get_or("attrs", json!({})),
            "content": field.value(ctx, true),
        });
        merge(&mut args, field.extras());
        html::tag_from(&args)
    }
}

/// One field of a form.
///
/// Registered prototypes are cloned for every field declared with their
/// alias as `type`.
#[derive(Debug, Clone)]
pub struct FormFieldDriver {
    alias: Option<String>,
    slug: String,
    params: ParamsBag,
    default_value: Option<Value>,
    kind: Arc<dyn FieldKind>,
    built: bool,
    booted: bool,
    rendering: bool,
}

impl Default for FormFieldDriver {
    fn default() -> Self {
        Self::new(GenericField)
    }
}

impl FormFieldDriver {
    /// Creates a prototype of the given kind.
    pub fn new(kind: impl FieldKind + 'static) -> Self {
        Self::with_kind(Arc::new(kind))
    }

    /// Creates a prototype sharing an existing kind.
    pub fn with_kind(kind: Arc<dyn FieldKind>) -> Self {
        Self {
            alias: None,
            slug: String::new(),
            params: ParamsBag::new(),
            default_value: None,
            kind,
            built: false,
            booted: false,
            rendering: false,
        }
    }

    /// Prototype rendering through the field renderer.
    pub fn generic() -> Self {
        Self::new(GenericField)
    }

    /// Prototype of the `html` field type.
    pub fn html() -> Self {
        Self::new(HtmlField)
    }

    /// Prototype of the `tag` field type.
    pub fn tag() -> Self {
        Self::new(TagField)
    }

    /// Default parameters of a field declared under `slug`.
    pub fn default_params(slug: &str) -> Value {
        json!({
            "addons": {},
            "after": "",
            "attrs": {},
            "before": "",
            "choices": {},
            "extras": {},
            "group": null,
            "label": true,
            "name": slug,
            "position": 0,
            "required": false,
            "supports": [],
            "title": null,
            "transport": null,
            "type": "html",
            "validations": [],
            "value": null,
            "wrapper": null,
        })
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
                kind: DriverKind::Field,
            });
        }
        self.built = true;
        Ok(())
    }

    /// Returns true once built.
    pub fn is_built(&self) -> bool {
        self.built
    }

    /// Returns true once booted.
    pub fn is_booted(&self) -> bool {
        self.booted
    }

    /// Returns true once prepared for rendering.
    pub fn is_rendering(&self) -> bool {
        self.rendering
    }

    pub(crate) fn prepare(&mut self, slug: &str, params: Value) {
        self.slug = slug.to_string();
        self.params = ParamsBag::with_defaults(Self::default_params(slug), params);
    }

    /// Normalises the parameters, between the `field.booting` and
    /// `field.booted` events.
    pub fn boot(&mut self, ctx: &FormContext, addons: &AddonsFactory) {
        if self.booted {
            return;
        }
        let field_type = self.field_type();
        let events = ctx.events();
        events.trigger_with(&format!("field.booting.{}", field_type), Some(&self.slug), None);
        events.trigger_with("field.booting", Some(&self.slug), None);

        self.parse_params(ctx, addons);

        events.trigger_with(&format!("field.booted.{}", field_type), Some(&self.slug), None);
        events.trigger_with("field.booted", Some(&self.slug), None);
        self.booted = true;
        ctx.log()
            .debug(format_args!("field {} ({}) booted", self.slug, field_type));
    }

    /// Resolves supports, restores the persisted value and normalises the
    /// `required`, `validations` and `addons` parameters.
    pub fn parse_params(&mut self, ctx: &FormContext, addons: &AddonsFactory) {
        if self.default_value.is_none() {
            self.default_value = Some(self.params.get_or("value", Value::Null));
        }

        if let Some(name) = self.params.get("name").filter(|v| !v.is_null()) {
            let name = as_text(name)
                .filter(|s| !s.is_empty())
                .unwrap_or_else(|| self.slug.clone());
            self.params.set("name", Value::String(html::escape(&name)));
        }

        if !self.params.get_bool("supports") {
            let supports: Vec<String> = match self.kind.supports() {
                Some(supports) => supports,
                None => type_supports(&self.field_type())
                    .unwrap_or(DEFAULT_SUPPORTS)
                    .iter()
                    .map(|s| s.to_string())
                    .collect(),
            };
            self.params.set("supports", json!(supports));
        }

        match self.params.get_or("transport", Value::Null) {
            Value::Bool(false) => self.remove_support("transport"),
            transport if is_truthy(&transport) => self.add_support("transport"),
            _ => {}
        }

        self.persist_value(ctx);

        if self.params.get_bool("wrapper") {
            self.add_support("wrapper");
        } else if self.supports("wrapper") {
            self.params.set("wrapper", Value::Bool(true));
        }

        if self.params.get_bool("required") {
            let required = normalize_required(self.params.get_or("required", Value::Null), ctx.config());
            self.params.set("required", required);
        }

        if self.params.get_bool("validations") {
            let validations = parse_validations(&self.params.get_or("validations", Value::Null), ctx.config());
            self.params.set("validations", Value::Array(validations));
        }

        for addon in addons.iter() {
            let path = format!("addons.{}", addon.alias());
            let mut options = Value::Object(addon.default_field_options());
            if let Some(own) = self.params.get(&path).filter(|v| v.is_object()) {
                merge(&mut options, own.clone());
            }
            self.params.set(&path, options);
        }
    }

    fn add_support(&mut self, support: &str) {
        if !self.supports(support) {
            self.params.push("supports", Value::String(support.to_string()));
        }
    }

    fn remove_support(&mut self, support: &str) {
        let kept: Vec<Value> = self
            .params
            .get_array("supports")
            .into_iter()
            .filter(|s| s.as_str() != Some(support))
            .collect();
        self.params.set("supports", Value::Array(kept));
    }

    /// Alias the driver was resolved with.
    pub fn alias(&self) -> Option<&str> {
        self.alias.as_deref()
    }

    /// Key of the field in the form declaration.
    pub fn slug(&self) -> &str {
        &self.slug
    }

    /// Submitted data key.
    pub fn name(&self) -> String {
        self.params.get("name").and_then(as_text).unwrap_or_default()
    }

    /// Field type, as passed to the field renderer.
    pub fn field_type(&self) -> String {
        self.params.get("type").and_then(as_text).unwrap_or_default()
    }

    /// Human title, falling back to the slug.
    pub fn title(&self) -> String {
        self.params
            .get("title")
            .filter(|v| is_truthy(v))
            .and_then(as_text)
            .unwrap_or_else(|| self.slug.clone())
    }

    /// Position used for ordering and the default `tabindex`.
    pub fn position(&self) -> i64 {
        self.params.get_i64("position")
    }

    /// Every resolved support.
    pub fn supports_list(&self) -> Vec<String> {
        self.params.get_strings("supports")
    }

    /// Returns true if the field declares `support`.
    pub fn supports(&self, support: &str) -> bool {
        self.params
            .get("supports")
            .and_then(Value::as_array)
            .is_some_and(|items| items.iter().any(|s| s.as_str() == Some(support)))
    }

    /// Alias of the group the field belongs to, `""` when ungrouped.
    pub fn group_alias(&self) -> String {
        self.params.get("group").and_then(as_text).unwrap_or_default()
    }

    /// Returns true if the field declares a group.
    pub fn has_group(&self) -> bool {
        self.params.get("group").is_some_and(|g| !g.is_null())
    }

    /// Extra arguments handed to the field renderer.
    pub fn extras(&self) -> Value {
        match self.params.get("extras") {
            Some(extras @ Value::Object(_)) => extras.clone(),
            _ => json!({}),
        }
    }

    /// Options of an addon for this field, or one key of them.
    pub fn addon_option(&self, alias: &str, key: Option<&str>) -> Option<&Value> {
        match key {
            Some(key) => self.params.get(&format!("addons.{}.{}", alias, key)),
            None => self.params.get(&format!("addons.{}", alias)),
        }
    }

    /// The normalised `required` parameter, or one key of it.
    pub fn required_option(&self, key: Option<&str>) -> Option<&Value> {
        match key {
            Some(key) => self.params.get(&format!("required.{}", key)),
            None => self.params.get("required"),
        }
    }

    /// Every parameter.
    pub fn params(&self) -> &ParamsBag {
        &self.params
    }

    /// Mutable parameters.
    pub fn params_mut(&mut self) -> &mut ParamsBag {
        &mut self.params
    }

    /// Current value, as altered by the `field.get.value` listeners.
    ///
    /// Non-raw values are HTML-escaped.
    pub fn value(&self, ctx: &FormContext, raw: bool) -> Value {
        let value = self.params.get_or("value", Value::Null);
        let value = ctx
            .events()
            .trigger_with("field.get.value", Some(&self.slug), Some(value))
            .value
            .unwrap_or(Value::Null);
        if raw {
            value
        } else {
            escape_value(value)
        }
    }

    /// Value with each item replaced by its choice label, joined with
    /// `glue` when one is given.
    pub fn value_of_choices(&self, ctx: &FormContext, raw: bool, glue: Option<&str>) -> Value {
        let items = match self.value(ctx, true) {
            Value::Null => Vec::new(),
            Value::Array(items) => items,
            other => vec![other],
        };
        let choices = self.params.get_object("choices");
        let labelled: Vec<Value> = items
            .into_iter()
            .map(|item| {
                as_text(&item)
                    .and_then(|key| choices.get(&key).cloned())
                    .unwrap_or(item)
            })
            .collect();
        let labelled = if raw {
            labelled
        } else {
            labelled.into_iter().map(escape_value).collect()
        };
        match glue {
            Some(glue) => Value::String(
                labelled
                    .iter()
                    .filter_map(as_text)
                    .collect::<Vec<_>>()
                    .join(glue),
            ),
            None => Value::Array(labelled),
        }
    }

    /// Value captured before any submission was applied.
    pub fn default_value(&self) -> Value {
        self.default_value.clone().unwrap_or(Value::Null)
    }

    /// Overrides the default value.
    pub fn set_default_value(&mut self, value: Value) -> &mut Self {
        self.default_value = Some(value);
        self
    }

    /// Sets the value, as altered by the `field.set.value` listeners.
    pub fn set_value(&mut self, ctx: &FormContext, value: Value) -> &mut Self {
        let value = ctx
            .events()
            .trigger_with("field.set.value", Some(&self.slug), Some(value))
            .value
            .unwrap_or(Value::Null);
        self.params.set("value", value);
        self
    }

    /// Restores the default value.
    pub fn reset_value(&mut self) -> &mut Self {
        self.params.set("value", self.default_value());
        self
    }

    /// Overrides the position.
    pub fn set_position(&mut self, position: i64) -> &mut Self {
        self.params.set("position", json!(position));
        self
    }

    /// Applies the value persisted in session by a previous submission.
    pub fn persist_value(&mut self, ctx: &FormContext) -> &mut Self {
        if let Some(value) = ctx.persistent(&self.name()).filter(|v| !v.is_null()) {
            self.set_value(ctx, value);
        }
        self
    }

    /// Adds an extra renderer argument.
    pub fn add_extra(&mut self, key: &str, value: Value) -> &mut Self {
        self.params.set(&format!("extras.{}", key), value);
        self
    }

    /// Records a notice scoped to this field.
    pub fn add_notice(
        &self,
        ctx: &mut FormContext,
        message: &str,
        level: NoticeLevel,
        mut context: Map<String, Value>,
    ) {
        context.insert("field".to_string(), Value::String(self.slug.clone()));
        ctx.add_notice(message, level, context);
    }

    /// Records an error scoped to this field.
    pub fn error(&self, ctx: &mut FormContext, message: &str) {
        self.add_notice(ctx, message, NoticeLevel::Error, Map::new());
    }

    /// Returns true if notices scoped to this field exist.
    pub fn has_notices(&self, ctx: &FormContext, level: Option<NoticeLevel>) -> bool {
        let mut context = Map::new();
        context.insert("field".to_string(), Value::String(self.slug.clone()));
        ctx.messages().exists_for_context(&context, level)
    }

    /// Returns true if a label is rendered.
    pub fn has_label(&self) -> bool {
        self.supports("label") && self.params.get_bool("label")
    }

    /// Returns true if a wrapper is rendered.
    pub fn has_wrapper(&self) -> bool {
        self.supports("wrapper") && self.params.get_bool("wrapper")
    }

    /// Markup rendered before the field.
    pub fn before(&self) -> String {
        self.params.get("before").and_then(as_text).unwrap_or_default()
    }

    /// Markup rendered after the field.
    pub fn after(&self) -> String {
        self.params.get("after").and_then(as_text).unwrap_or_default()
    }

    /// Prepares ids, classes, wrapper and label for rendering. Runs once.
    pub fn pre_render(&mut self, ctx: &FormContext) -> &mut Self {
        if self.rendering {
            return self;
        }
        let slug = self.slug.clone();
        let field_type = self.field_type();
        let index = ctx.index();

        self.default_attr("attrs.id", format!("FormField-input--{}_{}", slug, index));
        self.default_class(
            "attrs.class",
            &format!("FormField-input FormField-input--{} FormField-input--{}", field_type, slug),
        );

        if !self.params.has("attrs.tabindex") {
            let position = self.position();
            self.params.set("attrs.tabindex", json!(position));
        }
        if self.params.get("attrs.tabindex") == Some(&Value::Bool(false)) {
            self.params.forget("attrs.tabindex");
        }

        if self.has_notices(ctx, Some(NoticeLevel::Error)) {
            self.params.set("attrs.aria-invalid", json!("true"));
        }

        if self.params.get_bool("wrapper") {
            let mut wrapper = json!({"tag": "div", "attrs": {}});
            if let Some(own) = self.params.get("wrapper").filter(|w| w.is_object()) {
                merge(&mut wrapper, own.clone());
            }
            self.params.set("wrapper", wrapper);
            self.default_attr("wrapper.attrs.id", format!("FormRow--{}_{}", slug, index));
            self.default_class(
                "wrapper.attrs.class",
                &format!("FormRow FormRow--{} FormRow--{}", field_type, slug),
            );
        }

        if self.params.get_bool("required.tagged") {
            self.default_attr("required.tagged.attrs.id", format!("FormField-required--{}_{}", slug, index));
            self.default_class(
                "required.tagged.attrs.class",
                &format!("FormField-required FormField-required--{} FormField-required--{}", field_type, slug),
            );
        }

        if self.params.get_bool("label") {
            self.prepare_label(ctx, &slug, &field_type, index);
        }

        self.rendering = true;
        self
    }

    fn prepare_label(&mut self, ctx: &FormContext, slug: &str, field_type: &str, index: usize) {
        let own = match self.params.get_or("label", Value::Null) {
            Value::String(s) => json!({"content": html::human_words(&s)}),
            own @ Value::Object(_) => own,
            _ => json!({}),
        };
        let mut label = json!({
            "tag": "label",
            "attrs": {},
            "wrapper": false,
            "position": "before",
            "require": true,
        });
        merge(&mut label, own);
        self.params.set("label", label);

        self.default_attr("label.attrs.id", format!("FormField-label--{}_{}", slug, index));
        self.default_class(
            "label.attrs.class",
            &format!("FormField-label FormField-label--{} FormField-label--{}", field_type, slug),
        );
        if let Some(id) = self.params.get("attrs.id").filter(|v| is_truthy(v)).cloned() {
            self.params.set("label.attrs.for", id);
        }

        if !self.params.has("label.content") {
            let content = html::human_words(&self.title());
            self.params.set("label.content", Value::String(content));
        }
        if !self.params.get_bool("label.content") {
            self.params.forget("label.content");
        }

        let require = self.params.pull("label.require").is_some_and(|v| is_truthy(&v));
        if require && self.params.get_bool("required.tagged") {
            let content = self.params.get("label.content").and_then(as_text).unwrap_or_default();
            let tagged = ctx.template().field_required(self);
            self.params.set("label.content", Value::String(content + &tagged));
            self.params.forget("required.tagged");
        }

        if self.params.get_bool("label.wrapper") {
            self.params.set(
                "label.wrapper",
                json!({
                    "tag": "div",
                    "attrs": {
                        "id": format!("FormField-labelWrapper--{}_{}", slug, index),
                        "class": format!(
                            "FormField-labelWrapper FormField-labelWrapper--{} FormField-labelWrapper--{}",
                            field_type, slug
                        ),
                    },
                }),
            );
        }
    }

    fn default_attr(&mut self, path: &str, value: String) {
        if !self.params.has(path) {
            self.params.set(path, Value::String(value));
        }
        if !self.params.get_bool(path) {
            self.params.forget(path);
        }
    }

    fn default_class(&mut self, path: &str, default: &str) {
        let user = self.params.get(path).and_then(as_text);
        let class = html::merge_class(user.as_deref(), default);
        if class.is_empty() {
            self.params.forget(path);
        } else {
            self.params.set(path, Value::String(class));
        }
    }

    /// Field markup through its kind.
    pub fn render(&self, ctx: &FormContext) -> String {
        self.kind.render(self, ctx)
    }

    /// Hands the field over to the [`FieldRenderer`](crate::view::FieldRenderer)
    /// registered for its type.
    pub fn render_native(&self, ctx: &FormContext) -> String {
        let mut args = match self.extras() {
            Value::Object(map) => map,
            _ => Map::new(),
        };
        args.insert("name".to_string(), Value::String(self.name()));
        args.insert("attrs".to_string(), self.params.get_or("attrs", json!({})));
        args.insert("label".to_string(), Value::Bool(false));
        if self.supports("choices") {
            args.insert("choices".to_string(), self.params.get_or("choices", json!({})));
        }
        args.insert("value".to_string(), self.value(ctx, true));
        ctx.renderer().render(&self.field_type(), &Value::Object(args))
    }

    /// Checks a submitted value against the required check, then against
    /// each validation. Stops at the first failure.
    pub fn validate(
        &self,
        ctx: &FormContext,
        value: &Value,
        data: &ParamsBag,
    ) -> std::result::Result<(), FieldValidationError> {
        let field_type = self.field_type();
        let events = ctx.events();
        events.trigger_with(&format!("field.validate.{}", field_type), Some(&self.slug), Some(value.clone()));
        events.trigger_with("field.validate", Some(&self.slug), Some(value.clone()));

        let validation = ctx.validation();
        if self.params.get_bool("required.check") {
            let call = self.params.get_str("required.call").unwrap_or("notEmpty");
            let args = self.params.get_array("required.args");
            if !validation.call(call, value, &args, data) {
                let message = self.params.get_str("required.message").unwrap_or_default();
                return Err(FieldValidationError::new(&self.slug, sprintf(message, &self.title())).set_required());
            }
        }

        for (index, rule) in self.params.get_array("validations").iter().enumerate() {
            let call = rule.get("call").and_then(Value::as_str).unwrap_or("default");
            let args = match rule.get("args") {
                Some(Value::Array(args)) => args.clone(),
                _ => Vec::new(),
            };
            if validation.call(call, value, &args, data) {
                continue;
            }
            let flag = rule
                .get("alias")
                .and_then(as_text)
                .filter(|a| !a.is_empty())
                .or_else(|| Some(call.to_string()).filter(|c| !c.is_empty()))
                .unwrap_or_else(|| index.to_string());
            let message = rule
                .get("message")
                .and_then(Value::as_str)
                .unwrap_or(ctx.config().invalid_message.as_str());
            return Err(FieldValidationError::new(&self.slug, sprintf(message, &self.title())).add_flag(flag));
        }

        events.trigger_with(&format!("field.validated.{}", field_type), Some(&self.slug), None);
        events.trigger_with("field.validated", Some(&self.slug), None);
        Ok(())
    }
}

fn escape_value(value: Value) -> Value {
    match value {
        Value::String(s) => Value::String(html::escape(&s)),
        Value::Array(items) => Value::Array(items.into_iter().map(escape_value).collect()),
        other => other,
    }
}

/// Normalises the `required` parameter of a field.
fn normalize_required(required: Value, config: &ManagerConfig) -> Value {
    let own = match required {
        Value::String(message) => json!({"message": message}),
        own @ Value::Object(_) => own,
        _ => json!({}),
    };
    let mut required = json!({
        "tagged": true,
        "check": true,
        "value_none": "",
        "call": "",
        "args": [],
        "message": config.required_message,
        "html5": false,
    });
    merge(&mut required, own);

    if is_truthy(&required["tagged"]) {
        let own = match required["tagged"].take() {
            Value::String(content) => json!({"content": content}),
            own @ Value::Object(_) => own,
            _ => json!({}),
        };
        let mut tagged = json!({"tag": "span", "attrs": {}, "content": "*"});
        merge(&mut tagged, own);
        required["tagged"] = tagged;
    }

    let value_none = required["value_none"].clone();
    let has_value_none = is_truthy(&value_none);
    if !is_truthy(&required["call"]) {
        required["call"] = json!(if has_value_none { "!equals" } else { "notEmpty" });
    }
    if !is_truthy(&required["args"]) {
        required["args"] = if has_value_none { json!([value_none]) } else { json!([]) };
    }
    required
}

/// Flattens the accepted `validations` shapes into a list of rule objects.
///
/// Accepts a comma-separated string of rule names, a single object with a
/// `call` key, or a list mixing both.
pub fn parse_validations(validations: &Value, config: &ManagerConfig) -> Vec<Value> {
    let mut results = Vec::new();
    collect_validations(validations, config, &mut results);
    results
}

fn collect_validations(validations: &Value, config: &ManagerConfig, results: &mut Vec<Value>) {
    match validations {
        Value::Object(map) if map.contains_key("call") => {
            let mut rule = json!({
                "alias": "",
                "args": [],
                "call": "default",
                "message": config.invalid_message,
            });
            merge(&mut rule, validations.clone());
            results.push(rule);
        }
        Value::Object(map) => {
            for item in map.values() {
                collect_validations(item, config, results);
            }
        }
        Value::Array(items) => {
            for item in items {
                collect_validations(item, config, results);
            }
        }
        Value::String(calls) => {
            for call in calls.split(',').map(str::trim).filter(|c| !c.is_empty()) {
                collect_validations(&json!({"call": call}), config, results);
            }
        }
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn required_string_becomes_message() {
        let required = normalize_required(json!("Tell us"), &ManagerConfig::default());
        assert_eq!(required["message"], json!("Tell us"));
        assert_eq!(required["call"], json!("notEmpty"));
        assert_eq!(required["args"], json!([]));
        assert_eq!(required["tagged"], json!({"tag": "span", "attrs": {}, "content": "*"}));
    }

    #[test]
    fn required_value_none_switches_to_negated_equals() {
        let required = normalize_required(
            json!({"value_none": "none", "tagged": "(required)"}),
            &ManagerConfig::default(),
        );
        assert_eq!(required["call"], json!("!equals"));
        assert_eq!(required["args"], json!(["none"]));
        assert_eq!(required["tagged"]["content"], json!("(required)"));
    }

    #[test]
    fn required_keeps_explicit_call() {
        let required = normalize_required(json!({"call": "email"}), &ManagerConfig::default());
        assert_eq!(required["call"], json!("email"));
        assert_eq!(
            required["message"],
            json!("The field \"%s\" is required.")
        );
    }

    #[test]
    fn validations_accept_strings_objects_and_lists() {
        let config = ManagerConfig::default();
        let parsed = parse_validations(
            &json!(["email, notEmpty", {"call": "length", "args": [2, 5], "alias": "len"}]),
            &config,
        );
        let calls: Vec<&str> = parsed.iter().filter_map(|v| v["call"].as_str()).collect();
        assert_eq!(calls, vec!["email", "notEmpty", "length"]);
        assert_eq!(parsed[2]["alias"], json!("len"));
        assert_eq!(parsed[0]["message"], json!(config.invalid_message));

        assert!(parse_validations(&json!(42), &config).is_empty());
    }

    #[test]
    fn type_table_covers_known_types() {
        assert_eq!(type_supports("hidden"), Some(&["request", "transport"][..]));
        assert!(type_supports("text").is_none());
        assert!(type_supports("file").is_some_and(|s| s.contains(&"upload")));
    }

    #[test]
    fn build_requires_alias() {
        let mut field = FormFieldDriver::generic();
        assert!(matches!(
            field.build(),
            Err(Error::MissingAlias { kind: DriverKind::Field })
        ));
        field.set_alias("text").set_alias("ignored");
        assert!(field.build().is_ok());
        assert_eq!(field.alias(), Some("text"));
    }
}
