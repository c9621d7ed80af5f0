//! Forms and their per-form context.

use std::fmt;
use std::sync::Arc;

use indexmap::IndexMap;
use serde_json::{json, Map, Value};

use crate::addon::AddonDriver;
use crate::button::ButtonDriver;
use crate::config::ManagerConfig;
use crate::error::{DriverKind, Error, Result};
use crate::event::{EventDispatcher, FormEvent, Listener};
use crate::factory::{
    AddonsFactory, ButtonsFactory, EventFactory, FieldGroupsFactory, FormFieldsFactory,
    HandleFactory, Handler, ListenerDefinition, OptionsFactory, SessionFactory, ValidationFactory,
};
use crate::field::FormFieldDriver;
use crate::group::FieldGroupDriver;
use crate::html;
use crate::logging::FormLog;
use crate::manager::DriverRegistry;
use crate::messages::{MessagesBag, NoticeLevel};
use crate::params::{as_text, is_truthy, merge, ParamsBag};
use crate::request::FormRequest;
use crate::session::SessionStore;
use crate::validation::RuleFn;
use crate::view::{FieldRenderer, FormTemplate};

/// Declaration of a form: alias, JSON parameters, listeners, custom
/// validation rules and an optional template.
///
/// # Examples
///
/// ```
/// use form_core::FormDefinition;
/// use serde_json::json;
///
/// let definition = FormDefinition::from_value(json!({
///     "alias": "contact",
///     "fields": {"email": {"type": "email", "required": true}},
/// }))
/// .unwrap()
/// .on("handle.successful", 0, |_event| {})
/// .rule("company_email", |value, _args| {
///     value.as_str().is_some_and(|s| s.ends_with("@example.com"))
/// });
///
/// assert_eq!(definition.alias(), "contact");
/// assert!(definition.params().get("alias").is_none());
/// ```
#[derive(Clone)]
pub struct FormDefinition {
    alias: String,
    params: Value,
    listeners: Vec<ListenerDefinition>,
    rules: IndexMap<String, RuleFn>,
    template: Option<Arc<dyn FormTemplate>>,
}

impl fmt::Debug for FormDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FormDefinition")
            .field("alias", &self.alias)
            .field("params", &self.params)
            .field("listeners", &self.listeners)
            .field("rules", &self.rules.keys().collect::<Vec<_>>())
            .field("template", &self.template)
            .finish()
    }
}

impl FormDefinition {
    /// Empty definition of the form `alias`.
    pub fn new(alias: &str) -> Self {
        Self {
            alias: alias.to_string(),
            params: json!({}),
            listeners: Vec::new(),
            rules: IndexMap::new(),
            template: None,
        }
    }

    /// Reads a JSON definition; its `alias` key names the form.
    pub fn from_value(value: Value) -> Result<Self> {
        let Value::Object(mut params) = value else {
            return Err(Error::InvalidDefinition(
                "form definition must be a JSON object".to_string(),
            ));
        };
        let alias = match params.shift_remove("alias") {
            None | Some(Value::Null) => String::new(),
            Some(Value::String(alias)) => alias,
            Some(other) => {
                return Err(Error::InvalidDefinition(format!(
                    "form alias must be a string, got {}",
                    other
                )))
            }
        };
        Ok(Self::new(&alias).with_params(Value::Object(params)))
    }

    /// Parses a JSON document with [`from_value`](Self::from_value).
    pub fn from_json(source: &str) -> Result<Self> {
        Self::from_value(serde_json::from_str(source)?)
    }

    /// Alias of the form.
    pub fn alias(&self) -> &str {
        &self.alias
    }

    /// Parameters of the form.
    pub fn params(&self) -> &Value {
        &self.params
    }

    pub(crate) fn set_alias(&mut self, alias: &str) {
        self.alias = alias.to_string();
    }

    /// Deep-merges `params` into the parameters.
    pub fn with_params(mut self, params: Value) -> Self {
        merge(&mut self.params, params);
        self
    }

    /// Attaches a listener to a form event.
    pub fn on<F>(mut self, name: &str, priority: i32, listener: F) -> Self
    where
        F: Fn(&mut FormEvent) + Send + Sync + 'static,
    {
        let listener: Listener = Arc::new(listener);
        self.listeners.push(ListenerDefinition {
            name: name.to_string(),
            priority,
            listener,
        });
        self
    }

    /// Registers a validation rule for this form only.
    pub fn rule<F>(mut self, name: &str, rule: F) -> Self
    where
        F: Fn(&Value, &[Value]) -> bool + Send + Sync + 'static,
    {
        self.rules.insert(name.to_string(), Arc::new(rule));
        self
    }

    /// Renders the form with `template` instead of the manager one.
    pub fn template(mut self, template: impl FormTemplate + 'static) -> Self {
        self.template = Some(Arc::new(template));
        self
    }
}

/// Services a manager hands to the forms it builds.
#[derive(Clone)]
pub(crate) struct FormServices {
    pub(crate) config: Arc<ManagerConfig>,
    pub(crate) events: Arc<EventDispatcher>,
    pub(crate) session: Arc<dyn SessionStore>,
    pub(crate) renderer: Arc<dyn FieldRenderer>,
    pub(crate) template: Arc<dyn FormTemplate>,
    pub(crate) rules: IndexMap<String, RuleFn>,
}

/// Display labels of a form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Labels {
    /// Grammatical gender flag
    pub gender: bool,
    /// Plural name
    pub plural: String,
    /// Singular name
    pub singular: String,
}

#[derive(Debug, Clone, Copy, Default)]
struct RenderBuild {
    id: bool,
    wrapper: bool,
    attrs: bool,
    notices: bool,
}

/// Everything a form shares with its drivers: identity, parameters,
/// services and notices.
pub struct FormContext {
    alias: String,
    index: usize,
    tag_name: String,
    pub(crate) params: ParamsBag,
    pub(crate) events: EventFactory,
    pub(crate) session: SessionFactory,
    pub(crate) messages: MessagesBag,
    pub(crate) options: OptionsFactory,
    pub(crate) validation: ValidationFactory,
    renderer: Arc<dyn FieldRenderer>,
    template: Arc<dyn FormTemplate>,
    config: Arc<ManagerConfig>,
    request: FormRequest,
    successful: bool,
    render_build: RenderBuild,
}

impl fmt::Debug for FormContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FormContext")
            .field("alias", &self.alias)
            .field("index", &self.index)
            .field("params", &self.params)
            .field("messages", &self.messages)
            .field("request", &self.request)
            .field("successful", &self.successful)
            .finish_non_exhaustive()
    }
}

impl FormContext {
    /// Alias of the form.
    pub fn alias(&self) -> &str {
        &self.alias
    }

    /// Position of the form within its manager.
    pub fn index(&self) -> usize {
        self.index
    }

    /// camelCase alias used in ids and classes.
    pub fn tag_name(&self) -> &str {
        &self.tag_name
    }

    /// Logging handle stamped with the form alias and index.
    pub fn log(&self) -> FormLog<'_> {
        FormLog::new(&self.alias, self.index)
    }

    /// Parameters of the form.
    pub fn params(&self) -> &ParamsBag {
        &self.params
    }

    /// Mutable parameters of the form.
    pub fn params_mut(&mut self) -> &mut ParamsBag {
        &mut self.params
    }

    /// Form-scoped events.
    pub fn events(&self) -> &EventFactory {
        &self.events
    }

    /// Form-scoped session.
    pub fn session(&self) -> &SessionFactory {
        &self.session
    }

    /// Notices recorded during this request.
    pub fn messages(&self) -> &MessagesBag {
        &self.messages
    }

    /// Display options.
    pub fn options(&self) -> &OptionsFactory {
        &self.options
    }

    /// Option at `path`.
    pub fn option(&self, path: &str) -> Option<&Value> {
        self.options.option(path)
    }

    /// Validation rules.
    pub fn validation(&self) -> &ValidationFactory {
        &self.validation
    }

    /// Renderer of native fields.
    pub fn renderer(&self) -> &Arc<dyn FieldRenderer> {
        &self.renderer
    }

    /// Template of the form.
    pub fn template(&self) -> &Arc<dyn FormTemplate> {
        &self.template
    }

    /// Manager configuration.
    pub fn config(&self) -> &ManagerConfig {
        &self.config
    }

    /// Request being handled.
    pub fn request(&self) -> &FormRequest {
        &self.request
    }

    /// Returns true if the form accepts uploads, either through a
    /// multipart `enctype` or through a field supporting uploads.
    pub fn is_upload_enabled(&self, has_upload_field: bool) -> bool {
        self.params.get_str("enctype") == Some("multipart/form-data") || has_upload_field
    }

    /// HTTP method of the form: `get` or `post`.
    pub fn method(&self) -> String {
        let method = self
            .params
            .get("method")
            .and_then(as_text)
            .unwrap_or_default()
            .to_ascii_lowercase();
        if method == "get" {
            method
        } else {
            "post".to_string()
        }
    }

    /// Action URL of the form.
    pub fn action(&self) -> String {
        self.params.get("action").and_then(as_text).unwrap_or_default()
    }

    /// Title of the form.
    pub fn title(&self) -> String {
        self.params.get("title").and_then(as_text).unwrap_or_default()
    }

    /// Returns true if the form declares `support`.
    pub fn supports(&self, support: &str) -> bool {
        self.params
            .get_strings("supports")
            .iter()
            .any(|s| s == support)
    }

    /// Returns true once a submission succeeded.
    pub fn is_successful(&self) -> bool {
        self.successful
    }

    pub(crate) fn set_successful(&mut self, successful: bool) {
        self.successful = successful;
    }

    /// Returns true if an error notice was recorded.
    pub fn has_error(&self) -> bool {
        self.messages.exists(NoticeLevel::Error)
    }

    /// Records a notice and flashes it for the next request.
    pub fn add_notice(&mut self, message: &str, level: NoticeLevel, context: Map<String, Value>) {
        let notice = self.messages.add(message, level, context);
        self.session.flash_push(
            &format!("notices.{}", level),
            json!({
                "level": notice.level.as_str(),
                "message": notice.message,
                "context": notice.context,
            }),
        );
    }

    /// Records an error notice.
    pub fn error(&mut self, message: &str) {
        self.add_notice(message, NoticeLevel::Error, Map::new());
    }

    /// Value persisted in session for the field named `key`.
    pub fn persistent(&self, key: &str) -> Option<Value> {
        self.session.get(&format!("request.{}", key))
    }

    /// Data key carrying the CSRF token, `""` when protection is off.
    pub fn csrf_key(&self) -> String {
        match self.params.get("token") {
            Some(Value::Bool(false)) => String::new(),
            Some(Value::String(key)) if !key.is_empty() => key.clone(),
            _ => self.config.token_key.clone(),
        }
    }

    /// Hidden input carrying the CSRF token.
    pub fn csrf_field(&self) -> String {
        let key = self.csrf_key();
        if key.is_empty() {
            return String::new();
        }
        let mut attrs = Map::new();
        attrs.insert("type".to_string(), json!("hidden"));
        attrs.insert("name".to_string(), json!(key));
        attrs.insert("value".to_string(), json!(self.session.token()));
        html::tag("input", &attrs, "")
    }

    /// Fragment redirections point at, without `#`.
    ///
    /// A string `anchor` option is used as is; `true` targets the wrapper,
    /// or the form when the wrapper is off.
    pub fn anchor(&mut self) -> String {
        let anchor = match self.option("anchor").cloned().unwrap_or(Value::Null) {
            Value::String(anchor) => anchor,
            anchor if is_truthy(&anchor) => {
                self.render_build_wrapper();
                match self.params.get("wrapper.attrs.id").filter(|id| is_truthy(id)) {
                    Some(id) => as_text(id).unwrap_or_default(),
                    None => {
                        self.render_build_id();
                        self.params.get("attrs.id").and_then(as_text).unwrap_or_default()
                    }
                }
            }
            _ => String::new(),
        };
        anchor.trim_start_matches('#').to_string()
    }

    /// Display labels, defaulting to the title.
    pub fn labels(&self) -> Labels {
        let title = self.title();
        let text = |path: &str| {
            self.params
                .get(path)
                .and_then(as_text)
                .filter(|s| !s.is_empty())
                .unwrap_or_else(|| title.clone())
        };
        Labels {
            gender: self.params.get_bool("labels.gender"),
            plural: text("labels.plural"),
            singular: text("labels.singular"),
        }
    }

    fn render_build(&mut self, has_upload: bool) {
        self.render_build_id();
        self.render_build_wrapper();
        self.render_build_attrs(has_upload);
        self.render_build_notices();
    }

    fn render_build_id(&mut self) {
        if self.render_build.id {
            return;
        }
        if !self.params.has("attrs.id") {
            self.params
                .set("attrs.id", json!(format!("FormContent--{}", self.tag_name)));
        }
        if !self.params.get_bool("attrs.id") {
            self.params.forget("attrs.id");
        }
        self.render_build.id = true;
    }

    fn render_build_wrapper(&mut self) {
        if self.render_build.wrapper {
            return;
        }
        let wrapper = self.params.get_or("wrapper", Value::Null);
        if wrapper != Value::Bool(false) {
            let mut normalized = json!({"tag": "div"});
            if wrapper.is_object() {
                merge(&mut normalized, wrapper);
            }
            self.params.set("wrapper", normalized);
            if !self.params.has("wrapper.attrs.id") {
                self.params
                    .set("wrapper.attrs.id", json!(format!("Form--{}", self.tag_name)));
            }
            if !self.params.has("wrapper.attrs.class") {
                self.params.set("wrapper.attrs.class", json!("Form"));
            }
        }
        self.render_build.wrapper = true;
    }

    fn render_build_attrs(&mut self, has_upload: bool) {
        if self.render_build.attrs {
            return;
        }
        let user = self.params.get("attrs.class").and_then(as_text);
        let class = html::merge_class(
            user.as_deref(),
            &format!("FormContent FormContent--{}", self.tag_name),
        );
        if class.is_empty() {
            self.params.forget("attrs.class");
        } else {
            self.params.set("attrs.class", json!(class));
        }

        let action = self.action();
        let method = self.method();
        self.params.set("attrs.action", json!(action));
        self.params.set("attrs.method", json!(method));

        let enctype = self.params.get("enctype").and_then(as_text).unwrap_or_default();
        if !enctype.is_empty() {
            self.params.set("attrs.enctype", json!(enctype));
        } else if has_upload {
            self.params.set("enctype", json!("multipart/form-data"));
            self.params.set("attrs.enctype", json!("multipart/form-data"));
        }
        self.render_build.attrs = true;
    }

    fn render_build_notices(&mut self) {
        if self.render_build.notices {
            return;
        }
        if self.messages.is_empty() {
            for level in NoticeLevel::ALL {
                let Some(Value::Array(items)) = self.session.flash_get(&format!("notices.{}", level)) else {
                    continue;
                };
                for item in items {
                    let message = item.get("message").and_then(as_text).unwrap_or_default();
                    let context = match item.get("context") {
                        Some(Value::Object(context)) => context.clone(),
                        _ => Map::new(),
                    };
                    self.messages.add(message, level, context);
                }
            }
        }
        if self.successful {
            let message = self.option("success").and_then(as_text).unwrap_or_default();
            if !message.is_empty() && !self.messages.exists(NoticeLevel::Success) {
                self.messages.add(message, NoticeLevel::Success, Map::new());
            }
            self.session.clear();
        }
        self.render_build.notices = true;
    }
}

/// A form: its context plus the collections of drivers it renders.
#[derive(Debug)]
pub struct Form {
    ctx: FormContext,
    addons: AddonsFactory,
    fields: FormFieldsFactory,
    groups: FieldGroupsFactory,
    buttons: ButtonsFactory,
    handle: HandleFactory,
    built: bool,
    booted: bool,
}

impl Form {
    pub(crate) fn new(definition: FormDefinition, index: usize, services: &FormServices) -> Self {
        let FormDefinition {
            alias,
            params,
            listeners,
            rules,
            template,
        } = definition;

        let mut all_rules = services.rules.clone();
        all_rules.extend(rules);

        let ctx = FormContext {
            tag_name: html::tag_name(&alias),
            params: ParamsBag::with_defaults(Self::default_params(&alias), params),
            events: EventFactory::new(&alias, Arc::clone(&services.events), listeners),
            session: SessionFactory::new(&alias, Arc::clone(&services.session)),
            messages: MessagesBag::new(),
            options: OptionsFactory::default(),
            validation: ValidationFactory::from(all_rules),
            renderer: Arc::clone(&services.renderer),
            template: template.unwrap_or_else(|| Arc::clone(&services.template)),
            config: Arc::clone(&services.config),
            request: FormRequest::default(),
            successful: false,
            render_build: RenderBuild::default(),
            alias,
            index,
        };

        Self {
            ctx,
            addons: AddonsFactory::default(),
            fields: FormFieldsFactory::default(),
            groups: FieldGroupsFactory::default(),
            buttons: ButtonsFactory::default(),
            handle: HandleFactory::default(),
            built: false,
            booted: false,
        }
    }

    /// Default parameters of the form `alias`.
    pub fn default_params(alias: &str) -> Value {
        json!({
            "action": "",
            "addons": {},
            "after": "",
            "attrs": {},
            "before": "",
            "buttons": {},
            "enctype": "",
            "fields": {},
            "groups": {},
            "method": "post",
            "options": {},
            "supports": ["session"],
            "title": alias,
            "token": true,
            "wrapper": {},
            "labels": {},
        })
    }

    /// Checks the form identity.
    pub fn build(&mut self) -> Result<()> {
        if self.built {
            return Ok(());
        }
        if self.ctx.alias.is_empty() {
            return Err(Error::MissingAlias {
                kind: DriverKind::Form,
            });
        }
        self.built = true;
        Ok(())
    }

    /// Boots every factory in order, then restores the `successful` flag
    /// flashed by the previous request.
    pub fn boot(&mut self, registry: &DriverRegistry) -> Result<()> {
        if self.booted {
            return Ok(());
        }
        if !self.built {
            return Err(Error::NotBuilt {
                alias: self.ctx.alias.clone(),
            });
        }

        self.ctx.events.boot();
        self.ctx.events.trigger("form.booting");

        self.ctx.session.boot(&self.ctx.events);
        self.addons.boot(&self.ctx, registry)?;
        self.fields
            .boot(&self.ctx, registry, &self.addons, &mut self.groups)?;
        self.groups.boot(&self.ctx, &mut self.fields);
        self.buttons.boot(&self.ctx, registry)?;
        self.ctx
            .options
            .boot(&self.ctx.events, &self.ctx.params, &self.ctx.config);
        self.ctx.validation.boot(&self.ctx.events);

        self.ctx.successful = self
            .ctx
            .session
            .flash_get("successful")
            .is_some_and(|v| is_truthy(&v));

        self.booted = true;
        self.ctx.events.trigger("form.booted");
        self.ctx.log().debug(format_args!(
            "form booted with {} fields, {} buttons",
            self.fields.count(),
            self.buttons.count()
        ));
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

    /// Shared context.
    pub fn context(&self) -> &FormContext {
        &self.ctx
    }

    /// Mutable shared context.
    pub fn context_mut(&mut self) -> &mut FormContext {
        &mut self.ctx
    }

    /// Alias of the form.
    pub fn alias(&self) -> &str {
        self.ctx.alias()
    }

    /// Position of the form within its manager.
    pub fn index(&self) -> usize {
        self.ctx.index()
    }

    /// Parameters of the form.
    pub fn params(&self) -> &ParamsBag {
        self.ctx.params()
    }

    /// HTTP method of the form: `get` or `post`.
    pub fn method(&self) -> String {
        self.ctx.method()
    }

    /// Action URL of the form.
    pub fn action(&self) -> String {
        self.ctx.action()
    }

    /// Title of the form.
    pub fn title(&self) -> String {
        self.ctx.title()
    }

    /// camelCase alias used in ids and classes.
    pub fn tag_name(&self) -> &str {
        self.ctx.tag_name()
    }

    /// Returns true if the form declares `support`.
    pub fn supports(&self, support: &str) -> bool {
        self.ctx.supports(support)
    }

    /// Display labels.
    pub fn labels(&self) -> Labels {
        self.ctx.labels()
    }

    /// Returns true if the form accepts uploads.
    pub fn is_upload_enabled(&self) -> bool {
        self.ctx.is_upload_enabled(self.fields.has_upload_field())
    }

    /// Returns true if an error notice was recorded.
    pub fn has_error(&self) -> bool {
        self.ctx.has_error()
    }

    /// Returns true if the fields are grouped.
    pub fn has_group(&self) -> bool {
        self.groups.count() > 0
    }

    /// Returns true once a submission succeeded.
    pub fn is_successful(&self) -> bool {
        self.ctx.is_successful()
    }

    /// Data key carrying the CSRF token, `""` when protection is off.
    pub fn csrf_key(&self) -> String {
        self.ctx.csrf_key()
    }

    /// Hidden input carrying the CSRF token.
    pub fn csrf_field(&self) -> String {
        self.ctx.csrf_field()
    }

    /// Fragment redirections point at.
    pub fn anchor(&mut self) -> String {
        self.ctx.anchor()
    }

    /// Records a notice and flashes it for the next request.
    pub fn add_notice(&mut self, message: &str, level: NoticeLevel, context: Map<String, Value>) {
        self.ctx.add_notice(message, level, context);
    }

    /// Records an error notice.
    pub fn error(&mut self, message: &str) {
        self.ctx.error(message);
    }

    /// Notices recorded during this request.
    pub fn messages(&self) -> &MessagesBag {
        self.ctx.messages()
    }

    /// Option at `path`.
    pub fn option(&self, path: &str) -> Option<&Value> {
        self.ctx.option(path)
    }

    /// Value persisted in session for the field named `key`.
    pub fn persistent(&self, key: &str) -> Option<Value> {
        self.ctx.persistent(key)
    }

    /// Sets the request handled by the form. Resets the submission state.
    pub fn set_handle_request(&mut self, request: FormRequest) -> &mut Self {
        self.ctx.request = request;
        self.handle = HandleFactory::default();
        self
    }

    /// Fields, in declaration order.
    pub fn fields(&self) -> &FormFieldsFactory {
        &self.fields
    }

    /// Field declared under `slug`.
    pub fn form_field(&self, slug: &str) -> Result<&FormFieldDriver> {
        self.fields.get(slug).ok_or_else(|| Error::FieldMissing {
            slug: slug.to_string(),
        })
    }

    /// Mutable field declared under `slug`.
    pub fn form_field_mut(&mut self, slug: &str) -> Result<&mut FormFieldDriver> {
        self.fields.get_mut(slug).ok_or_else(|| Error::FieldMissing {
            slug: slug.to_string(),
        })
    }

    /// Field groups.
    pub fn groups(&self) -> &FieldGroupsFactory {
        &self.groups
    }

    /// Group registered under `alias`.
    pub fn group(&self, alias: &str) -> Option<&FieldGroupDriver> {
        self.groups.get(alias)
    }

    /// Buttons, by position.
    pub fn buttons(&self) -> &ButtonsFactory {
        &self.buttons
    }

    /// Button registered under `alias`.
    pub fn button(&self, alias: &str) -> Option<&ButtonDriver> {
        self.buttons.get(alias)
    }

    /// Addons.
    pub fn addons(&self) -> &AddonsFactory {
        &self.addons
    }

    /// Addon registered under `alias`.
    pub fn addon(&self, alias: &str) -> Option<&AddonDriver> {
        self.addons.get(alias)
    }

    /// Submission state.
    pub fn handle(&self) -> &HandleFactory {
        &self.handle
    }

    /// Submission handler.
    pub fn handle_mut(&mut self) -> Handler<'_> {
        Handler {
            handle: &mut self.handle,
            ctx: &mut self.ctx,
            fields: &mut self.fields,
        }
    }

    /// Returns true if the handled request submits this form.
    pub fn is_submitted(&mut self) -> bool {
        self.handle_mut().is_submitted()
    }

    /// Renders the form through its template.
    pub fn render(&mut self) -> String {
        let has_upload = self.fields.has_upload_field();
        self.ctx.render_build(has_upload);
        self.fields.pre_render(&self.ctx);
        self.buttons.pre_render(&self.ctx);
        let template = Arc::clone(&self.ctx.template);
        template.render(self)
    }

    pub(crate) fn on_set_current(&self) {
        self.ctx.events.trigger("form.set.current");
    }

    pub(crate) fn on_unset_current(&self) {
        self.ctx.events.trigger("form.unset.current");
    }
}

/// Mutable access to a form that boots it on [`get`](Self::get).
#[derive(Debug)]
pub struct FormBuilder<'a> {
    form: &'a mut Form,
    registry: &'a DriverRegistry,
}

impl<'a> FormBuilder<'a> {
    pub(crate) fn new(form: &'a mut Form, registry: &'a DriverRegistry) -> Self {
        Self { form, registry }
    }

    /// Alias of the form.
    pub fn alias(&self) -> &str {
        self.form.alias()
    }

    /// Sets the request handled by the form before it boots.
    pub fn with_request(self, request: FormRequest) -> Self {
        self.form.set_handle_request(request);
        self
    }

    /// Boots the form and hands it over.
    pub fn get(self) -> Result<&'a mut Form> {
        self.form.boot(self.registry)?;
        Ok(self.form)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::FormManager;

    fn anchored(alias: &str, wrapper: Value) -> FormManager {
        let mut manager = FormManager::default();
        manager
            .build_form(
                FormDefinition::from_value(json!({
                    "alias": alias,
                    "token": false,
                    "wrapper": wrapper,
                    "options": {"anchor": true},
                }))
                .unwrap(),
            )
            .unwrap();
        manager
    }

    #[test]
    fn anchor_targets_the_wrapper_first() {
        let mut manager = anchored("contact", json!({}));
        let form = manager.get("contact").unwrap().get().unwrap();

        assert_eq!(form.anchor(), "Form--contact");
        // The form id is only resolved when the wrapper has none.
        assert_eq!(form.params().get("attrs.id"), None);
    }

    #[test]
    fn anchor_falls_back_to_the_form_id() {
        let mut manager = anchored("contact", json!(false));
        let form = manager.get("contact").unwrap().get().unwrap();

        assert_eq!(form.anchor(), "FormContent--contact");
    }

    #[test]
    fn definition_requires_an_object() {
        assert!(matches!(
            FormDefinition::from_value(json!(["contact"])),
            Err(Error::InvalidDefinition(_))
        ));
        assert!(matches!(
            FormDefinition::from_value(json!({"alias": 3})),
            Err(Error::InvalidDefinition(_))
        ));
    }

    #[test]
    fn definition_params_merge_deeply() {
        let definition = FormDefinition::from_json(r#"{"alias": "contact", "attrs": {"id": "a"}}"#)
            .unwrap()
            .with_params(json!({"attrs": {"class": "b"}}));

        assert_eq!(definition.alias(), "contact");
        assert_eq!(definition.params(), &json!({"attrs": {"id": "a", "class": "b"}}));
    }

    #[test]
    fn missing_alias_is_kept_empty() {
        let definition = FormDefinition::from_value(json!({"title": "Untitled"})).unwrap();
        assert_eq!(definition.alias(), "");
    }
}
