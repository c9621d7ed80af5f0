use serde_json::{Map, Value};

use crate::error::Result;
use crate::factory::FormFieldsFactory;
use crate::form::FormContext;
use crate::messages::NoticeLevel;
use crate::params::{as_text, ParamsBag};
use crate::request::{RedirectResponse, UrlManipulator};

/// Per-request submission state of a form.
///
/// The state is driven through a [`Handler`], obtained from
/// [`Form::handle_mut`](crate::Form::handle_mut).
#[derive(Debug, Clone, Default)]
pub struct HandleFactory {
    data: ParamsBag,
    failed_redirect_url: Option<String>,
    succeed_redirect_url: Option<String>,
    submitted: Option<bool>,
    booted: bool,
}

impl HandleFactory {
    /// Submitted data, once booted.
    pub fn data(&self) -> &ParamsBag {
        &self.data
    }

    /// Returns true once the request data was read.
    pub fn is_booted(&self) -> bool {
        self.booted
    }

    /// Outcome of the submission check, once performed.
    pub fn submitted(&self) -> Option<bool> {
        self.submitted
    }
}

/// Borrowed view tying the submission state to the form it handles.
///
/// # Examples
///
/// ```
/// use form_core::{FormDefinition, FormManager, FormRequest};
/// use serde_json::json;
///
/// let mut manager = FormManager::default();
/// manager
///     .build_form(FormDefinition::from_value(json!({
///         "alias": "search",
///         "method": "get",
///         "token": false,
///         "fields": {"q": {"type": "text", "required": true}},
///     })).unwrap())
///     .unwrap();
///
/// let form = manager.get("search").unwrap().get().unwrap();
/// form.set_handle_request(FormRequest::new("GET", "/find?q="));
///
/// let redirect = form.handle_mut().proceed().unwrap();
/// assert_eq!(redirect.unwrap().location, "/find");
/// assert!(form.has_error());
/// ```
#[derive(Debug)]
pub struct Handler<'a> {
    pub(crate) handle: &'a mut HandleFactory,
    pub(crate) ctx: &'a mut FormContext,
    pub(crate) fields: &'a mut FormFieldsFactory,
}

impl Handler<'_> {
    /// Reads the request data and persists the transported field values
    /// in session. Runs once per request.
    pub fn boot(&mut self) {
        if self.handle.booted {
            return;
        }
        let ctx = &*self.ctx;
        ctx.events().trigger("handle.booting");

        let request = ctx.request();
        let source = if ctx.method() == "get" {
            request.query()
        } else {
            request.body()
        };
        self.handle.data = ParamsBag::from_value(source.clone());

        for field in self.fields.iter_mut() {
            let name = field.name();
            let value = if field.supports("transport") {
                self.handle.data.get(&name).cloned().unwrap_or(Value::Null)
            } else {
                Value::Null
            };
            ctx.session().set(&format!("request.{}", name), value);
            field.persist_value(ctx);
        }

        if ctx.is_upload_enabled(self.fields.has_upload_field()) {
            self.handle.data.merge(request.files().clone());
        }

        self.handle.booted = true;
        ctx.events().trigger("handle.booted");
    }

    /// Submitted data.
    pub fn data(&self) -> &ParamsBag {
        &self.handle.data
    }

    /// Stores `value` in the session under `request.<key>`.
    pub fn persist(&self, key: &str, value: Value) {
        self.ctx.session().set(&format!("request.{}", key), value);
    }

    /// Returns true if the request submits this form.
    ///
    /// The request method must match the form method. With CSRF protection
    /// on, the submitted token must verify; an invalid token records an
    /// error and fails the submission. With CSRF protection off, at least
    /// one field must be present in the data.
    pub fn is_submitted(&mut self) -> bool {
        self.boot();
        if let Some(submitted) = self.handle.submitted {
            return submitted;
        }

        let method_matches = self.ctx.request().is_method(&self.ctx.method());
        let token_key = self.ctx.csrf_key();

        let submitted = if token_key.is_empty() {
            method_matches
                && self
                    .fields
                    .iter()
                    .any(|field| self.handle.data.has(&field.name()))
        } else {
            let token = self
                .handle
                .data
                .get(&token_key)
                .and_then(as_text)
                .filter(|t| !t.is_empty());
            match token {
                Some(token) if method_matches => {
                    if self.ctx.session().verify_token(&token) {
                        true
                    } else {
                        let message = self.ctx.config().csrf_error_message.clone();
                        self.ctx.error(&message);
                        self.ctx.log().warn(format_args!("csrf token rejected"));
                        self.fail();
                        false
                    }
                }
                _ => false,
            }
        };

        self.handle.submitted = Some(submitted);
        self.ctx
            .log()
            .debug(format_args!("submitted: {}", submitted));
        submitted
    }

    /// Validates every field against its submitted value; failures become
    /// field-scoped errors.
    pub fn validate(&mut self) {
        let data = &self.handle.data;
        for field in self.fields.iter() {
            let value = data
                .get(&field.name())
                .cloned()
                .unwrap_or_else(|| field.value(self.ctx, true));
            if let Err(error) = field.validate(self.ctx, &value, data) {
                self.ctx
                    .log()
                    .debug(format_args!("field {} rejected: {:?}", field.slug(), error.flags()));
                field.error(self.ctx, error.message());
            }
        }
    }

    /// Returns true if no error was recorded, including by the
    /// `handle.validated` listeners.
    pub fn is_validated(&mut self) -> bool {
        if self.ctx.has_error() {
            return false;
        }
        let event = self.ctx.events().trigger("handle.validated");
        for notice in event.notices {
            self.ctx.add_notice(&notice.message, notice.level, notice.context);
        }
        !self.ctx.has_error()
    }

    /// Marks the submission successful.
    ///
    /// The form session namespace and token are cleared, `successful` is
    /// flashed and the `success` option is added as a notice.
    pub fn success(&mut self) {
        let ctx = &mut *self.ctx;
        ctx.session().clear();
        ctx.set_successful(true);

        let mut flash = Map::new();
        flash.insert("successful".to_string(), Value::Bool(true));
        ctx.session().flash_set(flash);

        let message = ctx.option("success").and_then(as_text).unwrap_or_default();
        if !message.is_empty() {
            ctx.add_notice(&message, NoticeLevel::Success, Map::new());
        }

        ctx.events().trigger("handle.successful");
        ctx.log().info(format_args!("submission succeeded"));
    }

    /// Marks the submission failed: values of fields that do not
    /// transport their value are reset.
    pub fn fail(&mut self) {
        for field in self.fields.iter_mut() {
            if !field.supports("transport") {
                field.reset_value();
            }
        }
        self.ctx.events().trigger("handle.failed");
        let errors = self
            .ctx
            .messages()
            .fetch(&[NoticeLevel::Error])
            .values()
            .map(Vec::len)
            .sum::<usize>();
        self.ctx
            .log()
            .warn(format_args!("submission failed with {} errors", errors));
    }

    /// Handles the request: a submission is validated, then succeeds or
    /// fails, and the redirection is returned. Requests that do not submit
    /// the form yield `None`.
    pub fn proceed(&mut self) -> Result<Option<RedirectResponse>> {
        if !self.is_submitted() {
            return Ok(None);
        }
        self.validate();
        if self.is_validated() {
            self.success();
        } else {
            self.fail();
        }
        self.redirect_response().map(Some)
    }

    /// Redirection matching the outcome of the submission.
    pub fn redirect_response(&mut self) -> Result<RedirectResponse> {
        let location = if self.ctx.is_successful() {
            self.succeed_redirect_url()?
        } else {
            self.failed_redirect_url()?
        };
        Ok(RedirectResponse::to(location))
    }

    /// Redirection URL after a success, as altered by the
    /// `handle.succeed.redirect_url` listeners. Defaults to the referer.
    pub fn succeed_redirect_url(&mut self) -> Result<String> {
        if self.handle.succeed_redirect_url.is_none() {
            let referer = self.referer_url();
            self.set_succeed_redirect_url(&referer, false)?;
        }
        let url = self.handle.succeed_redirect_url.clone().unwrap_or_default();
        let url = self.filter_url("handle.succeed.redirect_url", url);
        self.handle.succeed_redirect_url = Some(url.clone());
        Ok(url)
    }

    /// Redirection URL after a failure, as altered by the
    /// `handle.failed.redirect_url` listeners. Defaults to the referer.
    pub fn failed_redirect_url(&mut self) -> Result<String> {
        if self.handle.failed_redirect_url.is_none() {
            let referer = self.referer_url();
            self.set_failed_redirect_url(&referer, false)?;
        }
        let url = self.handle.failed_redirect_url.clone().unwrap_or_default();
        let url = self.filter_url("handle.failed.redirect_url", url);
        self.handle.failed_redirect_url = Some(url.clone());
        Ok(url)
    }

    /// Sets the redirection URL after a success. Non-raw URLs are cleaned
    /// of submitted keys (GET forms) and receive the form anchor.
    pub fn set_succeed_redirect_url(&mut self, url: &str, raw: bool) -> Result<()> {
        let url = if raw { url.to_string() } else { self.generate_url(url)? };
        self.handle.succeed_redirect_url = Some(url);
        Ok(())
    }

    /// Sets the redirection URL after a failure. Non-raw URLs are cleaned
    /// of submitted keys (GET forms) and receive the form anchor.
    pub fn set_failed_redirect_url(&mut self, url: &str, raw: bool) -> Result<()> {
        let url = if raw { url.to_string() } else { self.generate_url(url)? };
        self.handle.failed_redirect_url = Some(url);
        Ok(())
    }

    /// Records an error on the field `field` when it exists, on the form
    /// otherwise.
    pub fn safe_error(&mut self, message: &str, context: Map<String, Value>, field: Option<&str>) {
        match field.and_then(|slug| self.fields.get(slug)) {
            Some(field) => field.add_notice(self.ctx, message, NoticeLevel::Error, context),
            None => self.ctx.add_notice(message, NoticeLevel::Error, context),
        }
    }

    fn referer_url(&self) -> String {
        let request = self.ctx.request();
        self.handle
            .data
            .get("_http_referer")
            .and_then(as_text)
            .filter(|url| !url.is_empty())
            .or_else(|| {
                request
                    .header("referer")
                    .filter(|url| !url.is_empty())
                    .map(str::to_string)
            })
            .unwrap_or_else(|| request.url().to_string())
    }

    fn generate_url(&mut self, url: &str) -> Result<String> {
        let mut uri = UrlManipulator::parse(url)?;
        if self.ctx.method() == "get" {
            let mut without = Vec::new();
            let token_key = self.ctx.csrf_key();
            if !token_key.is_empty() {
                without.push(token_key);
            }
            without.extend(self.fields.iter().map(|field| field.name()));
            let keys: Vec<&str> = without.iter().map(String::as_str).collect();
            uri = uri.without(&keys);
        }
        let anchor = self.ctx.anchor();
        Ok(uri.with_fragment(&anchor).render())
    }

    fn filter_url(&self, event: &str, url: String) -> String {
        self.ctx
            .events()
            .trigger_with(event, None, Some(Value::String(url.clone())))
            .value
            .as_ref()
            .and_then(as_text)
            .unwrap_or(url)
    }
}
