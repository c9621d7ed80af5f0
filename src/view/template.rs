use std::fmt;

use serde_json::{json, Value};

use crate::button::ButtonDriver;
use crate::field::FormFieldDriver;
use crate::form::Form;
use crate::group::FieldGroupDriver;
use crate::html;
use crate::messages::NoticeLevel;
use crate::params::merge;

/// Layout of a rendered form.
///
/// Every part has a default implementation, so a custom template only
/// overrides the parts it changes:
///
/// ```
/// use form_core::view::FormTemplate;
/// use form_core::{Form, FormDefinition, FormManager};
///
/// #[derive(Debug)]
/// struct Titled;
///
/// impl FormTemplate for Titled {
///     fn header(&self, form: &Form) -> String {
///         format!("<h2>{}</h2>", form.title())
///     }
/// }
///
/// let mut manager = FormManager::default();
/// manager
///     .build_form(FormDefinition::new("survey").template(Titled))
///     .unwrap();
/// let form = manager.get("survey").unwrap().get().unwrap();
/// assert!(form.render().contains(r#"<header class="FormHeader FormHeader--survey"><h2>survey</h2></header>"#));
/// ```
///
/// The form is prepared before the template runs: ids, classes, wrappers
/// and labels of the form, its fields and its buttons are resolved.
pub trait FormTemplate: Send + Sync + fmt::Debug {
    /// Whole form: wrapper, before, notices, `<form>` and after.
    fn render(&self, form: &Form) -> String {
        let content = format!(
            "{}{}{}{}",
            form.params().get_str("before").unwrap_or_default(),
            self.notices(form),
            self.form_tag(form),
            form.params().get_str("after").unwrap_or_default(),
        );
        self.wrapper_form(form, content)
    }

    /// Wraps the form markup when the `wrapper` parameter is set.
    fn wrapper_form(&self, form: &Form, content: String) -> String {
        match form.params().get("wrapper") {
            Some(wrapper @ Value::Object(_)) => wrap(wrapper, content),
            _ => content,
        }
    }

    /// `<form>` element: CSRF field, then the non-empty sections.
    fn form_tag(&self, form: &Form) -> String {
        let tag_name = form.tag_name();
        let mut content = form.csrf_field();
        for (section, element, markup) in [
            ("FormHeader", "header", self.header(form)),
            ("FormBody", "main", self.body(form)),
            ("FormFooter", "footer", self.footer(form)),
        ] {
            if markup.is_empty() {
                continue;
            }
            content.push_str(&format!(
                "<{element} class=\"{section} {section}--{tag_name}\">{markup}</{element}>"
            ));
        }
        html::tag("form", &form.params().get_object("attrs"), &content)
    }

    /// Messages of the first notice level holding any, levels taken in
    /// [`NoticeLevel::ALL`] order.
    fn notices(&self, form: &Form) -> String {
        let fetched = form.messages().fetch(&NoticeLevel::ALL);
        let Some((level, messages)) = NoticeLevel::ALL
            .iter()
            .find_map(|level| fetched.get(level).filter(|m| !m.is_empty()).map(|m| (*level, m)))
        else {
            return String::new();
        };

        let items: String = messages
            .iter()
            .map(|message| {
                format!(
                    "<li class=\"Notice-item FormNotice-item FormNotice-item--{level}\">{}</li>",
                    html::escape(message)
                )
            })
            .collect();
        format!(
            "<div class=\"FormNotice FormNotice--{level}\">\
             <ol class=\"Notice-items FormNotice-items FormNotice-items--{level}\">{items}</ol>\
             </div>"
        )
    }

    /// Header section; empty unless overridden.
    fn header(&self, _form: &Form) -> String {
        String::new()
    }

    /// Body section: the rows of fields, grouped when groups exist.
    fn body(&self, form: &Form) -> String {
        if form.fields().count() == 0 {
            return String::new();
        }
        let rows = if form.has_group() {
            self.groups(form)
        } else {
            form.fields()
                .iter()
                .map(|field| self.field(form, field))
                .collect()
        };
        format!("<div class=\"FormRows\">{rows}</div>")
    }

    /// Footer section: the buttons.
    fn footer(&self, form: &Form) -> String {
        self.buttons(form)
    }

    /// Every group, by position.
    fn groups(&self, form: &Form) -> String {
        form.groups()
            .iter()
            .map(|group| self.group(form, group))
            .collect()
    }

    /// One group and its fields, by position.
    fn group(&self, form: &Form, group: &FieldGroupDriver) -> String {
        let mut fields = group.fields(form.fields());
        fields.sort_by_key(|field| field.position());
        let rows: String = fields.into_iter().map(|field| self.field(form, field)).collect();
        format!(
            "{}{}{}",
            group.before(),
            html::tag("div", &group.attrs_map(), &rows),
            group.after()
        )
    }

    /// One row: before, label and control, after, in the field wrapper.
    fn field(&self, form: &Form, field: &FormFieldDriver) -> String {
        let content = format!(
            "{}{}{}",
            field.before(),
            self.field_content(form, field),
            field.after()
        );
        match field.params().get("wrapper") {
            Some(wrapper @ Value::Object(_)) if field.has_wrapper() => wrap(wrapper, content),
            _ => content,
        }
    }

    /// Label and control, ordered by the label `position`.
    fn field_content(&self, form: &Form, field: &FormFieldDriver) -> String {
        let label = self.field_label(form, field);
        let control = field.render(form.context());
        if field.params().get_str("label.position") == Some("after") {
            format!("{control}{label}")
        } else {
            format!("{label}{control}")
        }
    }

    /// Label of a field, then its required marker when not already part of
    /// the label.
    fn field_label(&self, form: &Form, field: &FormFieldDriver) -> String {
        if !field.has_label() {
            return String::new();
        }
        let label_args = field.params().get_or("label", json!({}));
        let label = form.context().renderer().render("label", &label_args) + &self.field_required(field);
        match field.params().get("label.wrapper") {
            Some(wrapper @ Value::Object(_)) => wrap(wrapper, label),
            _ => label,
        }
    }

    /// Marker of a required field.
    fn field_required(&self, field: &FormFieldDriver) -> String {
        match field.params().get("required.tagged") {
            Some(tagged @ Value::Object(_)) => html::tag_from(tagged),
            _ => String::new(),
        }
    }

    /// Every button, by position.
    fn buttons(&self, form: &Form) -> String {
        if form.buttons().count() == 0 {
            return String::new();
        }
        let buttons: String = form
            .buttons()
            .iter()
            .map(|button| self.button(form, button))
            .collect();
        format!("<div class=\"FormButtons\">{buttons}</div>")
    }

    /// One button: before, control, after, in the button wrapper.
    fn button(&self, form: &Form, button: &ButtonDriver) -> String {
        let content = format!(
            "{}{}{}",
            button.before(),
            button.render(form.context()),
            button.after()
        );
        match button.params().get("wrapper") {
            Some(wrapper @ Value::Object(_)) => wrap(wrapper, content),
            _ => content,
        }
    }
}

fn wrap(wrapper: &Value, content: String) -> String {
    let mut params = wrapper.clone();
    merge(&mut params, json!({"content": content}));
    html::tag_from(&params)
}

/// Template with the default layout.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultTemplate;

impl FormTemplate for DefaultTemplate {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{FormDefinition, FormManager, FormRequest};
    use pretty_assertions::assert_eq;
    use serde_json::Map;

    fn manager_with(definition: Value) -> FormManager {
        let mut manager = FormManager::default();
        manager
            .build_form(FormDefinition::from_value(definition).unwrap())
            .unwrap();
        manager
    }

    #[test]
    fn renders_the_default_layout() {
        let mut manager = manager_with(json!({
            "alias": "contact",
            "token": false,
            "fields": {
                "email": {"type": "email", "title": "Email", "required": true},
            },
        }));
        let form = manager.get("contact").unwrap().get().unwrap();
        let html = form.render();

        assert_eq!(
            html,
            concat!(
                r#"<div id="Form--contact" class="Form">"#,
                r#"<form id="FormContent--contact" class="FormContent FormContent--contact" action="" method="post">"#,
                r#"<main class="FormBody FormBody--contact"><div class="FormRows">"#,
                r#"<div id="FormRow--email_0" class="FormRow FormRow--email FormRow--email">"#,
                r#"<label id="FormField-label--email_0" class="FormField-label FormField-label--email FormField-label--email" for="FormField-input--email_0">"#,
                r#"Email<span id="FormField-required--email_0" class="FormField-required FormField-required--email FormField-required--email">*</span>"#,
                r#"</label>"#,
                r#"<input type="email" name="email" id="FormField-input--email_0" class="FormField-input FormField-input--email FormField-input--email" tabindex="0"/>"#,
                r#"</div>"#,
                r#"</div></main>"#,
                r#"<footer class="FormFooter FormFooter--contact"><div class="FormButtons">"#,
                r#"<div id="FormButton--submit_0" class="FormButton FormButton--submit"><button type="submit">Send</button></div>"#,
                r#"</div></footer>"#,
                r#"</form></div>"#,
            )
        );
    }

    #[test]
    fn label_wrapper_holds_the_required_marker() {
        let mut manager = manager_with(json!({
            "alias": "contact",
            "token": false,
            "fields": {
                "email": {
                    "type": "email",
                    "title": "Email",
                    "required": true,
                    "label": {"wrapper": true, "require": false},
                },
            },
        }));
        let form = manager.get("contact").unwrap().get().unwrap();
        let html = form.render();

        assert!(html.contains(concat!(
            r#"<div id="FormField-labelWrapper--email_0" class="FormField-labelWrapper FormField-labelWrapper--email FormField-labelWrapper--email">"#,
            r#"<label id="FormField-label--email_0""#,
        )));
        assert!(html.contains(concat!(
            r#"Email</label>"#,
            r#"<span id="FormField-required--email_0" class="FormField-required FormField-required--email FormField-required--email">*</span>"#,
            r#"</div>"#,
        )));
    }

    #[test]
    fn notices_show_the_most_important_level_only() {
        let mut manager = manager_with(json!({"alias": "n", "token": false}));
        let form = manager.get("n").unwrap().get().unwrap();
        form.add_notice("saved", NoticeLevel::Success, Map::new());
        form.add_notice("<bad>", NoticeLevel::Error, Map::new());

        let notices = DefaultTemplate.notices(form);
        assert_eq!(
            notices,
            concat!(
                r#"<div class="FormNotice FormNotice--error">"#,
                r#"<ol class="Notice-items FormNotice-items FormNotice-items--error">"#,
                r#"<li class="Notice-item FormNotice-item FormNotice-item--error">&lt;bad&gt;</li>"#,
                r#"</ol></div>"#,
            )
        );
    }

    #[test]
    fn empty_forms_render_no_body() {
        let mut manager = manager_with(json!({"alias": "empty", "token": false, "wrapper": false}));
        let form = manager.get("empty").unwrap().get().unwrap();
        assert_eq!(DefaultTemplate.body(form), "");
        assert!(form.render().starts_with("<form "));
    }

    #[test]
    fn csrf_field_opens_the_form() {
        let mut manager = manager_with(json!({"alias": "secure"}));
        let form = manager
            .get("secure")
            .unwrap()
            .with_request(FormRequest::new("GET", "/"))
            .get()
            .unwrap();
        let token = form.context().session().token();
        assert!(form
            .render()
            .contains(&format!(r#"method="post"><input type="hidden" name="_token" value="{}"/>"#, token)));
    }

    #[test]
    fn grouped_fields_render_inside_their_group() {
        let mut manager = manager_with(json!({
            "alias": "g",
            "token": false,
            "fields": {
                "a": {"type": "text", "group": "left", "label": false, "wrapper": false},
                "b": {"type": "text", "group": "right", "label": false, "wrapper": false},
            },
            "groups": {"right": {"position": 1}, "left": {"position": 2}},
        }));
        let form = manager.get("g").unwrap().get().unwrap();
        form.render();

        let body = DefaultTemplate.body(form);
        let right = body.find("FormFieldsGroup--right").unwrap();
        let left = body.find("FormFieldsGroup--left").unwrap();
        assert!(right < left);
        assert!(body.find(r#"name="b""#).unwrap() > right);
        assert!(body.find(r#"name="a""#).unwrap() > left);
    }
}
