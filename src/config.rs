//! Manager-wide configuration.

use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Settings shared by every form of a [`FormManager`](crate::FormManager).
///
/// Missing keys fall back to their defaults, so a partial JSON document is
/// enough:
///
/// ```
/// use form_core::ManagerConfig;
///
/// let config = ManagerConfig::from_json(r#"{"token_key": "_csrf"}"#).unwrap();
/// assert_eq!(config.token_key, "_csrf");
/// assert!(config.boot_enabled);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ManagerConfig {
    /// Boot the manager (register default drivers) on construction
    pub boot_enabled: bool,
    /// Data key carrying the CSRF token when a form does not name one
    pub token_key: String,
    /// Default `success` option of every form
    pub success_message: String,
    /// Default message of the required check, `%s` receives the field title
    pub required_message: String,
    /// Default message of a failing validation, `%s` receives the field title
    pub invalid_message: String,
    /// Error added when the submitted CSRF token does not verify
    pub csrf_error_message: String,
}

impl Default for ManagerConfig {
    fn default() -> Self {
        Self {
            boot_enabled: true,
            token_key: "_token".to_string(),
            success_message: "The form was submitted with success.".to_string(),
            required_message: "The field \"%s\" is required.".to_string(),
            invalid_message: "The field \"%s\" format is invalid.".to_string(),
            csrf_error_message: "Form could not submitted : CSRF protection is invalid."
                .to_string(),
        }
    }
}

impl ManagerConfig {
    /// Decodes a configuration document.
    pub fn from_json(source: &str) -> Result<Self> {
        Ok(serde_json::from_str(source)?)
    }

    /// Decodes a configuration from an already parsed value.
    pub fn from_value(value: serde_json::Value) -> Result<Self> {
        Ok(serde_json::from_value(value)?)
    }
}

/// Replaces the first `%s` of `template` with `arg`.
pub(crate) fn sprintf(template: &str, arg: &str) -> String {
    template.replacen("%s", arg, 1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Error;

    #[test]
    fn empty_document_yields_defaults() {
        let config = ManagerConfig::from_json("{}").unwrap();
        assert_eq!(config, ManagerConfig::default());
    }

    #[test]
    fn malformed_document_is_a_config_error() {
        let error = ManagerConfig::from_json("{boot_enabled: nope").unwrap_err();
        assert!(matches!(error, Error::Config(_)));
    }

    #[test]
    fn sprintf_replaces_first_placeholder_only() {
        assert_eq!(sprintf("\"%s\" and %s", "Email"), "\"Email\" and %s");
        assert_eq!(sprintf("no placeholder", "Email"), "no placeholder");
    }
}
