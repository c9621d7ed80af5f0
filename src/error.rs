use std::fmt;

use thiserror::Error;

/// Result alias used throughout the crate.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Errors raised while registering, building, booting or handling forms.
#[derive(Debug, Error)]
pub enum Error {
    /// No driver definition is registered under the alias.
    #[error("form {kind} driver [{alias}] unresolvable")]
    DriverUnresolvable {
        /// Family of the missing driver
        kind: DriverKind,
        /// Requested alias
        alias: String,
    },

    /// A definition with the same alias already exists.
    #[error("another {kind} with alias [{alias}] already registered")]
    DuplicateAlias {
        /// Family of the conflicting definition
        kind: DriverKind,
        /// Conflicting alias
        alias: String,
    },

    /// A driver or form was built without an alias.
    #[error("{kind} requires a valid alias")]
    MissingAlias {
        /// Family of the driver lacking an alias
        kind: DriverKind,
    },

    /// A field declaration has no `type` key.
    #[error("field [{slug}] must have type in its declaration")]
    MissingFieldType {
        /// Slug of the offending field
        slug: String,
    },

    /// A field lookup by slug failed.
    #[error("field [{slug}] is missing")]
    FieldMissing {
        /// Requested slug
        slug: String,
    },

    /// No built form nor registered definition matches the alias.
    #[error("form [{alias}] unresolvable")]
    FormUnresolvable {
        /// Requested alias
        alias: String,
    },

    /// A form was booted before being built.
    #[error("form [{alias}] must be built before it boots")]
    NotBuilt {
        /// Alias of the form
        alias: String,
    },

    /// The definition document is structurally invalid.
    #[error("invalid form definition: {0}")]
    InvalidDefinition(String),

    /// A redirect URL could not be parsed.
    #[error("invalid url: {0}")]
    Url(#[from] url::ParseError),

    /// Configuration could not be decoded.
    #[error("invalid configuration: {0}")]
    Config(#[from] serde_json::Error),
}

/// Families of drivers and definitions handled by the manager.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DriverKind {
    /// A whole form definition
    Form,
    /// A form field driver
    Field,
    /// A button driver
    Button,
    /// An add-on driver
    Addon,
    /// A field group driver
    Group,
}

impl fmt::Display for DriverKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DriverKind::Form => write!(f, "form"),
            DriverKind::Field => write!(f, "field"),
            DriverKind::Button => write!(f, "button"),
            DriverKind::Addon => write!(f, "addon"),
            DriverKind::Group => write!(f, "group"),
        }
    }
}

/// Error returned when a submitted value fails a field check.
///
/// Carries the slug of the failing field, the already formatted message and
/// identification flags: `required` for the required check, otherwise the
/// alias of the failing validation.
///
/// # Examples
///
/// ```
/// use form_core::FieldValidationError;
///
/// let error = FieldValidationError::new("email", "The field \"Email\" is required.")
///     .set_required();
///
/// assert!(error.is_required());
/// assert_eq!(error.slug(), "email");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct FieldValidationError {
    slug: String,
    message: String,
    flags: Vec<String>,
}

impl FieldValidationError {
    /// Creates an error for the field `slug`.
    pub fn new(slug: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            slug: slug.into(),
            message: message.into(),
            flags: Vec::new(),
        }
    }

    /// Adds an identification flag, ignoring duplicates.
    pub fn add_flag(mut self, flag: impl Into<String>) -> Self {
        let flag = flag.into();
        if !self.flags.contains(&flag) {
            self.flags.push(flag);
        }
        self
    }

    /// Flags the error as a failed required check.
    pub fn set_required(self) -> Self {
        self.add_flag("required")
    }

    /// Returns true if the flag is registered.
    pub fn has_flag(&self, flag: &str) -> bool {
        self.flags.iter().any(|f| f == flag)
    }

    /// Returns true if the required check failed.
    pub fn is_required(&self) -> bool {
        self.has_flag("required")
    }

    /// Slug of the failing field.
    pub fn slug(&self) -> &str {
        &self.slug
    }

    /// Formatted message.
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Registered flags, in insertion order.
    pub fn flags(&self) -> &[String] {
        &self.flags
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn driver_errors_display_alias_and_kind() {
        let error = Error::DriverUnresolvable {
            kind: DriverKind::Button,
            alias: "reset".to_string(),
        };
        assert_eq!(error.to_string(), "form button driver [reset] unresolvable");

        let error = Error::DuplicateAlias {
            kind: DriverKind::Form,
            alias: "contact".to_string(),
        };
        assert_eq!(
            error.to_string(),
            "another form with alias [contact] already registered"
        );
    }

    #[test]
    fn validation_error_flags_are_unique() {
        let error = FieldValidationError::new("email", "invalid")
            .add_flag("email")
            .add_flag("email")
            .set_required();

        assert_eq!(error.flags(), &["email".to_string(), "required".to_string()]);
        assert!(error.is_required());
        assert!(!error.has_flag("length"));
    }

    #[test]
    fn validation_error_displays_message_only() {
        let error = FieldValidationError::new("name", "Name is invalid.");
        assert_eq!(format!("{}", error), "Name is invalid.");
    }

    #[test]
    fn url_errors_convert() {
        let parse = url::Url::parse("http://[::1").unwrap_err();
        let error: Error = parse.into();
        assert!(matches!(error, Error::Url(_)));
    }
}
