use std::fmt;

/// Logging handle bound to one form.
///
/// `FormLog` is obtained from [`FormContext::log`](crate::FormContext::log)
/// and stamps every event with the form alias and index, so lifecycle and
/// submission traces of concurrent forms stay apart.
#[derive(Debug, Clone, Copy)]
pub struct FormLog<'a> {
    alias: &'a str,
    index: usize,
}

impl<'a> FormLog<'a> {
    pub(crate) fn new(alias: &'a str, index: usize) -> Self {
        Self { alias, index }
    }

    /// Alias of the form events are attached to.
    pub fn alias(&self) -> &str {
        self.alias
    }

    /// Logs an info-level message.
    ///
    /// Use with `format_args!`:
    /// ```no_run
    /// # use form_core::FormLog;
    /// # fn example(log: FormLog<'_>) {
    /// log.info(format_args!("submission accepted for {} fields", 3));
    /// # }
    /// ```
    pub fn info(&self, args: fmt::Arguments<'_>) {
        tracing::info!(form = %self.alias, index = self.index, "{}", args);
    }

    /// Logs a warning-level message.
    pub fn warn(&self, args: fmt::Arguments<'_>) {
        tracing::warn!(form = %self.alias, index = self.index, "{}", args);
    }

    /// Logs an error-level message.
    pub fn error(&self, args: fmt::Arguments<'_>) {
        tracing::error!(form = %self.alias, index = self.index, "{}", args);
    }

    /// Logs a debug-level message.
    pub fn debug(&self, args: fmt::Arguments<'_>) {
        tracing::debug!(form = %self.alias, index = self.index, "{}", args);
    }
}
