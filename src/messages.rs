//! Ordered notice store attached to a form.

use std::fmt;
use std::str::FromStr;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Severity of a notice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NoticeLevel {
    /// Blocking problem, the submission failed
    Error,
    /// Non-blocking problem
    Warning,
    /// Informational notice
    Info,
    /// Successful outcome
    Success,
}

impl NoticeLevel {
    /// Every level, in the order notices are displayed.
    pub const ALL: [NoticeLevel; 4] = [
        NoticeLevel::Error,
        NoticeLevel::Success,
        NoticeLevel::Info,
        NoticeLevel::Warning,
    ];

    /// Lowercase name of the level.
    pub fn as_str(&self) -> &'static str {
        match self {
            NoticeLevel::Error => "error",
            NoticeLevel::Warning => "warning",
            NoticeLevel::Info => "info",
            NoticeLevel::Success => "success",
        }
    }

    /// Parses a level name, falling back to [`NoticeLevel::Error`].
    ///
    /// `notice` is an alias of `success`.
    pub fn parse_lossy(name: &str) -> Self {
        name.parse().unwrap_or(NoticeLevel::Error)
    }
}

impl FromStr for NoticeLevel {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "error" => Ok(NoticeLevel::Error),
            "warning" => Ok(NoticeLevel::Warning),
            "info" => Ok(NoticeLevel::Info),
            "success" | "notice" => Ok(NoticeLevel::Success),
            _ => Err(()),
        }
    }
}

impl fmt::Display for NoticeLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single recorded notice.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Notice {
    /// Severity
    pub level: NoticeLevel,
    /// Message text, unescaped
    pub message: String,
    /// Free-form context, e.g. `{"field": "email"}`
    #[serde(default)]
    pub context: Map<String, Value>,
}

/// Ordered collection of notices.
///
/// # Examples
///
/// ```
/// use form_core::{MessagesBag, NoticeLevel};
/// use serde_json::{json, Map};
///
/// let mut bag = MessagesBag::new();
/// let mut context = Map::new();
/// context.insert("field".to_string(), json!("email"));
/// bag.add("Email is required.", NoticeLevel::Error, context.clone());
///
/// assert!(bag.exists(NoticeLevel::Error));
/// assert!(bag.exists_for_context(&context, Some(NoticeLevel::Error)));
/// assert!(!bag.exists(NoticeLevel::Success));
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MessagesBag {
    notices: Vec<Notice>,
}

impl MessagesBag {
    /// Creates an empty bag.
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a notice and returns a copy of it.
    pub fn add(
        &mut self,
        message: impl Into<String>,
        level: NoticeLevel,
        context: Map<String, Value>,
    ) -> Notice {
        let notice = Notice {
            level,
            message: message.into(),
            context,
        };
        self.notices.push(notice.clone());
        notice
    }

    /// Number of recorded notices.
    pub fn count(&self) -> usize {
        self.notices.len()
    }

    /// Returns true if no notice is recorded.
    pub fn is_empty(&self) -> bool {
        self.notices.is_empty()
    }

    /// Returns true if any notice of `level` exists.
    pub fn exists(&self, level: NoticeLevel) -> bool {
        self.notices.iter().any(|n| n.level == level)
    }

    /// Returns true if a notice matches every key of `context`, optionally
    /// restricted to `level`.
    pub fn exists_for_context(&self, context: &Map<String, Value>, level: Option<NoticeLevel>) -> bool {
        self.notices.iter().any(|n| {
            level.map_or(true, |l| n.level == l)
                && context.iter().all(|(k, v)| n.context.get(k) == Some(v))
        })
    }

    /// Messages grouped by level, restricted to `levels` (all levels when
    /// empty). Levels without messages are omitted.
    pub fn fetch(&self, levels: &[NoticeLevel]) -> IndexMap<NoticeLevel, Vec<String>> {
        let mut out: IndexMap<NoticeLevel, Vec<String>> = IndexMap::new();
        for notice in &self.notices {
            if levels.is_empty() || levels.contains(&notice.level) {
                out.entry(notice.level).or_default().push(notice.message.clone());
            }
        }
        out
    }

    /// Every notice, in insertion order.
    pub fn all(&self) -> &[Notice] {
        &self.notices
    }

    /// Notices whose context matches every key of `context`.
    pub fn for_context<'a>(&'a self, context: &'a Map<String, Value>) -> impl Iterator<Item = &'a Notice> + 'a {
        self.notices
            .iter()
            .filter(move |n| context.iter().all(|(k, v)| n.context.get(k) == Some(v)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn field_context(slug: &str) -> Map<String, Value> {
        let mut context = Map::new();
        context.insert("field".to_string(), json!(slug));
        context
    }

    #[test]
    fn level_parsing_is_lenient() {
        assert_eq!(NoticeLevel::parse_lossy("notice"), NoticeLevel::Success);
        assert_eq!(NoticeLevel::parse_lossy("WARNING"), NoticeLevel::Warning);
        assert_eq!(NoticeLevel::parse_lossy("debug"), NoticeLevel::Error);
        assert!("debug".parse::<NoticeLevel>().is_err());
    }

    #[test]
    fn fetch_groups_by_level_in_first_seen_order() {
        let mut bag = MessagesBag::new();
        bag.add("saved", NoticeLevel::Success, Map::new());
        bag.add("bad email", NoticeLevel::Error, field_context("email"));
        bag.add("bad name", NoticeLevel::Error, field_context("name"));

        let all = bag.fetch(&[]);
        let levels: Vec<_> = all.keys().copied().collect();
        assert_eq!(levels, vec![NoticeLevel::Success, NoticeLevel::Error]);
        assert_eq!(all[&NoticeLevel::Error], vec!["bad email", "bad name"]);

        let errors = bag.fetch(&[NoticeLevel::Error]);
        assert_eq!(errors.len(), 1);
        assert_eq!(bag.count(), 3);
    }

    #[test]
    fn context_matching_requires_every_key() {
        let mut bag = MessagesBag::new();
        bag.add("bad email", NoticeLevel::Error, field_context("email"));

        assert!(bag.exists_for_context(&field_context("email"), None));
        assert!(!bag.exists_for_context(&field_context("name"), None));
        assert!(!bag.exists_for_context(&field_context("email"), Some(NoticeLevel::Info)));

        let mut wider = field_context("email");
        wider.insert("form".to_string(), json!("contact"));
        assert!(!bag.exists_for_context(&wider, None));
        assert_eq!(bag.for_context(&field_context("email")).count(), 1);
    }

    #[test]
    fn notices_serialize_with_lowercase_levels() {
        let notice = Notice {
            level: NoticeLevel::Warning,
            message: "careful".to_string(),
            context: Map::new(),
        };
        let value = serde_json::to_value(&notice).unwrap();
        assert_eq!(value["level"], json!("warning"));
    }
}
