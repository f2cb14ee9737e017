use serde::{Deserialize, Serialize};
use std::fmt;
use utoipa::ToSchema;

/// A page variant label the bandit can select, e.g. `"day"` or `"night"`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, ToSchema)]
#[serde(transparent)]
pub struct Arm(String);

impl Arm {
    pub fn new(label: impl Into<String>) -> Self {
        Self(label.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Arm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Arm {
    fn from(label: &str) -> Self {
        Self::new(label)
    }
}

impl From<String> for Arm {
    fn from(label: String) -> Self {
        Self(label)
    }
}

/// Visitor outcome reported by the front end after a variant was shown.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FeedbackAction {
    /// The visitor converted.
    Book,
    /// Any other outcome, carrying the normalized action text.
    Other(String),
}

impl FeedbackAction {
    /// Normalize a raw action string: trimmed, lower-cased, and each inner
    /// whitespace character replaced by an underscore.
    pub fn parse(raw: &str) -> Self {
        let normalized: String = raw
            .trim()
            .to_lowercase()
            .chars()
            .map(|c| if c.is_whitespace() { '_' } else { c })
            .collect();

        if normalized == "book" {
            Self::Book
        } else {
            Self::Other(normalized)
        }
    }

    pub fn reward(&self) -> f64 {
        match self {
            Self::Book => 1.0,
            Self::Other(_) => 0.0,
        }
    }

    pub fn is_conversion(&self) -> bool {
        matches!(self, Self::Book)
    }
}
