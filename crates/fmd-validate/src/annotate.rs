//! Comment accumulation.

use fmd_model::CommentPolicy;

/// Delimiter between phrases in a comment.
pub const COMMENT_SEPARATOR: &str = " | ";

/// The QA comment of one record. Only grows.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QaComment {
    text: String,
}

impl QaComment {
    /// Start from the comment a record already carries.
    pub fn new(existing: impl Into<String>) -> Self {
        Self {
            text: existing.into(),
        }
    }

    /// Append `phrase`, delimited unless the comment is empty. Returns whether
    /// the text changed.
    pub fn append(&mut self, phrase: &str, policy: CommentPolicy) -> bool {
        if policy == CommentPolicy::SkipExisting && self.contains(phrase) {
            return false;
        }
        if !self.text.is_empty() {
            self.text.push_str(COMMENT_SEPARATOR);
        }
        self.text.push_str(phrase);
        true
    }

    pub fn contains(&self, phrase: &str) -> bool {
        self.segments().any(|segment| segment == phrase)
    }

    pub fn segments(&self) -> impl Iterator<Item = &str> {
        self.text
            .split(COMMENT_SEPARATOR)
            .map(str::trim)
            .filter(|segment| !segment.is_empty())
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }
}
