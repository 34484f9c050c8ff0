//! Configuration options for a QA run.

use serde::{Deserialize, Serialize};

/// Number of declaration keys evaluated per batch unless configured.
pub const DEFAULT_BATCH_SIZE: usize = 500;

/// How a phrase is merged into a comment that may already carry it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum CommentPolicy {
    /// Always append. Re-running on annotated output repeats phrases.
    #[default]
    Append,
    /// Skip a phrase already present as a comment segment.
    SkipExisting,
}

/// Options controlling a QA run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QaOptions {
    /// Declaration keys per batch. Bounds peak memory; never changes results.
    pub batch_size: usize,

    pub comment_policy: CommentPolicy,
}

impl Default for QaOptions {
    fn default() -> Self {
        Self {
            batch_size: DEFAULT_BATCH_SIZE,
            comment_policy: CommentPolicy::default(),
        }
    }
}

impl QaOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the batch size; zero is clamped to one key per batch.
    #[must_use]
    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size.max(1);
        self
    }

    #[must_use]
    pub fn with_comment_policy(mut self, policy: CommentPolicy) -> Self {
        self.comment_policy = policy;
        self
    }
}
