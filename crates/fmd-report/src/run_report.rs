//! Machine-readable summary of a QA run.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::info;

use fmd_core::RunSummary;
use fmd_model::{CommentPolicy, QaOptions};
use fmd_validate::{QaRule, RuleScope};

use crate::error::{ReportError, Result};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RuleCount {
    pub rule: &'static str,
    pub scope: RuleScope,
    pub phrase: &'static str,
    pub records: usize,
}

/// JSON run report.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunReport {
    pub tool_version: &'static str,
    pub input: PathBuf,
    pub input_sha256: String,
    pub output: PathBuf,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub elapsed_ms: u64,
    pub batch_size: usize,
    pub comment_policy: CommentPolicy,
    pub rows: usize,
    pub declarations: usize,
    pub batches: usize,
    pub seeded_comments: bool,
    pub records_flagged: usize,
    /// One entry per rule, in execution order, zero counts included.
    pub rules: Vec<RuleCount>,
}

/// Where and when a run happened; everything the summary does not carry.
#[derive(Debug, Clone)]
pub struct RunContext {
    pub input: PathBuf,
    pub input_sha256: String,
    pub output: PathBuf,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

impl RunReport {
    pub fn new(context: RunContext, options: &QaOptions, summary: &RunSummary) -> Self {
        let rules = QaRule::ALL
            .iter()
            .map(|rule| RuleCount {
                rule: rule.name(),
                scope: rule.scope(),
                phrase: rule.phrase(),
                records: summary.tally.count(*rule),
            })
            .collect();
        Self {
            tool_version: env!("CARGO_PKG_VERSION"),
            input: context.input,
            input_sha256: context.input_sha256,
            output: context.output,
            started_at: context.started_at,
            finished_at: context.finished_at,
            elapsed_ms: u64::try_from(summary.elapsed.as_millis()).unwrap_or(u64::MAX),
            batch_size: options.batch_size,
            comment_policy: options.comment_policy,
            rows: summary.rows,
            declarations: summary.declarations,
            batches: summary.batches,
            seeded_comments: summary.seeded_comments,
            records_flagged: summary.tally.records_flagged,
            rules,
        }
    }

    pub fn to_json(&self, path: &Path) -> Result<String> {
        serde_json::to_string_pretty(self).map_err(|source| ReportError::Json {
            path: path.to_path_buf(),
            source,
        })
    }
}

/// Write `report` as pretty JSON to `path`.
pub fn write_run_report(path: &Path, report: &RunReport) -> Result<()> {
    let json = report.to_json(path)?;
    fs::write(path, json).map_err(|source| ReportError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    info!(path = %path.display(), "run report written");
    Ok(())
}
