//! The `check` run: load, evaluate in batches, write outputs.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::Utc;
use tracing::{info, info_span, warn};

use fmd_core::{RunSummary, run_batches};
use fmd_ingest::load_declarations;
use fmd_model::QaOptions;
use fmd_report::{CsvSink, RunContext, RunReport, compute_file_sha256, write_run_report};

/// Suffix appended to the input stem for the default output name.
pub const OUTPUT_SUFFIX: &str = "_checked";

#[derive(Debug, Clone)]
pub struct CheckRequest {
    pub input: PathBuf,
    pub output: Option<PathBuf>,
    pub report: Option<PathBuf>,
    pub options: QaOptions,
}

#[derive(Debug, Clone)]
pub struct CheckOutcome {
    pub input: PathBuf,
    pub output: PathBuf,
    pub report: Option<PathBuf>,
    pub summary: RunSummary,
}

/// `<dir>/<stem>_checked.csv` next to the input.
pub fn default_output_path(input: &Path) -> PathBuf {
    let stem = input
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_else(|| "fmd".to_string());
    input.with_file_name(format!("{stem}{OUTPUT_SUFFIX}.csv"))
}

pub fn run_check(request: &CheckRequest) -> Result<CheckOutcome> {
    let input = &request.input;
    let run_span = info_span!("run", input = %input.display());
    let _run_guard = run_span.enter();
    let started_at = Utc::now();

    let output = request
        .output
        .clone()
        .unwrap_or_else(|| default_output_path(input));

    let table = load_declarations(input).with_context(|| format!("load {}", input.display()))?;
    let input_sha256 = match &request.report {
        Some(_) => Some(
            compute_file_sha256(input)
                .with_context(|| format!("fingerprint {}", input.display()))?,
        ),
        None => None,
    };

    let mut sink = CsvSink::new(&output);
    let summary = run_batches(table, &request.options, &mut sink)
        .with_context(|| format!("check {}", input.display()))?;

    if let (Some(report_path), Some(input_sha256)) = (&request.report, input_sha256) {
        let context = RunContext {
            input: input.clone(),
            input_sha256,
            output: output.clone(),
            started_at,
            finished_at: Utc::now(),
        };
        let report = RunReport::new(context, &request.options, &summary);
        if let Err(error) = write_run_report(report_path, &report) {
            discard_output(&output);
            return Err(error).with_context(|| format!("write report {}", report_path.display()));
        }
    }

    info!(
        output = %output.display(),
        flagged = summary.tally.records_flagged,
        "check finished"
    );
    Ok(CheckOutcome {
        input: input.clone(),
        output,
        report: request.report.clone(),
        summary,
    })
}

/// Remove the output of a run that failed after its sink finished.
fn discard_output(output: &Path) {
    if let Err(error) = fs::remove_file(output) {
        warn!(path = %output.display(), %error, "could not remove output of failed run");
    }
}
