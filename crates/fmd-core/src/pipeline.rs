//! The batch-sequential QA run.

use std::time::{Duration, Instant};

use serde::Serialize;
use thiserror::Error;
use tracing::{debug, info, info_span};

use fmd_model::{ColumnMap, QaError, QaOptions, Record, SourceRow, SourceTable};
use fmd_validate::{AnnotatedRecord, RuleEngine, RuleTally};

use crate::batch::BatchPlan;

/// Destination for annotated records, fed one batch at a time.
pub trait RecordSink {
    type Error: std::error::Error + Send + Sync + 'static;

    /// Called once before the first batch.
    fn begin(&mut self, columns: &ColumnMap) -> Result<(), Self::Error>;

    /// Receives each batch in plan order, rows in input order.
    fn write_batch(&mut self, records: &[AnnotatedRecord]) -> Result<(), Self::Error>;

    /// Called once after the last batch succeeded.
    fn finish(&mut self) -> Result<(), Self::Error>;
}

#[derive(Debug, Error)]
pub enum PipelineError<E>
where
    E: std::error::Error + 'static,
{
    #[error("batch {batch} failed")]
    Batch {
        batch: usize,
        #[source]
        source: QaError,
    },

    #[error(transparent)]
    Qa(#[from] QaError),

    #[error("writing results failed")]
    Sink(#[source] E),
}

/// Counts for a finished run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RunSummary {
    pub rows: usize,
    pub declarations: usize,
    pub batches: usize,
    pub batch_size: usize,
    /// The input already carried a QA comment column.
    pub seeded_comments: bool,
    pub tally: RuleTally,
    #[serde(skip)]
    pub elapsed: Duration,
}

/// Run every compiled-in rule over `table`.
pub fn run_batches<S: RecordSink>(
    table: SourceTable,
    options: &QaOptions,
    sink: &mut S,
) -> Result<RunSummary, PipelineError<S::Error>> {
    run_batches_with(&RuleEngine::default(), table, options, sink)
}

/// Run `engine` over `table`, one key-aligned batch at a time.
///
/// Each batch's rows are moved out of the table, evaluated, written and
/// dropped before the next batch starts. A batch that fails to evaluate is
/// never handed to the sink.
pub fn run_batches_with<S: RecordSink>(
    engine: &RuleEngine,
    table: SourceTable,
    options: &QaOptions,
    sink: &mut S,
) -> Result<RunSummary, PipelineError<S::Error>> {
    let started = Instant::now();
    let SourceTable { columns, rows } = table;

    engine.check_fields(&columns, 0)?;

    let plan = BatchPlan::new(&rows, options.batch_size);
    info!(
        rows = rows.len(),
        declarations = plan.key_count(),
        batches = plan.len(),
        batch_size = options.batch_size,
        "batch plan ready"
    );

    sink.begin(&columns).map_err(PipelineError::Sink)?;

    let mut summary = RunSummary {
        rows: rows.len(),
        declarations: plan.key_count(),
        batches: plan.len(),
        batch_size: options.batch_size,
        seeded_comments: columns.comment_index().is_some(),
        ..RunSummary::default()
    };

    let mut pending: Vec<Option<SourceRow>> = rows.into_iter().map(Some).collect();
    for window in plan.windows() {
        let span = info_span!(
            "batch",
            index = window.index,
            keys = window.keys.len(),
            rows = window.rows.len()
        );
        let _guard = span.enter();

        let records = window
            .rows
            .iter()
            .filter_map(|&idx| pending.get_mut(idx).and_then(Option::take))
            .map(|row| Record::from_row(row, &columns))
            .collect::<Result<Vec<_>, _>>()
            .map_err(|source| PipelineError::Batch {
                batch: window.index,
                source,
            })?;

        let outcome = engine
            .evaluate(records, &columns, options.comment_policy, window.index)
            .map_err(|source| PipelineError::Batch {
                batch: window.index,
                source,
            })?;

        sink.write_batch(&outcome.records)
            .map_err(PipelineError::Sink)?;
        summary.tally.merge(&outcome.tally);
        debug!(flagged = outcome.tally.records_flagged, "batch written");
    }

    sink.finish().map_err(PipelineError::Sink)?;
    summary.elapsed = started.elapsed();
    info!(
        rows = summary.rows,
        flagged = summary.tally.records_flagged,
        violations = summary.tally.total_violations(),
        elapsed_ms = summary.elapsed.as_millis() as u64,
        "qa run complete"
    );
    Ok(summary)
}

/// Sink that keeps every annotated record in memory.
#[derive(Debug, Default)]
pub struct MemorySink {
    pub headers: Vec<String>,
    pub records: Vec<AnnotatedRecord>,
    pub batches: usize,
    pub finished: bool,
}

impl RecordSink for MemorySink {
    type Error = std::convert::Infallible;

    fn begin(&mut self, columns: &ColumnMap) -> Result<(), Self::Error> {
        self.headers = columns.headers().to_vec();
        Ok(())
    }

    fn write_batch(&mut self, records: &[AnnotatedRecord]) -> Result<(), Self::Error> {
        self.records.extend_from_slice(records);
        self.batches += 1;
        Ok(())
    }

    fn finish(&mut self) -> Result<(), Self::Error> {
        self.finished = true;
        Ok(())
    }
}
