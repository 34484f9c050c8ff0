//! Batch scheduling and the run loop tying the loader's table to a sink.

pub mod batch;
pub mod pipeline;

pub use batch::{BatchPlan, BatchWindow};
pub use pipeline::{
    MemorySink, PipelineError, RecordSink, RunSummary, run_batches, run_batches_with,
};
