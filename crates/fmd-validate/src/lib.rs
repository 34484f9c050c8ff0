//! Consistency checks for declaration batches.
//!
//! - [`aggregate`]: per-batch group tables keyed by declaration and material.
//! - [`rules`]: the compiled-in rules and their comment phrases.
//! - [`annotate`]: the comment accumulator.
//! - [`engine`]: runs the rules over a batch and collects violation counts.

pub mod aggregate;
pub mod annotate;
pub mod engine;
pub mod rules;

pub use aggregate::{BatchAggregates, GroupAggregator, material_key};
pub use annotate::{COMMENT_SEPARATOR, QaComment};
pub use engine::{AnnotatedRecord, BatchOutcome, DerivedValues, RuleEngine, RuleTally};
pub use rules::{QaRule, RuleScope};
