//! CLI library components for the FMD QA checker.

pub mod check;
pub mod logging;
