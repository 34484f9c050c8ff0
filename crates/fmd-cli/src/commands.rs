use anyhow::Result;
use comfy_table::Table;
use tracing::debug;

use fmd_cli::check::{CheckOutcome, CheckRequest, run_check};
use fmd_model::{CommentPolicy, QaOptions};
use fmd_validate::QaRule;

use crate::cli::CheckArgs;
use crate::summary::apply_table_style;

pub fn run_check_command(args: &CheckArgs) -> Result<CheckOutcome> {
    let comment_policy = if args.skip_existing_comments {
        CommentPolicy::SkipExisting
    } else {
        CommentPolicy::Append
    };
    let options = QaOptions::new()
        .with_batch_size(args.batch_size.get())
        .with_comment_policy(comment_policy);
    debug!(?options, "check options");

    run_check(&CheckRequest {
        input: args.input.clone(),
        output: args.output.clone(),
        report: args.report.clone(),
        options,
    })
}

pub fn run_rules() {
    let mut table = Table::new();
    table.set_header(vec!["#", "Rule", "Scope", "Comment phrase"]);
    apply_table_style(&mut table);
    for (position, rule) in QaRule::ALL.iter().enumerate() {
        table.add_row(vec![
            (position + 1).to_string(),
            rule.name().to_string(),
            rule.scope().to_string(),
            rule.phrase().to_string(),
        ]);
    }
    println!("{table}");
}
