use std::time::Duration;

use comfy_table::modifiers::{UTF8_ROUND_CORNERS, UTF8_SOLID_INNER_BORDERS};
use comfy_table::presets::{UTF8_FULL, UTF8_FULL_CONDENSED};
use comfy_table::{Attribute, Cell, CellAlignment, Color, ContentArrangement, Table};

use fmd_cli::check::CheckOutcome;
use fmd_validate::QaRule;

pub fn print_summary(outcome: &CheckOutcome) {
    let summary = &outcome.summary;
    println!("Input: {}", outcome.input.display());
    println!("Output: {}", outcome.output.display());
    if let Some(path) = &outcome.report {
        println!("Run report: {}", path.display());
    }
    println!(
        "Rows: {}  Declarations: {}  Batches: {}  Elapsed: {}",
        summary.rows,
        summary.declarations,
        summary.batches,
        format_elapsed(summary.elapsed)
    );

    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Rule"),
        header_cell("Scope"),
        header_cell("Comment phrase"),
        header_cell("Records"),
    ]);
    apply_summary_table_style(&mut table);
    align_column(&mut table, 3, CellAlignment::Right);
    for rule in QaRule::ALL {
        table.add_row(vec![
            Cell::new(rule.name()),
            dim_cell(rule.scope()),
            Cell::new(rule.phrase()),
            count_cell(summary.tally.count(rule)),
        ]);
    }
    table.add_row(vec![
        Cell::new("TOTAL")
            .fg(Color::Cyan)
            .add_attribute(Attribute::Bold),
        dim_cell("-"),
        Cell::new(format!("{} of {} records flagged", summary.tally.records_flagged, summary.rows))
            .fg(Color::Cyan)
            .add_attribute(Attribute::Bold),
        count_cell(summary.tally.total_violations()).add_attribute(Attribute::Bold),
    ]);
    println!("{table}");
}

/// `mm:ss`, minutes uncapped.
pub fn format_elapsed(elapsed: Duration) -> String {
    let seconds = elapsed.as_secs();
    format!("{:02}:{:02}", seconds / 60, seconds % 60)
}

pub fn apply_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL_CONDENSED)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_width(120);
}

fn apply_summary_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .apply_modifier(UTF8_SOLID_INNER_BORDERS)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_width(140);
}

fn align_column(table: &mut Table, index: usize, alignment: CellAlignment) {
    if let Some(column) = table.column_mut(index) {
        column.set_cell_alignment(alignment);
    }
}

fn count_cell(count: usize) -> Cell {
    if count > 0 {
        Cell::new(count)
            .fg(Color::Yellow)
            .add_attribute(Attribute::Bold)
    } else {
        dim_cell(count)
    }
}

fn header_cell(label: &str) -> Cell {
    Cell::new(label)
        .fg(Color::Cyan)
        .add_attribute(Attribute::Bold)
}

fn dim_cell<T: ToString>(value: T) -> Cell {
    Cell::new(value).fg(Color::DarkGrey)
}
