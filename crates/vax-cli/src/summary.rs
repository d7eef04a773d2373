//! End-of-run summary tables.

use comfy_table::modifiers::UTF8_ROUND_CORNERS;
use comfy_table::presets::UTF8_FULL_CONDENSED;
use comfy_table::{Attribute, Cell, CellAlignment, Color, ContentArrangement, Table};

use vax_cli::types::{CycleResult, IngestReport};

pub fn apply_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL_CONDENSED)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic);
}

fn header_cell(text: &str) -> Cell {
    Cell::new(text).add_attribute(Attribute::Bold)
}

fn count_cell(count: usize, color: Color) -> Cell {
    let cell = Cell::new(count);
    if count > 0 {
        cell.fg(color)
    } else {
        cell
    }
}

pub fn print_summary(result: &CycleResult) {
    println!("Output: {}", result.output_dir.display());
    if result.dry_run {
        println!("Dry run: no files written");
    }

    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Location"),
        header_cell("Rows"),
        header_cell("Errors"),
        header_cell("Warnings"),
        header_cell("Status"),
    ]);
    apply_table_style(&mut table);
    for column in [1, 2, 3] {
        if let Some(column) = table.column_mut(column) {
            column.set_cell_alignment(CellAlignment::Right);
        }
    }
    for outcome in &result.published {
        table.add_row(vec![
            Cell::new(&outcome.location),
            Cell::new(outcome.rows),
            count_cell(outcome.errors, Color::Red),
            count_cell(outcome.warnings, Color::Yellow),
            Cell::new("published"),
        ]);
    }
    for outcome in &result.excluded {
        table.add_row(vec![
            Cell::new(&outcome.location),
            Cell::new(outcome.rows),
            count_cell(outcome.errors, Color::Red),
            count_cell(outcome.warnings, Color::Yellow),
            Cell::new("excluded").fg(Color::Red),
        ]);
    }
    println!("{table}");

    println!(
        "Published {} locations ({} excluded), {} aggregate regions, {} enriched rows",
        result.published.len(),
        result.excluded.len(),
        result.aggregates.len(),
        result.enriched_rows
    );
    for failure in &result.failed_regions {
        println!("Region skipped: {failure}");
    }
}

pub fn print_ingest_summary(report: &IngestReport) {
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Location"),
        header_cell("Appended"),
        header_cell("Overwritten"),
        header_cell("Discarded"),
    ]);
    apply_table_style(&mut table);
    for (location, counters) in &report.locations {
        table.add_row(vec![
            Cell::new(location),
            Cell::new(counters.appended),
            Cell::new(counters.overwritten),
            Cell::new(counters.discarded),
        ]);
    }
    println!("{table}");
}
