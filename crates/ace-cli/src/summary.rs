use comfy_table::modifiers::{UTF8_ROUND_CORNERS, UTF8_SOLID_INNER_BORDERS};
use comfy_table::presets::{UTF8_FULL, UTF8_FULL_CONDENSED};
use comfy_table::{Attribute, Cell, CellAlignment, Color, ContentArrangement, Table};

use ace_core::{Diagnostic, DiscoveryReport, KeyOutcome, TranslationReport};

use ace_cli::types::{InspectResult, TranslateResult};

pub fn print_summary(result: &TranslateResult) {
    println!("Input: {}", result.input.display());
    match &result.written {
        Some((path, format)) => println!("Output: {} ({format})", path.display()),
        None => println!("Output: none (dry run)"),
    }
    let links = result.report.links;
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Object"),
        header_cell("Count"),
        header_cell("Linked experiments"),
    ]);
    apply_summary_table_style(&mut table);
    align_column(&mut table, 1, CellAlignment::Right);
    align_column(&mut table, 2, CellAlignment::Right);
    table.add_row(vec![
        label_cell("Experiments"),
        Cell::new(result.experiments),
        dim_cell("-"),
    ]);
    table.add_row(vec![
        label_cell("Weather stations"),
        Cell::new(result.weathers),
        link_cell(links.weather, result.experiments),
    ]);
    table.add_row(vec![
        label_cell("Soil profiles"),
        Cell::new(result.soils),
        link_cell(links.soil, result.experiments),
    ]);
    println!("{table}");
    print_diagnostics(&result.report);
}

pub fn print_inspection(result: &InspectResult) {
    println!("Input: {}", result.input.display());
    print_key_table(&result.discovery);
    println!();
    println!("Sheet forest:");
    print!("{}", result.forest);
    print_diagnostics(&result.report);
}

fn print_key_table(discovery: &DiscoveryReport) {
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Sheet"),
        header_cell("Index"),
        header_cell("Key"),
        header_cell("Outcome"),
        header_cell("Root"),
    ]);
    apply_table_style(&mut table);
    align_column(&mut table, 1, CellAlignment::Right);
    for entry in &discovery.entries {
        let key = entry
            .defined_key
            .as_ref()
            .or(entry.index_key.as_ref())
            .map_or_else(|| "-".to_string(), ToString::to_string);
        table.add_row(vec![
            label_cell(&entry.sheet),
            Cell::new(entry.index_columns),
            Cell::new(key),
            outcome_cell(entry.outcome),
            entry
                .root_field
                .as_deref()
                .map_or_else(|| dim_cell("-"), |root| Cell::new(root).fg(Color::Green)),
        ]);
    }
    println!("{table}");
}

fn print_diagnostics(report: &TranslationReport) {
    if report.is_clean() {
        return;
    }
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Kind"),
        header_cell("Sheet"),
        header_cell("Detail"),
    ]);
    apply_table_style(&mut table);
    for diagnostic in &report.diagnostics {
        let (kind, sheet, detail) = describe(diagnostic);
        table.add_row(vec![kind, Cell::new(sheet), Cell::new(detail)]);
    }
    println!();
    println!("Diagnostics:");
    println!("{table}");
}

fn describe(diagnostic: &Diagnostic) -> (Cell, &str, String) {
    match diagnostic {
        Diagnostic::Orphan { sheet } => (
            warn_cell("ORPHAN"),
            sheet.as_str(),
            "not attached to any root".to_string(),
        ),
        Diagnostic::Untyped { sheet, resolution } => (
            warn_cell("UNTYPED"),
            sheet.as_str(),
            format!("domain path {resolution}"),
        ),
        Diagnostic::Misplaced { sheet, path } => (
            warn_cell("MISPLACED"),
            sheet.as_str(),
            format!("{path} has no place under its root"),
        ),
        Diagnostic::DuplicateKey { sheet, key } => (
            Cell::new("DUPLICATE")
                .fg(Color::Red)
                .add_attribute(Attribute::Bold),
            sheet.as_str(),
            format!("parent key {key} seen twice"),
        ),
        Diagnostic::UnmatchedRows { sheet, count } => (
            warn_cell("UNMATCHED"),
            sheet.as_str(),
            format!("{count} row(s) without a parent"),
        ),
        Diagnostic::Overwritten { sheet, count } => (
            warn_cell("OVERWRITTEN"),
            sheet.as_str(),
            format!("{count} row(s) replaced values of the same parent"),
        ),
    }
}

fn outcome_cell(outcome: KeyOutcome) -> Cell {
    let cell = Cell::new(outcome);
    match outcome {
        KeyOutcome::Defines | KeyOutcome::Promoted => cell.fg(Color::Green),
        KeyOutcome::AlreadyDefined => cell,
        KeyOutcome::Downgraded => cell.fg(Color::Yellow),
        KeyOutcome::NoKey => cell.fg(Color::DarkGrey),
    }
}

fn link_cell(linked: usize, experiments: usize) -> Cell {
    if experiments == 0 {
        return dim_cell("-");
    }
    let cell = Cell::new(format!("{linked}/{experiments}"));
    if linked < experiments {
        cell.fg(Color::Yellow)
    } else {
        cell.fg(Color::Green)
    }
}

fn apply_table_style(table: &mut Table) {
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
        .set_width(80);
}

fn align_column(table: &mut Table, index: usize, alignment: CellAlignment) {
    if let Some(column) = table.column_mut(index) {
        column.set_cell_alignment(alignment);
    }
}

fn header_cell(label: &str) -> Cell {
    Cell::new(label)
        .fg(Color::Cyan)
        .add_attribute(Attribute::Bold)
}

fn label_cell(label: &str) -> Cell {
    Cell::new(label)
        .fg(Color::Blue)
        .add_attribute(Attribute::Bold)
}

fn warn_cell(label: &str) -> Cell {
    Cell::new(label).fg(Color::Yellow)
}

fn dim_cell<T: ToString>(value: T) -> Cell {
    Cell::new(value).fg(Color::DarkGrey)
}
