use comfy_table::modifiers::{UTF8_ROUND_CORNERS, UTF8_SOLID_INNER_BORDERS};
use comfy_table::presets::UTF8_FULL;
use comfy_table::{
    Attribute, Cell, CellAlignment, Color, ColumnConstraint, ContentArrangement, Table, Width,
};
use tea_validate::{Difference, Severity, ValidationReport};

pub fn print_report(report: &ValidationReport) {
    if report.is_empty() {
        println!("No contract issues found.");
        return;
    }
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Severity"),
        header_cell("Code"),
        header_cell("Category"),
        header_cell("Location"),
        header_cell("Message"),
    ]);
    apply_issue_table_style(&mut table);
    align_column(&mut table, 0, CellAlignment::Center);
    align_column(&mut table, 1, CellAlignment::Center);
    for issue in report.sorted_by_severity() {
        let location = issue.location();
        table.add_row(vec![
            severity_cell(issue.severity()),
            Cell::new(issue.code()).add_attribute(Attribute::Bold),
            Cell::new(issue.category().label()),
            if location.is_empty() {
                dim_cell("-")
            } else {
                Cell::new(location)
            },
            Cell::new(issue.message()),
        ]);
    }
    println!("{table}");
    println!(
        "{} issue(s): {} error(s), {} warning(s)",
        report.len(),
        report.error_count(),
        report.warning_count()
    );
}

pub fn print_differences(differences: &[Difference]) {
    if differences.is_empty() {
        println!("Responses match.");
        return;
    }
    let mut table = Table::new();
    table.set_header(vec![header_cell("#"), header_cell("Difference")]);
    apply_issue_table_style(&mut table);
    align_column(&mut table, 0, CellAlignment::Right);
    for (index, difference) in differences.iter().enumerate() {
        table.add_row(vec![
            dim_cell(index + 1),
            Cell::new(difference.to_string()),
        ]);
    }
    println!("{table}");
    println!("{} difference(s)", differences.len());
}

fn apply_issue_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .apply_modifier(UTF8_SOLID_INNER_BORDERS)
        .set_content_arrangement(ContentArrangement::DynamicFullWidth)
        .set_width(160);
    if table.column_count() >= 5 {
        table.set_constraints(vec![
            ColumnConstraint::UpperBoundary(Width::Fixed(9)),
            ColumnConstraint::UpperBoundary(Width::Fixed(6)),
            ColumnConstraint::UpperBoundary(Width::Fixed(12)),
            ColumnConstraint::UpperBoundary(Width::Percentage(30)),
            ColumnConstraint::LowerBoundary(Width::Percentage(40)),
        ]);
    }
}

fn align_column(table: &mut Table, index: usize, alignment: CellAlignment) {
    if let Some(column) = table.column_mut(index) {
        column.set_cell_alignment(alignment);
    }
}

fn severity_cell(severity: Severity) -> Cell {
    match severity {
        Severity::Error => Cell::new("ERROR")
            .fg(Color::Red)
            .add_attribute(Attribute::Bold),
        Severity::Warning => Cell::new("WARN").fg(Color::Yellow),
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
