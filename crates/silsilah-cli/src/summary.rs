use comfy_table::modifiers::{UTF8_ROUND_CORNERS, UTF8_SOLID_INNER_BORDERS};
use comfy_table::presets::{UTF8_FULL, UTF8_FULL_CONDENSED};
use comfy_table::{Attribute, Cell, CellAlignment, Color, ContentArrangement, Table};

use silsilah_core::{FamilyStats, ImportReport, IntegrityIssue};
use silsilah_model::{Diagnostic, Member, Severity};

use crate::commands::MemberListing;

pub fn print_import_report(report: &ImportReport) {
    println!("Source: {}", display_or_dash(&report.source_id));
    println!("Mode: {:?}", report.mode);

    let counts = report.diagnostic_counts();
    let mut table = Table::new();
    table.set_header(vec![header_cell("Rows"), header_cell("Count")]);
    apply_summary_table_style(&mut table);
    align_column(&mut table, 1, CellAlignment::Right);
    table.add_row(vec![Cell::new("Total"), Cell::new(report.total_rows)]);
    table.add_row(vec![Cell::new("Inserted"), count_cell(report.inserted, Color::Green)]);
    table.add_row(vec![Cell::new("Existing"), count_cell(report.existing, Color::Blue)]);
    table.add_row(vec![Cell::new("Rejected"), count_cell(report.rejected, Color::Yellow)]);
    table.add_row(vec![Cell::new("Failed"), count_cell(report.failed.len(), Color::Red)]);
    table.add_row(vec![
        Cell::new("Spouse linked"),
        count_cell(report.spouse_linked, Color::Green),
    ]);
    table.add_row(vec![
        Cell::new("Parent linked"),
        count_cell(report.parent_linked, Color::Green),
    ]);
    table.add_row(vec![
        Cell::new("Warnings").add_attribute(Attribute::Bold),
        count_cell(counts.warnings, Color::Yellow).add_attribute(Attribute::Bold),
    ]);
    table.add_row(vec![
        Cell::new("Errors").add_attribute(Attribute::Bold),
        count_cell(counts.errors, Color::Red).add_attribute(Attribute::Bold),
    ]);
    println!("{table}");

    print_diagnostics(&report.diagnostics);
    if !report.fuzzy_matches.is_empty() {
        let mut table = Table::new();
        table.set_header(vec![
            header_cell("Row"),
            header_cell("Field"),
            header_cell("Written"),
            header_cell("Matched"),
            header_cell("Similarity"),
        ]);
        apply_table_style(&mut table);
        align_column(&mut table, 0, CellAlignment::Right);
        align_column(&mut table, 4, CellAlignment::Right);
        for fuzzy in &report.fuzzy_matches {
            table.add_row(vec![
                Cell::new(fuzzy.row),
                Cell::new(fuzzy.field),
                Cell::new(&fuzzy.raw),
                Cell::new(&fuzzy.matched_name),
                Cell::new(format!("{:.2}", fuzzy.similarity)).fg(Color::Yellow),
            ]);
        }
        println!();
        println!("Review (matched by partial name):");
        println!("{table}");
    }
    if report.has_failures() {
        eprintln!("Failed rows:");
        for failed in &report.failed {
            eprintln!("- row {} ({}): {}", failed.row, failed.name, failed.error);
        }
    }
}

fn print_diagnostics(diagnostics: &[Diagnostic]) {
    let mut shown: Vec<&Diagnostic> = diagnostics
        .iter()
        .filter(|diagnostic| diagnostic.severity > Severity::Info)
        .collect();
    if shown.is_empty() {
        return;
    }
    shown.sort_by(|a, b| b.severity.cmp(&a.severity).then(a.row.cmp(&b.row)));
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Row"),
        header_cell("Severity"),
        header_cell("Kind"),
        header_cell("Message"),
    ]);
    apply_issue_table_style(&mut table);
    align_column(&mut table, 0, CellAlignment::Right);
    align_column(&mut table, 1, CellAlignment::Center);
    for diagnostic in shown {
        table.add_row(vec![
            diagnostic.row.map_or_else(|| dim_cell("-"), Cell::new),
            severity_cell(diagnostic.severity),
            Cell::new(format!("{:?}", diagnostic.kind)),
            Cell::new(&diagnostic.message),
        ]);
    }
    println!();
    println!("Diagnostics:");
    println!("{table}");
}

pub fn print_members(listing: &MemberListing) {
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Id"),
        header_cell("Name"),
        header_cell("Gender"),
        header_cell("Gen"),
        header_cell("Parent"),
        header_cell("Spouse"),
    ]);
    apply_table_style(&mut table);
    align_column(&mut table, 2, CellAlignment::Center);
    align_column(&mut table, 3, CellAlignment::Right);
    for member in &listing.members {
        let name = if member.is_active {
            Cell::new(&member.name)
        } else {
            dim_cell(format!("{} (inactive)", member.name))
        };
        table.add_row(vec![
            dim_cell(&member.id),
            name,
            Cell::new(member.gender.code()),
            Cell::new(member.generation),
            optional_cell(listing.name_of(member.parent_id.as_ref())),
            optional_cell(listing.name_of(member.spouse_id.as_ref())),
        ]);
    }
    println!("{table}");
    println!("{} member(s)", listing.members.len());
}

pub fn print_member(member: &Member) {
    println!("{} {}", member.id, member.name);
}

pub fn print_stats(stats: &FamilyStats) {
    let mut table = Table::new();
    table.set_header(vec![header_cell("Generation"), header_cell("Members")]);
    apply_summary_table_style(&mut table);
    align_column(&mut table, 0, CellAlignment::Right);
    align_column(&mut table, 1, CellAlignment::Right);
    for row in &stats.per_generation {
        table.add_row(vec![Cell::new(row.generation), Cell::new(row.members)]);
    }
    table.add_row(vec![
        Cell::new("TOTAL")
            .fg(Color::Cyan)
            .add_attribute(Attribute::Bold),
        Cell::new(stats.total).add_attribute(Attribute::Bold),
    ]);
    println!("{table}");
    println!(
        "{} generation(s), {} male, {} female",
        stats.generations, stats.male, stats.female
    );
}

pub fn print_issues(issues: &[IntegrityIssue]) {
    if issues.is_empty() {
        println!("No issues found.");
        return;
    }
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Member"),
        header_cell("Issue"),
        header_cell("Message"),
    ]);
    apply_issue_table_style(&mut table);
    for issue in issues {
        table.add_row(vec![
            Cell::new(&issue.member_id),
            Cell::new(issue.kind).fg(Color::Red),
            Cell::new(&issue.message),
        ]);
    }
    println!("{table}");
    eprintln!("{} issue(s) found", issues.len());
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
        .set_width(60);
}

fn apply_issue_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .apply_modifier(UTF8_SOLID_INNER_BORDERS)
        .set_content_arrangement(ContentArrangement::DynamicFullWidth)
        .set_width(160);
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
        Severity::Info => dim_cell("INFO"),
    }
}

fn count_cell(count: usize, color: Color) -> Cell {
    if count > 0 {
        Cell::new(count).fg(color)
    } else {
        dim_cell(count)
    }
}

fn optional_cell(value: Option<&str>) -> Cell {
    match value {
        Some(value) => Cell::new(value),
        None => dim_cell("-"),
    }
}

fn display_or_dash(value: &str) -> &str {
    if value.is_empty() { "-" } else { value }
}

fn header_cell(label: &str) -> Cell {
    Cell::new(label)
        .fg(Color::Cyan)
        .add_attribute(Attribute::Bold)
}

fn dim_cell<T: ToString>(value: T) -> Cell {
    Cell::new(value).fg(Color::DarkGrey)
}
