//! Boundary validation: raw spreadsheet cells to typed [`ImportRow`]s.

use std::path::Path;

use silsilah_model::{
    Diagnostic, DiagnosticKind, Gender, ImportRow, MemberDetails, validate_generation,
};
use tracing::debug;

use crate::columns;
use crate::csv_table::{CsvTable, read_csv_table};
use crate::error::{IngestError, Result};

/// Typed rows ready for import, plus what was rejected or defaulted on the way.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedRows {
    pub rows: Vec<ImportRow>,
    /// Number of data rows that were not turned into an [`ImportRow`].
    pub rejected: usize,
    pub diagnostics: Vec<Diagnostic>,
}

impl ParsedRows {
    /// Data rows seen, accepted or not.
    pub fn total(&self) -> usize {
        self.rows.len() + self.rejected
    }
}

struct ColumnMap {
    name: usize,
    gender: Option<usize>,
    birth_date: Option<usize>,
    birth_place: Option<usize>,
    generation: Option<usize>,
    parent: Option<usize>,
    spouse: Option<usize>,
    job: Option<usize>,
    address: Option<usize>,
    phone: Option<usize>,
    education: Option<usize>,
    notes: Option<usize>,
}

impl ColumnMap {
    fn locate(table: &CsvTable, path: &Path) -> Result<Self> {
        let name = table
            .column_index(columns::NAME)
            .ok_or_else(|| IngestError::MissingColumn {
                column: columns::NAME.to_string(),
                path: path.to_path_buf(),
            })?;
        Ok(Self {
            name,
            gender: table.column_index(columns::GENDER),
            birth_date: table.column_index(columns::BIRTH_DATE),
            birth_place: table.column_index(columns::BIRTH_PLACE),
            generation: table.column_index(columns::GENERATION),
            parent: table.column_index(columns::PARENT),
            spouse: table.column_index(columns::SPOUSE),
            job: table.column_index(columns::JOB),
            address: table.column_index(columns::ADDRESS),
            phone: table.column_index(columns::PHONE),
            education: table.column_index(columns::EDUCATION),
            notes: table.column_index(columns::NOTES),
        })
    }
}

/// Reads and validates a member spreadsheet in one step.
pub fn read_import_rows(path: &Path) -> Result<ParsedRows> {
    let table = read_csv_table(path)?;
    parse_import_rows(&table, path)
}

/// Validates every data row of `table`.
///
/// Rows without a name are rejected. Unrecognized gender text falls back to
/// [`Gender::Male`] and an absent or invalid generation falls back to 1; both
/// fallbacks are reported when the cell had content. Only a missing name
/// column fails the whole table.
pub fn parse_import_rows(table: &CsvTable, path: &Path) -> Result<ParsedRows> {
    let map = ColumnMap::locate(table, path)?;
    let mut parsed = ParsedRows::default();

    for position in 0..table.rows.len() {
        let row_number = position + 2;
        let name = table.cell(position, Some(map.name)).trim();
        if name.is_empty() {
            parsed.rejected += 1;
            parsed.diagnostics.push(
                Diagnostic::error(
                    DiagnosticKind::RowRejected,
                    format!("row {row_number}: {} is required", columns::NAME),
                )
                .at_row(row_number),
            );
            continue;
        }

        let gender_text = table.cell(position, map.gender);
        let gender = match Gender::from_label(gender_text) {
            Some(gender) => gender,
            None => {
                if !gender_text.trim().is_empty() {
                    parsed.diagnostics.push(
                        Diagnostic::warning(
                            DiagnosticKind::UnknownGender,
                            format!(
                                "row {row_number}: unrecognized gender {gender_text:?}, using {}",
                                Gender::Male.label()
                            ),
                        )
                        .at_row(row_number),
                    );
                }
                Gender::Male
            }
        };

        let generation_text = table.cell(position, map.generation);
        let generation = match parse_generation(generation_text) {
            Some(generation) => generation,
            None => {
                if !generation_text.trim().is_empty() {
                    parsed.diagnostics.push(
                        Diagnostic::warning(
                            DiagnosticKind::InvalidGeneration,
                            format!(
                                "row {row_number}: invalid generation {generation_text:?}, using 1"
                            ),
                        )
                        .at_row(row_number),
                    );
                }
                1
            }
        };

        let optional = |column: Option<usize>| {
            let value = table.cell(position, column).trim();
            (!value.is_empty()).then(|| value.to_string())
        };

        let mut row = ImportRow::new(position, name, gender, generation)
            .with_parent(table.cell(position, map.parent).trim())
            .with_spouse(table.cell(position, map.spouse).trim());
        row.details = MemberDetails {
            birth_date: optional(map.birth_date),
            birth_place: optional(map.birth_place),
            job: optional(map.job),
            address: optional(map.address),
            phone: optional(map.phone),
            education: optional(map.education),
            notes: optional(map.notes),
            photo: None,
        };
        parsed.rows.push(row);
    }

    debug!(
        accepted = parsed.rows.len(),
        rejected = parsed.rejected,
        diagnostics = parsed.diagnostics.len(),
        "parsed import rows"
    );
    Ok(parsed)
}

/// Whole numbers ≥ 1, including spreadsheet renderings such as `"2.0"`.
fn parse_generation(text: &str) -> Option<u32> {
    let trimmed = text.trim();
    if let Ok(value) = trimmed.parse::<i64>() {
        return validate_generation(value).ok();
    }
    let value = trimmed.parse::<f64>().ok()?;
    if !value.is_finite() || value.fract() != 0.0 || value < 1.0 || value > f64::from(u32::MAX) {
        return None;
    }
    Some(value as u32)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generation_accepts_whole_numbers_only() {
        assert_eq!(parse_generation("2"), Some(2));
        assert_eq!(parse_generation(" 3.0 "), Some(3));
        assert_eq!(parse_generation("0"), None);
        assert_eq!(parse_generation("-1"), None);
        assert_eq!(parse_generation("2.5"), None);
        assert_eq!(parse_generation("dua"), None);
        assert_eq!(parse_generation(""), None);
    }
}
