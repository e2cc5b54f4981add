//! Denormalized member rows for spreadsheet export.

use std::collections::HashMap;
use std::fs::File;
use std::io::Write;
use std::path::Path;

use serde::{Deserialize, Serialize};
use silsilah_model::{Member, MemberId};

use crate::error::{IngestError, Result};

/// One exported spreadsheet line. Relationships are rendered as display names.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportRow {
    #[serde(rename = "No")]
    pub number: usize,
    #[serde(rename = "Nama Lengkap")]
    pub name: String,
    #[serde(rename = "Jenis Kelamin")]
    pub gender: String,
    #[serde(rename = "Tanggal Lahir")]
    pub birth_date: String,
    #[serde(rename = "Tempat Lahir")]
    pub birth_place: String,
    #[serde(rename = "Generasi")]
    pub generation: u32,
    #[serde(rename = "Nama Orangtua")]
    pub parent_name: String,
    #[serde(rename = "Nama Pasangan")]
    pub spouse_name: String,
    #[serde(rename = "Pekerjaan")]
    pub job: String,
    #[serde(rename = "Alamat")]
    pub address: String,
    #[serde(rename = "No. Telepon")]
    pub phone: String,
    #[serde(rename = "Pendidikan")]
    pub education: String,
    #[serde(rename = "Catatan")]
    pub notes: String,
}

/// Builds export rows in `(generation, name)` order with a running number.
///
/// Links to members outside `members` render as empty cells.
pub fn export_rows(members: &[Member]) -> Vec<ExportRow> {
    let names: HashMap<&MemberId, &str> = members
        .iter()
        .map(|member| (&member.id, member.name.as_str()))
        .collect();
    let display = |id: Option<&MemberId>| {
        id.and_then(|id| names.get(id))
            .map_or_else(String::new, |name| (*name).to_string())
    };
    let text = |value: &Option<String>| value.clone().unwrap_or_default();

    let mut ordered: Vec<&Member> = members.iter().collect();
    ordered.sort_by(|a, b| a.listing_key().cmp(&b.listing_key()));
    ordered
        .into_iter()
        .enumerate()
        .map(|(index, member)| ExportRow {
            number: index + 1,
            name: member.name.clone(),
            gender: member.gender.label().to_string(),
            birth_date: text(&member.details.birth_date),
            birth_place: text(&member.details.birth_place),
            generation: member.generation,
            parent_name: display(member.parent_id.as_ref()),
            spouse_name: display(member.spouse_id.as_ref()),
            job: text(&member.details.job),
            address: text(&member.details.address),
            phone: text(&member.details.phone),
            education: text(&member.details.education),
            notes: text(&member.details.notes),
        })
        .collect()
}

/// Writes rows as CSV with the spreadsheet column headers.
pub fn write_rows<W: Write>(output: W, rows: &[ExportRow], path: &Path) -> Result<()> {
    let mut writer = csv::Writer::from_writer(output);
    for row in rows {
        writer
            .serialize(row)
            .map_err(|source| IngestError::CsvWrite {
                path: path.to_path_buf(),
                source,
            })?;
    }
    writer.flush().map_err(|source| IngestError::FileWrite {
        path: path.to_path_buf(),
        source,
    })
}

/// Writes rows to a CSV file, replacing any existing file.
pub fn write_rows_to_path(path: &Path, rows: &[ExportRow]) -> Result<()> {
    let file = File::create(path).map_err(|source| IngestError::FileWrite {
        path: path.to_path_buf(),
        source,
    })?;
    write_rows(file, rows, path)
}
