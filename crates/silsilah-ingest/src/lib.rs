#![deny(unsafe_code)]

//! Member spreadsheets: reading import sheets into typed rows, writing
//! denormalized exports and the example template.

pub mod columns;
pub mod csv_table;
pub mod error;
pub mod export;
pub mod rows;
pub mod template;

pub use csv_table::{CsvTable, parse_csv_table, read_csv_table};
pub use error::{IngestError, Result};
pub use export::{ExportRow, export_rows, write_rows, write_rows_to_path};
pub use rows::{ParsedRows, parse_import_rows, read_import_rows};
pub use template::template_rows;
