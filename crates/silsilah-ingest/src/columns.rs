//! Spreadsheet column names shared by import, export and the template.

pub const NUMBER: &str = "No";
pub const NAME: &str = "Nama Lengkap";
pub const GENDER: &str = "Jenis Kelamin";
pub const BIRTH_DATE: &str = "Tanggal Lahir";
pub const BIRTH_PLACE: &str = "Tempat Lahir";
pub const GENERATION: &str = "Generasi";
pub const PARENT: &str = "Nama Orangtua";
pub const SPOUSE: &str = "Nama Pasangan";
pub const JOB: &str = "Pekerjaan";
pub const ADDRESS: &str = "Alamat";
pub const PHONE: &str = "No. Telepon";
pub const EDUCATION: &str = "Pendidikan";
pub const NOTES: &str = "Catatan";

/// Columns read by the import, in template order.
pub const IMPORT_COLUMNS: [&str; 12] = [
    NAME,
    GENDER,
    BIRTH_DATE,
    BIRTH_PLACE,
    GENERATION,
    PARENT,
    SPOUSE,
    JOB,
    ADDRESS,
    PHONE,
    EDUCATION,
    NOTES,
];

/// Columns written by the export and the template.
pub const EXPORT_COLUMNS: [&str; 13] = [
    NUMBER,
    NAME,
    GENDER,
    BIRTH_DATE,
    BIRTH_PLACE,
    GENERATION,
    PARENT,
    SPOUSE,
    JOB,
    ADDRESS,
    PHONE,
    EDUCATION,
    NOTES,
];
