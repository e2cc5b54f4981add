//! The blank import template with example rows.

use crate::export::ExportRow;

const FAMILY_ADDRESS: &str = "Jl. Keluarga No. 1, Jakarta";

/// Example rows showing a root couple and one child with a spouse reference.
///
/// Only one partner of a couple needs the spouse column filled in.
pub fn template_rows() -> Vec<ExportRow> {
    vec![
        ExportRow {
            number: 1,
            name: "Mucksin".to_string(),
            gender: "Laki-laki".to_string(),
            birth_date: "1950-01-15".to_string(),
            birth_place: "Jakarta".to_string(),
            generation: 1,
            parent_name: String::new(),
            spouse_name: "Supiyah".to_string(),
            job: "Pensiunan".to_string(),
            address: FAMILY_ADDRESS.to_string(),
            phone: "08123456789".to_string(),
            education: "S1".to_string(),
            notes: "Kepala keluarga".to_string(),
        },
        ExportRow {
            number: 2,
            name: "Supiyah".to_string(),
            gender: "Perempuan".to_string(),
            birth_date: "1955-03-20".to_string(),
            birth_place: "Surabaya".to_string(),
            generation: 1,
            parent_name: String::new(),
            spouse_name: String::new(),
            job: "Ibu Rumah Tangga".to_string(),
            address: FAMILY_ADDRESS.to_string(),
            phone: "08123456790".to_string(),
            education: "SMA".to_string(),
            notes: "Istri Kepala Keluarga".to_string(),
        },
        ExportRow {
            number: 3,
            name: "Ahmad Susanto".to_string(),
            gender: "Laki-laki".to_string(),
            birth_date: "1975-06-10".to_string(),
            birth_place: "Jakarta".to_string(),
            generation: 2,
            parent_name: "Mucksin".to_string(),
            spouse_name: "Dewi Rahayu".to_string(),
            job: "Wiraswasta".to_string(),
            address: "Jl. Merdeka No. 5, Bandung".to_string(),
            phone: "08123456791".to_string(),
            education: "S2".to_string(),
            notes: "Anak pertama".to_string(),
        },
    ]
}
