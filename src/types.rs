use serde::Serialize;
use std::path::PathBuf;
use tabled::Tabled;

/// Headers every ATM source sheet must carry, in `RawAtmRow` field order.
pub const ATM_COLUMNS: [&str; 10] = [
    "Bank_Code",
    "ATM_ID",
    "Street_ATM_Address",
    "Longitude",
    "Latitude",
    "Tehsil",
    "City",
    "District",
    "Province",
    "ATM_Status",
];

/// Where a raw row came from, so data-quality errors can point at it.
#[derive(Debug, Clone, PartialEq)]
pub struct RowOrigin {
    pub file: PathBuf,
    /// 1-based data row, header excluded.
    pub row: usize,
}

/// One ATM row as read from a source file. Absent cells are `""`.
#[derive(Debug, Clone, PartialEq)]
pub struct RawAtmRow {
    pub bank_code: String,
    pub atm_id: String,
    pub street_address: String,
    pub longitude: String,
    pub latitude: String,
    pub tehsil: String,
    pub city: String,
    pub district: String,
    pub province: String,
    pub status: String,
    pub origin: RowOrigin,
}

impl RawAtmRow {
    /// Build a row from cells laid out in `ATM_COLUMNS` order.
    pub fn from_cells(mut cells: Vec<String>, origin: RowOrigin) -> Self {
        cells.resize(ATM_COLUMNS.len(), String::new());
        let mut it = cells.into_iter();
        let mut next = || it.next().unwrap_or_default();
        RawAtmRow {
            bank_code: next(),
            atm_id: next(),
            street_address: next(),
            longitude: next(),
            latitude: next(),
            tehsil: next(),
            city: next(),
            district: next(),
            province: next(),
            status: next(),
            origin,
        }
    }
}

/// A cleaned, enriched ATM record. Built once, never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AtmRecord {
    pub bank_code: Option<i64>,
    /// Bank display name, or the raw code text when the directory has no entry.
    pub participant_name: String,
    pub atm_id: String,
    pub street_address: String,
    pub longitude: f64,
    pub latitude: f64,
    pub tehsil: String,
    pub city: String,
    pub district: String,
    pub province: String,
    pub status: String,
    pub valid: bool,
}

/// Administrative level a grouped count is keyed on (besides participant).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum GroupLevel {
    Participant,
    District,
    City,
    Tehsil,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GroupedCount {
    pub participant: String,
    /// District, city or tehsil name; `None` at participant level.
    pub detail: Option<String>,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ParticipantRatio {
    pub participant: String,
    pub atm_count: usize,
    pub population_per_atm: f64,
}

/// Console summary row printed at startup.
#[derive(Debug, Serialize, Tabled, Clone)]
pub struct ParticipantSummaryRow {
    #[tabled(rename = "Participant")]
    pub participant: String,
    #[tabled(rename = "ATMs")]
    pub atms: String,
    #[tabled(rename = "Valid")]
    pub valid: String,
    #[tabled(rename = "Invalid")]
    pub invalid: String,
}
