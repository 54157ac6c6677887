//! One-time enrichment of raw ATM rows into [`AtmRecord`]s.
//!
//! Order per record: province alias lookup, coordinate coercion, boundary
//! test, bank-code substitution, then uppercasing. The alias and directory
//! lookups are case-sensitive, so they must run before uppercasing.

use crate::boundary::CountryBoundary;
use crate::error::{DashboardError, Result};
use crate::types::{AtmRecord, RawAtmRow};
use crate::util::{format_int, parse_i64_safe};
use once_cell::sync::Lazy;
use std::collections::{BTreeSet, HashMap};
use tracing::{info, warn};

/// Known raw province spellings and their canonical names.
static PROVINCES: Lazy<HashMap<&'static str, &'static str>> = Lazy::new(|| {
    HashMap::from([
        ("FATA", "FATA"),
        ("Sindh", "Sindh"),
        ("SINDH", "Sindh"),
        ("Punjab", "Punjab"),
        ("PUNJAB", "Punjab"),
        ("punjab", "Punjab"),
        ("AJK", "Azad Kashmir"),
        ("Ajk", "Azad Kashmir"),
        ("Azad Kashmir", "Azad Kashmir"),
        ("Azad Kashmir ", "Azad Kashmir"),
        ("KPK", "Khyber Pakhtunkhwa"),
        ("Kpk", "Khyber Pakhtunkhwa"),
        ("Khyber Pakhtunkhwa", "Khyber Pakhtunkhwa"),
        ("Balochistan", "Balochistan"),
        ("Baluchistan", "Balochistan"),
        ("Gilgit Baltistan", "Gilgit Baltistan"),
        ("Gilgit-Baltistan", "Gilgit Baltistan"),
        ("Gilgit-Bultistan", "Gilgit Baltistan"),
        ("Islamabad", "Federal Capital Territory"),
        ("Federal Capital Territory", "Federal Capital Territory"),
        ("Federal Capital", "Federal Capital Territory"),
        ("FEDERAL CAPITAL", "Federal Capital Territory"),
    ])
});

/// Canonical province name for a raw spelling. Unknown spellings become `""`.
pub fn canonical_province(raw: &str) -> &'static str {
    PROVINCES.get(raw).copied().unwrap_or("")
}

/// Every canonical province name, sorted.
pub fn canonical_provinces() -> BTreeSet<&'static str> {
    PROVINCES.values().copied().collect()
}

/// Bank code to display name. Codes are unique keys.
#[derive(Debug, Clone, Default)]
pub struct BankDirectory {
    names: HashMap<i64, String>,
}

impl BankDirectory {
    /// Later entries for the same code replace earlier ones.
    pub fn from_entries(entries: impl IntoIterator<Item = (i64, String)>) -> Self {
        BankDirectory {
            names: entries.into_iter().collect(),
        }
    }

    pub fn name(&self, code: i64) -> Option<&str> {
        self.names.get(&code).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

/// Turn raw rows into enriched records.
///
/// Fails on the first row whose longitude or latitude is not a number.
pub fn enrich(
    rows: Vec<RawAtmRow>,
    banks: &BankDirectory,
    boundary: &CountryBoundary,
) -> Result<Vec<AtmRecord>> {
    let mut records = Vec::with_capacity(rows.len());
    let mut unknown_provinces = 0usize;
    let mut unmapped_codes: BTreeSet<String> = BTreeSet::new();

    for row in rows {
        let province = canonical_province(&row.province);
        if province.is_empty() && !row.province.is_empty() {
            unknown_provinces += 1;
        }

        let longitude = coordinate(&row, "Longitude", &row.longitude)?;
        let latitude = coordinate(&row, "Latitude", &row.latitude)?;
        let valid = boundary.contains(longitude, latitude);

        let bank_code = parse_i64_safe(Some(&row.bank_code));
        // Unmapped codes keep their raw text as the participant.
        let participant = match bank_code.and_then(|c| banks.name(c)) {
            Some(name) => name.to_string(),
            None => {
                unmapped_codes.insert(row.bank_code.clone());
                row.bank_code.clone()
            }
        };

        records.push(AtmRecord {
            bank_code,
            participant_name: participant.to_uppercase(),
            atm_id: row.atm_id.to_uppercase(),
            street_address: row.street_address.to_uppercase(),
            longitude,
            latitude,
            tehsil: row.tehsil.to_uppercase(),
            city: row.city.to_uppercase(),
            district: row.district.to_uppercase(),
            province: province.to_uppercase(),
            status: row.status.to_uppercase(),
            valid,
        });
    }

    if unknown_provinces > 0 {
        warn!(
            rows = %format_int(unknown_provinces),
            "unrecognised province spellings cleared to empty"
        );
    }
    if !unmapped_codes.is_empty() {
        warn!(
            codes = ?unmapped_codes,
            "bank codes missing from the directory kept as raw participant text"
        );
    }
    let invalid = records.iter().filter(|r| !r.valid).count();
    info!(
        records = %format_int(records.len()),
        outside_boundary = %format_int(invalid),
        "records enriched"
    );
    Ok(records)
}

/// Strict: no thousands-separator stripping, no NaN/inf, no blank-as-zero.
fn coordinate(row: &RawAtmRow, field: &'static str, value: &str) -> Result<f64> {
    value
        .trim()
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .ok_or_else(|| DashboardError::MalformedCoordinate {
            file: row.origin.file.clone(),
            row: row.origin.row,
            field,
            value: value.to_string(),
        })
}
