//! Province → district → city → tehsil selection and the dependent option sets.

use crate::types::AtmRecord;
use serde::{Serialize, Serializer};
use std::collections::BTreeSet;

/// Sentinel shown when a level is unconstrained.
pub const ALL: &str = "All";

/// One dropdown value: unconstrained, or a concrete (uppercased) name.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Selection {
    #[default]
    All,
    Value(String),
}

impl Selection {
    /// `None`, blank and `"All"` (any case, surrounding spaces ignored) are
    /// unconstrained. Values are uppercased to line up with the enriched
    /// records but keep their padding, since record fields keep theirs.
    pub fn parse(raw: Option<&str>) -> Self {
        match raw {
            None => Selection::All,
            Some(s) if s.trim().is_empty() || s.trim().eq_ignore_ascii_case(ALL) => Selection::All,
            Some(s) => Selection::Value(s.to_uppercase()),
        }
    }

    pub fn is_all(&self) -> bool {
        matches!(self, Selection::All)
    }

    pub fn value(&self) -> Option<&str> {
        match self {
            Selection::All => None,
            Selection::Value(v) => Some(v),
        }
    }

    pub fn matches(&self, field: &str) -> bool {
        match self {
            Selection::All => true,
            Selection::Value(v) => v == field,
        }
    }

    pub fn as_str(&self) -> &str {
        self.value().unwrap_or(ALL)
    }
}

impl Serialize for Selection {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct FilterSelection {
    pub province: Selection,
    pub district: Selection,
    pub city: Selection,
    pub tehsil: Selection,
}

impl FilterSelection {
    pub fn new(
        province: Option<&str>,
        district: Option<&str>,
        city: Option<&str>,
        tehsil: Option<&str>,
    ) -> Self {
        FilterSelection {
            province: Selection::parse(province),
            district: Selection::parse(district),
            city: Selection::parse(city),
            tehsil: Selection::parse(tehsil),
        }
    }

    // Changing a level resets every level below it.

    pub fn with_province(&self, value: Option<&str>) -> Self {
        FilterSelection {
            province: Selection::parse(value),
            ..FilterSelection::default()
        }
    }

    pub fn with_district(&self, value: Option<&str>) -> Self {
        FilterSelection {
            province: self.province.clone(),
            district: Selection::parse(value),
            ..FilterSelection::default()
        }
    }

    pub fn with_city(&self, value: Option<&str>) -> Self {
        FilterSelection {
            province: self.province.clone(),
            district: self.district.clone(),
            city: Selection::parse(value),
            tehsil: Selection::All,
        }
    }

    pub fn with_tehsil(&self, value: Option<&str>) -> Self {
        FilterSelection {
            tehsil: Selection::parse(value),
            ..self.clone()
        }
    }

    /// Drop stale selections top-down: a level whose value is not offered
    /// under its parent is reset, together with every level below it.
    pub fn reconcile(&self, records: &[AtmRecord]) -> Self {
        let mut out = FilterSelection::default();

        match self.province.value() {
            Some(p) if province_options(records).contains(p) => out.province = self.province.clone(),
            _ => return out,
        }
        match self.district.value() {
            Some(d) if district_options(records, &out).contains(d) => out.district = self.district.clone(),
            _ => return out,
        }
        match self.city.value() {
            Some(c) if city_options(records, &out).contains(c) => out.city = self.city.clone(),
            _ => return out,
        }
        if let Some(t) = self.tehsil.value() {
            if tehsil_options(records, &out).contains(t) {
                out.tehsil = self.tehsil.clone();
            }
        }
        out
    }
}

fn distinct<'a>(values: impl Iterator<Item = &'a str>) -> BTreeSet<String> {
    values.filter(|v| !v.is_empty()).map(str::to_string).collect()
}

fn all_only() -> BTreeSet<String> {
    BTreeSet::from([ALL.to_string()])
}

/// Distinct non-empty provinces.
pub fn province_options(records: &[AtmRecord]) -> BTreeSet<String> {
    distinct(records.iter().map(|r| r.province.as_str()))
}

pub fn district_options(records: &[AtmRecord], selection: &FilterSelection) -> BTreeSet<String> {
    if selection.province.is_all() {
        return all_only();
    }
    distinct(
        records
            .iter()
            .filter(|r| selection.province.matches(&r.province))
            .map(|r| r.district.as_str()),
    )
}

pub fn city_options(records: &[AtmRecord], selection: &FilterSelection) -> BTreeSet<String> {
    if selection.province.is_all() || selection.district.is_all() {
        return all_only();
    }
    distinct(
        records
            .iter()
            .filter(|r| selection.province.matches(&r.province) && selection.district.matches(&r.district))
            .map(|r| r.city.as_str()),
    )
}

pub fn tehsil_options(records: &[AtmRecord], selection: &FilterSelection) -> BTreeSet<String> {
    if selection.province.is_all() || selection.district.is_all() || selection.city.is_all() {
        return all_only();
    }
    distinct(
        records
            .iter()
            .filter(|r| {
                selection.province.matches(&r.province)
                    && selection.district.matches(&r.district)
                    && selection.city.matches(&r.city)
            })
            .map(|r| r.tehsil.as_str()),
    )
}

/// The four option sets for the current selection.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FilterOptions {
    pub provinces: BTreeSet<String>,
    pub districts: BTreeSet<String>,
    pub cities: BTreeSet<String>,
    pub tehsils: BTreeSet<String>,
}

impl FilterOptions {
    pub fn derive(records: &[AtmRecord], selection: &FilterSelection) -> Self {
        FilterOptions {
            provinces: province_options(records),
            districts: district_options(records, selection),
            cities: city_options(records, selection),
            tehsils: tehsil_options(records, selection),
        }
    }
}
