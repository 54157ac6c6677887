use crate::filters::FilterSelection;
use crate::types::{AtmRecord, GroupLevel, GroupedCount, ParticipantRatio, ParticipantSummaryRow};
use crate::util::format_int;
use std::cmp::Ordering;
use std::collections::HashMap;
use tracing::warn;

/// Grouped counts plus the filtered records they were computed from.
#[derive(Debug, Clone)]
pub struct Aggregation<'a> {
    pub level: GroupLevel,
    pub groups: Vec<GroupedCount>,
    pub filtered: Vec<&'a AtmRecord>,
}

/// Filter `records` by `selection` and count addresses per group.
///
/// The grouping key follows the deepest selected level, except that a
/// selected city (tehsil unselected) still groups by city rather than tehsil.
pub fn aggregate<'a>(records: &'a [AtmRecord], selection: &FilterSelection) -> Aggregation<'a> {
    let (level, filtered): (GroupLevel, Vec<&AtmRecord>) = if selection.province.is_all() {
        (GroupLevel::Participant, records.iter().collect())
    } else if selection.district.is_all() {
        (
            GroupLevel::District,
            records
                .iter()
                .filter(|r| selection.province.matches(&r.province))
                .collect(),
        )
    } else if selection.city.is_all() {
        (
            GroupLevel::City,
            records
                .iter()
                .filter(|r| {
                    selection.province.matches(&r.province) && selection.district.matches(&r.district)
                })
                .collect(),
        )
    } else if selection.tehsil.is_all() {
        (
            GroupLevel::City,
            records
                .iter()
                .filter(|r| {
                    selection.province.matches(&r.province)
                        && selection.district.matches(&r.district)
                        && selection.city.matches(&r.city)
                })
                .collect(),
        )
    } else {
        (
            GroupLevel::Tehsil,
            records
                .iter()
                .filter(|r| {
                    selection.province.matches(&r.province)
                        && selection.district.matches(&r.district)
                        && selection.city.matches(&r.city)
                        && selection.tehsil.matches(&r.tehsil)
                })
                .collect(),
        )
    };

    let groups = group_counts(&filtered, level);
    Aggregation {
        level,
        groups,
        filtered,
    }
}

/// Count records per participant only.
pub fn participant_counts(filtered: &[&AtmRecord]) -> Vec<GroupedCount> {
    group_counts(filtered, GroupLevel::Participant)
}

/// Groups appear in first-encounter order.
fn group_counts(filtered: &[&AtmRecord], level: GroupLevel) -> Vec<GroupedCount> {
    let mut index: HashMap<(&str, Option<&str>), usize> = HashMap::new();
    let mut groups: Vec<GroupedCount> = Vec::new();
    for r in filtered {
        let detail = match level {
            GroupLevel::Participant => None,
            GroupLevel::District => Some(r.district.as_str()),
            GroupLevel::City => Some(r.city.as_str()),
            GroupLevel::Tehsil => Some(r.tehsil.as_str()),
        };
        let key = (r.participant_name.as_str(), detail);
        let slot = *index.entry(key).or_insert_with(|| {
            groups.push(GroupedCount {
                participant: r.participant_name.clone(),
                detail: detail.map(str::to_string),
                count: 0,
            });
            groups.len() - 1
        });
        groups[slot].count += 1;
    }
    groups
}

/// Population per ATM for each participant. Zero counts are left out rather
/// than divided by.
pub fn population_ratios(counts: &[GroupedCount], population_total: f64) -> Vec<ParticipantRatio> {
    counts
        .iter()
        .filter_map(|g| {
            if g.count == 0 {
                warn!(participant = %g.participant, "no ATMs in scope, ratio skipped");
                return None;
            }
            Some(ParticipantRatio {
                participant: g.participant.clone(),
                atm_count: g.count,
                population_per_atm: population_total / g.count as f64,
            })
        })
        .collect()
}

/// Per-participant totals for the startup table, busiest first.
pub fn participant_summary(records: &[AtmRecord]) -> Vec<ParticipantSummaryRow> {
    #[derive(Default)]
    struct Acc {
        total: usize,
        valid: usize,
    }
    let mut map: HashMap<&str, Acc> = HashMap::new();
    for r in records {
        let e = map.entry(r.participant_name.as_str()).or_default();
        e.total += 1;
        if r.valid {
            e.valid += 1;
        }
    }
    let mut rows: Vec<(&str, Acc)> = map.into_iter().collect();
    rows.sort_by(|a, b| match b.1.total.cmp(&a.1.total) {
        Ordering::Equal => a.0.cmp(b.0),
        other => other,
    });
    rows.into_iter()
        .map(|(name, acc)| ParticipantSummaryRow {
            participant: name.to_string(),
            atms: format_int(acc.total),
            valid: format_int(acc.valid),
            invalid: format_int(acc.total - acc.valid),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filters::tests::sample;
    use crate::filters::Selection;

    fn count_of(groups: &[GroupedCount], participant: &str, detail: Option<&str>) -> usize {
        groups
            .iter()
            .find(|g| g.participant == participant && g.detail.as_deref() == detail)
            .map(|g| g.count)
            .unwrap_or(0)
    }

    #[test]
    fn province_all_groups_by_participant() {
        let records = sample();
        let agg = aggregate(&records, &FilterSelection::default());
        assert_eq!(agg.level, GroupLevel::Participant);
        assert_eq!(agg.filtered.len(), records.len());
        assert_eq!(count_of(&agg.groups, "ALPHA BANK", None), 3);
        assert_eq!(count_of(&agg.groups, "BETA BANK", None), 2);
        assert_eq!(count_of(&agg.groups, "GAMMA BANK", None), 1);
    }

    #[test]
    fn province_selected_groups_by_district() {
        let records = sample();
        let agg = aggregate(&records, &FilterSelection::new(Some("Punjab"), None, None, None));
        assert_eq!(agg.level, GroupLevel::District);
        assert_eq!(agg.filtered.len(), 4);
        assert_eq!(count_of(&agg.groups, "ALPHA BANK", Some("LAHORE")), 2);
        assert_eq!(count_of(&agg.groups, "BETA BANK", Some("LAHORE")), 1);
        assert_eq!(count_of(&agg.groups, "BETA BANK", Some("MULTAN")), 1);
    }

    #[test]
    fn district_selected_groups_by_city() {
        let records = sample();
        let agg = aggregate(&records, &FilterSelection::new(Some("Punjab"), Some("Lahore"), None, None));
        assert_eq!(agg.level, GroupLevel::City);
        assert_eq!(agg.filtered.len(), 3);
        assert_eq!(count_of(&agg.groups, "ALPHA BANK", Some("LAHORE")), 2);
        assert_eq!(count_of(&agg.groups, "BETA BANK", Some("RAIWIND")), 1);
    }

    #[test]
    fn city_selected_still_groups_by_city() {
        let records = sample();
        let sel = FilterSelection::new(Some("Punjab"), Some("Lahore"), Some("Lahore"), Some("All"));
        let agg = aggregate(&records, &sel);
        assert_eq!(agg.level, GroupLevel::City);
        assert_eq!(agg.filtered.len(), 2);
        assert_eq!(agg.groups.len(), 1);
        assert_eq!(count_of(&agg.groups, "ALPHA BANK", Some("LAHORE")), 2);
    }

    #[test]
    fn tehsil_selected_groups_by_tehsil() {
        let records = sample();
        let sel = FilterSelection::new(Some("Punjab"), Some("Lahore"), Some("Lahore"), Some("Lahore Cantt"));
        let agg = aggregate(&records, &sel);
        assert_eq!(agg.level, GroupLevel::Tehsil);
        assert_eq!(agg.filtered.len(), 1);
        assert_eq!(count_of(&agg.groups, "ALPHA BANK", Some("LAHORE CANTT")), 1);
    }

    #[test]
    fn grouping_level_for_every_selection_combination() {
        let records = sample();
        // Every concrete value lies on the PUNJAB/LAHORE/LAHORE/LAHORE CITY
        // chain, so each combination keeps at least the first sample record.
        let options = |value: &'static str| [None, Some("All"), Some(value)];
        for p in options("Punjab") {
            for d in options("Lahore") {
                for c in options("Lahore") {
                    for t in options("Lahore City") {
                        let sel = FilterSelection::new(p, d, c, t);
                        let expected = if sel.province.is_all() {
                            GroupLevel::Participant
                        } else if sel.district.is_all() {
                            GroupLevel::District
                        } else if sel.city.is_all() || sel.tehsil.is_all() {
                            GroupLevel::City
                        } else {
                            GroupLevel::Tehsil
                        };
                        let agg = aggregate(&records, &sel);
                        assert_eq!(agg.level, expected, "{:?}", sel);
                        assert!(!agg.filtered.is_empty(), "{:?}", sel);
                        let total: usize = agg.groups.iter().map(|g| g.count).sum();
                        assert_eq!(total, agg.filtered.len(), "{:?}", sel);
                    }
                }
            }
        }
    }

    #[test]
    fn group_counts_sum_to_filtered_size() {
        let records = sample();
        let selections = [
            FilterSelection::default(),
            FilterSelection::new(Some("Punjab"), None, None, None),
            FilterSelection::new(Some("Punjab"), Some("Lahore"), None, None),
            FilterSelection::new(Some("Sindh"), Some("Karachi"), Some("Karachi"), None),
        ];
        for sel in &selections {
            let agg = aggregate(&records, sel);
            let total: usize = agg.groups.iter().map(|g| g.count).sum();
            assert_eq!(total, agg.filtered.len());
        }
    }

    #[test]
    fn duplicates_count_fully() {
        let mut records = sample();
        records.push(records[0].clone());
        let agg = aggregate(&records, &FilterSelection::default());
        assert_eq!(count_of(&agg.groups, "ALPHA BANK", None), 4);
    }

    #[test]
    fn unknown_value_filters_everything_out() {
        let records = sample();
        let mut sel = FilterSelection::default();
        sel.province = Selection::Value("ATLANTIS".into());
        let agg = aggregate(&records, &sel);
        assert!(agg.filtered.is_empty());
        assert!(agg.groups.is_empty());
    }

    #[test]
    fn ratios_divide_population_and_skip_zero() {
        let counts = vec![
            GroupedCount { participant: "ALPHA BANK".into(), detail: None, count: 4 },
            GroupedCount { participant: "EMPTY BANK".into(), detail: None, count: 0 },
        ];
        let ratios = population_ratios(&counts, 1000.0);
        assert_eq!(ratios.len(), 1);
        assert_eq!(ratios[0].participant, "ALPHA BANK");
        assert_eq!(ratios[0].population_per_atm, 250.0);
        assert!(ratios.iter().all(|r| r.population_per_atm.is_finite()));
    }

    #[test]
    fn summary_sorted_busiest_first() {
        let mut records = sample();
        records[4].valid = false;
        let rows = participant_summary(&records);
        assert_eq!(rows[0].participant, "ALPHA BANK");
        assert_eq!(rows[0].atms, "3");
        assert_eq!(rows[0].invalid, "1");
        assert_eq!(rows[1].participant, "BETA BANK");
        assert_eq!(rows[2].participant, "GAMMA BANK");
    }
}
