//! The loaded dataset and the pure selection → view computation.

use crate::aggregate::{aggregate, participant_counts, population_ratios};
use crate::boundary::CountryBoundary;
use crate::charts::{bar_chart, map_chart, pie_chart, BarChart, MapChart, PieChart};
use crate::config::Config;
use crate::error::Result;
use crate::filters::{FilterOptions, FilterSelection};
use crate::loader::{load_atm_rows, load_bank_directory, load_population_total};
use crate::normalize::enrich;
use crate::types::{AtmRecord, GroupLevel};
use crate::util::{format_int, format_number};
use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{info, warn};

/// Everything loaded at startup. Read-only for the rest of the process.
#[derive(Debug, Clone)]
pub struct Dataset {
    pub records: Vec<AtmRecord>,
    pub population_total: f64,
    /// ATM source files the records were read from.
    pub source_files: usize,
    pub loaded_at: DateTime<Utc>,
}

impl Dataset {
    pub fn new(records: Vec<AtmRecord>, population_total: f64) -> Self {
        Dataset {
            records,
            population_total,
            source_files: 0,
            loaded_at: Utc::now(),
        }
    }

    /// Run the whole load → clean → enrich pass.
    pub fn load(config: &Config) -> Result<Self> {
        let (rows, report) = load_atm_rows(&config.atm_data_dir)?;
        let banks = load_bank_directory(&config.banks_file, &config.banks_sheet)?;
        if banks.is_empty() {
            warn!(file = %config.banks_file.display(), "bank directory is empty, participants keep raw codes");
        } else {
            info!(banks = banks.len(), "bank directory loaded");
        }
        let boundary = CountryBoundary::load(&config.boundary_file, config.boundary_feature_index)?;
        let population_total = load_population_total(
            &config.population_file,
            &config.population_sheet,
            &config.population_column,
        )?;
        info!(population = %format_number(population_total, 0), "population table loaded");

        let records = enrich(rows, &banks, &boundary)?;
        let dataset = Dataset {
            source_files: report.files,
            ..Dataset::new(records, population_total)
        };
        info!(
            files = dataset.source_files,
            records = %format_int(dataset.records.len()),
            "dataset ready"
        );
        Ok(dataset)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct DashboardView {
    /// The selection actually applied, after stale levels were reset.
    pub selection: FilterSelection,
    pub options: FilterOptions,
    pub level: GroupLevel,
    pub total_atms: usize,
    pub bar: BarChart,
    pub pie: PieChart,
    pub map: MapChart,
}

/// Compute every panel for `selection`. Never touches `dataset`.
pub fn render(dataset: &Dataset, selection: &FilterSelection) -> DashboardView {
    let selection = selection.reconcile(&dataset.records);
    let options = FilterOptions::derive(&dataset.records, &selection);
    let agg = aggregate(&dataset.records, &selection);

    let ratios = population_ratios(&participant_counts(&agg.filtered), dataset.population_total);

    DashboardView {
        options,
        level: agg.level,
        total_atms: agg.filtered.len(),
        bar: bar_chart(&agg.groups),
        pie: pie_chart(&ratios, dataset.population_total),
        map: map_chart(&agg.filtered),
        selection,
    }
}
