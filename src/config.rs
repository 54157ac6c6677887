//! Runtime configuration loaded from environment variables.
//!
//! `main` calls `dotenvy::dotenv()` first, so a `.env` file in the working
//! directory is honoured. Every variable has a default matching the layout of
//! the bundled `res/` directory.
//!
//! - `ATM_DATA_DIR` (default `res/banks`)
//! - `BANKS_FILE` / `BANKS_SHEET` (default `res/Banks.xlsx` / `Sheet1`)
//! - `BOUNDARY_FILE` / `BOUNDARY_FEATURE_INDEX` (default `res/Countries.geojson` / `174`)
//! - `POPULATION_FILE` / `POPULATION_SHEET` / `POPULATION_COLUMN`
//!   (default `res/Population2017.xlsx` / `Admin3` / `Total_pop`)
//! - `HOST` / `PORT` (default `127.0.0.1` / `8050`)

use crate::boundary::DEFAULT_FEATURE_INDEX;
use crate::error::{DashboardError, Result};
use std::env;
use std::path::PathBuf;
use std::str::FromStr;

#[derive(Debug, Clone)]
pub struct Config {
    pub atm_data_dir: PathBuf,
    pub banks_file: PathBuf,
    pub banks_sheet: String,
    pub boundary_file: PathBuf,
    /// Index of the national outline inside the boundary FeatureCollection.
    pub boundary_feature_index: usize,
    pub population_file: PathBuf,
    pub population_sheet: String,
    pub population_column: String,
    pub host: String,
    pub port: u16,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            atm_data_dir: PathBuf::from("res/banks"),
            banks_file: PathBuf::from("res/Banks.xlsx"),
            banks_sheet: "Sheet1".to_string(),
            boundary_file: PathBuf::from("res/Countries.geojson"),
            boundary_feature_index: DEFAULT_FEATURE_INDEX,
            population_file: PathBuf::from("res/Population2017.xlsx"),
            population_sheet: "Admin3".to_string(),
            population_column: "Total_pop".to_string(),
            host: "127.0.0.1".to_string(),
            port: 8050,
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build from any key lookup; unset keys fall back to the defaults.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let d = Config::default();
        let text = |key: &str, default: String| lookup(key).unwrap_or(default);
        let path = |key: &str, default: PathBuf| lookup(key).map(PathBuf::from).unwrap_or(default);

        Ok(Config {
            atm_data_dir: path("ATM_DATA_DIR", d.atm_data_dir),
            banks_file: path("BANKS_FILE", d.banks_file),
            banks_sheet: text("BANKS_SHEET", d.banks_sheet),
            boundary_file: path("BOUNDARY_FILE", d.boundary_file),
            boundary_feature_index: parsed(&lookup, "BOUNDARY_FEATURE_INDEX", d.boundary_feature_index)?,
            population_file: path("POPULATION_FILE", d.population_file),
            population_sheet: text("POPULATION_SHEET", d.population_sheet),
            population_column: text("POPULATION_COLUMN", d.population_column),
            host: text("HOST", d.host),
            port: parsed(&lookup, "PORT", d.port)?,
        })
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn parsed<F, T>(lookup: &F, key: &str, default: T) -> Result<T>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    match lookup(key) {
        None => Ok(default),
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|_| DashboardError::Config(format!("{key} must be a number, got '{raw}'"))),
    }
}
