//! Chart descriptions handed to the browser-side renderer.
//!
//! These are plain serializable values; nothing here knows how a chart is
//! drawn.

use crate::types::{AtmRecord, GroupedCount, ParticipantRatio};
use crate::util::human_format;
use serde::Serialize;

pub const MAP_CENTER_LAT: f64 = 30.3753;
pub const MAP_CENTER_LON: f64 = 69.3451;
pub const MAP_ZOOM: u8 = 4;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Bar {
    pub participant: String,
    pub detail: Option<String>,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BarChart {
    pub title: String,
    pub bars: Vec<Bar>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PieSlice {
    pub participant: String,
    /// Population per ATM.
    pub value: f64,
    pub atms: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PieChart {
    pub slices: Vec<PieSlice>,
    /// Center text, e.g. `"Total 208M"`.
    pub annotation: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MapPoint {
    pub lon: f64,
    pub lat: f64,
    pub label: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MapLayer {
    pub name: String,
    pub color: String,
    pub points: Vec<MapPoint>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MapChart {
    pub center_lat: f64,
    pub center_lon: f64,
    pub zoom: u8,
    pub layers: Vec<MapLayer>,
}

impl MapChart {
    pub fn layer(&self, name: &str) -> Option<&MapLayer> {
        self.layers.iter().find(|l| l.name == name)
    }
}

/// One bar per group, highest count first. Ties keep their input order.
pub fn bar_chart(groups: &[GroupedCount]) -> BarChart {
    let mut bars: Vec<Bar> = groups
        .iter()
        .map(|g| Bar {
            participant: g.participant.clone(),
            detail: g.detail.clone(),
            count: g.count,
        })
        .collect();
    bars.sort_by(|a, b| b.count.cmp(&a.count));
    BarChart {
        title: "Number of ATMs".to_string(),
        bars,
    }
}

pub fn pie_chart(ratios: &[ParticipantRatio], population_total: f64) -> PieChart {
    PieChart {
        slices: ratios
            .iter()
            .map(|r| PieSlice {
                participant: r.participant.clone(),
                value: r.population_per_atm,
                atms: r.atm_count,
            })
            .collect(),
        annotation: format!("Total {}", human_format(population_total)),
    }
}

/// Valid points go to the green "Correct" layer, the rest to red "Wrong".
pub fn map_chart(filtered: &[&AtmRecord]) -> MapChart {
    let point = |r: &&AtmRecord| MapPoint {
        lon: r.longitude,
        lat: r.latitude,
        label: format!("{}{}", r.participant_name, r.street_address),
    };
    let (valid, invalid): (Vec<&AtmRecord>, Vec<&AtmRecord>) = filtered.iter().copied().partition(|r| r.valid);
    MapChart {
        center_lat: MAP_CENTER_LAT,
        center_lon: MAP_CENTER_LON,
        zoom: MAP_ZOOM,
        layers: vec![
            MapLayer {
                name: "Correct".to_string(),
                color: "green".to_string(),
                points: valid.iter().map(point).collect(),
            },
            MapLayer {
                name: "Wrong".to_string(),
                color: "red".to_string(),
                points: invalid.iter().map(point).collect(),
            },
        ],
    }
}
