//! Per-group summary statistics over a tract table.
//!
//! County aggregation always yields one row per lookup county, in lookup
//! order. A county with no tracts in the input gets a placeholder row with
//! `tract_count = 0`, `percent_lila_tracts = 0.0` and `None` means, so every
//! map region has a value to draw. Tracts whose county is not in the lookup
//! table are left out.

use serde::Serialize;
use std::collections::HashMap;
use tracing::warn;

use crate::counties::COUNTIES;
use crate::model::Tract;
use crate::utility::{mean, pct, round2};

/// Summary statistics for one group of tracts.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct GroupStats {
    pub tract_count: usize,
    pub lila_count: usize,
    pub percent_lila_tracts: f64,
    pub mean_poverty_rate: Option<f64>,
    pub mean_median_income: Option<f64>,
    pub mean_pct_no_vehicle: Option<f64>,
}

impl GroupStats {
    /// Computes the statistics of a group. Missing incomes and zero-household
    /// tracts are skipped by the respective means.
    pub fn from_tracts<'a>(tracts: impl IntoIterator<Item = &'a Tract>) -> Self {
        let mut tract_count = 0;
        let mut lila_count = 0;
        let mut poverty = Vec::new();
        let mut income = Vec::new();
        let mut no_vehicle = Vec::new();

        for t in tracts {
            tract_count += 1;
            if t.lila {
                lila_count += 1;
            }
            poverty.push(t.poverty_rate);
            if let Some(v) = t.median_family_income {
                income.push(v);
            }
            if let Some(v) = t.pct_households_no_vehicle {
                no_vehicle.push(v);
            }
        }

        GroupStats {
            tract_count,
            lila_count,
            percent_lila_tracts: pct(lila_count as f64, tract_count as f64),
            mean_poverty_rate: mean(&poverty),
            mean_median_income: mean(&income),
            mean_pct_no_vehicle: mean(&no_vehicle),
        }
    }

    /// Copy with every rate and currency value rounded to 2 decimals.
    pub fn rounded(&self) -> Self {
        GroupStats {
            percent_lila_tracts: round2(self.percent_lila_tracts),
            mean_poverty_rate: self.mean_poverty_rate.map(round2),
            mean_median_income: self.mean_median_income.map(round2),
            mean_pct_no_vehicle: self.mean_pct_no_vehicle.map(round2),
            ..self.clone()
        }
    }
}

/// Unrounded statistics for one county.
#[derive(Debug, Clone, PartialEq)]
pub struct CountyAggregate {
    pub county: String,
    pub region_code: String,
    pub stats: GroupStats,
}

/// Display row of the county summary table, rounded to 2 decimals.
///
/// Kept flat so it serializes to CSV as well as JSON.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CountySummaryRow {
    pub county: String,
    pub region_code: String,
    pub tract_count: usize,
    pub lila_count: usize,
    pub percent_lila_tracts: f64,
    pub mean_poverty_rate: Option<f64>,
    pub mean_median_income: Option<f64>,
    pub mean_pct_no_vehicle: Option<f64>,
}

impl CountyAggregate {
    pub fn summary_row(&self) -> CountySummaryRow {
        let stats = self.stats.rounded();
        CountySummaryRow {
            county: self.county.clone(),
            region_code: self.region_code.clone(),
            tract_count: stats.tract_count,
            lila_count: stats.lila_count,
            percent_lila_tracts: stats.percent_lila_tracts,
            mean_poverty_rate: stats.mean_poverty_rate,
            mean_median_income: stats.mean_median_income,
            mean_pct_no_vehicle: stats.mean_pct_no_vehicle,
        }
    }
}

/// Groups tracts by county, one row per lookup county.
pub fn aggregate_by_county(tracts: &[Tract]) -> Vec<CountyAggregate> {
    let mut groups: HashMap<&str, Vec<&Tract>> = HashMap::new();
    for t in tracts {
        groups.entry(t.county.as_str()).or_default().push(t);
    }

    let aggregates = COUNTIES
        .iter()
        .map(|(name, code)| CountyAggregate {
            county: name.to_string(),
            region_code: code.to_string(),
            stats: groups
                .remove(name)
                .map(GroupStats::from_tracts)
                .unwrap_or_default(),
        })
        .collect();

    for (county, rows) in &groups {
        warn!(
            county = %county,
            tracts = rows.len(),
            "County not in lookup table, left out of aggregation"
        );
    }

    aggregates
}

/// Statistics for one side of the urban/rural split.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AreaTypeAggregate {
    pub area_type: &'static str,
    #[serde(flatten)]
    pub stats: GroupStats,
}

/// Groups tracts into "Urban" and "Rural", always returning both rows.
pub fn aggregate_by_area_type(tracts: &[Tract]) -> Vec<AreaTypeAggregate> {
    [("Urban", true), ("Rural", false)]
        .into_iter()
        .map(|(area_type, urban)| AreaTypeAggregate {
            area_type,
            stats: GroupStats::from_tracts(tracts.iter().filter(|t| t.is_urban == urban)),
        })
        .collect()
}

/// Headline figures for a tract table.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Overview {
    pub total_population: u64,
    pub total_low_access_population: f64,
    #[serde(flatten)]
    pub stats: GroupStats,
}

impl Overview {
    pub fn from_tracts(tracts: &[Tract]) -> Self {
        Overview {
            total_population: tracts.iter().map(|t| t.population).sum(),
            total_low_access_population: tracts.iter().map(|t| t.low_access_population).sum(),
            stats: GroupStats::from_tracts(tracts),
        }
    }

    pub fn rounded(&self) -> Self {
        Overview {
            total_low_access_population: round2(self.total_low_access_population),
            stats: self.stats.rounded(),
            ..self.clone()
        }
    }
}
