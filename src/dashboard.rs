//! Session entry point: holds the loaded table and recomputes every
//! presentation table from the current parameters.

use chrono::{DateTime, Utc};
use geojson::FeatureCollection;
use serde::Serialize;
use std::path::Path;
use tracing::info;

use crate::aggregate::{
    AreaTypeAggregate, CountySummaryRow, Overview, aggregate_by_area_type, aggregate_by_county,
};
use crate::error::Result;
use crate::filter::FilterSpec;
use crate::geo::{MapLayer, join_boundaries, without_geometry};
use crate::loader::load_tracts;
use crate::model::{RankedTract, ScatterPoint, Tract};
use crate::rank::{DEFAULT_TOP_N, RankOrder, top_n};

/// Parameters of one recomputation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardParams {
    pub filter: FilterSpec,
    pub rank_order: RankOrder,
    pub top_n: usize,
}

impl Default for DashboardParams {
    fn default() -> Self {
        Self {
            filter: FilterSpec::default(),
            rank_order: RankOrder::default(),
            top_n: DEFAULT_TOP_N,
        }
    }
}

/// Every table the presentation layer draws from, for one parameter set.
#[derive(Debug, Clone, Serialize)]
pub struct DashboardView {
    pub generated_at: DateTime<Utc>,
    pub params: DashboardParams,
    pub overview: Overview,
    pub county_summary: Vec<CountySummaryRow>,
    pub area_types: Vec<AreaTypeAggregate>,
    /// Ranked over the full table, independent of the filter.
    pub top_tracts: Vec<RankedTract>,
    pub scatter: Vec<ScatterPoint>,
    pub tracts: Vec<Tract>,
}

/// The immutable tract table for a session.
pub struct Dashboard {
    tracts: Vec<Tract>,
}

impl Dashboard {
    pub fn new(tracts: Vec<Tract>) -> Self {
        Self { tracts }
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        Ok(Self::new(load_tracts(path)?))
    }

    pub fn tracts(&self) -> &[Tract] {
        &self.tracts
    }

    /// Filters, aggregates and ranks for `params`.
    #[tracing::instrument(skip(self))]
    pub fn recompute(&self, params: &DashboardParams) -> DashboardView {
        let filtered = params.filter.apply(&self.tracts);
        info!(
            total = self.tracts.len(),
            matched = filtered.len(),
            "Filters applied"
        );

        DashboardView {
            generated_at: Utc::now(),
            params: params.clone(),
            overview: Overview::from_tracts(&filtered).rounded(),
            county_summary: county_summary(&filtered),
            area_types: aggregate_by_area_type(&filtered)
                .into_iter()
                .map(|a| AreaTypeAggregate {
                    stats: a.stats.rounded(),
                    ..a
                })
                .collect(),
            top_tracts: top_n(&self.tracts, params.top_n, params.rank_order),
            scatter: scatter_points(&filtered),
            tracts: filtered,
        }
    }

    /// Ranked table over the full dataset.
    pub fn top_tracts(&self, n: usize, order: RankOrder) -> Vec<RankedTract> {
        top_n(&self.tracts, n, order)
    }

    /// County summary over the full dataset, as used by the map.
    pub fn map_summary(&self) -> Vec<CountySummaryRow> {
        county_summary(&self.tracts)
    }

    /// Joins the unfiltered county summary onto `boundaries`, or produces a
    /// geometry-less layer when there are none.
    pub fn map_layer(&self, boundaries: Option<FeatureCollection>) -> MapLayer {
        let summary = self.map_summary();
        match boundaries {
            Some(collection) => join_boundaries(&summary, collection),
            None => without_geometry(&summary),
        }
    }
}

fn county_summary(tracts: &[Tract]) -> Vec<CountySummaryRow> {
    aggregate_by_county(tracts)
        .iter()
        .map(|a| a.summary_row())
        .collect()
}

/// Income vs poverty points; tracts with no reported income are left out.
pub fn scatter_points(tracts: &[Tract]) -> Vec<ScatterPoint> {
    tracts
        .iter()
        .filter_map(|t| {
            t.median_family_income.map(|income| ScatterPoint {
                tract_id: t.tract_id.clone(),
                county: t.county.clone(),
                is_urban: t.is_urban,
                population: t.population,
                poverty_rate: t.poverty_rate,
                median_family_income: income,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::IncomeRange;

    fn tract(id: &str, county: &str, income: Option<f64>, low_access: f64) -> Tract {
        Tract {
            tract_id: id.to_string(),
            county: county.to_string(),
            is_urban: county != "Franklin",
            population: 2000,
            poverty_rate: 8.0,
            median_family_income: income,
            households_no_vehicle_count: 20,
            total_occupied_households: 800,
            lila: low_access > 100.0,
            low_access_population: low_access,
            pct_households_no_vehicle: Some(2.5),
        }
    }

    fn dashboard() -> Dashboard {
        Dashboard::new(vec![
            tract("a", "Suffolk", Some(45000.0), 300.0),
            tract("b", "Suffolk", Some(72000.0), 20.0),
            tract("c", "Franklin", None, 150.0),
            tract("d", "Essex", Some(98000.0), 0.0),
        ])
    }

    #[test]
    fn test_recompute_default_params() {
        let view = dashboard().recompute(&DashboardParams::default());

        assert_eq!(view.tracts.len(), 4);
        assert_eq!(view.overview.stats.tract_count, 4);
        assert_eq!(view.county_summary.len(), 14);
        assert_eq!(view.scatter.len(), 3);
        assert_eq!(view.top_tracts[0].tract_id, "a");
    }

    #[test]
    fn test_recompute_leaves_table_intact() {
        let dashboard = dashboard();
        let params = DashboardParams {
            filter: FilterSpec::new().with_county("Essex"),
            ..Default::default()
        };

        let view = dashboard.recompute(&params);
        assert_eq!(view.tracts.len(), 1);
        assert_eq!(dashboard.tracts().len(), 4);

        let again = dashboard.recompute(&DashboardParams::default());
        assert_eq!(again.tracts.len(), 4);
    }

    #[test]
    fn test_top_tracts_ignore_filter() {
        let params = DashboardParams {
            filter: FilterSpec::new().with_county("Essex"),
            top_n: 2,
            ..Default::default()
        };
        let view = dashboard().recompute(&params);

        let ids: Vec<_> = view.top_tracts.iter().map(|r| r.tract_id.as_str()).collect();
        assert_eq!(ids, vec!["a", "c"]);
    }

    #[test]
    fn test_empty_result_produces_zero_aggregates() {
        let params = DashboardParams {
            filter: FilterSpec::new()
                .with_income_range(IncomeRange::new(200000.0, 300000.0).unwrap()),
            ..Default::default()
        };
        let view = dashboard().recompute(&params);

        assert!(view.tracts.is_empty());
        assert_eq!(view.overview.stats.tract_count, 0);
        assert_eq!(view.overview.stats.mean_median_income, None);
        assert!(view.county_summary.iter().all(|r| r.tract_count == 0));
    }

    #[test]
    fn test_map_layer_without_boundaries() {
        let layer = dashboard().map_layer(None);
        assert_eq!(layer.counties_without_geometry.len(), 14);
    }
}
