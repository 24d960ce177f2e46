//! Joins county aggregates onto boundary features by region code.
//!
//! Every boundary feature is kept. A feature whose code has no county
//! aggregate gets `null` statistics. A county whose code has no feature is
//! reported in [`MapLayer::counties_without_geometry`].

use geojson::feature::Id;
use geojson::{Feature, FeatureCollection};
use serde::Serialize;
use serde_json::{Value, json};
use std::collections::{HashMap, HashSet};
use tracing::{debug, warn};

use crate::aggregate::CountySummaryRow;
use crate::counties::{STATE_FIPS, county_for_code};

/// Joined map data ready for a choropleth renderer.
#[derive(Debug, Clone, Serialize)]
pub struct MapLayer {
    pub collection: FeatureCollection,
    pub counties_without_geometry: Vec<String>,
}

/// Reads a feature id as a five-character region code.
///
/// Numeric ids lose their leading zero in some sources, so they are padded.
pub fn region_code_of(feature: &Feature) -> Option<String> {
    match feature.id.as_ref()? {
        Id::String(s) => Some(s.clone()),
        Id::Number(n) => n.as_u64().map(|v| format!("{v:05}")),
    }
}

/// Keeps only features whose region code starts with `state_prefix`.
pub fn retain_state(mut collection: FeatureCollection, state_prefix: &str) -> FeatureCollection {
    let before = collection.features.len();
    collection
        .features
        .retain(|f| region_code_of(f).is_some_and(|code| code.starts_with(state_prefix)));
    debug!(
        before,
        after = collection.features.len(),
        state_prefix,
        "Boundaries restricted to state"
    );
    collection
}

/// Keeps only Massachusetts features.
pub fn retain_massachusetts(collection: FeatureCollection) -> FeatureCollection {
    retain_state(collection, STATE_FIPS)
}

/// Sets the county statistics as properties on each matching feature.
pub fn join_boundaries(
    summary: &[CountySummaryRow],
    mut collection: FeatureCollection,
) -> MapLayer {
    let by_code: HashMap<&str, &CountySummaryRow> = summary
        .iter()
        .map(|row| (row.region_code.as_str(), row))
        .collect();

    let mut matched = HashSet::new();

    for feature in &mut collection.features {
        let code = region_code_of(feature);
        let row = code.as_deref().and_then(|c| by_code.get(c)).copied();

        if let Some(row) = row {
            matched.insert(row.region_code.as_str());
        }

        for (key, value) in properties_for(code.as_deref(), row) {
            feature.set_property(key, value);
        }
    }

    let counties_without_geometry: Vec<String> = summary
        .iter()
        .filter(|row| !matched.contains(row.region_code.as_str()))
        .map(|row| row.county.clone())
        .collect();

    if !counties_without_geometry.is_empty() {
        warn!(
            counties = ?counties_without_geometry,
            "Counties without a matching boundary"
        );
    }

    MapLayer {
        collection,
        counties_without_geometry,
    }
}

/// Map layer for when no boundaries could be fetched: no features, every
/// county listed as lacking geometry.
pub fn without_geometry(summary: &[CountySummaryRow]) -> MapLayer {
    MapLayer {
        collection: FeatureCollection {
            bbox: None,
            features: Vec::new(),
            foreign_members: None,
        },
        counties_without_geometry: summary.iter().map(|row| row.county.clone()).collect(),
    }
}

/// Unmatched features keep their region code, plus the county name when the
/// code is a known county, and null statistics.
fn properties_for(
    code: Option<&str>,
    row: Option<&CountySummaryRow>,
) -> [(&'static str, Value); 8] {
    match row {
        Some(row) => [
            ("region_code", json!(row.region_code)),
            ("county", json!(row.county)),
            ("tract_count", json!(row.tract_count)),
            ("lila_count", json!(row.lila_count)),
            ("percent_lila_tracts", json!(row.percent_lila_tracts)),
            ("mean_poverty_rate", json!(row.mean_poverty_rate)),
            ("mean_median_income", json!(row.mean_median_income)),
            ("mean_pct_no_vehicle", json!(row.mean_pct_no_vehicle)),
        ],
        None => [
            ("region_code", json!(code)),
            ("county", json!(code.and_then(county_for_code))),
            ("tract_count", Value::Null),
            ("lila_count", Value::Null),
            ("percent_lila_tracts", Value::Null),
            ("mean_poverty_rate", Value::Null),
            ("mean_median_income", Value::Null),
            ("mean_pct_no_vehicle", Value::Null),
        ],
    }
}
