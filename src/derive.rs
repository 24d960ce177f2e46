//! Derived columns computed once after load.
//!
//! A zero-household tract gets `pct_households_no_vehicle = None`; it is
//! skipped when averaging rather than counted as zero.

use tracing::debug;

use crate::model::{RawTract, Tract};

const COUNTY_SUFFIX: &str = " County";

/// Strips a trailing " County" from a county display name.
pub fn normalize_county(name: &str) -> String {
    let trimmed = name.trim();
    trimmed
        .strip_suffix(COUNTY_SUFFIX)
        .unwrap_or(trimmed)
        .trim_end()
        .to_string()
}

/// Share of occupied households with no vehicle, as a percentage.
pub fn pct_no_vehicle(no_vehicle: u64, occupied: u64) -> Option<f64> {
    if occupied == 0 {
        return None;
    }
    Some(no_vehicle as f64 / occupied as f64 * 100.0)
}

/// Builds a [`Tract`] from a raw CSV row and computes its derived columns.
pub fn derive(raw: RawTract) -> Tract {
    let low_access_population = raw
        .low_access_low_income
        .filter(|v| v.is_finite())
        .unwrap_or(0.0);

    let mut tract = Tract {
        tract_id: raw.tract_id,
        county: raw.county,
        is_urban: raw.is_urban,
        population: raw.population,
        poverty_rate: raw.poverty_rate,
        median_family_income: raw.median_family_income.filter(|v| v.is_finite()),
        households_no_vehicle_count: raw.households_no_vehicle_count,
        total_occupied_households: raw.total_occupied_households,
        lila: raw.lila,
        low_access_population,
        pct_households_no_vehicle: None,
    };
    refresh(&mut tract);
    tract
}

/// Recomputes the derived columns of a tract in place.
///
/// Running this on a tract that already went through [`derive`] leaves it
/// unchanged.
pub fn refresh(tract: &mut Tract) {
    tract.county = normalize_county(&tract.county);
    tract.pct_households_no_vehicle = pct_no_vehicle(
        tract.households_no_vehicle_count,
        tract.total_occupied_households,
    );

    if tract.pct_households_no_vehicle.is_none() {
        debug!(tract_id = %tract.tract_id, "Tract has no occupied households");
    }
}

/// Derives every row of a freshly loaded table.
pub fn derive_table(rows: Vec<RawTract>) -> Vec<Tract> {
    rows.into_iter().map(derive).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(county: &str, occupied: u64, no_vehicle: u64, lalowi: Option<f64>) -> RawTract {
        RawTract {
            tract_id: "A".to_string(),
            county: county.to_string(),
            is_urban: true,
            population: 1000,
            total_occupied_households: occupied,
            poverty_rate: 12.0,
            median_family_income: Some(60000.0),
            households_no_vehicle_count: no_vehicle,
            lila: false,
            low_access_low_income: lalowi,
        }
    }

    #[test]
    fn test_suffolk_scenario() {
        let tract = derive(raw("Suffolk County", 100, 30, Some(5.0)));

        assert_eq!(tract.pct_households_no_vehicle, Some(30.0));
        assert_eq!(tract.county, "Suffolk");
    }

    #[test]
    fn test_zero_households_is_none() {
        let tract = derive(raw("Dukes County", 0, 0, None));
        assert_eq!(tract.pct_households_no_vehicle, None);
    }

    #[test]
    fn test_missing_low_access_is_zero() {
        let tract = derive(raw("Essex", 10, 1, None));
        assert_eq!(tract.low_access_population, 0.0);

        let tract = derive(raw("Essex", 10, 1, Some(f64::NAN)));
        assert_eq!(tract.low_access_population, 0.0);
    }

    #[test]
    fn test_normalize_county() {
        assert_eq!(normalize_county("Suffolk County"), "Suffolk");
        assert_eq!(normalize_county("  Essex County "), "Essex");
        assert_eq!(normalize_county("Suffolk"), "Suffolk");
        assert_eq!(normalize_county("Countyville"), "Countyville");
    }

    #[test]
    fn test_refresh_is_idempotent() {
        let first = derive(raw("Hampden County", 250, 40, Some(310.0)));
        let mut second = first.clone();
        refresh(&mut second);
        refresh(&mut second);

        assert_eq!(first, second);
    }
}
