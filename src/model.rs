//! Record types for the tract table and the tables handed to the
//! presentation layer.

use serde::de::{self, Deserializer};
use serde::{Deserialize, Serialize};

/// A single row deserialized from the food access CSV.
///
/// Column names follow the USDA Food Access Research Atlas. Columns not
/// listed here are ignored.
#[derive(Debug, Clone, Deserialize)]
pub struct RawTract {
    #[serde(rename = "CensusTract")]
    pub tract_id: String,
    #[serde(rename = "County")]
    pub county: String,
    #[serde(rename = "Urban", deserialize_with = "de_flag")]
    pub is_urban: bool,
    #[serde(rename = "Pop2010", deserialize_with = "de_count")]
    pub population: u64,
    #[serde(rename = "OHU2010", deserialize_with = "de_count")]
    pub total_occupied_households: u64,
    #[serde(rename = "PovertyRate")]
    pub poverty_rate: f64,
    #[serde(rename = "MedianFamilyIncome", default)]
    pub median_family_income: Option<f64>,
    #[serde(rename = "TractHUNV", deserialize_with = "de_count")]
    pub households_no_vehicle_count: u64,
    #[serde(rename = "LILATracts_1And10", deserialize_with = "de_flag")]
    pub lila: bool,
    #[serde(rename = "LALOWI1_10", default)]
    pub low_access_low_income: Option<f64>,
}

/// A tract with its derived columns, as held in the session table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Tract {
    pub tract_id: String,
    /// County name with any trailing " County" removed.
    pub county: String,
    pub is_urban: bool,
    pub population: u64,
    pub poverty_rate: f64,
    pub median_family_income: Option<f64>,
    pub households_no_vehicle_count: u64,
    pub total_occupied_households: u64,
    pub lila: bool,
    /// Low-income low-access population, zero when the source left it blank.
    pub low_access_population: f64,
    /// `None` when the tract has no occupied households.
    pub pct_households_no_vehicle: Option<f64>,
}

/// One point of the income vs poverty scatter chart.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScatterPoint {
    pub tract_id: String,
    pub county: String,
    pub is_urban: bool,
    pub population: u64,
    pub poverty_rate: f64,
    pub median_family_income: f64,
}

/// A row of the top-N low-access table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankedTract {
    pub tract_id: String,
    pub county: String,
    pub low_access_population: f64,
}

/// Accepts `0`/`1`, `0.0`/`1.0` and `true`/`false`. Blank reads as `false`.
fn de_flag<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "1.0" | "true" => Ok(true),
        "0" | "0.0" | "false" | "" => Ok(false),
        other => Err(de::Error::custom(format!("invalid flag value {other:?}"))),
    }
}

/// Accepts whole numbers written either as integers or as `123.0`.
fn de_count<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    let raw = raw.trim();
    if let Ok(n) = raw.parse::<u64>() {
        return Ok(n);
    }
    match raw.parse::<f64>() {
        Ok(v) if (0.0..u64::MAX as f64).contains(&v) && v.fract() == 0.0 => Ok(v as u64),
        _ => Err(de::Error::custom(format!("invalid count {raw:?}"))),
    }
}
