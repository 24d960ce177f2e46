//! Runtime configuration.
//!
//! Values are layered: built-in defaults, then an optional JSON file, then
//! environment variables. The binary applies CLI flags on top.
//!
//! ```json
//! {
//!   "data_path": "data/ma_food_access.csv",
//!   "boundary_url": "https://example.org/counties.geojson",
//!   "boundary_timeout_secs": 30,
//!   "allow_missing_geometry": true
//! }
//! ```

use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;
use tracing::debug;

use crate::error::{FoodAccessError, Result};
use crate::rank::DEFAULT_TOP_N;

/// US county boundaries keyed by five-digit FIPS code.
pub const DEFAULT_BOUNDARY_URL: &str =
    "https://raw.githubusercontent.com/plotly/datasets/master/geojson-counties-fips.json";

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct DashboardConfig {
    pub data_path: PathBuf,
    pub boundary_url: String,
    pub boundary_timeout_secs: u64,
    pub connect_timeout_secs: u64,
    pub allow_missing_geometry: bool,
    pub top_n: usize,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            data_path: PathBuf::from("Massachusetts Food Access Data - Sheet1.csv"),
            boundary_url: DEFAULT_BOUNDARY_URL.to_string(),
            boundary_timeout_secs: 30,
            connect_timeout_secs: 10,
            allow_missing_geometry: false,
            top_n: DEFAULT_TOP_N,
        }
    }
}

impl DashboardConfig {
    /// Loads the config from an optional JSON file, then applies environment
    /// overrides.
    pub fn load(path: Option<&str>) -> Result<Self> {
        let mut config = match path {
            Some(path) => {
                let content = std::fs::read_to_string(path)?;
                serde_json::from_str(&content)?
            }
            None => Self::default(),
        };
        config.apply_env(|key| std::env::var(key).ok())?;
        debug!(?config, "Configuration loaded");
        Ok(config)
    }

    /// Applies overrides read through `lookup`, normally `std::env::var`.
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(v) = lookup("FOOD_ACCESS_DATA") {
            self.data_path = PathBuf::from(v);
        }
        if let Some(v) = lookup("BOUNDARY_URL") {
            self.boundary_url = v;
        }
        if let Some(v) = lookup("BOUNDARY_TIMEOUT_SECS") {
            self.boundary_timeout_secs = v.trim().parse().map_err(|_| {
                FoodAccessError::InvalidParameter(format!("BOUNDARY_TIMEOUT_SECS={v:?}"))
            })?;
        }
        if let Some(v) = lookup("ALLOW_MISSING_GEOMETRY") {
            self.allow_missing_geometry = parse_bool(&v).ok_or_else(|| {
                FoodAccessError::InvalidParameter(format!("ALLOW_MISSING_GEOMETRY={v:?}"))
            })?;
        }
        Ok(())
    }

    pub fn boundary_timeout(&self) -> Duration {
        Duration::from_secs(self.boundary_timeout_secs)
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
