//! Error types for the food access pipeline.

use thiserror::Error;

/// Errors that can occur while loading data or fetching boundaries.
///
/// Empty filter results, unmapped counties and missing optional fields are
/// not errors; they produce empty or placeholder outputs instead.
#[derive(Debug, Error)]
pub enum FoodAccessError {
    /// The source file could not be opened or read.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A CSV row could not be parsed into a tract record.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// JSON serialization or parsing failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// The boundary payload was not a usable GeoJSON feature collection.
    #[error("GeoJSON error: {0}")]
    GeoJson(#[from] geojson::Error),

    /// The boundary request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The boundary source answered with a non-success status.
    #[error("boundary request to {url} failed with status {status}")]
    BoundaryStatus { url: String, status: u16 },

    /// A parameter handed in from the UI layer is unusable.
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),
}

pub type Result<T, E = FoodAccessError> = std::result::Result<T, E>;
