//! Loads the tract table from a CSV file.
//!
//! Files ending in `.gz` are decompressed on the fly. Any unreadable file or
//! malformed row fails the whole load; there is no partial table.

use flate2::read::GzDecoder;
use std::fs::File;
use std::io::Read;
use std::path::Path;
use tracing::{info, warn};

use crate::counties;
use crate::derive::derive_table;
use crate::error::Result;
use crate::model::{RawTract, Tract};

/// Reads and derives the full tract table from `path`.
#[tracing::instrument(skip(path), fields(path = %path.as_ref().display()))]
pub fn load_tracts(path: impl AsRef<Path>) -> Result<Vec<Tract>> {
    let path = path.as_ref();
    let file = File::open(path)?;

    let reader: Box<dyn Read> = if path.extension().and_then(|e| e.to_str()) == Some("gz") {
        Box::new(GzDecoder::new(file))
    } else {
        Box::new(file)
    };

    let raw = read_rows(reader)?;
    let tracts = derive_table(raw);

    let unresolved = tracts
        .iter()
        .filter(|t| !counties::is_known(&t.county))
        .count();
    if unresolved > 0 {
        warn!(unresolved, "Tracts with a county outside the lookup table");
    }

    info!(rows = tracts.len(), "Tract table loaded");
    Ok(tracts)
}

/// Deserializes raw rows from any CSV reader.
pub fn read_rows<R: Read>(reader: R) -> Result<Vec<RawTract>> {
    let mut rdr = csv::Reader::from_reader(reader);
    let mut rows = Vec::new();

    for result in rdr.deserialize() {
        let record: RawTract = result?;
        rows.push(record);
    }

    Ok(rows)
}
