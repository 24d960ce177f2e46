//! Output formatting and persistence for the presentation tables.
//!
//! Supports JSON and CSV. Paths ending in `.gz` are gzip-compressed.

use csv::WriterBuilder;
use flate2::Compression;
use flate2::write::GzEncoder;
use serde::Serialize;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;
use tracing::{debug, info};

use crate::aggregate::CountySummaryRow;
use crate::error::Result;
use crate::model::{RankedTract, Tract};

/// A row type written by [`write_csv`].
///
/// `HEADERS` must list the serialized field names in declaration order; it
/// is written on its own when the table is empty.
pub trait CsvTable: Serialize {
    const HEADERS: &'static [&'static str];
}

impl CsvTable for Tract {
    const HEADERS: &'static [&'static str] = &[
        "tract_id",
        "county",
        "is_urban",
        "population",
        "poverty_rate",
        "median_family_income",
        "households_no_vehicle_count",
        "total_occupied_households",
        "lila",
        "low_access_population",
        "pct_households_no_vehicle",
    ];
}

impl CsvTable for CountySummaryRow {
    const HEADERS: &'static [&'static str] = &[
        "county",
        "region_code",
        "tract_count",
        "lila_count",
        "percent_lila_tracts",
        "mean_poverty_rate",
        "mean_median_income",
        "mean_pct_no_vehicle",
    ];
}

impl CsvTable for RankedTract {
    const HEADERS: &'static [&'static str] = &["tract_id", "county", "low_access_population"];
}

/// Writes `value` as pretty-printed JSON followed by a newline.
pub fn write_json_to<W: Write>(mut writer: W, value: &impl Serialize) -> Result<()> {
    serde_json::to_writer_pretty(&mut writer, value)?;
    writeln!(writer)?;
    writer.flush()?;
    Ok(())
}

/// Prints `value` as pretty-printed JSON on stdout.
pub fn print_json(value: &impl Serialize) -> Result<()> {
    write_json_to(std::io::stdout().lock(), value)
}

/// Writes `value` as JSON to `path`, replacing any existing file.
pub fn write_json(path: impl AsRef<Path>, value: &impl Serialize) -> Result<()> {
    let path = path.as_ref();
    let mut out = OutputFile::create(path)?;
    write_json_to(&mut out, value)?;
    out.finish()?;
    info!(path = %path.display(), "JSON written");
    Ok(())
}

/// Writes `rows` as a CSV file with a header row, replacing any existing file.
///
/// An empty table is written as the header row alone.
pub fn write_csv<T: CsvTable>(path: impl AsRef<Path>, rows: &[T]) -> Result<()> {
    let path = path.as_ref();
    debug!(path = %path.display(), rows = rows.len(), "Writing CSV");

    let mut writer = WriterBuilder::new()
        .has_headers(true)
        .from_writer(OutputFile::create(path)?);

    if rows.is_empty() {
        writer.write_record(T::HEADERS)?;
    }
    for row in rows {
        writer.serialize(row)?;
    }

    let out = writer.into_inner().map_err(|e| e.into_error())?;
    out.finish()?;

    info!(path = %path.display(), rows = rows.len(), "CSV written");
    Ok(())
}

/// A plain or gzip-compressed output file.
///
/// [`OutputFile::finish`] must be called so that write errors, including the
/// gzip trailer, are reported.
enum OutputFile {
    Plain(BufWriter<File>),
    Gzip(GzEncoder<BufWriter<File>>),
}

impl OutputFile {
    fn create(path: &Path) -> io::Result<Self> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }

        let file = BufWriter::new(File::create(path)?);
        if path.extension().and_then(|e| e.to_str()) == Some("gz") {
            Ok(Self::Gzip(GzEncoder::new(file, Compression::default())))
        } else {
            Ok(Self::Plain(file))
        }
    }

    fn finish(self) -> io::Result<()> {
        let mut file = match self {
            Self::Plain(file) => file,
            Self::Gzip(encoder) => encoder.finish()?,
        };
        file.flush()?;
        file.into_inner().map_err(|e| e.into_error())?.sync_all()
    }
}

impl Write for OutputFile {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        match self {
            Self::Plain(file) => file.write(buf),
            Self::Gzip(encoder) => encoder.write(buf),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        match self {
            Self::Plain(file) => file.flush(),
            Self::Gzip(encoder) => encoder.flush(),
        }
    }
}
