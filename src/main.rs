//! CLI entry point for the Massachusetts food access dashboard.
//!
//! Loads the tract table once, recomputes the dashboard tables for the
//! filters given on the command line and hands them over as JSON, CSV or
//! GeoJSON.

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use ma_food_access::{
    config::DashboardConfig,
    counties,
    dashboard::{Dashboard, DashboardParams},
    fetch::{
        BasicClient, BoundarySource, CachedBoundaries, FileBoundarySource, HttpBoundarySource,
        fetch_or_degrade, is_remote,
    },
    filter::{FilterSpec, IncomeRange},
    geo::retain_massachusetts,
    output::{print_json, write_csv, write_json},
    rank::RankOrder,
};
use serde::Serialize;
use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use tracing::{info, warn};
use tracing_subscriber::{
    EnvFilter, Layer,
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

#[derive(Parser)]
#[command(name = "ma_food_access")]
#[command(
    about = "Explore food access indicators for Massachusetts census tracts",
    long_about = None
)]
struct Cli {
    /// JSON config file
    #[arg(long, global = true)]
    config: Option<String>,

    /// Tract CSV (plain or .gz); overrides the config and FOOD_ACCESS_DATA
    #[arg(long, global = true)]
    data: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the dashboard tables for a set of filters as JSON
    Summary {
        #[command(flatten)]
        filters: FilterArgs,

        #[command(flatten)]
        rank: RankArgs,

        /// Also include the filtered tract table and scatter points
        #[arg(long, default_value_t = false)]
        full: bool,
    },
    /// Print the tracts with the largest low-income low-access population
    TopTracts {
        #[command(flatten)]
        rank: RankArgs,
    },
    /// Write the filtered tracts, county summary and top tracts as CSV files
    Export {
        #[command(flatten)]
        filters: FilterArgs,

        #[command(flatten)]
        rank: RankArgs,

        /// Directory to write CSV files to
        #[arg(short = 'd', long, default_value = "out")]
        output_dir: PathBuf,
    },
    /// Join the county summary onto county boundaries and write GeoJSON
    Map {
        /// Boundary GeoJSON file or URL; defaults to the configured URL
        #[arg(long, value_name = "FILE_OR_URL")]
        boundaries: Option<String>,

        /// Output GeoJSON path
        #[arg(short, long, default_value = "ma_food_access_map.geojson")]
        output: PathBuf,

        /// Keep boundary features from every state
        #[arg(long, default_value_t = false)]
        all_states: bool,

        /// Write the map without geometry if the boundaries cannot be fetched
        #[arg(long, default_value_t = false)]
        allow_missing_geometry: bool,
    },
    /// List the counties and their region codes
    Counties,
}

#[derive(Args)]
struct FilterArgs {
    /// County to show ("All" for every county)
    #[arg(long)]
    county: Option<String>,

    /// Additional county to compare; may be repeated
    #[arg(long = "compare", value_name = "COUNTY")]
    compare: Vec<String>,

    /// Only urban tracts
    #[arg(long, default_value_t = false)]
    urban_only: bool,

    /// Lower bound of median family income (inclusive)
    #[arg(long)]
    min_income: Option<f64>,

    /// Upper bound of median family income (inclusive)
    #[arg(long)]
    max_income: Option<f64>,
}

#[derive(Args)]
struct RankArgs {
    /// Order of the top tracts table
    #[arg(long, value_enum, default_value_t = OrderArg::Desc)]
    order: OrderArg,

    /// Number of top tracts; defaults to the configured value
    #[arg(short, long)]
    n: Option<usize>,
}

#[derive(Clone, Copy, ValueEnum)]
enum OrderArg {
    Desc,
    Asc,
    Table,
}

impl From<OrderArg> for RankOrder {
    fn from(order: OrderArg) -> Self {
        match order {
            OrderArg::Desc => RankOrder::Descending,
            OrderArg::Asc => RankOrder::Ascending,
            OrderArg::Table => RankOrder::TableOrder,
        }
    }
}

impl FilterArgs {
    fn to_spec(&self) -> Result<FilterSpec> {
        let mut spec = FilterSpec::new()
            .with_compare(self.compare.iter().cloned())
            .with_urban_only(self.urban_only);

        if let Some(county) = &self.county {
            spec = spec.with_county(county.clone());
        }

        if self.min_income.is_some() || self.max_income.is_some() {
            let range = IncomeRange::new(
                self.min_income.unwrap_or(0.0),
                self.max_income.unwrap_or(f64::MAX),
            )?;
            spec = spec.with_income_range(range);
        }

        Ok(spec)
    }
}

impl RankArgs {
    fn to_params(&self, filter: FilterSpec, config: &DashboardConfig) -> DashboardParams {
        DashboardParams {
            filter,
            rank_order: self.order.into(),
            top_n: self.n.unwrap_or(config.top_n),
        }
    }
}

#[derive(Serialize)]
struct CountyEntry {
    county: &'static str,
    region_code: &'static str,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    // Logging setup: colored stderr + JSON rolling log file
    let log_file_path =
        std::env::var("LOG_FILE_PATH").unwrap_or_else(|_| "logs/ma_food_access.log".to_string());
    let log_dir = Path::new(&log_file_path)
        .parent()
        .unwrap_or(Path::new("logs"));
    let log_file_name = Path::new(&log_file_path)
        .file_name()
        .unwrap_or(OsStr::new("ma_food_access.log"));

    let file_appender = tracing_appender::rolling::daily(log_dir, log_file_name);
    let (non_blocking_file, _file_guard) = tracing_appender::non_blocking(file_appender);

    let stderr_layer = fmt::layer()
        .with_target(true)
        .with_span_events(FmtSpan::CLOSE)
        .with_ansi(true)
        .with_writer(std::io::stderr)
        .with_filter(EnvFilter::from_env("RUST_LOG").add_directive("info".parse()?));

    let json_layer = fmt::layer()
        .json()
        .with_current_span(true)
        .with_span_list(true)
        .with_writer(non_blocking_file)
        .with_filter(EnvFilter::from_env("RUST_LOG_JSON").add_directive("debug".parse()?));

    tracing_subscriber::registry()
        .with(stderr_layer)
        .with(json_layer)
        .init();

    let cli = Cli::parse();

    let mut config = DashboardConfig::load(cli.config.as_deref()).context("loading config")?;
    if let Some(data) = cli.data {
        config.data_path = data;
    }

    match cli.command {
        Commands::Summary {
            filters,
            rank,
            full,
        } => {
            let dashboard = load_dashboard(&config)?;
            let params = rank.to_params(filters.to_spec()?, &config);
            let mut view = dashboard.recompute(&params);

            if !full {
                view.tracts.clear();
                view.scatter.clear();
            }

            print_json(&view)?;
        }
        Commands::TopTracts { rank } => {
            let dashboard = load_dashboard(&config)?;
            let params = rank.to_params(FilterSpec::new(), &config);

            print_json(&dashboard.top_tracts(params.top_n, params.rank_order))?;
        }
        Commands::Export {
            filters,
            rank,
            output_dir,
        } => {
            let dashboard = load_dashboard(&config)?;
            let params = rank.to_params(filters.to_spec()?, &config);
            let view = dashboard.recompute(&params);

            write_csv(output_dir.join("tracts.csv"), &view.tracts)?;
            write_csv(output_dir.join("county_summary.csv"), &view.county_summary)?;
            write_csv(output_dir.join("top_tracts.csv"), &view.top_tracts)?;

            info!(output_dir = %output_dir.display(), "Export complete");
        }
        Commands::Map {
            boundaries,
            output,
            all_states,
            allow_missing_geometry,
        } => {
            let dashboard = load_dashboard(&config)?;
            let source = boundaries.unwrap_or_else(|| config.boundary_url.clone());
            let allow_missing = allow_missing_geometry || config.allow_missing_geometry;

            let collection = fetch_boundaries(&source, &config, allow_missing).await?;
            let collection = if all_states {
                collection
            } else {
                collection.map(retain_massachusetts)
            };

            let layer = dashboard.map_layer(collection);
            if !layer.counties_without_geometry.is_empty() {
                warn!(
                    count = layer.counties_without_geometry.len(),
                    "Map written with counties lacking geometry"
                );
            }

            write_json(&output, &layer.collection)?;
        }
        Commands::Counties => {
            let entries: Vec<_> = counties::COUNTIES
                .iter()
                .map(|&(county, region_code)| CountyEntry {
                    county,
                    region_code,
                })
                .collect();

            print_json(&entries)?;
        }
    }

    Ok(())
}

fn load_dashboard(config: &DashboardConfig) -> Result<Dashboard> {
    Dashboard::load(&config.data_path)
        .with_context(|| format!("loading tracts from {}", config.data_path.display()))
}

/// Loads boundaries from a local file path or fetches them over HTTP.
#[tracing::instrument(skip_all, fields(source = %source, allow_missing = allow_missing))]
async fn fetch_boundaries(
    source: &str,
    config: &DashboardConfig,
    allow_missing: bool,
) -> Result<Option<geojson::FeatureCollection>> {
    let boundaries: Box<dyn BoundarySource> = if is_remote(source) {
        let client = BasicClient::new(config.boundary_timeout(), config.connect_timeout())?;
        Box::new(CachedBoundaries::new(HttpBoundarySource {
            client,
            url: source.to_string(),
        }))
    } else {
        Box::new(FileBoundarySource {
            path: PathBuf::from(source),
        })
    };

    fetch_or_degrade(boundaries.as_ref(), allow_missing)
        .await
        .with_context(|| format!("fetching boundaries from {source}"))
}
