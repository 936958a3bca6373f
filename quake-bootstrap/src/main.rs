use std::path::PathBuf;

use anyhow::{anyhow, bail, Result};
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use clap::Parser;

use quake_application::queries::ExportRequest;
use quake_domain::{
    BoundingBox, EnrichmentOptions, FilterParams, ProductSelection, SearchRadius,
};
use quake_infrastructure::OutputFormat;

#[derive(Parser, Debug)]
#[command(name = "quakecat")]
#[command(about = "Earthquake catalog export tool", long_about = None)]
struct Args {
    /// Output file; format inferred from the extension unless -f is given
    output: Option<PathBuf>,

    /// Limit to events on or after this time (RFC3339 or YYYY-MM-DD, UTC)
    #[arg(short = 's', long)]
    start_time: Option<String>,

    /// Limit to events before this time
    #[arg(short = 'e', long)]
    end_time: Option<String>,

    /// Limit to events updated after this time
    #[arg(long)]
    updated_after: Option<String>,

    /// Bounding box search
    #[arg(short = 'b', long, num_args = 4, value_names = ["LONMIN", "LONMAX", "LATMIN", "LATMAX"], allow_negative_numbers = true)]
    bounds: Option<Vec<f64>>,

    /// Radius search around a point
    #[arg(short = 'r', long, num_args = 3, value_names = ["LAT", "LON", "KM"], allow_negative_numbers = true)]
    radius: Option<Vec<f64>>,

    /// Magnitude range (both bounds required)
    #[arg(short = 'm', long, num_args = 2, value_names = ["MIN", "MAX"], allow_negative_numbers = true)]
    magnitudes: Option<Vec<f64>>,

    /// Restrict to a source catalog, e.g. "nc"
    #[arg(short = 'c', long)]
    catalog: Option<String>,

    /// Restrict to a contributor
    #[arg(long)]
    contributor: Option<String>,

    /// Restrict to events carrying this product type
    #[arg(long)]
    product_type: Option<String>,

    /// Add moment-tensor component columns: none, preferred or all
    #[arg(long, default_value = "none")]
    moment_components: String,

    /// Add focal-mechanism angle columns: none, preferred or all
    #[arg(long, default_value = "none")]
    focal_angles: String,

    /// Add supplemental moment-tensor columns (scalar moment, derived origin)
    #[arg(long)]
    supplement: bool,

    /// Add one magnitude column per contributed origin
    #[arg(long)]
    all_magnitudes: bool,

    /// Output format: csv or tsv
    #[arg(short = 'f', long)]
    format: Option<String>,

    /// Print the matching event count and exit without fetching
    #[arg(long)]
    count: bool,

    /// Path to config file
    #[arg(long)]
    config: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();
    if let Some(config) = &args.config {
        std::env::set_var("QUAKECAT_CONFIG", config);
    }

    let options = quake_bootstrap::RunOptions {
        request: build_request(&args)?,
        output: args.output.clone(),
        format: args.format.as_deref().map(parse_format).transpose()?,
        count_only: args.count,
    };
    quake_bootstrap::run(options).await
}

fn build_request(args: &Args) -> Result<ExportRequest> {
    let (min_magnitude, max_magnitude) = match args.magnitudes.as_deref() {
        Some([min, max]) => (Some(*min), Some(*max)),
        Some(_) => bail!("-m expects exactly two values"),
        None => (None, None),
    };

    let bounds = match args.bounds.as_deref() {
        Some([lon_min, lon_max, lat_min, lat_max]) => Some(BoundingBox {
            lon_min: *lon_min,
            lon_max: *lon_max,
            lat_min: *lat_min,
            lat_max: *lat_max,
        }),
        Some(_) => bail!("-b expects exactly four values"),
        None => None,
    };

    let radius = match args.radius.as_deref() {
        Some([latitude, longitude, max_radius_km]) => Some(SearchRadius {
            latitude: *latitude,
            longitude: *longitude,
            max_radius_km: *max_radius_km,
        }),
        Some(_) => bail!("-r expects exactly three values"),
        None => None,
    };

    Ok(ExportRequest {
        params: FilterParams {
            start_time: args.start_time.as_deref().map(parse_time).transpose()?,
            end_time: args.end_time.as_deref().map(parse_time).transpose()?,
            updated_after: args.updated_after.as_deref().map(parse_time).transpose()?,
            bounds,
            radius,
            min_magnitude,
            max_magnitude,
            catalog: args.catalog.clone(),
            contributor: args.contributor.clone(),
            product_type: args.product_type.clone(),
        },
        enrichment: EnrichmentOptions {
            moment_tensor: parse_selection(&args.moment_components)?,
            focal_mechanism: parse_selection(&args.focal_angles)?,
            include_supplement: args.supplement,
            include_all_magnitudes: args.all_magnitudes,
        },
    })
}

/// Accepts RFC3339 or the shorter date/date-time forms people actually
/// type; everything is read as UTC.
fn parse_time(value: &str) -> Result<DateTime<Utc>> {
    if let Ok(time) = DateTime::parse_from_rfc3339(value) {
        return Ok(time.with_timezone(&Utc));
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S") {
        return Ok(naive.and_utc());
    }
    if let Ok(date) = NaiveDate::parse_from_str(value, "%Y-%m-%d") {
        if let Some(naive) = date.and_hms_opt(0, 0, 0) {
            return Ok(naive.and_utc());
        }
    }
    Err(anyhow!("unrecognized time: {value:?}"))
}

fn parse_selection(value: &str) -> Result<ProductSelection> {
    match value.trim().to_ascii_lowercase().as_str() {
        "none" => Ok(ProductSelection::None),
        "preferred" => Ok(ProductSelection::Preferred),
        "all" => Ok(ProductSelection::All),
        other => Err(anyhow!(
            "expected none, preferred or all, got {other:?}"
        )),
    }
}

fn parse_format(value: &str) -> Result<OutputFormat> {
    match value.trim().to_ascii_lowercase().as_str() {
        "csv" => Ok(OutputFormat::Csv),
        "tsv" => Ok(OutputFormat::Tsv),
        other => Err(anyhow!("expected csv or tsv, got {other:?}")),
    }
}
