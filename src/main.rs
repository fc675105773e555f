//! CLI entry point for the chartprep transform toolkit.
//!
//! Provides one subcommand per dashboard workflow: employee cleaning,
//! sensor series smoothing, boxplot statistics, case-count aggregation,
//! trend summaries, and embedded sample datasets.

use anyhow::{Context, Result, bail};
use chartprep::clean::{clean_employees, read_employees};
use chartprep::epi::{self, CaseMode};
use chartprep::ingest::read_table;
use chartprep::output::{append_record, print_json};
use chartprep::samples::SampleDataset;
use chartprep::sensors::{AlertCount, SensorTable};
use chartprep::stats::{boxplot_by_group, boxplot_stats, column_sample};
use chartprep::trend::{labelled_series, trend_summary};
use clap::{Parser, Subcommand};
use serde::Serialize;
use std::ffi::OsStr;
use std::fs::File;
use std::path::Path;
use tracing::{info, warn};
use tracing_subscriber::{
    EnvFilter, Layer,
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

#[derive(Parser)]
#[command(name = "chartprep")]
#[command(about = "Transforms tabular datasets into chart-ready records", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate and deduplicate an employee roster CSV
    Clean {
        /// Path to the employee CSV
        #[arg(value_name = "FILE")]
        file: String,

        /// CSV file to append cleaned rows to; omit for JSON on stdout
        #[arg(short, long)]
        output: Option<String>,
    },
    /// Extract sensor series from a wide-format CSV, optionally smoothed
    Sensors {
        /// Path to the sensor CSV (timestamp column + sensor columns)
        #[arg(value_name = "FILE")]
        file: String,

        /// Trailing moving-average window (1 = no smoothing)
        #[arg(short, long, default_value_t = 1)]
        window: usize,

        /// Count readings strictly below this bound
        #[arg(long)]
        low: Option<f64>,

        /// Count readings strictly above this bound
        #[arg(long)]
        high: Option<f64>,
    },
    /// Five-number boxplot summary of a numeric column
    Boxplot {
        /// Path to the CSV
        #[arg(value_name = "FILE")]
        file: String,

        /// Column holding the sample values
        #[arg(short, long)]
        value: String,

        /// Group rows by this column and summarize each group
        #[arg(short, long)]
        group_by: Option<String>,
    },
    /// Aggregate case counts for one location into a dated series
    Epi {
        /// Path to the case-count CSV
        #[arg(value_name = "FILE")]
        file: String,

        /// Location to filter to; defaults to the first one found
        #[arg(short, long)]
        location: Option<String>,

        /// Whether confirmed counts are daily incidence or already cumulative
        #[arg(short, long, default_value = "daily")]
        mode: CaseMode,

        /// Moving-average window over new cases
        #[arg(short, long, default_value_t = 7)]
        window: usize,

        /// CSV file to append the series to; the report always goes to stdout
        #[arg(short, long)]
        output: Option<String>,
    },
    /// Summarize a labelled numeric series (totals, peak, trough, change)
    Trend {
        /// Path to the CSV
        #[arg(value_name = "FILE")]
        file: String,

        /// Label column; defaults to the first column
        #[arg(short, long)]
        label: Option<String>,

        /// Value column; defaults to the second column
        #[arg(short, long)]
        value: Option<String>,

        /// Trailing moving-average window
        #[arg(short, long, default_value_t = 3)]
        window: usize,
    },
    /// Write one of the embedded sample datasets to a CSV file
    Sample {
        /// Which dataset: sensors, epi, or employees
        #[arg(value_name = "DATASET")]
        dataset: SampleDataset,

        /// Destination path; defaults to the dataset's conventional name
        #[arg(short, long)]
        output: Option<String>,
    },
}

/// Sensor series plus any threshold violations, as one JSON document.
#[derive(Serialize)]
struct SensorReport {
    table: SensorTable,
    alerts: Vec<AlertCount>,
}

fn main() -> Result<()> {
    dotenvy::dotenv().ok(); // Load .env file

    // Logging setup: colored stderr + JSON rolling log file
    let log_file_path =
        std::env::var("LOG_FILE_PATH").unwrap_or_else(|_| "logs/chartprep.log".to_string());
    let log_dir = Path::new(&log_file_path)
        .parent()
        .unwrap_or(Path::new("logs"));
    let log_file_name = Path::new(&log_file_path)
        .file_name()
        .unwrap_or(OsStr::new("chartprep.log"));

    let file_appender = tracing_appender::rolling::daily(log_dir, log_file_name);
    let (non_blocking_file, _file_guard) = tracing_appender::non_blocking(file_appender);

    let stderr_layer = fmt::layer()
        .with_target(true)
        .with_span_events(FmtSpan::CLOSE)
        .with_ansi(true)
        .with_writer(std::io::stderr)
        .with_filter(EnvFilter::from_env("RUST_LOG").add_directive("info".parse().unwrap()));

    let json_layer = fmt::layer()
        .json()
        .with_current_span(true)
        .with_span_list(true)
        .with_writer(non_blocking_file)
        .with_filter(EnvFilter::from_env("RUST_LOG_JSON").add_directive("debug".parse().unwrap()));

    tracing_subscriber::registry()
        .with(stderr_layer)
        .with(json_layer)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Clean { file, output } => {
            let raw = read_employees(open(&file)?)?;
            let (cleaned, report) = clean_employees(&raw);

            info!(
                input_rows = report.input_rows,
                output_rows = report.output_rows,
                duplicate_id = report.duplicate_id,
                bad_phone = report.bad_phone,
                bad_salary = report.bad_salary,
                bad_experience = report.bad_experience,
                "Cleaning complete"
            );

            match output {
                Some(path) => {
                    for employee in &cleaned {
                        append_record(&path, employee)?;
                    }
                    info!(path = %path, rows = cleaned.len(), "Cleaned rows written");
                }
                None => print_json(&cleaned)?,
            }
        }
        Commands::Sensors {
            file,
            window,
            low,
            high,
        } => {
            let table = read_table(open(&file)?)?;
            warn_skipped(table.skipped);

            let sensors = SensorTable::from_table(&table)?.smoothed(window)?;
            let alerts = if low.is_some() || high.is_some() {
                sensors.scan_alerts(low, high)
            } else {
                Vec::new()
            };

            info!(
                rows = sensors.timestamps.len(),
                sensors = sensors.sensors.len(),
                window,
                "Sensor table ready"
            );
            print_json(&SensorReport {
                table: sensors,
                alerts,
            })?;
        }
        Commands::Boxplot {
            file,
            value,
            group_by,
        } => {
            let table = read_table(open(&file)?)?;
            warn_skipped(table.skipped);

            match group_by {
                Some(group) => {
                    let groups = boxplot_by_group(&table, &group, &value)?;
                    info!(groups = groups.len(), "Boxplot statistics computed");
                    print_json(&groups)?;
                }
                None => {
                    let sample = column_sample(&table, &value)?;
                    let stats = boxplot_stats(&sample)?;
                    info!(sample_size = sample.len(), "Boxplot statistics computed");
                    print_json(&stats)?;
                }
            }
        }
        Commands::Epi {
            file,
            location,
            mode,
            window,
            output,
        } => {
            let table = read_table(open(&file)?)?;
            warn_skipped(table.skipped);

            let (rows, bad_dates) = epi::normalize(&table);
            if rows.is_empty() {
                bail!("no valid rows after parsing; check CSV headers and date formats");
            }
            let locations = epi::locations(&rows);
            info!(
                rows = rows.len(),
                bad_dates,
                locations = locations.len(),
                "Case rows loaded"
            );

            let location = match location {
                Some(loc) => loc,
                None => {
                    let first = locations[0].clone();
                    info!(location = %first, "No location given, using the first one");
                    first
                }
            };

            let report = epi::aggregate(&rows, &location, mode, window)?;
            print_json(&report)?;

            if let Some(path) = output {
                for point in &report.series {
                    append_record(&path, point)?;
                }
                info!(path = %path, rows = report.series.len(), "Series written");
            }
        }
        Commands::Trend {
            file,
            label,
            value,
            window,
        } => {
            let table = read_table(open(&file)?)?;
            warn_skipped(table.skipped);

            let label_col = match label {
                Some(l) => l,
                None => default_column(&table.headers, 0)?,
            };
            let value_col = match value {
                Some(v) => v,
                None => default_column(&table.headers, 1)?,
            };

            let (points, skipped) = labelled_series(&table, &label_col, &value_col)?;
            if skipped > 0 {
                warn!(skipped, column = %value_col, "Rows without a numeric value ignored");
            }

            let summary = trend_summary(&points, window)?;
            info!(points = points.len(), window, "Trend summary computed");
            print_json(&summary)?;
        }
        Commands::Sample { dataset, output } => {
            let path = output.unwrap_or_else(|| dataset.file_name().to_string());
            std::fs::write(&path, dataset.csv())
                .with_context(|| format!("writing sample to {path}"))?;
            info!(path = %path, "Sample dataset written");
        }
    }

    Ok(())
}

fn open(path: &str) -> Result<File> {
    File::open(path).with_context(|| format!("opening {path}"))
}

fn warn_skipped(skipped: usize) {
    if skipped > 0 {
        warn!(skipped, "Unreadable rows skipped during ingestion");
    }
}

fn default_column(headers: &[String], index: usize) -> Result<String> {
    headers
        .get(index)
        .cloned()
        .ok_or_else(|| anyhow::anyhow!("file has no column at position {index}"))
}
