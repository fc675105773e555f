//! Case-count aggregation for the epidemiological dashboard.
//!
//! Rows arrive with arbitrary headers; roles are resolved through the
//! ingest rule table and rows with unparseable dates are skipped, not
//! fatal. Aggregation is a pure function of the normalized rows plus the
//! selected location and input mode.

use std::collections::BTreeMap;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::Serialize;
use tracing::debug;

use crate::error::Result;
use crate::ingest::{ColumnRole, Table, infer_roles, parse_date};
use crate::smooth::{moving_average, round_to};
use crate::stats::pct;

/// How the `confirmed` column is to be read. The source data does not say
/// whether counts are daily incidence or a running total, and the two
/// interpretations double-count each other, so the caller must choose.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CaseMode {
    /// Each date's confirmed value is that day's new cases.
    Daily,
    /// Confirmed values are already accumulated; new cases are successive
    /// differences, clamped at zero when the series dips.
    Cumulative,
}

impl FromStr for CaseMode {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "daily" => Ok(CaseMode::Daily),
            "cumulative" => Ok(CaseMode::Cumulative),
            other => Err(format!("unknown case mode '{other}' (daily|cumulative)")),
        }
    }
}

/// One normalized input row.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CaseRow {
    pub date: NaiveDate,
    pub location: String,
    pub confirmed: f64,
    pub recovered: f64,
    pub deaths: f64,
}

/// Maps a generic table onto [`CaseRow`]s using role inference with the
/// positional fallbacks (column 0 = date, column 1 = location, column 2 =
/// metric). Returns the rows plus the count of rows dropped for bad dates.
pub fn normalize(table: &Table) -> (Vec<CaseRow>, usize) {
    let width = table.headers.len();
    let roles = infer_roles(&table.headers);

    let date_idx = roles.get_or_position(ColumnRole::Timestamp, 0, width);
    let loc_idx = roles
        .get(ColumnRole::Location)
        .or((width > 1).then_some(1))
        .or((width > 0).then_some(0));
    let confirmed_idx = roles.get_or_position(ColumnRole::Confirmed, 2, width);
    let recovered_idx = roles.get(ColumnRole::Recovered);
    let deaths_idx = roles.get(ColumnRole::Deaths);

    let mut rows = Vec::new();
    let mut skipped = 0usize;

    for cells in &table.rows {
        let raw_date = date_idx.map(|i| cells[i].label()).unwrap_or_default();
        let Some(date) = parse_date(&raw_date) else {
            debug!(raw = %raw_date, "Skipping row with unparseable date");
            skipped += 1;
            continue;
        };

        let location = loc_idx
            .map(|i| cells[i].label())
            .filter(|l| !l.is_empty())
            .unwrap_or_else(|| "Unknown".to_string());

        let metric = |idx: Option<usize>| {
            idx.and_then(|i| cells[i].as_f64()).unwrap_or(0.0)
        };

        rows.push(CaseRow {
            date,
            location,
            confirmed: metric(confirmed_idx),
            recovered: metric(recovered_idx),
            deaths: metric(deaths_idx),
        });
    }

    (rows, skipped)
}

/// Sorted distinct locations, for the host view's selector.
pub fn locations(rows: &[CaseRow]) -> Vec<String> {
    let mut locs: Vec<String> = rows.iter().map(|r| r.location.clone()).collect();
    locs.sort();
    locs.dedup();
    locs
}

/// One date in the aggregated, location-filtered series.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DailyPoint {
    pub date: NaiveDate,
    pub new_cases: f64,
    pub cumulative: f64,
    pub recovered: f64,
    pub deaths: f64,
    pub moving_avg: f64,
}

/// Derived totals and rates for the filtered series.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EpiSummary {
    pub total_confirmed: f64,
    pub new_confirmed: f64,
    pub total_recovered: f64,
    pub total_deaths: f64,
    pub active: f64,
    pub cfr_percent: f64,
    pub recovery_rate_percent: f64,
    pub latest_date: Option<NaiveDate>,
    pub latest_new_cases: Option<f64>,
}

/// Full aggregation result for one location.
#[derive(Debug, Serialize)]
pub struct EpiReport {
    pub location: String,
    pub mode: CaseMode,
    pub series: Vec<DailyPoint>,
    pub summary: EpiSummary,
}

/// Filters to one location, sums metrics per date, sorts dates ascending,
/// derives new/cumulative cases per `mode`, and overlays a trailing moving
/// average (2-decimal rounding) over the new-case counts.
///
/// The cumulative sequence is non-decreasing for any input: in daily mode
/// it is a running sum of the per-date values, in cumulative mode it is
/// rebuilt from the clamped successive differences.
///
/// # Errors
///
/// Returns [`crate::error::TransformError::InvalidWindow`] when `ma_window`
/// is 0. An unknown location is not an error; it yields an empty series
/// and zeroed totals.
pub fn aggregate(
    rows: &[CaseRow],
    location: &str,
    mode: CaseMode,
    ma_window: usize,
) -> Result<EpiReport> {
    // BTreeMap keeps the dates sorted ascending.
    let mut by_date: BTreeMap<NaiveDate, (f64, f64, f64)> = BTreeMap::new();
    for row in rows.iter().filter(|r| r.location == location) {
        let entry = by_date.entry(row.date).or_insert((0.0, 0.0, 0.0));
        entry.0 += row.confirmed;
        entry.1 += row.recovered;
        entry.2 += row.deaths;
    }

    let mut series = Vec::with_capacity(by_date.len());
    let mut cumulative = 0.0;
    let mut previous = 0.0;
    for (i, (date, (confirmed, recovered, deaths))) in by_date.into_iter().enumerate() {
        let new_cases = match mode {
            CaseMode::Daily => confirmed,
            CaseMode::Cumulative if i == 0 => confirmed,
            CaseMode::Cumulative => (confirmed - previous).max(0.0),
        };
        previous = confirmed;
        cumulative += new_cases;

        series.push(DailyPoint {
            date,
            new_cases,
            cumulative,
            recovered,
            deaths,
            moving_avg: 0.0,
        });
    }

    let new_values: Vec<f64> = series.iter().map(|p| p.new_cases).collect();
    let smoothed = moving_average(&new_values, ma_window, 2)?;
    for (point, avg) in series.iter_mut().zip(smoothed) {
        point.moving_avg = avg;
    }

    let new_confirmed: f64 = series.iter().map(|p| p.new_cases).sum();
    let total_recovered: f64 = series.iter().map(|p| p.recovered).sum();
    let total_deaths: f64 = series.iter().map(|p| p.deaths).sum();
    let total_confirmed = series.last().map(|p| p.cumulative).unwrap_or(0.0);

    let summary = EpiSummary {
        total_confirmed,
        new_confirmed,
        total_recovered,
        total_deaths,
        active: total_confirmed - total_recovered - total_deaths,
        cfr_percent: round_to(pct(total_deaths, new_confirmed), 2),
        recovery_rate_percent: round_to(pct(total_recovered, new_confirmed), 2),
        latest_date: series.last().map(|p| p.date),
        latest_new_cases: series.last().map(|p| p.new_cases),
    };

    Ok(EpiReport {
        location: location.to_string(),
        mode,
        series,
        summary,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ingest::read_table;

    fn date(s: &str) -> NaiveDate {
        s.parse().unwrap()
    }

    fn row(d: &str, loc: &str, confirmed: f64, recovered: f64, deaths: f64) -> CaseRow {
        CaseRow {
            date: date(d),
            location: loc.to_string(),
            confirmed,
            recovered,
            deaths,
        }
    }

    #[test]
    fn test_daily_mode_cumulative_running_sum() {
        let rows = vec![
            row("2025-08-01", "CityA", 10.0, 0.0, 0.0),
            row("2025-08-02", "CityA", 12.0, 1.0, 0.0),
            row("2025-08-03", "CityA", 15.0, 2.0, 0.0),
        ];
        let report = aggregate(&rows, "CityA", CaseMode::Daily, 7).unwrap();
        let cumulative: Vec<f64> = report.series.iter().map(|p| p.cumulative).collect();
        assert_eq!(cumulative, vec![10.0, 22.0, 37.0]);
        assert_eq!(report.summary.total_confirmed, 37.0);
        assert_eq!(report.summary.cfr_percent, 0.0);
        assert_eq!(report.summary.active, 37.0 - 3.0);
    }

    #[test]
    fn test_cumulative_mode_diffs() {
        let rows = vec![
            row("2025-08-01", "CityA", 10.0, 0.0, 0.0),
            row("2025-08-02", "CityA", 22.0, 1.0, 0.0),
            row("2025-08-03", "CityA", 37.0, 2.0, 0.0),
        ];
        let report = aggregate(&rows, "CityA", CaseMode::Cumulative, 7).unwrap();
        let new_cases: Vec<f64> = report.series.iter().map(|p| p.new_cases).collect();
        assert_eq!(new_cases, vec![10.0, 12.0, 15.0]);
        assert_eq!(report.summary.total_confirmed, 37.0);
        assert_eq!(report.summary.new_confirmed, 37.0);
    }

    #[test]
    fn test_cumulative_mode_clamps_dips() {
        let rows = vec![
            row("2025-08-01", "CityA", 10.0, 0.0, 0.0),
            row("2025-08-02", "CityA", 8.0, 0.0, 0.0), // correction in source data
            row("2025-08-03", "CityA", 12.0, 0.0, 0.0),
        ];
        let report = aggregate(&rows, "CityA", CaseMode::Cumulative, 7).unwrap();
        let new_cases: Vec<f64> = report.series.iter().map(|p| p.new_cases).collect();
        assert_eq!(new_cases, vec![10.0, 0.0, 4.0]);
        let cumulative: Vec<f64> = report.series.iter().map(|p| p.cumulative).collect();
        assert!(cumulative.windows(2).all(|w| w[0] <= w[1]));
    }

    #[test]
    fn test_multiple_rows_per_date_are_summed() {
        let rows = vec![
            row("2025-08-01", "CityA", 4.0, 0.0, 0.0),
            row("2025-08-01", "CityA", 6.0, 1.0, 1.0),
            row("2025-08-02", "CityA", 12.0, 0.0, 0.0),
        ];
        let report = aggregate(&rows, "CityA", CaseMode::Daily, 7).unwrap();
        assert_eq!(report.series.len(), 2);
        assert_eq!(report.series[0].new_cases, 10.0);
        assert_eq!(report.series[0].recovered, 1.0);
        assert_eq!(report.series[0].deaths, 1.0);
    }

    #[test]
    fn test_location_filter() {
        let rows = vec![
            row("2025-08-01", "CityA", 10.0, 0.0, 0.0),
            row("2025-08-01", "CityB", 99.0, 0.0, 0.0),
        ];
        let report = aggregate(&rows, "CityA", CaseMode::Daily, 7).unwrap();
        assert_eq!(report.summary.total_confirmed, 10.0);
    }

    #[test]
    fn test_unknown_location_yields_empty_report() {
        let rows = vec![row("2025-08-01", "CityA", 10.0, 0.0, 0.0)];
        let report = aggregate(&rows, "Nowhere", CaseMode::Daily, 7).unwrap();
        assert!(report.series.is_empty());
        assert_eq!(report.summary.total_confirmed, 0.0);
        assert_eq!(report.summary.cfr_percent, 0.0);
        assert_eq!(report.summary.latest_date, None);
    }

    #[test]
    fn test_dates_sorted_even_when_input_is_not() {
        let rows = vec![
            row("2025-08-03", "CityA", 15.0, 0.0, 0.0),
            row("2025-08-01", "CityA", 10.0, 0.0, 0.0),
            row("2025-08-02", "CityA", 12.0, 0.0, 0.0),
        ];
        let report = aggregate(&rows, "CityA", CaseMode::Daily, 7).unwrap();
        let dates: Vec<NaiveDate> = report.series.iter().map(|p| p.date).collect();
        assert_eq!(
            dates,
            vec![date("2025-08-01"), date("2025-08-02"), date("2025-08-03")]
        );
    }

    #[test]
    fn test_rates() {
        let rows = vec![
            row("2025-08-01", "CityA", 100.0, 30.0, 3.0),
            row("2025-08-02", "CityA", 100.0, 30.0, 3.0),
        ];
        let report = aggregate(&rows, "CityA", CaseMode::Daily, 7).unwrap();
        assert_eq!(report.summary.cfr_percent, 3.0);
        assert_eq!(report.summary.recovery_rate_percent, 30.0);
        assert_eq!(report.summary.active, 200.0 - 60.0 - 6.0);
    }

    #[test]
    fn test_moving_average_window_applied() {
        let rows = vec![
            row("2025-08-01", "CityA", 10.0, 0.0, 0.0),
            row("2025-08-02", "CityA", 20.0, 0.0, 0.0),
            row("2025-08-03", "CityA", 30.0, 0.0, 0.0),
        ];
        let report = aggregate(&rows, "CityA", CaseMode::Daily, 2).unwrap();
        let ma: Vec<f64> = report.series.iter().map(|p| p.moving_avg).collect();
        assert_eq!(ma, vec![10.0, 15.0, 25.0]);
    }

    #[test]
    fn test_normalize_with_role_headers() {
        let csv = "\
Date,Location,Confirmed,Recovered,Deaths
2025-08-01,CityA,10,0,0
bad-date,CityA,99,0,0
2025-08-02,CityA,12,1,0
";
        let table = read_table(csv.as_bytes()).unwrap();
        let (rows, skipped) = normalize(&table);
        assert_eq!(rows.len(), 2);
        assert_eq!(skipped, 1);
        assert_eq!(rows[0].confirmed, 10.0);
        assert_eq!(rows[1].recovered, 1.0);
    }

    #[test]
    fn test_normalize_positional_fallback() {
        // No header matches any rule: col 0 = date key, col 1 = location,
        // col 2 = metric, no recovered/deaths columns.
        let csv = "\
k,city,n
2025-08-01,CityA,5
2025-08-02,CityA,7
";
        let table = read_table(csv.as_bytes()).unwrap();
        let (rows, skipped) = normalize(&table);
        assert_eq!(skipped, 0);
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].location, "CityA");
        assert_eq!(rows[0].confirmed, 5.0);
        assert_eq!(rows[0].recovered, 0.0);
        assert_eq!(rows[0].deaths, 0.0);
    }

    #[test]
    fn test_normalize_blank_location_is_unknown() {
        let csv = "Date,Location,Confirmed\n2025-08-01,,3\n";
        let table = read_table(csv.as_bytes()).unwrap();
        let (rows, _) = normalize(&table);
        assert_eq!(rows[0].location, "Unknown");
    }

    #[test]
    fn test_locations_sorted_distinct() {
        let rows = vec![
            row("2025-08-01", "CityB", 1.0, 0.0, 0.0),
            row("2025-08-01", "CityA", 1.0, 0.0, 0.0),
            row("2025-08-02", "CityB", 1.0, 0.0, 0.0),
        ];
        assert_eq!(locations(&rows), vec!["CityA", "CityB"]);
    }

    #[test]
    fn test_case_mode_from_str() {
        assert_eq!("daily".parse::<CaseMode>().unwrap(), CaseMode::Daily);
        assert_eq!(
            "Cumulative".parse::<CaseMode>().unwrap(),
            CaseMode::Cumulative
        );
        assert!("weekly".parse::<CaseMode>().is_err());
    }
}
