//! Trend summary over a labelled numeric series (daily visits, sales,
//! any label → value sequence).

use serde::Serialize;

use crate::error::{Result, TransformError};
use crate::ingest::Table;
use crate::smooth::{moving_average, round_to};
use crate::stats::mean;

/// Headline numbers for a labelled series, plus the smoothed series for
/// overlaying on the chart.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrendSummary {
    pub total: f64,
    pub average: f64,
    pub peak_label: String,
    pub peak_value: f64,
    pub trough_label: String,
    pub trough_value: f64,
    /// First-to-last change, percent, 1-decimal rounding.
    pub change_percent: f64,
    pub moving_average: Vec<f64>,
}

/// Summarizes `(label, value)` points: total, rounded mean, first strict
/// peak and trough, first-to-last percentage change, and a trailing moving
/// average (1-decimal rounding).
///
/// # Errors
///
/// [`TransformError::EmptySample`] for an empty series;
/// [`TransformError::ZeroBaseline`] when the first value is 0, which makes
/// the percentage change undefined; [`TransformError::InvalidWindow`] for
/// a zero window.
pub fn trend_summary(points: &[(String, f64)], window: usize) -> Result<TrendSummary> {
    if points.is_empty() {
        return Err(TransformError::EmptySample);
    }
    let first = points[0].1;
    let last = points[points.len() - 1].1;
    if first == 0.0 {
        return Err(TransformError::ZeroBaseline);
    }

    let values: Vec<f64> = points.iter().map(|(_, v)| *v).collect();
    let total: f64 = values.iter().sum();

    let mut peak = &points[0];
    let mut trough = &points[0];
    for point in points {
        if point.1 > peak.1 {
            peak = point;
        }
        if point.1 < trough.1 {
            trough = point;
        }
    }

    Ok(TrendSummary {
        total,
        average: mean(&values).round(),
        peak_label: peak.0.clone(),
        peak_value: peak.1,
        trough_label: trough.0.clone(),
        trough_value: trough.1,
        change_percent: round_to((last - first) / first * 100.0, 1),
        moving_average: moving_average(&values, window, 1)?,
    })
}

/// Pulls `(label, value)` points out of a table. Rows whose value cell is
/// not numeric are skipped; the count of skipped rows is returned alongside.
pub fn labelled_series(
    table: &Table,
    label_col: &str,
    value_col: &str,
) -> Result<(Vec<(String, f64)>, usize)> {
    let label_idx = table
        .column_index(label_col)
        .ok_or_else(|| TransformError::MissingColumn(label_col.to_string()))?;
    let value_idx = table
        .column_index(value_col)
        .ok_or_else(|| TransformError::MissingColumn(value_col.to_string()))?;

    let mut points = Vec::new();
    let mut skipped = 0usize;
    for row in &table.rows {
        match row[value_idx].as_f64() {
            Some(v) => points.push((row[label_idx].label(), v)),
            None => skipped += 1,
        }
    }
    Ok((points, skipped))
}
