//! Descriptive statistics for boxplot-style charts.

use serde::Serialize;

use crate::error::{Result, TransformError};
use crate::ingest::{Table, Value};

/// Five-number summary of a numeric sample. Computed wholesale from one
/// sample; never updated incrementally.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct BoxplotStats {
    pub min: f64,
    pub q1: f64,
    pub median: f64,
    pub q3: f64,
    pub max: f64,
}

/// Computes nearest-rank quartiles: the sample is sorted ascending and each
/// quartile is `sorted[floor(n * p)]`, with no interpolation between ranks.
/// A single-element sample yields the same value for all five statistics.
///
/// # Errors
///
/// Returns [`TransformError::EmptySample`] for an empty sample; there is no
/// meaningful index to select.
pub fn boxplot_stats(sample: &[f64]) -> Result<BoxplotStats> {
    if sample.is_empty() {
        return Err(TransformError::EmptySample);
    }

    let mut sorted = sample.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));
    let n = sorted.len();
    let rank = |p: f64| (n as f64 * p).floor() as usize;

    Ok(BoxplotStats {
        min: sorted[0],
        q1: sorted[rank(0.25)],
        median: sorted[rank(0.5)],
        q3: sorted[rank(0.75)],
        max: sorted[n - 1],
    })
}

/// Boxplot statistics for one labelled group.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GroupStats {
    pub group: String,
    #[serde(flatten)]
    pub stats: BoxplotStats,
}

/// Splits a table into per-group numeric samples and computes boxplot
/// statistics for each, in order of first appearance. Non-numeric cells in
/// the value column are ignored; a group whose sample ends up empty is an
/// error, same as [`boxplot_stats`].
pub fn boxplot_by_group(table: &Table, group_col: &str, value_col: &str) -> Result<Vec<GroupStats>> {
    let group_idx = table
        .column_index(group_col)
        .ok_or_else(|| TransformError::MissingColumn(group_col.to_string()))?;
    let value_idx = table
        .column_index(value_col)
        .ok_or_else(|| TransformError::MissingColumn(value_col.to_string()))?;

    let mut order: Vec<String> = Vec::new();
    let mut samples: std::collections::HashMap<String, Vec<f64>> = std::collections::HashMap::new();

    for row in &table.rows {
        let group = row[group_idx].label();
        if group.is_empty() {
            continue;
        }
        let entry = samples.entry(group.clone()).or_insert_with(|| {
            order.push(group.clone());
            Vec::new()
        });
        if let Some(v) = row[value_idx].as_f64() {
            entry.push(v);
        }
    }

    order
        .into_iter()
        .map(|group| {
            let stats = boxplot_stats(&samples[&group])?;
            Ok(GroupStats { group, stats })
        })
        .collect()
}

/// Numeric sample from a single column, skipping non-numeric cells.
pub fn column_sample(table: &Table, value_col: &str) -> Result<Vec<f64>> {
    let idx = table
        .column_index(value_col)
        .ok_or_else(|| TransformError::MissingColumn(value_col.to_string()))?;
    Ok(table.column(idx).filter_map(Value::as_f64).collect())
}

/// Arithmetic mean; 0.0 for an empty slice.
pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Percentage of `part` in `total`; 0.0 when `total` is 0.
pub fn pct(part: f64, total: f64) -> f64 {
    if total == 0.0 { 0.0 } else { part / total * 100.0 }
}
