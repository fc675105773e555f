//! Wide-format sensor table handling (timestamp column + one column per
//! sensor), with optional smoothing and threshold alerts.

use serde::Serialize;

use crate::error::{Result, TransformError};
use crate::ingest::{ColumnRole, Table, infer_roles};
use crate::smooth::moving_average_opt;

/// One sensor column, index-aligned with the timestamp labels. A `None`
/// slot is a missing reading.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SensorSeries {
    pub name: String,
    pub values: Vec<Option<f64>>,
}

/// All sensor series from one ingested file. Every series has the same
/// length as `timestamps`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SensorTable {
    pub timestamps: Vec<String>,
    pub sensors: Vec<SensorSeries>,
}

impl SensorTable {
    /// Extracts the sensor table from a generic ingested table. The
    /// timestamp column is found by role inference, defaulting to the
    /// first column; every other column becomes a sensor series.
    ///
    /// # Errors
    ///
    /// Returns [`TransformError::NoSensorColumns`] when the file has no
    /// columns besides the timestamp.
    pub fn from_table(table: &Table) -> Result<SensorTable> {
        let width = table.headers.len();
        let ts_idx = infer_roles(&table.headers)
            .get_or_position(ColumnRole::Timestamp, 0, width)
            .ok_or(TransformError::NoSensorColumns)?;
        if width < 2 {
            return Err(TransformError::NoSensorColumns);
        }

        let timestamps: Vec<String> = table.column(ts_idx).map(|v| v.label()).collect();

        let sensors = table
            .headers
            .iter()
            .enumerate()
            .filter(|(i, _)| *i != ts_idx)
            .map(|(i, name)| SensorSeries {
                name: name.clone(),
                values: table.column(i).map(|v| v.as_f64()).collect(),
            })
            .collect();

        Ok(SensorTable {
            timestamps,
            sensors,
        })
    }

    /// Returns a copy with each sensor series smoothed by a trailing
    /// moving average (3-decimal rounding). A window of 1 leaves the
    /// readings, gaps included, untouched.
    pub fn smoothed(&self, window: usize) -> Result<SensorTable> {
        let sensors = self
            .sensors
            .iter()
            .map(|s| {
                Ok(SensorSeries {
                    name: s.name.clone(),
                    values: moving_average_opt(&s.values, window, 3)?,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(SensorTable {
            timestamps: self.timestamps.clone(),
            sensors,
        })
    }

    /// Counts readings outside the alert bounds, per sensor. Missing
    /// readings never trip an alert.
    pub fn scan_alerts(&self, low: Option<f64>, high: Option<f64>) -> Vec<AlertCount> {
        self.sensors
            .iter()
            .map(|s| {
                let present = s.values.iter().flatten();
                let (mut below, mut above) = (0usize, 0usize);
                for v in present {
                    if low.is_some_and(|bound| *v < bound) {
                        below += 1;
                    }
                    if high.is_some_and(|bound| *v > bound) {
                        above += 1;
                    }
                }
                AlertCount {
                    sensor: s.name.clone(),
                    below_low: below,
                    above_high: above,
                }
            })
            .collect()
    }
}

/// Threshold violations for one sensor.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AlertCount {
    pub sensor: String,
    pub below_low: usize,
    pub above_high: usize,
}
