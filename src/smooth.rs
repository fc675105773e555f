//! Trailing moving average used to smooth chart series.

use crate::error::{Result, TransformError};

/// Rounds to `decimals` decimal places, half away from zero.
pub(crate) fn round_to(value: f64, decimals: u32) -> f64 {
    let factor = 10f64.powi(decimals as i32);
    (value * factor).round() / factor
}

/// Computes a trailing moving average over `values`.
///
/// Element `i` of the output is the mean of `values[max(0, i - window + 1)..=i]`,
/// so the window shrinks near the start of the sequence instead of padding.
/// The output always has the same length as the input. A window of 1 returns
/// the input unchanged and unrounded; larger windows round each element to
/// `decimals` decimal places.
///
/// # Errors
///
/// Returns [`TransformError::InvalidWindow`] when `window` is 0.
pub fn moving_average(values: &[f64], window: usize, decimals: u32) -> Result<Vec<f64>> {
    if window == 0 {
        return Err(TransformError::InvalidWindow(0));
    }
    if window == 1 {
        return Ok(values.to_vec());
    }

    let mut out = Vec::with_capacity(values.len());
    for i in 0..values.len() {
        let start = i.saturating_sub(window - 1);
        let slice = &values[start..=i];
        let avg = slice.iter().sum::<f64>() / slice.len() as f64;
        out.push(round_to(avg, decimals));
    }
    Ok(out)
}

/// Moving average over a series with missing readings.
///
/// A missing reading contributes 0 to the window sum but still occupies a
/// slot, so the divisor is the window length, not the count of present
/// values. Every output element is therefore present for windows larger
/// than 1; a window of 1 returns the input unchanged, gaps included.
pub fn moving_average_opt(
    values: &[Option<f64>],
    window: usize,
    decimals: u32,
) -> Result<Vec<Option<f64>>> {
    if window == 0 {
        return Err(TransformError::InvalidWindow(0));
    }
    if window == 1 {
        return Ok(values.to_vec());
    }

    let mut out = Vec::with_capacity(values.len());
    for i in 0..values.len() {
        let start = i.saturating_sub(window - 1);
        let slice = &values[start..=i];
        let sum: f64 = slice.iter().map(|v| v.unwrap_or(0.0)).sum();
        out.push(Some(round_to(sum / slice.len() as f64, decimals)));
    }
    Ok(out)
}
