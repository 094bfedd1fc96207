//! Per-field summary statistics.

use reading::{Field, SensorReading};
use serde::Serialize;
use std::collections::BTreeMap;

/// Fixed bias of the logger's temperature probe, in degrees Celsius.
pub const CALIBRATION_OFFSET_C: f64 = -7.0;

/// Summary of one field over a sequence of readings.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum FieldStats {
    /// No reading supplied the field.
    Empty,
    Range {
        min: f64,
        max: f64,
        mean: f64,
        count: usize,
    },
}

impl FieldStats {
    pub fn is_empty(&self) -> bool {
        matches!(self, FieldStats::Empty)
    }

    pub fn min(&self) -> Option<f64> {
        match self {
            FieldStats::Empty => None,
            FieldStats::Range { min, .. } => Some(*min),
        }
    }

    pub fn max(&self) -> Option<f64> {
        match self {
            FieldStats::Empty => None,
            FieldStats::Range { max, .. } => Some(*max),
        }
    }

    pub fn mean(&self) -> Option<f64> {
        match self {
            FieldStats::Empty => None,
            FieldStats::Range { mean, .. } => Some(*mean),
        }
    }

    pub fn count(&self) -> usize {
        match self {
            FieldStats::Empty => 0,
            FieldStats::Range { count, .. } => *count,
        }
    }

    /// Pixels per unit of value when `extent` pixels span the min..max range.
    ///
    /// Flat data (`max == min`) and empty stats scale to zero so every
    /// projected value lands on the baseline.
    pub fn scale_factor(&self, extent: f64) -> f64 {
        match self {
            FieldStats::Range { min, max, .. } if max > min => extent / (max - min),
            _ => 0.0,
        }
    }
}

pub fn field_stats(readings: &[SensorReading], field: Field) -> FieldStats {
    let mut min = f64::INFINITY;
    let mut max = f64::NEG_INFINITY;
    let mut sum = 0.0;
    let mut count = 0usize;
    for value in readings.iter().filter_map(|r| field.value(r)) {
        if !value.is_finite() {
            continue;
        }
        min = min.min(value);
        max = max.max(value);
        sum += value;
        count += 1;
    }
    if count == 0 {
        return FieldStats::Empty;
    }
    FieldStats::Range {
        min,
        max,
        mean: sum / count as f64,
        count,
    }
}

pub fn compute_stats(readings: &[SensorReading], fields: &[Field]) -> BTreeMap<Field, FieldStats> {
    fields
        .iter()
        .map(|field| (*field, field_stats(readings, *field)))
        .collect()
}

pub fn celsius_to_fahrenheit(celsius: f64) -> f64 {
    celsius * 9.0 / 5.0 + 32.0
}

/// Mean temperature after bias correction, in Fahrenheit.
///
/// `None` when no reading carries a temperature.
pub fn average_temperature_f(readings: &[SensorReading]) -> Option<f64> {
    let mean = field_stats(readings, Field::Temperature).mean()?;
    Some(celsius_to_fahrenheit(mean + CALIBRATION_OFFSET_C))
}
