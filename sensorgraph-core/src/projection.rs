//! Data space to pixel space projection.
//!
//! The projector only scales values; it does not flip the y axis. A value
//! equal to the field minimum maps to row 0 and the renderer decides where
//! row 0 is drawn.

use crate::stats::FieldStats;
use reading::{Field, SensorReading};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
}

impl Viewport {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            width: 1280,
            height: 720,
        }
    }
}

/// How readings are laid out along the x axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum XScale {
    /// Column is the reading's position in the sequence.
    #[default]
    Index,
    /// Column is proportional to the reading's offset from the first timestamp.
    Time,
}

impl XScale {
    pub fn from_time_scaled(time_scaled: bool) -> Self {
        if time_scaled {
            XScale::Time
        } else {
            XScale::Index
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RenderPoint {
    pub x: u64,
    pub y: f64,
}

/// Number of readings represented by each drawn point.
pub fn decimation_step(len: usize, width: u32) -> usize {
    let width = width.max(1) as usize;
    (len / width).max(1)
}

pub fn project(
    readings: &[SensorReading],
    field: Field,
    viewport: Viewport,
    stats: &FieldStats,
    x_scale: XScale,
) -> Vec<RenderPoint> {
    let Some(min) = stats.min() else {
        return Vec::new();
    };
    let (Some(first), Some(last)) = (readings.first(), readings.last()) else {
        return Vec::new();
    };

    let len = readings.len();
    let step = decimation_step(len, viewport.width);
    let y_scale = stats.scale_factor(f64::from(viewport.height));

    let start = first.time;
    let span = last.time.saturating_sub(start);
    let time_scaled = x_scale == XScale::Time && span != 0;

    let mut points = Vec::with_capacity(len / step + 1);
    for (index, reading) in readings.iter().enumerate().step_by(step) {
        let Some(value) = field.value(reading) else {
            continue;
        };
        if !value.is_finite() {
            continue;
        }
        let x = if time_scaled {
            let offset = reading.time.saturating_sub(start) as f64;
            (offset * len as f64 / span as f64).floor().max(0.0) as u64
        } else {
            index as u64
        };
        // `value - min` can overflow to infinity on extreme ranges.
        let y = if y_scale == 0.0 {
            0.0
        } else {
            (value - min) * y_scale
        };
        points.push(RenderPoint { x, y });
    }
    points
}

/// First point with the smallest y, i.e. the lowest value drawn for a field.
pub fn lowest_point(points: &[RenderPoint]) -> Option<RenderPoint> {
    let mut lowest: Option<RenderPoint> = None;
    for point in points {
        match lowest {
            Some(current) if current.y <= point.y => {}
            _ => lowest = Some(*point),
        }
    }
    lowest
}
