use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

pub mod parse;
pub use parse::{parse, parse_batch, parse_line, parse_text, parse_value, RawBatch, RawRecord};

/// One environmental sample as archived by the sensor logger.
///
/// Only `time` is mandatory. Older archives carry temperature alone, newer
/// ones add pressure and light, so every measurement is optional.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SensorReading {
    /// Epoch milliseconds
    pub time: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pressure: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub light: Option<f64>,
}

impl SensorReading {
    pub fn at(time: i64) -> Self {
        Self {
            time,
            temperature: None,
            pressure: None,
            light: None,
        }
    }

    pub fn with_temperature(mut self, value: f64) -> Self {
        self.temperature = Some(value);
        self
    }

    pub fn with_pressure(mut self, value: f64) -> Self {
        self.pressure = Some(value);
        self
    }

    pub fn with_light(mut self, value: f64) -> Self {
        self.light = Some(value);
        self
    }

    pub fn value(&self, field: Field) -> Option<f64> {
        field.value(self)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Field {
    Temperature,
    Pressure,
    Light,
}

impl Field {
    pub const ALL: [Field; 3] = [Field::Temperature, Field::Pressure, Field::Light];

    pub fn as_str(&self) -> &'static str {
        match self {
            Field::Temperature => "temperature",
            Field::Pressure => "pressure",
            Field::Light => "light",
        }
    }

    pub fn value(&self, reading: &SensorReading) -> Option<f64> {
        match self {
            Field::Temperature => reading.temperature,
            Field::Pressure => reading.pressure,
            Field::Light => reading.light,
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Field {
    type Err = FieldError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "temperature" => Ok(Field::Temperature),
            "pressure" => Ok(Field::Pressure),
            "light" => Ok(Field::Light),
            other => Err(FieldError::Unknown(other.to_string())),
        }
    }
}

#[derive(thiserror::Error, Debug, PartialEq, Eq)]
pub enum FieldError {
    #[error("unknown field '{0}', expected temperature, pressure or light")]
    Unknown(String),
}

/// Inclusive window of epoch milliseconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TimeRange {
    from: i64,
    to: i64,
}

#[derive(thiserror::Error, Debug, PartialEq, Eq)]
pub enum RangeError {
    #[error("time range starts at {from} after it ends at {to}")]
    Inverted { from: i64, to: i64 },
}

impl TimeRange {
    pub fn new(from: i64, to: i64) -> Result<Self, RangeError> {
        if from > to {
            return Err(RangeError::Inverted { from, to });
        }
        Ok(Self { from, to })
    }

    /// The `window_ms` milliseconds leading up to `now_ms`.
    pub fn trailing(now_ms: i64, window_ms: u64) -> Self {
        let window = i64::try_from(window_ms).unwrap_or(i64::MAX);
        Self {
            from: now_ms.saturating_sub(window),
            to: now_ms,
        }
    }

    pub fn from(&self) -> i64 {
        self.from
    }

    pub fn to(&self) -> i64 {
        self.to
    }

    pub fn span_ms(&self) -> i64 {
        self.to.saturating_sub(self.from)
    }

    pub fn contains(&self, time: i64) -> bool {
        time >= self.from && time <= self.to
    }
}
