use crate::SensorReading;
use serde_json::Value;

/// A record as it arrives from a source, before validation.
#[derive(Debug, Clone, PartialEq)]
pub enum RawRecord {
    /// One line of a line-delimited JSON archive object.
    Line(String),
    /// An element of an already decoded JSON response.
    Object(Value),
}

/// Everything one fetched object or response produced, in source order.
pub type RawBatch = Vec<RawRecord>;

pub fn parse(raw: &RawRecord) -> Option<SensorReading> {
    match raw {
        RawRecord::Line(line) => parse_line(line),
        RawRecord::Object(value) => parse_value(value),
    }
}

pub fn parse_line(line: &str) -> Option<SensorReading> {
    let line = line.trim_end_matches('\r');
    if line.trim().is_empty() {
        return None;
    }
    let value: Value = serde_json::from_str(line).ok()?;
    parse_value(&value)
}

/// Accepts any JSON object with a numeric `time`. Measurements that are
/// missing or not numbers are left out of the reading rather than rejecting it.
pub fn parse_value(value: &Value) -> Option<SensorReading> {
    let object = value.as_object()?;
    let time = object.get("time").and_then(epoch_millis)?;
    let measurement = |key: &str| object.get(key).and_then(Value::as_f64);
    Some(SensorReading {
        time,
        temperature: measurement("temperature"),
        pressure: measurement("pressure"),
        light: measurement("light"),
    })
}

fn epoch_millis(value: &Value) -> Option<i64> {
    if let Some(millis) = value.as_i64() {
        return Some(millis);
    }
    let millis = value.as_f64().filter(|v| v.is_finite())?;
    Some(millis.trunc() as i64)
}

/// Splits an archive object body on newlines and keeps the lines that parse.
pub fn parse_text(text: &str) -> Vec<SensorReading> {
    text.split('\n').filter_map(parse_line).collect()
}

pub fn parse_batch(batch: &[RawRecord]) -> Vec<SensorReading> {
    batch.iter().filter_map(parse).collect()
}

impl RawRecord {
    pub fn lines(text: &str) -> RawBatch {
        text.split('\n')
            .map(|line| RawRecord::Line(line.to_string()))
            .collect()
    }
}
