use crate::aggregate::aggregate;
use crate::projection::{lowest_point, project, RenderPoint, Viewport, XScale};
use crate::settings::PipelineSettings;
use crate::source::{CancelToken, FetchError, ReadingSource};
use crate::stats::{average_temperature_f, compute_stats, FieldStats};
use log::{debug, error, info, warn};
use reading::{parse_batch, Field, RawBatch, SensorReading, TimeRange};
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;

/// Statistics and projection stages of a run.
///
/// The pipeline only reaches these once it has enough readings, so an
/// implementation never sees a run that is going to be reported as
/// insufficient.
pub trait SeriesAnalyzer {
    fn stats(&self, readings: &[SensorReading], fields: &[Field]) -> BTreeMap<Field, FieldStats>;

    fn project(
        &self,
        readings: &[SensorReading],
        field: Field,
        viewport: Viewport,
        stats: &FieldStats,
        x_scale: XScale,
    ) -> Vec<RenderPoint>;
}

/// Min/max statistics with linear pixel scaling.
#[derive(Debug, Clone, Copy, Default)]
pub struct LinearAnalyzer;

impl SeriesAnalyzer for LinearAnalyzer {
    fn stats(&self, readings: &[SensorReading], fields: &[Field]) -> BTreeMap<Field, FieldStats> {
        compute_stats(readings, fields)
    }

    fn project(
        &self,
        readings: &[SensorReading],
        field: Field,
        viewport: Viewport,
        stats: &FieldStats,
        x_scale: XScale,
    ) -> Vec<RenderPoint> {
        project(readings, field, viewport, stats, x_scale)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RenderableSeries {
    pub series: BTreeMap<Field, Vec<RenderPoint>>,
    pub stats: BTreeMap<Field, FieldStats>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub average_temperature_f: Option<f64>,
    pub reading_count: usize,
    pub first_time: i64,
    pub last_time: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum InsufficientReason {
    FetchFailed { message: String },
    NotEnoughData { found: usize, required: usize },
    Cancelled,
}

impl InsufficientReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            InsufficientReason::FetchFailed { .. } => "fetch failed",
            InsufficientReason::NotEnoughData { .. } => "not enough data",
            InsufficientReason::Cancelled => "cancelled",
        }
    }
}

impl fmt::Display for InsufficientReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum PipelineResult {
    Ready(RenderableSeries),
    Insufficient { reason: InsufficientReason },
}

impl PipelineResult {
    pub fn is_ready(&self) -> bool {
        matches!(self, PipelineResult::Ready(_))
    }

    pub fn ready(&self) -> Option<&RenderableSeries> {
        match self {
            PipelineResult::Ready(series) => Some(series),
            PipelineResult::Insufficient { .. } => None,
        }
    }

    pub fn insufficient_reason(&self) -> Option<&InsufficientReason> {
        match self {
            PipelineResult::Ready(_) => None,
            PipelineResult::Insufficient { reason } => Some(reason),
        }
    }
}

pub struct Pipeline<A = LinearAnalyzer> {
    settings: PipelineSettings,
    analyzer: A,
}

impl Pipeline<LinearAnalyzer> {
    pub fn new(settings: PipelineSettings) -> Self {
        Self::with_analyzer(settings, LinearAnalyzer)
    }
}

impl<A: SeriesAnalyzer> Pipeline<A> {
    pub fn with_analyzer(settings: PipelineSettings, analyzer: A) -> Self {
        Self { settings, analyzer }
    }

    pub fn settings(&self) -> &PipelineSettings {
        &self.settings
    }

    pub fn analyzer(&self) -> &A {
        &self.analyzer
    }

    /// Fields to summarise for a source: the configured fields it provides,
    /// with temperature always included.
    pub fn tracked_fields(&self, provided: &[Field]) -> Vec<Field> {
        let mut fields: Vec<Field> = self
            .settings
            .fields
            .iter()
            .copied()
            .filter(|field| *field == Field::Temperature || provided.contains(field))
            .collect();
        if !fields.contains(&Field::Temperature) {
            fields.insert(0, Field::Temperature);
        }
        fields
    }

    /// Fetches, then processes. A fetch failure or cancellation is returned
    /// to the caller instead of being folded into the result.
    pub fn try_run(
        &self,
        source: &dyn ReadingSource,
        range: &TimeRange,
        cancel: &CancelToken,
    ) -> Result<PipelineResult, FetchError> {
        let batches = source.fetch(range, cancel)?;
        if cancel.is_cancelled() {
            return Err(FetchError::Cancelled);
        }
        info!(
            "fetched {} batch(es) for {}..{}",
            batches.len(),
            range.from(),
            range.to()
        );
        let fields = self.tracked_fields(source.fields());
        Ok(self.process(&batches, &fields))
    }

    pub fn run(
        &self,
        source: &dyn ReadingSource,
        range: &TimeRange,
        cancel: &CancelToken,
    ) -> PipelineResult {
        match self.try_run(source, range, cancel) {
            Ok(result) => result,
            Err(FetchError::Cancelled) => {
                warn!("run cancelled before processing");
                PipelineResult::Insufficient {
                    reason: InsufficientReason::Cancelled,
                }
            }
            Err(err) => {
                error!("fetch failed: {err}");
                PipelineResult::Insufficient {
                    reason: InsufficientReason::FetchFailed {
                        message: err.to_string(),
                    },
                }
            }
        }
    }

    /// Processes already fetched batches using the configured fields.
    pub fn run_batches(&self, batches: &[RawBatch]) -> PipelineResult {
        let fields = self.tracked_fields(&self.settings.fields);
        self.process(batches, &fields)
    }

    fn process(&self, batches: &[RawBatch], fields: &[Field]) -> PipelineResult {
        let raw_count: usize = batches.iter().map(Vec::len).sum();
        let parsed: Vec<Vec<SensorReading>> =
            batches.iter().map(|batch| parse_batch(batch)).collect();
        let readings = aggregate(parsed);
        let dropped = raw_count - readings.len();
        if dropped > 0 {
            debug!("dropped {dropped} of {raw_count} raw record(s)");
        }

        let required = self.settings.minimum_readings.max(1);
        if readings.len() < required {
            warn!(
                "not enough data: {} reading(s), need {required}",
                readings.len()
            );
            return PipelineResult::Insufficient {
                reason: InsufficientReason::NotEnoughData {
                    found: readings.len(),
                    required,
                },
            };
        }
        let (Some(first), Some(last)) = (readings.first(), readings.last()) else {
            return PipelineResult::Insufficient {
                reason: InsufficientReason::NotEnoughData { found: 0, required },
            };
        };
        let (first_time, last_time) = (first.time, last.time);

        let stats = self.analyzer.stats(&readings, fields);
        let viewport = self.settings.viewport();
        let x_scale = self.settings.x_scale();

        let mut series = BTreeMap::new();
        for field in self.settings.projected_fields() {
            if !fields.contains(&field) {
                continue;
            }
            let Some(field_stats) = stats.get(&field) else {
                continue;
            };
            let points = self
                .analyzer
                .project(&readings, field, viewport, field_stats, x_scale);
            if let Some(lowest) = lowest_point(&points) {
                debug!(
                    "lowest {field} point at x={} y={}",
                    lowest.x,
                    f64::from(viewport.height) - lowest.y
                );
            }
            series.insert(field, points);
        }

        PipelineResult::Ready(RenderableSeries {
            series,
            stats,
            average_temperature_f: average_temperature_f(&readings),
            reading_count: readings.len(),
            first_time,
            last_time,
        })
    }
}
