//! Processing core for archived environmental sensor readings.
//!
//! Raw batches from a [`ReadingSource`] are parsed, merged into one
//! time-ordered sequence, summarised per field and projected into pixel space
//! for a [`Renderer`]. Nothing here touches the network or a drawing surface.

pub mod aggregate;
pub mod pipeline;
pub mod projection;
pub mod render;
pub mod settings;
pub mod source;
pub mod stats;

pub use aggregate::aggregate;
pub use pipeline::{
    InsufficientReason, LinearAnalyzer, Pipeline, PipelineResult, RenderableSeries,
    SeriesAnalyzer,
};
pub use projection::{decimation_step, lowest_point, project, RenderPoint, Viewport, XScale};
pub use render::Renderer;
pub use settings::{
    load_settings_file, normalize_settings, parse_settings, save_settings_file, PipelineSettings,
    SettingsError,
};
pub use source::{CancelToken, FetchError, ReadingSource};
pub use stats::{
    average_temperature_f, celsius_to_fahrenheit, compute_stats, field_stats, FieldStats,
    CALIBRATION_OFFSET_C,
};
