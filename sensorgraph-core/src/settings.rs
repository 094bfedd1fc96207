use crate::projection::{Viewport, XScale};
use reading::Field;
use serde::{Deserialize, Serialize};
use std::path::Path;

pub const DEFAULT_MINIMUM_READINGS: usize = 100;
pub const DEFAULT_WINDOW_MS: u64 = 24 * 60 * 60 * 1000;

#[derive(thiserror::Error, Debug)]
pub enum SettingsError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid settings: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("failed to serialize settings: {0}")]
    Serialize(#[from] toml::ser::Error),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineSettings {
    /// Runs with fewer readings than this report "not enough data". A run
    /// always needs at least one reading.
    pub minimum_readings: usize,
    pub width: u32,
    pub height: u32,
    pub time_scaled: bool,
    /// How far back from now a run looks.
    pub window_ms: u64,
    /// Fields that get statistics.
    pub fields: Vec<Field>,
    /// Fields that get projected; all tracked fields when unset.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub project_fields: Option<Vec<Field>>,
}

impl Default for PipelineSettings {
    fn default() -> Self {
        let viewport = Viewport::default();
        Self {
            minimum_readings: DEFAULT_MINIMUM_READINGS,
            width: viewport.width,
            height: viewport.height,
            time_scaled: false,
            window_ms: DEFAULT_WINDOW_MS,
            fields: Field::ALL.to_vec(),
            project_fields: None,
        }
    }
}

impl PipelineSettings {
    pub fn viewport(&self) -> Viewport {
        Viewport::new(self.width, self.height)
    }

    pub fn x_scale(&self) -> XScale {
        XScale::from_time_scaled(self.time_scaled)
    }

    pub fn projected_fields(&self) -> Vec<Field> {
        match &self.project_fields {
            Some(fields) => fields
                .iter()
                .copied()
                .filter(|field| self.fields.contains(field))
                .collect(),
            None => self.fields.clone(),
        }
    }
}

fn dedup_fields(fields: &mut Vec<Field>) {
    let mut seen = Vec::with_capacity(fields.len());
    fields.retain(|field| {
        if seen.contains(field) {
            false
        } else {
            seen.push(*field);
            true
        }
    });
}

/// Clamps values a run cannot work with. Temperature is always tracked.
pub fn normalize_settings(mut settings: PipelineSettings) -> PipelineSettings {
    settings.minimum_readings = settings.minimum_readings.max(1);
    settings.width = settings.width.max(1);
    settings.height = settings.height.max(1);
    settings.window_ms = settings.window_ms.max(1);
    if !settings.fields.contains(&Field::Temperature) {
        settings.fields.insert(0, Field::Temperature);
    }
    dedup_fields(&mut settings.fields);
    if let Some(project_fields) = settings.project_fields.as_mut() {
        dedup_fields(project_fields);
    }
    settings
}

pub fn parse_settings(text: &str) -> Result<PipelineSettings, SettingsError> {
    let settings: PipelineSettings = toml::from_str(text)?;
    Ok(normalize_settings(settings))
}

pub fn load_settings_file(path: &Path) -> Result<PipelineSettings, SettingsError> {
    let text = std::fs::read_to_string(path)?;
    parse_settings(&text)
}

pub fn save_settings_file(path: &Path, settings: &PipelineSettings) -> Result<(), SettingsError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let text = toml::to_string_pretty(settings)?;
    std::fs::write(path, text)?;
    Ok(())
}
