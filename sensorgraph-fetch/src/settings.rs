use crate::files::FileSource;
use crate::http::UreqClient;
use crate::listing::{ListingSource, DEFAULT_KEY_PREFIX, DEFAULT_MAX_KEYS, DEFAULT_WORKERS};
use crate::rest::RestSource;
use reading::Field;
use sensorgraph_core::ReadingSource;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_BASE_URL: &str = "http://localhost:9000/sensors";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

fn default_key_prefix() -> String {
    DEFAULT_KEY_PREFIX.to_string()
}

fn default_max_keys() -> u32 {
    DEFAULT_MAX_KEYS
}

fn default_workers() -> usize {
    DEFAULT_WORKERS
}

fn default_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

fn default_listing_fields() -> Vec<Field> {
    vec![Field::Temperature, Field::Light]
}

fn default_all_fields() -> Vec<Field> {
    Field::ALL.to_vec()
}

/// Where readings come from, selected by `kind`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SourceSettings {
    Listing {
        base_url: String,
        #[serde(default = "default_key_prefix")]
        key_prefix: String,
        #[serde(default = "default_max_keys")]
        max_keys: u32,
        #[serde(default = "default_workers")]
        workers: usize,
        #[serde(default = "default_timeout_secs")]
        timeout_secs: u64,
        #[serde(default = "default_listing_fields")]
        fields: Vec<Field>,
    },
    Rest {
        url: String,
        #[serde(default = "default_timeout_secs")]
        timeout_secs: u64,
        #[serde(default = "default_all_fields")]
        fields: Vec<Field>,
    },
    Files {
        paths: Vec<PathBuf>,
        #[serde(default = "default_all_fields")]
        fields: Vec<Field>,
    },
}

impl Default for SourceSettings {
    fn default() -> Self {
        SourceSettings::Listing {
            base_url: DEFAULT_BASE_URL.to_string(),
            key_prefix: default_key_prefix(),
            max_keys: default_max_keys(),
            workers: default_workers(),
            timeout_secs: default_timeout_secs(),
            fields: default_listing_fields(),
        }
    }
}

impl SourceSettings {
    pub fn kind(&self) -> &'static str {
        match self {
            SourceSettings::Listing { .. } => "listing",
            SourceSettings::Rest { .. } => "rest",
            SourceSettings::Files { .. } => "files",
        }
    }

    pub fn fields(&self) -> &[Field] {
        match self {
            SourceSettings::Listing { fields, .. }
            | SourceSettings::Rest { fields, .. }
            | SourceSettings::Files { fields, .. } => fields,
        }
    }

    pub fn build(&self) -> Box<dyn ReadingSource> {
        match self {
            SourceSettings::Listing {
                base_url,
                key_prefix,
                max_keys,
                workers,
                timeout_secs,
                fields,
            } => Box::new(
                ListingSource::new(client(*timeout_secs), base_url)
                    .with_key_prefix(key_prefix)
                    .with_max_keys(*max_keys)
                    .with_workers(*workers)
                    .with_fields(fields.clone()),
            ),
            SourceSettings::Rest {
                url,
                timeout_secs,
                fields,
            } => Box::new(RestSource::new(client(*timeout_secs), url).with_fields(fields.clone())),
            SourceSettings::Files { paths, fields } => {
                Box::new(FileSource::new(paths.clone()).with_fields(fields.clone()))
            }
        }
    }
}

fn client(timeout_secs: u64) -> UreqClient {
    UreqClient::new(Duration::from_secs(timeout_secs.max(1)))
}
