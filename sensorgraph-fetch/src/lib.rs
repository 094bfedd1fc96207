//! Fetch collaborators for the sensorgraph pipeline.
//!
//! Each source implements [`sensorgraph_core::ReadingSource`] and hands the
//! pipeline raw batches. Archive objects are line-delimited JSON; the REST
//! endpoint answers with a JSON array.

pub mod files;
pub mod http;
pub mod listing;
pub mod objects;
pub mod rest;
pub mod settings;

pub use files::FileSource;
pub use http::{HttpClient, HttpResponse, UreqClient};
pub use listing::{date_prefix, parse_listing, ListingPage, ListingSource};
pub use objects::fetch_objects;
pub use rest::RestSource;
pub use settings::SourceSettings;

/// Current wall clock time in epoch milliseconds.
pub fn now_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}
