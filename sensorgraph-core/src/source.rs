use reading::{Field, RawBatch, TimeRange};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

#[derive(thiserror::Error, Debug)]
pub enum FetchError {
    #[error("request to {url} failed: {message}")]
    Transport { url: String, message: String },
    #[error("{url} answered with status {status}")]
    Status { url: String, status: u16 },
    #[error("{url} returned '{content_type}' instead of JSON")]
    NotJson { url: String, content_type: String },
    #[error("malformed response: {0}")]
    Malformed(String),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("fetch cancelled")]
    Cancelled,
}

/// Shared flag used to abandon an in-flight fetch.
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    cancelled: Arc<AtomicBool>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }
}

/// Something that can supply raw reading batches for a time range.
pub trait ReadingSource {
    /// Fields this source's records carry.
    fn fields(&self) -> &[Field];

    fn fetch(&self, range: &TimeRange, cancel: &CancelToken) -> Result<Vec<RawBatch>, FetchError>;
}
