use log::{debug, info};
use reading::{Field, RawBatch, RawRecord, TimeRange};
use sensorgraph_core::{CancelToken, FetchError, ReadingSource};
use std::path::{Path, PathBuf};

/// Reads line-delimited archive objects from disk, one batch per file.
/// Directories contribute their regular files in name order.
pub struct FileSource {
    paths: Vec<PathBuf>,
    fields: Vec<Field>,
}

impl FileSource {
    pub fn new(paths: Vec<PathBuf>) -> Self {
        Self {
            paths,
            fields: Field::ALL.to_vec(),
        }
    }

    pub fn with_fields(mut self, fields: Vec<Field>) -> Self {
        self.fields = fields;
        self
    }

    fn expand(path: &Path) -> Result<Vec<PathBuf>, FetchError> {
        if !path.is_dir() {
            return Ok(vec![path.to_path_buf()]);
        }
        let mut files = Vec::new();
        for entry in std::fs::read_dir(path)? {
            let entry_path = entry?.path();
            if entry_path.is_file() {
                files.push(entry_path);
            }
        }
        files.sort();
        Ok(files)
    }
}

impl ReadingSource for FileSource {
    fn fields(&self) -> &[Field] {
        &self.fields
    }

    fn fetch(&self, _range: &TimeRange, cancel: &CancelToken) -> Result<Vec<RawBatch>, FetchError> {
        let mut batches = Vec::new();
        for path in &self.paths {
            for file in Self::expand(path)? {
                if cancel.is_cancelled() {
                    return Err(FetchError::Cancelled);
                }
                let bytes = std::fs::read(&file)?;
                let text = String::from_utf8_lossy(&bytes);
                debug!("read {}", file.display());
                batches.push(RawRecord::lines(&text));
            }
        }
        info!("read {} file(s)", batches.len());
        Ok(batches)
    }
}
