use crate::http::HttpClient;
use log::info;
use reading::{Field, RawBatch, RawRecord, TimeRange};
use sensorgraph_core::{CancelToken, FetchError, ReadingSource};
use serde_json::Value;

/// Single-request source: `GET <url>?from=<ms>&to=<ms>` answering with a JSON
/// array of readings, or an object holding one under `readings`.
pub struct RestSource<C> {
    client: C,
    url: String,
    fields: Vec<Field>,
}

impl<C: HttpClient> RestSource<C> {
    pub fn new(client: C, url: &str) -> Self {
        Self {
            client,
            url: url.to_string(),
            fields: Field::ALL.to_vec(),
        }
    }

    pub fn with_fields(mut self, fields: Vec<Field>) -> Self {
        self.fields = fields;
        self
    }
}

pub fn records_from_json(body: &str) -> Result<RawBatch, FetchError> {
    let value: Value = serde_json::from_str(body)
        .map_err(|err| FetchError::Malformed(format!("invalid JSON body: {err}")))?;
    let items = match value {
        Value::Array(items) => items,
        Value::Object(mut object) => match object.remove("readings") {
            Some(Value::Array(items)) => items,
            _ => {
                return Err(FetchError::Malformed(
                    "expected an array of readings".to_string(),
                ))
            }
        },
        _ => {
            return Err(FetchError::Malformed(
                "expected an array of readings".to_string(),
            ))
        }
    };
    Ok(items.into_iter().map(RawRecord::Object).collect())
}

impl<C: HttpClient> ReadingSource for RestSource<C> {
    fn fields(&self) -> &[Field] {
        &self.fields
    }

    fn fetch(&self, range: &TimeRange, cancel: &CancelToken) -> Result<Vec<RawBatch>, FetchError> {
        if cancel.is_cancelled() {
            return Err(FetchError::Cancelled);
        }
        let from = range.from().to_string();
        let to = range.to().to_string();
        let response = self
            .client
            .get(&self.url, &[("from", from.as_str()), ("to", to.as_str())])?
            .ensure_success(&self.url)?;
        if !response.is_json() {
            return Err(FetchError::NotJson {
                url: self.url.clone(),
                content_type: response.content_type,
            });
        }
        let batch = records_from_json(&response.body)?;
        info!("{} returned {} record(s)", self.url, batch.len());
        Ok(vec![batch])
    }
}
