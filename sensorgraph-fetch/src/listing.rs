//! Object storage listing source.
//!
//! Keys are listed with the ListObjectsV2 query protocol, starting after a
//! date prefix derived from the start of the requested range, and following
//! continuation tokens until the listing is exhausted. Every listed object is
//! then downloaded and split into line records.

use crate::http::HttpClient;
use crate::objects::fetch_objects;
use chrono::{DateTime, Datelike, Utc};
use log::{debug, info};
use reading::{Field, RawBatch, TimeRange};
use sensorgraph_core::{CancelToken, FetchError, ReadingSource};

pub const DEFAULT_KEY_PREFIX: &str = "environment";
pub const DEFAULT_MAX_KEYS: u32 = 1000;
pub const DEFAULT_WORKERS: usize = 8;

/// Archive key prefix for the UTC day containing `millis`.
///
/// The logger writes `<prefix><year>/<zero padded month>/<day>` with an
/// unpadded day, so the prefix follows the same layout.
pub fn date_prefix(key_prefix: &str, millis: i64) -> Option<String> {
    let date = DateTime::<Utc>::from_timestamp_millis(millis)?;
    Some(format!(
        "{key_prefix}{}/{:02}/{}",
        date.year(),
        date.month(),
        date.day()
    ))
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListingPage {
    pub keys: Vec<String>,
    pub next_token: Option<String>,
}

fn element_text<'a>(xml: &'a str, tag: &str) -> Option<&'a str> {
    let open = format!("<{tag}>");
    let close = format!("</{tag}>");
    let start = xml.find(&open)? + open.len();
    let end = start + xml[start..].find(&close)?;
    Some(&xml[start..end])
}

fn decode_entity(entity: &str) -> Option<char> {
    match entity {
        "lt" => Some('<'),
        "gt" => Some('>'),
        "quot" => Some('"'),
        "apos" => Some('\''),
        "amp" => Some('&'),
        _ => {
            let code = entity.strip_prefix('#')?;
            let code = match code.strip_prefix('x').or_else(|| code.strip_prefix('X')) {
                Some(hex) => u32::from_str_radix(hex, 16).ok()?,
                None => code.parse().ok()?,
            };
            char::from_u32(code)
        }
    }
}

/// Decodes named and numeric character references. Unknown or malformed
/// references are kept as written.
fn unescape_xml(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut rest = text;
    while let Some(amp) = rest.find('&') {
        out.push_str(&rest[..amp]);
        let tail = &rest[amp..];
        let decoded = tail
            .find(';')
            .and_then(|end| decode_entity(&tail[1..end]).map(|ch| (ch, end)));
        match decoded {
            Some((ch, end)) => {
                out.push(ch);
                rest = &tail[end + 1..];
            }
            None => {
                out.push('&');
                rest = &tail[1..];
            }
        }
    }
    out.push_str(rest);
    out
}

/// Extracts `Contents/Key` entries and the continuation token from one
/// ListObjectsV2 response body.
pub fn parse_listing(xml: &str) -> ListingPage {
    let mut keys = Vec::new();
    let mut rest = xml;
    while let Some(start) = rest.find("<Contents>") {
        let after = &rest[start + "<Contents>".len()..];
        let Some(end) = after.find("</Contents>") else {
            break;
        };
        if let Some(key) = element_text(&after[..end], "Key") {
            keys.push(unescape_xml(key));
        }
        rest = &after[end + "</Contents>".len()..];
    }
    let next_token = element_text(xml, "NextContinuationToken")
        .map(unescape_xml)
        .filter(|token| !token.is_empty());
    ListingPage { keys, next_token }
}

pub struct ListingSource<C> {
    client: C,
    base_url: String,
    key_prefix: String,
    max_keys: u32,
    workers: usize,
    fields: Vec<Field>,
}

impl<C: HttpClient> ListingSource<C> {
    pub fn new(client: C, base_url: &str) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            key_prefix: DEFAULT_KEY_PREFIX.to_string(),
            max_keys: DEFAULT_MAX_KEYS,
            workers: DEFAULT_WORKERS,
            fields: vec![Field::Temperature, Field::Light],
        }
    }

    pub fn with_key_prefix(mut self, key_prefix: &str) -> Self {
        self.key_prefix = key_prefix.to_string();
        self
    }

    pub fn with_max_keys(mut self, max_keys: u32) -> Self {
        self.max_keys = max_keys.max(1);
        self
    }

    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers.max(1);
        self
    }

    pub fn with_fields(mut self, fields: Vec<Field>) -> Self {
        self.fields = fields;
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Lists every key after `start_after`, page by page.
    pub fn list_keys(
        &self,
        start_after: &str,
        cancel: &CancelToken,
    ) -> Result<Vec<String>, FetchError> {
        let max_keys = self.max_keys.to_string();
        let mut keys = Vec::new();
        let mut token: Option<String> = None;
        loop {
            if cancel.is_cancelled() {
                return Err(FetchError::Cancelled);
            }
            let query: Vec<(&str, &str)> = match &token {
                None => vec![
                    ("list-type", "2"),
                    ("start-after", start_after),
                    ("max-keys", max_keys.as_str()),
                ],
                Some(token) => vec![("list-type", "2"), ("continuation-token", token.as_str())],
            };
            let response = self
                .client
                .get(&self.base_url, &query)?
                .ensure_success(&self.base_url)?;
            let page = parse_listing(&response.body);
            debug!(
                "listing page with {} key(s), more: {}",
                page.keys.len(),
                page.next_token.is_some()
            );
            keys.extend(page.keys);
            match page.next_token {
                Some(next) if token.as_deref() == Some(next.as_str()) => {
                    return Err(FetchError::Malformed(format!(
                        "listing repeated continuation token '{next}'"
                    )));
                }
                Some(next) => token = Some(next),
                None => break,
            }
        }
        Ok(keys)
    }
}

impl<C: HttpClient> ReadingSource for ListingSource<C> {
    fn fields(&self) -> &[Field] {
        &self.fields
    }

    fn fetch(&self, range: &TimeRange, cancel: &CancelToken) -> Result<Vec<RawBatch>, FetchError> {
        let prefix = date_prefix(&self.key_prefix, range.from()).ok_or_else(|| {
            FetchError::Malformed(format!("{} is not a representable date", range.from()))
        })?;
        let keys = self.list_keys(&prefix, cancel)?;
        info!("listed {} object(s) after {prefix}", keys.len());
        fetch_objects(&self.client, &self.base_url, &keys, self.workers, cancel)
    }
}
