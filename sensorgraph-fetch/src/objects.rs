use crate::http::HttpClient;
use log::debug;
use reading::{RawBatch, RawRecord};
use sensorgraph_core::{CancelToken, FetchError};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;
use std::thread;

pub fn object_url(base_url: &str, key: &str) -> String {
    format!("{}/{}", base_url.trim_end_matches('/'), key)
}

fn fetch_object<C: HttpClient>(client: &C, base_url: &str, key: &str) -> Result<RawBatch, FetchError> {
    let url = object_url(base_url, key);
    let response = client.get(&url, &[])?.ensure_success(&url)?;
    debug!("fetched {url} ({} bytes)", response.body.len());
    Ok(RawRecord::lines(&response.body))
}

/// Downloads every key on up to `workers` threads.
///
/// Batches come back in key order. The first failure stops the remaining
/// workers from claiming new keys and is returned for the whole batch.
pub fn fetch_objects<C: HttpClient>(
    client: &C,
    base_url: &str,
    keys: &[String],
    workers: usize,
    cancel: &CancelToken,
) -> Result<Vec<RawBatch>, FetchError> {
    if keys.is_empty() {
        return Ok(Vec::new());
    }
    let workers = workers.clamp(1, keys.len());
    let next = AtomicUsize::new(0);
    let failed = AtomicBool::new(false);
    let slots: Mutex<Vec<Option<RawBatch>>> = Mutex::new(vec![None; keys.len()]);
    let first_error: Mutex<Option<FetchError>> = Mutex::new(None);

    let record_error = |err: FetchError| {
        failed.store(true, Ordering::SeqCst);
        let mut slot = first_error.lock().unwrap_or_else(|e| e.into_inner());
        if slot.is_none() {
            *slot = Some(err);
        }
    };

    thread::scope(|scope| {
        for _ in 0..workers {
            scope.spawn(|| loop {
                if failed.load(Ordering::SeqCst) {
                    break;
                }
                if cancel.is_cancelled() {
                    record_error(FetchError::Cancelled);
                    break;
                }
                let idx = next.fetch_add(1, Ordering::SeqCst);
                let Some(key) = keys.get(idx) else {
                    break;
                };
                match fetch_object(client, base_url, key) {
                    Ok(batch) => {
                        let mut slots = slots.lock().unwrap_or_else(|e| e.into_inner());
                        slots[idx] = Some(batch);
                    }
                    Err(err) => {
                        record_error(err);
                        break;
                    }
                }
            });
        }
    });

    if let Some(err) = first_error.into_inner().unwrap_or_else(|e| e.into_inner()) {
        return Err(err);
    }
    slots
        .into_inner()
        .unwrap_or_else(|e| e.into_inner())
        .into_iter()
        .collect::<Option<Vec<RawBatch>>>()
        .ok_or(FetchError::Cancelled)
}
