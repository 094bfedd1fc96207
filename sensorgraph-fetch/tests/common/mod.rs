#![allow(dead_code)]

use sensorgraph_core::FetchError;
use sensorgraph_fetch::{HttpClient, HttpResponse};
use std::collections::HashMap;
use std::sync::Mutex;

/// In-memory HTTP client keyed by `url?name=value&...`.
#[derive(Default)]
pub struct FakeClient {
    responses: HashMap<String, HttpResponse>,
    pub requests: Mutex<Vec<String>>,
}

impl FakeClient {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn respond(&mut self, request: &str, response: HttpResponse) {
        self.responses.insert(request.to_string(), response);
    }

    pub fn requests(&self) -> Vec<String> {
        self.requests.lock().unwrap().clone()
    }
}

pub fn request_key(url: &str, query: &[(&str, &str)]) -> String {
    if query.is_empty() {
        return url.to_string();
    }
    let params: Vec<String> = query
        .iter()
        .map(|(name, value)| format!("{name}={value}"))
        .collect();
    format!("{url}?{}", params.join("&"))
}

impl HttpClient for FakeClient {
    fn get(&self, url: &str, query: &[(&str, &str)]) -> Result<HttpResponse, FetchError> {
        let key = request_key(url, query);
        self.requests.lock().unwrap().push(key.clone());
        match self.responses.get(&key) {
            Some(response) => Ok(response.clone()),
            None => Ok(HttpResponse {
                status: 404,
                content_type: "text/plain".to_string(),
                body: String::new(),
            }),
        }
    }
}
