// rapidapi.rs
use crate::config::SourceSettings;
use crate::errors::{Exhaustion, PipelineError};
use reqwest::blocking::Client;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT};
use serde_json::Value;

const USER_AGENT: &str =
    "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/121.0 Safari/537.36";

/// Blocking GET client for one RapidAPI-hosted endpoint.
pub struct RapidApiClient {
    client: Client,
    api_key: String,
    host: &'static str,
    base_url: String,
}

impl RapidApiClient {
    pub fn new(host: &'static str, settings: &SourceSettings) -> Result<Self, PipelineError> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(settings.timeout)
            .build()
            .map_err(|e| PipelineError::Http(e.to_string()))?;

        Ok(Self {
            client,
            api_key: settings.api_key.clone(),
            host,
            base_url: settings.base_url.trim_end_matches('/').to_string(),
        })
    }

    /// One GET, no retries. Anything short of a 2xx JSON body is reported as exhaustion.
    pub fn get_json(&self, path: &str, params: &[(&'static str, String)]) -> Result<Value, Exhaustion> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        headers.insert("X-RapidAPI-Host", HeaderValue::from_static(self.host));
        let key = HeaderValue::from_str(&self.api_key)
            .map_err(|e| Exhaustion::Transport(format!("bad api key header: {e}")))?;
        headers.insert("X-RapidAPI-Key", key);

        let url = format!("{}{}", self.base_url, path);

        let resp = self
            .client
            .get(&url)
            .headers(headers)
            .query(params)
            .send()
            .map_err(|e| Exhaustion::Transport(e.to_string()))?;

        let status = resp.status();

        let text = resp
            .text()
            .map_err(|e| Exhaustion::Transport(e.to_string()))?;

        if !status.is_success() {
            return Err(Exhaustion::Transport(format!(
                "{} HTTP {}: {}",
                self.host,
                status,
                truncate(&text, 200)
            )));
        }

        serde_json::from_str(&text).map_err(|e| Exhaustion::Decode(e.to_string()))
    }
}

fn truncate(s: &str, max: usize) -> &str {
    match s.char_indices().nth(max) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}
