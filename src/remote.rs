use crate::query::Recommendations;
use crate::{RecommenderError, Result};
use anyhow::{anyhow, Context};
use reqwest::blocking::Client;
use reqwest::StatusCode;
use serde::Deserialize;
use std::time::Duration;

#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: String,
}

/// Client for a recommender served over HTTP.
pub struct RemoteClient {
    base_url: String,
    http: Client,
}

impl RemoteClient {
    pub fn new(base_url: impl Into<String>) -> Result<Self> {
        let http = Client::builder()
            .timeout(Duration::from_secs(10))
            .build()
            .context("failed to build HTTP client")?;
        Ok(Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            http,
        })
    }

    pub fn endpoint(&self, query_id: i64, top_n: usize) -> String {
        format!("{}/recommend/{}?n={}", self.base_url, query_id, top_n)
    }

    pub fn recommend(&self, query_id: i64, top_n: usize) -> Result<Recommendations> {
        let url = self.endpoint(query_id, top_n);
        let response = self
            .http
            .get(&url)
            .send()
            .with_context(|| format!("request to {} failed", url))?;

        let status = response.status();
        if status.is_success() {
            let body = response
                .json::<Recommendations>()
                .with_context(|| format!("malformed response from {}", url))?;
            return Ok(body);
        }

        let body = response.json::<ErrorBody>().ok();
        Err(classify_failure(status, body, query_id, &url))
    }
}

/// Only a JSON error body proves the recommender itself answered; anything
/// else (wrong base URL, proxy page) is a transport failure.
fn classify_failure(status: StatusCode, body: Option<ErrorBody>, query_id: i64, url: &str) -> RecommenderError {
    match (status, body) {
        (StatusCode::NOT_FOUND, Some(_)) => RecommenderError::NotFound(query_id),
        (StatusCode::BAD_REQUEST, Some(body)) => RecommenderError::InvalidArgument(body.error),
        (status, Some(body)) => {
            RecommenderError::Other(anyhow!("{} returned {}: {}", url, status, body.error))
        }
        (status, None) => RecommenderError::Other(anyhow!("{} returned {}", url, status)),
    }
}
