//! Web search client (serper.dev)

use crate::error::{MarketError, Result};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::time::Duration;
use tracing::debug;

const BASE_URL: &str = "https://google.serper.dev";

/// One organic search result
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchHit {
    pub title: String,
    pub link: String,
    #[serde(default)]
    pub snippet: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SearchResponse {
    #[serde(default)]
    answer_box: Option<AnswerBox>,
    #[serde(default)]
    organic: Vec<SearchHit>,
}

#[derive(Debug, Deserialize)]
struct AnswerBox {
    #[serde(default)]
    answer: Option<String>,
    #[serde(default)]
    snippet: Option<String>,
}

/// Search results with the direct answer, when the engine has one
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SearchResults {
    pub answer: Option<String>,
    pub hits: Vec<SearchHit>,
}

/// Web search client
#[derive(Debug, Clone)]
pub struct SerperClient {
    client: Client,
    base_url: String,
    api_key: String,
}

impl SerperClient {
    pub fn new(api_key: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| MarketError::ConfigError(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url: BASE_URL.to_string(),
            api_key: api_key.into(),
        })
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Run a web search
    pub async fn search(&self, query: &str) -> Result<SearchResults> {
        let url = format!("{}/search", self.base_url.trim_end_matches('/'));
        debug!(%url, query, "Web search");

        let response = self
            .client
            .post(&url)
            .header("X-API-KEY", &self.api_key)
            .json(&json!({ "q": query }))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(MarketError::HttpStatus {
                status: status.as_u16(),
                endpoint: "search".to_string(),
            });
        }

        let body: SearchResponse = response.json().await?;
        Ok(SearchResults {
            answer: body.answer_box.and_then(|b| b.answer.or(b.snippet)),
            hits: body.organic,
        })
    }
}
