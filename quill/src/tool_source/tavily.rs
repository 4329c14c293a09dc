//! Tavily search client: POST `/search`, results formatted as markdown text.

use std::time::Duration;

use async_trait::async_trait;
use env_config::ProviderSettings;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{SearchClient, ToolSourceError};

const TAVILY_SEARCH_URL: &str = "https://api.tavily.com/search";
const DEFAULT_TIMEOUT_SECS: u64 = 30;
const DEFAULT_MAX_RESULTS: u32 = 5;

/// Typed errors for the Tavily API.
#[derive(Debug, thiserror::Error)]
pub enum TavilyError {
    #[error("request timed out")]
    Timeout,
    #[error("network error: {0}")]
    Network(String),
    #[error("unauthorized, check TAVILY_API_KEY")]
    Unauthorized,
    #[error("rate limited")]
    RateLimited,
    #[error("HTTP error ({0}): {1}")]
    Http(u16, String),
    #[error("failed to parse response: {0}")]
    Parse(String),
}

impl From<TavilyError> for ToolSourceError {
    fn from(e: TavilyError) -> Self {
        ToolSourceError::Transport(format!("Tavily API error: {}", e))
    }
}

#[derive(Debug, Serialize)]
struct TavilyRequest<'a> {
    query: &'a str,
    max_results: u32,
    search_depth: &'static str,
    include_answer: bool,
}

#[derive(Debug, Deserialize)]
struct TavilyResponse {
    #[serde(default)]
    answer: Option<String>,
    #[serde(default)]
    results: Vec<TavilyResult>,
}

#[derive(Debug, Deserialize)]
struct TavilyResult {
    title: String,
    url: String,
    #[serde(default)]
    content: String,
}

impl TavilyResponse {
    fn to_markdown(&self, query: &str) -> String {
        if self.results.is_empty() && self.answer.is_none() {
            return format!("No results found for \"{}\".", query);
        }
        let mut out = String::new();
        if let Some(answer) = &self.answer {
            out.push_str(&format!("**Answer:** {}\n\n", answer));
        }
        for r in &self.results {
            out.push_str(&format!("### [{}]({})\n{}\n\n", r.title, r.url, r.content));
        }
        out.trim_end().to_string()
    }
}

/// Tavily web search.
pub struct TavilySearch {
    api_key: String,
    client: reqwest::Client,
    max_results: u32,
}

impl TavilySearch {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            client: reqwest::Client::new(),
            max_results: DEFAULT_MAX_RESULTS,
        }
    }

    /// Fails when `TAVILY_API_KEY` was not configured.
    pub fn from_settings(settings: &ProviderSettings) -> Result<Self, ToolSourceError> {
        settings
            .tavily_api_key
            .as_deref()
            .map(Self::new)
            .ok_or_else(|| ToolSourceError::MissingCredentials("TAVILY_API_KEY".to_string()))
    }

    /// Results per query; at least one.
    pub fn with_max_results(mut self, max_results: u32) -> Self {
        self.max_results = max_results.max(1);
        self
    }

    pub fn max_results(&self) -> u32 {
        self.max_results
    }

    async fn request(&self, query: &str) -> Result<TavilyResponse, TavilyError> {
        let body = TavilyRequest {
            query,
            max_results: self.max_results,
            search_depth: "basic",
            include_answer: true,
        };
        let response = self
            .client
            .post(TAVILY_SEARCH_URL)
            .bearer_auth(&self.api_key)
            .timeout(Duration::from_secs(DEFAULT_TIMEOUT_SECS))
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    TavilyError::Timeout
                } else {
                    TavilyError::Network(e.to_string())
                }
            })?;

        let status = response.status();
        if status.is_success() {
            return response
                .json()
                .await
                .map_err(|e| TavilyError::Parse(e.to_string()));
        }
        let text = response.text().await.unwrap_or_default();
        match status.as_u16() {
            401 => Err(TavilyError::Unauthorized),
            429 => Err(TavilyError::RateLimited),
            code => Err(TavilyError::Http(code, text)),
        }
    }
}

#[async_trait]
impl SearchClient for TavilySearch {
    async fn search(&self, query: &str) -> Result<String, ToolSourceError> {
        debug!(query = %query, max_results = self.max_results, "tavily search");
        let response = self.request(query).await?;
        debug!(results = response.results.len(), "tavily search complete");
        Ok(response.to_markdown(query))
    }
}
