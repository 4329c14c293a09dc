//! Wires concrete providers into `Capabilities`.

use std::sync::Arc;

use async_trait::async_trait;
use quill::tool_source::{
    ImageToolSource, MockToolSource, SearchClient, ToolSourceError, WebSearchToolSource,
};
use quill::{Capabilities, ChatOpenAI, DallEImageGenerator, MockLlm, TavilySearch};
use quill_config::ProviderSettings;
use tracing::warn;

/// Stands in for Tavily when no key is configured; every search reports the missing key.
struct UnconfiguredSearch {
    missing: String,
}

#[async_trait]
impl SearchClient for UnconfiguredSearch {
    async fn search(&self, _query: &str) -> Result<String, ToolSourceError> {
        Err(ToolSourceError::MissingCredentials(self.missing.clone()))
    }
}

/// Per-run provider knobs taken from the command line.
#[derive(Clone, Copy, Debug, Default)]
pub struct Tuning {
    pub temperature: Option<f32>,
    pub search_results: Option<u32>,
}

fn chat_model(settings: &ProviderSettings, tuning: &Tuning) -> ChatOpenAI {
    let llm = ChatOpenAI::from_settings(settings);
    match tuning.temperature {
        Some(t) => llm.with_temperature(t),
        None => llm,
    }
}

fn tavily(settings: &ProviderSettings, tuning: &Tuning) -> Result<TavilySearch, ToolSourceError> {
    let search = TavilySearch::from_settings(settings)?;
    Ok(match tuning.search_results {
        Some(n) => search.with_max_results(n),
        None => search,
    })
}

/// OpenAI-compatible chat for all three agents, Tavily search, DALL-E images.
pub fn from_settings(settings: &ProviderSettings, tuning: &Tuning) -> Capabilities {
    if settings.openai_api_key.is_none() {
        warn!("OPENAI_API_KEY is not set; model calls will likely be rejected");
    }
    let search: Arc<dyn SearchClient> = match tavily(settings, tuning) {
        Ok(tavily) => Arc::new(tavily),
        Err(e) => {
            warn!(error = %e, "web search disabled");
            let missing = match e {
                ToolSourceError::MissingCredentials(key) => key,
                other => other.to_string(),
            };
            Arc::new(UnconfiguredSearch { missing })
        }
    };
    Capabilities::shared(
        Arc::new(chat_model(settings, tuning)),
        Arc::new(WebSearchToolSource::new(search)),
        Arc::new(ImageToolSource::new(Arc::new(
            DallEImageGenerator::from_settings(settings),
        ))),
    )
}

/// Same tool lists as the real providers, nothing behind them. Used to render the graph.
pub fn placeholders() -> Capabilities {
    Capabilities::shared(
        Arc::new(MockLlm::with_no_tool_calls("")),
        Arc::new(MockToolSource::new(vec![WebSearchToolSource::spec()], "")),
        Arc::new(MockToolSource::new(vec![ImageToolSource::spec()], "")),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use quill::ToolSource;

    #[tokio::test]
    async fn missing_tavily_key_degrades_to_error_text() {
        let settings = ProviderSettings::from_lookup(|_| None);
        let caps = from_settings(&settings, &Tuning::default());
        let out = caps
            .search
            .call_tool("web_search", serde_json::json!({ "query": "solar" }))
            .await
            .unwrap();
        assert!(out.text.starts_with("Web search failed:"), "{}", out.text);
        assert!(out.text.contains("TAVILY_API_KEY"), "{}", out.text);
    }

    #[test]
    fn tuning_reaches_the_providers() {
        let settings =
            ProviderSettings::from_lookup(|k| (k == "TAVILY_API_KEY").then(|| "tv".into()));
        let tuning = Tuning {
            temperature: Some(0.3),
            search_results: Some(8),
        };
        assert_eq!(chat_model(&settings, &tuning).temperature(), Some(0.3));
        assert_eq!(tavily(&settings, &tuning).unwrap().max_results(), 8);
        assert_eq!(chat_model(&settings, &Tuning::default()).temperature(), None);
    }

    #[tokio::test]
    async fn placeholders_list_real_tool_names() {
        let caps = placeholders();
        let search = caps.search.list_tools().await.unwrap();
        let images = caps.images.list_tools().await.unwrap();
        assert_eq!(search[0].name, "web_search");
        assert_eq!(images[0].name, "generate_article_image");
    }
}
