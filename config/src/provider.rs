//! Provider credentials and endpoints, read once from the environment.

use std::env;

pub const DEFAULT_OPENAI_BASE_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_OPENAI_MODEL: &str = "gpt-4o";
pub const DEFAULT_IMAGE_MODEL: &str = "dall-e-3";

/// Settings for the OpenAI-compatible chat/image API and the search service.
///
/// Keys are optional here; the consumer decides whether a missing key is fatal.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct ProviderSettings {
    pub openai_api_key: Option<String>,
    pub openai_base_url: String,
    pub openai_model: String,
    pub image_model: String,
    pub tavily_api_key: Option<String>,
}

impl std::fmt::Debug for ProviderSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let redact = |k: &Option<String>| k.as_ref().map(|_| "***");
        f.debug_struct("ProviderSettings")
            .field("openai_api_key", &redact(&self.openai_api_key))
            .field("openai_base_url", &self.openai_base_url)
            .field("openai_model", &self.openai_model)
            .field("image_model", &self.image_model)
            .field("tavily_api_key", &redact(&self.tavily_api_key))
            .finish()
    }
}

fn non_empty(key: &str) -> Option<String> {
    env::var(key).ok().filter(|v| !v.trim().is_empty())
}

impl ProviderSettings {
    /// Reads `OPENAI_API_KEY`, `OPENAI_BASE_URL`, `OPENAI_MODEL`,
    /// `OPENAI_IMAGE_MODEL` and `TAVILY_API_KEY`. Empty values count as unset.
    pub fn from_env() -> Self {
        Self::from_lookup(non_empty)
    }

    /// Builds settings from an arbitrary lookup; used by `from_env` and tests.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        Self {
            openai_api_key: lookup("OPENAI_API_KEY"),
            openai_base_url: lookup("OPENAI_BASE_URL")
                .unwrap_or_else(|| DEFAULT_OPENAI_BASE_URL.to_string()),
            openai_model: lookup("OPENAI_MODEL").unwrap_or_else(|| DEFAULT_OPENAI_MODEL.to_string()),
            image_model: lookup("OPENAI_IMAGE_MODEL")
                .unwrap_or_else(|| DEFAULT_IMAGE_MODEL.to_string()),
            tavily_api_key: lookup("TAVILY_API_KEY"),
        }
    }
}
