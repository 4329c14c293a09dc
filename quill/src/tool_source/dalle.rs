//! DALL·E image backend over the OpenAI images API (`async_openai`).

use async_openai::{
    config::OpenAIConfig,
    types::images::{CreateImageRequest, CreateImageRequestArgs, ImageModel, ImageQuality, ImageSize},
    Client,
};
use async_trait::async_trait;
use env_config::ProviderSettings;
use serde_json::Value;
use tracing::{debug, trace};

use super::{ImageGenerator, ToolSourceError};
use crate::llm::openai_config;

/// One 1024x1024 standard-quality image per request.
pub struct DallEImageGenerator {
    client: Client<OpenAIConfig>,
    model: String,
}

impl DallEImageGenerator {
    pub fn new(base_url: &str, api_key: Option<&str>, model: impl Into<String>) -> Self {
        Self {
            client: Client::with_config(openai_config(base_url, api_key)),
            model: model.into(),
        }
    }

    pub fn from_settings(settings: &ProviderSettings) -> Self {
        Self::new(
            &settings.openai_base_url,
            settings.openai_api_key.as_deref(),
            settings.image_model.clone(),
        )
    }

    fn image_model(&self) -> ImageModel {
        match self.model.as_str() {
            "dall-e-3" => ImageModel::DallE3,
            "dall-e-2" => ImageModel::DallE2,
            other => ImageModel::Other(other.to_string()),
        }
    }

    fn build_request(&self, enhanced_prompt: &str) -> Result<CreateImageRequest, ToolSourceError> {
        let mut args = CreateImageRequestArgs::default();
        args.prompt(enhanced_prompt)
            .model(self.image_model())
            .size(ImageSize::S1024x1024)
            .n(1);
        if self.model == "dall-e-3" {
            args.quality(ImageQuality::Standard);
        }
        args.build()
            .map_err(|e| ToolSourceError::Transport(format!("image request build failed: {}", e)))
    }
}

/// First `url` in the response's `data` list.
fn first_url(response: &Value) -> Result<String, ToolSourceError> {
    response["data"]
        .as_array()
        .and_then(|items| items.iter().find_map(|d| d["url"].as_str()))
        .map(str::to_string)
        .ok_or_else(|| ToolSourceError::Transport("image API returned no URL".to_string()))
}

#[async_trait]
impl ImageGenerator for DallEImageGenerator {
    async fn create_image(&self, enhanced_prompt: &str) -> Result<String, ToolSourceError> {
        let request = self.build_request(enhanced_prompt)?;
        debug!(model = %self.model, "image generation request");
        let response = self
            .client
            .images()
            .generate(request)
            .await
            .map_err(|e| ToolSourceError::Transport(e.to_string()))?;
        let body = serde_json::to_value(&response)
            .map_err(|e| ToolSourceError::Transport(e.to_string()))?;
        trace!(response = %body, "image generation response");
        first_url(&body)
    }
}
