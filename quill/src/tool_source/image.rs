//! Image generation capability and the `generate_article_image` tool.
//!
//! Backends implement [`ImageGenerator::create_image`]; the provided
//! [`ImageGenerator::generate`] applies the style to the prompt and turns any
//! failure into a placeholder result, so callers always get an `ImageResult`.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{json, Value};
use tracing::{info, warn};

use crate::state::ImageResult;

use super::{required_str, ToolCallContent, ToolSource, ToolSourceError, ToolSpec};

pub const TOOL_GENERATE_ARTICLE_IMAGE: &str = "generate_article_image";
pub const DEFAULT_IMAGE_STYLE: &str = "photorealistic";
pub const PLACEHOLDER_IMAGE_URL: &str =
    "https://via.placeholder.com/1024x1024.png?text=Image+Generation+Failed";

#[async_trait]
pub trait ImageGenerator: Send + Sync {
    /// Generates one image for the already style-enhanced prompt; returns its URL.
    async fn create_image(&self, enhanced_prompt: &str) -> Result<String, ToolSourceError>;

    /// Generates an image for `prompt` in `style` (default `photorealistic`).
    ///
    /// Never fails: an upstream error yields the placeholder URL and `error` set.
    async fn generate(&self, prompt: &str, style: Option<&str>) -> ImageResult {
        let style = style
            .filter(|s| !s.trim().is_empty())
            .unwrap_or(DEFAULT_IMAGE_STYLE);
        let enhanced = format!("{}, {} style", prompt, style);
        info!(prompt = %enhanced, "generating image");
        match self.create_image(&enhanced).await {
            Ok(url) => ImageResult {
                url,
                prompt: prompt.to_string(),
                style: style.to_string(),
                error: None,
            },
            Err(e) => {
                warn!(error = %e, "image generation failed");
                ImageResult {
                    url: PLACEHOLDER_IMAGE_URL.to_string(),
                    prompt: prompt.to_string(),
                    style: style.to_string(),
                    error: Some(e.to_string()),
                }
            }
        }
    }
}

/// Exposes an [`ImageGenerator`] as the `generate_article_image` tool.
///
/// The result text is the `ImageResult` as JSON, which the image tool node
/// parses back.
pub struct ImageToolSource {
    generator: Arc<dyn ImageGenerator>,
}

impl ImageToolSource {
    pub fn new(generator: Arc<dyn ImageGenerator>) -> Self {
        Self { generator }
    }

    pub fn spec() -> ToolSpec {
        ToolSpec {
            name: TOOL_GENERATE_ARTICLE_IMAGE.to_string(),
            description: Some(
                "Generate an image to accompany the article. Use this to create visual \
                 content that enhances the article."
                    .to_string(),
            ),
            input_schema: json!({
                "type": "object",
                "properties": {
                    "prompt": { "type": "string", "description": "Description of the image" },
                    "style": {
                        "type": "string",
                        "description": "Image style (photorealistic, illustration, cartoon, ...)",
                        "default": DEFAULT_IMAGE_STYLE
                    }
                },
                "required": ["prompt"]
            }),
        }
    }
}

#[async_trait]
impl ToolSource for ImageToolSource {
    async fn list_tools(&self) -> Result<Vec<ToolSpec>, ToolSourceError> {
        Ok(vec![Self::spec()])
    }

    async fn call_tool(
        &self,
        name: &str,
        arguments: Value,
    ) -> Result<ToolCallContent, ToolSourceError> {
        if name != TOOL_GENERATE_ARTICLE_IMAGE {
            return Err(ToolSourceError::NotFound(name.to_string()));
        }
        let prompt = required_str(&arguments, "prompt")?;
        let style = arguments.get("style").and_then(Value::as_str);
        let result = self.generator.generate(prompt, style).await;
        let text = serde_json::to_string(&result)
            .map_err(|e| ToolSourceError::InvalidInput(e.to_string()))?;
        Ok(ToolCallContent { text })
    }
}
