//! Shared fixtures for workflow integration tests.

#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use quill::prompts::default_from_embedded;
use quill::tool_source::{
    ImageGenerator, ImageToolSource, SearchClient, ToolSourceError, WebSearchToolSource,
    TOOL_GENERATE_ARTICLE_IMAGE, TOOL_WEB_SEARCH,
};
use quill::{ArticleWorkflow, Capabilities, LlmClient, ToolCall, ToolSource, WorkflowConfig, WorkflowProgress};
use tokio::sync::mpsc::UnboundedReceiver;

pub const STUB_IMAGE_URL: &str = "https://images.example/solar.png";

/// Search backend returning fixed text, or failing every call.
pub struct StubSearch {
    pub fail: bool,
    pub queries: Mutex<Vec<String>>,
}

impl StubSearch {
    pub fn ok() -> Arc<Self> {
        Arc::new(Self {
            fail: false,
            queries: Mutex::new(Vec::new()),
        })
    }

    pub fn failing() -> Arc<Self> {
        Arc::new(Self {
            fail: true,
            queries: Mutex::new(Vec::new()),
        })
    }
}

#[async_trait]
impl SearchClient for StubSearch {
    async fn search(&self, query: &str) -> Result<String, ToolSourceError> {
        self.queries.lock().unwrap().push(query.to_string());
        if self.fail {
            Err(ToolSourceError::Transport("search backend down".into()))
        } else {
            Ok(format!("Results for {}: panels convert sunlight", query))
        }
    }
}

/// Image backend returning [`STUB_IMAGE_URL`].
pub struct StubImages;

#[async_trait]
impl ImageGenerator for StubImages {
    async fn create_image(&self, _enhanced_prompt: &str) -> Result<String, ToolSourceError> {
        Ok(STUB_IMAGE_URL.to_string())
    }
}

pub fn search_source(client: Arc<StubSearch>) -> Arc<dyn ToolSource> {
    Arc::new(WebSearchToolSource::new(client))
}

pub fn image_source() -> Arc<dyn ToolSource> {
    Arc::new(ImageToolSource::new(Arc::new(StubImages)))
}

pub fn capabilities(
    researcher: Arc<dyn LlmClient>,
    writer: Arc<dyn LlmClient>,
    editor: Arc<dyn LlmClient>,
    search: Arc<dyn ToolSource>,
) -> Capabilities {
    Capabilities {
        researcher,
        writer,
        editor,
        search,
        images: image_source(),
    }
}

pub fn workflow(capabilities: Capabilities) -> ArticleWorkflow {
    ArticleWorkflow::new(capabilities, default_from_embedded())
}

/// No delay between attempts, images off unless a test turns them on.
pub fn config(retry_attempts: u32) -> WorkflowConfig {
    WorkflowConfig {
        retry_attempts,
        retry_delay_ms: 0,
        enable_image_generation: false,
        ..WorkflowConfig::default()
    }
}

pub fn search_call(query: &str) -> ToolCall {
    ToolCall {
        id: Some("call_search_1".into()),
        name: TOOL_WEB_SEARCH.into(),
        arguments: serde_json::json!({ "query": query }).to_string(),
    }
}

pub fn image_call(prompt: &str, style: &str) -> ToolCall {
    ToolCall {
        id: Some("call_image_1".into()),
        name: TOOL_GENERATE_ARTICLE_IMAGE.into(),
        arguments: serde_json::json!({ "prompt": prompt, "style": style }).to_string(),
    }
}

pub fn drain(rx: &mut UnboundedReceiver<WorkflowProgress>) -> Vec<WorkflowProgress> {
    let mut events = Vec::new();
    while let Ok(e) = rx.try_recv() {
        events.push(e);
    }
    events
}

/// Node ids in the order they were entered.
pub fn visited(events: &[WorkflowProgress]) -> Vec<String> {
    events
        .iter()
        .filter_map(|e| match e {
            WorkflowProgress::NodeStarted { node } => Some(node.clone()),
            _ => None,
        })
        .collect()
}
