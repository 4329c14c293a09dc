//! Assembles the article graph from capabilities, prompts and config.
//!
//! ```text
//! START -> research -(tools)-> web_search -> research
//!          research -(continue)-> write -> edit
//!          edit -(tools)-> image_generation -> edit     (image generation on)
//!          edit -(continue)-> END
//! ```

use std::sync::Arc;

use crate::agent::{AgentNode, FieldBinding, ToolNode, ToolRouter};
use crate::graph::{CompiledStateGraph, NodeMiddleware, StateGraph, END, START};
use crate::llm::{bind_tools, LlmClient};
use crate::prompts::{PromptSet, PromptTemplate};
use crate::state::{ArticleState, ArticleStateUpdater, OutputSlot, StateField};
use crate::tool_source::ToolSource;

use super::{WorkflowConfig, WorkflowError};

pub const RESEARCH_NODE: &str = "research";
pub const WEB_SEARCH_NODE: &str = "web_search";
pub const WRITE_NODE: &str = "write";
pub const EDIT_NODE: &str = "edit";
pub const IMAGE_GENERATION_NODE: &str = "image_generation";

/// External collaborators of the workflow.
#[derive(Clone)]
pub struct Capabilities {
    pub researcher: Arc<dyn LlmClient>,
    pub writer: Arc<dyn LlmClient>,
    pub editor: Arc<dyn LlmClient>,
    /// Offers the `web_search` tool to the researcher.
    pub search: Arc<dyn ToolSource>,
    /// Offers the `generate_article_image` tool to the editor.
    pub images: Arc<dyn ToolSource>,
}

impl Capabilities {
    /// One model for all three agents.
    pub fn shared(
        llm: Arc<dyn LlmClient>,
        search: Arc<dyn ToolSource>,
        images: Arc<dyn ToolSource>,
    ) -> Self {
        Self {
            researcher: llm.clone(),
            writer: llm.clone(),
            editor: llm,
            search,
            images,
        }
    }
}

fn template(agent: &str, source: &str) -> Result<PromptTemplate, WorkflowError> {
    PromptTemplate::parse(source).map_err(|source| WorkflowError::InvalidTemplate {
        agent: agent.to_string(),
        source,
    })
}

/// Builds and compiles the article graph.
///
/// Lists the tools of `search` (and of `images` when image generation is on)
/// to bind them to the researcher and editor models; no model is called.
pub async fn build_workflow(
    capabilities: &Capabilities,
    prompts: &PromptSet,
    config: &WorkflowConfig,
) -> Result<CompiledStateGraph<ArticleState>, WorkflowError> {
    build_with_middleware(capabilities, prompts, config, None).await
}

pub(crate) async fn build_with_middleware(
    capabilities: &Capabilities,
    prompts: &PromptSet,
    config: &WorkflowConfig,
    middleware: Option<Arc<dyn NodeMiddleware<ArticleState>>>,
) -> Result<CompiledStateGraph<ArticleState>, WorkflowError> {
    let images = config.enable_image_generation;

    let researcher_llm = bind_tools(
        capabilities.researcher.clone(),
        capabilities.search.list_tools().await?,
    );
    let editor_llm = if images {
        bind_tools(
            capabilities.editor.clone(),
            capabilities.images.list_tools().await?,
        )
    } else {
        capabilities.editor.clone()
    };

    let research = AgentNode::new(
        RESEARCH_NODE,
        researcher_llm,
        template(RESEARCH_NODE, &prompts.researcher)?,
    )
    .output(OutputSlot::ResearchSummary);
    let write = AgentNode::new(
        WRITE_NODE,
        capabilities.writer.clone(),
        template(WRITE_NODE, &prompts.writer)?,
    )
    .require(FieldBinding::state(StateField::ResearchSummary).or_last_ai_message())
    .require(FieldBinding::state(StateField::WordCount))
    .output(OutputSlot::ArticleDraft);
    let edit = AgentNode::new(
        EDIT_NODE,
        editor_llm,
        template(EDIT_NODE, &prompts.editor.build(config.editor_style, images))?,
    )
    .require(FieldBinding::state(StateField::ArticleDraft).or_last_ai_message())
    .output(OutputSlot::EditedArticle);

    let mut graph = StateGraph::<ArticleState>::new()
        .with_state_updater(Arc::new(ArticleStateUpdater))
        .with_max_steps(config.max_steps);
    if let Some(mw) = middleware {
        graph = graph.with_middleware(mw);
    }

    let after_research = ToolRouter::new(WEB_SEARCH_NODE, WRITE_NODE);
    graph
        .add_node(RESEARCH_NODE, Arc::new(research))
        .add_node(
            WEB_SEARCH_NODE,
            Arc::new(ToolNode::new(WEB_SEARCH_NODE, capabilities.search.clone())),
        )
        .add_node(WRITE_NODE, Arc::new(write))
        .add_node(EDIT_NODE, Arc::new(edit))
        .add_edge(START, RESEARCH_NODE)
        .add_conditional_edges(
            RESEARCH_NODE,
            after_research.router_fn(),
            Some(after_research.path_map()),
        )
        .add_edge(WEB_SEARCH_NODE, RESEARCH_NODE)
        .add_edge(WRITE_NODE, EDIT_NODE);

    if images {
        let after_edit = ToolRouter::new(IMAGE_GENERATION_NODE, END);
        graph
            .add_node(
                IMAGE_GENERATION_NODE,
                Arc::new(ToolNode::images(
                    IMAGE_GENERATION_NODE,
                    capabilities.images.clone(),
                )),
            )
            .add_conditional_edges(EDIT_NODE, after_edit.router_fn(), Some(after_edit.path_map()))
            .add_edge(IMAGE_GENERATION_NODE, EDIT_NODE);
    } else {
        graph.add_edge(EDIT_NODE, END);
    }

    Ok(graph.compile()?)
}
