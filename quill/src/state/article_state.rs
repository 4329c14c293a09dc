//! `ArticleState`: topic, target length, message log and the three output slots.
//!
//! Nodes return a partial `ArticleState` that holds only the messages they
//! appended and the slots they wrote; `ArticleStateUpdater` merges it:
//!
//! | field | merge |
//! |-------|-------|
//! | `topic`, `word_count` | never overwritten |
//! | `messages` | concatenated |
//! | `research_summary`, `article_draft`, `edited_article` | last writer wins when set |
//! | `generated_images` | concatenated, created on first write |

use serde::{Deserialize, Serialize};

use crate::graph::StateUpdater;
use crate::message::Message;

use super::ImageResult;

/// Target length used by the writer when the caller gave none.
pub const DEFAULT_WORD_COUNT: u32 = 800;

/// Shared state for one article run. Created fresh per attempt.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ArticleState {
    pub topic: String,
    #[serde(default)]
    pub word_count: Option<u32>,
    #[serde(default)]
    pub messages: Vec<Message>,
    #[serde(default)]
    pub research_summary: Option<String>,
    #[serde(default)]
    pub article_draft: Option<String>,
    #[serde(default)]
    pub edited_article: Option<String>,
    #[serde(default)]
    pub generated_images: Option<Vec<ImageResult>>,
}

impl ArticleState {
    /// Initial state for a run: topic and target length, nothing else.
    pub fn new(topic: impl Into<String>, word_count: Option<u32>) -> Self {
        Self {
            topic: topic.into(),
            word_count,
            ..Self::default()
        }
    }

    pub fn word_count_or_default(&self) -> u32 {
        self.word_count.unwrap_or(DEFAULT_WORD_COUNT)
    }

    pub fn last_message(&self) -> Option<&Message> {
        self.messages.last()
    }

    /// Most recent AI message, scanning the log from the end.
    pub fn last_ai_message(&self) -> Option<&Message> {
        self.messages.iter().rev().find(|m| m.is_ai())
    }

    /// Content of the most recent AI message.
    pub fn last_ai_content(&self) -> Option<&str> {
        self.last_ai_message().map(Message::content)
    }

    /// Reads a bindable field; `None` when the slot was never written.
    pub fn field(&self, field: StateField) -> Option<String> {
        match field {
            StateField::Topic => Some(self.topic.clone()),
            StateField::WordCount => Some(self.word_count_or_default().to_string()),
            StateField::ResearchSummary => self.research_summary.clone(),
            StateField::ArticleDraft => self.article_draft.clone(),
            StateField::EditedArticle => self.edited_article.clone(),
        }
    }

    pub fn image_count(&self) -> usize {
        self.generated_images.as_ref().map_or(0, Vec::len)
    }
}

/// Fields an agent can bind into its prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StateField {
    Topic,
    WordCount,
    ResearchSummary,
    ArticleDraft,
    EditedArticle,
}

impl StateField {
    /// Template slot name, e.g. `{research_summary}`.
    pub fn name(&self) -> &'static str {
        match self {
            StateField::Topic => "topic",
            StateField::WordCount => "word_count",
            StateField::ResearchSummary => "research_summary",
            StateField::ArticleDraft => "article_draft",
            StateField::EditedArticle => "edited_article",
        }
    }
}

/// Output slots an agent may write its reply into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputSlot {
    ResearchSummary,
    ArticleDraft,
    EditedArticle,
}

impl OutputSlot {
    pub fn name(&self) -> &'static str {
        self.field().name()
    }

    pub fn field(&self) -> StateField {
        match self {
            OutputSlot::ResearchSummary => StateField::ResearchSummary,
            OutputSlot::ArticleDraft => StateField::ArticleDraft,
            OutputSlot::EditedArticle => StateField::EditedArticle,
        }
    }

    /// Sets the slot on `state`.
    pub fn write(&self, state: &mut ArticleState, value: String) {
        match self {
            OutputSlot::ResearchSummary => state.research_summary = Some(value),
            OutputSlot::ArticleDraft => state.article_draft = Some(value),
            OutputSlot::EditedArticle => state.edited_article = Some(value),
        }
    }
}

/// Per-field merge for `ArticleState` (see module docs).
#[derive(Debug, Clone, Default)]
pub struct ArticleStateUpdater;

impl StateUpdater<ArticleState> for ArticleStateUpdater {
    fn apply_update(&self, current: &mut ArticleState, update: &ArticleState) {
        current.messages.extend(update.messages.iter().cloned());
        if let Some(v) = &update.research_summary {
            current.research_summary = Some(v.clone());
        }
        if let Some(v) = &update.article_draft {
            current.article_draft = Some(v.clone());
        }
        if let Some(v) = &update.edited_article {
            current.edited_article = Some(v.clone());
        }
        if let Some(images) = update.generated_images.as_ref().filter(|v| !v.is_empty()) {
            current
                .generated_images
                .get_or_insert_with(Vec::new)
                .extend(images.iter().cloned());
        }
    }
}
