//! Prompt templates for the researcher, writer and editor.
//!
//! [`PromptSet`] holds the raw template text; [`PromptTemplate`] parses and
//! renders `{field}` slots. Text is loaded from YAML (see [`load`]) with
//! embedded defaults.

mod load;
mod template;

pub use load::{default_from_embedded, load, load_or_default, LoadError, PROMPTS_DIR_ENV};
pub use template::PromptTemplate;

use serde::{Deserialize, Serialize};

/// Slot after which the image instruction is inserted.
const ARTICLE_DRAFT_SLOT: &str = "{article_draft}";

/// Editor voice.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EditorStyle {
    #[default]
    General,
    Emotional,
    Hilarious,
    Critical,
}

impl EditorStyle {
    pub const ALL: [EditorStyle; 4] = [
        EditorStyle::General,
        EditorStyle::Emotional,
        EditorStyle::Hilarious,
        EditorStyle::Critical,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::General => "General",
            Self::Emotional => "Emotional",
            Self::Hilarious => "Hilarious",
            Self::Critical => "Critical",
        }
    }
}

impl std::fmt::Display for EditorStyle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for EditorStyle {
    type Err = String;

    /// Case-insensitive.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "general" => Ok(Self::General),
            "emotional" => Ok(Self::Emotional),
            "hilarious" => Ok(Self::Hilarious),
            "critical" => Ok(Self::Critical),
            _ => Err(format!(
                "unknown editor style: {} (use General, Emotional, Hilarious or Critical)",
                s
            )),
        }
    }
}

/// Editor templates, one per style, plus the image instruction fragment.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EditorPrompts {
    pub general: String,
    pub emotional: String,
    pub hilarious: String,
    pub critical: String,
    pub image_instruction: String,
}

impl EditorPrompts {
    pub fn template(&self, style: EditorStyle) -> &str {
        match style {
            EditorStyle::General => &self.general,
            EditorStyle::Emotional => &self.emotional,
            EditorStyle::Hilarious => &self.hilarious,
            EditorStyle::Critical => &self.critical,
        }
    }

    /// The template for `style`; with images, the image instruction follows
    /// every `{article_draft}` slot.
    pub fn build(&self, style: EditorStyle, with_images: bool) -> String {
        let base = self.template(style);
        if with_images {
            base.replace(
                ARTICLE_DRAFT_SLOT,
                &format!("{}\n\n{}", ARTICLE_DRAFT_SLOT, self.image_instruction),
            )
        } else {
            base.to_string()
        }
    }
}

/// Raw prompt text for all three agents.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PromptSet {
    pub researcher: String,
    pub writer: String,
    pub editor: EditorPrompts,
}
