//! `{field}` prompt templates.
//!
//! A template is literal text with `{name}` slots. `{{` and `}}` produce
//! literal braces. Rendering fails on the first slot without a value.

use std::collections::HashMap;

use crate::error::AgentError;

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Literal(String),
    Slot(String),
}

/// Parsed prompt template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptTemplate {
    source: String,
    segments: Vec<Segment>,
}

impl PromptTemplate {
    /// Parses `source`. An unclosed `{` or a stray `}` is an error naming the fragment.
    pub fn parse(source: impl Into<String>) -> Result<Self, AgentError> {
        let source = source.into();
        let mut segments = Vec::new();
        let mut literal = String::new();
        let mut chars = source.char_indices().peekable();

        while let Some((i, c)) = chars.next() {
            match c {
                '{' if chars.peek().map(|&(_, n)| n) == Some('{') => {
                    chars.next();
                    literal.push('{');
                }
                '}' if chars.peek().map(|&(_, n)| n) == Some('}') => {
                    chars.next();
                    literal.push('}');
                }
                '{' => {
                    let rest = &source[i + 1..];
                    let end = rest.find('}').ok_or_else(|| AgentError::TemplateRender {
                        field: rest.chars().take(20).collect(),
                    })?;
                    let name = rest[..end].trim();
                    if name.is_empty() || name.contains('{') {
                        return Err(AgentError::TemplateRender {
                            field: rest[..end].to_string(),
                        });
                    }
                    if !literal.is_empty() {
                        segments.push(Segment::Literal(std::mem::take(&mut literal)));
                    }
                    segments.push(Segment::Slot(name.to_string()));
                    for _ in 0..=rest[..end].chars().count() {
                        chars.next();
                    }
                }
                '}' => {
                    return Err(AgentError::TemplateRender {
                        field: "}".to_string(),
                    })
                }
                other => literal.push(other),
            }
        }
        if !literal.is_empty() {
            segments.push(Segment::Literal(literal));
        }
        Ok(Self { source, segments })
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    /// Distinct slot names in order of first appearance.
    pub fn slots(&self) -> Vec<&str> {
        let mut names: Vec<&str> = Vec::new();
        for seg in &self.segments {
            if let Segment::Slot(name) = seg {
                if !names.contains(&name.as_str()) {
                    names.push(name);
                }
            }
        }
        names
    }

    /// Substitutes every slot from `values`; extra values are ignored.
    pub fn render(&self, values: &HashMap<String, String>) -> Result<String, AgentError> {
        let mut out = String::with_capacity(self.source.len());
        for seg in &self.segments {
            match seg {
                Segment::Literal(text) => out.push_str(text),
                Segment::Slot(name) => {
                    let value = values.get(name).ok_or_else(|| AgentError::TemplateRender {
                        field: name.clone(),
                    })?;
                    out.push_str(value);
                }
            }
        }
        Ok(out)
    }
}
