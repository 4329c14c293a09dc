//! Progress lines and state summaries for stderr.

use quill::{ArticleState, Message, WorkflowProgress};

/// Truncates to at most `max` chars, appending "..." when cut. UTF-8 safe.
pub fn truncate_display(s: &str, max: usize) -> String {
    const SUFFIX: &str = "...";
    if s.chars().count() <= max {
        return s.to_string();
    }
    if max <= SUFFIX.len() {
        return s.chars().take(max).collect();
    }
    let head: String = s.chars().take(max - SUFFIX.len()).collect();
    format!("{}{}", head, SUFFIX)
}

/// One stderr line per progress event.
pub fn progress_line(event: &WorkflowProgress) -> String {
    match event {
        WorkflowProgress::Initializing => "Initializing workflow...".to_string(),
        WorkflowProgress::AttemptStarted { attempt, of } => {
            format!("Attempt {}/{}", attempt, of)
        }
        WorkflowProgress::NodeStarted { node } => format!("Entering: {}", node),
        WorkflowProgress::NodeFinished { node } => format!("Finished: {}", node),
        WorkflowProgress::AttemptFailed { attempt, error } => {
            format!("Attempt {} failed: {}", attempt, truncate_display(error, 200))
        }
        WorkflowProgress::Completed => "Workflow completed".to_string(),
    }
}

fn message_line(m: &Message, max: usize) -> String {
    match m {
        Message::Human { content } => format!("Human({})", truncate_display(content, max)),
        Message::Ai {
            content,
            tool_calls,
        } if !tool_calls.is_empty() => {
            let names: Vec<&str> = tool_calls.iter().map(|c| c.name.as_str()).collect();
            format!(
                "Ai({}) -> tools [{}]",
                truncate_display(content, max),
                names.join(", ")
            )
        }
        Message::Ai { content, .. } => format!("Ai({})", truncate_display(content, max)),
        Message::Tool { name, content, .. } => {
            format!("Tool[{}]({})", name, truncate_display(content, max))
        }
    }
}

/// Summary of the final state: slots, message log and images, one item per line.
pub fn state_summary(state: &ArticleState, max: usize) -> String {
    let opt = |v: &Option<String>| {
        v.as_deref()
            .map(|s| truncate_display(s, max))
            .unwrap_or_else(|| "-".to_string())
    };
    let mut lines = vec![
        format!("topic: {}", state.topic),
        format!("word_count: {}", state.word_count_or_default()),
        format!("research_summary: {}", opt(&state.research_summary)),
        format!("article_draft: {}", opt(&state.article_draft)),
        format!("edited_article: {}", opt(&state.edited_article)),
        format!("messages: {}", state.messages.len()),
    ];
    lines.extend(
        state
            .messages
            .iter()
            .map(|m| format!("  {}", message_line(m, max))),
    );
    if let Some(images) = &state.generated_images {
        lines.push(format!("images: {}", images.len()));
        lines.extend(images.iter().map(|i| format!("  {}", i.url)));
    }
    lines.join("\n")
}
