//! Summary text extraction from summarizer responses.
//!
//! The summarizer has returned the text under several keys over time. Each
//! accepted shape is a named strategy; strategies are tried in order and the first
//! one whose key is present decides the result, even when its value is blank.

use serde_json::Value;

/// A JSON path to try, with a name used in logs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExtractionStrategy {
    pub name: &'static str,
    pub path: &'static [&'static str],
}

impl ExtractionStrategy {
    /// Value at this strategy's path, if every key along it exists.
    pub fn locate<'a>(&self, body: &'a Value) -> Option<&'a Value> {
        self.path
            .iter()
            .try_fold(body, |node, key| node.as_object()?.get(*key))
    }
}

pub const STRATEGIES: &[ExtractionStrategy] = &[
    ExtractionStrategy {
        name: "top_level_content",
        path: &["content"],
    },
    ExtractionStrategy {
        name: "top_level_summary",
        path: &["summary"],
    },
    ExtractionStrategy {
        name: "top_level_result",
        path: &["result"],
    },
    ExtractionStrategy {
        name: "nested_data_content",
        path: &["data", "content"],
    },
    ExtractionStrategy {
        name: "nested_data_summary",
        path: &["data", "summary"],
    },
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractedContent {
    pub strategy: &'static str,
    pub content: String,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ExtractionError {
    #[error("AI response missing or empty content")]
    Missing,

    #[error("AI response missing or empty content (matched {strategy})")]
    Empty { strategy: &'static str },
}

/// Run [`STRATEGIES`] against the response body.
pub fn extract_content(body: &Value) -> Result<ExtractedContent, ExtractionError> {
    extract_with(STRATEGIES, body)
}

pub fn extract_with(
    strategies: &[ExtractionStrategy],
    body: &Value,
) -> Result<ExtractedContent, ExtractionError> {
    let (strategy, value) = strategies
        .iter()
        .find_map(|s| s.locate(body).map(|v| (s, v)))
        .ok_or(ExtractionError::Missing)?;

    let text = match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    };

    let content = text.trim();
    if content.is_empty() {
        return Err(ExtractionError::Empty {
            strategy: strategy.name,
        });
    }

    tracing::debug!(strategy = strategy.name, "Extracted summary content");

    Ok(ExtractedContent {
        strategy: strategy.name,
        content: content.to_string(),
    })
}
