use std::fmt;
use std::sync::Arc;

use na_core::text::{cap_words, truncate_chars};
use na_core::{Error, Result, SummarizationModel, SummaryBounds};
use tracing::{debug, warn};

pub struct Summarizer {
    model: Arc<dyn SummarizationModel>,
    bounds: SummaryBounds,
    char_budget: usize,
}

impl fmt::Debug for Summarizer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Summarizer")
            .field("model", &self.model.name())
            .field("bounds", &self.bounds)
            .field("char_budget", &self.char_budget)
            .finish()
    }
}

/// Text shown in place of a summary when summarization fails.
pub fn placeholder(error: &Error) -> String {
    format!("[summary unavailable: {}: {}]", error.kind(), error)
}

impl Summarizer {
    pub fn new(model: Arc<dyn SummarizationModel>, bounds: SummaryBounds, char_budget: usize) -> Self {
        Self {
            model,
            bounds,
            char_budget,
        }
    }

    pub fn model_name(&self) -> &str {
        self.model.name()
    }

    pub fn bounds(&self) -> SummaryBounds {
        self.bounds
    }

    /// Summarizes at most `char_budget` characters of `text`. The result
    /// never exceeds `max_length` words.
    pub async fn summarize(&self, text: &str) -> Result<String> {
        let input = truncate_chars(text.trim(), self.char_budget).trim();
        if input.is_empty() {
            return Err(Error::EmptyInput("nothing to summarize".to_string()));
        }

        debug!("Summarizing {} chars with {}", input.len(), self.model.name());
        let summary = self.model.summarize(input, self.bounds).await?;
        Ok(cap_words(summary.trim(), self.bounds.max_length))
    }

    pub async fn summarize_or_placeholder(&self, text: &str) -> String {
        match self.summarize(text).await {
            Ok(summary) => summary,
            Err(e) => {
                warn!("⚠️ Summarization failed: {}", e);
                placeholder(&e)
            }
        }
    }
}
