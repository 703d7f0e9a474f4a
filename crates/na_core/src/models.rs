use std::fmt;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::types::RawEntity;
use crate::Result;

/// One raw score emitted by a sequence classifier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LabelScore {
    pub label: String,
    pub score: f64,
}

/// Token bounds handed to a summarization model.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SummaryBounds {
    pub min_length: usize,
    pub max_length: usize,
}

impl Default for SummaryBounds {
    fn default() -> Self {
        Self {
            min_length: 20,
            max_length: 60,
        }
    }
}

#[async_trait]
pub trait ClassificationModel: Send + Sync + fmt::Debug {
    fn name(&self) -> &str;

    /// Unnormalized scores (logits) for every label the model knows about.
    /// Input beyond `max_tokens` tokens is truncated.
    async fn classify(&self, text: &str, max_tokens: usize) -> Result<Vec<LabelScore>>;
}

#[async_trait]
pub trait SummarizationModel: Send + Sync + fmt::Debug {
    fn name(&self) -> &str;

    async fn summarize(&self, text: &str, bounds: SummaryBounds) -> Result<String>;
}

#[async_trait]
pub trait TokenClassificationModel: Send + Sync + fmt::Debug {
    fn name(&self) -> &str;

    /// Entity mentions found in `text`, either grouped or per token.
    async fn extract(&self, text: &str) -> Result<Vec<RawEntity>>;
}
