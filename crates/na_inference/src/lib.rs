use std::fmt;

use na_core::{Error, Result, SummaryBounds};
use url::Url;

pub mod classifier;
pub mod context;
pub mod entities;
pub mod models;
pub mod summarizer;

pub use classifier::Classifier;
pub use context::InferenceContext;
pub use entities::EntityExtractor;
pub use models::create_models;
pub use summarizer::Summarizer;

pub const DEFAULT_MODEL_URL: &str = "https://api-inference.huggingface.co";
pub const DEFAULT_CLASSIFIER_MODEL: &str = "upasanapandey/news-classifier";
pub const DEFAULT_SUMMARIZER_MODEL: &str = "facebook/bart-large-cnn";
pub const DEFAULT_NER_MODEL: &str = "dslim/bert-base-NER";

/// Where model calls go.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum Backend {
    /// A hosted inference endpoint speaking the Hugging Face Inference API format.
    #[default]
    Hub,
    /// Deterministic offline heuristics, for demos and tests.
    Dummy,
}

#[derive(Clone)]
pub struct InferenceConfig {
    pub backend: Backend,
    pub model_url: String,
    pub api_token: Option<String>,
    pub classifier_model: String,
    pub summarizer_model: String,
    pub ner_model: String,
    /// Classifier input is truncated to this many tokens.
    pub max_tokens: usize,
    pub summary: SummaryBounds,
    /// Summarizer input is truncated to this many characters.
    pub summary_char_budget: usize,
}

impl Default for InferenceConfig {
    fn default() -> Self {
        Self {
            backend: Backend::default(),
            model_url: DEFAULT_MODEL_URL.to_string(),
            api_token: None,
            classifier_model: DEFAULT_CLASSIFIER_MODEL.to_string(),
            summarizer_model: DEFAULT_SUMMARIZER_MODEL.to_string(),
            ner_model: DEFAULT_NER_MODEL.to_string(),
            max_tokens: 512,
            summary: SummaryBounds::default(),
            summary_char_budget: 4000,
        }
    }
}

impl fmt::Debug for InferenceConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InferenceConfig")
            .field("backend", &self.backend)
            .field("model_url", &self.model_url)
            .field("api_token", &self.api_token.as_deref().map(|_| "<redacted>"))
            .field("classifier_model", &self.classifier_model)
            .field("summarizer_model", &self.summarizer_model)
            .field("ner_model", &self.ner_model)
            .field("max_tokens", &self.max_tokens)
            .field("summary", &self.summary)
            .field("summary_char_budget", &self.summary_char_budget)
            .finish()
    }
}

impl InferenceConfig {
    pub fn dummy() -> Self {
        Self {
            backend: Backend::Dummy,
            ..Self::default()
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.summary.max_length == 0 {
            return Err(Error::Config("summary max length must be positive".to_string()));
        }
        if self.summary.min_length > self.summary.max_length {
            return Err(Error::Config(format!(
                "summary min length {} exceeds max length {}",
                self.summary.min_length, self.summary.max_length
            )));
        }
        if self.summary_char_budget == 0 {
            return Err(Error::Config("summary character budget must be positive".to_string()));
        }
        if self.max_tokens == 0 {
            return Err(Error::Config("classifier max tokens must be positive".to_string()));
        }
        if self.backend == Backend::Hub {
            Url::parse(&self.model_url)
                .map_err(|e| Error::Config(format!("invalid model url {}: {}", self.model_url, e)))?;
            for (what, id) in [
                ("classifier", &self.classifier_model),
                ("summarizer", &self.summarizer_model),
                ("ner", &self.ner_model),
            ] {
                if id.trim().is_empty() {
                    return Err(Error::Config(format!("{} model id is empty", what)));
                }
            }
        }
        Ok(())
    }
}

pub mod prelude {
    pub use super::{Backend, InferenceConfig, InferenceContext};
    pub use na_core::{AnalysisResult, Entity, Error, Prediction, Result};
}
