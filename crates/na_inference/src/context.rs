use std::fmt;

use na_core::{AnalysisResult, Prediction, Result};
use tracing::info;

use crate::models::{create_models, ModelSet};
use crate::{Classifier, EntityExtractor, InferenceConfig, Summarizer};

const WARM_UP_TEXT: &str = "The quick brown fox jumps over the lazy dog.";

/// Everything the request handlers need to run the models. Built once at
/// startup and shared read-only afterwards.
pub struct InferenceContext {
    classifier: Classifier,
    summarizer: Summarizer,
    extractor: EntityExtractor,
}

impl fmt::Debug for InferenceContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InferenceContext")
            .field("classifier", &self.classifier)
            .field("summarizer", &self.summarizer)
            .field("extractor", &self.extractor)
            .finish()
    }
}

impl InferenceContext {
    pub fn new(classifier: Classifier, summarizer: Summarizer, extractor: EntityExtractor) -> Self {
        Self {
            classifier,
            summarizer,
            extractor,
        }
    }

    pub fn from_models(models: ModelSet, config: &InferenceConfig) -> Self {
        Self::new(
            Classifier::new(models.classifier, config.max_tokens),
            Summarizer::new(models.summarizer, config.summary, config.summary_char_budget),
            EntityExtractor::new(models.ner),
        )
    }

    pub fn from_config(config: &InferenceConfig) -> Result<Self> {
        let models = create_models(config)?;
        Ok(Self::from_models(models, config))
    }

    /// Runs one classification so an unreachable model fails startup
    /// rather than the first request.
    pub async fn warm_up(&self) -> Result<()> {
        let prediction = self.classifier.predict(WARM_UP_TEXT).await?;
        info!(
            "✨ Classifier {} answered warm-up with {}",
            self.classifier.model_name(),
            prediction.label
        );
        Ok(())
    }

    pub fn describe(&self) -> String {
        format!(
            "classifier={} summarizer={} ner={}",
            self.classifier.model_name(),
            self.summarizer.model_name(),
            self.extractor.model_name()
        )
    }

    pub fn classifier(&self) -> &Classifier {
        &self.classifier
    }

    pub fn summarizer(&self) -> &Summarizer {
        &self.summarizer
    }

    pub fn extractor(&self) -> &EntityExtractor {
        &self.extractor
    }

    pub async fn predict(&self, text: &str) -> Result<Prediction> {
        self.classifier.predict(text).await
    }

    /// Classification, summary and entities for `text`. Only a classifier
    /// failure is an error; the other two degrade to placeholder values.
    pub async fn analyze(&self, text: &str) -> Result<AnalysisResult> {
        let (prediction, summary, entities) = tokio::join!(
            self.classifier.predict(text),
            self.summarizer.summarize_or_placeholder(text),
            self.extractor.extract_or_sentinel(text),
        );

        Ok(AnalysisResult {
            prediction: prediction?,
            summary,
            entities,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::DummyModel;
    use async_trait::async_trait;
    use na_core::{Error, SummarizationModel, SummaryBounds};
    use std::sync::Arc;

    #[derive(Debug)]
    struct BrokenSummarizer;

    #[async_trait]
    impl SummarizationModel for BrokenSummarizer {
        fn name(&self) -> &str {
            "Broken"
        }

        async fn summarize(&self, _text: &str, _bounds: SummaryBounds) -> Result<String> {
            Err(Error::Inference("CUDA out of memory".to_string()))
        }
    }

    #[tokio::test]
    async fn test_analyze_with_dummy_models() {
        let context = InferenceContext::from_config(&InferenceConfig::dummy()).unwrap();
        context.warm_up().await.unwrap();

        let result = context
            .analyze("India is launching a space shuttle. ISRO said the launch from India is set for June.")
            .await
            .unwrap();

        assert_eq!(result.prediction.label, "Sci/Tech");
        assert!(!result.summary.is_empty());
        assert!(result.summary.split_whitespace().count() <= 60);
        let india: Vec<_> = result.entities.iter().filter(|e| e.word == "India").collect();
        assert_eq!(india.len(), 1);
        assert!(result.entities.iter().any(|e| e.entity_group == "ORG" && e.word == "ISRO"));
    }

    #[tokio::test]
    async fn test_summary_failure_keeps_request_alive() {
        let dummy = Arc::new(DummyModel::new());
        let context = InferenceContext::new(
            Classifier::new(dummy.clone(), 512),
            Summarizer::new(Arc::new(BrokenSummarizer), SummaryBounds::default(), 4000),
            EntityExtractor::new(dummy),
        );

        let result = context.analyze("Stock market rallies").await.unwrap();
        assert_eq!(result.prediction.label, "Business");
        assert!(result.summary.contains("summary unavailable"));
        assert!(result.summary.contains("CUDA out of memory"));
    }

    #[test]
    fn test_describe_names_models() {
        let context = InferenceContext::from_config(&InferenceConfig::dummy()).unwrap();
        assert_eq!(
            context.describe(),
            "classifier=Dummy summarizer=Dummy ner=Dummy"
        );
    }
}
