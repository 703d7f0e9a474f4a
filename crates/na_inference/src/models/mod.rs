use std::sync::Arc;

use na_core::{ClassificationModel, Result, SummarizationModel, TokenClassificationModel};
use tracing::info;

use crate::{Backend, InferenceConfig};

pub mod dummy;
pub mod hub;

pub use dummy::DummyModel;
pub use hub::HubModel;

/// The three model handles an inference context is built from.
#[derive(Debug, Clone)]
pub struct ModelSet {
    pub classifier: Arc<dyn ClassificationModel>,
    pub summarizer: Arc<dyn SummarizationModel>,
    pub ner: Arc<dyn TokenClassificationModel>,
}

pub fn create_models(config: &InferenceConfig) -> Result<ModelSet> {
    config.validate()?;

    match config.backend {
        Backend::Hub => {
            info!("🧠 Using hosted models at {}", config.model_url);
            Ok(ModelSet {
                classifier: Arc::new(HubModel::new(config, &config.classifier_model)?),
                summarizer: Arc::new(HubModel::new(config, &config.summarizer_model)?),
                ner: Arc::new(HubModel::new(config, &config.ner_model)?),
            })
        }
        Backend::Dummy => {
            info!("🧠 Using offline dummy models");
            let model = Arc::new(DummyModel::new());
            Ok(ModelSet {
                classifier: model.clone(),
                summarizer: model.clone(),
                ner: model,
            })
        }
    }
}
