pub mod error;
pub mod models;
pub mod text;
pub mod types;

pub use error::{Error, Result};
pub use models::{
    ClassificationModel, LabelScore, SummarizationModel, SummaryBounds, TokenClassificationModel,
};
pub use types::{
    AnalysisResult, Article, Category, Entity, HealthStatus, Prediction, Query, RawEntity,
};
