use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::Error;

/// Free text submitted for analysis.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Query {
    pub text: String,
}

/// The four AG News topic categories, in model output order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Category {
    World,
    Sports,
    Business,
    #[serde(rename = "Sci/Tech")]
    SciTech,
}

impl Category {
    pub const COUNT: usize = 4;
    pub const ALL: [Category; Category::COUNT] = [
        Category::World,
        Category::Sports,
        Category::Business,
        Category::SciTech,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Category::World => "World",
            Category::Sports => "Sports",
            Category::Business => "Business",
            Category::SciTech => "Sci/Tech",
        }
    }

    pub fn index(&self) -> usize {
        match self {
            Category::World => 0,
            Category::Sports => 1,
            Category::Business => 2,
            Category::SciTech => 3,
        }
    }

    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    /// Maps a label emitted by a classification model onto a category.
    ///
    /// Fine-tuned checkpoints usually emit `LABEL_<n>`, others emit the
    /// category name itself.
    pub fn from_model_label(label: &str) -> Option<Self> {
        let label = label.trim();
        if let Some(index) = label
            .rsplit('_')
            .next()
            .filter(|_| label.to_ascii_uppercase().starts_with("LABEL_"))
            .and_then(|n| n.parse::<usize>().ok())
        {
            return Self::from_index(index);
        }
        Self::ALL
            .iter()
            .copied()
            .find(|c| c.label().eq_ignore_ascii_case(label))
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Prediction {
    pub label: String,
    pub probs: [f64; Category::COUNT],
}

impl Prediction {
    pub fn category(&self) -> Option<Category> {
        Category::from_model_label(&self.label)
    }

    /// Probability of the winning category.
    pub fn confidence(&self) -> f64 {
        self.probs.iter().copied().fold(0.0, f64::max)
    }
}

/// A named entity mention after normalization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entity {
    pub entity_group: String,
    pub word: String,
    pub score: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end: Option<usize>,
}

impl Entity {
    pub const SENTINEL_GROUP: &'static str = "ERROR";

    pub fn new(entity_group: impl Into<String>, word: impl Into<String>, score: f64) -> Self {
        Self {
            entity_group: entity_group.into(),
            word: word.into(),
            score,
            start: None,
            end: None,
        }
    }

    /// Deduplication identity: the group plus the lowercased surface text.
    pub fn key(&self) -> (String, String) {
        (self.entity_group.clone(), self.word.to_lowercase())
    }

    /// Stand-in record returned when entity extraction fails.
    pub fn sentinel(error: &Error) -> Self {
        Self::new(
            Self::SENTINEL_GROUP,
            format!("{}: {}", error.kind(), error),
            0.0,
        )
    }

    pub fn is_sentinel(&self) -> bool {
        self.entity_group == Self::SENTINEL_GROUP
    }
}

/// Entity record as a token-classification backend hands it back. Grouped
/// output carries `entity_group`, per-token output carries a BIO tag in
/// `entity`. Nothing is guaranteed to be present.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RawEntity {
    pub entity_group: Option<String>,
    pub entity: Option<String>,
    pub word: Option<String>,
    pub score: Option<f64>,
    pub start: Option<usize>,
    pub end: Option<usize>,
    pub index: Option<usize>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub prediction: Prediction,
    pub summary: String,
    pub entities: Vec<Entity>,
}

/// A feed entry prepared for analysis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Article {
    pub source: String,
    pub title: String,
    #[serde(default)]
    pub summary: String,
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub link: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub published: Option<DateTime<Utc>>,
}

impl Article {
    /// Text to analyze: the body, falling back to the summary.
    pub fn body(&self) -> &str {
        if self.text.trim().is_empty() {
            &self.summary
        } else {
            &self.text
        }
    }

    pub fn word_count(&self) -> usize {
        self.body().split_whitespace().count()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthStatus {
    pub status: String,
    pub message: String,
}

impl HealthStatus {
    pub fn ok(message: impl Into<String>) -> Self {
        Self {
            status: "ok".to_string(),
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_from_model_label() {
        assert_eq!(Category::from_model_label("LABEL_0"), Some(Category::World));
        assert_eq!(Category::from_model_label("LABEL_3"), Some(Category::SciTech));
        assert_eq!(Category::from_model_label("label_2"), Some(Category::Business));
        assert_eq!(Category::from_model_label("sci/tech"), Some(Category::SciTech));
        assert_eq!(Category::from_model_label("Sports"), Some(Category::Sports));
        assert_eq!(Category::from_model_label("LABEL_4"), None);
        assert_eq!(Category::from_model_label("Weather"), None);
    }

    #[test]
    fn test_category_serializes_as_label() {
        let json = serde_json::to_string(&Category::SciTech).unwrap();
        assert_eq!(json, "\"Sci/Tech\"");
        for (i, category) in Category::ALL.iter().enumerate() {
            assert_eq!(category.index(), i);
            assert_eq!(Category::from_index(i), Some(*category));
        }
    }

    #[test]
    fn test_entity_json_shape() {
        let entity = Entity::new("PER", "Modi", 0.99);
        let value = serde_json::to_value(&entity).unwrap();
        assert_eq!(value["entity_group"], "PER");
        assert_eq!(value["word"], "Modi");
        assert!(value.get("start").is_none());
        assert_eq!(entity.key(), ("PER".to_string(), "modi".to_string()));
    }

    #[test]
    fn test_sentinel_entity() {
        let entity = Entity::sentinel(&Error::Inference("model offline".into()));
        assert!(entity.is_sentinel());
        assert_eq!(entity.word, "inference: Inference error: model offline");
        assert_eq!(entity.score, 0.0);
    }

    #[test]
    fn test_raw_entity_tolerates_missing_fields() {
        let raw: RawEntity =
            serde_json::from_str(r#"{"entity": "B-LOC", "word": "India"}"#).unwrap();
        assert_eq!(raw.entity.as_deref(), Some("B-LOC"));
        assert!(raw.entity_group.is_none());
        assert!(raw.score.is_none());
    }

    #[test]
    fn test_article_body_falls_back_to_summary() {
        let article = Article {
            source: "BBC".to_string(),
            title: "Title".to_string(),
            summary: "short summary here".to_string(),
            text: "  ".to_string(),
            link: String::new(),
            published: None,
        };
        assert_eq!(article.body(), "short summary here");
        assert_eq!(article.word_count(), 3);
    }

    #[test]
    fn test_prediction_confidence() {
        let prediction = Prediction {
            label: "Sports".to_string(),
            probs: [0.1, 0.7, 0.1, 0.1],
        };
        assert_eq!(prediction.category(), Some(Category::Sports));
        assert!((prediction.confidence() - 0.7).abs() < f64::EPSILON);
    }
}
