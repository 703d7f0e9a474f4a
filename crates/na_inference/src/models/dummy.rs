use std::fmt;

use async_trait::async_trait;
use na_core::{
    Category, ClassificationModel, LabelScore, RawEntity, Result, SummarizationModel,
    SummaryBounds, TokenClassificationModel,
};

const KEYWORDS: [(Category, &[&str]); Category::COUNT] = [
    (
        Category::World,
        &[
            "war", "president", "minister", "government", "election", "parliament", "embassy",
            "refugee", "diplomat", "treaty", "protest", "military", "border", "united nations",
        ],
    ),
    (
        Category::Sports,
        &[
            "match", "goal", "league", "cup", "tournament", "coach", "player", "team", "season",
            "championship", "olympic", "score", "cricket", "football", "tennis",
        ],
    ),
    (
        Category::Business,
        &[
            "market", "stock", "share", "profit", "revenue", "bank", "economy", "investor",
            "price", "trade", "earnings", "merger", "inflation", "company",
        ],
    ),
    (
        Category::SciTech,
        &[
            "space", "shuttle", "launch", "nasa", "satellite", "software", "computer",
            "internet", "science", "research", "robot", "chip", "tech", "phone", "scientist",
        ],
    ),
];

const LOCATIONS: &[&str] = &[
    "india", "china", "france", "germany", "japan", "russia", "brazil", "london", "paris",
    "washington", "delhi", "mumbai", "beijing", "tokyo", "europe", "africa", "america",
];

const STOPWORDS: &[&str] = &[
    "the", "a", "an", "in", "on", "at", "of", "and", "but", "or", "it", "is", "this", "that",
    "he", "she", "they", "we", "i", "for", "with", "as", "by", "to", "from", "after",
];

/// Deterministic keyword heuristics standing in for real models.
pub struct DummyModel;

impl fmt::Debug for DummyModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DummyModel").finish()
    }
}

impl Default for DummyModel {
    fn default() -> Self {
        Self::new()
    }
}

impl DummyModel {
    pub fn new() -> Self {
        Self
    }
}

fn normalize_token(token: &str) -> String {
    token
        .trim_matches(|c: char| !c.is_alphanumeric())
        .to_lowercase()
}

#[async_trait]
impl ClassificationModel for DummyModel {
    fn name(&self) -> &str {
        "Dummy"
    }

    async fn classify(&self, text: &str, max_tokens: usize) -> Result<Vec<LabelScore>> {
        let tokens: Vec<String> = text
            .split_whitespace()
            .take(max_tokens)
            .map(normalize_token)
            .filter(|t| !t.is_empty())
            .collect();
        let joined = tokens.join(" ");

        Ok(KEYWORDS
            .iter()
            .map(|(category, keywords)| {
                let hits = keywords
                    .iter()
                    .filter(|k| {
                        if k.contains(' ') {
                            joined.contains(*k)
                        } else {
                            tokens.iter().any(|t| t.starts_with(*k))
                        }
                    })
                    .count();
                LabelScore {
                    label: format!("LABEL_{}", category.index()),
                    score: hits as f64 * 2.0,
                }
            })
            .collect())
    }
}

#[async_trait]
impl SummarizationModel for DummyModel {
    fn name(&self) -> &str {
        "Dummy"
    }

    async fn summarize(&self, text: &str, bounds: SummaryBounds) -> Result<String> {
        // Lead sentences until the word budget is used up
        let mut words: Vec<&str> = Vec::new();
        for sentence in text.split_inclusive(['.', '!', '?']) {
            let sentence_words: Vec<&str> = sentence.split_whitespace().collect();
            if !words.is_empty() && words.len() + sentence_words.len() > bounds.max_length {
                break;
            }
            words.extend(sentence_words);
            if words.len() >= bounds.min_length {
                break;
            }
        }
        words.truncate(bounds.max_length);
        Ok(words.join(" "))
    }
}

#[async_trait]
impl TokenClassificationModel for DummyModel {
    fn name(&self) -> &str {
        "Dummy"
    }

    /// Emits per-token BIO tags: runs of capitalized words become entities.
    async fn extract(&self, text: &str) -> Result<Vec<RawEntity>> {
        let mut tokens = Vec::new();
        let mut previous_group: Option<String> = None;

        let mut offset = 0;
        for raw in text.split_whitespace() {
            let start = offset + text[offset..].find(raw).unwrap_or(0);
            offset = start + raw.len();

            let word = raw.trim_matches(|c: char| !c.is_alphanumeric());
            let capitalized = word.chars().next().is_some_and(|c| c.is_uppercase());
            if !capitalized || STOPWORDS.contains(&word.to_lowercase().as_str()) {
                previous_group = None;
                continue;
            }

            let lower = word.to_lowercase();
            let group = if LOCATIONS.contains(&lower.as_str()) {
                "LOC"
            } else if word.len() > 1 && word.chars().all(|c| c.is_uppercase() || c.is_ascii_digit()) {
                "ORG"
            } else {
                "PER"
            };

            let tag = match previous_group.as_deref() {
                Some(prev) if prev == group => format!("I-{}", group),
                _ => format!("B-{}", group),
            };
            let word_start = start + raw.find(word).unwrap_or(0);
            tokens.push(RawEntity {
                entity: Some(tag),
                word: Some(word.to_string()),
                score: Some(0.9),
                start: Some(word_start),
                end: Some(word_start + word.len()),
                index: Some(tokens.len() + 1),
                ..RawEntity::default()
            });

            // Trailing punctuation ends the run
            previous_group = raw.ends_with(word).then(|| group.to_string());
        }

        Ok(tokens)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn logits(scores: &[LabelScore]) -> Vec<f64> {
        scores.iter().map(|s| s.score).collect()
    }

    #[tokio::test]
    async fn test_dummy_classifier_prefers_matching_keywords() {
        let model = DummyModel::new();
        let scores = model.classify("India is launching a space shuttle", 512).await.unwrap();
        assert_eq!(scores.len(), 4);
        assert_eq!(scores[3].label, "LABEL_3");
        let logits = logits(&scores);
        assert!(logits[3] > logits[0]);
        assert!(logits[3] > logits[1]);
        assert!(logits[3] > logits[2]);
    }

    #[tokio::test]
    async fn test_dummy_classifier_respects_token_limit() {
        let model = DummyModel::new();
        let scores = model.classify("filler words then football league", 2).await.unwrap();
        assert!(logits(&scores).iter().all(|l| *l == 0.0));
    }

    #[tokio::test]
    async fn test_dummy_summary_is_bounded() {
        let model = DummyModel::new();
        let text = "First sentence is here. Second one follows it. ".repeat(20);
        let bounds = SummaryBounds { min_length: 5, max_length: 8 };
        let summary = model.summarize(&text, bounds).await.unwrap();
        let words = summary.split_whitespace().count();
        assert!(words <= 8);
        assert!(summary.starts_with("First sentence is here."));
    }

    #[tokio::test]
    async fn test_dummy_ner_tags_runs() {
        let model = DummyModel::new();
        let tokens = model
            .extract("Prime Minister Narendra Modi visited NASA in Washington.")
            .await
            .unwrap();
        let tags: Vec<(&str, &str)> = tokens
            .iter()
            .map(|t| (t.entity.as_deref().unwrap(), t.word.as_deref().unwrap()))
            .collect();
        assert_eq!(
            tags,
            vec![
                ("B-PER", "Prime"),
                ("I-PER", "Minister"),
                ("I-PER", "Narendra"),
                ("I-PER", "Modi"),
                ("B-ORG", "NASA"),
                ("B-LOC", "Washington"),
            ]
        );
        let washington = &tokens[5];
        assert_eq!(washington.start, Some(45));
        assert_eq!(washington.end, Some(55));
    }
}
