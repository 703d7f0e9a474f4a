//! Entity extraction and the normalization that turns loosely typed backend
//! records into unique [`Entity`] values.

use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;

use na_core::{Entity, RawEntity, Result, TokenClassificationModel};
use tracing::{debug, warn};

pub struct EntityExtractor {
    model: Arc<dyn TokenClassificationModel>,
}

impl fmt::Debug for EntityExtractor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EntityExtractor")
            .field("model", &self.model.name())
            .finish()
    }
}

impl EntityExtractor {
    pub fn new(model: Arc<dyn TokenClassificationModel>) -> Self {
        Self { model }
    }

    pub fn model_name(&self) -> &str {
        self.model.name()
    }

    pub async fn extract(&self, text: &str) -> Result<Vec<Entity>> {
        let raw = self.model.extract(text).await?;
        let found = raw.len();
        let entities = normalize(raw);
        debug!("{} raw entity records -> {} entities", found, entities.len());
        Ok(entities)
    }

    /// Like [`EntityExtractor::extract`], but a failure yields a single
    /// sentinel entity instead of an error.
    pub async fn extract_or_sentinel(&self, text: &str) -> Vec<Entity> {
        match self.extract(text).await {
            Ok(entities) => entities,
            Err(e) => {
                warn!("⚠️ Entity extraction failed: {}", e);
                vec![Entity::sentinel(&e)]
            }
        }
    }
}

pub fn normalize(raw: Vec<RawEntity>) -> Vec<Entity> {
    dedupe(group_tokens(raw))
}

/// Keeps the first entity for each `(group, lowercased word)` pair.
pub fn dedupe(entities: Vec<Entity>) -> Vec<Entity> {
    let mut seen = HashSet::new();
    entities
        .into_iter()
        .filter(|e| seen.insert(e.key()))
        .collect()
}

struct PendingEntity {
    group: String,
    word: String,
    scores: Vec<f64>,
    start: Option<usize>,
    end: Option<usize>,
}

impl PendingEntity {
    fn push(&mut self, word: &str, score: f64, end: Option<usize>) {
        match word.strip_prefix("##") {
            Some(piece) => self.word.push_str(piece),
            None => {
                self.word.push(' ');
                self.word.push_str(word);
            }
        }
        self.scores.push(score);
        self.end = end.or(self.end);
    }

    fn finish(self) -> Entity {
        let score = self.scores.iter().sum::<f64>() / self.scores.len().max(1) as f64;
        Entity {
            entity_group: self.group,
            word: self.word,
            score,
            start: self.start,
            end: self.end,
        }
    }
}

/// Splits a BIO tag into its position marker and entity type.
fn split_tag(tag: &str) -> (Option<char>, &str) {
    match tag.split_once('-') {
        Some((marker, kind)) if marker.len() == 1 => (marker.chars().next(), kind),
        _ => (None, tag),
    }
}

/// Turns backend records into entities. Already grouped records pass
/// through; BIO-tagged tokens are merged into whole mentions.
pub fn group_tokens(raw: Vec<RawEntity>) -> Vec<Entity> {
    let mut entities = Vec::new();
    let mut current: Option<PendingEntity> = None;

    for record in raw {
        let Some(word) = record.word.as_deref().map(str::trim).filter(|w| !w.is_empty()) else {
            continue;
        };
        let score = record.score.filter(|s| s.is_finite()).unwrap_or(0.0);

        if let Some(group) = record.entity_group.as_deref().map(str::trim).filter(|g| !g.is_empty()) {
            entities.extend(current.take().map(PendingEntity::finish));
            entities.push(Entity {
                entity_group: group.to_string(),
                word: word.to_string(),
                score,
                start: record.start,
                end: record.end,
            });
            continue;
        }

        let Some(tag) = record.entity.as_deref().map(str::trim).filter(|t| !t.is_empty()) else {
            continue;
        };
        if tag == "O" {
            entities.extend(current.take().map(PendingEntity::finish));
            continue;
        }

        let (marker, kind) = split_tag(tag);
        let is_piece = word.starts_with("##");
        let continues = match &current {
            Some(pending) => is_piece || (marker == Some('I') && pending.group == kind),
            None => false,
        };

        if continues {
            if let Some(pending) = current.as_mut() {
                pending.push(word, score, record.end);
            }
        } else {
            entities.extend(current.take().map(PendingEntity::finish));
            current = Some(PendingEntity {
                group: kind.to_string(),
                word: word.trim_start_matches("##").to_string(),
                scores: vec![score],
                start: record.start,
                end: record.end,
            });
        }
    }

    entities.extend(current.take().map(PendingEntity::finish));
    entities
}
