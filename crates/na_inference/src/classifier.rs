use std::fmt;
use std::sync::Arc;

use na_core::{Category, ClassificationModel, Error, LabelScore, Prediction, Result};
use tracing::debug;

/// Topic classifier over the four fixed categories.
pub struct Classifier {
    model: Arc<dyn ClassificationModel>,
    max_tokens: usize,
}

impl fmt::Debug for Classifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Classifier")
            .field("model", &self.model.name())
            .field("max_tokens", &self.max_tokens)
            .finish()
    }
}

impl Classifier {
    pub fn new(model: Arc<dyn ClassificationModel>, max_tokens: usize) -> Self {
        Self { model, max_tokens }
    }

    pub fn model_name(&self) -> &str {
        self.model.name()
    }

    pub async fn predict(&self, text: &str) -> Result<Prediction> {
        let scores = self.model.classify(text, self.max_tokens).await?;
        let logits = order_logits(&scores)?;
        let probs = softmax(&logits);
        let category = Category::from_index(argmax(&probs))
            .ok_or_else(|| Error::Inference("argmax outside category range".to_string()))?;

        debug!("Classified as {} ({:.3})", category, probs[category.index()]);
        Ok(Prediction {
            label: category.label().to_string(),
            probs,
        })
    }
}

/// Lays model scores out in category order.
pub fn order_logits(scores: &[LabelScore]) -> Result<[f64; Category::COUNT]> {
    if scores.len() != Category::COUNT {
        return Err(Error::Inference(format!(
            "expected {} label scores, got {}",
            Category::COUNT,
            scores.len()
        )));
    }

    let mut logits = [None; Category::COUNT];
    for score in scores {
        let category = Category::from_model_label(&score.label)
            .ok_or_else(|| Error::Inference(format!("unknown label {:?}", score.label)))?;
        if !score.score.is_finite() {
            return Err(Error::Inference(format!(
                "non-finite score for {}",
                score.label
            )));
        }
        if logits[category.index()].replace(score.score).is_some() {
            return Err(Error::Inference(format!("duplicate score for {}", category)));
        }
    }

    let mut ordered = [0.0; Category::COUNT];
    for (slot, logit) in ordered.iter_mut().zip(logits) {
        // Four scores with no duplicates cover every category
        *slot = logit.ok_or_else(|| Error::Inference("missing category score".to_string()))?;
    }
    Ok(ordered)
}

pub fn softmax<const N: usize>(logits: &[f64; N]) -> [f64; N] {
    let max = logits.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let mut out = logits.map(|l| (l - max).exp());
    let sum: f64 = out.iter().sum();
    for p in out.iter_mut() {
        *p /= sum;
    }
    out
}

/// Index of the largest value. Ties resolve to the lowest index.
pub fn argmax(values: &[f64]) -> usize {
    values
        .iter()
        .enumerate()
        .fold((0, f64::NEG_INFINITY), |(best, best_value), (i, &v)| {
            if v > best_value {
                (i, v)
            } else {
                (best, best_value)
            }
        })
        .0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::DummyModel;

    fn scores(values: [(&str, f64); 4]) -> Vec<LabelScore> {
        values
            .iter()
            .map(|(label, score)| LabelScore {
                label: label.to_string(),
                score: *score,
            })
            .collect()
    }

    #[test]
    fn test_softmax_is_a_distribution() {
        let probs = softmax(&[1000.0, 999.0, -5.0, 0.0]);
        let sum: f64 = probs.iter().sum();
        assert!((sum - 1.0).abs() < 1e-9);
        assert!(probs.iter().all(|p| p.is_finite() && *p >= 0.0));
        assert!(probs[0] > probs[1]);
    }

    #[test]
    fn test_softmax_uniform_for_equal_logits() {
        let probs = softmax(&[0.0; 4]);
        for p in probs {
            assert!((p - 0.25).abs() < 1e-12);
        }
    }

    #[test]
    fn test_argmax_prefers_first_on_tie() {
        assert_eq!(argmax(&[0.25, 0.25, 0.25, 0.25]), 0);
        assert_eq!(argmax(&[0.1, 0.4, 0.4, 0.1]), 1);
        assert_eq!(argmax(&[0.1, 0.2, 0.3, 0.4]), 3);
    }

    #[test]
    fn test_order_logits_follows_label_index() {
        let ordered = order_logits(&scores([
            ("LABEL_3", 4.0),
            ("LABEL_0", 1.0),
            ("LABEL_2", 3.0),
            ("LABEL_1", 2.0),
        ]))
        .unwrap();
        assert_eq!(ordered, [1.0, 2.0, 3.0, 4.0]);
    }

    #[test]
    fn test_order_logits_rejects_bad_shapes() {
        let all = scores([("LABEL_0", 1.0), ("LABEL_1", 1.0), ("LABEL_2", 1.0), ("LABEL_3", 1.0)]);
        assert!(order_logits(&all[..3]).is_err());

        let duplicate = scores([("LABEL_0", 1.0), ("LABEL_0", 1.0), ("LABEL_2", 1.0), ("LABEL_3", 1.0)]);
        assert!(order_logits(&duplicate).is_err());

        let unknown = scores([("LABEL_0", 1.0), ("LABEL_9", 1.0), ("LABEL_2", 1.0), ("LABEL_3", 1.0)]);
        assert!(order_logits(&unknown).is_err());

        let nan = scores([("LABEL_0", f64::NAN), ("LABEL_1", 1.0), ("LABEL_2", 1.0), ("LABEL_3", 1.0)]);
        assert!(order_logits(&nan).is_err());
    }

    #[tokio::test]
    async fn test_predict_label_matches_argmax() {
        let classifier = Classifier::new(Arc::new(DummyModel::new()), 512);
        let prediction = classifier.predict("India is launching a space shuttle").await.unwrap();

        assert_eq!(prediction.label, "Sci/Tech");
        let sum: f64 = prediction.probs.iter().sum();
        assert!((sum - 1.0).abs() < 1e-3);
        let best = Category::from_index(argmax(&prediction.probs)).unwrap();
        assert_eq!(prediction.label, best.label());
    }

    #[tokio::test]
    async fn test_predict_is_idempotent() {
        let classifier = Classifier::new(Arc::new(DummyModel::new()), 512);
        let text = "The central bank raised rates as the stock market fell";
        let first = classifier.predict(text).await.unwrap();
        let second = classifier.predict(text).await.unwrap();
        assert_eq!(first, second);
        assert_eq!(first.label, "Business");
    }
}
