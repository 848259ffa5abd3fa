use crate::model::domain::incremental_classifier::IncrementalClassifier;
use crate::shared::constants::DEFAULT_KNN_K;
use crate::shared::embedding::Embedding;
use crate::shared::error::SessionError;
use crate::shared::label::Label;
use crate::shared::prediction::PredictionResult;

/// K-nearest-neighbor classifier over raw embeddings.
///
/// Confidence per label is that label's vote share among the k nearest
/// stored examples (squared Euclidean distance), so confidences lie in
/// `[0, 1]` and sum to 1. Ties between equidistant examples resolve in
/// insertion order, which keeps predictions deterministic.
pub struct KnnClassifier {
    examples: Vec<(Embedding, Label)>,
    k: usize,
}

impl KnnClassifier {
    pub fn new(k: usize) -> Self {
        Self {
            examples: Vec::new(),
            k: k.max(1),
        }
    }
}

impl Default for KnnClassifier {
    fn default() -> Self {
        Self::new(DEFAULT_KNN_K)
    }
}

impl IncrementalClassifier for KnnClassifier {
    fn add_example(&mut self, embedding: Embedding, label: Label) {
        self.examples.push((embedding, label));
    }

    fn predict(&self, embedding: &Embedding) -> Result<PredictionResult, SessionError> {
        if self.examples.is_empty() {
            return Err(SessionError::NotTrained);
        }

        let mut distances: Vec<(f32, Label)> = self
            .examples
            .iter()
            .map(|(stored, label)| (stored.squared_distance(embedding), *label))
            .collect();
        distances.sort_by(|a, b| a.0.total_cmp(&b.0));

        let k = self.k.min(distances.len());
        let mut votes = [0usize; 2];
        for (_, label) in &distances[..k] {
            votes[label.index()] += 1;
        }

        let mut confidences = [0.0f32; 2];
        for label in Label::ALL {
            confidences[label.index()] = votes[label.index()] as f32 / k as f32;
        }

        // Highest vote share wins; on a tie, the nearest example's label.
        let winner = if votes[Label::Touching.index()] > votes[Label::NotTouching.index()] {
            Label::Touching
        } else if votes[Label::NotTouching.index()] > votes[Label::Touching.index()] {
            Label::NotTouching
        } else {
            distances[0].1
        };

        Ok(PredictionResult::new(winner, confidences))
    }

    fn example_count(&self) -> usize {
        self.examples.len()
    }
}
