use crate::shared::embedding::Embedding;
use crate::shared::error::SessionError;
use crate::shared::label::Label;
use crate::shared::prediction::PredictionResult;

/// Domain interface for a model that learns from labeled examples added one
/// at a time. Accumulation is monotonic within a session: examples are never
/// removed or rolled back.
pub trait IncrementalClassifier: Send {
    /// Take ownership of one labeled example.
    fn add_example(&mut self, embedding: Embedding, label: Label);

    /// Predict a label with per-label confidence. Fails with
    /// [`SessionError::NotTrained`] while no example has been added.
    fn predict(&self, embedding: &Embedding) -> Result<PredictionResult, SessionError>;

    /// Total examples accumulated across all labels.
    fn example_count(&self) -> usize;
}
