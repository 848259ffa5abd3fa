use crate::shared::label::Label;

/// One classifier verdict: the winning label plus a per-label confidence in
/// `[0, 1]`. Confidences are comparable to each other but need not sum to 1.
#[derive(Clone, Debug, PartialEq)]
pub struct PredictionResult {
    label: Label,
    confidences: [f32; 2],
}

impl PredictionResult {
    pub fn new(label: Label, confidences: [f32; 2]) -> Self {
        debug_assert!(
            confidences.iter().all(|c| (0.0..=1.0).contains(c)),
            "confidences must lie in [0, 1]"
        );
        Self { label, confidences }
    }

    pub fn label(&self) -> Label {
        self.label
    }

    pub fn confidence(&self, label: Label) -> f32 {
        self.confidences[label.index()]
    }
}
