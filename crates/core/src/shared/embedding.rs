/// Fixed-length feature vector produced by the embedding extractor for one
/// frame. Immutable after creation; ownership moves into the classifier when
/// submitted as a training example.
#[derive(Clone, Debug, PartialEq)]
pub struct Embedding {
    values: Vec<f32>,
}

impl Embedding {
    pub fn new(values: Vec<f32>) -> Self {
        Self { values }
    }

    pub fn values(&self) -> &[f32] {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Squared Euclidean distance to another embedding of the same length.
    pub fn squared_distance(&self, other: &Embedding) -> f32 {
        debug_assert_eq!(self.len(), other.len(), "embedding lengths must match");
        self.values
            .iter()
            .zip(other.values.iter())
            .map(|(a, b)| (a - b) * (a - b))
            .sum()
    }
}

impl From<Vec<f32>> for Embedding {
    fn from(values: Vec<f32>) -> Self {
        Self::new(values)
    }
}
