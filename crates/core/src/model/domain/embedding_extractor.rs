use crate::shared::embedding::Embedding;
use crate::shared::error::SessionError;
use crate::shared::frame::Frame;

/// Domain interface for the pretrained feature extractor.
///
/// `embed` is logically pure: same frame, same vector. `&mut self` because
/// inference runtimes mutate internal buffers.
pub trait EmbeddingExtractor: Send {
    /// Resolve and load model resources. Called once during session
    /// initialization; the default is a no-op for extractors that need none.
    fn prepare(&mut self) -> Result<(), SessionError> {
        Ok(())
    }

    /// Map one frame to a fixed-length feature vector.
    fn embed(&mut self, frame: &Frame) -> Result<Embedding, SessionError>;
}
