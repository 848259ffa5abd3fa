use thiserror::Error;

/// Every failure a session can surface. No variant is fatal to the process;
/// each one returns control with the session in a well-defined state.
#[derive(Error, Debug)]
pub enum SessionError {
    /// The capture device could not be opened, permission was denied, or no
    /// decodable frame ever arrived.
    #[error("camera unavailable: {0}")]
    CameraUnavailable(String),

    /// The embedding model could not be resolved or loaded.
    #[error("model load failed: {0}")]
    ModelLoadFailed(String),

    /// A capture or embedding failure aborted a training run. Examples
    /// submitted before the failure are retained.
    #[error("training failed after {submitted} submitted examples: {reason}")]
    TrainingFailed { submitted: usize, reason: String },

    /// Too many consecutive inference cycles failed; the loop stopped.
    #[error("inference degraded: {consecutive} consecutive cycle failures")]
    InferenceDegraded { consecutive: usize },

    /// Prediction requested before any training example was accumulated.
    #[error("classifier has no training examples")]
    NotTrained,

    /// An entry point was called from a state that cannot accept it.
    #[error("session busy: {0}")]
    SessionBusy(&'static str),

    /// The session already shut down; no further calls are accepted.
    #[error("session is closed")]
    SessionClosed,

    /// The extractor could not embed a frame.
    #[error("embedding failed: {0}")]
    EmbeddingFailed(String),

    /// The camera produced no frame for this capture request.
    #[error("no frame available: {0}")]
    NoFrame(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_includes_context() {
        let err = SessionError::TrainingFailed {
            submitted: 12,
            reason: "camera gone".into(),
        };
        let text = err.to_string();
        assert!(text.contains("12"));
        assert!(text.contains("camera gone"));
    }
}
