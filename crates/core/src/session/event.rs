use crate::shared::label::Label;

/// Messages the session sends to whoever is observing it (CLI, GUI, tests).
/// Delivered over an unbounded channel; slow observers buffer, never block
/// the session.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionEvent {
    TrainingProgress {
        label: Label,
        percent: u8,
    },
    TrainingCompleted {
        label: Label,
        submitted: usize,
    },
    TrainingCancelled {
        label: Label,
        submitted: usize,
    },
    TrainingFailed {
        label: Label,
        submitted: usize,
        reason: String,
    },
    /// One inference cycle's verdict, emitted every cycle.
    Touched {
        touching: bool,
        confidence: f32,
    },
    /// The inference loop exited at a cancellation checkpoint.
    InferenceStopped,
    /// The inference loop gave up after consecutive cycle failures.
    InferenceDegraded {
        consecutive: usize,
    },
}
