use crate::shared::label::Label;

/// Process-wide readiness of one session.
///
/// `Training` and `Inferring` are the two sub-modes; exactly one can be
/// active at a time, and the controller rejects a request to enter one while
/// the other runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Uninitialized,
    Initializing,
    Ready,
    Training { label: Label, progress: u8 },
    Inferring,
    ShuttingDown,
    Terminated,
}

impl SessionState {
    /// True while a sub-mode (training or inference) is running.
    pub fn is_busy(&self) -> bool {
        matches!(self, SessionState::Training { .. } | SessionState::Inferring)
    }
}

impl std::fmt::Display for SessionState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SessionState::Uninitialized => write!(f, "uninitialized"),
            SessionState::Initializing => write!(f, "initializing"),
            SessionState::Ready => write!(f, "ready"),
            SessionState::Training { label, progress } => {
                write!(f, "training '{label}' ({progress}%)")
            }
            SessionState::Inferring => write!(f, "inferring"),
            SessionState::ShuttingDown => write!(f, "shutting down"),
            SessionState::Terminated => write!(f, "terminated"),
        }
    }
}
