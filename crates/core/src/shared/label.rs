use serde::{Deserialize, Serialize};

/// Classification target for one frame. Fixed, closed set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Label {
    NotTouching,
    Touching,
}

impl Label {
    pub const ALL: &[Label] = &[Label::NotTouching, Label::Touching];

    /// Stable index into per-label arrays.
    pub fn index(self) -> usize {
        match self {
            Label::NotTouching => 0,
            Label::Touching => 1,
        }
    }
}

impl std::fmt::Display for Label {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Label::NotTouching => write!(f, "not touching"),
            Label::Touching => write!(f, "touching"),
        }
    }
}
