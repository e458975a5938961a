use serde::{Deserialize, Serialize};

/// Structured critique of a CV, as returned to the caller.
///
/// All four fields are always present. Lists hold at most
/// [`MAX_ITEMS`](crate::review::sanitizer::MAX_ITEMS) entries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Review {
    pub strengths: Vec<String>,
    pub weaknesses: Vec<String>,
    pub suggestions: Vec<String>,
    /// 1 – 10, or [`Review::INVALID_SCORE`] when the model gave no usable score.
    pub score: u8,
}

impl Review {
    /// Sentinel for "no usable score". Outside the documented 1 – 10 range on purpose.
    pub const INVALID_SCORE: u8 = 0;
    pub const MIN_SCORE: u8 = 1;
    pub const MAX_SCORE: u8 = 10;

    pub fn has_valid_score(&self) -> bool {
        (Self::MIN_SCORE..=Self::MAX_SCORE).contains(&self.score)
    }
}
