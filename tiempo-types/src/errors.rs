use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Every failure the core can produce. All of them are recoverable by
/// retrying with corrected input; none abort the match.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
pub enum GameError {
    /// A referenced match/team/player/word does not exist. Callers
    /// should treat this as a 404-equivalent.
    #[error("{entity} {id} not found")]
    NotFound { entity: String, id: String },

    /// Setup input was rejected. The message is surfaced to the end
    /// user verbatim.
    #[error("{0}")]
    ValidationFailed(String),

    /// The requested transition is not legal right now. State is left
    /// unchanged.
    #[error("transition rejected: {0}")]
    TransitionRejected(String),

    /// The caller presented a version that is no longer current;
    /// another driver applied a transition first. Nothing was applied.
    #[error("stale match version: expected {expected}, found {actual}")]
    StaleVersion { expected: u32, actual: u32 },
}

impl GameError {
    pub fn not_found(entity: &str, id: impl ToString) -> Self {
        GameError::NotFound {
            entity: entity.to_string(),
            id: id.to_string(),
        }
    }
}

pub type GameResult<T> = Result<T, GameError>;
