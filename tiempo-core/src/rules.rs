use serde::{Deserialize, Serialize};
use tiempo_types::{GameError, GameResult, SkipResetPolicy};

/// Themes and pacing for a match, injected at creation time. Nothing
/// in the core reads a hidden default; callers that want the classic
/// setup use `MatchRules::default()`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchRules {
    /// Ordered round themes; the sequencer cycles through them.
    pub themes: Vec<String>,
    /// Word quota each player submits during setup.
    pub words_per_player: u32,
    /// Length of one timed turn.
    pub turn_seconds: i32,
    /// Which word states return to the pool at a round boundary.
    pub skip_reset: SkipResetPolicy,
}

impl Default for MatchRules {
    fn default() -> Self {
        Self {
            themes: vec![
                "DESCRIBE LIBREMENTE".to_string(),
                "DESCRIBE CON UNA PALABRA".to_string(),
                "MÍMICA".to_string(),
            ],
            words_per_player: 3,
            turn_seconds: 60,
            skip_reset: SkipResetPolicy::GuessedOnly,
        }
    }
}

impl MatchRules {
    pub fn validate(&self) -> GameResult<()> {
        if self.themes.is_empty() || self.themes.iter().any(|t| t.trim().is_empty()) {
            return Err(GameError::ValidationFailed(
                "a match needs at least one non-empty theme".to_string(),
            ));
        }
        if self.words_per_player == 0 {
            return Err(GameError::ValidationFailed(
                "players must submit at least one word each".to_string(),
            ));
        }
        if self.turn_seconds <= 0 {
            return Err(GameError::ValidationFailed(
                "turns need a positive duration".to_string(),
            ));
        }
        Ok(())
    }
}
