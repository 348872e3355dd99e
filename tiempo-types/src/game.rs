use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use crate::errors::GameError;

pub type MatchId = Uuid;
pub type TeamId = Uuid;
pub type PlayerId = Uuid;
pub type WordId = Uuid;

/// Lifecycle of a match ("partida"), from team setup to results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MatchPhase {
    Configuring,
    SubmittingWords,
    Ready,
    Playing,
    TurnEnded,
    RoundEnded,
    Finished,
}

impl MatchPhase {
    pub fn as_str(&self) -> &'static str {
        match self {
            MatchPhase::Configuring => "configuring",
            MatchPhase::SubmittingWords => "submitting_words",
            MatchPhase::Ready => "ready",
            MatchPhase::Playing => "playing",
            MatchPhase::TurnEnded => "turn_ended",
            MatchPhase::RoundEnded => "round_ended",
            MatchPhase::Finished => "finished",
        }
    }
}

impl fmt::Display for MatchPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MatchPhase {
    type Err = GameError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "configuring" => Ok(MatchPhase::Configuring),
            "submitting_words" => Ok(MatchPhase::SubmittingWords),
            "ready" => Ok(MatchPhase::Ready),
            "playing" => Ok(MatchPhase::Playing),
            "turn_ended" => Ok(MatchPhase::TurnEnded),
            "round_ended" => Ok(MatchPhase::RoundEnded),
            "finished" => Ok(MatchPhase::Finished),
            other => Err(GameError::ValidationFailed(format!(
                "unknown match phase: {other}"
            ))),
        }
    }
}

/// Word lifecycle within a match. Guessed words return to the pool at
/// round boundaries; skipped words stay in play within the round.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WordState {
    Pending,
    Guessed,
    Skipped,
}

impl WordState {
    pub fn as_str(&self) -> &'static str {
        match self {
            WordState::Pending => "pending",
            WordState::Guessed => "guessed",
            WordState::Skipped => "skipped",
        }
    }
}

impl fmt::Display for WordState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for WordState {
    type Err = GameError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(WordState::Pending),
            "guessed" => Ok(WordState::Guessed),
            "skipped" => Ok(WordState::Skipped),
            other => Err(GameError::ValidationFailed(format!(
                "unknown word state: {other}"
            ))),
        }
    }
}

/// What happens to skipped words when a round ends. The guessed-only
/// variant keeps skipped words in play across the boundary; the wider
/// variant returns them to pending alongside guessed ones.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SkipResetPolicy {
    GuessedOnly,
    GuessedAndSkipped,
}

impl SkipResetPolicy {
    pub fn as_str(&self) -> &'static str {
        match self {
            SkipResetPolicy::GuessedOnly => "guessed_only",
            SkipResetPolicy::GuessedAndSkipped => "guessed_and_skipped",
        }
    }
}

impl fmt::Display for SkipResetPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SkipResetPolicy {
    type Err = GameError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "guessed_only" => Ok(SkipResetPolicy::GuessedOnly),
            "guessed_and_skipped" => Ok(SkipResetPolicy::GuessedAndSkipped),
            other => Err(GameError::ValidationFailed(format!(
                "unknown skip reset policy: {other}"
            ))),
        }
    }
}

/// One game session. The phase, theme cursor, timer, and current
/// player are mutated only by the state machine; `version` is bumped
/// on every applied transition and checked against the value the
/// caller read, so stale drivers are rejected without side effects.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Match {
    pub id: MatchId,
    pub phase: MatchPhase,
    pub theme_index: usize,
    pub themes: Vec<String>,
    pub words_per_player: u32,
    pub turn_seconds: i32,
    pub skip_reset: SkipResetPolicy,
    pub time_remaining: i32,
    pub rounds_played: u32,
    pub current_player: Option<PlayerId>,
    pub version: u32,
    pub created_at: String, // ISO 8601 string
}

/// One entry of the fixed turn permutation established at setup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TurnSlot {
    pub player_id: PlayerId,
    pub turn_index: u32,
}

/// A word in play, owned by the team whose player submitted it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Word {
    pub id: WordId,
    pub match_id: MatchId,
    pub team_id: TeamId,
    pub text: String,
    pub state: WordState,
}
