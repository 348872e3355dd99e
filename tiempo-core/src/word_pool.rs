use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

use tiempo_types::{GameError, GameResult, SkipResetPolicy, TeamId, Word, WordId, WordState};
use tracing::debug;

/// Marks a pending word as guessed and returns the owning team so the
/// ledger can award its point. Words that already left the pending
/// state are rejected, which keeps a double-submitted guess from
/// counting twice.
pub fn mark_guessed(words: &mut [Word], id: WordId) -> GameResult<TeamId> {
    leave_pending(words, id, WordState::Guessed)
}

/// Marks a pending word as skipped; the owning team loses a point.
pub fn mark_skipped(words: &mut [Word], id: WordId) -> GameResult<TeamId> {
    leave_pending(words, id, WordState::Skipped)
}

fn leave_pending(words: &mut [Word], id: WordId, to: WordState) -> GameResult<TeamId> {
    let word = words
        .iter_mut()
        .find(|w| w.id == id)
        .ok_or_else(|| GameError::not_found("word", id))?;
    if word.state != WordState::Pending {
        return Err(GameError::TransitionRejected(format!(
            "word '{}' is already {}",
            word.text, word.state
        )));
    }
    word.state = to;
    Ok(word.team_id)
}

/// Words still in play: pending plus skipped. The round ends only
/// when this reaches zero.
pub fn remaining_count(words: &[Word]) -> usize {
    words
        .iter()
        .filter(|w| matches!(w.state, WordState::Pending | WordState::Skipped))
        .count()
}

/// Returns guessed words (and, under `GuessedAndSkipped`, skipped
/// ones) to the pending pool for the next round. Words are only ever
/// relabeled here, never created or removed. Returns how many words
/// went back into play.
pub fn reset_for_new_round(words: &mut [Word], policy: SkipResetPolicy) -> usize {
    let mut reset = 0;
    for word in words.iter_mut() {
        let back_in_play = match word.state {
            WordState::Guessed => true,
            WordState::Skipped => policy == SkipResetPolicy::GuessedAndSkipped,
            WordState::Pending => false,
        };
        if back_in_play {
            word.state = WordState::Pending;
            reset += 1;
        }
    }
    debug!(reset, ?policy, "returned words to the pool");
    reset
}

/// Picks a pseudorandom pending word to show next. `None` means the
/// pool is exhausted for this pass and the round-end condition holds.
pub fn draw_word(words: &[Word]) -> Option<&Word> {
    let pending: Vec<&Word> = words
        .iter()
        .filter(|w| w.state == WordState::Pending)
        .collect();
    if pending.is_empty() {
        return None;
    }
    let mut hasher = DefaultHasher::new();
    std::time::SystemTime::now().hash(&mut hasher);
    Some(pending[(hasher.finish() as usize) % pending.len()])
}
