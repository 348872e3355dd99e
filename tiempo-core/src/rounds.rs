use tiempo_types::{GameError, GameResult, Match};

/// Theme ("temática") of the round currently in play.
pub fn current_theme(game: &Match) -> GameResult<&str> {
    game.themes
        .get(game.theme_index)
        .map(String::as_str)
        .ok_or_else(|| {
            GameError::TransitionRejected(format!(
                "theme index {} out of range for {} themes",
                game.theme_index,
                game.themes.len()
            ))
        })
}

/// Theme that will follow the current one. Always cyclic: past the
/// last theme the sequence replays from the first, regardless of how
/// many rounds have been played.
pub fn next_theme(game: &Match) -> GameResult<&str> {
    if game.themes.is_empty() {
        return Err(GameError::ValidationFailed(
            "match has no themes configured".to_string(),
        ));
    }
    Ok(game.themes[(game.theme_index + 1) % game.themes.len()].as_str())
}

/// Moves the theme cursor forward (wrapping) and counts the finished
/// round onto the match record.
pub fn advance_theme(game: &mut Match) -> GameResult<()> {
    if game.themes.is_empty() {
        return Err(GameError::ValidationFailed(
            "match has no themes configured".to_string(),
        ));
    }
    game.theme_index = (game.theme_index + 1) % game.themes.len();
    game.rounds_played += 1;
    Ok(())
}
