use chrono::Utc;
use tiempo_types::{
    GameError, GameResult, Match, MatchPhase, Player, PlayerId, Team, TeamId, TurnSlot, Word,
    WordId, WordState,
};
use tracing::{info, warn};
use uuid::Uuid;

use crate::rules::MatchRules;
use crate::scoring::ScoreLedger;
use crate::{rounds, turn_order, word_pool};

/// Everything the state machine needs about one match, loaded and
/// stored as a unit by the persistence layer.
///
/// Transitions mutate the snapshot in place and bump `game.version`.
/// Every transition takes the version the caller read; a mismatch is
/// rejected as `StaleVersion` before any side effect, so a racing
/// driver that re-submits the same transition cannot double-apply
/// scores or phase changes.
#[derive(Debug, Clone)]
pub struct MatchSnapshot {
    pub game: Match,
    pub teams: Vec<Team>,
    pub players: Vec<Player>,
    pub turn_order: Vec<TurnSlot>,
    pub words: Vec<Word>,
}

impl MatchSnapshot {
    /// New match in the configuring phase, with rules copied onto the
    /// match record.
    pub fn create(rules: MatchRules) -> GameResult<Self> {
        rules.validate()?;
        let game = Match {
            id: Uuid::new_v4(),
            phase: MatchPhase::Configuring,
            theme_index: 0,
            themes: rules.themes,
            words_per_player: rules.words_per_player,
            turn_seconds: rules.turn_seconds,
            skip_reset: rules.skip_reset,
            time_remaining: rules.turn_seconds,
            rounds_played: 0,
            current_player: None,
            version: 0,
            created_at: Utc::now().to_rfc3339(),
        };
        info!(match_id = %game.id, "match created");
        Ok(Self {
            game,
            teams: Vec::new(),
            players: Vec::new(),
            turn_order: Vec::new(),
            words: Vec::new(),
        })
    }

    // --- setup ---

    pub fn add_team(&mut self, name: &str) -> GameResult<TeamId> {
        self.require_phase(MatchPhase::Configuring, "add a team")?;
        let team = Team {
            id: Uuid::new_v4(),
            match_id: self.game.id,
            name: name.to_string(),
            points: 0,
        };
        let id = team.id;
        self.teams.push(team);
        Ok(id)
    }

    pub fn add_player(&mut self, team_id: TeamId, name: &str) -> GameResult<PlayerId> {
        self.require_phase(MatchPhase::Configuring, "add a player")?;
        if !self.teams.iter().any(|t| t.id == team_id) {
            return Err(GameError::not_found("team", team_id));
        }
        let order = self
            .players
            .iter()
            .filter(|p| p.team_id == team_id)
            .count() as u32;
        let player = Player {
            id: Uuid::new_v4(),
            team_id,
            name: name.to_string(),
            order_in_team: order,
        };
        let id = player.id;
        self.players.push(player);
        Ok(id)
    }

    // --- transitions ---

    /// Configuring → SubmittingWords. Validates the roster and
    /// freezes the turn-order permutation for the whole match.
    pub fn begin_word_submission(&mut self, expected_version: u32) -> GameResult<()> {
        self.check_version(expected_version)?;
        self.require_phase(MatchPhase::Configuring, "begin word submission")?;
        self.validate_setup()?;
        self.turn_order = turn_order::build_turn_order(&self.teams, &self.players);
        self.set_phase(MatchPhase::SubmittingWords);
        Ok(())
    }

    /// Records one word for the submitting player's team. Once the
    /// full quota (players × words per player) is in, the match flips
    /// to Ready on its own.
    pub fn submit_word(
        &mut self,
        expected_version: u32,
        player_id: PlayerId,
        text: &str,
    ) -> GameResult<WordId> {
        self.check_version(expected_version)?;
        self.require_phase(MatchPhase::SubmittingWords, "submit a word")?;
        let player = self
            .players
            .iter()
            .find(|p| p.id == player_id)
            .ok_or_else(|| GameError::not_found("player", player_id))?;
        let text = text.trim();
        if text.is_empty() {
            return Err(GameError::ValidationFailed(
                "words cannot be empty".to_string(),
            ));
        }

        // The word record only carries the owning team, so the quota
        // is enforced per team: roster size times the per-player
        // allowance.
        let team_id = player.team_id;
        let roster = self
            .players
            .iter()
            .filter(|p| p.team_id == team_id)
            .count() as u32;
        let submitted = self.words.iter().filter(|w| w.team_id == team_id).count() as u32;
        if submitted >= roster * self.game.words_per_player {
            return Err(GameError::ValidationFailed(format!(
                "team has already submitted its {} words",
                roster * self.game.words_per_player
            )));
        }

        let word = Word {
            id: Uuid::new_v4(),
            match_id: self.game.id,
            team_id,
            text: text.to_string(),
            state: WordState::Pending,
        };
        let id = word.id;
        self.words.push(word);

        let quota = self.players.len() as u32 * self.game.words_per_player;
        if self.words.len() as u32 >= quota {
            self.set_phase(MatchPhase::Ready);
        } else {
            self.commit();
        }
        Ok(id)
    }

    /// Ready → Playing: seats the first player and arms the timer.
    pub fn start(&mut self, expected_version: u32) -> GameResult<()> {
        self.check_version(expected_version)?;
        self.require_phase(MatchPhase::Ready, "start the match")?;
        let first = self
            .turn_order
            .first()
            .ok_or_else(|| {
                GameError::TransitionRejected("match has no turn order".to_string())
            })?
            .player_id;
        self.game.current_player = Some(first);
        self.game.time_remaining = self.game.turn_seconds;
        self.set_phase(MatchPhase::Playing);
        Ok(())
    }

    /// Word guessed during play: pending → guessed, owning team +1.
    /// Returns the team's new total.
    pub fn guess_word(&mut self, expected_version: u32, word_id: WordId) -> GameResult<i32> {
        self.check_version(expected_version)?;
        self.require_phase(MatchPhase::Playing, "guess a word")?;
        let team_id = word_pool::mark_guessed(&mut self.words, word_id)?;
        let total = ScoreLedger::adjust(&mut self.teams, team_id, 1)?;
        self.commit();
        Ok(total)
    }

    /// Word skipped during play: pending → skipped, owning team −1.
    pub fn skip_word(&mut self, expected_version: u32, word_id: WordId) -> GameResult<i32> {
        self.check_version(expected_version)?;
        self.require_phase(MatchPhase::Playing, "skip a word")?;
        let team_id = word_pool::mark_skipped(&mut self.words, word_id)?;
        let total = ScoreLedger::adjust(&mut self.teams, team_id, -1)?;
        self.commit();
        Ok(total)
    }

    /// Persists countdown progress signaled by the driving client.
    /// The core never schedules timers itself.
    pub fn record_time_remaining(&mut self, expected_version: u32, seconds: i32) -> GameResult<()> {
        self.check_version(expected_version)?;
        self.require_phase(MatchPhase::Playing, "record the timer")?;
        self.game.time_remaining = seconds.max(0);
        self.commit();
        Ok(())
    }

    /// Playing → TurnEnded, on timer expiry. Word exhaustion does not
    /// end a turn; only the countdown does.
    pub fn end_turn(&mut self, expected_version: u32) -> GameResult<()> {
        self.check_version(expected_version)?;
        self.require_phase(MatchPhase::Playing, "end the turn")?;
        self.game.time_remaining = 0;
        self.set_phase(MatchPhase::TurnEnded);
        Ok(())
    }

    /// TurnEnded → Playing with the next player seated, or
    /// TurnEnded → RoundEnded when no word is left in play.
    pub fn advance_turn(&mut self, expected_version: u32) -> GameResult<MatchPhase> {
        self.check_version(expected_version)?;
        self.require_phase(MatchPhase::TurnEnded, "advance the turn")?;
        if word_pool::remaining_count(&self.words) == 0 {
            self.set_phase(MatchPhase::RoundEnded);
        } else {
            self.seat_next_player();
            self.set_phase(MatchPhase::Playing);
        }
        Ok(self.game.phase)
    }

    /// RoundEnded → Playing: advances the theme (wrapping), relabels
    /// words per the skip-reset policy, and hands the floor to the
    /// next player in the fixed order.
    pub fn advance_round(&mut self, expected_version: u32) -> GameResult<()> {
        self.check_version(expected_version)?;
        self.require_phase(MatchPhase::RoundEnded, "advance the round")?;
        rounds::advance_theme(&mut self.game)?;
        word_pool::reset_for_new_round(&mut self.words, self.game.skip_reset);
        self.seat_next_player();
        self.set_phase(MatchPhase::Playing);
        info!(
            match_id = %self.game.id,
            theme = rounds::current_theme(&self.game).unwrap_or("?"),
            rounds_played = self.game.rounds_played,
            "round advanced"
        );
        Ok(())
    }

    /// Explicit end of the match, from any phase. How many rounds to
    /// play is the caller's call; this only obeys the instruction.
    pub fn finish(&mut self, expected_version: u32) -> GameResult<()> {
        self.check_version(expected_version)?;
        if self.game.phase == MatchPhase::Finished {
            return Err(GameError::TransitionRejected(
                "match is already finished".to_string(),
            ));
        }
        self.set_phase(MatchPhase::Finished);
        Ok(())
    }

    // --- queries ---

    pub fn current_theme(&self) -> GameResult<&str> {
        rounds::current_theme(&self.game)
    }

    pub fn next_theme(&self) -> GameResult<&str> {
        rounds::next_theme(&self.game)
    }

    pub fn remaining_words(&self) -> usize {
        word_pool::remaining_count(&self.words)
    }

    pub fn draw_word(&self) -> Option<&Word> {
        word_pool::draw_word(&self.words)
    }

    pub fn current_player(&self) -> Option<&Player> {
        let id = self.game.current_player?;
        self.players.iter().find(|p| p.id == id)
    }

    /// Player seated after the current one; the "unknown" sentinel
    /// while the order is empty, so callers can render a placeholder.
    pub fn next_player_or_unknown(&self) -> Player {
        turn_order::next_player_or_unknown(
            &self.turn_order,
            &self.players,
            self.game.current_player,
        )
    }

    pub fn winner(&self) -> Option<&Team> {
        ScoreLedger::winner(&self.teams)
    }

    pub fn tied_leaders(&self) -> Vec<&Team> {
        ScoreLedger::tied_leaders(&self.teams)
    }

    // --- internals ---

    fn validate_setup(&self) -> GameResult<()> {
        if self.teams.is_empty() {
            return Err(GameError::ValidationFailed(
                "a match needs at least one team".to_string(),
            ));
        }
        for team in &self.teams {
            if team.name.trim().is_empty() {
                return Err(GameError::ValidationFailed(
                    "every team needs a name".to_string(),
                ));
            }
            if !self.players.iter().any(|p| p.team_id == team.id) {
                return Err(GameError::ValidationFailed(format!(
                    "team '{}' has no players",
                    team.name
                )));
            }
        }
        if self.players.iter().any(|p| p.name.trim().is_empty()) {
            return Err(GameError::ValidationFailed(
                "every player needs a name".to_string(),
            ));
        }
        Ok(())
    }

    fn seat_next_player(&mut self) {
        let next = turn_order::next_player(
            &self.turn_order,
            &self.players,
            self.game.current_player,
        )
        .map(|p| p.id);
        self.game.current_player = next;
        self.game.time_remaining = self.game.turn_seconds;
    }

    fn check_version(&self, expected: u32) -> GameResult<()> {
        if self.game.version != expected {
            warn!(
                match_id = %self.game.id,
                expected,
                actual = self.game.version,
                "stale transition rejected"
            );
            return Err(GameError::StaleVersion {
                expected,
                actual: self.game.version,
            });
        }
        Ok(())
    }

    fn require_phase(&self, phase: MatchPhase, action: &str) -> GameResult<()> {
        if self.game.phase != phase {
            warn!(
                match_id = %self.game.id,
                phase = %self.game.phase,
                action,
                "transition rejected"
            );
            return Err(GameError::TransitionRejected(format!(
                "cannot {action} while the match is {}",
                self.game.phase
            )));
        }
        Ok(())
    }

    fn set_phase(&mut self, phase: MatchPhase) {
        info!(match_id = %self.game.id, from = %self.game.phase, to = %phase, "phase change");
        self.game.phase = phase;
        self.commit();
    }

    fn commit(&mut self) {
        self.game.version += 1;
    }
}
