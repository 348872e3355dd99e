use anyhow::Result;
use sea_orm::DatabaseConnection;
use tracing::info;

use crate::repositories::MatchRepository;
use tiempo_core::{MatchRules, MatchSnapshot};
use tiempo_types::{
    GameError, GameResult, Match, MatchId, MatchPhase, Player, PlayerId, Team, TeamId, Word,
    WordId,
};

/// Final standings of a match.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct MatchResults {
    pub teams: Vec<Team>,
    pub winner: Option<Team>,
    pub tied: Vec<Team>,
}

/// Drives matches stored in the database: loads the snapshot, applies
/// one state-machine step, stores it back. Version checks happen
/// inside the step, so a stale caller leaves the database untouched.
pub struct MatchService {
    repo: MatchRepository,
}

impl MatchService {
    pub fn new(db: DatabaseConnection) -> Self {
        Self {
            repo: MatchRepository::new(db),
        }
    }

    async fn load(&self, match_id: MatchId) -> Result<MatchSnapshot> {
        let snapshot = self.repo.load_snapshot(match_id).await?;
        snapshot.ok_or_else(|| GameError::not_found("match", match_id).into())
    }

    async fn apply<T>(
        &self,
        match_id: MatchId,
        step: impl FnOnce(&mut MatchSnapshot) -> GameResult<T>,
    ) -> Result<T> {
        let mut snapshot = self.load(match_id).await?;
        let out = step(&mut snapshot)?;
        self.repo.store_snapshot(&snapshot).await?;
        Ok(out)
    }

    pub async fn create_match(&self, rules: MatchRules) -> Result<Match> {
        let snapshot = MatchSnapshot::create(rules)?;
        self.repo.store_snapshot(&snapshot).await?;
        Ok(snapshot.game)
    }

    pub async fn add_team(&self, match_id: MatchId, name: &str) -> Result<TeamId> {
        self.apply(match_id, |snapshot| snapshot.add_team(name)).await
    }

    pub async fn add_player(
        &self,
        match_id: MatchId,
        team_id: TeamId,
        name: &str,
    ) -> Result<PlayerId> {
        self.apply(match_id, |snapshot| snapshot.add_player(team_id, name))
            .await
    }

    pub async fn begin_word_submission(
        &self,
        match_id: MatchId,
        expected_version: u32,
    ) -> Result<()> {
        self.apply(match_id, |snapshot| {
            snapshot.begin_word_submission(expected_version)
        })
        .await
    }

    pub async fn submit_word(
        &self,
        match_id: MatchId,
        expected_version: u32,
        player_id: PlayerId,
        text: &str,
    ) -> Result<WordId> {
        self.apply(match_id, |snapshot| {
            snapshot.submit_word(expected_version, player_id, text)
        })
        .await
    }

    pub async fn start(&self, match_id: MatchId, expected_version: u32) -> Result<()> {
        self.apply(match_id, |snapshot| snapshot.start(expected_version))
            .await
    }

    /// Returns the owning team's new total.
    pub async fn guess_word(
        &self,
        match_id: MatchId,
        expected_version: u32,
        word_id: WordId,
    ) -> Result<i32> {
        self.apply(match_id, |snapshot| {
            snapshot.guess_word(expected_version, word_id)
        })
        .await
    }

    /// Returns the owning team's new total.
    pub async fn skip_word(
        &self,
        match_id: MatchId,
        expected_version: u32,
        word_id: WordId,
    ) -> Result<i32> {
        self.apply(match_id, |snapshot| {
            snapshot.skip_word(expected_version, word_id)
        })
        .await
    }

    pub async fn record_time_remaining(
        &self,
        match_id: MatchId,
        expected_version: u32,
        seconds: i32,
    ) -> Result<()> {
        self.apply(match_id, |snapshot| {
            snapshot.record_time_remaining(expected_version, seconds)
        })
        .await
    }

    pub async fn end_turn(&self, match_id: MatchId, expected_version: u32) -> Result<()> {
        self.apply(match_id, |snapshot| snapshot.end_turn(expected_version))
            .await
    }

    /// Returns the phase the match landed in: `Playing` with the next
    /// player seated, or `RoundEnded` when the word pool ran dry.
    pub async fn advance_turn(
        &self,
        match_id: MatchId,
        expected_version: u32,
    ) -> Result<MatchPhase> {
        self.apply(match_id, |snapshot| snapshot.advance_turn(expected_version))
            .await
    }

    pub async fn advance_round(&self, match_id: MatchId, expected_version: u32) -> Result<()> {
        self.apply(match_id, |snapshot| {
            snapshot.advance_round(expected_version)
        })
        .await
    }

    pub async fn finish(&self, match_id: MatchId, expected_version: u32) -> Result<()> {
        let finished = self
            .apply(match_id, |snapshot| snapshot.finish(expected_version))
            .await;
        if finished.is_ok() {
            info!(match_id = %match_id, "match finished");
        }
        finished
    }

    // --- queries ---

    pub async fn find_match(&self, match_id: MatchId) -> Result<Option<Match>> {
        self.repo.find_match(match_id).await
    }

    pub async fn current_theme(&self, match_id: MatchId) -> Result<String> {
        let snapshot = self.load(match_id).await?;
        Ok(snapshot.current_theme()?.to_string())
    }

    pub async fn remaining_words(&self, match_id: MatchId) -> Result<usize> {
        let snapshot = self.load(match_id).await?;
        Ok(snapshot.remaining_words())
    }

    /// A pseudo-random word still in play, or `None` once exhausted.
    pub async fn draw_word(&self, match_id: MatchId) -> Result<Option<Word>> {
        let snapshot = self.load(match_id).await?;
        Ok(snapshot.draw_word().cloned())
    }

    pub async fn next_player(&self, match_id: MatchId) -> Result<Player> {
        let snapshot = self.load(match_id).await?;
        Ok(snapshot.next_player_or_unknown())
    }

    pub async fn results(&self, match_id: MatchId) -> Result<MatchResults> {
        let snapshot = self.load(match_id).await?;
        Ok(MatchResults {
            winner: snapshot.winner().cloned(),
            tied: snapshot.tied_leaders().into_iter().cloned().collect(),
            teams: snapshot.teams,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::connection::connect_to_memory_database;
    use migration::{Migrator, MigratorTrait};
    use tiempo_types::WordState;

    async fn setup_service() -> MatchService {
        let db = connect_to_memory_database().await.unwrap();
        Migrator::up(&db, None).await.unwrap();
        MatchService::new(db)
    }

    async fn version(service: &MatchService, match_id: MatchId) -> u32 {
        service
            .find_match(match_id)
            .await
            .unwrap()
            .unwrap()
            .version
    }

    #[tokio::test]
    async fn test_setup_through_word_submission() {
        let service = setup_service().await;
        let rules = MatchRules {
            words_per_player: 1,
            ..MatchRules::default()
        };
        let game = service.create_match(rules).await.unwrap();

        let alpha = service.add_team(game.id, "Equipo Alpha").await.unwrap();
        let beta = service.add_team(game.id, "Equipo Beta").await.unwrap();
        let alice = service.add_player(game.id, alpha, "Alice").await.unwrap();
        let bob = service.add_player(game.id, beta, "Bob").await.unwrap();

        let v = version(&service, game.id).await;
        service.begin_word_submission(game.id, v).await.unwrap();

        let v = version(&service, game.id).await;
        service.submit_word(game.id, v, alice, "faro").await.unwrap();
        let v = version(&service, game.id).await;
        service.submit_word(game.id, v, bob, "brujula").await.unwrap();

        let loaded = service.find_match(game.id).await.unwrap().unwrap();
        assert_eq!(loaded.phase, MatchPhase::Ready);
        assert_eq!(service.remaining_words(game.id).await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_stale_version_is_rejected_without_side_effects() {
        let service = setup_service().await;
        let game = service
            .create_match(MatchRules {
                words_per_player: 1,
                ..MatchRules::default()
            })
            .await
            .unwrap();
        let alpha = service.add_team(game.id, "Alpha").await.unwrap();
        let beta = service.add_team(game.id, "Beta").await.unwrap();
        let alice = service.add_player(game.id, alpha, "Alice").await.unwrap();
        let bob = service.add_player(game.id, beta, "Bob").await.unwrap();
        let v = version(&service, game.id).await;
        service.begin_word_submission(game.id, v).await.unwrap();
        let v = version(&service, game.id).await;
        let word = service.submit_word(game.id, v, alice, "faro").await.unwrap();
        let v = version(&service, game.id).await;
        service.submit_word(game.id, v, bob, "vela").await.unwrap();
        let v = version(&service, game.id).await;
        service.start(game.id, v).await.unwrap();

        let v = version(&service, game.id).await;
        service.guess_word(game.id, v, word).await.unwrap();

        // Same driver retries with the version it read before.
        let err = service.guess_word(game.id, v, word).await.unwrap_err();
        let err = err.downcast::<GameError>().unwrap();
        assert!(matches!(err, GameError::StaleVersion { .. }));

        let results = service.results(game.id).await.unwrap();
        let alpha_points = results
            .teams
            .iter()
            .find(|t| t.id == alpha)
            .unwrap()
            .points;
        assert_eq!(alpha_points, 1);
    }

    #[tokio::test]
    async fn test_guess_and_skip_adjust_the_stored_scores() {
        let service = setup_service().await;
        let game = service
            .create_match(MatchRules {
                words_per_player: 2,
                ..MatchRules::default()
            })
            .await
            .unwrap();
        let alpha = service.add_team(game.id, "Alpha").await.unwrap();
        let beta = service.add_team(game.id, "Beta").await.unwrap();
        let alice = service.add_player(game.id, alpha, "Alice").await.unwrap();
        let bob = service.add_player(game.id, beta, "Bob").await.unwrap();

        let v = version(&service, game.id).await;
        service.begin_word_submission(game.id, v).await.unwrap();
        let mut alpha_words = Vec::new();
        for text in ["faro", "vela"] {
            let v = version(&service, game.id).await;
            alpha_words.push(service.submit_word(game.id, v, alice, text).await.unwrap());
        }
        for text in ["ancla", "mapa"] {
            let v = version(&service, game.id).await;
            service.submit_word(game.id, v, bob, text).await.unwrap();
        }
        let v = version(&service, game.id).await;
        service.start(game.id, v).await.unwrap();

        let v = version(&service, game.id).await;
        let total = service.guess_word(game.id, v, alpha_words[0]).await.unwrap();
        assert_eq!(total, 1);
        let v = version(&service, game.id).await;
        let total = service.skip_word(game.id, v, alpha_words[1]).await.unwrap();
        assert_eq!(total, 0);

        // A skipped word is still in play for later in the round.
        assert_eq!(service.remaining_words(game.id).await.unwrap(), 3);
        let drawn = service.draw_word(game.id).await.unwrap().unwrap();
        assert_ne!(drawn.state, WordState::Guessed);
    }

    #[tokio::test]
    async fn test_turn_and_round_boundaries() {
        let service = setup_service().await;
        let game = service
            .create_match(MatchRules {
                words_per_player: 1,
                ..MatchRules::default()
            })
            .await
            .unwrap();
        let alpha = service.add_team(game.id, "Alpha").await.unwrap();
        let beta = service.add_team(game.id, "Beta").await.unwrap();
        let alice = service.add_player(game.id, alpha, "Alice").await.unwrap();
        let bob = service.add_player(game.id, beta, "Bob").await.unwrap();
        let v = version(&service, game.id).await;
        service.begin_word_submission(game.id, v).await.unwrap();
        let v = version(&service, game.id).await;
        let w1 = service.submit_word(game.id, v, alice, "faro").await.unwrap();
        let v = version(&service, game.id).await;
        let w2 = service.submit_word(game.id, v, bob, "vela").await.unwrap();
        let v = version(&service, game.id).await;
        service.start(game.id, v).await.unwrap();

        // Guess one, let the clock run out: next player comes up.
        let v = version(&service, game.id).await;
        service.guess_word(game.id, v, w1).await.unwrap();
        let v = version(&service, game.id).await;
        service.record_time_remaining(game.id, v, 3).await.unwrap();
        let v = version(&service, game.id).await;
        service.end_turn(game.id, v).await.unwrap();
        let v = version(&service, game.id).await;
        let phase = service.advance_turn(game.id, v).await.unwrap();
        assert_eq!(phase, MatchPhase::Playing);
        assert_eq!(service.next_player(game.id).await.unwrap().name, "Alice");

        // Exhaust the pool: the next turn boundary ends the round.
        let v = version(&service, game.id).await;
        service.guess_word(game.id, v, w2).await.unwrap();
        let v = version(&service, game.id).await;
        service.end_turn(game.id, v).await.unwrap();
        let v = version(&service, game.id).await;
        let phase = service.advance_turn(game.id, v).await.unwrap();
        assert_eq!(phase, MatchPhase::RoundEnded);

        // New round: next theme, words back in play, scores kept.
        let v = version(&service, game.id).await;
        service.advance_round(game.id, v).await.unwrap();
        assert_eq!(
            service.current_theme(game.id).await.unwrap(),
            "DESCRIBE CON UNA PALABRA"
        );
        assert_eq!(service.remaining_words(game.id).await.unwrap(), 2);
        let results = service.results(game.id).await.unwrap();
        assert_eq!(results.teams.iter().map(|t| t.points).sum::<i32>(), 2);
    }

    #[tokio::test]
    async fn test_results_name_the_winner_and_the_tie() {
        let service = setup_service().await;
        let game = service
            .create_match(MatchRules {
                words_per_player: 1,
                ..MatchRules::default()
            })
            .await
            .unwrap();
        let alpha = service.add_team(game.id, "Alpha").await.unwrap();
        let beta = service.add_team(game.id, "Beta").await.unwrap();
        let alice = service.add_player(game.id, alpha, "Alice").await.unwrap();
        let bob = service.add_player(game.id, beta, "Bob").await.unwrap();
        let v = version(&service, game.id).await;
        service.begin_word_submission(game.id, v).await.unwrap();
        let v = version(&service, game.id).await;
        let w1 = service.submit_word(game.id, v, alice, "faro").await.unwrap();
        let v = version(&service, game.id).await;
        let w2 = service.submit_word(game.id, v, bob, "vela").await.unwrap();
        let v = version(&service, game.id).await;
        service.start(game.id, v).await.unwrap();

        // Both teams guess one word: a tie, broken by listing order.
        let v = version(&service, game.id).await;
        service.guess_word(game.id, v, w1).await.unwrap();
        let v = version(&service, game.id).await;
        service.guess_word(game.id, v, w2).await.unwrap();

        let v = version(&service, game.id).await;
        service.finish(game.id, v).await.unwrap();

        let results = service.results(game.id).await.unwrap();
        assert_eq!(results.winner.as_ref().unwrap().id, alpha);
        assert_eq!(results.tied.len(), 2);

        let loaded = service.find_match(game.id).await.unwrap().unwrap();
        assert_eq!(loaded.phase, MatchPhase::Finished);
        let v = loaded.version;
        assert!(service.finish(game.id, v).await.is_err());
    }

    #[tokio::test]
    async fn test_unknown_match_is_not_found() {
        let service = setup_service().await;
        let err = service
            .start(uuid::Uuid::new_v4(), 0)
            .await
            .unwrap_err();
        let err = err.downcast::<GameError>().unwrap();
        assert!(matches!(err, GameError::NotFound { .. }));
    }
}
