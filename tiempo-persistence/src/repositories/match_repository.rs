use anyhow::Result;
use sea_orm::sea_query::{Expr, OnConflict};
use sea_orm::{
    ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder,
};
use uuid::Uuid;

use crate::entities::{matches, players, prelude::*, teams, turn_order, words};
use tiempo_core::MatchSnapshot;
use tiempo_types::{
    GameError, Match, MatchPhase, Player, Team, TurnSlot, Word, WordState,
};

/// Loads and stores whole matches. The state machine works on an
/// in-memory [`MatchSnapshot`]; this repository is the only place that
/// knows how that snapshot maps onto tables.
pub struct MatchRepository {
    db: DatabaseConnection,
}

impl MatchRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    fn model_to_match(model: matches::Model) -> Result<Match> {
        Ok(Match {
            id: model.id,
            phase: model.phase.parse()?,
            theme_index: model.theme_index as usize,
            themes: serde_json::from_str(&model.themes)?,
            words_per_player: model.words_per_player as u32,
            turn_seconds: model.turn_seconds,
            skip_reset: model.skip_reset.parse()?,
            time_remaining: model.time_remaining,
            rounds_played: model.rounds_played as u32,
            current_player: model.current_player,
            version: model.version as u32,
            created_at: model.created_at.to_rfc3339(),
        })
    }

    fn match_to_active_model(game: &Match) -> Result<matches::ActiveModel> {
        let created_at = chrono::DateTime::parse_from_rfc3339(&game.created_at)
            .unwrap_or_else(|_| chrono::Utc::now().into());

        Ok(matches::ActiveModel {
            id: sea_orm::ActiveValue::Set(game.id),
            phase: sea_orm::ActiveValue::Set(game.phase.to_string()),
            theme_index: sea_orm::ActiveValue::Set(game.theme_index as i32),
            themes: sea_orm::ActiveValue::Set(serde_json::to_string(&game.themes)?),
            words_per_player: sea_orm::ActiveValue::Set(game.words_per_player as i32),
            turn_seconds: sea_orm::ActiveValue::Set(game.turn_seconds),
            skip_reset: sea_orm::ActiveValue::Set(game.skip_reset.to_string()),
            time_remaining: sea_orm::ActiveValue::Set(game.time_remaining),
            rounds_played: sea_orm::ActiveValue::Set(game.rounds_played as i32),
            current_player: sea_orm::ActiveValue::Set(game.current_player),
            version: sea_orm::ActiveValue::Set(game.version as i32),
            created_at: sea_orm::ActiveValue::Set(created_at),
        })
    }

    fn model_to_team(model: teams::Model) -> Team {
        Team {
            id: model.id,
            match_id: model.match_id,
            name: model.name,
            points: model.points,
        }
    }

    fn model_to_player(model: players::Model) -> Player {
        Player {
            id: model.id,
            team_id: model.team_id,
            name: model.name,
            order_in_team: model.order_in_team as u32,
        }
    }

    fn model_to_word(model: words::Model) -> Result<Word> {
        Ok(Word {
            id: model.id,
            match_id: model.match_id,
            team_id: model.team_id,
            text: model.text,
            state: model.state.parse()?,
        })
    }

    pub async fn create_match(&self, game: &Match) -> Result<()> {
        Matches::insert(Self::match_to_active_model(game)?)
            .exec(&self.db)
            .await?;
        Ok(())
    }

    pub async fn find_match(&self, match_id: Uuid) -> Result<Option<Match>> {
        let model = Matches::find_by_id(match_id).one(&self.db).await?;
        model.map(Self::model_to_match).transpose()
    }

    pub async fn find_phase(&self, match_id: Uuid) -> Result<Option<MatchPhase>> {
        let model = Matches::find_by_id(match_id).one(&self.db).await?;
        match model {
            Some(model) => Ok(Some(model.phase.parse::<MatchPhase>()?)),
            None => Ok(None),
        }
    }

    pub async fn find_themes(&self, match_id: Uuid) -> Result<Option<Vec<String>>> {
        let model = Matches::find_by_id(match_id).one(&self.db).await?;
        match model {
            Some(model) => Ok(Some(serde_json::from_str(&model.themes)?)),
            None => Ok(None),
        }
    }

    pub async fn find_time_remaining(&self, match_id: Uuid) -> Result<Option<i32>> {
        let model = Matches::find_by_id(match_id).one(&self.db).await?;
        Ok(model.map(|m| m.time_remaining))
    }

    /// Writes the mutable columns of an existing match row back.
    pub async fn update_match(&self, game: &Match) -> Result<()> {
        Matches::update(Self::match_to_active_model(game)?)
            .exec(&self.db)
            .await?;
        Ok(())
    }

    pub async fn create_team(&self, team: &Team) -> Result<()> {
        let model = teams::ActiveModel {
            id: sea_orm::ActiveValue::Set(team.id),
            match_id: sea_orm::ActiveValue::Set(team.match_id),
            name: sea_orm::ActiveValue::Set(team.name.clone()),
            points: sea_orm::ActiveValue::Set(team.points),
            created_at: sea_orm::ActiveValue::Set(chrono::Utc::now().into()),
        };
        Teams::insert(model).exec(&self.db).await?;
        Ok(())
    }

    /// SQL-side `points = points + delta`; returns the new total.
    pub async fn adjust_points(&self, team_id: Uuid, delta: i32) -> Result<i32> {
        Teams::update_many()
            .col_expr(
                teams::Column::Points,
                Expr::col(teams::Column::Points).add(delta),
            )
            .filter(teams::Column::Id.eq(team_id))
            .exec(&self.db)
            .await?;

        let model = Teams::find_by_id(team_id)
            .one(&self.db)
            .await?
            .ok_or_else(|| GameError::not_found("team", team_id))?;
        Ok(model.points)
    }

    /// Teams in listing order. The winner tie-break relies on this
    /// being the order the teams were created in.
    pub async fn list_teams(&self, match_id: Uuid) -> Result<Vec<Team>> {
        let models = Teams::find()
            .filter(teams::Column::MatchId.eq(match_id))
            .order_by_asc(teams::Column::CreatedAt)
            .all(&self.db)
            .await?;

        Ok(models.into_iter().map(Self::model_to_team).collect())
    }

    pub async fn create_player(&self, player: &Player) -> Result<()> {
        let model = players::ActiveModel {
            id: sea_orm::ActiveValue::Set(player.id),
            team_id: sea_orm::ActiveValue::Set(player.team_id),
            name: sea_orm::ActiveValue::Set(player.name.clone()),
            order_in_team: sea_orm::ActiveValue::Set(player.order_in_team as i32),
        };
        Players::insert(model).exec(&self.db).await?;
        Ok(())
    }

    pub async fn find_player(&self, player_id: Uuid) -> Result<Option<Player>> {
        let model = Players::find_by_id(player_id).one(&self.db).await?;
        Ok(model.map(Self::model_to_player))
    }

    pub async fn list_players_in_team(&self, team_id: Uuid) -> Result<Vec<Player>> {
        let models = Players::find()
            .filter(players::Column::TeamId.eq(team_id))
            .order_by_asc(players::Column::OrderInTeam)
            .all(&self.db)
            .await?;

        Ok(models.into_iter().map(Self::model_to_player).collect())
    }

    /// Players grouped by their team's listing order, then by seat.
    pub async fn list_players(&self, match_id: Uuid) -> Result<Vec<Player>> {
        let mut out = Vec::new();
        for team in self.list_teams(match_id).await? {
            out.extend(self.list_players_in_team(team.id).await?);
        }
        Ok(out)
    }

    pub async fn list_turn_order(&self, match_id: Uuid) -> Result<Vec<TurnSlot>> {
        let models = TurnOrder::find()
            .filter(turn_order::Column::MatchId.eq(match_id))
            .order_by_asc(turn_order::Column::TurnIndex)
            .all(&self.db)
            .await?;

        Ok(models
            .into_iter()
            .map(|model| TurnSlot {
                player_id: model.player_id,
                turn_index: model.turn_index as u32,
            })
            .collect())
    }

    /// Replaces the stored permutation wholesale. Called once when the
    /// order is frozen, and again on every snapshot store.
    pub async fn save_turn_order(&self, match_id: Uuid, slots: &[TurnSlot]) -> Result<()> {
        TurnOrder::delete_many()
            .filter(turn_order::Column::MatchId.eq(match_id))
            .exec(&self.db)
            .await?;

        if slots.is_empty() {
            return Ok(());
        }

        let models = slots.iter().map(|slot| turn_order::ActiveModel {
            match_id: sea_orm::ActiveValue::Set(match_id),
            turn_index: sea_orm::ActiveValue::Set(slot.turn_index as i32),
            player_id: sea_orm::ActiveValue::Set(slot.player_id),
        });

        TurnOrder::insert_many(models).exec(&self.db).await?;
        Ok(())
    }

    pub async fn create_word(&self, word: &Word) -> Result<()> {
        let model = words::ActiveModel {
            id: sea_orm::ActiveValue::Set(word.id),
            match_id: sea_orm::ActiveValue::Set(word.match_id),
            team_id: sea_orm::ActiveValue::Set(word.team_id),
            text: sea_orm::ActiveValue::Set(word.text.clone()),
            state: sea_orm::ActiveValue::Set(word.state.to_string()),
        };
        Words::insert(model).exec(&self.db).await?;
        Ok(())
    }

    pub async fn list_words(&self, match_id: Uuid) -> Result<Vec<Word>> {
        let models = Words::find()
            .filter(words::Column::MatchId.eq(match_id))
            .all(&self.db)
            .await?;

        models.into_iter().map(Self::model_to_word).collect()
    }

    pub async fn list_pending_words(&self, match_id: Uuid) -> Result<Vec<Word>> {
        let models = Words::find()
            .filter(words::Column::MatchId.eq(match_id))
            .filter(words::Column::State.eq(WordState::Pending.as_str()))
            .all(&self.db)
            .await?;

        models.into_iter().map(Self::model_to_word).collect()
    }

    pub async fn update_word_state(&self, word_id: Uuid, state: WordState) -> Result<()> {
        Words::update_many()
            .col_expr(words::Column::State, Expr::value(state.to_string()))
            .filter(words::Column::Id.eq(word_id))
            .exec(&self.db)
            .await?;
        Ok(())
    }

    pub async fn load_snapshot(&self, match_id: Uuid) -> Result<Option<MatchSnapshot>> {
        let Some(game) = self.find_match(match_id).await? else {
            return Ok(None);
        };

        let teams = self.list_teams(match_id).await?;
        let players = self.list_players(match_id).await?;
        let turn_order = self.list_turn_order(match_id).await?;
        let words = self.list_words(match_id).await?;

        Ok(Some(MatchSnapshot {
            game,
            teams,
            players,
            turn_order,
            words,
        }))
    }

    /// Writes the whole snapshot back. Rows are upserted by id, so the
    /// same call covers a brand-new match and an applied transition.
    pub async fn store_snapshot(&self, snapshot: &MatchSnapshot) -> Result<()> {
        Matches::insert(Self::match_to_active_model(&snapshot.game)?)
            .on_conflict(
                OnConflict::column(matches::Column::Id)
                    .update_columns([
                        matches::Column::Phase,
                        matches::Column::ThemeIndex,
                        matches::Column::TimeRemaining,
                        matches::Column::RoundsPlayed,
                        matches::Column::CurrentPlayer,
                        matches::Column::Version,
                    ])
                    .to_owned(),
            )
            .exec(&self.db)
            .await?;

        self.store_teams(snapshot).await?;
        self.store_players(snapshot).await?;
        self.save_turn_order(snapshot.game.id, &snapshot.turn_order)
            .await?;
        self.store_words(snapshot).await?;

        Ok(())
    }

    async fn store_teams(&self, snapshot: &MatchSnapshot) -> Result<()> {
        // One insert per team so each row gets its own timestamp and
        // the listing order round-trips.
        for team in &snapshot.teams {
            let model = teams::ActiveModel {
                id: sea_orm::ActiveValue::Set(team.id),
                match_id: sea_orm::ActiveValue::Set(team.match_id),
                name: sea_orm::ActiveValue::Set(team.name.clone()),
                points: sea_orm::ActiveValue::Set(team.points),
                created_at: sea_orm::ActiveValue::Set(chrono::Utc::now().into()),
            };
            Teams::insert(model)
                .on_conflict(
                    OnConflict::column(teams::Column::Id)
                        .update_columns([teams::Column::Name, teams::Column::Points])
                        .to_owned(),
                )
                .exec(&self.db)
                .await?;
        }
        Ok(())
    }

    async fn store_players(&self, snapshot: &MatchSnapshot) -> Result<()> {
        if snapshot.players.is_empty() {
            return Ok(());
        }

        let models = snapshot.players.iter().map(|player| players::ActiveModel {
            id: sea_orm::ActiveValue::Set(player.id),
            team_id: sea_orm::ActiveValue::Set(player.team_id),
            name: sea_orm::ActiveValue::Set(player.name.clone()),
            order_in_team: sea_orm::ActiveValue::Set(player.order_in_team as i32),
        });

        Players::insert_many(models)
            .on_conflict(
                OnConflict::column(players::Column::Id)
                    .update_columns([players::Column::Name, players::Column::OrderInTeam])
                    .to_owned(),
            )
            .exec(&self.db)
            .await?;

        Ok(())
    }

    async fn store_words(&self, snapshot: &MatchSnapshot) -> Result<()> {
        if snapshot.words.is_empty() {
            return Ok(());
        }

        let models = snapshot.words.iter().map(|word| words::ActiveModel {
            id: sea_orm::ActiveValue::Set(word.id),
            match_id: sea_orm::ActiveValue::Set(word.match_id),
            team_id: sea_orm::ActiveValue::Set(word.team_id),
            text: sea_orm::ActiveValue::Set(word.text.clone()),
            state: sea_orm::ActiveValue::Set(word.state.to_string()),
        });

        Words::insert_many(models)
            .on_conflict(
                OnConflict::column(words::Column::Id)
                    .update_columns([words::Column::State])
                    .to_owned(),
            )
            .exec(&self.db)
            .await?;

        Ok(())
    }
}
