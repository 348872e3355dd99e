use serde::{Deserialize, Serialize};

use crate::game::{MatchId, PlayerId, TeamId};

/// A team competing in one match. Points are a pure accumulator with
/// no floor; skipping words can take a team below zero.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Team {
    pub id: TeamId,
    pub match_id: MatchId,
    pub name: String,
    pub points: i32,
}

/// A player on a team. Immutable after setup apart from ordering.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Player {
    pub id: PlayerId,
    pub team_id: TeamId,
    pub name: String,
    pub order_in_team: u32,
}
