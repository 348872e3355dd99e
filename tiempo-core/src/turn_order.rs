use tiempo_types::{Player, PlayerId, Team, TurnSlot};
use uuid::Uuid;

/// Builds the fixed turn permutation for a match: teams alternate in
/// listing order, each sending its players by `order_in_team`. With
/// uneven rosters, exhausted teams simply drop out of the rotation.
pub fn build_turn_order(teams: &[Team], players: &[Player]) -> Vec<TurnSlot> {
    let rosters: Vec<Vec<&Player>> = teams
        .iter()
        .map(|team| {
            let mut roster: Vec<&Player> =
                players.iter().filter(|p| p.team_id == team.id).collect();
            roster.sort_by_key(|p| p.order_in_team);
            roster
        })
        .collect();

    let deepest = rosters.iter().map(|r| r.len()).max().unwrap_or(0);
    let mut slots = Vec::with_capacity(players.len());
    for depth in 0..deepest {
        for roster in &rosters {
            if let Some(player) = roster.get(depth) {
                slots.push(TurnSlot {
                    player_id: player.id,
                    turn_index: slots.len() as u32,
                });
            }
        }
    }
    slots
}

/// Pure cyclic lookup: the player seated after `current` in the fixed
/// permutation. The slot after the last wraps to the first; a missing
/// or absent `current` restarts the rotation at slot zero. An empty
/// permutation has no next player.
pub fn next_player<'a>(
    order: &[TurnSlot],
    players: &'a [Player],
    current: Option<PlayerId>,
) -> Option<&'a Player> {
    if order.is_empty() {
        return None;
    }
    let next_index = current
        .and_then(|id| order.iter().position(|slot| slot.player_id == id))
        .map(|i| (i + 1) % order.len())
        .unwrap_or(0);
    let next_id = order[next_index].player_id;
    players.iter().find(|p| p.id == next_id)
}

/// Sentinel returned while the roster is still loading, so callers
/// can render something instead of failing.
pub fn unknown_player() -> Player {
    Player {
        id: Uuid::nil(),
        team_id: Uuid::nil(),
        name: "unknown".to_string(),
        order_in_team: 0,
    }
}

/// `next_player`, but with the sentinel instead of `None`.
pub fn next_player_or_unknown(
    order: &[TurnSlot],
    players: &[Player],
    current: Option<PlayerId>,
) -> Player {
    next_player(order, players, current)
        .cloned()
        .unwrap_or_else(unknown_player)
}
