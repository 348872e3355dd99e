use tiempo_core::{MatchRules, MatchSnapshot};
use tiempo_types::{PlayerId, TeamId};

/// Rules used across the integration suite: 3 default themes, 2 words
/// per player, 60-second turns.
pub fn standard_rules() -> MatchRules {
    MatchRules {
        words_per_player: 2,
        ..MatchRules::default()
    }
}

/// 2 teams ("Equipo Alpha", "Equipo Beta") with 2 players each, still
/// in the configuring phase.
pub fn standard_setup() -> (MatchSnapshot, Vec<TeamId>, Vec<PlayerId>) {
    let mut snap = MatchSnapshot::create(standard_rules()).unwrap();
    let alpha = snap.add_team("Equipo Alpha").unwrap();
    let beta = snap.add_team("Equipo Beta").unwrap();
    let players = vec![
        snap.add_player(alpha, "Alice").unwrap(),
        snap.add_player(alpha, "Ana").unwrap(),
        snap.add_player(beta, "Bob").unwrap(),
        snap.add_player(beta, "Bruno").unwrap(),
    ];
    (snap, vec![alpha, beta], players)
}

/// Drives `snap` through word submission until it flips to Ready.
pub fn submit_all_words(snap: &mut MatchSnapshot) {
    let players: Vec<PlayerId> = snap.players.iter().map(|p| p.id).collect();
    let quota = snap.game.words_per_player;
    for (i, player_id) in players.iter().enumerate() {
        for j in 0..quota {
            let v = snap.game.version;
            snap.submit_word(v, *player_id, &format!("palabra-{i}-{j}"))
                .unwrap();
        }
    }
}
