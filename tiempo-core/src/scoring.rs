use tiempo_types::{GameError, GameResult, Team, TeamId};

pub struct ScoreLedger;

impl ScoreLedger {
    /// Applies a point delta to a team and returns the new total.
    /// Pure accumulator: no floor, no ceiling.
    pub fn adjust(teams: &mut [Team], team_id: TeamId, delta: i32) -> GameResult<i32> {
        let team = teams
            .iter_mut()
            .find(|t| t.id == team_id)
            .ok_or_else(|| GameError::not_found("team", team_id))?;
        team.points += delta;
        Ok(team.points)
    }

    /// The first team in listing order among those sharing the
    /// maximum score. Ties resolve deterministically, never randomly.
    pub fn winner(teams: &[Team]) -> Option<&Team> {
        let top = teams.iter().map(|t| t.points).max()?;
        teams.iter().find(|t| t.points == top)
    }

    /// Every team sharing the maximum score, in listing order, for
    /// callers that want to present true simultaneity themselves.
    pub fn tied_leaders(teams: &[Team]) -> Vec<&Team> {
        match teams.iter().map(|t| t.points).max() {
            Some(top) => teams.iter().filter(|t| t.points == top).collect(),
            None => Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn teams_with_points(points: &[i32]) -> Vec<Team> {
        let match_id = Uuid::new_v4();
        points
            .iter()
            .enumerate()
            .map(|(i, &points)| Team {
                id: Uuid::new_v4(),
                match_id,
                name: format!("Equipo {}", i + 1),
                points,
            })
            .collect()
    }

    #[test]
    fn adjust_accumulates_and_can_go_negative() {
        let mut teams = teams_with_points(&[0]);
        let id = teams[0].id;

        assert_eq!(ScoreLedger::adjust(&mut teams, id, 1).unwrap(), 1);
        assert_eq!(ScoreLedger::adjust(&mut teams, id, -1).unwrap(), 0);
        assert_eq!(ScoreLedger::adjust(&mut teams, id, -1).unwrap(), -1);
    }

    #[test]
    fn guess_and_skip_on_the_same_team_net_to_zero() {
        let mut teams = teams_with_points(&[5]);
        let id = teams[0].id;

        ScoreLedger::adjust(&mut teams, id, 1).unwrap();
        ScoreLedger::adjust(&mut teams, id, -1).unwrap();
        assert_eq!(teams[0].points, 5);
    }

    #[test]
    fn adjust_unknown_team_is_not_found() {
        let mut teams = teams_with_points(&[0]);
        let err = ScoreLedger::adjust(&mut teams, Uuid::new_v4(), 1).unwrap_err();
        assert!(matches!(err, GameError::NotFound { .. }));
    }

    #[test]
    fn winner_takes_the_maximum() {
        let teams = teams_with_points(&[15, 20, 10]);
        let winner = ScoreLedger::winner(&teams).unwrap();
        assert_eq!(winner.points, 20);
        assert_eq!(winner.name, "Equipo 2");
    }

    #[test]
    fn tie_goes_to_the_first_listed_team() {
        let teams = teams_with_points(&[20, 20, 10]);
        let winner = ScoreLedger::winner(&teams).unwrap();
        assert_eq!(winner.id, teams[0].id);
    }

    #[test]
    fn tied_leaders_exposes_the_full_set() {
        let teams = teams_with_points(&[20, 20, 10]);
        let leaders = ScoreLedger::tied_leaders(&teams);
        assert_eq!(leaders.len(), 2);
        assert_eq!(leaders[0].id, teams[0].id);
        assert_eq!(leaders[1].id, teams[1].id);
    }

    #[test]
    fn no_teams_means_no_winner() {
        let teams: Vec<Team> = Vec::new();
        assert!(ScoreLedger::winner(&teams).is_none());
        assert!(ScoreLedger::tied_leaders(&teams).is_empty());
    }
}
