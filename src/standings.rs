use std::cmp::Ordering;

use crate::roster::TeamRecord;

/// League-table order: points, then goal difference, then goals scored (all descending).
pub fn compare_standing(a: &TeamRecord, b: &TeamRecord) -> Ordering {
    b.points
        .cmp(&a.points)
        .then_with(|| b.goal_difference().cmp(&a.goal_difference()))
        .then_with(|| b.goals_scored.cmp(&a.goals_scored))
}

/// Stable sort by [`compare_standing`], then `position = index + 1`.
/// Whatever position the records carried before is overwritten.
pub fn rank_teams(mut teams: Vec<TeamRecord>) -> Vec<TeamRecord> {
    teams.sort_by(compare_standing);
    for (idx, team) in teams.iter_mut().enumerate() {
        team.position = u32::try_from(idx + 1).unwrap_or(u32::MAX);
    }
    teams
}
