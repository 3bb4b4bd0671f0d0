use std::fs;
use std::path::PathBuf;

use pl_dashboard::error::PipelineError;
use pl_dashboard::roster::{Position, normalize_bootstrap_json};

fn read_fixture(name: &str) -> String {
    let mut path = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    path.push("tests");
    path.push("fixtures");
    path.push(name);
    fs::read_to_string(path).expect("fixture file should be readable")
}

#[test]
fn bootstrap_fixture_normalizes_every_list() {
    let roster = normalize_bootstrap_json(&read_fixture("bootstrap.json")).expect("fixture should parse");
    assert_eq!(roster.players.len(), 11);
    assert_eq!(roster.teams.len(), 3);
    assert_eq!(roster.gameweeks.len(), 3);
}

#[test]
fn teams_are_ranked_by_points_then_goal_difference() {
    let roster = normalize_bootstrap_json(&read_fixture("bootstrap.json")).expect("fixture should parse");
    let order: Vec<(&str, u32)> = roster
        .teams
        .iter()
        .map(|t| (t.name.as_str(), t.position))
        .collect();
    assert_eq!(
        order,
        vec![("Liverpool", 1), ("Chelsea", 2), ("Arsenal", 3)]
    );
}

#[test]
fn team_goals_and_assists_are_summed_from_players() {
    let roster = normalize_bootstrap_json(&read_fixture("bootstrap.json")).expect("fixture should parse");
    let arsenal = roster.teams.iter().find(|t| t.name == "Arsenal").unwrap();
    assert_eq!(arsenal.goals_scored, 8);
    assert_eq!(arsenal.goals_against, 6);
    assert_eq!(arsenal.assists, 7);
    assert_eq!(arsenal.goal_difference(), 2);
}

#[test]
fn team_goals_for_wins_over_player_sum() {
    let roster = normalize_bootstrap_json(&read_fixture("bootstrap.json")).expect("fixture should parse");
    let goals = |name: &str| {
        roster
            .teams
            .iter()
            .find(|t| t.name == name)
            .map(|t| t.goals_scored)
            .unwrap()
    };
    // Liverpool players score 6 between them; the team aggregate says 17.
    assert_eq!(goals("Liverpool"), 17);
    assert_eq!(goals("Arsenal"), 8);
    assert_eq!(goals("Chelsea"), 12);
}

#[test]
fn clean_sheets_take_best_goalkeeper_or_defender() {
    let roster = normalize_bootstrap_json(&read_fixture("bootstrap.json")).expect("fixture should parse");
    let cs = |name: &str| {
        roster
            .teams
            .iter()
            .find(|t| t.name == name)
            .map(|t| t.clean_sheets)
            .unwrap()
    };
    // Arsenal: GK 3, DEF 5, midfield and attack ignored.
    assert_eq!(cs("Arsenal"), 5);
    assert_eq!(cs("Chelsea"), 2);
    // Liverpool: a MID with 4 does not count; the GK also has 4.
    assert_eq!(cs("Liverpool"), 4);
}

#[test]
fn played_games_alias_is_accepted() {
    let roster = normalize_bootstrap_json(&read_fixture("bootstrap.json")).expect("fixture should parse");
    let chelsea = roster.teams.iter().find(|t| t.name == "Chelsea").unwrap();
    assert_eq!(chelsea.played, 8);
    assert_eq!(chelsea.strength_attack_away, 1240);
}

#[test]
fn players_join_team_names_and_scale_cost() {
    let roster = normalize_bootstrap_json(&read_fixture("bootstrap.json")).expect("fixture should parse");
    let saka = roster.players.iter().find(|p| p.name == "Saka").unwrap();
    assert_eq!(saka.team.as_deref(), Some("Arsenal"));
    assert_eq!(saka.position, Position::Midfielder);
    assert!((saka.now_cost - 10.1).abs() < 1e-9);
    assert!((saka.points_per_game - 8.8).abs() < 1e-9);
    assert!((saka.selected_by_percent - 45.1).abs() < 1e-9);
}

#[test]
fn missing_team_or_position_falls_back() {
    let roster = normalize_bootstrap_json(&read_fixture("bootstrap.json")).expect("fixture should parse");
    let trialist = roster.players.iter().find(|p| p.name == "Trialist").unwrap();
    assert_eq!(trialist.team, None);
    assert_eq!(trialist.position, Position::Forward);

    let loanee = roster.players.iter().find(|p| p.name == "Loanee").unwrap();
    assert_eq!(loanee.team, None, "team id with no matching team");
    assert_eq!(loanee.total_points, 12.0);
    assert_eq!(loanee.points_per_game, 0.0);
    assert_eq!(loanee.now_cost, 0.0);
    assert_eq!(loanee.status, "");
}

#[test]
fn current_gameweek_is_flagged() {
    let roster = normalize_bootstrap_json(&read_fixture("bootstrap.json")).expect("fixture should parse");
    let current = roster.current_gameweek().expect("a current gameweek");
    assert_eq!(current.id, 8);
    assert_eq!(current.deadline_time.as_deref(), Some("2024-10-19T10:00:00Z"));
}

#[test]
fn missing_list_is_malformed() {
    let err = normalize_bootstrap_json(r#"{"elements": [], "teams": []}"#).unwrap_err();
    assert!(matches!(err, PipelineError::MalformedPayload(_)));
    assert_eq!(err.status_code(), 502);
}

#[test]
fn non_json_body_is_malformed() {
    let err = normalize_bootstrap_json("<html>maintenance</html>").unwrap_err();
    assert!(matches!(err, PipelineError::MalformedPayload(_)));
}

#[test]
fn empty_lists_give_empty_roster() {
    let roster =
        normalize_bootstrap_json(r#"{"elements": [], "teams": [], "events": []}"#).unwrap();
    assert!(roster.players.is_empty());
    assert!(roster.teams.is_empty());
    assert!(roster.current_gameweek().is_none());
}

#[test]
fn odd_team_form_and_element_type_do_not_fail_the_roster() {
    let body = r#"{
        "elements": [
            {"id": 1, "web_name": "Keeper", "team": 1, "element_type": -1, "clean_sheets": 9},
            {"id": 2, "web_name": "Big", "team": 1, "element_type": 300},
            {"id": 3, "web_name": "Back", "team": 1, "element_type": "2", "clean_sheets": 4}
        ],
        "teams": [
            {"id": 1, "name": "Arsenal", "form": 0.0},
            {"id": 2, "name": "Chelsea", "form": null, "short_name": 7}
        ],
        "events": []
    }"#;
    let roster = normalize_bootstrap_json(body).expect("lenient fields should parse");

    let arsenal = roster.teams.iter().find(|t| t.name == "Arsenal").unwrap();
    assert_eq!(arsenal.form.as_deref(), Some("0.0"));
    // The out-of-range keeper counts as a forward, so only the defender's 4 applies.
    assert_eq!(arsenal.clean_sheets, 4);

    let chelsea = roster.teams.iter().find(|t| t.name == "Chelsea").unwrap();
    assert_eq!(chelsea.form, None);
    assert_eq!(chelsea.short_name, "7");

    let positions: Vec<Position> = roster.players.iter().map(|p| p.position).collect();
    assert_eq!(
        positions,
        vec![Position::Forward, Position::Forward, Position::Defender]
    );
}
