use chrono::{TimeZone, Utc};
use pl_dashboard::fixtures::{FixtureBatch, FixtureRecord};
use pl_dashboard::roster::{PlayerRecord, Position, Roster, TeamRecord};
use pl_dashboard::state::{
    AppState, Delta, PLAYER_TABLE_ROWS, PlayerSortKey, ProviderCommand, SortOrder, TeamSortKey,
    View, apply_delta,
};

fn team(name: &str, position: u32, goals: u32, form: Option<&str>) -> TeamRecord {
    TeamRecord {
        id: position,
        name: name.to_string(),
        short_name: name.chars().take(3).collect(),
        position,
        played: 8,
        win: 0,
        draw: 0,
        loss: 0,
        points: 0,
        goals_scored: goals,
        goals_against: 0,
        clean_sheets: 0,
        assists: 0,
        strength: 3,
        strength_overall_home: 0,
        strength_overall_away: 0,
        strength_attack_home: 0,
        strength_attack_away: 0,
        strength_defence_home: 0,
        strength_defence_away: 0,
        form: form.map(str::to_string),
    }
}

fn player(id: u32, position: Position, total_points: f64, form: f64) -> PlayerRecord {
    PlayerRecord {
        id,
        name: format!("P{id}"),
        team: None,
        position,
        total_points,
        points_per_game: 0.0,
        form,
        selected_by_percent: 0.0,
        now_cost: 5.0,
        goals_scored: 0,
        assists: 0,
        clean_sheets: 0,
        status: "a".to_string(),
        news: String::new(),
    }
}

fn fixture(home: &str, raw_date: &str) -> FixtureRecord {
    FixtureRecord {
        home_team: home.to_string(),
        away_team: "Away".to_string(),
        match_date: String::new(),
        raw_date: raw_date.to_string(),
        status: "Not Started".to_string(),
        competition: "Premier League".to_string(),
        matchday: None,
        home_crest: None,
        away_crest: None,
        venue: None,
        home_odds: None,
        draw_odds: None,
        away_odds: None,
        bookmaker: None,
    }
}

fn state_with_teams() -> AppState {
    let mut state = AppState::new();
    state.roster.teams = vec![
        team("Chelsea", 2, 12, Some("WDWWL")),
        team("Arsenal", 3, 8, None),
        team("Liverpool", 1, 6, Some("WWLWW")),
    ];
    state
}

fn team_names(state: &AppState) -> Vec<String> {
    state.sorted_teams().iter().map(|t| t.name.clone()).collect()
}

#[test]
fn teams_default_to_table_position() {
    let state = state_with_teams();
    assert_eq!(state.team_sort, TeamSortKey::Position);
    assert_eq!(team_names(&state), vec!["Liverpool", "Chelsea", "Arsenal"]);
}

#[test]
fn same_column_flips_and_new_column_starts_ascending() {
    let mut state = state_with_teams();
    state.sort_teams_by(TeamSortKey::Position);
    assert_eq!(state.team_order, SortOrder::Desc);
    assert_eq!(team_names(&state), vec!["Arsenal", "Chelsea", "Liverpool"]);

    state.sort_teams_by(TeamSortKey::GoalsScored);
    assert_eq!(state.team_order, SortOrder::Asc);
    assert_eq!(team_names(&state), vec!["Liverpool", "Arsenal", "Chelsea"]);
}

#[test]
fn text_columns_sort_lexically() {
    let mut state = state_with_teams();
    state.sort_teams_by(TeamSortKey::Name);
    assert_eq!(team_names(&state), vec!["Arsenal", "Chelsea", "Liverpool"]);

    state.sort_teams_by(TeamSortKey::Form);
    // Missing form sorts as the empty string.
    assert_eq!(team_names(&state), vec!["Arsenal", "Chelsea", "Liverpool"]);
    state.sort_teams_by(TeamSortKey::Form);
    assert_eq!(team_names(&state), vec!["Liverpool", "Chelsea", "Arsenal"]);
}

#[test]
fn players_show_top_twenty_by_metric() {
    let mut state = AppState::new();
    state.set_view(View::Players);
    state.roster.players = (0..30)
        .map(|i| player(i, Position::Midfielder, f64::from(i), f64::from(30 - i)))
        .collect();

    let top = state.visible_players();
    assert_eq!(top.len(), PLAYER_TABLE_ROWS);
    assert_eq!(top[0].id, 29);
    assert_eq!(top[19].id, 10);

    state.cycle_player_sort();
    state.cycle_player_sort();
    assert_eq!(state.player_sort, PlayerSortKey::Form);
    assert_eq!(state.visible_players()[0].id, 0);
}

#[test]
fn position_filter_cycles_through_all_positions() {
    let mut state = AppState::new();
    state.roster.players = vec![
        player(1, Position::Goalkeeper, 40.0, 0.0),
        player(2, Position::Defender, 50.0, 0.0),
        player(3, Position::Forward, 60.0, 0.0),
        player(4, Position::Defender, 55.0, 0.0),
    ];

    state.cycle_position_filter();
    assert_eq!(state.position_filter, Some(Position::Goalkeeper));
    state.cycle_position_filter();
    let ids: Vec<u32> = state.visible_players().iter().map(|p| p.id).collect();
    assert_eq!(ids, vec![4, 2]);

    state.cycle_position_filter();
    state.cycle_position_filter();
    state.cycle_position_filter();
    assert_eq!(state.position_filter, None);
    assert_eq!(state.visible_players().len(), 4);
}

#[test]
fn roster_delta_replaces_data_and_clears_error() {
    let mut state = AppState::new();
    state.begin_fetch(&ProviderCommand::FetchRoster);
    assert!(state.roster_loading);
    apply_delta(&mut state, Delta::RosterFailed("bootstrap http 503".to_string()));
    assert!(!state.roster_loading);
    assert!(state.roster_error.is_some());

    let fetched_at = Utc.with_ymd_and_hms(2024, 10, 19, 0, 0, 5).unwrap();
    let roster = Roster {
        teams: vec![team("Arsenal", 1, 8, None)],
        ..Roster::default()
    };
    apply_delta(&mut state, Delta::SetRoster { roster, fetched_at });
    assert!(state.roster_error.is_none());
    assert_eq!(state.roster.teams.len(), 1);
    assert_eq!(state.roster_updated_at, Some(fetched_at));
}

#[test]
fn failed_fixture_fetch_keeps_previous_rows() {
    let mut state = AppState::new();
    let fetched_at = Utc.with_ymd_and_hms(2024, 10, 19, 0, 0, 5).unwrap();
    let batch = FixtureBatch {
        fixtures: vec![fixture("Arsenal", "2024-10-19T14:00:00Z")],
        warnings: vec!["No crest id found for: Leeds United".to_string()],
    };
    apply_delta(&mut state, Delta::SetFixtures { batch, fetched_at });
    assert!(state.logs.iter().any(|l| l.contains("Leeds United")));

    apply_delta(&mut state, Delta::FixturesFailed("odds http 429".to_string()));
    assert_eq!(state.fixtures.len(), 1);
    assert_eq!(state.fixtures_error.as_deref(), Some("odds http 429"));
    assert_eq!(state.fixtures_updated_at, Some(fetched_at));
}

#[test]
fn selection_wraps_and_resets_on_view_change() {
    let mut state = AppState::new();
    state.fixtures = vec![
        fixture("A", "2024-10-19T11:30:00Z"),
        fixture("B", "2024-10-19T14:00:00Z"),
    ];
    state.select_prev();
    assert_eq!(state.selected, 1);
    state.select_next();
    assert_eq!(state.selected, 0);
    state.select_next();
    state.cycle_view();
    assert_eq!(state.view, View::Teams);
    assert_eq!(state.selected, 0);
}

#[test]
fn log_is_bounded() {
    let mut state = AppState::new();
    for i in 0..250 {
        state.push_log(format!("[INFO] {i}"));
    }
    assert_eq!(state.logs.len(), 200);
    assert_eq!(state.logs.front().map(String::as_str), Some("[INFO] 50"));
}
