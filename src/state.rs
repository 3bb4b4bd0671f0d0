use std::cmp::Ordering;
use std::collections::VecDeque;

use chrono::{DateTime, Utc};

use crate::fixtures::{FixtureBatch, FixtureRecord};
use crate::roster::{PlayerRecord, Position, Roster, TeamRecord};

pub const PLAYER_TABLE_ROWS: usize = 20;
const MAX_LOGS: usize = 200;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View {
    Fixtures,
    Teams,
    Players,
}

impl View {
    pub fn next(self) -> Self {
        match self {
            View::Fixtures => View::Teams,
            View::Teams => View::Players,
            View::Players => View::Fixtures,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            View::Fixtures => "Fixtures",
            View::Teams => "Teams",
            View::Players => "Players",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    Asc,
    Desc,
}

impl SortOrder {
    pub fn flip(self) -> Self {
        match self {
            SortOrder::Asc => SortOrder::Desc,
            SortOrder::Desc => SortOrder::Asc,
        }
    }

    pub fn arrow(self) -> &'static str {
        match self {
            SortOrder::Asc => "↑",
            SortOrder::Desc => "↓",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TeamSortKey {
    Name,
    Position,
    Played,
    Win,
    Draw,
    Loss,
    GoalsScored,
    GoalsAgainst,
    CleanSheets,
    Form,
}

impl TeamSortKey {
    pub const ALL: [TeamSortKey; 10] = [
        TeamSortKey::Name,
        TeamSortKey::Position,
        TeamSortKey::Played,
        TeamSortKey::Win,
        TeamSortKey::Draw,
        TeamSortKey::Loss,
        TeamSortKey::GoalsScored,
        TeamSortKey::GoalsAgainst,
        TeamSortKey::CleanSheets,
        TeamSortKey::Form,
    ];

    pub fn label(self) -> &'static str {
        match self {
            TeamSortKey::Name => "Team",
            TeamSortKey::Position => "Pos",
            TeamSortKey::Played => "P",
            TeamSortKey::Win => "W",
            TeamSortKey::Draw => "D",
            TeamSortKey::Loss => "L",
            TeamSortKey::GoalsScored => "GF",
            TeamSortKey::GoalsAgainst => "GA",
            TeamSortKey::CleanSheets => "CS",
            TeamSortKey::Form => "Form",
        }
    }

    fn numeric(self, team: &TeamRecord) -> Option<u32> {
        match self {
            TeamSortKey::Position => Some(team.position),
            TeamSortKey::Played => Some(team.played),
            TeamSortKey::Win => Some(team.win),
            TeamSortKey::Draw => Some(team.draw),
            TeamSortKey::Loss => Some(team.loss),
            TeamSortKey::GoalsScored => Some(team.goals_scored),
            TeamSortKey::GoalsAgainst => Some(team.goals_against),
            TeamSortKey::CleanSheets => Some(team.clean_sheets),
            TeamSortKey::Name | TeamSortKey::Form => None,
        }
    }

    fn text(self, team: &TeamRecord) -> &str {
        match self {
            TeamSortKey::Name => &team.name,
            TeamSortKey::Form => team.form.as_deref().unwrap_or(""),
            _ => "",
        }
    }

    /// Ascending comparison: numeric columns by value, text columns lexically.
    pub fn compare(self, a: &TeamRecord, b: &TeamRecord) -> Ordering {
        match (self.numeric(a), self.numeric(b)) {
            (Some(x), Some(y)) => x.cmp(&y),
            _ => self.text(a).cmp(self.text(b)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayerSortKey {
    TotalPoints,
    PointsPerGame,
    Form,
    SelectedBy,
}

impl PlayerSortKey {
    pub fn next(self) -> Self {
        match self {
            PlayerSortKey::TotalPoints => PlayerSortKey::PointsPerGame,
            PlayerSortKey::PointsPerGame => PlayerSortKey::Form,
            PlayerSortKey::Form => PlayerSortKey::SelectedBy,
            PlayerSortKey::SelectedBy => PlayerSortKey::TotalPoints,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            PlayerSortKey::TotalPoints => "Total Points",
            PlayerSortKey::PointsPerGame => "Points per Game",
            PlayerSortKey::Form => "Form",
            PlayerSortKey::SelectedBy => "Selected By %",
        }
    }

    pub fn value(self, player: &PlayerRecord) -> f64 {
        match self {
            PlayerSortKey::TotalPoints => player.total_points,
            PlayerSortKey::PointsPerGame => player.points_per_game,
            PlayerSortKey::Form => player.form,
            PlayerSortKey::SelectedBy => player.selected_by_percent,
        }
    }
}

pub fn position_filter_label(filter: Option<Position>) -> &'static str {
    filter.map(Position::code).unwrap_or("All")
}

fn next_position_filter(filter: Option<Position>) -> Option<Position> {
    match filter {
        None => Some(Position::Goalkeeper),
        Some(Position::Goalkeeper) => Some(Position::Defender),
        Some(Position::Defender) => Some(Position::Midfielder),
        Some(Position::Midfielder) => Some(Position::Forward),
        Some(Position::Forward) => None,
    }
}

#[derive(Debug, Clone)]
pub struct AppState {
    pub view: View,
    pub selected: usize,
    pub fixtures: Vec<FixtureRecord>,
    pub fixtures_loading: bool,
    pub fixtures_error: Option<String>,
    pub fixtures_updated_at: Option<DateTime<Utc>>,
    pub roster: Roster,
    pub roster_loading: bool,
    pub roster_error: Option<String>,
    pub roster_updated_at: Option<DateTime<Utc>>,
    pub team_sort: TeamSortKey,
    pub team_order: SortOrder,
    pub player_sort: PlayerSortKey,
    pub position_filter: Option<Position>,
    pub logs: VecDeque<String>,
    pub help_overlay: bool,
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}

impl AppState {
    pub fn new() -> Self {
        Self {
            view: View::Fixtures,
            selected: 0,
            fixtures: Vec::new(),
            fixtures_loading: false,
            fixtures_error: None,
            fixtures_updated_at: None,
            roster: Roster::default(),
            roster_loading: false,
            roster_error: None,
            roster_updated_at: None,
            team_sort: TeamSortKey::Position,
            team_order: SortOrder::Asc,
            player_sort: PlayerSortKey::TotalPoints,
            position_filter: None,
            logs: VecDeque::with_capacity(MAX_LOGS),
            help_overlay: false,
        }
    }

    pub fn set_view(&mut self, view: View) {
        if self.view != view {
            self.view = view;
            self.selected = 0;
        }
    }

    pub fn cycle_view(&mut self) {
        self.set_view(self.view.next());
    }

    /// Same column again flips the order; a new column starts ascending.
    pub fn sort_teams_by(&mut self, key: TeamSortKey) {
        if self.team_sort == key {
            self.team_order = self.team_order.flip();
        } else {
            self.team_sort = key;
            self.team_order = SortOrder::Asc;
        }
    }

    pub fn sorted_teams(&self) -> Vec<&TeamRecord> {
        let mut teams: Vec<&TeamRecord> = self.roster.teams.iter().collect();
        let key = self.team_sort;
        match self.team_order {
            SortOrder::Asc => teams.sort_by(|a, b| key.compare(a, b)),
            SortOrder::Desc => teams.sort_by(|a, b| key.compare(b, a)),
        }
        teams
    }

    pub fn cycle_player_sort(&mut self) {
        self.player_sort = self.player_sort.next();
        self.selected = 0;
    }

    pub fn cycle_position_filter(&mut self) {
        self.position_filter = next_position_filter(self.position_filter);
        self.selected = 0;
    }

    /// Top rows after the position filter, highest value first.
    pub fn visible_players(&self) -> Vec<&PlayerRecord> {
        let key = self.player_sort;
        let mut players: Vec<&PlayerRecord> = self
            .roster
            .players
            .iter()
            .filter(|p| self.position_filter.is_none_or(|pos| p.position == pos))
            .collect();
        players.sort_by(|a, b| key.value(b).total_cmp(&key.value(a)));
        players.truncate(PLAYER_TABLE_ROWS);
        players
    }

    fn row_count(&self) -> usize {
        match self.view {
            View::Fixtures => self.fixtures.len(),
            View::Teams => self.roster.teams.len(),
            View::Players => self.visible_players().len(),
        }
    }

    pub fn select_next(&mut self) {
        let total = self.row_count();
        if total == 0 {
            self.selected = 0;
            return;
        }
        self.selected = (self.selected + 1) % total;
    }

    pub fn select_prev(&mut self) {
        let total = self.row_count();
        if total == 0 {
            self.selected = 0;
            return;
        }
        if self.selected == 0 {
            self.selected = total - 1;
        } else {
            self.selected -= 1;
        }
    }

    pub fn clamp_selection(&mut self) {
        let total = self.row_count();
        if total == 0 {
            self.selected = 0;
        } else if self.selected >= total {
            self.selected = total - 1;
        }
    }

    pub fn selected_team(&self) -> Option<&TeamRecord> {
        if self.view != View::Teams {
            return None;
        }
        self.sorted_teams().get(self.selected).copied()
    }

    pub fn push_log(&mut self, msg: impl Into<String>) {
        self.logs.push_back(msg.into());
        while self.logs.len() > MAX_LOGS {
            self.logs.pop_front();
        }
    }

    pub fn begin_fetch(&mut self, cmd: &ProviderCommand) {
        match cmd {
            ProviderCommand::FetchRoster => self.roster_loading = true,
            ProviderCommand::FetchFixtures => self.fixtures_loading = true,
        }
    }
}

#[derive(Debug, Clone)]
pub enum Delta {
    SetRoster {
        roster: Roster,
        fetched_at: DateTime<Utc>,
    },
    RosterFailed(String),
    SetFixtures {
        batch: FixtureBatch,
        fetched_at: DateTime<Utc>,
    },
    FixturesFailed(String),
    Log(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderCommand {
    FetchRoster,
    FetchFixtures,
}

/// A failed fetch keeps the last good data on screen next to the error.
pub fn apply_delta(state: &mut AppState, delta: Delta) {
    match delta {
        Delta::SetRoster { roster, fetched_at } => {
            state.push_log(format!(
                "[INFO] Roster: {} players, {} teams",
                roster.players.len(),
                roster.teams.len()
            ));
            state.roster = roster;
            state.roster_loading = false;
            state.roster_error = None;
            state.roster_updated_at = Some(fetched_at);
            state.clamp_selection();
        }
        Delta::RosterFailed(err) => {
            state.push_log(format!("[WARN] Roster fetch failed: {err}"));
            state.roster_loading = false;
            state.roster_error = Some(err);
        }
        Delta::SetFixtures { batch, fetched_at } => {
            for warning in &batch.warnings {
                state.push_log(format!("[WARN] {warning}"));
            }
            state.push_log(format!("[INFO] Fixtures: {}", batch.fixtures.len()));
            state.fixtures = batch.fixtures;
            state.fixtures_loading = false;
            state.fixtures_error = None;
            state.fixtures_updated_at = Some(fetched_at);
            state.clamp_selection();
        }
        Delta::FixturesFailed(err) => {
            state.push_log(format!("[WARN] Fixtures fetch failed: {err}"));
            state.fixtures_loading = false;
            state.fixtures_error = Some(err);
        }
        Delta::Log(msg) => state.push_log(msg),
    }
}
