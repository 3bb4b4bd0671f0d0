use std::collections::HashMap;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::error::{PipelineError, PipelineResult};
use crate::standings::rank_teams;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Position {
    #[serde(rename = "GK")]
    Goalkeeper,
    #[serde(rename = "DEF")]
    Defender,
    #[serde(rename = "MID")]
    Midfielder,
    #[serde(rename = "FWD")]
    Forward,
}

impl Position {
    /// 1 -> GK, 2 -> DEF, 3 -> MID, anything else -> FWD.
    pub fn from_element_type(code: Option<i64>) -> Self {
        match code {
            Some(1) => Position::Goalkeeper,
            Some(2) => Position::Defender,
            Some(3) => Position::Midfielder,
            _ => Position::Forward,
        }
    }

    pub fn code(self) -> &'static str {
        match self {
            Position::Goalkeeper => "GK",
            Position::Defender => "DEF",
            Position::Midfielder => "MID",
            Position::Forward => "FWD",
        }
    }
}

// ---------------------------------------------------------------------------
// Upstream bootstrap schema
// ---------------------------------------------------------------------------

/// `bootstrap-static` payload. All three lists are required.
#[derive(Debug, Clone, Deserialize)]
pub struct RawBootstrap {
    pub elements: Vec<RawPlayer>,
    pub teams: Vec<RawTeam>,
    pub events: Vec<RawGameweek>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawPlayer {
    pub id: u32,
    #[serde(default, deserialize_with = "lenient_string")]
    pub web_name: String,
    #[serde(default)]
    pub team: Option<u32>,
    #[serde(default, deserialize_with = "lenient_opt_i64")]
    pub element_type: Option<i64>,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub total_points: f64,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub points_per_game: f64,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub form: f64,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub selected_by_percent: f64,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub now_cost: f64,
    #[serde(default, deserialize_with = "lenient_u32")]
    pub goals_scored: u32,
    #[serde(default, deserialize_with = "lenient_u32")]
    pub assists: u32,
    #[serde(default, deserialize_with = "lenient_u32")]
    pub clean_sheets: u32,
    #[serde(default, deserialize_with = "lenient_string")]
    pub status: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub news: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawTeam {
    pub id: u32,
    pub name: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub short_name: String,
    #[serde(default, alias = "played_games", deserialize_with = "lenient_u32")]
    pub played: u32,
    #[serde(default, deserialize_with = "lenient_u32")]
    pub win: u32,
    #[serde(default, deserialize_with = "lenient_u32")]
    pub draw: u32,
    #[serde(default, deserialize_with = "lenient_u32")]
    pub loss: u32,
    #[serde(default, deserialize_with = "lenient_u32")]
    pub points: u32,
    /// Team-level aggregate; when absent goals are summed from the roster.
    #[serde(default, deserialize_with = "lenient_opt_u32")]
    pub goals_for: Option<u32>,
    #[serde(default, deserialize_with = "lenient_u32")]
    pub goals_against: u32,
    #[serde(default, deserialize_with = "lenient_u32")]
    pub strength: u32,
    #[serde(default, deserialize_with = "lenient_u32")]
    pub strength_overall_home: u32,
    #[serde(default, deserialize_with = "lenient_u32")]
    pub strength_overall_away: u32,
    #[serde(default, deserialize_with = "lenient_u32")]
    pub strength_attack_home: u32,
    #[serde(default, deserialize_with = "lenient_u32")]
    pub strength_attack_away: u32,
    #[serde(default, deserialize_with = "lenient_u32")]
    pub strength_defence_home: u32,
    #[serde(default, deserialize_with = "lenient_u32")]
    pub strength_defence_away: u32,
    #[serde(default, deserialize_with = "lenient_opt_string")]
    pub form: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawGameweek {
    pub id: u32,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub deadline_time: Option<String>,
    #[serde(default)]
    pub is_current: bool,
    #[serde(default)]
    pub is_next: bool,
    #[serde(default)]
    pub is_previous: bool,
    #[serde(default)]
    pub average_entry_score: Option<i64>,
    #[serde(default)]
    pub highest_score: Option<i64>,
    #[serde(default)]
    pub most_selected: Option<u32>,
    #[serde(default)]
    pub most_transferred_in: Option<u32>,
}

// ---------------------------------------------------------------------------
// Normalized records
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerRecord {
    pub id: u32,
    pub name: String,
    pub team: Option<String>,
    pub position: Position,
    pub total_points: f64,
    pub points_per_game: f64,
    pub form: f64,
    pub selected_by_percent: f64,
    pub now_cost: f64,
    pub goals_scored: u32,
    pub assists: u32,
    pub clean_sheets: u32,
    pub status: String,
    pub news: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeamRecord {
    pub id: u32,
    pub name: String,
    pub short_name: String,
    pub position: u32,
    pub played: u32,
    pub win: u32,
    pub draw: u32,
    pub loss: u32,
    pub points: u32,
    pub goals_scored: u32,
    pub goals_against: u32,
    pub clean_sheets: u32,
    pub assists: u32,
    pub strength: u32,
    pub strength_overall_home: u32,
    pub strength_overall_away: u32,
    pub strength_attack_home: u32,
    pub strength_attack_away: u32,
    pub strength_defence_home: u32,
    pub strength_defence_away: u32,
    pub form: Option<String>,
}

impl TeamRecord {
    pub fn goal_difference(&self) -> i64 {
        i64::from(self.goals_scored) - i64::from(self.goals_against)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameweekRecord {
    pub id: u32,
    pub name: String,
    pub deadline_time: Option<String>,
    pub is_current: bool,
    pub is_next: bool,
    pub is_previous: bool,
    pub average_entry_score: Option<i64>,
    pub highest_score: Option<i64>,
    pub most_selected: Option<u32>,
    pub most_transferred_in: Option<u32>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Roster {
    pub players: Vec<PlayerRecord>,
    pub teams: Vec<TeamRecord>,
    pub gameweeks: Vec<GameweekRecord>,
}

impl Roster {
    pub fn current_gameweek(&self) -> Option<&GameweekRecord> {
        self.gameweeks.iter().find(|gw| gw.is_current)
    }
}

pub fn parse_bootstrap_json(raw: &str) -> PipelineResult<RawBootstrap> {
    serde_json::from_str(raw.trim()).map_err(|err| PipelineError::malformed("bootstrap", err))
}

/// Parse and normalize in one step; any shape error discards the whole batch.
pub fn normalize_bootstrap_json(raw: &str) -> PipelineResult<Roster> {
    let bootstrap = parse_bootstrap_json(raw)?;
    let roster = normalize_bootstrap(&bootstrap);
    log::debug!(
        "normalized bootstrap: {} players, {} teams, {} gameweeks",
        roster.players.len(),
        roster.teams.len(),
        roster.gameweeks.len()
    );
    Ok(roster)
}

pub fn normalize_bootstrap(bootstrap: &RawBootstrap) -> Roster {
    let players = bootstrap
        .elements
        .iter()
        .map(|p| normalize_player(p, &bootstrap.teams))
        .collect();

    let totals = aggregate_team_totals(&bootstrap.elements);
    let teams = bootstrap
        .teams
        .iter()
        .map(|t| normalize_team(t, totals.get(&t.id)))
        .collect();

    Roster {
        players,
        teams: rank_teams(teams),
        gameweeks: bootstrap.events.iter().map(normalize_gameweek).collect(),
    }
}

fn normalize_player(raw: &RawPlayer, teams: &[RawTeam]) -> PlayerRecord {
    let team = raw
        .team
        .and_then(|id| teams.iter().find(|t| t.id == id))
        .map(|t| t.name.clone());

    PlayerRecord {
        id: raw.id,
        name: raw.web_name.clone(),
        team,
        position: Position::from_element_type(raw.element_type),
        total_points: raw.total_points,
        points_per_game: raw.points_per_game,
        form: raw.form,
        selected_by_percent: raw.selected_by_percent,
        now_cost: raw.now_cost / 10.0,
        goals_scored: raw.goals_scored,
        assists: raw.assists,
        clean_sheets: raw.clean_sheets,
        status: raw.status.clone(),
        news: raw.news.clone(),
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
struct TeamTotals {
    goals: u32,
    assists: u32,
    /// Best clean-sheet count among goalkeepers and defenders.
    clean_sheets: u32,
}

fn aggregate_team_totals(players: &[RawPlayer]) -> HashMap<u32, TeamTotals> {
    let mut out: HashMap<u32, TeamTotals> = HashMap::new();
    for player in players {
        let Some(team_id) = player.team else {
            continue;
        };
        let totals = out.entry(team_id).or_default();
        totals.goals = totals.goals.saturating_add(player.goals_scored);
        totals.assists = totals.assists.saturating_add(player.assists);
        if matches!(
            Position::from_element_type(player.element_type),
            Position::Goalkeeper | Position::Defender
        ) {
            totals.clean_sheets = totals.clean_sheets.max(player.clean_sheets);
        }
    }
    out
}

fn normalize_team(raw: &RawTeam, totals: Option<&TeamTotals>) -> TeamRecord {
    let totals = totals.copied().unwrap_or_default();
    TeamRecord {
        id: raw.id,
        name: raw.name.clone(),
        short_name: raw.short_name.clone(),
        position: 0,
        played: raw.played,
        win: raw.win,
        draw: raw.draw,
        loss: raw.loss,
        points: raw.points,
        goals_scored: raw.goals_for.unwrap_or(totals.goals),
        goals_against: raw.goals_against,
        clean_sheets: totals.clean_sheets,
        assists: totals.assists,
        strength: raw.strength,
        strength_overall_home: raw.strength_overall_home,
        strength_overall_away: raw.strength_overall_away,
        strength_attack_home: raw.strength_attack_home,
        strength_attack_away: raw.strength_attack_away,
        strength_defence_home: raw.strength_defence_home,
        strength_defence_away: raw.strength_defence_away,
        form: raw.form.clone(),
    }
}

fn normalize_gameweek(raw: &RawGameweek) -> GameweekRecord {
    GameweekRecord {
        id: raw.id,
        name: raw.name.clone(),
        deadline_time: raw.deadline_time.clone(),
        is_current: raw.is_current,
        is_next: raw.is_next,
        is_previous: raw.is_previous,
        average_entry_score: raw.average_entry_score,
        highest_score: raw.highest_score,
        most_selected: raw.most_selected,
        most_transferred_in: raw.most_transferred_in,
    }
}

// ---------------------------------------------------------------------------
// Field readers: FPL mixes numbers, numeric strings and nulls.
// ---------------------------------------------------------------------------

fn value_as_f64(value: &Value) -> Option<f64> {
    let parsed = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    parsed.filter(|v| v.is_finite())
}

fn value_as_u32(value: &Value) -> Option<u32> {
    match value {
        Value::Number(n) => n.as_u64().and_then(|v| u32::try_from(v).ok()),
        Value::String(s) => s.trim().parse::<u32>().ok(),
        _ => None,
    }
}

fn value_as_i64(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.trim().parse::<i64>().ok(),
        _ => None,
    }
}

/// Strings pass through, numbers are rendered, anything else is `None`.
fn value_as_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn lenient_f64<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.as_ref().and_then(value_as_f64).unwrap_or(0.0))
}

fn lenient_u32<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.as_ref().and_then(value_as_u32).unwrap_or(0))
}

fn lenient_opt_u32<'de, D>(deserializer: D) -> Result<Option<u32>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.as_ref().and_then(value_as_u32))
}

fn lenient_opt_i64<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.as_ref().and_then(value_as_i64))
}

fn lenient_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.as_ref().and_then(value_as_string).unwrap_or_default())
}

fn lenient_opt_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.as_ref().and_then(value_as_string))
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::{Position, value_as_f64, value_as_string, value_as_u32};

    #[test]
    fn element_type_maps_to_position() {
        assert_eq!(Position::from_element_type(Some(1)), Position::Goalkeeper);
        assert_eq!(Position::from_element_type(Some(2)), Position::Defender);
        assert_eq!(Position::from_element_type(Some(3)), Position::Midfielder);
        assert_eq!(Position::from_element_type(Some(4)), Position::Forward);
        assert_eq!(Position::from_element_type(Some(9)), Position::Forward);
        assert_eq!(Position::from_element_type(Some(-1)), Position::Forward);
        assert_eq!(Position::from_element_type(Some(300)), Position::Forward);
        assert_eq!(Position::from_element_type(None), Position::Forward);
    }

    #[test]
    fn numeric_strings_are_read_as_numbers() {
        assert_eq!(value_as_f64(&json!("5.2")), Some(5.2));
        assert_eq!(value_as_f64(&json!(3)), Some(3.0));
        assert_eq!(value_as_f64(&json!("n/a")), None);
        assert_eq!(value_as_u32(&json!("7")), Some(7));
        assert_eq!(value_as_u32(&json!(-1)), None);
    }

    #[test]
    fn numbers_are_rendered_as_text() {
        assert_eq!(value_as_string(&json!(0.0)).as_deref(), Some("0.0"));
        assert_eq!(value_as_string(&json!("WWLDW")).as_deref(), Some("WWLDW"));
        assert_eq!(value_as_string(&json!(null)), None);
    }

    #[test]
    fn position_serializes_as_short_code() {
        let raw = serde_json::to_string(&Position::Defender).unwrap();
        assert_eq!(raw, "\"DEF\"");
    }
}
