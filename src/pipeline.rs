use serde::Serialize;

use crate::config::DashboardConfig;
use crate::crest::CrestTable;
use crate::error::{ErrorEnvelope, PipelineResult};
use crate::fixtures::{FixtureBatch, FixtureOptions, FixtureRecord, normalize_odds_json};
use crate::fpl_fetch::fetch_bootstrap;
use crate::match_feed::{MatchFeed, build_match_feed};
use crate::odds_fetch::fetch_odds;
use crate::roster::{GameweekRecord, PlayerRecord, Roster, TeamRecord, normalize_bootstrap_json};

pub const ROSTER_PIPELINE: &str = "data";
pub const FIXTURES_PIPELINE: &str = "odds";
pub const MATCH_FEED_PIPELINE: &str = "stats";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RosterEnvelope {
    pub success: bool,
    pub players: Vec<PlayerRecord>,
    pub teams: Vec<TeamRecord>,
    pub gameweeks: Vec<GameweekRecord>,
}

impl From<Roster> for RosterEnvelope {
    fn from(roster: Roster) -> Self {
        Self {
            success: true,
            players: roster.players,
            teams: roster.teams,
            gameweeks: roster.gameweeks,
        }
    }
}

/// Either the pipeline's success body or the failure envelope.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Envelope<T> {
    Ok(T),
    Err(ErrorEnvelope),
}

/// HTTP-style status plus the body that would be served with it.
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineResponse<T> {
    pub status: u16,
    pub body: Envelope<T>,
}

impl<T> PipelineResponse<T> {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

impl<T: Serialize> PipelineResponse<T> {
    pub fn to_json_pretty(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(&self.body)
    }
}

/// Pipeline boundary: every error becomes a failure envelope with its status.
pub fn respond<T>(pipeline: &str, result: PipelineResult<T>) -> PipelineResponse<T> {
    match result {
        Ok(body) => PipelineResponse {
            status: 200,
            body: Envelope::Ok(body),
        },
        Err(err) => {
            log::error!("{pipeline} pipeline failed: {err}");
            PipelineResponse {
                status: err.status_code(),
                body: Envelope::Err(ErrorEnvelope::from_error(pipeline, &err)),
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Runners: fetch then normalize
// ---------------------------------------------------------------------------

pub fn run_roster(cfg: &DashboardConfig) -> PipelineResult<Roster> {
    let body = fetch_bootstrap(cfg)?;
    let roster = normalize_bootstrap_json(&body)?;
    log::info!(
        "roster ready: {} players, {} teams",
        roster.players.len(),
        roster.teams.len()
    );
    Ok(roster)
}

pub fn run_fixtures(cfg: &DashboardConfig, crests: &CrestTable) -> PipelineResult<FixtureBatch> {
    let odds = fetch_odds(cfg)?;
    let batch = normalize_odds_json(&odds.body, crests, &FixtureOptions::from_config(cfg))?;
    log::info!("fixtures ready: {}", batch.fixtures.len());
    Ok(batch)
}

pub fn run_match_feed(cfg: &DashboardConfig) -> PipelineResult<MatchFeed> {
    let odds = fetch_odds(cfg)?;
    let feed = build_match_feed(&odds.body, odds.quota, cfg.match_feed_bookmakers)?;
    log::info!("match feed ready: {} matches", feed.data.len());
    Ok(feed)
}

pub fn roster_response(cfg: &DashboardConfig) -> PipelineResponse<RosterEnvelope> {
    respond(ROSTER_PIPELINE, run_roster(cfg).map(RosterEnvelope::from))
}

/// Fixtures succeed with a bare list. Crest warnings were already emitted
/// through `log::warn!` during normalization and are dropped from the body.
pub fn fixtures_response(
    cfg: &DashboardConfig,
    crests: &CrestTable,
) -> PipelineResponse<Vec<FixtureRecord>> {
    respond(
        FIXTURES_PIPELINE,
        run_fixtures(cfg, crests).map(|batch| batch.fixtures),
    )
}

pub fn match_feed_response(cfg: &DashboardConfig) -> PipelineResponse<MatchFeed> {
    respond(MATCH_FEED_PIPELINE, run_match_feed(cfg))
}

/// Which pipeline a caller asked for by name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineKind {
    Roster,
    Fixtures,
    MatchFeed,
}

impl PipelineKind {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "roster" | "data" => Some(PipelineKind::Roster),
            "fixtures" | "odds" => Some(PipelineKind::Fixtures),
            "matches" | "stats" => Some(PipelineKind::MatchFeed),
            _ => None,
        }
    }
}
