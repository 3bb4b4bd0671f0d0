use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{PipelineError, PipelineResult};
use crate::fixtures::{RawBookmaker, RawOddsEvent, parse_odds_events};
use crate::odds_fetch::ApiQuota;

/// Upcoming match as the provider sent it, trimmed to the first few bookmakers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchFeedRecord {
    pub id: Option<String>,
    pub home_team: String,
    pub away_team: String,
    pub commence_time: String,
    pub completed: bool,
    pub scores: Option<Value>,
    pub bookmakers: Vec<RawBookmaker>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchFeed {
    pub success: bool,
    pub data: Vec<MatchFeedRecord>,
    pub quota: ApiQuota,
}

pub fn to_feed_record(event: RawOddsEvent, max_bookmakers: usize) -> MatchFeedRecord {
    let mut bookmakers = event.bookmakers.unwrap_or_default();
    bookmakers.truncate(max_bookmakers);
    MatchFeedRecord {
        id: event.id,
        home_team: event.home_team,
        away_team: event.away_team,
        commence_time: event.commence_time,
        completed: event.completed.unwrap_or(false),
        scores: event.scores.filter(|s| !s.is_null()),
        bookmakers,
    }
}

/// Unlike the fixtures pipeline, a body that is not a list is an error here.
pub fn build_match_feed(
    raw: &str,
    quota: ApiQuota,
    max_bookmakers: usize,
) -> PipelineResult<MatchFeed> {
    let events = parse_odds_events(raw)?.ok_or_else(|| {
        PipelineError::MalformedPayload("odds response is not a list".to_string())
    })?;
    let data = events
        .into_iter()
        .map(|event| to_feed_record(event, max_bookmakers))
        .collect();
    Ok(MatchFeed {
        success: true,
        data,
        quota,
    })
}
