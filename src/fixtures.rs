use chrono::{DateTime, FixedOffset, NaiveDateTime, Offset, TimeZone, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::config::DashboardConfig;
use crate::crest::CrestTable;
use crate::error::{PipelineError, PipelineResult};

pub const FIXTURE_STATUS: &str = "Not Started";
pub const H2H_MARKET: &str = "h2h";

// ---------------------------------------------------------------------------
// Upstream odds schema (The Odds API v4 `/odds`)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawOddsEvent {
    #[serde(default)]
    pub id: Option<String>,
    pub home_team: String,
    pub away_team: String,
    pub commence_time: String,
    #[serde(default)]
    pub completed: Option<bool>,
    #[serde(default)]
    pub scores: Option<Value>,
    #[serde(default)]
    pub bookmakers: Option<Vec<RawBookmaker>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawBookmaker {
    #[serde(default)]
    pub key: String,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub last_update: Option<String>,
    #[serde(default)]
    pub markets: Option<Vec<RawMarket>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawMarket {
    #[serde(default)]
    pub key: String,
    #[serde(default)]
    pub last_update: Option<String>,
    #[serde(default)]
    pub outcomes: Option<Vec<RawOutcome>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawOutcome {
    #[serde(default)]
    pub name: String,
    /// Missing, null or non-numeric prices read as `None`.
    #[serde(default, deserialize_with = "lenient_price")]
    pub price: Option<f64>,
}

fn lenient_price<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.as_ref().and_then(Value::as_f64))
}

// ---------------------------------------------------------------------------
// Normalized fixtures
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FixtureRecord {
    pub home_team: String,
    pub away_team: String,
    /// Display only. Ordering always goes through `raw_date`.
    pub match_date: String,
    pub raw_date: String,
    pub status: String,
    pub competition: String,
    pub matchday: Option<u32>,
    pub home_crest: Option<String>,
    pub away_crest: Option<String>,
    pub venue: Option<String>,
    pub home_odds: Option<f64>,
    pub draw_odds: Option<f64>,
    pub away_odds: Option<f64>,
    pub bookmaker: Option<String>,
}

impl FixtureRecord {
    pub fn kickoff(&self) -> Option<DateTime<Utc>> {
        parse_kickoff(&self.raw_date)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct HeadToHeadOdds {
    pub home: Option<f64>,
    pub draw: Option<f64>,
    pub away: Option<f64>,
}

#[derive(Debug, Clone)]
pub struct FixtureOptions {
    pub limit: usize,
    pub competition: String,
    pub display_offset: FixedOffset,
}

impl Default for FixtureOptions {
    fn default() -> Self {
        Self {
            limit: 10,
            competition: "Premier League".to_string(),
            display_offset: Utc.fix(),
        }
    }
}

impl FixtureOptions {
    pub fn from_config(cfg: &DashboardConfig) -> Self {
        Self {
            limit: cfg.fixture_limit,
            competition: cfg.competition_label.clone(),
            display_offset: cfg.display_offset,
        }
    }
}

/// Fixtures plus non-fatal diagnostics (unknown crests).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FixtureBatch {
    pub fixtures: Vec<FixtureRecord>,
    pub warnings: Vec<String>,
}

/// `Ok(None)` when the body is valid JSON but not a list.
pub fn parse_odds_events(raw: &str) -> PipelineResult<Option<Vec<RawOddsEvent>>> {
    let value: Value =
        serde_json::from_str(raw.trim()).map_err(|err| PipelineError::malformed("odds", err))?;
    if !value.is_array() {
        return Ok(None);
    }
    serde_json::from_value(value)
        .map(Some)
        .map_err(|err| PipelineError::malformed("odds event", err))
}

pub fn normalize_odds_json(
    raw: &str,
    crests: &CrestTable,
    opts: &FixtureOptions,
) -> PipelineResult<FixtureBatch> {
    match parse_odds_events(raw)? {
        Some(events) => normalize_fixtures(events, crests, opts),
        None => {
            log::warn!("odds response is not a list; treating as no fixtures");
            Ok(FixtureBatch::default())
        }
    }
}

/// Next `opts.limit` fixtures by kickoff, each priced from its first bookmaker.
pub fn normalize_fixtures(
    events: Vec<RawOddsEvent>,
    crests: &CrestTable,
    opts: &FixtureOptions,
) -> PipelineResult<FixtureBatch> {
    if events.is_empty() {
        log::info!("no fixtures in odds response");
        return Ok(FixtureBatch::default());
    }

    let mut timed = Vec::with_capacity(events.len());
    for event in events {
        let kickoff = parse_kickoff(&event.commence_time).ok_or_else(|| {
            PipelineError::MalformedPayload(format!(
                "unparseable commence_time {:?} for {} vs {}",
                event.commence_time, event.home_team, event.away_team
            ))
        })?;
        timed.push((kickoff, event));
    }
    timed.sort_by_key(|(kickoff, _)| *kickoff);
    timed.truncate(opts.limit);

    let mut warnings = Vec::new();
    let mut fixtures: Vec<FixtureRecord> = timed
        .into_iter()
        .map(|(kickoff, event)| {
            let bookmaker = event.bookmakers.as_deref().and_then(|b| b.first());
            let odds = extract_h2h_odds(bookmaker, &event.home_team, &event.away_team);
            let home_crest = resolve_crest(crests, &event.home_team, &mut warnings);
            let away_crest = resolve_crest(crests, &event.away_team, &mut warnings);

            FixtureRecord {
                match_date: format_match_date(kickoff, opts.display_offset),
                raw_date: event.commence_time,
                status: FIXTURE_STATUS.to_string(),
                competition: opts.competition.clone(),
                matchday: None,
                home_crest,
                away_crest,
                venue: None,
                home_odds: odds.home,
                draw_odds: odds.draw,
                away_odds: odds.away,
                bookmaker: bookmaker.and_then(|b| b.title.clone()),
                home_team: event.home_team,
                away_team: event.away_team,
            }
        })
        .collect();

    fixtures.sort_by_key(FixtureRecord::kickoff);
    Ok(FixtureBatch { fixtures, warnings })
}

/// Outcomes are matched by team name; anything else is the draw.
pub fn extract_h2h_odds(
    bookmaker: Option<&RawBookmaker>,
    home_team: &str,
    away_team: &str,
) -> HeadToHeadOdds {
    let mut odds = HeadToHeadOdds::default();
    let Some(market) = bookmaker
        .and_then(|b| b.markets.as_deref())
        .and_then(|markets| markets.iter().find(|m| m.key == H2H_MARKET))
    else {
        return odds;
    };

    for outcome in market.outcomes.as_deref().unwrap_or_default() {
        if outcome.name == home_team {
            odds.home = outcome.price;
        } else if outcome.name == away_team {
            odds.away = outcome.price;
        } else {
            odds.draw = outcome.price;
        }
    }
    odds
}

fn resolve_crest(crests: &CrestTable, team: &str, warnings: &mut Vec<String>) -> Option<String> {
    let url = crests.crest_url(team);
    if url.is_none() {
        let msg = format!("No crest id found for: {team}");
        log::warn!("{msg}");
        if !warnings.contains(&msg) {
            warnings.push(msg);
        }
    }
    url
}

/// e.g. `Sat 19 Oct, 12:30 UTC` or `Sat 19 Oct, 13:30 UTC+01:00`.
pub fn format_match_date(kickoff: DateTime<Utc>, offset: FixedOffset) -> String {
    let local = kickoff.with_timezone(&offset);
    let zone = if offset.local_minus_utc() == 0 {
        "UTC".to_string()
    } else {
        format!("UTC{offset}")
    };
    format!("{} {zone}", local.format("%a %-d %b, %H:%M"))
}

pub fn parse_kickoff(raw: &str) -> Option<DateTime<Utc>> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(trimmed) {
        return Some(dt.with_timezone(&Utc));
    }
    for fmt in ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%dT%H:%M", "%Y-%m-%d %H:%M:%S"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(trimmed, fmt) {
            return Some(Utc.from_utc_datetime(&naive));
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use chrono::{FixedOffset, TimeZone, Utc};

    use super::{format_match_date, parse_kickoff};

    #[test]
    fn kickoff_accepts_zulu_and_naive_forms() {
        let zulu = parse_kickoff("2024-10-19T11:30:00Z").expect("zulu");
        let naive = parse_kickoff("2024-10-19T11:30:00").expect("naive");
        assert_eq!(zulu, naive);
        assert!(parse_kickoff("").is_none());
        assert!(parse_kickoff("next saturday").is_none());
    }

    #[test]
    fn match_date_formats_in_utc() {
        let kickoff = Utc.with_ymd_and_hms(2024, 10, 19, 11, 30, 0).unwrap();
        let offset = FixedOffset::east_opt(0).unwrap();
        assert_eq!(format_match_date(kickoff, offset), "Sat 19 Oct, 11:30 UTC");
    }

    #[test]
    fn match_date_shifts_into_display_offset() {
        let kickoff = Utc.with_ymd_and_hms(2024, 10, 19, 23, 30, 0).unwrap();
        let offset = FixedOffset::east_opt(3600).unwrap();
        assert_eq!(
            format_match_date(kickoff, offset),
            "Sun 20 Oct, 00:30 UTC+01:00"
        );
    }
}
