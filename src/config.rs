use std::env;
use std::path::PathBuf;

use chrono::{FixedOffset, Local, Offset};

pub const DEFAULT_BOOTSTRAP_URL: &str = "https://fantasy.premierleague.com/api/bootstrap-static/";
pub const DEFAULT_ODDS_API_BASE: &str = "https://api.the-odds-api.com/v4";
pub const DEFAULT_CREST_URL_TEMPLATE: &str =
    "https://resources.premierleague.com/premierleague/badges/t{id}.svg";

const DEFAULT_FIXTURE_LIMIT: usize = 10;
const DEFAULT_MATCH_FEED_BOOKMAKERS: usize = 3;
const DEFAULT_TIMEOUT_SECS: u64 = 10;

#[derive(Debug, Clone)]
pub struct DashboardConfig {
    pub bootstrap_url: String,
    pub odds_api_base: String,
    pub odds_api_key: Option<String>,
    pub odds_sport_key: String,
    pub odds_regions: String,
    pub fixture_limit: usize,
    pub match_feed_bookmakers: usize,
    pub competition_label: String,
    pub crest_url_template: String,
    pub crest_table_path: Option<PathBuf>,
    pub display_offset: FixedOffset,
    pub http_timeout_secs: u64,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self::from_lookup(|_| None)
    }
}

impl DashboardConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the config from any key lookup; missing or invalid values fall back to defaults.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let fixture_limit = get("FIXTURE_LIMIT")
            .and_then(|v| v.parse::<usize>().ok())
            .unwrap_or(DEFAULT_FIXTURE_LIMIT)
            .clamp(1, 50);
        let match_feed_bookmakers = get("MATCH_FEED_BOOKMAKERS")
            .and_then(|v| v.parse::<usize>().ok())
            .unwrap_or(DEFAULT_MATCH_FEED_BOOKMAKERS)
            .clamp(1, 10);
        let http_timeout_secs = get("HTTP_TIMEOUT_SECS")
            .and_then(|v| v.parse::<u64>().ok())
            .unwrap_or(DEFAULT_TIMEOUT_SECS)
            .clamp(1, 120);
        let display_offset = get("DISPLAY_UTC_OFFSET_MIN")
            .and_then(|v| v.parse::<i32>().ok())
            .and_then(|min| FixedOffset::east_opt(min.clamp(-14 * 60, 14 * 60) * 60))
            .unwrap_or_else(|| Local::now().offset().fix());

        Self {
            bootstrap_url: get("FPL_BOOTSTRAP_URL")
                .unwrap_or_else(|| DEFAULT_BOOTSTRAP_URL.to_string()),
            odds_api_base: get("ODDS_API_BASE")
                .unwrap_or_else(|| DEFAULT_ODDS_API_BASE.to_string())
                .trim_end_matches('/')
                .to_string(),
            odds_api_key: get("ODDS_API_KEY"),
            odds_sport_key: get("ODDS_SPORT_KEY")
                .unwrap_or_else(|| "soccer_epl".to_string())
                .to_ascii_lowercase(),
            odds_regions: get("ODDS_REGIONS")
                .unwrap_or_else(|| "uk".to_string())
                .to_ascii_lowercase(),
            fixture_limit,
            match_feed_bookmakers,
            competition_label: get("COMPETITION_LABEL")
                .unwrap_or_else(|| "Premier League".to_string()),
            crest_url_template: get("CREST_URL_TEMPLATE")
                .filter(|t| t.contains("{id}"))
                .unwrap_or_else(|| DEFAULT_CREST_URL_TEMPLATE.to_string()),
            crest_table_path: get("CREST_TABLE_PATH").map(PathBuf::from),
            display_offset,
            http_timeout_secs,
        }
    }
}
