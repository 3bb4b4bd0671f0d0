use reqwest::header::HeaderMap;
use serde::{Deserialize, Serialize};

use crate::config::DashboardConfig;
use crate::error::{PipelineError, PipelineResult};
use crate::http_client::{client_for, read_success_body};

pub const REMAINING_HEADER: &str = "x-requests-remaining";
pub const USED_HEADER: &str = "x-requests-used";

/// Request budget reported by the odds provider. Values are passed through as sent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiQuota {
    pub remaining: Option<String>,
    pub used: Option<String>,
}

impl ApiQuota {
    pub fn from_headers(headers: &HeaderMap) -> Self {
        let read = |name: &str| {
            headers
                .get(name)
                .and_then(|v| v.to_str().ok())
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };
        Self {
            remaining: read(REMAINING_HEADER),
            used: read(USED_HEADER),
        }
    }

    pub fn remaining_count(&self) -> Option<u64> {
        self.remaining.as_deref().and_then(|v| v.parse().ok())
    }
}

#[derive(Debug, Clone)]
pub struct OddsResponse {
    pub body: String,
    pub quota: ApiQuota,
}

pub fn odds_url(cfg: &DashboardConfig) -> String {
    format!("{}/sports/{}/odds", cfg.odds_api_base, cfg.odds_sport_key)
}

/// Upcoming events with h2h decimal prices. Fails with `ConfigMissing` before
/// any request when no key is configured.
pub fn fetch_odds(cfg: &DashboardConfig) -> PipelineResult<OddsResponse> {
    let Some(api_key) = cfg.odds_api_key.as_deref() else {
        return Err(PipelineError::ConfigMissing("ODDS_API_KEY"));
    };

    let client = client_for(cfg.http_timeout_secs)?;
    log::info!(
        "fetching odds for {} (regions={})",
        cfg.odds_sport_key,
        cfg.odds_regions
    );
    let resp = client
        .get(odds_url(cfg))
        .query(&[
            ("apiKey", api_key),
            ("regions", cfg.odds_regions.as_str()),
            ("markets", "h2h"),
            ("dateFormat", "iso"),
            ("oddsFormat", "decimal"),
        ])
        .send()
        .map_err(|err| PipelineError::UpstreamUnavailable(format!("odds request: {err}")))?;

    let quota = ApiQuota::from_headers(resp.headers());
    log_quota(&quota);
    let body = read_success_body(resp, "odds")?;
    Ok(OddsResponse { body, quota })
}

fn log_quota(quota: &ApiQuota) {
    let remaining = quota.remaining.as_deref().unwrap_or("?");
    let used = quota.used.as_deref().unwrap_or("?");
    match quota.remaining_count() {
        Some(0) => log::warn!("odds quota exhausted (used {used})"),
        Some(left) if left < 50 => log::warn!("odds quota low: {remaining} left, {used} used"),
        _ => log::info!("odds quota: {remaining} left, {used} used"),
    }
}
