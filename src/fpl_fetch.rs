use crate::config::DashboardConfig;
use crate::error::{PipelineError, PipelineResult};
use crate::http_client::{client_for, read_success_body};

/// Raw `bootstrap-static` body.
pub fn fetch_bootstrap(cfg: &DashboardConfig) -> PipelineResult<String> {
    let client = client_for(cfg.http_timeout_secs)?;
    log::info!("fetching bootstrap from {}", cfg.bootstrap_url);
    let resp = client
        .get(&cfg.bootstrap_url)
        .send()
        .map_err(|err| PipelineError::UpstreamUnavailable(format!("bootstrap request: {err}")))?;
    let body = read_success_body(resp, "bootstrap")?;
    log::debug!("bootstrap body: {} bytes", body.len());
    Ok(body)
}
