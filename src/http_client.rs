use std::time::Duration;

use anyhow::{Context, Result};
use once_cell::sync::OnceCell;
use reqwest::blocking::{Client, Response};

use crate::error::{PipelineError, PipelineResult};

pub const USER_AGENT: &str = concat!("pl-dashboard/", env!("CARGO_PKG_VERSION"));

const SNIPPET_CHARS: usize = 220;

static CLIENT: OnceCell<Client> = OnceCell::new();

/// Shared blocking client. Built on first use; later timeouts are ignored.
pub fn http_client(timeout_secs: u64) -> Result<&'static Client> {
    CLIENT.get_or_try_init(|| {
        Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .user_agent(USER_AGENT)
            .build()
            .context("failed to build http client")
    })
}

pub fn client_for(timeout_secs: u64) -> PipelineResult<&'static Client> {
    http_client(timeout_secs).map_err(|err| PipelineError::UpstreamUnavailable(format!("{err:#}")))
}

/// Reads the body, turning transport errors and non-2xx answers into
/// `UpstreamUnavailable`.
pub fn read_success_body(resp: Response, what: &str) -> PipelineResult<String> {
    let status = resp.status();
    let body = resp
        .text()
        .map_err(|err| PipelineError::UpstreamUnavailable(format!("{what} body: {err}")))?;
    if !status.is_success() {
        return Err(PipelineError::UpstreamUnavailable(format!(
            "{what} http {status}: {}",
            body_snippet(&body)
        )));
    }
    Ok(body)
}

pub fn body_snippet(body: &str) -> String {
    body.trim()
        .replace(['\n', '\r'], " ")
        .chars()
        .take(SNIPPET_CHARS)
        .collect()
}
