use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Failures a pipeline can surface at its boundary.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// Network failure or non-2xx answer from a provider.
    #[error("upstream unavailable: {0}")]
    UpstreamUnavailable(String),

    /// The provider answered 2xx but the body does not have the expected shape.
    #[error("malformed payload: {0}")]
    MalformedPayload(String),

    /// A provider credential is not configured.
    #[error("{0} is not configured")]
    ConfigMissing(&'static str),
}

impl PipelineError {
    pub fn status_code(&self) -> u16 {
        match self {
            PipelineError::UpstreamUnavailable(_) | PipelineError::MalformedPayload(_) => 502,
            PipelineError::ConfigMissing(_) => 500,
        }
    }

    pub fn malformed(context: &str, err: impl std::fmt::Display) -> Self {
        PipelineError::MalformedPayload(format!("{context}: {err}"))
    }
}

pub type PipelineResult<T> = std::result::Result<T, PipelineError>;

/// Body of every failed pipeline response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorEnvelope {
    pub error: String,
    pub details: String,
}

impl ErrorEnvelope {
    /// `what` names the pipeline, e.g. "data" or "odds".
    pub fn from_error(what: &str, err: &PipelineError) -> Self {
        match err {
            PipelineError::ConfigMissing(key) => Self {
                error: "API key not configured".to_string(),
                details: format!("Please set {key} in your .env.local file"),
            },
            other => Self {
                error: format!("Failed to fetch {what}"),
                details: other.to_string(),
            },
        }
    }
}
