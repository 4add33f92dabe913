use std::time::Duration;

use thiserror::Error;

/// Failures of a single edit cycle. None of these are fatal: the
/// controller logs them, restores the transcript, and returns to an
/// interactive state. No automatic retry.
#[derive(Debug, Error)]
pub enum EditError {
    #[error("no language-model engine is available")]
    EngineUnavailable,
    #[error("failed to encode edit request")]
    RequestEncode(#[source] serde_json::Error),
    #[error("engine call failed: {0}")]
    EngineCall(#[source] anyhow::Error),
    #[error("engine call timed out after {0:?}")]
    Timeout(Duration),
    #[error("model reply was not a valid edit response: {0}")]
    ResponseParse(#[source] serde_json::Error),
}
