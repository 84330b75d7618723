use thiserror::Error;

/// Error taxonomy for the navigation engine.
///
/// Nothing here is fatal: asset and dataset failures degrade to
/// best-effort skips, and a failed transition restores the idle state
/// with input re-enabled.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("asset load failed for {url}: {reason}")]
    AssetLoad { url: String, reason: String },

    #[error("building status dataset unavailable: {0}")]
    DatasetLoad(String),

    #[error("malformed record: {0}")]
    MalformedRecord(String),

    #[error("transition to scene '{0}' failed")]
    TransitionFailed(String),

    /// A transition is already in flight; the request was dropped.
    #[error("transition already in flight")]
    Busy,
}
