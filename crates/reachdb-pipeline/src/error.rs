use reachdb_provider::ProviderError;
use reachdb_store::StoreError;
use thiserror::Error;

/// Failure taxonomy for a refresh run.
///
/// Only the profile-fetch variants are fatal to a run; comments-stage
/// failures degrade to an empty comment list and persistence failures are
/// logged without failing the run.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// An external fetch exceeded its stage budget.
    #[error("{stage} timed out after {timeout_secs}s")]
    ProviderTimeout {
        stage: &'static str,
        timeout_secs: u64,
    },

    /// The provider reported an error for an external fetch.
    #[error("{stage} failed: {source}")]
    ProviderFailure {
        stage: &'static str,
        #[source]
        source: ProviderError,
    },

    /// The provider completed but had no data for the key.
    #[error("no data returned from profile fetch")]
    NoDataFound,

    /// The snapshot store rejected a write or read.
    #[error("snapshot store error: {0}")]
    Persistence(#[from] StoreError),

    /// Anything that should never happen.
    #[error("internal error: {0}")]
    Internal(String),
}
