use thiserror::Error;

/// Errors returned by the data-provider client.
#[derive(Debug, Error)]
pub enum ProviderError {
    /// Network or TLS failure from the underlying HTTP client.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The provider reported a run as failed, aborted, or timed out.
    #[error("provider run {run_id} ended {status}: {message}")]
    RunFailed {
        run_id: String,
        status: String,
        message: String,
    },

    /// A run reached `SUCCEEDED` but carried no dataset to read from.
    #[error("provider run {run_id} succeeded without a dataset id")]
    MissingDataset { run_id: String },

    /// The response body could not be deserialized into the expected type.
    #[error("JSON deserialization error for {context}: {source}")]
    Deserialize {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    /// The client was constructed with an unusable base URL.
    #[error("invalid provider base URL \"{base_url}\": {reason}")]
    InvalidBaseUrl { base_url: String, reason: String },
}
