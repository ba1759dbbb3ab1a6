//! The collaborator trait the pipeline fetches through.

use async_trait::async_trait;
use reachdb_core::{Comment, ProfileBundle};

use crate::client::ApifyClient;
use crate::error::ProviderError;

/// A source of raw profile data.
///
/// May take minutes and may fail; implementations enforce no overall
/// deadline of their own. The pipeline executor wraps each call in a stage
/// timeout and cancels the future on expiry.
#[async_trait]
pub trait ProfileSource: Send + Sync {
    /// Fetch profile and recent posts; `Ok(None)` when the provider has no
    /// data for the key.
    async fn fetch_profile(
        &self,
        profile_key: &str,
        post_limit: usize,
    ) -> Result<Option<ProfileBundle>, ProviderError>;

    /// Fetch comments for the given post URLs.
    async fn fetch_comments(
        &self,
        post_urls: &[String],
        limit: usize,
    ) -> Result<Vec<Comment>, ProviderError>;
}

#[async_trait]
impl ProfileSource for ApifyClient {
    async fn fetch_profile(
        &self,
        profile_key: &str,
        post_limit: usize,
    ) -> Result<Option<ProfileBundle>, ProviderError> {
        ApifyClient::fetch_profile(self, profile_key, post_limit).await
    }

    async fn fetch_comments(
        &self,
        post_urls: &[String],
        limit: usize,
    ) -> Result<Vec<Comment>, ProviderError> {
        ApifyClient::fetch_comments(self, post_urls, limit).await
    }
}
