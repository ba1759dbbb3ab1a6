//! HTTP client for the actor-run provider API.
//!
//! Wraps `reqwest` with bearer-token auth, typed response deserialization,
//! and the start-run → poll → read-dataset protocol. A profile fetch starts
//! a profile-scraper run; a comments fetch starts a comment-scraper run.
//! The client polls a run until it reaches a terminal status with no overall
//! deadline — the pipeline executor owns timeout enforcement and cancels the
//! whole future when its stage budget expires.

use std::time::Duration;

use reqwest::{Client, Url};
use serde::de::DeserializeOwned;

use reachdb_core::{Comment, ProfileBundle};

use crate::error::ProviderError;
use crate::normalize::{normalize_comments, normalize_profile};
use crate::retry::retry_with_backoff;
use crate::types::{ActorRun, CommentItem, ProfileItem, RunEnvelope};

const DEFAULT_BASE_URL: &str = "https://api.apify.com";
const PROFILE_ACTOR: &str = "apify~instagram-profile-scraper";
const COMMENT_ACTOR: &str = "apify~instagram-comment-scraper";
const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(5);

/// Client for the actor-run provider API.
///
/// Use [`ApifyClient::new`] for production or [`ApifyClient::with_base_url`]
/// to point at a mock server in tests.
pub struct ApifyClient {
    client: Client,
    token: String,
    base_url: Url,
    poll_interval: Duration,
    max_retries: u32,
    backoff_base_ms: u64,
}

impl ApifyClient {
    /// Creates a new client pointed at the production provider API.
    ///
    /// # Errors
    ///
    /// Returns [`ProviderError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed.
    pub fn new(token: &str, timeout_secs: u64) -> Result<Self, ProviderError> {
        Self::with_base_url(token, timeout_secs, DEFAULT_BASE_URL)
    }

    /// Creates a new client with a custom base URL (for testing with wiremock).
    ///
    /// # Errors
    ///
    /// Returns [`ProviderError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed, or [`ProviderError::InvalidBaseUrl`] if
    /// `base_url` does not parse.
    pub fn with_base_url(
        token: &str,
        timeout_secs: u64,
        base_url: &str,
    ) -> Result<Self, ProviderError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent("reachdb/0.1 (profile-analytics)")
            .build()?;

        // Normalise: exactly one trailing slash so Url::join appends rather
        // than replacing the last path segment.
        let normalised = format!("{}/", base_url.trim_end_matches('/'));
        let base_url =
            Url::parse(&normalised).map_err(|e| ProviderError::InvalidBaseUrl {
                base_url: base_url.to_string(),
                reason: e.to_string(),
            })?;

        Ok(Self {
            client,
            token: token.to_owned(),
            base_url,
            poll_interval: DEFAULT_POLL_INTERVAL,
            max_retries: 3,
            backoff_base_ms: 1_000,
        })
    }

    /// Override the run-status poll interval (default 5s).
    #[must_use]
    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    /// Override retry settings for transient HTTP failures.
    #[must_use]
    pub fn with_retry(mut self, max_retries: u32, backoff_base_ms: u64) -> Self {
        self.max_retries = max_retries;
        self.backoff_base_ms = backoff_base_ms;
        self
    }

    /// Fetch profile and recent posts for one profile key.
    ///
    /// Returns `Ok(None)` when the provider produced an empty dataset — the
    /// key may not exist or may be hidden.
    ///
    /// # Errors
    ///
    /// - [`ProviderError::RunFailed`] if the provider reports the run failed.
    /// - [`ProviderError::Http`] on network failure after retries.
    /// - [`ProviderError::Deserialize`] if a response does not match the
    ///   expected shape.
    pub async fn fetch_profile(
        &self,
        profile_key: &str,
        post_limit: usize,
    ) -> Result<Option<ProfileBundle>, ProviderError> {
        let payload = serde_json::json!({
            "usernames": [profile_key],
            "resultsLimit": post_limit,
            "resultsType": "posts",
        });

        let items: Vec<ProfileItem> = self
            .run_to_items(PROFILE_ACTOR, &payload, &format!("profile({profile_key})"))
            .await?;

        let Some(first) = items.into_iter().next() else {
            tracing::warn!(key = profile_key, "provider returned an empty profile dataset");
            return Ok(None);
        };

        let bundle = normalize_profile(first, post_limit);
        tracing::info!(
            key = profile_key,
            posts = bundle.posts.len(),
            followers = bundle.profile.followers,
            "fetched profile from provider"
        );
        Ok(Some(bundle))
    }

    /// Fetch comments for the given post URLs.
    ///
    /// # Errors
    ///
    /// Same error surface as [`ApifyClient::fetch_profile`].
    pub async fn fetch_comments(
        &self,
        post_urls: &[String],
        limit: usize,
    ) -> Result<Vec<Comment>, ProviderError> {
        if post_urls.is_empty() {
            return Ok(Vec::new());
        }

        let payload = serde_json::json!({
            "directUrls": post_urls,
            "resultsLimit": limit,
            "includeNestedComments": false,
        });

        let items: Vec<CommentItem> = self
            .run_to_items(
                COMMENT_ACTOR,
                &payload,
                &format!("comments({} urls)", post_urls.len()),
            )
            .await?;

        let comments = normalize_comments(items);
        tracing::info!(count = comments.len(), "fetched comments from provider");
        Ok(comments)
    }

    /// Start a run, wait for it to finish, and read its dataset.
    async fn run_to_items<T: DeserializeOwned>(
        &self,
        actor: &str,
        payload: &serde_json::Value,
        context: &str,
    ) -> Result<Vec<T>, ProviderError> {
        let run = self.start_run(actor, payload, context).await?;
        tracing::debug!(run_id = %run.id, actor, "provider run started");

        let run = self.await_run(run).await?;
        let dataset_id = run
            .default_dataset_id
            .ok_or(ProviderError::MissingDataset { run_id: run.id })?;

        self.dataset_items(&dataset_id, context).await
    }

    async fn start_run(
        &self,
        actor: &str,
        payload: &serde_json::Value,
        context: &str,
    ) -> Result<ActorRun, ProviderError> {
        let url = self.endpoint(&format!("v2/acts/{actor}/runs"));
        let body = retry_with_backoff(self.max_retries, self.backoff_base_ms, || {
            let url = url.clone();
            async move {
                let response = self
                    .client
                    .post(url)
                    .bearer_auth(&self.token)
                    .json(payload)
                    .send()
                    .await?
                    .error_for_status()?;
                Ok(response.json::<serde_json::Value>().await?)
            }
        })
        .await?;

        let envelope: RunEnvelope =
            serde_json::from_value(body).map_err(|e| ProviderError::Deserialize {
                context: format!("start_run({context})"),
                source: e,
            })?;
        Ok(envelope.data)
    }

    /// Poll a run until it reaches a terminal status.
    async fn await_run(&self, mut run: ActorRun) -> Result<ActorRun, ProviderError> {
        loop {
            if run.succeeded() {
                return Ok(run);
            }
            if run.failed() {
                return Err(ProviderError::RunFailed {
                    message: run
                        .error_message
                        .unwrap_or_else(|| "no error message from provider".to_string()),
                    run_id: run.id,
                    status: run.status,
                });
            }
            tokio::time::sleep(self.poll_interval).await;
            run = self.get_run(&run.id).await?;
        }
    }

    async fn get_run(&self, run_id: &str) -> Result<ActorRun, ProviderError> {
        let url = self.endpoint(&format!("v2/actor-runs/{run_id}"));
        let body = retry_with_backoff(self.max_retries, self.backoff_base_ms, || {
            let url = url.clone();
            async move {
                let response = self
                    .client
                    .get(url)
                    .bearer_auth(&self.token)
                    .send()
                    .await?
                    .error_for_status()?;
                Ok(response.json::<serde_json::Value>().await?)
            }
        })
        .await?;

        let envelope: RunEnvelope =
            serde_json::from_value(body).map_err(|e| ProviderError::Deserialize {
                context: format!("get_run({run_id})"),
                source: e,
            })?;
        Ok(envelope.data)
    }

    async fn dataset_items<T: DeserializeOwned>(
        &self,
        dataset_id: &str,
        context: &str,
    ) -> Result<Vec<T>, ProviderError> {
        let url = self.endpoint(&format!("v2/datasets/{dataset_id}/items"));
        let body = retry_with_backoff(self.max_retries, self.backoff_base_ms, || {
            let url = url.clone();
            async move {
                let response = self
                    .client
                    .get(url)
                    .bearer_auth(&self.token)
                    .send()
                    .await?
                    .error_for_status()?;
                Ok(response.json::<serde_json::Value>().await?)
            }
        })
        .await?;

        serde_json::from_value(body).map_err(|e| ProviderError::Deserialize {
            context: format!("dataset_items({context})"),
            source: e,
        })
    }

    fn endpoint(&self, path: &str) -> Url {
        // base_url always ends with '/' (normalised in the constructor), and
        // the relative paths built above never start with one, so join cannot
        // fail on the inputs this client produces.
        self.base_url
            .join(path)
            .unwrap_or_else(|_| self.base_url.clone())
    }
}

#[cfg(test)]
#[path = "client_test.rs"]
mod client_test;
