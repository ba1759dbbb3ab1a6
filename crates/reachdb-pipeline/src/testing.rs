//! Test doubles for the pipeline's collaborators.
//!
//! [`ScriptedSource`] is a `ProfileSource` whose behavior — payloads,
//! delays, failures — is fixed up front, so executor and server tests can
//! exercise timeouts and error paths without a network. Used together with
//! `reachdb_store::MemoryStore`.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use reachdb_core::{Comment, Post, ProfileBundle, RawProfile};
use reachdb_provider::{ProfileSource, ProviderError};

/// A provider whose responses are scripted in advance.
pub struct ScriptedSource {
    bundle: Option<ProfileBundle>,
    comments: Vec<Comment>,
    profile_delay: Duration,
    comments_delay: Duration,
    fail_profile: Option<String>,
    fail_comments: Option<String>,
    profile_calls: AtomicUsize,
}

impl ScriptedSource {
    /// A source returning `bundle` immediately and no comments.
    #[must_use]
    pub fn returning(bundle: ProfileBundle) -> Self {
        Self {
            bundle: Some(bundle),
            comments: Vec::new(),
            profile_delay: Duration::ZERO,
            comments_delay: Duration::ZERO,
            fail_profile: None,
            fail_comments: None,
            profile_calls: AtomicUsize::new(0),
        }
    }

    /// A source with no data for any key.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            bundle: None,
            comments: Vec::new(),
            profile_delay: Duration::ZERO,
            comments_delay: Duration::ZERO,
            fail_profile: None,
            fail_comments: None,
            profile_calls: AtomicUsize::new(0),
        }
    }

    /// A source whose profile fetch fails with `message`.
    #[must_use]
    pub fn failing(message: &str) -> Self {
        let mut source = Self::empty();
        source.fail_profile = Some(message.to_string());
        source
    }

    #[must_use]
    pub fn with_comments(mut self, comments: Vec<Comment>) -> Self {
        self.comments = comments;
        self
    }

    /// Delay before the profile fetch resolves (virtual time in paused tests).
    #[must_use]
    pub fn with_profile_delay(mut self, delay: Duration) -> Self {
        self.profile_delay = delay;
        self
    }

    /// Delay before the comments fetch resolves.
    #[must_use]
    pub fn with_comments_delay(mut self, delay: Duration) -> Self {
        self.comments_delay = delay;
        self
    }

    /// Make the comments fetch fail with `message`.
    #[must_use]
    pub fn with_comments_failure(mut self, message: &str) -> Self {
        self.fail_comments = Some(message.to_string());
        self
    }

    /// How many profile fetches were attempted against this source.
    pub fn profile_calls(&self) -> usize {
        self.profile_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ProfileSource for ScriptedSource {
    async fn fetch_profile(
        &self,
        _profile_key: &str,
        _post_limit: usize,
    ) -> Result<Option<ProfileBundle>, ProviderError> {
        self.profile_calls.fetch_add(1, Ordering::SeqCst);
        tokio::time::sleep(self.profile_delay).await;
        if let Some(message) = &self.fail_profile {
            return Err(scripted_failure(message));
        }
        Ok(self.bundle.clone())
    }

    async fn fetch_comments(
        &self,
        _post_urls: &[String],
        _limit: usize,
    ) -> Result<Vec<Comment>, ProviderError> {
        tokio::time::sleep(self.comments_delay).await;
        if let Some(message) = &self.fail_comments {
            return Err(scripted_failure(message));
        }
        Ok(self.comments.clone())
    }
}

fn scripted_failure(message: &str) -> ProviderError {
    ProviderError::RunFailed {
        run_id: "scripted".to_string(),
        status: "FAILED".to_string(),
        message: message.to_string(),
    }
}

/// A profile bundle with `post_count` posts, each with a URL and caption.
#[must_use]
pub fn sample_bundle(username: &str, followers: i64, post_count: usize) -> ProfileBundle {
    let posts = (0..post_count)
        .map(|i| Post {
            id: format!("post-{i}"),
            short_code: Some(format!("sc{i}")),
            caption: format!("caption for post {i}"),
            likes: 50,
            comments_count: 5,
            url: Some(format!("https://example.com/p/sc{i}")),
            display_url: None,
            engagement_percent: 0.0,
            taken_at: None,
        })
        .collect();

    ProfileBundle {
        profile: RawProfile {
            username: username.to_string(),
            full_name: format!("{username} full name"),
            followers,
            following: 10,
            posts_count: i64::try_from(post_count).unwrap_or(0),
            bio: String::new(),
            profile_pic_url: None,
            engagement_percent: 0.0,
        },
        posts,
    }
}

/// A comment with the given text.
#[must_use]
pub fn sample_comment(text: &str) -> Comment {
    Comment {
        text: text.to_string(),
        author: "commenter".to_string(),
        likes: 0,
        posted_at: None,
    }
}
