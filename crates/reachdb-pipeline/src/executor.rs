//! The multi-stage refresh run for one profile key.
//!
//! Stage sequence: fetch profile → fetch comments → score sentiment →
//! compute growth → persist snapshot → publish result. Only the profile
//! fetch is fatal on failure; the comments fetch degrades to an empty list
//! and a persistence failure still publishes the in-memory result. Stage
//! timeouts and the global watchdog use `tokio::time::timeout`, which drops
//! the in-flight future on expiry — a timed-out provider call is cancelled,
//! not left running detached.

use chrono::Utc;
use reachdb_core::{Comment, Post, RawProfile, Snapshot};
use uuid::Uuid;

use crate::error::PipelineError;
use crate::freshness;
use crate::service::ServiceInner;
use crate::types::JobResult;

// Progress checkpoints, in order of appearance.
const PROGRESS_STARTED: u8 = 0;
const PROGRESS_FETCHING_PROFILE: u8 = 10;
const PROGRESS_FETCHING_COMMENTS: u8 = 30;
const PROGRESS_DERIVING: u8 = 60;
const PROGRESS_PERSISTING: u8 = 80;

/// How many post captions stand in for comments when none could be fetched.
const CAPTION_FALLBACK_POSTS: usize = 3;

/// Drive one run to a terminal state, bounded by the global watchdog.
///
/// All outcomes are recorded in the tracker; this function never fails out
/// to the caller.
pub(crate) async fn execute(service: &ServiceInner, profile_key: &str, run_id: Uuid) {
    let watchdog = service.config.run_timeout;
    match tokio::time::timeout(watchdog, run_stages(service, profile_key, run_id)).await {
        Ok(Ok(result)) => {
            if service.tracker.complete(profile_key, run_id, result) {
                tracing::info!(key = profile_key, "profile refresh complete");
            }
        }
        Ok(Err(e)) => {
            tracing::error!(key = profile_key, error = %e, "profile refresh failed");
            service.tracker.fail(profile_key, run_id, &e.to_string());
        }
        Err(_) => {
            let message =
                format!("profile refresh timed out after {}s", watchdog.as_secs());
            tracing::error!(key = profile_key, "{message}");
            service.tracker.fail(profile_key, run_id, &message);
        }
    }
}

async fn run_stages(
    service: &ServiceInner,
    profile_key: &str,
    run_id: Uuid,
) -> Result<JobResult, PipelineError> {
    let tracker = &service.tracker;
    let config = &service.config;

    // Flip the queued record to running before any external work.
    tracker.checkpoint(profile_key, run_id, PROGRESS_STARTED, "Starting...");

    // Stage 1: profile fetch. Failure, timeout, or no data is fatal.
    tracker.checkpoint(
        profile_key,
        run_id,
        PROGRESS_FETCHING_PROFILE,
        "Fetching profile data...",
    );
    let bundle = match tokio::time::timeout(
        config.profile_stage_timeout,
        service.source.fetch_profile(profile_key, config.post_limit),
    )
    .await
    {
        Err(_) => {
            return Err(PipelineError::ProviderTimeout {
                stage: "profile fetch",
                timeout_secs: config.profile_stage_timeout.as_secs(),
            })
        }
        Ok(Err(e)) => {
            return Err(PipelineError::ProviderFailure {
                stage: "profile fetch",
                source: e,
            })
        }
        Ok(Ok(None)) => return Err(PipelineError::NoDataFound),
        Ok(Ok(Some(bundle))) => bundle,
    };

    let mut profile = bundle.profile;
    let mut posts = bundle.posts;
    apply_engagement(&mut profile, &mut posts);
    tracing::debug!(
        key = profile_key,
        posts = posts.len(),
        followers = profile.followers,
        engagement = profile.engagement_percent,
        "profile fetch done"
    );

    // Stage 2: comments, only when there are posts to read them from.
    // Failure or timeout degrades to an empty list.
    tracker.checkpoint(
        profile_key,
        run_id,
        PROGRESS_FETCHING_COMMENTS,
        "Analyzing comments...",
    );
    let comments = fetch_comments_lenient(service, profile_key, &posts).await;

    // Stage 3: sentiment. The scorer is pure; an empty corpus scores zero.
    // When no comments came back, the leading post captions stand in.
    tracker.checkpoint(
        profile_key,
        run_id,
        PROGRESS_DERIVING,
        "Calculating growth trends...",
    );
    let corpus: Vec<String> = if comments.is_empty() {
        posts
            .iter()
            .take(CAPTION_FALLBACK_POSTS)
            .filter(|post| !post.caption.is_empty())
            .map(|post| post.caption.clone())
            .collect()
    } else {
        comments.iter().map(|comment| comment.text.clone()).collect()
    };
    let sentiment = reachdb_sentiment::score_comments(&corpus);

    // Stage 4: growth over stored history, computed once before the single
    // persisting write. A store failure here degrades to no growth data.
    let history = match service.store.history(profile_key, usize::MAX).await {
        Ok(history) => history,
        Err(e) => {
            tracing::warn!(key = profile_key, error = %e, "history read failed — growth defaults to 0");
            Vec::new()
        }
    };
    let growth_percent = freshness::growth_percent(&history, config.freshness_window);
    let growth = freshness::growth_series(&history);
    let avg_engagement = profile.engagement_percent;

    // Stage 5: persist. Non-fatal — the in-memory result is still served.
    tracker.checkpoint(profile_key, run_id, PROGRESS_PERSISTING, "Saving data...");
    let snapshot = Snapshot {
        profile_key: profile_key.to_string(),
        captured_at: Utc::now(),
        profile: profile.clone(),
        posts: posts.clone(),
        engagement_percent: avg_engagement,
        growth_percent,
        followers: profile.followers,
        comments: comments.clone(),
        sentiment,
    };
    if let Err(e) = service.store.append(&snapshot).await {
        tracing::error!(
            key = profile_key,
            error = %e,
            "snapshot persistence failed — serving result from memory only"
        );
    }

    // Stage 6 (publish) happens in `execute` via `tracker.complete`.
    Ok(JobResult {
        profile,
        posts,
        sentiment,
        growth,
        avg_engagement,
        comments,
    })
}

/// Fetch comments for the leading posts, swallowing timeouts and failures.
async fn fetch_comments_lenient(
    service: &ServiceInner,
    profile_key: &str,
    posts: &[Post],
) -> Vec<Comment> {
    if posts.is_empty() {
        return Vec::new();
    }
    let urls: Vec<String> = posts
        .iter()
        .take(service.config.comment_source_posts)
        .filter_map(|post| post.url.clone())
        .collect();
    if urls.is_empty() {
        tracing::warn!(key = profile_key, "no post URLs available for comments fetch");
        return Vec::new();
    }

    match tokio::time::timeout(
        service.config.comments_stage_timeout,
        service
            .source
            .fetch_comments(&urls, service.config.comment_limit),
    )
    .await
    {
        Err(_) => {
            tracing::warn!(
                key = profile_key,
                timeout_secs = service.config.comments_stage_timeout.as_secs(),
                "comments fetch timed out — continuing without comments"
            );
            Vec::new()
        }
        Ok(Err(e)) => {
            tracing::warn!(
                key = profile_key,
                error = %e,
                "comments fetch failed — continuing without comments"
            );
            Vec::new()
        }
        Ok(Ok(comments)) => comments,
    }
}

/// Derive per-post and profile-average engagement in place.
///
/// Per post: `(likes + comments) / followers × 100`, capped at 100; a
/// zero-follower profile divides by 1 instead. The profile average is the
/// mean over posts, 0 when there are none.
pub(crate) fn apply_engagement(profile: &mut RawProfile, posts: &mut [Post]) {
    #[allow(clippy::cast_precision_loss)]
    let followers = if profile.followers <= 0 {
        1.0
    } else {
        profile.followers as f64
    };

    for post in posts.iter_mut() {
        #[allow(clippy::cast_precision_loss)]
        let interactions = (post.likes + post.comments_count) as f64;
        post.engagement_percent = (interactions / followers * 100.0).min(100.0);
    }

    profile.engagement_percent = if posts.is_empty() {
        0.0
    } else {
        #[allow(clippy::cast_precision_loss)]
        let count = posts.len() as f64;
        posts.iter().map(|post| post.engagement_percent).sum::<f64>() / count
    };
}
