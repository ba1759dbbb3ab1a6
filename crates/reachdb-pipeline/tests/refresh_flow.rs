//! End-to-end pipeline tests over an in-memory store and a scripted
//! provider. Timer-heavy paths (stage timeouts, the watchdog, the reaper)
//! run under paused virtual time, so the production budgets are exercised
//! without real waiting.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use futures::StreamExt;
use reachdb_core::{RawProfile, SentimentBreakdown, Snapshot};
use reachdb_pipeline::testing::{sample_bundle, sample_comment, ScriptedSource};
use reachdb_pipeline::{JobState, JobStatus, RefreshConfig, RefreshService, StartOutcome};
use reachdb_store::{MemoryStore, SnapshotStore};

fn service_with(
    source: ScriptedSource,
    config: RefreshConfig,
) -> (Arc<RefreshService>, Arc<MemoryStore>) {
    let store = Arc::new(MemoryStore::new());
    let service = Arc::new(RefreshService::new(
        Arc::clone(&store) as Arc<dyn SnapshotStore>,
        Arc::new(source),
        config,
    ));
    (service, store)
}

async fn wait_terminal(service: &Arc<RefreshService>, key: &str) -> JobStatus {
    loop {
        if let Some(status) = service.status(key) {
            if status.state.is_terminal() {
                return status;
            }
        }
        tokio::time::sleep(Duration::from_secs(1)).await;
    }
}

fn stored_snapshot(key: &str, age_hours: i64, engagement: f64) -> Snapshot {
    let captured_at = Utc::now() - chrono::Duration::hours(age_hours);
    Snapshot {
        profile_key: key.to_string(),
        captured_at,
        profile: RawProfile {
            username: key.to_string(),
            full_name: String::new(),
            followers: 1_000,
            following: 10,
            posts_count: 0,
            bio: String::new(),
            profile_pic_url: None,
            engagement_percent: engagement,
        },
        posts: vec![],
        engagement_percent: engagement,
        growth_percent: 0.0,
        followers: 1_000,
        comments: vec![],
        sentiment: SentimentBreakdown::zero(),
    }
}

#[tokio::test(start_paused = true)]
async fn successful_refresh_lifecycle() {
    let source = ScriptedSource::returning(sample_bundle("acme", 1_000, 3))
        .with_comments(vec![sample_comment("love this 🔥"), sample_comment("mid tbh")]);
    let (service, store) = service_with(source, RefreshConfig::default());

    assert_eq!(service.start("acme"), StartOutcome::Started);
    assert_eq!(
        service.start("acme"),
        StartOutcome::AlreadyRunning,
        "second rapid start must not spawn a second run"
    );

    let status = wait_terminal(&service, "acme").await;
    assert_eq!(status.state, JobState::Complete);
    assert_eq!(status.progress_percent, 100);

    let result = service.result("acme").expect("cached result");
    // 3 posts × (50 likes + 5 comments) / 1000 followers → 5.5 % each.
    assert!((result.avg_engagement - 5.5).abs() < 1e-9);
    assert_eq!(result.posts.len(), 3);
    assert_eq!(result.comments.len(), 2);
    assert!(result.sentiment.positive > 0.0);
    assert!(result.growth.is_empty(), "first run has no prior history");

    let persisted = store.latest("acme").await.unwrap().expect("snapshot");
    assert!((persisted.engagement_percent - 5.5).abs() < 1e-9);
    assert_eq!(persisted.growth_percent, 0.0);
    assert_eq!(persisted.comments.len(), 2);

    assert_eq!(service.start("acme"), StartOutcome::AlreadyComplete);
}

#[tokio::test(start_paused = true)]
async fn comments_timeout_degrades_to_empty_comments() {
    let mut bundle = sample_bundle("acme", 1_000, 2);
    for post in &mut bundle.posts {
        post.caption = String::new();
    }
    let source = ScriptedSource::returning(bundle)
        .with_comments(vec![sample_comment("never delivered")])
        .with_comments_delay(Duration::from_secs(10_000));
    let (service, _store) = service_with(source, RefreshConfig::default());

    service.start("acme");
    let status = wait_terminal(&service, "acme").await;
    assert_eq!(status.state, JobState::Complete, "comments are non-fatal");

    let result = service.result("acme").expect("cached result");
    assert!(result.comments.is_empty());
    assert!(
        result.sentiment.is_zero(),
        "no comments and no captions must score all-zero"
    );
}

#[tokio::test(start_paused = true)]
async fn caption_fallback_feeds_sentiment_when_comments_fail() {
    let mut bundle = sample_bundle("acme", 1_000, 2);
    bundle.posts[0].caption = "love this amazing launch".to_string();
    bundle.posts[1].caption = "great things coming".to_string();
    let source =
        ScriptedSource::returning(bundle).with_comments_failure("comment actor crashed");
    let (service, _store) = service_with(source, RefreshConfig::default());

    service.start("acme");
    let status = wait_terminal(&service, "acme").await;
    assert_eq!(status.state, JobState::Complete);

    let result = service.result("acme").expect("cached result");
    assert!(result.comments.is_empty());
    assert!(
        result.sentiment.positive > 0.0,
        "captions should stand in for comments"
    );
}

#[tokio::test(start_paused = true)]
async fn profile_timeout_fails_the_run() {
    let source = ScriptedSource::returning(sample_bundle("acme", 1_000, 1))
        .with_profile_delay(Duration::from_secs(10_000));
    let (service, store) = service_with(source, RefreshConfig::default());

    service.start("acme");
    let status = wait_terminal(&service, "acme").await;
    assert_eq!(status.state, JobState::Failed);
    assert!(
        status.message.contains("timed out after 120s"),
        "unexpected message: {}",
        status.message
    );
    assert!(service.result("acme").is_none());
    assert!(store.is_empty(), "no snapshot may be persisted for a failed run");
}

#[tokio::test(start_paused = true)]
async fn watchdog_bounds_total_run_duration() {
    let config = RefreshConfig {
        // Stage budget far beyond the watchdog so only the watchdog can fire.
        profile_stage_timeout: Duration::from_secs(100_000),
        ..RefreshConfig::default()
    };
    let source = ScriptedSource::returning(sample_bundle("acme", 1_000, 1))
        .with_profile_delay(Duration::from_secs(50_000));
    let (service, _store) = service_with(source, config);

    service.start("acme");
    let status = wait_terminal(&service, "acme").await;
    assert_eq!(status.state, JobState::Failed);
    assert!(
        status.message.contains("timed out after 600s"),
        "unexpected message: {}",
        status.message
    );
}

#[tokio::test(start_paused = true)]
async fn missing_profile_data_fails_the_run() {
    let (service, _store) = service_with(ScriptedSource::empty(), RefreshConfig::default());

    service.start("ghost");
    let status = wait_terminal(&service, "ghost").await;
    assert_eq!(status.state, JobState::Failed);
    assert!(
        status.message.contains("no data returned"),
        "unexpected message: {}",
        status.message
    );
}

#[tokio::test(start_paused = true)]
async fn provider_failure_message_is_surfaced() {
    let (service, _store) = service_with(
        ScriptedSource::failing("actor ran out of memory"),
        RefreshConfig::default(),
    );

    service.start("acme");
    let status = wait_terminal(&service, "acme").await;
    assert_eq!(status.state, JobState::Failed);
    assert!(
        status.message.contains("actor ran out of memory"),
        "provider message must be surfaced verbatim, got: {}",
        status.message
    );
}

#[tokio::test(start_paused = true)]
async fn reaper_evicts_status_and_result_after_ttl() {
    let source = ScriptedSource::returning(sample_bundle("acme", 1_000, 1));
    let (service, _store) = service_with(source, RefreshConfig::default());

    service.start("acme");
    let status = wait_terminal(&service, "acme").await;
    assert_eq!(status.state, JobState::Complete);
    assert!(service.result("acme").is_some());

    tokio::time::sleep(Duration::from_secs(301)).await;
    assert!(service.status("acme").is_none(), "status must be evicted");
    assert!(service.result("acme").is_none(), "result must be evicted");

    // After eviction the key behaves as if it was never refreshed.
    assert_eq!(service.start("acme"), StartOutcome::Started);
}

#[tokio::test(start_paused = true)]
async fn failed_run_can_be_retried_before_eviction() {
    let (service, _store) = service_with(
        ScriptedSource::failing("transient outage"),
        RefreshConfig::default(),
    );

    service.start("acme");
    let status = wait_terminal(&service, "acme").await;
    assert_eq!(status.state, JobState::Failed);

    assert_eq!(
        service.start("acme"),
        StartOutcome::Started,
        "a failed record must not block a retry"
    );
}

#[tokio::test(start_paused = true)]
async fn progress_stream_is_monotone_and_ends_at_one_hundred() {
    let source = ScriptedSource::returning(sample_bundle("acme", 1_000, 2))
        .with_profile_delay(Duration::from_secs(3))
        .with_comments_delay(Duration::from_secs(2));
    let (service, _store) = service_with(source, RefreshConfig::default());

    service.start("acme");
    let observed: Vec<JobStatus> = service.progress_stream("acme").collect().await;

    assert!(!observed.is_empty());
    assert!(
        observed
            .windows(2)
            .all(|w| w[0].progress_percent <= w[1].progress_percent),
        "progress must be non-decreasing: {:?}",
        observed.iter().map(|s| s.progress_percent).collect::<Vec<_>>()
    );
    let last = observed.last().unwrap();
    assert_eq!(last.progress_percent, 100);
    assert!(last.state.is_terminal());
}

#[tokio::test(start_paused = true)]
async fn growth_is_computed_against_stored_history() {
    let mut bundle = sample_bundle("acme", 1_000, 1);
    // One post with 25 likes + 5 comments → 3.0 % engagement.
    bundle.posts[0].likes = 25;
    bundle.posts[0].comments_count = 5;
    let source = ScriptedSource::returning(bundle);
    let (service, store) = service_with(source, RefreshConfig::default());

    store
        .append(&stored_snapshot("acme", 13, 2.0))
        .await
        .unwrap();

    service.start("acme");
    let status = wait_terminal(&service, "acme").await;
    assert_eq!(status.state, JobState::Complete);

    let persisted = store.latest("acme").await.unwrap().expect("snapshot");
    assert!(
        (persisted.growth_percent - 50.0).abs() < 1e-9,
        "3.0 vs 2.0 engagement 13h apart should be +50%, got {}",
        persisted.growth_percent
    );

    let result = service.result("acme").expect("cached result");
    assert_eq!(result.growth.len(), 1, "series holds the prior history");
}

#[tokio::test(start_paused = true)]
async fn profile_view_serves_fresh_snapshot_without_provider_call() {
    let source = Arc::new(ScriptedSource::returning(sample_bundle("acme", 1_000, 1)));
    let store = Arc::new(MemoryStore::new());
    let service = Arc::new(RefreshService::new(
        Arc::clone(&store) as Arc<dyn SnapshotStore>,
        Arc::clone(&source) as Arc<dyn reachdb_provider::ProfileSource>,
        RefreshConfig::default(),
    ));

    store
        .append(&stored_snapshot("acme", 1, 4.0))
        .await
        .unwrap();

    match service.profile_view("acme").await.unwrap() {
        reachdb_pipeline::ProfileView::Fresh(snapshot) => {
            assert!((snapshot.engagement_percent - 4.0).abs() < 1e-9);
        }
        other => panic!("expected Fresh, got {other:?}"),
    }
    assert_eq!(source.profile_calls(), 0, "fresh reads must not hit the provider");
    assert!(service.status("acme").is_none(), "no job may have started");
}

#[tokio::test(start_paused = true)]
async fn profile_view_triggers_refresh_for_stale_snapshot() {
    let source = ScriptedSource::returning(sample_bundle("acme", 1_000, 1));
    let (service, store) = service_with(source, RefreshConfig::default());

    store
        .append(&stored_snapshot("acme", 13, 4.0))
        .await
        .unwrap();

    match service.profile_view("acme").await.unwrap() {
        reachdb_pipeline::ProfileView::Refreshing(outcome) => {
            assert_eq!(outcome, StartOutcome::Started);
        }
        other => panic!("expected Refreshing, got {other:?}"),
    }

    let status = wait_terminal(&service, "acme").await;
    assert_eq!(status.state, JobState::Complete);
    let history = store.history("acme", 10).await.unwrap();
    assert_eq!(history.len(), 2, "the stale key must gain a fresh snapshot");
}

#[tokio::test(start_paused = true)]
async fn sweep_refreshes_only_recently_touched_keys() {
    let source = ScriptedSource::returning(sample_bundle("any", 1_000, 1));
    let (service, store) = service_with(source, RefreshConfig::default());

    store
        .append(&stored_snapshot("warm", 1, 2.0))
        .await
        .unwrap();
    store
        .append(&stored_snapshot("cold", 30, 2.0))
        .await
        .unwrap();

    service.sweep().await;

    assert_eq!(
        store.history("warm", 10).await.unwrap().len(),
        2,
        "keys touched in the last 24h are re-run"
    );
    assert_eq!(
        store.history("cold", 10).await.unwrap().len(),
        1,
        "keys outside the lookback window are left alone"
    );
}
