//! Freshness window policy and growth computation over snapshot history.
//!
//! All history slices are newest-first, as returned by the snapshot store.

use chrono::{DateTime, Duration, Utc};
use reachdb_core::{GrowthPoint, Snapshot};

/// Number of historical points in a growth series.
pub const GROWTH_SERIES_LEN: usize = 5;

/// True iff the snapshot is younger than `window`.
#[must_use]
pub fn is_fresh(captured_at: DateTime<Utc>, now: DateTime<Utc>, window: Duration) -> bool {
    now - captured_at < window
}

/// Relative engagement change, in percent, between the latest snapshot and a
/// baseline drawn from history.
///
/// The baseline is the most recent snapshot at least `baseline_gap` older
/// than the latest; when no snapshot is that old, the one immediately
/// preceding the latest. Returns 0 when fewer than 2 snapshots exist or the
/// baseline engagement is 0.
#[must_use]
pub fn growth_percent(history: &[Snapshot], baseline_gap: Duration) -> f64 {
    let Some(latest) = history.first() else {
        return 0.0;
    };
    if history.len() < 2 {
        return 0.0;
    }

    let cutoff = latest.captured_at - baseline_gap;
    let prev = history[1..]
        .iter()
        .find(|s| s.captured_at <= cutoff)
        .or_else(|| history.get(1));

    let Some(prev) = prev else {
        return 0.0;
    };
    if prev.engagement_percent == 0.0 {
        return 0.0;
    }
    (latest.engagement_percent - prev.engagement_percent) / prev.engagement_percent * 100.0
}

/// Up to [`GROWTH_SERIES_LEN`] points of history, newest-first.
#[must_use]
pub fn growth_series(history: &[Snapshot]) -> Vec<GrowthPoint> {
    history.iter().take(GROWTH_SERIES_LEN).map(GrowthPoint::from).collect()
}

#[cfg(test)]
mod tests {
    use reachdb_core::{RawProfile, SentimentBreakdown};

    use super::*;

    fn snapshot(captured_at: DateTime<Utc>, engagement: f64) -> Snapshot {
        Snapshot {
            profile_key: "acme".to_string(),
            captured_at,
            profile: RawProfile {
                username: "acme".to_string(),
                full_name: String::new(),
                followers: 100,
                following: 0,
                posts_count: 0,
                bio: String::new(),
                profile_pic_url: None,
                engagement_percent: engagement,
            },
            posts: vec![],
            engagement_percent: engagement,
            growth_percent: 0.0,
            followers: 100,
            comments: vec![],
            sentiment: SentimentBreakdown::zero(),
        }
    }

    fn gap() -> Duration {
        Duration::hours(12)
    }

    #[test]
    fn fresh_inside_window_stale_outside() {
        let now = Utc::now();
        assert!(is_fresh(now - Duration::hours(11), now, gap()));
        assert!(!is_fresh(now - Duration::hours(12), now, gap()));
        assert!(!is_fresh(now - Duration::hours(13), now, gap()));
    }

    #[test]
    fn growth_is_zero_for_empty_history() {
        assert_eq!(growth_percent(&[], gap()), 0.0);
    }

    #[test]
    fn growth_is_zero_for_single_snapshot() {
        let history = vec![snapshot(Utc::now(), 5.0)];
        assert_eq!(growth_percent(&history, gap()), 0.0);
    }

    #[test]
    fn growth_against_snapshot_beyond_gap() {
        // t0 engagement 2.0, t0+13h engagement 3.0 → +50%
        let t0 = Utc::now() - Duration::hours(13);
        let history = vec![snapshot(t0 + Duration::hours(13), 3.0), snapshot(t0, 2.0)];
        let growth = growth_percent(&history, gap());
        assert!((growth - 50.0).abs() < 1e-9, "expected 50.0, got {growth}");
    }

    #[test]
    fn growth_falls_back_to_immediate_previous() {
        // t0 engagement 4.0, t0+2h engagement 2.0, no ≥12h-old baseline → -50%
        let t0 = Utc::now() - Duration::hours(2);
        let history = vec![snapshot(t0 + Duration::hours(2), 2.0), snapshot(t0, 4.0)];
        let growth = growth_percent(&history, gap());
        assert!((growth + 50.0).abs() < 1e-9, "expected -50.0, got {growth}");
    }

    #[test]
    fn growth_prefers_oldest_qualifying_baseline_over_recent_noise() {
        let now = Utc::now();
        // Newest-first: now (6.0), now-1h (5.0), now-14h (3.0), now-30h (1.0)
        let history = vec![
            snapshot(now, 6.0),
            snapshot(now - Duration::hours(1), 5.0),
            snapshot(now - Duration::hours(14), 3.0),
            snapshot(now - Duration::hours(30), 1.0),
        ];
        // Baseline is the most recent snapshot ≥12h older than latest: 3.0
        let growth = growth_percent(&history, gap());
        assert!((growth - 100.0).abs() < 1e-9, "expected 100.0, got {growth}");
    }

    #[test]
    fn growth_is_zero_when_baseline_engagement_is_zero() {
        let now = Utc::now();
        let history = vec![snapshot(now, 4.0), snapshot(now - Duration::hours(13), 0.0)];
        assert_eq!(growth_percent(&history, gap()), 0.0);
    }

    #[test]
    fn growth_series_caps_at_five_points_newest_first() {
        let now = Utc::now();
        let history: Vec<Snapshot> = (0..8)
            .map(|i| snapshot(now - Duration::hours(i64::from(i)), f64::from(i)))
            .collect();
        let series = growth_series(&history);
        assert_eq!(series.len(), 5);
        assert_eq!(series[0].captured_at, now);
        assert!(series.windows(2).all(|w| w[0].captured_at > w[1].captured_at));
    }
}
