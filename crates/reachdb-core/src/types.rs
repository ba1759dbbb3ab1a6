//! Domain types shared across the workspace.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Normalized profile record as returned by the data provider.
///
/// `engagement_percent` is derived by the pipeline (mean of per-post
/// engagement), not by the provider.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawProfile {
    pub username: String,
    pub full_name: String,
    pub followers: i64,
    pub following: i64,
    pub posts_count: i64,
    pub bio: String,
    pub profile_pic_url: Option<String>,
    pub engagement_percent: f64,
}

/// One post belonging to a profile.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Post {
    pub id: String,
    pub short_code: Option<String>,
    pub caption: String,
    pub likes: i64,
    pub comments_count: i64,
    /// Permalink to the post; used to request comments.
    pub url: Option<String>,
    pub display_url: Option<String>,
    pub engagement_percent: f64,
    pub taken_at: Option<DateTime<Utc>>,
}

/// One comment on a post.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Comment {
    pub text: String,
    pub author: String,
    pub likes: i64,
    pub posted_at: Option<DateTime<Utc>>,
}

/// Profile plus posts, as produced by one provider fetch.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProfileBundle {
    pub profile: RawProfile,
    pub posts: Vec<Post>,
}

/// Sentiment breakdown over a comment corpus.
///
/// Percentages of comments classified positive/neutral/negative; the three
/// fields sum to ~100 for a non-empty corpus and are all zero otherwise.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct SentimentBreakdown {
    pub positive: f64,
    pub neutral: f64,
    pub negative: f64,
}

impl SentimentBreakdown {
    /// The all-zero breakdown used for empty input and scorer recovery.
    #[must_use]
    pub fn zero() -> Self {
        Self::default()
    }

    /// True when no comment produced any classification.
    #[must_use]
    pub fn is_zero(&self) -> bool {
        self.positive == 0.0 && self.neutral == 0.0 && self.negative == 0.0
    }
}

/// One immutable, timestamped measurement of a profile's derived metrics.
///
/// Append-only; unique on `(profile_key, captured_at)`. Created only by the
/// pipeline executor at the end of a successful run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Snapshot {
    pub profile_key: String,
    pub captured_at: DateTime<Utc>,
    pub profile: RawProfile,
    pub posts: Vec<Post>,
    pub engagement_percent: f64,
    pub growth_percent: f64,
    pub followers: i64,
    pub comments: Vec<Comment>,
    pub sentiment: SentimentBreakdown,
}

/// One point of the growth series drawn from snapshot history.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GrowthPoint {
    pub captured_at: DateTime<Utc>,
    pub followers: i64,
    pub engagement_percent: f64,
}

impl From<&Snapshot> for GrowthPoint {
    fn from(snapshot: &Snapshot) -> Self {
        Self {
            captured_at: snapshot.captured_at,
            followers: snapshot.followers,
            engagement_percent: snapshot.engagement_percent,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sentiment_zero_is_zero() {
        assert!(SentimentBreakdown::zero().is_zero());
        assert!(!SentimentBreakdown {
            positive: 50.0,
            neutral: 50.0,
            negative: 0.0,
        }
        .is_zero());
    }

    #[test]
    fn snapshot_is_serializable() {
        let snapshot = Snapshot {
            profile_key: "acme".to_string(),
            captured_at: Utc::now(),
            profile: RawProfile {
                username: "acme".to_string(),
                full_name: "Acme Co".to_string(),
                followers: 1_000,
                following: 10,
                posts_count: 2,
                bio: String::new(),
                profile_pic_url: None,
                engagement_percent: 4.2,
            },
            posts: vec![],
            engagement_percent: 4.2,
            growth_percent: 0.0,
            followers: 1_000,
            comments: vec![],
            sentiment: SentimentBreakdown::zero(),
        };
        let json = serde_json::to_string(&snapshot).expect("serialize");
        assert!(json.contains("\"profile_key\":\"acme\""));
        let back: Snapshot = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(back.followers, 1_000);
    }

    #[test]
    fn growth_point_from_snapshot_copies_scalars() {
        let snapshot = Snapshot {
            profile_key: "acme".to_string(),
            captured_at: Utc::now(),
            profile: RawProfile {
                username: "acme".to_string(),
                full_name: String::new(),
                followers: 7,
                following: 0,
                posts_count: 0,
                bio: String::new(),
                profile_pic_url: None,
                engagement_percent: 0.0,
            },
            posts: vec![],
            engagement_percent: 1.5,
            growth_percent: 0.0,
            followers: 7,
            comments: vec![],
            sentiment: SentimentBreakdown::zero(),
        };
        let point = GrowthPoint::from(&snapshot);
        assert_eq!(point.followers, 7);
        assert!((point.engagement_percent - 1.5).abs() < f64::EPSILON);
    }
}
