//! Typed wire shapes for the actor-run provider API.
//!
//! These mirror the provider's JSON verbatim (camelCase field names); the
//! mapping into domain types happens once, in [`crate::normalize`].

use chrono::{DateTime, Utc};
use serde::Deserialize;

/// Envelope wrapping run metadata: `{"data": {...}}`.
#[derive(Debug, Deserialize)]
pub struct RunEnvelope {
    pub data: ActorRun,
}

/// Metadata for one actor run.
#[derive(Debug, Deserialize)]
pub struct ActorRun {
    pub id: String,
    pub status: String,
    #[serde(rename = "defaultDatasetId")]
    pub default_dataset_id: Option<String>,
    #[serde(rename = "errorMessage")]
    pub error_message: Option<String>,
}

impl ActorRun {
    /// True once the run will make no further progress.
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        self.succeeded() || self.failed()
    }

    #[must_use]
    pub fn succeeded(&self) -> bool {
        self.status == "SUCCEEDED"
    }

    #[must_use]
    pub fn failed(&self) -> bool {
        matches!(self.status.as_str(), "FAILED" | "ABORTED" | "TIMED-OUT")
    }
}

/// One profile item from the profile-scraper dataset.
#[derive(Debug, Deserialize)]
pub struct ProfileItem {
    pub username: String,
    #[serde(rename = "fullName", default)]
    pub full_name: Option<String>,
    #[serde(rename = "followersCount", default)]
    pub followers_count: i64,
    #[serde(rename = "followsCount", default)]
    pub follows_count: i64,
    #[serde(rename = "postsCount", default)]
    pub posts_count: i64,
    #[serde(default)]
    pub biography: Option<String>,
    #[serde(rename = "profilePicUrl", default)]
    pub profile_pic_url: Option<String>,
    #[serde(rename = "latestPosts", default)]
    pub latest_posts: Vec<PostItem>,
}

/// One post entry nested in a profile item.
#[derive(Debug, Deserialize)]
pub struct PostItem {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(rename = "shortCode", default)]
    pub short_code: Option<String>,
    #[serde(rename = "captionText", default)]
    pub caption_text: Option<String>,
    #[serde(rename = "likesCount", default)]
    pub likes_count: i64,
    #[serde(rename = "commentsCount", default)]
    pub comments_count: i64,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(rename = "displayUrl", default)]
    pub display_url: Option<String>,
    #[serde(default)]
    pub timestamp: Option<DateTime<Utc>>,
}

/// One comment item from the comment-scraper dataset.
#[derive(Debug, Deserialize)]
pub struct CommentItem {
    #[serde(default)]
    pub text: Option<String>,
    #[serde(rename = "ownerUsername", default)]
    pub owner_username: Option<String>,
    #[serde(rename = "likesCount", default)]
    pub likes_count: i64,
    #[serde(default)]
    pub timestamp: Option<DateTime<Utc>>,
}
