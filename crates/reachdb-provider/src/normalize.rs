//! The single wire-to-domain mapping step.
//!
//! Every defaulting decision (missing captions, absent URLs, zeroed counts)
//! lives here so the rest of the system only ever sees the domain types.

use reachdb_core::{Comment, Post, ProfileBundle, RawProfile};

use crate::types::{CommentItem, PostItem, ProfileItem};

/// Map a profile-scraper item into the domain [`ProfileBundle`].
///
/// Posts are truncated to `post_limit`. `engagement_percent` fields are left
/// at zero — engagement is derived downstream from likes/comments/followers.
/// A post without a `url` gets one synthesized from its short code, matching
/// the provider's permalink scheme.
#[must_use]
pub fn normalize_profile(item: ProfileItem, post_limit: usize) -> ProfileBundle {
    let full_name = item
        .full_name
        .filter(|name| !name.is_empty())
        .unwrap_or_else(|| item.username.clone());

    let posts: Vec<Post> = item
        .latest_posts
        .into_iter()
        .take(post_limit)
        .map(normalize_post)
        .collect();

    let profile = RawProfile {
        username: item.username,
        full_name,
        followers: item.followers_count,
        following: item.follows_count,
        posts_count: if item.posts_count > 0 {
            item.posts_count
        } else {
            i64::try_from(posts.len()).unwrap_or(0)
        },
        bio: item.biography.unwrap_or_default(),
        profile_pic_url: item.profile_pic_url,
        engagement_percent: 0.0,
    };

    ProfileBundle { profile, posts }
}

fn normalize_post(item: PostItem) -> Post {
    let url = item.url.or_else(|| {
        item.short_code
            .as_ref()
            .map(|code| format!("https://www.instagram.com/p/{code}/"))
    });

    Post {
        id: item
            .id
            .or_else(|| item.short_code.clone())
            .unwrap_or_default(),
        short_code: item.short_code,
        caption: item.caption_text.unwrap_or_default(),
        likes: item.likes_count,
        comments_count: item.comments_count,
        url,
        display_url: item.display_url,
        engagement_percent: 0.0,
        taken_at: item.timestamp,
    }
}

/// Map comment-scraper items into domain [`Comment`]s, dropping textless ones.
#[must_use]
pub fn normalize_comments(items: Vec<CommentItem>) -> Vec<Comment> {
    items
        .into_iter()
        .filter_map(|item| {
            let text = item.text.filter(|t| !t.is_empty())?;
            Some(Comment {
                text,
                author: item.owner_username.unwrap_or_default(),
                likes: item.likes_count,
                posted_at: item.timestamp,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn post_item(short_code: Option<&str>, url: Option<&str>) -> PostItem {
        PostItem {
            id: Some("p1".to_string()),
            short_code: short_code.map(ToString::to_string),
            caption_text: Some("caption".to_string()),
            likes_count: 10,
            comments_count: 2,
            url: url.map(ToString::to_string),
            display_url: None,
            timestamp: None,
        }
    }

    #[test]
    fn full_name_falls_back_to_username() {
        let bundle = normalize_profile(
            ProfileItem {
                username: "acme".to_string(),
                full_name: Some(String::new()),
                followers_count: 1,
                follows_count: 1,
                posts_count: 0,
                biography: None,
                profile_pic_url: None,
                latest_posts: vec![],
            },
            10,
        );
        assert_eq!(bundle.profile.full_name, "acme");
    }

    #[test]
    fn posts_are_truncated_to_limit() {
        let bundle = normalize_profile(
            ProfileItem {
                username: "acme".to_string(),
                full_name: None,
                followers_count: 1,
                follows_count: 1,
                posts_count: 0,
                biography: None,
                profile_pic_url: None,
                latest_posts: (0..5).map(|_| post_item(Some("abc"), None)).collect(),
            },
            3,
        );
        assert_eq!(bundle.posts.len(), 3);
        assert_eq!(bundle.profile.posts_count, 3);
    }

    #[test]
    fn post_url_synthesized_from_short_code() {
        let bundle = normalize_profile(
            ProfileItem {
                username: "acme".to_string(),
                full_name: None,
                followers_count: 1,
                follows_count: 1,
                posts_count: 1,
                biography: None,
                profile_pic_url: None,
                latest_posts: vec![post_item(Some("xyz9"), None)],
            },
            10,
        );
        assert_eq!(
            bundle.posts[0].url.as_deref(),
            Some("https://www.instagram.com/p/xyz9/")
        );
    }

    #[test]
    fn explicit_post_url_wins() {
        let bundle = normalize_profile(
            ProfileItem {
                username: "acme".to_string(),
                full_name: None,
                followers_count: 1,
                follows_count: 1,
                posts_count: 1,
                biography: None,
                profile_pic_url: None,
                latest_posts: vec![post_item(Some("xyz9"), Some("https://example.com/p/1"))],
            },
            10,
        );
        assert_eq!(bundle.posts[0].url.as_deref(), Some("https://example.com/p/1"));
    }

    #[test]
    fn textless_comments_are_dropped() {
        let comments = normalize_comments(vec![
            CommentItem {
                text: Some("nice".to_string()),
                owner_username: Some("fan".to_string()),
                likes_count: 3,
                timestamp: None,
            },
            CommentItem {
                text: None,
                owner_username: Some("ghost".to_string()),
                likes_count: 0,
                timestamp: None,
            },
            CommentItem {
                text: Some(String::new()),
                owner_username: None,
                likes_count: 0,
                timestamp: None,
            },
        ]);
        assert_eq!(comments.len(), 1);
        assert_eq!(comments[0].text, "nice");
        assert_eq!(comments[0].author, "fan");
    }
}
