use super::*;

fn test_client(base_url: &str) -> ApifyClient {
    ApifyClient::with_base_url("test-token", 30, base_url)
        .expect("client construction should not fail")
}

#[test]
fn endpoint_joins_relative_paths() {
    let client = test_client("https://api.apify.com");
    let url = client.endpoint("v2/acts/apify~instagram-profile-scraper/runs");
    assert_eq!(
        url.as_str(),
        "https://api.apify.com/v2/acts/apify~instagram-profile-scraper/runs"
    );
}

#[test]
fn endpoint_tolerates_trailing_slash_in_base() {
    let client = test_client("https://api.apify.com/");
    let url = client.endpoint("v2/actor-runs/run-1");
    assert_eq!(url.as_str(), "https://api.apify.com/v2/actor-runs/run-1");
}

#[test]
fn invalid_base_url_is_rejected() {
    let result = ApifyClient::with_base_url("t", 30, "not a url");
    assert!(matches!(
        result,
        Err(ProviderError::InvalidBaseUrl { .. })
    ));
}

#[tokio::test]
async fn fetch_comments_short_circuits_on_empty_urls() {
    let client = test_client("https://api.apify.com");
    let comments = client.fetch_comments(&[], 5).await.expect("empty fetch");
    assert!(comments.is_empty());
}
