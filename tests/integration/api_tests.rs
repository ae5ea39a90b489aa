//! API integration tests
//!
//! Run against a live server with: cargo test --test api_tests -- --ignored
//! The server must share `JWT_SECRET` with these tests.

use chrono::Utc;
use reqwest::{Client, StatusCode};
use serde_json::{json, Value};
use uuid::Uuid;

use locus_server::models::user::UserClaims;

const BASE_URL: &str = "http://localhost:8080/api/v1";
const DEFAULT_SECRET: &str = "change-this-secret-in-production";

fn base_url() -> String {
    std::env::var("LOCUS_BASE_URL").unwrap_or_else(|_| BASE_URL.to_string())
}

/// Sign a token the way the authentication service would
fn sign(sub: Uuid, username: &str, is_staff: bool) -> String {
    let secret = std::env::var("JWT_SECRET").unwrap_or_else(|_| DEFAULT_SECRET.to_string());
    let now = Utc::now().timestamp();
    UserClaims {
        sub,
        username: username.to_string(),
        is_staff,
        exp: now + 3600,
        iat: now,
    }
    .create_token(&secret)
    .expect("Failed to sign token")
}

/// Token for a fresh user
fn token_for(username: &str, is_staff: bool) -> String {
    sign(Uuid::new_v4(), username, is_staff)
}

/// Coordinates unlikely to collide with previous runs
fn unique_coordinates() -> (f64, f64) {
    let bytes = Uuid::new_v4();
    let bytes = bytes.as_bytes();
    let lat = (u16::from_be_bytes([bytes[0], bytes[1]]) as f64 / 65535.0) * 170.0 - 85.0;
    let lon = (u16::from_be_bytes([bytes[2], bytes[3]]) as f64 / 65535.0) * 350.0 - 175.0;
    ((lat * 1e6).round() / 1e6, (lon * 1e6).round() / 1e6)
}

async fn create_category(client: &Client, staff: &str) -> String {
    let response = client
        .post(format!("{}/categories", base_url()))
        .bearer_auth(staff)
        .json(&json!({ "name": format!("Category {}", Uuid::new_v4()) }))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), StatusCode::CREATED);
    let body: Value = response.json().await.expect("Failed to parse response");
    body["id"].as_str().expect("No category id").to_string()
}

async fn post_location(
    client: &Client,
    staff: &str,
    category: &str,
    latitude: f64,
    longitude: f64,
) -> reqwest::Response {
    client
        .post(format!("{}/locations", base_url()))
        .bearer_auth(staff)
        .json(&json!({
            "name": format!("Spot {}", Uuid::new_v4()),
            "description": "Integration test location",
            "category": category,
            "latitude": latitude,
            "longitude": longitude,
            "address": format!("{} Test Street", Uuid::new_v4())
        }))
        .send()
        .await
        .expect("Failed to send request")
}

async fn create_location(client: &Client, staff: &str, category: &str) -> Value {
    let (latitude, longitude) = unique_coordinates();
    let response = post_location(client, staff, category, latitude, longitude).await;
    assert_eq!(response.status(), StatusCode::CREATED);
    response.json().await.expect("Failed to parse response")
}

async fn post_review(client: &Client, token: &str, location_id: &str, rating: i16) -> reqwest::Response {
    client
        .post(format!("{}/locations/{}/reviews", base_url(), location_id))
        .bearer_auth(token)
        .json(&json!({ "title": "Visited", "body": "Nice place", "rating": rating }))
        .send()
        .await
        .expect("Failed to send request")
}

#[tokio::test]
#[ignore] // Run with: cargo test -- --ignored
async fn test_health_check() {
    let client = Client::new();

    let response = client
        .get(format!("{}/health", base_url()))
        .send()
        .await
        .expect("Failed to send request");

    assert!(response.status().is_success());

    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["status"], "healthy");
}

#[tokio::test]
#[ignore]
async fn test_list_locations_with_weather() {
    let client = Client::new();
    let staff = token_for("staff", true);
    let category = create_category(&client, &staff).await;
    let location = create_location(&client, &staff, &category).await;

    let response = client
        .get(format!("{}/locations", base_url()))
        .query(&[("search", location["name"].as_str().unwrap())])
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["count"], 1);
    assert_eq!(body["results"][0]["id"], location["id"]);
    assert!(body["results"][0]["weather"].is_object());
    assert_eq!(body["results"][0]["popularity_score"], 0.0);
}

#[tokio::test]
#[ignore]
async fn test_duplicate_address_is_rejected() {
    let client = Client::new();
    let staff = token_for("staff", true);
    let category = create_category(&client, &staff).await;
    let location = create_location(&client, &staff, &category).await;
    let (latitude, longitude) = unique_coordinates();

    let response = client
        .post(format!("{}/locations", base_url()))
        .bearer_auth(&staff)
        .json(&json!({
            "name": "Another name",
            "description": "",
            "category": category,
            "latitude": latitude,
            "longitude": longitude,
            "address": location["address"]
        }))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body: Value = response.json().await.expect("Failed to parse response");
    assert!(body["fields"]["address"].is_array());
}

#[tokio::test]
#[ignore]
async fn test_detail_counts_views() {
    let client = Client::new();
    let staff = token_for("staff", true);
    let category = create_category(&client, &staff).await;
    let location = create_location(&client, &staff, &category).await;
    let url = format!("{}/locations/{}", base_url(), location["id"].as_str().unwrap());

    for expected in 1..=2 {
        let body: Value = client
            .get(&url)
            .send()
            .await
            .expect("Failed to send request")
            .json()
            .await
            .expect("Failed to parse response");
        assert_eq!(body["view_count"], expected);
        assert!(body["weather"].is_object());
    }
}

#[tokio::test]
#[ignore]
async fn test_deleted_location_is_hidden_from_users() {
    let client = Client::new();
    let staff = token_for("staff", true);
    let category = create_category(&client, &staff).await;
    let location = create_location(&client, &staff, &category).await;
    let url = format!("{}/locations/{}", base_url(), location["id"].as_str().unwrap());

    let response = client
        .delete(&url)
        .bearer_auth(&staff)
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let anonymous = client.get(&url).send().await.expect("Failed to send request");
    assert_eq!(anonymous.status(), StatusCode::NOT_FOUND);

    let body: Value = client
        .get(&url)
        .bearer_auth(&staff)
        .send()
        .await
        .expect("Failed to send request")
        .json()
        .await
        .expect("Failed to parse response");
    assert_eq!(body["is_active"], false);
}

#[tokio::test]
#[ignore]
async fn test_one_review_per_user_and_votes() {
    let client = Client::new();
    let staff = token_for("staff", true);
    let author = token_for("author", false);
    let voter = token_for("voter", false);
    let category = create_category(&client, &staff).await;
    let location = create_location(&client, &staff, &category).await;
    let reviews_url = format!(
        "{}/locations/{}/reviews",
        base_url(),
        location["id"].as_str().unwrap()
    );
    let review = json!({ "title": "Great", "body": "Lovely view", "rating": 5 });

    let response = client
        .post(&reviews_url)
        .bearer_auth(&author)
        .json(&review)
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), StatusCode::CREATED);
    let created: Value = response.json().await.expect("Failed to parse response");

    let duplicate = client
        .post(&reviews_url)
        .bearer_auth(&author)
        .json(&review)
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(duplicate.status(), StatusCode::BAD_REQUEST);

    let votes_url = format!(
        "{}/reviews/{}/votes",
        base_url(),
        created["id"].as_str().unwrap()
    );
    let vote = client
        .post(&votes_url)
        .bearer_auth(&voter)
        .json(&json!({ "vote": 1 }))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(vote.status(), StatusCode::CREATED);
    let vote: Value = vote.json().await.expect("Failed to parse response");

    // Votes are private to their voter
    let foreign = client
        .get(format!("{}/{}", votes_url, vote["id"].as_str().unwrap()))
        .bearer_auth(&author)
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(foreign.status(), StatusCode::NOT_FOUND);

    let detail: Value = client
        .get(format!("{}/{}", reviews_url, created["id"].as_str().unwrap()))
        .send()
        .await
        .expect("Failed to send request")
        .json()
        .await
        .expect("Failed to parse response");
    assert_eq!(detail["upvote_count"], 1);
    assert_eq!(detail["downvote_count"], 0);
}

#[tokio::test]
#[ignore]
async fn test_duplicate_coordinates_are_rejected() {
    let client = Client::new();
    let staff = token_for("staff", true);
    let category = create_category(&client, &staff).await;
    let (latitude, longitude) = unique_coordinates();

    let first = post_location(&client, &staff, &category, latitude, longitude).await;
    assert_eq!(first.status(), StatusCode::CREATED);

    let second = post_location(&client, &staff, &category, latitude, longitude).await;
    assert_eq!(second.status(), StatusCode::BAD_REQUEST);
    let body: Value = second.json().await.expect("Failed to parse response");
    assert!(body["fields"]["latitude"].is_array());
}

#[tokio::test]
#[ignore]
async fn test_popularity_score_on_detail() {
    let client = Client::new();
    let staff = token_for("staff", true);
    let author = token_for("author", false);
    let category = create_category(&client, &staff).await;
    let location = create_location(&client, &staff, &category).await;
    let id = location["id"].as_str().unwrap();

    let review = post_review(&client, &author, id, 3).await;
    assert_eq!(review.status(), StatusCode::CREATED);

    // First detail view: average 3, one review, one view
    let body: Value = client
        .get(format!("{}/locations/{}", base_url(), id))
        .send()
        .await
        .expect("Failed to send request")
        .json()
        .await
        .expect("Failed to parse response");
    assert_eq!(body["view_count"], 1);
    assert_eq!(body["review_count"], 1);
    assert_eq!(body["average_rating"], 3.0);
    assert_eq!(body["popularity_score"], 2.2);
}

#[tokio::test]
#[ignore]
async fn test_reviews_survive_soft_delete() {
    let client = Client::new();
    let staff = token_for("staff", true);
    let author = token_for("author", false);
    let category = create_category(&client, &staff).await;
    let location = create_location(&client, &staff, &category).await;
    let id = location["id"].as_str().unwrap();

    let review = post_review(&client, &author, id, 4).await;
    assert_eq!(review.status(), StatusCode::CREATED);

    let response = client
        .delete(format!("{}/locations/{}", base_url(), id))
        .bearer_auth(&staff)
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let body: Value = client
        .get(format!("{}/locations/{}/reviews", base_url(), id))
        .bearer_auth(&staff)
        .send()
        .await
        .expect("Failed to send request")
        .json()
        .await
        .expect("Failed to parse response");
    assert_eq!(body["count"], 1);
    assert_eq!(body["results"][0]["rating"], 4);
}

#[tokio::test]
#[ignore]
async fn test_users_may_share_a_username() {
    let client = Client::new();
    let staff = token_for("staff", true);
    let category = create_category(&client, &staff).await;
    let location = create_location(&client, &staff, &category).await;
    let id = location["id"].as_str().unwrap();

    // Two accounts carrying the same name, e.g. after a rename upstream
    let first = sign(Uuid::new_v4(), "ann", false);
    let second = sign(Uuid::new_v4(), "ann", false);

    let response = post_review(&client, &first, id, 5).await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let response = post_review(&client, &second, id, 2).await;
    assert_eq!(response.status(), StatusCode::CREATED);
}
