#![allow(dead_code)]

use std::time::Duration;

use mcp_fatsecret::{FatSecretClient, FatSecretConfig};
use serde_json::json;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub const CLIENT_ID: &str = "test-id";
pub const CLIENT_SECRET: &str = "test-secret";
/// `base64("test-id:test-secret")`
pub const BASIC_AUTH: &str = "Basic dGVzdC1pZDp0ZXN0LXNlY3JldA==";
pub const TOKEN_PATH: &str = "/connect/token";
pub const API_PATH: &str = "/rest/server.api";

/// A mock FatSecret deployment: token endpoint and food API on one server.
pub struct TestEnvironment {
    pub server: MockServer,
}

impl TestEnvironment {
    pub async fn new() -> Self {
        init_test_logging();
        Self {
            server: MockServer::start().await,
        }
    }

    pub fn config(&self) -> FatSecretConfig {
        FatSecretConfig::new(CLIENT_ID, CLIENT_SECRET)
            .with_token_url(format!("{}{}", self.server.uri(), TOKEN_PATH))
            .with_api_url(format!("{}{}", self.server.uri(), API_PATH))
            .with_request_timeout(Duration::from_secs(5))
    }

    pub fn client(&self) -> FatSecretClient {
        FatSecretClient::new(self.config()).expect("valid test configuration")
    }

    /// Token endpoint that hands out `token`, expected exactly `times` times.
    pub async fn mount_token(&self, token: &str, times: u64) {
        Mock::given(method("POST"))
            .and(path(TOKEN_PATH))
            .respond_with(ResponseTemplate::new(200).set_body_json(token_body(token, 86400)))
            .expect(times)
            .mount(&self.server)
            .await;
    }

    /// `foods.search` answering `body` for requests carrying `token`.
    pub async fn mount_search(&self, token: &str, body: serde_json::Value) {
        Mock::given(method("GET"))
            .and(path(API_PATH))
            .and(query_param("method", "foods.search"))
            .and(query_param("oauth_token", token))
            .respond_with(ResponseTemplate::new(200).set_body_json(body))
            .mount(&self.server)
            .await;
    }

    /// `food.get` answering `body` for `food_id`.
    pub async fn mount_details(&self, food_id: &str, body: serde_json::Value) {
        Mock::given(method("GET"))
            .and(path(API_PATH))
            .and(query_param("method", "food.get"))
            .and(query_param("food_id", food_id))
            .respond_with(ResponseTemplate::new(200).set_body_json(body))
            .mount(&self.server)
            .await;
    }

    pub async fn token_requests(&self) -> usize {
        self.server
            .received_requests()
            .await
            .unwrap_or_default()
            .iter()
            .filter(|r| r.url.path() == TOKEN_PATH)
            .count()
    }
}

pub fn token_body(token: &str, expires_in: i64) -> serde_json::Value {
    json!({
        "access_token": token,
        "expires_in": expires_in,
        "token_type": "Bearer"
    })
}

pub fn search_body(ids: &[&str]) -> serde_json::Value {
    let foods: Vec<serde_json::Value> = ids
        .iter()
        .map(|id| {
            json!({
                "food_id": id,
                "food_name": format!("Food {id}"),
                "food_description": format!("Per 100g - Food {id}")
            })
        })
        .collect();
    json!({ "foods": { "food": foods } })
}

pub fn details_body(food_id: &str, name: &str, servings: serde_json::Value) -> serde_json::Value {
    json!({
        "food": {
            "food_id": food_id,
            "food_name": name,
            "servings": { "serving": servings }
        }
    })
}

pub fn init_test_logging() {
    let _ = env_logger::builder()
        .filter_level(log::LevelFilter::Debug)
        .is_test(true)
        .try_init();
}
