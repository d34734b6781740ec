mod common;

use common::{TestEnvironment, API_PATH};
use mcp_fatsecret::FatSecretError;
use pretty_assertions::assert_eq;
use serde_json::json;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, ResponseTemplate};

#[tokio::test]
async fn test_get_food_details() {
    let env = TestEnvironment::new().await;
    env.mount_token("tok123", 1).await;

    Mock::given(method("GET"))
        .and(path(API_PATH))
        .and(query_param("method", "food.get"))
        .and(query_param("food_id", "33691"))
        .and(query_param("format", "json"))
        .and(query_param("oauth_token", "tok123"))
        .respond_with(ResponseTemplate::new(200).set_body_json(common::details_body(
            "33691",
            "Banana",
            json!([
                {
                    "calories": "105",
                    "serving_description": "1 medium (7\" to 7-7/8\" long)",
                    "metric_serving_amount": "118.000",
                    "metric_serving_unit": "g",
                    "protein": "1.29",
                    "carbohydrate": "26.95",
                    "fat": "0.39"
                },
                {"calories": "89", "serving_description": "100 g"}
            ]),
        )))
        .expect(1)
        .mount(&env.server)
        .await;

    let details = env.client().get_food("33691").await.expect("details should load");

    assert_eq!(details.id, "33691");
    assert_eq!(details.name, "Banana");
    assert_eq!(details.servings.len(), 2);

    let first = details.first_serving().expect("first serving");
    assert_eq!(first.calories, "105");
    assert_eq!(first.metric_amount.as_deref(), Some("118.000"));
    assert_eq!(first.fat.as_deref(), Some("0.39"));

    let second = &details.servings[1];
    assert_eq!(second.serving_description, "100 g");
    assert_eq!(second.protein, None);
    assert_eq!(second.metric_unit, None);
}

#[tokio::test]
async fn test_get_food_with_no_servings() {
    let env = TestEnvironment::new().await;
    env.mount_token("tok123", 1).await;
    env.mount_details("1", common::details_body("1", "Water", json!([]))).await;

    let details = env.client().get_food("1").await.expect("details should load");

    assert!(details.servings.is_empty());
    assert!(details.first_serving().is_none());
}

#[tokio::test]
async fn test_get_food_with_single_serving_object() {
    let env = TestEnvironment::new().await;
    env.mount_token("tok123", 1).await;
    env.mount_details(
        "7",
        common::details_body(
            "7",
            "Cola",
            json!({"calories": "140", "serving_description": "1 can"}),
        ),
    )
    .await;

    let details = env.client().get_food("7").await.expect("details should load");

    assert_eq!(details.servings.len(), 1);
    assert_eq!(details.servings[0].serving_description, "1 can");
}

#[tokio::test]
async fn test_get_food_unknown_id() {
    let env = TestEnvironment::new().await;
    env.mount_token("tok123", 1).await;
    env.mount_details(
        "999",
        json!({"error": {"code": 106, "message": "Invalid ID: food_id '999' does not exist"}}),
    )
    .await;

    let client = env.client();
    let result = client.get_food("999").await;

    assert!(matches!(result, Err(FatSecretError::InvalidResponse(_))));
    // Not a token problem, so the cached token survives
    assert!(client.auth().is_authenticated().await);
}

#[tokio::test]
async fn test_get_food_missing_required_field() {
    let env = TestEnvironment::new().await;
    env.mount_token("tok123", 1).await;
    env.mount_details("1", json!({"food": {"food_name": "No id"}})).await;

    let result = env.client().get_food("1").await;
    assert!(matches!(result, Err(FatSecretError::InvalidResponse(_))));
}

#[tokio::test]
async fn test_search_then_details_chain() {
    let env = TestEnvironment::new().await;
    env.mount_token("tok123", 1).await;
    env.mount_search("tok123", common::search_body(&["12", "13"])).await;
    env.mount_details(
        "12",
        common::details_body("12", "Food 12", json!([{"calories": "10", "serving_description": "1 cup"}])),
    )
    .await;
    env.mount_details(
        "13",
        common::details_body("13", "Food 13", json!([{"calories": "20", "serving_description": "1 bowl"}])),
    )
    .await;

    let client = env.client();
    let foods = client.search_foods("012345678905").await.expect("search");

    // One search, details for several candidates
    let mut names = Vec::new();
    for food in &foods {
        names.push(client.get_food(&food.id).await.expect("details").name);
    }

    assert_eq!(names, vec!["Food 12".to_string(), "Food 13".to_string()]);
    assert_eq!(env.token_requests().await, 1);
}
