//! `/health` and request plumbing

use serde_json::Value;
use verdant::testing::{self, TestApp};

#[tokio::test]
async fn test_health_reports_database() {
    let app = TestApp::new().await;

    let body: Value = testing::get(app.router(), "/health")
        .execute()
        .await
        .assert_ok()
        .assert_json()
        .json()
        .await;

    assert_eq!(body["status"], "healthy");
    let names: Vec<&str> = body["checks"]
        .as_array()
        .unwrap()
        .iter()
        .map(|c| c["name"].as_str().unwrap())
        .collect();
    assert!(names.contains(&"database"));
}

#[tokio::test]
async fn test_request_id_is_generated_and_propagated() {
    let app = TestApp::new().await;

    let response = testing::get(app.router(), "/health").execute().await;
    assert!(response.header_value("x-request-id").is_some());

    testing::get(app.router(), "/health")
        .header("x-request-id", "req-123")
        .execute()
        .await
        .assert_header("x-request-id", "req-123");
}

#[tokio::test]
async fn test_errors_carry_an_error_id() {
    let app = TestApp::new().await;

    let body: Value = testing::get(app.router(), "/api/auth/me")
        .execute()
        .await
        .assert_unauthorized()
        .json()
        .await;

    assert!(body["error"].is_string());
    assert!(!body["error_id"].as_str().unwrap().is_empty());
}
