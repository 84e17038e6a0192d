//! Registration, login, cookies and role checks

use axum::http::StatusCode;
use serde_json::{Value, json};
use verdant::testing::{self, TestApp, fake};

#[tokio::test]
async fn test_register_creates_organization_and_admin() {
    let app = TestApp::new().await;

    let response = testing::post(app.router(), "/api/auth/register")
        .json_body(&json!({
            "organization_name": "Acme Recycling",
            "name": "Ada Admin",
            "email": "Ada@Example.com",
            "password": "correct horse battery",
        }))
        .execute()
        .await
        .assert_created();

    let cookie = response.header_value("set-cookie").unwrap();
    assert!(cookie.starts_with("verdant_session="));
    assert!(cookie.contains("HttpOnly"));

    let body: Value = response.json().await;
    assert_eq!(body["token_type"], "Bearer");
    assert!(body["expires_in"].as_u64().unwrap() > 0);
    assert_eq!(body["organization"]["slug"], "acme-recycling");
    assert_eq!(body["user"]["email"], "ada@example.com");
    assert_eq!(body["user"]["role"], "admin");
    assert!(body["user"].get("password_hash").is_none());
}

#[tokio::test]
async fn test_duplicate_email_is_a_conflict() {
    let app = TestApp::new().await;
    let admin = app.register().await;

    testing::post(app.router(), "/api/auth/register")
        .json_body(&json!({
            "organization_name": fake::organization_name(),
            "name": fake::name(),
            "email": admin.email.to_uppercase(),
            "password": fake::password(),
        }))
        .execute()
        .await
        .assert_conflict();
}

#[tokio::test]
async fn test_same_organization_name_gets_distinct_slugs() {
    let app = TestApp::new().await;
    let first = app.register_named("Zero Waste Club").await;
    let second = app.register_named("Zero Waste Club").await;

    let slug = |token: String| {
        let app = &app;
        async move {
            let body: Value = testing::get(app.router(), "/api/organization")
                .bearer_token(&token)
                .execute()
                .await
                .assert_ok()
                .json()
                .await;
            body["slug"].as_str().unwrap().to_string()
        }
    };

    let a = slug(first.token).await;
    let b = slug(second.token).await;
    assert_eq!(a, "zero-waste-club");
    assert_ne!(a, b);
    assert!(b.starts_with("zero-waste-club-"));
}

#[tokio::test]
async fn test_short_password_is_rejected() {
    let app = TestApp::new().await;

    testing::post(app.router(), "/api/auth/register")
        .json_body(&json!({
            "organization_name": "Tiny",
            "name": "T",
            "email": fake::email(),
            "password": "short",
        }))
        .execute()
        .await
        .assert_bad_request();
}

#[tokio::test]
async fn test_login_failures_look_the_same() {
    let app = TestApp::new().await;
    let admin = app.register().await;

    let wrong_password: Value = testing::post(app.router(), "/api/auth/login")
        .json_body(&json!({"email": admin.email, "password": "not-the-password"}))
        .execute()
        .await
        .assert_unauthorized()
        .json()
        .await;

    let unknown_email: Value = testing::post(app.router(), "/api/auth/login")
        .json_body(&json!({"email": fake::email(), "password": "not-the-password"}))
        .execute()
        .await
        .assert_unauthorized()
        .json()
        .await;

    assert_eq!(wrong_password["error"], unknown_email["error"]);
}

#[tokio::test]
async fn test_login_then_me() {
    let app = TestApp::new().await;
    let admin = app.register().await;
    let session = app.login(&admin.email, &admin.password).await;

    let me: Value = testing::get(app.router(), "/api/auth/me")
        .bearer_token(&session.token)
        .execute()
        .await
        .assert_ok()
        .json()
        .await;

    assert_eq!(me["user"]["id"], admin.user_id.as_str());
    assert_eq!(me["organization"]["id"], admin.organization_id.as_str());
}

#[tokio::test]
async fn test_session_cookie_authenticates() {
    let app = TestApp::new().await;
    let admin = app.register().await;

    testing::get(app.router(), "/api/auth/me")
        .cookie("verdant_session", &admin.token)
        .execute()
        .await
        .assert_ok();
}

#[tokio::test]
async fn test_missing_or_bad_token_is_unauthorized() {
    let app = TestApp::new().await;

    testing::get(app.router(), "/api/waste-points")
        .execute()
        .await
        .assert_unauthorized();

    testing::get(app.router(), "/api/waste-points")
        .bearer_token("not.a.jwt")
        .execute()
        .await
        .assert_unauthorized();
}

#[tokio::test]
async fn test_logout_expires_cookie() {
    let app = TestApp::new().await;

    let response = testing::post(app.router(), "/api/auth/logout")
        .execute()
        .await
        .assert_ok();

    let cookie = response.header_value("set-cookie").unwrap();
    assert!(cookie.starts_with("verdant_session="));
    assert!(cookie.contains("Max-Age=0"));
}

#[tokio::test]
async fn test_members_cannot_administer() {
    let app = TestApp::new().await;
    let admin = app.register().await;
    let member = app.add_member(&admin).await;

    testing::post(app.router(), "/api/users")
        .bearer_token(&member.token)
        .json_body(&json!({
            "email": fake::email(),
            "name": fake::name(),
            "password": fake::password(),
        }))
        .execute()
        .await
        .assert_forbidden();

    testing::patch(app.router(), "/api/organization")
        .bearer_token(&member.token)
        .json_body(&json!({"name": "Taken over"}))
        .execute()
        .await
        .assert_forbidden();

    // Members may rename themselves but not promote themselves
    testing::patch(app.router(), &format!("/api/users/{}", member.user_id))
        .bearer_token(&member.token)
        .json_body(&json!({"name": "Renamed Member"}))
        .execute()
        .await
        .assert_ok();

    testing::patch(app.router(), &format!("/api/users/{}", member.user_id))
        .bearer_token(&member.token)
        .json_body(&json!({"role": "admin"}))
        .execute()
        .await
        .assert_forbidden();
}

#[tokio::test]
async fn test_deleted_user_loses_access() {
    let app = TestApp::new().await;
    let admin = app.register().await;
    let member = app.add_member(&admin).await;

    testing::delete(app.router(), &format!("/api/users/{}", member.user_id))
        .bearer_token(&admin.token)
        .execute()
        .await
        .assert_no_content();

    testing::get(app.router(), "/api/auth/me")
        .bearer_token(&member.token)
        .execute()
        .await
        .assert_unauthorized();
}

#[tokio::test]
async fn test_admin_cannot_delete_self() {
    let app = TestApp::new().await;
    let admin = app.register().await;

    let response = testing::delete(app.router(), &format!("/api/users/{}", admin.user_id))
        .bearer_token(&admin.token)
        .execute()
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_admin_cannot_demote_self() {
    let app = TestApp::new().await;
    let admin = app.register().await;
    let member = app.add_member(&admin).await;

    testing::patch(app.router(), &format!("/api/users/{}", admin.user_id))
        .bearer_token(&admin.token)
        .json_body(&json!({"role": "member"}))
        .execute()
        .await
        .assert_bad_request();

    let relogged = app.login(&admin.email, &admin.password).await;
    testing::post(app.router(), "/api/users")
        .bearer_token(&relogged.token)
        .json_body(&json!({
            "email": fake::email(),
            "name": fake::name(),
            "password": fake::password(),
        }))
        .execute()
        .await
        .assert_created();

    // Promoting someone else is still allowed
    testing::patch(app.router(), &format!("/api/users/{}", member.user_id))
        .bearer_token(&admin.token)
        .json_body(&json!({"role": "admin"}))
        .execute()
        .await
        .assert_ok()
        .assert_json_path("role", json!("admin"))
        .await;
}

#[tokio::test]
async fn test_blank_names_are_rejected() {
    let app = TestApp::new().await;
    let admin = app.register().await;

    testing::patch(app.router(), "/api/organization")
        .bearer_token(&admin.token)
        .json_body(&json!({"name": "   "}))
        .execute()
        .await
        .assert_bad_request();

    testing::patch(app.router(), &format!("/api/users/{}", admin.user_id))
        .bearer_token(&admin.token)
        .json_body(&json!({"name": "\t "}))
        .execute()
        .await
        .assert_bad_request();
}

#[tokio::test]
async fn test_password_change_takes_effect() {
    let app = TestApp::new().await;
    let admin = app.register().await;

    testing::patch(app.router(), &format!("/api/users/{}", admin.user_id))
        .bearer_token(&admin.token)
        .json_body(&json!({"password": "a brand new password"}))
        .execute()
        .await
        .assert_ok();

    testing::post(app.router(), "/api/auth/login")
        .json_body(&json!({"email": admin.email, "password": admin.password}))
        .execute()
        .await
        .assert_unauthorized();

    app.login(&admin.email, "a brand new password").await;
}
