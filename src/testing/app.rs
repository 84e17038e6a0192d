//! A fully wired application on a fresh in-memory database.

use axum::Router;
use serde_json::json;

use super::{TestDb, fake, scenario};
use crate::app::AppContext;
use crate::auth::{AuthConfig, PasswordConfig};
use crate::config::Config;
use crate::core::App;

pub const TEST_JWT_SECRET: &str = "test-secret-that-is-at-least-32-bytes-long";

/// An authenticated caller
#[derive(Debug, Clone)]
pub struct Session {
    pub token: String,
    pub user_id: String,
    pub organization_id: String,
    pub email: String,
    pub password: String,
}

pub struct TestApp {
    router: Router,
    context: AppContext,
}

impl TestApp {
    pub async fn new() -> Self {
        let db = TestDb::new().await.unwrap();

        let mut auth = AuthConfig::with_secret(TEST_JWT_SECRET);
        auth.cookie_secure = false;

        let context = AppContext::builder()
            .with_database(db.into_connection())
            .with_auth(auth.clone())
            .with_password_config(PasswordConfig::fast())
            .build()
            .unwrap();

        let config = Config {
            auth,
            ..Config::default()
        };

        let router = App::builder()
            .with_config(config)
            .with_context(context.clone())
            .build()
            .unwrap()
            .into_test_router();

        Self { router, context }
    }

    /// A clone of the router, ready for one scenario
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    pub fn context(&self) -> &AppContext {
        &self.context
    }

    /// Register a new organization and return its admin's session
    pub async fn register(&self) -> Session {
        self.register_named(&fake::organization_name()).await
    }

    pub async fn register_named(&self, organization_name: &str) -> Session {
        let email = fake::email();
        let password = fake::password();

        let body: serde_json::Value = scenario::post(self.router(), "/api/auth/register")
            .json_body(&json!({
                "organization_name": organization_name,
                "name": fake::name(),
                "email": email,
                "password": password,
            }))
            .execute()
            .await
            .assert_created()
            .json()
            .await;

        session_from(&body, email, password)
    }

    /// Add a member to the admin's organization and log them in
    pub async fn add_member(&self, admin: &Session) -> Session {
        let email = fake::email();
        let password = fake::password();

        scenario::post(self.router(), "/api/users")
            .bearer_token(&admin.token)
            .json_body(&json!({
                "email": email,
                "name": fake::name(),
                "password": password,
                "role": "member",
            }))
            .execute()
            .await
            .assert_created();

        self.login(&email, &password).await
    }

    pub async fn login(&self, email: &str, password: &str) -> Session {
        let body: serde_json::Value = scenario::post(self.router(), "/api/auth/login")
            .json_body(&json!({"email": email, "password": password}))
            .execute()
            .await
            .assert_ok()
            .json()
            .await;

        session_from(&body, email.to_string(), password.to_string())
    }

    /// POST `body` to `uri` as `session` and return the created `id`
    pub async fn create(&self, session: &Session, uri: &str, body: serde_json::Value) -> String {
        let created: serde_json::Value = scenario::post(self.router(), uri)
            .bearer_token(&session.token)
            .json_body(&body)
            .execute()
            .await
            .assert_created()
            .json()
            .await;

        created["id"].as_str().unwrap().to_string()
    }
}

fn session_from(body: &serde_json::Value, email: String, password: String) -> Session {
    Session {
        token: body["token"].as_str().unwrap().to_string(),
        user_id: body["user"]["id"].as_str().unwrap().to_string(),
        organization_id: body["organization"]["id"].as_str().unwrap().to_string(),
        email,
        password,
    }
}
