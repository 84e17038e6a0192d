//! In-process HTTP scenarios: build a request, run it through the router with
//! `oneshot`, then assert on the response.
//!
//! ```rust,ignore
//! let body: serde_json::Value = testing::get(app.router(), "/api/waste-points")
//!     .bearer_token(&session.token)
//!     .execute()
//!     .await
//!     .assert_ok()
//!     .json()
//!     .await;
//! ```

use axum::{
    Router,
    body::Body,
    http::{HeaderName, Method, Request, StatusCode, header},
    response::Response,
};
use serde::{Serialize, de::DeserializeOwned};
use tower::ServiceExt;

pub struct Scenario {
    app: Router,
    request: Request<Body>,
}

impl Scenario {
    pub fn new(app: Router) -> Self {
        Self {
            app,
            request: Request::builder()
                .method(Method::GET)
                .uri("/")
                .body(Body::empty())
                .unwrap(),
        }
    }

    pub fn method(mut self, method: Method) -> Self {
        *self.request.method_mut() = method;
        self
    }

    pub fn uri(mut self, uri: &str) -> Self {
        *self.request.uri_mut() = uri.parse().unwrap();
        self
    }

    pub fn header(mut self, key: &str, value: &str) -> Self {
        self.request.headers_mut().insert(
            HeaderName::from_bytes(key.as_bytes()).unwrap(),
            value.parse().unwrap(),
        );
        self
    }

    pub fn bearer_token(self, token: &str) -> Self {
        self.header("authorization", &format!("Bearer {}", token))
    }

    /// Send `name=value` as the request's Cookie header
    pub fn cookie(self, name: &str, value: &str) -> Self {
        self.header("cookie", &format!("{}={}", name, value))
    }

    /// Append percent-encoded query parameters
    pub fn with_query(mut self, params: &[(&str, &str)]) -> Self {
        let uri = self.request.uri().clone();
        let mut parts: Vec<String> = uri.query().map(str::to_string).into_iter().collect();

        parts.extend(params.iter().map(|(key, value)| {
            format!("{}={}", urlencoding::encode(key), urlencoding::encode(value))
        }));

        let new_uri = if parts.is_empty() {
            uri.path().to_string()
        } else {
            format!("{}?{}", uri.path(), parts.join("&"))
        };
        *self.request.uri_mut() = new_uri.parse().unwrap();
        self
    }

    pub fn json_body<T: Serialize>(mut self, body: &T) -> Self {
        *self.request.body_mut() = Body::from(serde_json::to_vec(body).unwrap());
        self.request.headers_mut().insert(
            header::CONTENT_TYPE,
            "application/json".parse().unwrap(),
        );
        self
    }

    /// Raw body, no content type
    pub fn text_body(mut self, body: impl Into<String>) -> Self {
        *self.request.body_mut() = Body::from(body.into());
        self
    }

    pub async fn execute(self) -> ScenarioAssert {
        let response = self.app.oneshot(self.request).await.unwrap();
        ScenarioAssert { response }
    }
}

pub struct ScenarioAssert {
    response: Response,
}

impl ScenarioAssert {
    pub fn status(&self) -> StatusCode {
        self.response.status()
    }

    pub fn header_value(&self, key: &str) -> Option<String> {
        self.response
            .headers()
            .get(key)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string)
    }

    pub fn assert_status(self, expected: StatusCode) -> Self {
        assert_eq!(
            self.response.status(),
            expected,
            "expected status {}, got {}",
            expected,
            self.response.status()
        );
        self
    }

    pub fn assert_ok(self) -> Self {
        self.assert_status(StatusCode::OK)
    }

    pub fn assert_created(self) -> Self {
        self.assert_status(StatusCode::CREATED)
    }

    pub fn assert_no_content(self) -> Self {
        self.assert_status(StatusCode::NO_CONTENT)
    }

    pub fn assert_bad_request(self) -> Self {
        self.assert_status(StatusCode::BAD_REQUEST)
    }

    pub fn assert_unauthorized(self) -> Self {
        self.assert_status(StatusCode::UNAUTHORIZED)
    }

    pub fn assert_forbidden(self) -> Self {
        self.assert_status(StatusCode::FORBIDDEN)
    }

    pub fn assert_not_found(self) -> Self {
        self.assert_status(StatusCode::NOT_FOUND)
    }

    pub fn assert_conflict(self) -> Self {
        self.assert_status(StatusCode::CONFLICT)
    }

    pub fn assert_header(self, key: &str, expected: &str) -> Self {
        let value = self
            .header_value(key)
            .unwrap_or_else(|| panic!("header '{}' not found", key));
        assert_eq!(value, expected, "header '{}' mismatch", key);
        self
    }

    pub fn assert_json(self) -> Self {
        let content_type = self
            .header_value(header::CONTENT_TYPE.as_str())
            .unwrap_or_default();
        assert!(
            content_type.contains("application/json"),
            "expected JSON content type, got '{}'",
            content_type
        );
        self
    }

    pub async fn body_bytes(self) -> Vec<u8> {
        axum::body::to_bytes(self.response.into_body(), usize::MAX)
            .await
            .unwrap()
            .to_vec()
    }

    pub async fn body_string(self) -> String {
        String::from_utf8(self.body_bytes().await).unwrap()
    }

    pub async fn json<T: DeserializeOwned>(self) -> T {
        let bytes = self.body_bytes().await;
        serde_json::from_slice(&bytes).unwrap_or_else(|e| {
            panic!(
                "response is not the expected JSON ({}): {}",
                e,
                String::from_utf8_lossy(&bytes)
            )
        })
    }

    /// Assert a dotted path (`"pagination.total"`, `"columns.0.count"`)
    pub async fn assert_json_path(self, path: &str, expected: serde_json::Value) -> Self {
        let status = self.response.status();
        let headers = self.response.headers().clone();
        let bytes = self.body_bytes().await;
        let json: serde_json::Value = serde_json::from_slice(&bytes).unwrap();

        let actual = json_path_get(&json, path)
            .unwrap_or_else(|| panic!("path '{}' not found in {}", path, json));
        assert_eq!(actual, &expected, "JSON path '{}' mismatch", path);

        let mut response = Response::new(Body::from(bytes));
        *response.status_mut() = status;
        *response.headers_mut() = headers;
        Self { response }
    }

    pub fn into_response(self) -> Response {
        self.response
    }
}

fn json_path_get<'a>(json: &'a serde_json::Value, path: &str) -> Option<&'a serde_json::Value> {
    path.split('.').try_fold(json, |current, part| match part.parse::<usize>() {
        Ok(index) => current.get(index),
        Err(_) => current.get(part),
    })
}

pub fn get(app: Router, uri: &str) -> Scenario {
    Scenario::new(app).method(Method::GET).uri(uri)
}

pub fn post(app: Router, uri: &str) -> Scenario {
    Scenario::new(app).method(Method::POST).uri(uri)
}

pub fn put(app: Router, uri: &str) -> Scenario {
    Scenario::new(app).method(Method::PUT).uri(uri)
}

pub fn patch(app: Router, uri: &str) -> Scenario {
    Scenario::new(app).method(Method::PATCH).uri(uri)
}

pub fn delete(app: Router, uri: &str) -> Scenario {
    Scenario::new(app).method(Method::DELETE).uri(uri)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{Json, extract::Query, routing::get as axum_get};
    use serde_json::json;
    use std::collections::HashMap;

    async fn echo(Query(params): Query<HashMap<String, String>>) -> Json<serde_json::Value> {
        Json(json!({"params": params, "items": [{"name": "bin"}]}))
    }

    fn app() -> Router {
        Router::new().route("/echo", axum_get(echo))
    }

    #[tokio::test]
    async fn test_query_params_are_encoded() {
        let body: serde_json::Value = get(app(), "/echo")
            .with_query(&[("waste_type", "organic"), ("q", "a b")])
            .execute()
            .await
            .assert_ok()
            .assert_json()
            .json()
            .await;

        assert_eq!(body["params"]["waste_type"], "organic");
        assert_eq!(body["params"]["q"], "a b");
    }

    #[tokio::test]
    async fn test_json_path_keeps_status() {
        get(app(), "/echo")
            .execute()
            .await
            .assert_json_path("items.0.name", json!("bin"))
            .await
            .assert_ok();
    }

    #[tokio::test]
    async fn test_unknown_route_is_404() {
        get(app(), "/missing").execute().await.assert_not_found();
    }
}
