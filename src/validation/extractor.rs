use crate::error::VerdantError;
use axum::{
    Json,
    extract::{FromRequest, FromRequestParts, Request},
    http::request::Parts,
};
use serde::de::DeserializeOwned;
use validator::Validate;

/// JSON body extractor that runs `validator` rules before the handler sees it
///
/// Malformed JSON and failed rules both reject with 400 and the standard
/// error body.
pub struct ValidatedJson<T>(pub T);

impl<T, S> FromRequest<S> for ValidatedJson<T>
where
    T: DeserializeOwned + Validate + Send,
    S: Send + Sync,
{
    type Rejection = VerdantError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(|e| VerdantError::bad_request(format!("Invalid JSON: {}", e.body_text())))?;

        value.validate()?;

        Ok(ValidatedJson(value))
    }
}

/// Query string extractor with the same validation and rejection shape
pub struct ValidatedQuery<T>(pub T);

impl<T, S> FromRequestParts<S> for ValidatedQuery<T>
where
    T: DeserializeOwned + Validate + Send,
    S: Send + Sync,
{
    type Rejection = VerdantError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let query_string = parts.uri.query().unwrap_or("");
        let value: T = serde_urlencoded::from_str(query_string).map_err(|e| {
            VerdantError::bad_request(format!("Invalid query parameters: {}", e))
        })?;

        value.validate()?;

        Ok(ValidatedQuery(value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use serde::Deserialize;

    #[derive(Debug, Deserialize, Validate)]
    struct CreateVendor {
        #[validate(length(min = 1, max = 200))]
        name: String,
        #[validate(email)]
        contact_email: Option<String>,
    }

    fn json_request(body: &str) -> Request {
        Request::builder()
            .method("POST")
            .uri("/")
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    #[tokio::test]
    async fn test_valid_body_is_extracted() {
        let req = json_request(r#"{"name":"GreenHaul","contact_email":"ops@greenhaul.io"}"#);
        let ValidatedJson(vendor) = ValidatedJson::<CreateVendor>::from_request(req, &())
            .await
            .unwrap();
        assert_eq!(vendor.name, "GreenHaul");
    }

    #[tokio::test]
    async fn test_rule_violation_is_bad_request() {
        let req = json_request(r#"{"name":"","contact_email":"nope"}"#);
        let err = ValidatedJson::<CreateVendor>::from_request(req, &())
            .await
            .err()
            .unwrap();
        assert_eq!(err.status_code(), axum::http::StatusCode::BAD_REQUEST);
        let message = err.to_string();
        assert!(message.contains("contact_email"));
        assert!(message.contains("name"));
    }

    #[tokio::test]
    async fn test_malformed_json_is_bad_request() {
        let req = json_request("{\"name\":");
        let err = ValidatedJson::<CreateVendor>::from_request(req, &())
            .await
            .err()
            .unwrap();
        assert_eq!(err.status_code(), axum::http::StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_query_is_parsed_and_validated() {
        #[derive(Debug, Deserialize, Validate)]
        struct Window {
            #[validate(range(min = 1, max = 1000))]
            limit: Option<u64>,
        }

        let (mut parts, _) = axum::http::Request::builder()
            .uri("/readings?limit=5000")
            .body(())
            .unwrap()
            .into_parts();
        let result = ValidatedQuery::<Window>::from_request_parts(&mut parts, &()).await;
        assert!(result.is_err());
    }
}
