use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;

/// The main error type for Verdant handlers and services
#[derive(Debug, thiserror::Error)]
pub enum VerdantError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Internal server error: {0}")]
    Internal(String),

    #[error("Service unavailable: {0}")]
    ServiceUnavailable(String),

    #[error("Request timeout")]
    RequestTimeout,

    #[error("Database error: {0}")]
    Database(String),

    #[error(transparent)]
    Anyhow(#[from] anyhow::Error),
}

/// JSON body returned for every failed request.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub error_id: String,
}

impl VerdantError {
    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    pub fn bad_request(msg: impl Into<String>) -> Self {
        Self::BadRequest(msg.into())
    }

    pub fn unauthorized(msg: impl Into<String>) -> Self {
        Self::Unauthorized(msg.into())
    }

    pub fn forbidden(msg: impl Into<String>) -> Self {
        Self::Forbidden(msg.into())
    }

    pub fn conflict(msg: impl Into<String>) -> Self {
        Self::Conflict(msg.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    pub fn service_unavailable(msg: impl Into<String>) -> Self {
        Self::ServiceUnavailable(msg.into())
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Self::Forbidden(_) => StatusCode::FORBIDDEN,
            Self::Conflict(_) => StatusCode::CONFLICT,
            Self::Internal(_) | Self::Anyhow(_) | Self::Database(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            Self::ServiceUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            Self::RequestTimeout => StatusCode::REQUEST_TIMEOUT,
        }
    }

    /// Message that is safe to show to clients.
    ///
    /// Client errors (4xx) carry their message through. Server errors are
    /// replaced with a generic text; the full error only goes to the logs.
    fn safe_message(&self) -> String {
        match self {
            Self::NotFound(_)
            | Self::BadRequest(_)
            | Self::Unauthorized(_)
            | Self::Forbidden(_)
            | Self::Conflict(_)
            | Self::RequestTimeout => self.to_string(),
            Self::Internal(_) | Self::Anyhow(_) => "Internal server error".to_string(),
            Self::Database(_) => "Database error".to_string(),
            Self::ServiceUnavailable(_) => "Service unavailable".to_string(),
        }
    }
}

impl IntoResponse for VerdantError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let error_id = uuid::Uuid::new_v4().to_string();

        if status.is_server_error() {
            tracing::error!(
                status = status.as_u16(),
                error_id = %error_id,
                error = %self,
                "Request failed"
            );
        } else {
            tracing::debug!(
                status = status.as_u16(),
                error_id = %error_id,
                error = %self,
                "Request rejected"
            );
        }

        let body = ErrorResponse {
            error: self.safe_message(),
            error_id,
        };

        (status, Json(body)).into_response()
    }
}

/// Result type alias for Verdant handlers
pub type Result<T> = std::result::Result<T, VerdantError>;

impl From<serde_json::Error> for VerdantError {
    fn from(err: serde_json::Error) -> Self {
        if err.is_data() || err.is_syntax() || err.is_eof() {
            VerdantError::BadRequest(format!("JSON error: {}", err))
        } else {
            VerdantError::Internal(format!("JSON serialization error: {}", err))
        }
    }
}

impl From<validator::ValidationErrors> for VerdantError {
    fn from(err: validator::ValidationErrors) -> Self {
        let mut field_errors: Vec<String> = err
            .field_errors()
            .iter()
            .map(|(field, errors)| {
                let messages: Vec<&str> = errors
                    .iter()
                    .map(|e| e.message.as_deref().unwrap_or_else(|| e.code.as_ref()))
                    .collect();
                format!("{}: {}", field, messages.join(", "))
            })
            .collect();
        field_errors.sort();

        // Nested list and struct errors carry no direct field entries
        if field_errors.is_empty() {
            return VerdantError::BadRequest(format!("Validation failed: {}", err));
        }

        VerdantError::BadRequest(format!("Validation failed: {}", field_errors.join("; ")))
    }
}

impl From<sea_orm::DbErr> for VerdantError {
    fn from(err: sea_orm::DbErr) -> Self {
        if let Some(sea_orm::SqlErr::UniqueConstraintViolation(msg)) = err.sql_err() {
            return VerdantError::Conflict(format!("Duplicate value: {}", msg));
        }
        if let Some(sea_orm::SqlErr::ForeignKeyConstraintViolation(msg)) = err.sql_err() {
            return VerdantError::BadRequest(format!("Invalid reference: {}", msg));
        }

        match &err {
            sea_orm::DbErr::RecordNotFound(msg) => VerdantError::NotFound(if msg.is_empty() {
                "Record not found".to_string()
            } else {
                msg.clone()
            }),
            sea_orm::DbErr::Conn(inner) => {
                VerdantError::Database(format!("Connection error: {}", inner))
            }
            sea_orm::DbErr::Query(inner) => VerdantError::Database(format!("Query error: {}", inner)),
            sea_orm::DbErr::Exec(inner) => {
                VerdantError::Database(format!("Execution error: {}", inner))
            }
            _ => VerdantError::Database(err.to_string()),
        }
    }
}

impl<E> From<sea_orm::TransactionError<E>> for VerdantError
where
    E: std::error::Error + Into<VerdantError>,
{
    fn from(err: sea_orm::TransactionError<E>) -> Self {
        match err {
            sea_orm::TransactionError::Connection(db) => db.into(),
            sea_orm::TransactionError::Transaction(inner) => inner.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_errors_keep_their_message() {
        let err = VerdantError::not_found("Device not found");
        assert_eq!(err.status_code(), StatusCode::NOT_FOUND);
        assert_eq!(err.safe_message(), "Not found: Device not found");

        let err = VerdantError::conflict("email taken");
        assert_eq!(err.status_code(), StatusCode::CONFLICT);
        assert_eq!(err.safe_message(), "Conflict: email taken");
    }

    #[test]
    fn test_server_errors_are_redacted() {
        let err = VerdantError::internal("password=hunter2 leaked");
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.safe_message(), "Internal server error");

        let err = VerdantError::Database("relation \"users\" does not exist".into());
        assert_eq!(err.safe_message(), "Database error");
    }

    #[test]
    fn test_record_not_found_maps_to_404() {
        let err: VerdantError = sea_orm::DbErr::RecordNotFound(String::new()).into();
        assert!(matches!(err, VerdantError::NotFound(ref m) if m == "Record not found"));
    }

    #[test]
    fn test_json_syntax_error_is_bad_request() {
        let parse_err = serde_json::from_str::<serde_json::Value>("{not json").unwrap_err();
        let err: VerdantError = parse_err.into();
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_error_response_body_shape() {
        let response = VerdantError::forbidden("Admin role required").into_response();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);

        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["error"], "Forbidden: Admin role required");
        assert!(body["error_id"].as_str().is_some());
    }
}
