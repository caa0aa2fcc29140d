use crate::auth::roles::Role;
use crate::db::errors::DbError;
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error as ThisError;
use utoipa::ToSchema;

#[derive(ThisError, Debug)]
pub enum Error {
    /// Authentication required but not provided
    #[error("Not authenticated")]
    Unauthenticated { message: Option<String> },

    /// Principal lacks the role required for the operation
    #[error("Access denied, {required} required")]
    InsufficientPermissions { required: Role },

    /// Invalid request data or business rule violation
    #[error("{message}")]
    BadRequest { message: String },

    /// Request DTO failed validation
    #[error("Validation failed: {}", format_violations(.violations))]
    Validation { violations: Vec<Violation> },

    /// Requested resource not found
    #[error("{resource} with ID {id} not found")]
    NotFound { resource: String, id: String },

    /// Route exists but not for this HTTP method
    #[error("Method {method} not allowed")]
    MethodNotAllowed { method: String },

    /// Error with an explicit status code, passed through to the client as-is
    #[error("{message}")]
    Http { status: StatusCode, message: String },

    /// Generic internal service error
    #[error("Failed to {operation}")]
    Internal { operation: String },

    /// Database operation error
    #[error(transparent)]
    Database(#[from] DbError),

    /// Unexpected error with full context chain
    #[error(transparent)]
    Other(#[from] anyhow::Error),

    /// Conflict error, e.g., for unique constraint violations
    #[error("Conflict: {message}")]
    Conflict { message: String },
}

/// A single failed validation constraint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Violation {
    pub property_path: String,
    pub message: String,
}

impl Violation {
    pub fn new(property_path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            property_path: property_path.into(),
            message: message.into(),
        }
    }
}

fn format_violations(violations: &[Violation]) -> String {
    violations
        .iter()
        .map(|v| format!("{}: {}", v.property_path, v.message))
        .collect::<Vec<_>>()
        .join(", ")
}

/// `first_name` -> `firstName`, matching the property names clients send.
fn camel_case(field: &str) -> String {
    let mut result = String::with_capacity(field.len());
    let mut upper = false;
    for c in field.chars() {
        if c == '_' {
            upper = true;
        } else if upper {
            result.extend(c.to_uppercase());
            upper = false;
        } else {
            result.push(c);
        }
    }
    result
}

/// JSON body returned for every error response.
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorBody {
    pub message: String,
    pub code: i32,
    pub status: u16,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub errors: Option<Vec<Violation>>,
}

impl From<validator::ValidationErrors> for Error {
    fn from(errors: validator::ValidationErrors) -> Self {
        let mut violations: Vec<Violation> = errors
            .field_errors()
            .into_iter()
            .flat_map(|(field, errors)| {
                let field = camel_case(&field);
                errors.iter().map(move |error| {
                    let message = error
                        .message
                        .as_ref()
                        .map(|m| m.to_string())
                        .unwrap_or_else(|| format!("This value is not valid ({}).", error.code));
                    Violation::new(field.clone(), message)
                })
            })
            .collect();
        // HashMap iteration order is arbitrary
        violations.sort_by(|a, b| a.property_path.cmp(&b.property_path));
        Error::Validation { violations }
    }
}

impl Error {
    pub fn status_code(&self) -> StatusCode {
        match self {
            Error::Unauthenticated { .. } => StatusCode::UNAUTHORIZED,
            Error::InsufficientPermissions { .. } => StatusCode::FORBIDDEN,
            Error::BadRequest { .. } | Error::Validation { .. } => StatusCode::BAD_REQUEST,
            Error::NotFound { .. } => StatusCode::NOT_FOUND,
            Error::MethodNotAllowed { .. } => StatusCode::METHOD_NOT_ALLOWED,
            Error::Http { status, .. } => *status,
            Error::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
            Error::Database(db_err) => match db_err {
                DbError::NotFound => StatusCode::NOT_FOUND,
                DbError::UniqueViolation { .. } => StatusCode::CONFLICT,
                DbError::ForeignKeyViolation { .. } => StatusCode::BAD_REQUEST,
                DbError::CheckViolation { .. } => StatusCode::BAD_REQUEST,
                DbError::Other(_) => StatusCode::INTERNAL_SERVER_ERROR,
            },
            Error::Other(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Error::Conflict { .. } => StatusCode::CONFLICT,
        }
    }

    /// Returns a user-safe error message, without leaking internal implementation details
    pub fn user_message(&self) -> String {
        match self {
            Error::Unauthenticated { message } => message.clone().unwrap_or_else(|| "Authentication required".to_string()),
            Error::InsufficientPermissions { .. } => "Access denied.".to_string(),
            Error::BadRequest { message } => message.clone(),
            Error::Validation { .. } => "Validation failed".to_string(),
            Error::NotFound { resource, id } => {
                format!("{resource} with ID {id} not found")
            }
            Error::MethodNotAllowed { method } => format!("Method {method} not allowed"),
            Error::Http { message, .. } => message.clone(),
            Error::Internal { .. } => "Internal server error".to_string(),
            Error::Database(db_err) => match db_err {
                DbError::NotFound => "Resource not found".to_string(),
                DbError::UniqueViolation { constraint, table, .. } => match (table.as_deref(), constraint.as_deref()) {
                    (Some("users"), Some(c)) if c.contains("email") => "An account with this email address already exists".to_string(),
                    (Some("users"), Some(c)) if c.contains("username") => "This username is already taken".to_string(),
                    (Some("api_keys"), _) => "API key token already exists".to_string(),
                    _ => "Resource already exists".to_string(),
                },
                DbError::ForeignKeyViolation { .. } => "Invalid reference to related resource".to_string(),
                DbError::CheckViolation { .. } => "Invalid data provided".to_string(),
                DbError::Other(_) => "Database error occurred".to_string(),
            },
            Error::Other(_) => "Internal server error".to_string(),
            Error::Conflict { message } => message.clone(),
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        // Log full error details for debugging - different log levels based on severity
        match &self {
            Error::Database(DbError::Other(_)) | Error::Internal { .. } | Error::Other(_) => {
                tracing::error!("Internal service error: {:#}", self);
            }
            Error::Database(_) | Error::Conflict { .. } => {
                tracing::warn!("Database constraint error: {}", self);
            }
            Error::Unauthenticated { .. } | Error::InsufficientPermissions { .. } => {
                tracing::info!("Authorization error: {}", self);
            }
            Error::Http { status, .. } if status.is_server_error() => {
                tracing::error!("Server error: {}", self);
            }
            Error::BadRequest { .. }
            | Error::Validation { .. }
            | Error::NotFound { .. }
            | Error::MethodNotAllowed { .. }
            | Error::Http { .. } => {
                tracing::debug!("Client error: {}", self);
            }
        }

        let status = self.status_code();
        let errors = match &self {
            Error::Validation { violations } => Some(violations.clone()),
            _ => None,
        };

        let body = ErrorBody {
            message: self.user_message(),
            code: 0,
            status: status.as_u16(),
            errors,
        };

        (status, Json(body)).into_response()
    }
}

/// Convert from String errors (e.g., from external functions)
impl From<String> for Error {
    fn from(msg: String) -> Self {
        Error::Internal { operation: msg }
    }
}

/// Type alias for service operation results
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;
    use validator::Validate;

    async fn body_json(error: Error) -> (StatusCode, serde_json::Value) {
        let response = error.into_response();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_custom_status_is_passed_through() {
        let (status, body) = body_json(Error::Http {
            status: StatusCode::IM_A_TEAPOT,
            message: "Test exception".to_string(),
        })
        .await;

        assert_eq!(status, StatusCode::IM_A_TEAPOT);
        assert_eq!(body["message"], "Test exception");
        assert_eq!(body["code"], 0);
        assert_eq!(body["status"], 418);
    }

    #[tokio::test]
    async fn test_internal_errors_hide_details() {
        let (status, body) = body_json(Error::Other(anyhow::anyhow!("connection string leaked"))).await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["message"], "Internal server error");
    }

    #[tokio::test]
    async fn test_unique_violation_message() {
        let error = Error::Database(DbError::UniqueViolation {
            constraint: Some("uq_users_username".to_string()),
            table: Some("users".to_string()),
            message: "UNIQUE constraint failed: users.username".to_string(),
        });
        let (status, body) = body_json(error).await;

        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(body["message"], "This username is already taken");
    }

    #[derive(Validate)]
    struct Sample {
        #[validate(length(min = 2, message = "This value is too short."))]
        name: String,
        #[validate(email)]
        email_address: String,
    }

    #[tokio::test]
    async fn test_validation_errors_are_listed() {
        let sample = Sample {
            name: "x".to_string(),
            email_address: "not-an-email".to_string(),
        };
        let error = Error::from(sample.validate().unwrap_err());
        let (status, body) = body_json(error).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        let errors = body["errors"].as_array().unwrap();
        assert_eq!(errors.len(), 2);
        assert_eq!(errors[0]["propertyPath"], "emailAddress");
        assert_eq!(errors[1]["propertyPath"], "name");
        assert_eq!(errors[1]["message"], "This value is too short.");
    }
}
