//! Application error type with HTTP response conversion.
//!
//! Every failure surfaced by the API carries an [`ErrorKind`], which maps to a
//! stable machine-readable code and an HTTP status. Handlers and services
//! return [`AppError`] and let `?` do the rest.

use std::collections::BTreeMap;
use std::fmt;

use anyhow::Error;
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use serde_json::{Value, json};
use utoipa::ToSchema;
use validator::ValidationErrors;

/// Error categories exposed to API callers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorKind {
    /// Malformed or missing input; the caller can fix the request.
    Validation,
    /// A referenced id does not resolve.
    NotFound,
    /// The caller's role may not perform the action.
    Forbidden,
    /// The entity's status does not allow the requested transition.
    InvalidState,
    /// A uniqueness or dependency constraint would be violated.
    Conflict,
    /// The underlying store failed.
    Persistence,
    /// Missing or invalid credentials.
    Unauthorized,
}

impl ErrorKind {
    /// Stable code rendered in the `code` field of error responses.
    pub const fn code(self) -> &'static str {
        match self {
            Self::Validation => "VALIDATION_ERROR",
            Self::NotFound => "NOT_FOUND",
            Self::Forbidden => "FORBIDDEN",
            Self::InvalidState => "INVALID_STATE",
            Self::Conflict => "CONFLICT",
            Self::Persistence => "PERSISTENCE_ERROR",
            Self::Unauthorized => "UNAUTHORIZED",
        }
    }

    /// Default HTTP status for the kind.
    pub const fn status(self) -> StatusCode {
        match self {
            Self::Validation => StatusCode::UNPROCESSABLE_ENTITY,
            Self::NotFound => StatusCode::NOT_FOUND,
            Self::Forbidden => StatusCode::FORBIDDEN,
            Self::InvalidState | Self::Conflict => StatusCode::CONFLICT,
            Self::Persistence => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Unauthorized => StatusCode::UNAUTHORIZED,
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// Body of every error response.
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorResponse {
    pub error: String,
    pub code: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Value>,
}

#[derive(Debug)]
pub struct AppError {
    pub status: StatusCode,
    pub kind: ErrorKind,
    pub error: Error,
    pub details: Option<Value>,
}

impl AppError {
    pub fn new<E>(kind: ErrorKind, err: E) -> Self
    where
        E: Into<Error>,
    {
        Self {
            status: kind.status(),
            kind,
            error: err.into(),
            details: None,
        }
    }

    /// Override the HTTP status while keeping the kind.
    pub fn with_status(mut self, status: StatusCode) -> Self {
        self.status = status;
        self
    }

    pub fn with_details(mut self, details: Value) -> Self {
        self.details = Some(details);
        self
    }

    pub fn validation<E>(err: E) -> Self
    where
        E: Into<Error>,
    {
        Self::new(ErrorKind::Validation, err)
    }

    /// Validation failure pinned to a single field.
    pub fn field(field: &str, message: impl Into<String>) -> Self {
        let message = message.into();
        let mut fields = BTreeMap::new();
        fields.insert(field.to_string(), vec![message.clone()]);
        Self::validation(anyhow::anyhow!("{}: {}", field, message))
            .with_details(json!({ "fields": fields }))
    }

    /// Converts `validator` errors into a field-level validation error.
    pub fn from_validation(errors: &ValidationErrors) -> Self {
        let mut fields: BTreeMap<String, Vec<String>> = BTreeMap::new();
        for (field, errs) in errors.field_errors() {
            let messages = fields.entry(field.to_string()).or_default();
            for err in errs.iter() {
                messages.push(
                    err.message
                        .as_ref()
                        .map(|msg| msg.to_string())
                        .unwrap_or_else(|| format!("{} is invalid", field)),
                );
            }
        }

        let summary = fields
            .iter()
            .flat_map(|(field, messages)| {
                messages
                    .iter()
                    .map(move |message| format!("{}: {}", field, message))
            })
            .collect::<Vec<_>>()
            .join(", ");

        Self::validation(anyhow::anyhow!("{}", summary)).with_details(json!({ "fields": fields }))
    }

    /// Malformed request body; kept in the validation family but rendered as 400.
    pub fn bad_request<E>(err: E) -> Self
    where
        E: Into<Error>,
    {
        Self::new(ErrorKind::Validation, err).with_status(StatusCode::BAD_REQUEST)
    }

    pub fn not_found<E>(err: E) -> Self
    where
        E: Into<Error>,
    {
        Self::new(ErrorKind::NotFound, err)
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Forbidden, anyhow::anyhow!(message.into()))
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Unauthorized, anyhow::anyhow!(message.into()))
    }

    /// Status precondition failure; `current` is echoed back for diagnostics.
    pub fn invalid_state(current: impl fmt::Display, message: impl Into<String>) -> Self {
        let current = current.to_string();
        Self::new(ErrorKind::InvalidState, anyhow::anyhow!(message.into()))
            .with_details(json!({ "current_status": current }))
    }

    pub fn conflict<E>(err: E) -> Self
    where
        E: Into<Error>,
    {
        Self::new(ErrorKind::Conflict, err)
    }

    pub fn persistence<E>(err: E) -> Self
    where
        E: Into<Error>,
    {
        Self::new(ErrorKind::Persistence, err)
    }

    /// Status string carried by an `InvalidState` error, if any.
    pub fn current_status(&self) -> Option<&str> {
        self.details
            .as_ref()
            .and_then(|details| details.get("current_status"))
            .and_then(Value::as_str)
    }

    /// Messages recorded against a field of a `Validation` error.
    pub fn field_messages(&self, field: &str) -> Vec<String> {
        self.details
            .as_ref()
            .and_then(|details| details.get("fields"))
            .and_then(|fields| fields.get(field))
            .and_then(Value::as_array)
            .map(|messages| {
                messages
                    .iter()
                    .filter_map(|m| m.as_str().map(str::to_string))
                    .collect()
            })
            .unwrap_or_default()
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.error, self.kind)
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let message = match self.kind {
            ErrorKind::Persistence => {
                tracing::error!(error = ?self.error, "Persistence failure");
                "Internal server error".to_string()
            }
            _ => self.error.to_string(),
        };

        let body = ErrorResponse {
            error: message,
            code: self.kind.code().to_string(),
            details: self.details,
        };

        (self.status, Json(body)).into_response()
    }
}

impl<E> From<E> for AppError
where
    E: Into<Error>,
{
    fn from(err: E) -> Self {
        AppError::persistence(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use validator::{Validate, ValidationError};

    #[derive(Validate)]
    struct Probe {
        #[validate(length(min = 1, message = "Name is required"))]
        name: String,
        #[validate(range(min = 1, max = 2))]
        semester: i16,
    }

    #[test]
    fn test_kinds_have_stable_codes() {
        assert_eq!(ErrorKind::Validation.code(), "VALIDATION_ERROR");
        assert_eq!(ErrorKind::InvalidState.code(), "INVALID_STATE");
        assert_eq!(ErrorKind::Persistence.code(), "PERSISTENCE_ERROR");
        assert_eq!(ErrorKind::NotFound.status(), StatusCode::NOT_FOUND);
        assert_eq!(ErrorKind::Forbidden.status(), StatusCode::FORBIDDEN);
    }

    #[test]
    fn test_invalid_state_carries_current_status() {
        let err = AppError::invalid_state("DRAFT", "cannot publish");
        assert_eq!(err.kind, ErrorKind::InvalidState);
        assert_eq!(err.current_status(), Some("DRAFT"));
        assert_eq!(err.status, StatusCode::CONFLICT);
    }

    #[test]
    fn test_from_validation_collects_field_messages() {
        let probe = Probe {
            name: String::new(),
            semester: 3,
        };
        let errors = probe.validate().unwrap_err();
        let err = AppError::from_validation(&errors);

        assert_eq!(err.kind, ErrorKind::Validation);
        assert_eq!(err.field_messages("name"), vec!["Name is required"]);
        assert_eq!(err.field_messages("semester"), vec!["semester is invalid"]);
    }

    #[test]
    fn test_single_field_error() {
        let err = AppError::field("group_ids", "At least one group is required");
        assert_eq!(
            err.field_messages("group_ids"),
            vec!["At least one group is required"]
        );
        assert!(err.to_string().contains("group_ids"));
    }

    #[test]
    fn test_blanket_conversion_is_persistence() {
        let err: AppError = anyhow::anyhow!("connection reset").into();
        assert_eq!(err.kind, ErrorKind::Persistence);
        assert_eq!(err.status, StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_custom_validation_error_message() {
        let mut errors = ValidationErrors::new();
        errors.add(
            "day",
            ValidationError::new("enum").with_message("Unknown day".into()),
        );
        let err = AppError::from_validation(&errors);
        assert_eq!(err.field_messages("day"), vec!["Unknown day"]);
    }

    #[tokio::test]
    async fn test_persistence_response_hides_internal_message() {
        let err = AppError::persistence(anyhow::anyhow!("password authentication failed"));
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
