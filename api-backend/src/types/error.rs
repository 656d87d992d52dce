//! Universal error handling for the API
//!
//! Every error that leaves a handler is normalized into the same envelope:
//! `{"success": false, "message": "..."}` with a matching status code.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

/// Message sent for identifiers that cannot be parsed
pub const RESOURCE_NOT_FOUND_MESSAGE: &str = "Resource not found";

/// Message sent for a validation failure without field messages
pub const VALIDATION_FAILED_MESSAGE: &str = "Validation failed";

/// Message sent for a unique-index violation
pub const DUPLICATE_KEY_MESSAGE: &str = "Email already in use";

/// Message sent when an error carries no message of its own
pub const SERVER_ERROR_MESSAGE: &str = "Server Error";

/// Driver code reported for a unique-index violation
pub const DUPLICATE_KEY_CODE: i64 = 11000;

const CAST_ERROR_NAME: &str = "CastError";
const VALIDATION_ERROR_NAME: &str = "ValidationError";

/// JSON error envelope returned by every failing request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Always `false` for errors
    pub success: bool,
    /// Human-readable error message
    pub message: String,
}

/// Loosely-typed error value as reported by upstream services and drivers
///
/// All fields are optional and a field of the wrong type is dropped rather
/// than rejecting the record; an empty record normalizes to a 500.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ErrorRecord {
    /// Error class tag, e.g. `CastError` or `ValidationError`
    #[serde(deserialize_with = "lenient_string")]
    pub name: Option<String>,
    /// Human-readable message
    #[serde(deserialize_with = "lenient_string")]
    pub message: Option<String>,
    /// Driver error code, numeric or string
    pub code: Option<Value>,
    /// Per-field validation failures, each an object with a `message`
    #[serde(deserialize_with = "lenient_object")]
    pub errors: Option<Map<String, Value>>,
    /// HTTP status suggested by whoever raised the error; numeric strings are accepted
    #[serde(deserialize_with = "lenient_status_code")]
    pub status_code: Option<u16>,
}

impl ErrorRecord {
    fn is_duplicate_key(&self) -> bool {
        matches!(
            &self.code,
            Some(Value::Number(code))
                if code.as_i64() == Some(DUPLICATE_KEY_CODE) || code.as_f64() == Some(11_000.0)
        )
    }

    fn validation_messages(&self) -> Vec<String> {
        self.errors
            .iter()
            .flat_map(|errors| errors.values())
            .filter_map(|field| field.get("message").and_then(Value::as_str))
            .filter(|message| !message.is_empty())
            .map(ToString::to_string)
            .collect()
    }
}

/// Application error returned by handlers and extractors
#[derive(Debug, Error)]
pub enum AppError {
    /// An identifier was not in the expected format
    #[error("invalid identifier: {value}")]
    Cast {
        /// The raw identifier as received
        value: String,
    },

    /// Request data failed schema validation
    #[error("validation failed: {}", .0.join(", "))]
    Validation(Vec<String>),

    /// A unique index rejected the write
    #[error("duplicate key")]
    DuplicateKey,

    /// Any other error, with optional status and message passthrough
    #[error("{}", .message.as_deref().unwrap_or(SERVER_ERROR_MESSAGE))]
    Http {
        /// Status to respond with; `None` means 500
        status: Option<StatusCode>,
        /// Message to respond with; `None` means the generic server error
        message: Option<String>,
    },
}

impl AppError {
    /// Create an error with an explicit status and message
    #[must_use]
    pub fn http(status: StatusCode, message: impl Into<String>) -> Self {
        Self::Http {
            status: Some(status),
            message: non_empty(message.into()),
        }
    }

    /// Status code the error is reported with
    #[must_use]
    pub fn status(&self) -> StatusCode {
        match self {
            Self::Cast { .. } => StatusCode::NOT_FOUND,
            Self::Validation(_) | Self::DuplicateKey => StatusCode::BAD_REQUEST,
            Self::Http { status, .. } => status.unwrap_or(StatusCode::INTERNAL_SERVER_ERROR),
        }
    }

    /// Message the error is reported with
    #[must_use]
    pub fn message(&self) -> String {
        match self {
            Self::Cast { .. } => RESOURCE_NOT_FOUND_MESSAGE.to_string(),
            Self::Validation(messages) if messages.is_empty() => {
                VALIDATION_FAILED_MESSAGE.to_string()
            }
            Self::Validation(messages) => messages.join(", "),
            Self::DuplicateKey => DUPLICATE_KEY_MESSAGE.to_string(),
            Self::Http { message, .. } => message
                .clone()
                .unwrap_or_else(|| SERVER_ERROR_MESSAGE.to_string()),
        }
    }
}

/// Marker placed on responses that already carry the error envelope
#[derive(Debug, Clone, Copy)]
pub struct Normalized;

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = self.message();

        match status.as_u16() {
            400..=499 => tracing::warn!(status = status.as_u16(), "Client error: {}", self),
            500..=599 => tracing::error!(status = status.as_u16(), "Server error: {}", self),
            _ => {}
        }

        let mut response = (
            status,
            Json(ErrorResponse {
                success: false,
                message,
            }),
        )
            .into_response();
        response.extensions_mut().insert(Normalized);
        response
    }
}

/// Classify an ambient error value; a duplicate-key code wins over the name
impl From<ErrorRecord> for AppError {
    fn from(record: ErrorRecord) -> Self {
        if record.is_duplicate_key() {
            return Self::DuplicateKey;
        }

        match record.name.as_deref() {
            Some(CAST_ERROR_NAME) => Self::Cast {
                value: record.message.unwrap_or_default(),
            },
            Some(VALIDATION_ERROR_NAME) => Self::Validation(record.validation_messages()),
            _ => Self::Http {
                status: record
                    .status_code
                    .and_then(|code| StatusCode::from_u16(code).ok()),
                message: record.message.and_then(non_empty),
            },
        }
    }
}

/// Convert field validation failures, ordered by field name
impl From<validator::ValidationErrors> for AppError {
    fn from(errors: validator::ValidationErrors) -> Self {
        let mut fields: Vec<_> = errors.field_errors().into_iter().collect();
        fields.sort_by(|(a, _), (b, _)| a.cmp(b));

        let messages = fields
            .into_iter()
            .flat_map(|(field, field_errors)| {
                field_errors.iter().map(move |error| {
                    error.message.as_ref().map_or_else(
                        || format!("{field} is invalid"),
                        ToString::to_string,
                    )
                })
            })
            .collect();

        Self::Validation(messages)
    }
}

/// Unexpected failures surface as a 500 carrying their message
impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        tracing::debug!("Unexpected error: {err:#}");
        Self::Http {
            status: None,
            message: non_empty(err.to_string()),
        }
    }
}

fn lenient_string<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<String>, D::Error> {
    Ok(match Value::deserialize(deserializer)? {
        Value::String(text) => Some(text),
        _ => None,
    })
}

fn lenient_object<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Option<Map<String, Value>>, D::Error> {
    Ok(match Value::deserialize(deserializer)? {
        Value::Object(map) => Some(map),
        _ => None,
    })
}

fn lenient_status_code<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Option<u16>, D::Error> {
    Ok(match Value::deserialize(deserializer)? {
        Value::Number(code) => code.as_u64().and_then(|code| u16::try_from(code).ok()),
        Value::String(code) => code.trim().parse::<u16>().ok(),
        _ => None,
    })
}

fn non_empty(message: String) -> Option<String> {
    if message.is_empty() {
        None
    } else {
        Some(message)
    }
}
