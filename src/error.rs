//! Typed errors and HTTP mapping.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

/// Malformed schema declarations; raised at startup, never per request.
#[derive(Error, Debug)]
pub enum SchemaError {
    #[error("unknown definition: {0}")]
    UnknownDefinition(String),
    #[error("definition {0} has no primary key")]
    MissingPrimaryKey(String),
    #[error("definition {0} declares translated fields without a translation table")]
    MissingTranslationTable(String),
    #[error("invalid identifier in {entity}: {identifier}")]
    InvalidIdentifier { entity: String, identifier: String },
    #[error("duplicate field {property} in {entity}")]
    DuplicateField { entity: String, property: String },
    #[error("unknown field {property} in {entity}")]
    UnknownField { entity: String, property: String },
    #[error("column {column} not declared on {entity}")]
    MissingLocalColumn { entity: String, column: String },
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("missing environment variable {0}")]
    Missing(&'static str),
    #[error("invalid value for {key}: {message}")]
    Invalid { key: &'static str, message: String },
}

#[derive(Error, Debug)]
pub enum AppError {
    #[error(transparent)]
    Schema(#[from] SchemaError),
    #[error("bad request: {0}")]
    BadRequest(String),
    #[error("database: {0}")]
    Db(#[from] sqlx::Error),
    #[error("decode: {0}")]
    Decode(#[from] serde_json::Error),
    /// Raised by terminal routes when asked for the implementation they decorate.
    #[error("{0} is the terminal implementation and does not decorate another route")]
    DecorationPattern(String),
}

#[derive(Serialize)]
pub struct ErrorBody {
    pub error: ErrorDetail,
}

#[derive(Serialize)]
pub struct ErrorDetail {
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl AppError {
    pub fn status_and_code(&self) -> (StatusCode, &'static str) {
        match self {
            AppError::Schema(_) => (StatusCode::INTERNAL_SERVER_ERROR, "schema_error"),
            AppError::BadRequest(_) => (StatusCode::BAD_REQUEST, "bad_request"),
            AppError::Db(_) => (StatusCode::INTERNAL_SERVER_ERROR, "database_error"),
            AppError::Decode(_) => (StatusCode::INTERNAL_SERVER_ERROR, "decode_error"),
            AppError::DecorationPattern(_) => (StatusCode::INTERNAL_SERVER_ERROR, "decoration_pattern"),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code) = self.status_and_code();
        if status.is_server_error() {
            tracing::error!(error = %self, "request failed");
        }
        let body = ErrorBody {
            error: ErrorDetail {
                code: code.to_string(),
                message: self.to_string(),
                details: None,
            },
        };
        (status, Json(body)).into_response()
    }
}
