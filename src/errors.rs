//! # Error Handling
//!
//! Parsing never fails: malformed parameters degrade to defaults or are
//! dropped. Errors only arise at the edges:
//!
//! - the query string cannot be decoded at all (400 Bad Request)
//! - the data store fails while executing a query (500, details logged)
//!
//! [`execute_query`](crate::execute_query) hands store errors back
//! unchanged; `ApiError` is the HTTP rendering for handlers that want one.
//! Internal details are logged through `tracing` and never sent to clients.
//!
//! ```rust,ignore
//! async fn list_products(
//!     State(store): State<SeaOrmStore<product::Entity>>,
//!     params: RawParams,
//! ) -> Result<Paginated<product::Model>, ApiError> {
//!     Ok(execute_query(&store, &params, &CONFIG).await?)
//! }
//! ```

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use sea_orm::DbErr;
use serde::Serialize;
use std::fmt;

/// API error with a sanitized response body.
#[derive(Debug)]
pub enum ApiError {
    /// 400 Bad Request - the query string could not be decoded
    BadRequest {
        /// User-facing error message
        message: String,
    },

    /// 500 Internal Server Error - database error (details logged, not exposed)
    Database {
        /// User-facing generic message
        message: String,
        /// Internal error (logged, not sent to user)
        internal: DbErr,
    },

    /// 500 Internal Server Error - any other store failure
    Internal {
        message: String,
        internal: Option<String>,
    },
}

impl ApiError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::BadRequest {
            message: message.into(),
        }
    }

    /// Wrap a database error; its details are logged but NOT sent to the user.
    pub fn database(err: DbErr) -> Self {
        Self::Database {
            message: "A database error occurred".to_string(),
            internal: err,
        }
    }

    pub fn internal(message: impl Into<String>, internal: Option<String>) -> Self {
        Self::Internal {
            message: message.into(),
            internal,
        }
    }

    #[must_use]
    pub const fn status_code(&self) -> StatusCode {
        match self {
            Self::BadRequest { .. } => StatusCode::BAD_REQUEST,
            Self::Database { .. } | Self::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// The sanitized message sent to clients.
    #[must_use]
    pub fn user_message(&self) -> &str {
        match self {
            Self::BadRequest { message }
            | Self::Database { message, .. }
            | Self::Internal { message, .. } => message,
        }
    }

    fn log_internal(&self) {
        match self {
            Self::Database { internal, .. } => {
                tracing::error!(error = ?internal, "Database error occurred");
            }
            Self::Internal {
                internal: Some(details),
                ..
            } => {
                tracing::error!(details = %details, "Internal error occurred");
            }
            _ => {
                tracing::debug!(
                    error = %self.user_message(),
                    status = %self.status_code(),
                    "API error"
                );
            }
        }
    }
}

/// Error response sent to users (sanitized)
#[derive(Serialize)]
struct ErrorResponse<'a> {
    error: &'a str,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        self.log_internal();
        let body = Json(ErrorResponse {
            error: self.user_message(),
        });
        (self.status_code(), body).into_response()
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.user_message())
    }
}

impl std::error::Error for ApiError {}

impl From<DbErr> for ApiError {
    fn from(err: DbErr) -> Self {
        Self::database(err)
    }
}
