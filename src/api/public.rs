//! Public API types

use axum::extract::rejection::JsonRejection;
use axum::extract::{FromRequest, FromRequestParts};
use axum_extra::extract::QueryRejection;
use axum::response::{IntoResponse, Response};
use http::StatusCode;
use serde_json::json;

use crate::core::Error;

// Errors

pub struct ApiError(anyhow::Error);

impl ApiError {
    fn status_and_message(&self) -> (StatusCode, String) {
        if let Some(err) = self.0.downcast_ref::<Error>() {
            return match err {
                Error::Unauthorized => (StatusCode::UNAUTHORIZED, err.to_string()),
                Error::BadRequest(_) | Error::NotRecurring | Error::InvalidDate(_) => {
                    (StatusCode::BAD_REQUEST, err.to_string())
                }
                Error::NotFound(_) => (StatusCode::NOT_FOUND, err.to_string()),
                Error::Upstream(_) => (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    String::from("Upstream service failed"),
                ),
                Error::Database(_) => (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    String::from("Internal Server Error"),
                ),
            };
        }
        if let Some(rejection) = self.0.downcast_ref::<JsonRejection>() {
            return (StatusCode::BAD_REQUEST, rejection.body_text());
        }
        if let Some(rejection) = self.0.downcast_ref::<QueryRejection>() {
            return (StatusCode::BAD_REQUEST, rejection.to_string());
        }
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            String::from("Internal Server Error"),
        )
    }
}

/// Convert `ApiError` into an Axum compatible response with a
/// `{"error": "..."}` body.
impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = self.status_and_message();

        // Always log the error
        if status.is_server_error() {
            tracing::error!("{:#}", self.0);
        } else {
            tracing::warn!("{}: {:#}", status, self.0);
        }

        (status, axum::Json(json!({ "error": message }))).into_response()
    }
}

/// Enables using `?` on functions that return `Result<_,
/// anyhow::Error>` or `Result<_, Error>` to turn them into
/// `Result<_, ApiError>`
impl<E> From<E> for ApiError
where
    E: Into<anyhow::Error>,
{
    fn from(err: E) -> Self {
        Self(err.into())
    }
}

/// JSON request body whose rejections are reported as `ApiError`s
/// (400 with an error body) instead of axum's plain text responses.
#[derive(FromRequest)]
#[from_request(via(axum::Json), rejection(ApiError))]
pub struct JsonBody<T>(pub T);

/// Query string extractor with the same error reporting as [`JsonBody`].
#[derive(FromRequestParts)]
#[from_request(via(axum_extra::extract::Query), rejection(ApiError))]
pub struct QueryParams<T>(pub T);

// Re-export public types from each route

pub mod calendars {
    pub use crate::api::routes::calendars::public::*;
}

pub mod events {
    pub use crate::api::routes::events::public::*;
}

pub mod tasks {
    pub use crate::api::routes::tasks::public::*;
}

pub mod users {
    pub use crate::api::routes::users::public::*;
}
