//! Error types and axum `IntoResponse` implementation.

use axum::{
  Json,
  http::{HeaderValue, StatusCode, header},
  response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  /// Missing or wrong credentials.
  #[error("unauthorized")]
  Unauthorized,
  /// Authenticated, but not allowed to check attendees in.
  #[error("access denied")]
  Forbidden,
  #[error("not found: {0}")]
  NotFound(String),
  #[error("bad request: {0}")]
  BadRequest(String),
  #[error("store error: {0}")]
  Store(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl From<rollcall_core::Error> for Error {
  fn from(err: rollcall_core::Error) -> Self {
    use rollcall_core::Error as Core;
    match err {
      Core::EventNotFound(_) | Core::UnsupportedEvent(_) | Core::AttendeeNotFound(_) => {
        Error::NotFound(err.to_string())
      }
      Core::MalformedIdentifier(_) => Error::BadRequest(err.to_string()),
      Core::ActorNotFound(_) => Error::Forbidden,
      Core::Persistence(_) | Core::DuplicateSourceType(_) => Error::Store(Box::new(err)),
    }
  }
}

impl IntoResponse for Error {
  fn into_response(self) -> Response {
    match self {
      Error::Unauthorized => {
        let mut res =
          (StatusCode::UNAUTHORIZED, Json(json!({ "error": "Unauthorized" })))
            .into_response();
        res.headers_mut().insert(
          header::WWW_AUTHENTICATE,
          HeaderValue::from_static("Basic realm=\"rollcall\""),
        );
        res
      }
      Error::Forbidden => {
        (StatusCode::FORBIDDEN, Json(json!({ "error": "Access denied" }))).into_response()
      }
      Error::NotFound(m) => {
        (StatusCode::NOT_FOUND, Json(json!({ "error": m }))).into_response()
      }
      Error::BadRequest(m) => {
        (StatusCode::BAD_REQUEST, Json(json!({ "error": m }))).into_response()
      }
      Error::Store(e) => {
        tracing::error!(error = %e, "store failure");
        (StatusCode::INTERNAL_SERVER_ERROR, Json(json!({ "error": "Internal error" })))
          .into_response()
      }
    }
  }
}
