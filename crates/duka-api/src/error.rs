//! API error type and [`axum::response::IntoResponse`] implementation.

use axum::{
  Json,
  extract::rejection::{JsonRejection, QueryRejection},
  http::StatusCode,
  response::{IntoResponse, Response},
};
use duka_core::StoreError;
use serde_json::json;
use thiserror::Error;

/// An error returned by an API handler.
#[derive(Debug, Error)]
pub enum ApiError {
  #[error("bad request: {0}")]
  BadRequest(String),

  #[error("unauthorized: {0}")]
  Unauthorized(String),

  #[error("forbidden: {0}")]
  Forbidden(String),

  #[error("not found: {0}")]
  NotFound(String),

  #[error("conflict: {0}")]
  Conflict(String),

  #[error("internal error: {0}")]
  Internal(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl ApiError {
  /// Map a backend error: domain failures keep their meaning, anything else
  /// becomes a 500.
  pub fn store<E: StoreError>(err: E) -> Self {
    match err.into_domain() {
      Ok(domain) => domain.into(),
      Err(other) => Self::Internal(Box::new(other)),
    }
  }

  pub fn unauthorized(msg: impl Into<String>) -> Self { Self::Unauthorized(msg.into()) }
}

impl From<duka_core::Error> for ApiError {
  fn from(err: duka_core::Error) -> Self {
    use duka_core::Error as E;
    let message = err.to_string();
    match err {
      E::Validation(_) | E::InsufficientStock { .. } => Self::BadRequest(message),
      E::Forbidden { .. } => Self::Forbidden(message),
      E::NotFound(_) => Self::NotFound(message),
      E::Conflict(_) | E::InvalidTransition { .. } => Self::Conflict(message),
    }
  }
}

impl From<JsonRejection> for ApiError {
  fn from(rejection: JsonRejection) -> Self { Self::BadRequest(rejection.body_text()) }
}

impl From<QueryRejection> for ApiError {
  fn from(rejection: QueryRejection) -> Self { Self::BadRequest(rejection.body_text()) }
}

impl IntoResponse for ApiError {
  fn into_response(self) -> Response {
    let (status, message) = match self {
      ApiError::BadRequest(m) => (StatusCode::BAD_REQUEST, m),
      ApiError::Unauthorized(m) => (StatusCode::UNAUTHORIZED, m),
      ApiError::Forbidden(m) => (StatusCode::FORBIDDEN, m),
      ApiError::NotFound(m) => (StatusCode::NOT_FOUND, m),
      ApiError::Conflict(m) => (StatusCode::CONFLICT, m),
      ApiError::Internal(e) => {
        tracing::error!(error = %e, "request failed");
        (StatusCode::INTERNAL_SERVER_ERROR, "internal server error".to_owned())
      }
    };
    (status, Json(json!({ "error": message }))).into_response()
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn domain_errors_map_to_statuses() {
    let cases = [
      (duka_core::Error::validation("x"), StatusCode::BAD_REQUEST),
      (
        duka_core::Error::InsufficientStock { requested: 2, available: 1 },
        StatusCode::BAD_REQUEST,
      ),
      (duka_core::Error::not_found("store 1"), StatusCode::NOT_FOUND),
      (duka_core::Error::conflict("dup"), StatusCode::CONFLICT),
      (
        duka_core::Error::Forbidden { role: duka_core::access::Role::Clerk },
        StatusCode::FORBIDDEN,
      ),
    ];
    for (err, status) in cases {
      assert_eq!(ApiError::from(err).into_response().status(), status);
    }
  }

  #[test]
  fn internal_errors_are_not_echoed() {
    let err = ApiError::Internal("disk on fire".into());
    assert_eq!(err.into_response().status(), StatusCode::INTERNAL_SERVER_ERROR);
  }
}
