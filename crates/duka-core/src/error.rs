//! Error types for `duka-core`.

use thiserror::Error;

use crate::access::Role;

/// The domain error taxonomy shared by every backend and the API layer.
#[derive(Debug, Error)]
pub enum Error {
  #[error("{0} not found")]
  NotFound(String),

  #[error("{0}")]
  Conflict(String),

  #[error("invalid input: {0}")]
  Validation(String),

  #[error("role {role} may not perform this operation")]
  Forbidden { role: Role },

  #[error("not enough stock: requested {requested}, {available} available")]
  InsufficientStock { requested: i64, available: i64 },

  #[error("supply request cannot move from {from} to {to}")]
  InvalidTransition { from: String, to: String },
}

impl Error {
  pub fn not_found(what: impl Into<String>) -> Self { Self::NotFound(what.into()) }

  pub fn conflict(msg: impl Into<String>) -> Self { Self::Conflict(msg.into()) }

  pub fn validation(msg: impl Into<String>) -> Self { Self::Validation(msg.into()) }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Implemented by backend error types so callers can tell domain failures
/// (missing rows, conflicts, stock checks) apart from infrastructure ones.
pub trait StoreError: std::error::Error + Send + Sync + 'static {
  /// Unwrap the domain error, or hand `self` back if this is an
  /// infrastructure failure.
  fn into_domain(self) -> std::result::Result<Error, Self>
  where
    Self: Sized;
}

impl StoreError for Error {
  fn into_domain(self) -> std::result::Result<Error, Self> { Ok(self) }
}
