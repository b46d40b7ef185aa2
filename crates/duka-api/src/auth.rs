//! Password hashing, JWT issuance, and the request extractors that identify
//! and authorise the caller.

use std::marker::PhantomData;

use argon2::{
  Argon2,
  PasswordHash,
  PasswordHasher,
  PasswordVerifier,
  password_hash::SaltString,
};
use axum::{
  extract::FromRequestParts,
  http::{HeaderMap, header, request::Parts},
};
use chrono::{DateTime, Duration, Utc};
use duka_core::{
  access::{Gate, Viewer, authorize},
  repository::Repository,
  user::User,
};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use rand_core::OsRng;
use serde::{Deserialize, Serialize};

use crate::{AppState, error::ApiError};

/// Alternate header carrying the access token, accepted alongside
/// `Authorization: Bearer`.
pub const ACCESS_TOKEN_HEADER: &str = "x-access-token";

// ─── Passwords ───────────────────────────────────────────────────────────────

/// Hash `password` into an argon2 PHC string.
pub fn hash_password(password: &str) -> Result<String, ApiError> {
  let salt = SaltString::generate(&mut OsRng);
  Argon2::default()
    .hash_password(password.as_bytes(), &salt)
    .map(|h| h.to_string())
    .map_err(|e| ApiError::Internal(format!("argon2 error: {e}").into()))
}

pub fn verify_password(password: &str, phc: &str) -> bool {
  PasswordHash::new(phc)
    .and_then(|parsed| Argon2::default().verify_password(password.as_bytes(), &parsed))
    .is_ok()
}

// ─── Tokens ──────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenKind {
  Access,
  Invite,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
  /// User id for access tokens; inviting merchant id for invitations.
  pub sub:   i64,
  pub kind:  TokenKind,
  /// The invited address. Absent on access tokens.
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub email: Option<String>,
  pub iat:   i64,
  pub exp:   i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct IssuedToken {
  pub token:      String,
  pub expires_at: DateTime<Utc>,
}

/// HS256 signing and verification keys plus token lifetimes.
pub struct TokenKeys {
  encoding:   EncodingKey,
  decoding:   DecodingKey,
  validation: Validation,
  access_ttl: Duration,
  invite_ttl: Duration,
}

impl TokenKeys {
  pub fn new(secret: &[u8], access_ttl: Duration, invite_ttl: Duration) -> Self {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.leeway = 0;
    Self {
      encoding: EncodingKey::from_secret(secret),
      decoding: DecodingKey::from_secret(secret),
      validation,
      access_ttl,
      invite_ttl,
    }
  }

  pub fn issue_access(&self, user_id: i64) -> Result<IssuedToken, ApiError> {
    self.issue(user_id, TokenKind::Access, None, self.access_ttl)
  }

  pub fn issue_invite(&self, merchant_id: i64, email: String) -> Result<IssuedToken, ApiError> {
    self.issue(merchant_id, TokenKind::Invite, Some(email), self.invite_ttl)
  }

  fn issue(
    &self,
    sub: i64,
    kind: TokenKind,
    email: Option<String>,
    ttl: Duration,
  ) -> Result<IssuedToken, ApiError> {
    let now = Utc::now();
    let expires_at = now + ttl;
    let claims = Claims {
      sub,
      kind,
      email,
      iat: now.timestamp(),
      exp: expires_at.timestamp(),
    };
    let token = encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
      .map_err(|e| ApiError::Internal(Box::new(e)))?;
    Ok(IssuedToken { token, expires_at })
  }

  /// Decode `token` and check that it is an unexpired token of `kind`.
  pub fn verify(&self, token: &str, kind: TokenKind) -> Result<Claims, ApiError> {
    let data = decode::<Claims>(token, &self.decoding, &self.validation)
      .map_err(|e| ApiError::unauthorized(format!("invalid token: {e}")))?;
    if data.claims.kind != kind {
      return Err(ApiError::unauthorized("wrong kind of token"));
    }
    Ok(data.claims)
  }
}

fn bearer_token(headers: &HeaderMap) -> Option<&str> {
  let bearer = headers
    .get(header::AUTHORIZATION)
    .and_then(|v| v.to_str().ok())
    .and_then(|v| v.strip_prefix("Bearer "));
  bearer
    .or_else(|| {
      headers
        .get(ACCESS_TOKEN_HEADER)
        .and_then(|v| v.to_str().ok())
    })
    .map(str::trim)
    .filter(|t| !t.is_empty())
}

// ─── Extractors ──────────────────────────────────────────────────────────────

/// The authenticated caller, freshly loaded from the store so that role
/// changes and deactivation take effect immediately.
pub struct CurrentUser(pub User);

impl<S> FromRequestParts<AppState<S>> for CurrentUser
where
  S: Repository + 'static,
{
  type Rejection = ApiError;

  async fn from_request_parts(
    parts: &mut Parts,
    state: &AppState<S>,
  ) -> Result<Self, Self::Rejection> {
    let token = bearer_token(&parts.headers)
      .ok_or_else(|| ApiError::unauthorized("missing access token"))?;
    let claims = state.tokens.verify(token, TokenKind::Access)?;

    let user = state
      .store
      .get_user(claims.sub)
      .await
      .map_err(ApiError::store)?
      .ok_or_else(|| ApiError::unauthorized("account no longer exists"))?;
    if !user.active {
      return Err(ApiError::unauthorized("account is deactivated"));
    }
    Ok(CurrentUser(user))
  }
}

/// An authenticated caller whose role is in `G`'s allowed set.
///
/// Being a parts extractor, it runs before any body extractor, so a caller
/// with the wrong role gets 403 even when the body is malformed.
pub struct Authorized<G> {
  pub user: User,
  _gate:    PhantomData<G>,
}

impl<G> Authorized<G> {
  pub fn viewer(&self) -> Viewer { self.user.viewer() }

  pub fn tenant_id(&self) -> i64 { self.user.tenant_id() }
}

impl<S, G> FromRequestParts<AppState<S>> for Authorized<G>
where
  S: Repository + 'static,
  G: Gate,
{
  type Rejection = ApiError;

  async fn from_request_parts(
    parts: &mut Parts,
    state: &AppState<S>,
  ) -> Result<Self, Self::Rejection> {
    let CurrentUser(user) = CurrentUser::from_request_parts(parts, state).await?;
    authorize(user.role, G::ALLOWED)?;
    Ok(Self { user, _gate: PhantomData })
  }
}

#[cfg(test)]
mod tests {
  use axum::http::HeaderValue;

  use super::*;

  fn keys() -> TokenKeys {
    TokenKeys::new(b"test-secret", Duration::minutes(60), Duration::hours(24))
  }

  #[test]
  fn password_round_trip() {
    let phc = hash_password("pw").unwrap();
    assert!(verify_password("pw", &phc));
    assert!(!verify_password("wrong", &phc));
    assert!(!verify_password("pw", "not a phc string"));
  }

  #[test]
  fn access_token_verifies() {
    let k = keys();
    let issued = k.issue_access(7).unwrap();
    let claims = k.verify(&issued.token, TokenKind::Access).unwrap();
    assert_eq!(claims.sub, 7);
    assert!(claims.email.is_none());
  }

  #[test]
  fn invite_is_not_an_access_token() {
    let k = keys();
    let issued = k.issue_invite(3, "a@duka.test".into()).unwrap();
    assert!(k.verify(&issued.token, TokenKind::Access).is_err());
    let claims = k.verify(&issued.token, TokenKind::Invite).unwrap();
    assert_eq!(claims.email.as_deref(), Some("a@duka.test"));
  }

  #[test]
  fn expired_and_foreign_tokens_rejected() {
    let expired = TokenKeys::new(b"test-secret", Duration::minutes(-5), Duration::hours(1));
    let issued = expired.issue_access(1).unwrap();
    assert!(matches!(
      keys().verify(&issued.token, TokenKind::Access),
      Err(ApiError::Unauthorized(_))
    ));

    let other = TokenKeys::new(b"other", Duration::minutes(5), Duration::hours(1));
    let issued = other.issue_access(1).unwrap();
    assert!(keys().verify(&issued.token, TokenKind::Access).is_err());
  }

  #[test]
  fn token_from_either_header() {
    let mut headers = HeaderMap::new();
    headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Bearer abc"));
    assert_eq!(bearer_token(&headers), Some("abc"));

    let mut headers = HeaderMap::new();
    headers.insert(ACCESS_TOKEN_HEADER, HeaderValue::from_static("xyz"));
    assert_eq!(bearer_token(&headers), Some("xyz"));

    assert_eq!(bearer_token(&HeaderMap::new()), None);
  }
}
