//! Handlers for accounts: registration, login, admin invitations, and the
//! admin and clerk rosters.
//!
//! | Method   | Path | Roles |
//! |----------|------|-------|
//! | `POST`   | `/register` | public |
//! | `POST`   | `/login` | public |
//! | `GET`    | `/me` | any |
//! | `POST`   | `/users/admins/invite` | merchant |
//! | `POST`   | `/register/admin/{token}` | public (invitation token) |
//! | `GET`    | `/users/admins` | merchant |
//! | `PATCH`  | `/users/admins/{id}/deactivate` | merchant |
//! | `DELETE` | `/users/admins/{id}` | merchant |
//! | `GET`    | `/users/clerks` | admin |
//! | `POST`   | `/users/clerks` | admin |
//! | `DELETE` | `/users/clerks/{id}` | admin |

use axum::{
  Json,
  extract::{Path, State},
  http::StatusCode,
  response::IntoResponse,
};
use chrono::{DateTime, Utc};
use duka_core::{
  access::{AdminOnly, MerchantOnly, Role},
  repository::Repository,
  user::{NewUser, User, validate_account, validate_email},
};
use serde::{Deserialize, Serialize};

use crate::{
  AppState,
  auth::{Authorized, CurrentUser, TokenKind, hash_password, verify_password},
  error::ApiError,
  extract::ApiJson,
};

#[derive(Debug, Deserialize)]
pub struct SignupBody {
  pub username: String,
  pub email:    String,
  pub password: String,
}

async fn sign_up<S: Repository>(
  store: &S,
  body: SignupBody,
  role: Role,
  merchant_id: Option<i64>,
) -> Result<User, ApiError> {
  validate_account(&body.username, &body.email, &body.password)?;
  let user = store
    .create_user(NewUser {
      username: body.username.trim().to_owned(),
      email: body.email.trim().to_owned(),
      password_hash: hash_password(&body.password)?,
      role,
      merchant_id,
    })
    .await
    .map_err(ApiError::store)?;
  Ok(user)
}

// ─── Register / login ────────────────────────────────────────────────────────

/// `POST /register`: self-service merchant signup.
pub async fn register<S>(
  State(state): State<AppState<S>>,
  ApiJson(body): ApiJson<SignupBody>,
) -> Result<impl IntoResponse, ApiError>
where
  S: Repository + 'static,
{
  let user = sign_up(state.store.as_ref(), body, Role::Merchant, None).await?;
  Ok((StatusCode::CREATED, Json(user)))
}

#[derive(Debug, Deserialize)]
pub struct LoginBody {
  /// Username or email address.
  #[serde(alias = "email")]
  pub username: String,
  pub password: String,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
  pub access_token: String,
  pub token_type:   &'static str,
  pub expires_at:   DateTime<Utc>,
  pub user:         User,
}

/// `POST /login`
pub async fn login<S>(
  State(state): State<AppState<S>>,
  ApiJson(body): ApiJson<LoginBody>,
) -> Result<Json<LoginResponse>, ApiError>
where
  S: Repository + 'static,
{
  let creds = state
    .store
    .find_credentials(body.username.trim().to_owned())
    .await
    .map_err(ApiError::store)?
    .filter(|c| verify_password(&body.password, &c.password_hash))
    .ok_or_else(|| ApiError::unauthorized("invalid username or password"))?;
  if !creds.user.active {
    return Err(ApiError::unauthorized("account is deactivated"));
  }

  let issued = state.tokens.issue_access(creds.user.id)?;
  tracing::info!(user = creds.user.id, "login");
  Ok(Json(LoginResponse {
    access_token: issued.token,
    token_type:   "Bearer",
    expires_at:   issued.expires_at,
    user:         creds.user,
  }))
}

/// `GET /me`
pub async fn me(CurrentUser(user): CurrentUser) -> Json<User> { Json(user) }

// ─── Admin invitations ───────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct InviteBody {
  pub email: String,
}

#[derive(Debug, Serialize)]
pub struct InviteResponse {
  pub email:        String,
  pub invite_token: String,
  pub expires_at:   DateTime<Utc>,
}

/// `POST /users/admins/invite`
///
/// Returns the invitation token; delivering it to the invitee is left to the
/// caller.
pub async fn invite_admin<S>(
  State(state): State<AppState<S>>,
  auth: Authorized<MerchantOnly>,
  ApiJson(body): ApiJson<InviteBody>,
) -> Result<impl IntoResponse, ApiError>
where
  S: Repository + 'static,
{
  let email = body.email.trim().to_owned();
  validate_email(&email)?;
  let issued = state.tokens.issue_invite(auth.user.id, email.clone())?;
  tracing::info!(merchant = auth.user.id, %email, "admin invited");
  Ok((
    StatusCode::CREATED,
    Json(InviteResponse {
      email,
      invite_token: issued.token,
      expires_at: issued.expires_at,
    }),
  ))
}

#[derive(Debug, Deserialize)]
pub struct AdminSignupBody {
  pub username: String,
  pub password: String,
}

/// `POST /register/admin/{token}`: accept an invitation.
pub async fn register_admin<S>(
  State(state): State<AppState<S>>,
  Path(token): Path<String>,
  ApiJson(body): ApiJson<AdminSignupBody>,
) -> Result<impl IntoResponse, ApiError>
where
  S: Repository + 'static,
{
  let claims = state.tokens.verify(&token, TokenKind::Invite)?;
  let email = claims
    .email
    .ok_or_else(|| ApiError::unauthorized("invitation has no address"))?;

  let merchant = state
    .store
    .get_user(claims.sub)
    .await
    .map_err(ApiError::store)?
    .filter(|u| u.role == Role::Merchant && u.active)
    .ok_or_else(|| ApiError::unauthorized("inviting merchant no longer exists"))?;

  let signup = SignupBody {
    username: body.username,
    email,
    password: body.password,
  };
  let user = sign_up(state.store.as_ref(), signup, Role::Admin, Some(merchant.id)).await?;
  Ok((StatusCode::CREATED, Json(user)))
}

// ─── Admins ──────────────────────────────────────────────────────────────────

/// `GET /users/admins`
pub async fn list_admins<S>(
  State(state): State<AppState<S>>,
  auth: Authorized<MerchantOnly>,
) -> Result<Json<Vec<User>>, ApiError>
where
  S: Repository + 'static,
{
  let admins = state
    .store
    .list_users(auth.tenant_id(), Role::Admin)
    .await
    .map_err(ApiError::store)?;
  Ok(Json(admins))
}

/// `PATCH /users/admins/{id}/deactivate`
pub async fn deactivate_admin<S>(
  State(state): State<AppState<S>>,
  auth: Authorized<MerchantOnly>,
  Path(id): Path<i64>,
) -> Result<Json<User>, ApiError>
where
  S: Repository + 'static,
{
  let admin = state
    .store
    .set_user_active(auth.tenant_id(), Role::Admin, id, false)
    .await
    .map_err(ApiError::store)?;
  tracing::info!(admin = id, "admin deactivated");
  Ok(Json(admin))
}

/// `DELETE /users/admins/{id}`
pub async fn delete_admin<S>(
  State(state): State<AppState<S>>,
  auth: Authorized<MerchantOnly>,
  Path(id): Path<i64>,
) -> Result<StatusCode, ApiError>
where
  S: Repository + 'static,
{
  state
    .store
    .delete_user(auth.tenant_id(), Role::Admin, id)
    .await
    .map_err(ApiError::store)?;
  tracing::info!(admin = id, "admin deleted");
  Ok(StatusCode::NO_CONTENT)
}

// ─── Clerks ──────────────────────────────────────────────────────────────────

/// `POST /users/clerks`
pub async fn create_clerk<S>(
  State(state): State<AppState<S>>,
  auth: Authorized<AdminOnly>,
  ApiJson(body): ApiJson<SignupBody>,
) -> Result<impl IntoResponse, ApiError>
where
  S: Repository + 'static,
{
  let clerk = sign_up(state.store.as_ref(), body, Role::Clerk, Some(auth.tenant_id())).await?;
  Ok((StatusCode::CREATED, Json(clerk)))
}

/// `GET /users/clerks`
pub async fn list_clerks<S>(
  State(state): State<AppState<S>>,
  auth: Authorized<AdminOnly>,
) -> Result<Json<Vec<User>>, ApiError>
where
  S: Repository + 'static,
{
  let clerks = state
    .store
    .list_users(auth.tenant_id(), Role::Clerk)
    .await
    .map_err(ApiError::store)?;
  Ok(Json(clerks))
}

/// `DELETE /users/clerks/{id}`
pub async fn delete_clerk<S>(
  State(state): State<AppState<S>>,
  auth: Authorized<AdminOnly>,
  Path(id): Path<i64>,
) -> Result<StatusCode, ApiError>
where
  S: Repository + 'static,
{
  state
    .store
    .delete_user(auth.tenant_id(), Role::Clerk, id)
    .await
    .map_err(ApiError::store)?;
  tracing::info!(clerk = id, "clerk deleted");
  Ok(StatusCode::NO_CONTENT)
}
