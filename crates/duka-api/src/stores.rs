//! Handlers for `/stores` endpoints.
//!
//! | Method   | Path | Roles |
//! |----------|------|-------|
//! | `GET`    | `/stores` | any |
//! | `POST`   | `/stores` | merchant |
//! | `GET`    | `/stores/{id}` | any |
//! | `PUT`    | `/stores/{id}` | merchant |
//! | `DELETE` | `/stores/{id}` | merchant; 409 while inventory exists |

use axum::{
  Json,
  extract::{Path, State},
  http::StatusCode,
  response::IntoResponse,
};
use duka_core::{
  access::{AnyRole, MerchantOnly},
  repository::Repository,
  shop::{NewStore, Store, StoreUpdate},
};

use crate::{AppState, auth::Authorized, error::ApiError, extract::ApiJson};

/// `GET /stores`
pub async fn list<S>(
  State(state): State<AppState<S>>,
  auth: Authorized<AnyRole>,
) -> Result<Json<Vec<Store>>, ApiError>
where
  S: Repository + 'static,
{
  let stores = state
    .store
    .list_stores(auth.tenant_id())
    .await
    .map_err(ApiError::store)?;
  Ok(Json(stores))
}

/// `POST /stores`
pub async fn create<S>(
  State(state): State<AppState<S>>,
  auth: Authorized<MerchantOnly>,
  ApiJson(body): ApiJson<NewStore>,
) -> Result<impl IntoResponse, ApiError>
where
  S: Repository + 'static,
{
  let store = state
    .store
    .create_store(auth.user.id, body)
    .await
    .map_err(ApiError::store)?;
  tracing::info!(store = store.id, name = %store.name, "store created");
  Ok((StatusCode::CREATED, Json(store)))
}

/// `GET /stores/{id}`
pub async fn get_one<S>(
  State(state): State<AppState<S>>,
  auth: Authorized<AnyRole>,
  Path(id): Path<i64>,
) -> Result<Json<Store>, ApiError>
where
  S: Repository + 'static,
{
  let store = state
    .store
    .get_store(auth.tenant_id(), id)
    .await
    .map_err(ApiError::store)?
    .ok_or_else(|| ApiError::NotFound(format!("store {id} not found")))?;
  Ok(Json(store))
}

/// `PUT /stores/{id}`
pub async fn update<S>(
  State(state): State<AppState<S>>,
  auth: Authorized<MerchantOnly>,
  Path(id): Path<i64>,
  ApiJson(body): ApiJson<StoreUpdate>,
) -> Result<Json<Store>, ApiError>
where
  S: Repository + 'static,
{
  let store = state
    .store
    .update_store(auth.tenant_id(), id, body)
    .await
    .map_err(ApiError::store)?;
  Ok(Json(store))
}

/// `DELETE /stores/{id}`
pub async fn remove<S>(
  State(state): State<AppState<S>>,
  auth: Authorized<MerchantOnly>,
  Path(id): Path<i64>,
) -> Result<StatusCode, ApiError>
where
  S: Repository + 'static,
{
  state
    .store
    .delete_store(auth.tenant_id(), id)
    .await
    .map_err(ApiError::store)?;
  tracing::info!(store = id, "store deleted");
  Ok(StatusCode::NO_CONTENT)
}
