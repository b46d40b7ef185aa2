//! Handlers for `/inventory` endpoints.
//!
//! | Method   | Path | Roles |
//! |----------|------|-------|
//! | `GET`    | `/inventory` | any (clerks: assigned items only) |
//! | `POST`   | `/inventory` | merchant, admin |
//! | `GET`    | `/inventory/{id}` | any |
//! | `PUT`    | `/inventory/{id}` | merchant, admin |
//! | `DELETE` | `/inventory/{id}` | merchant, admin |
//! | `POST`   | `/inventory/{id}/restock` | merchant, admin |
//! | `POST`   | `/inventory/assign` | merchant, admin |
//! | `GET`    | `/inventory/assigned` | clerk |
//! | `GET`    | `/inventory/payment_status?status=` | merchant, admin |

use axum::{
  Json,
  extract::{Path, State},
  http::StatusCode,
  response::IntoResponse,
};
use duka_core::{
  access::{AnyRole, ClerkOnly, MerchantOrAdmin},
  inventory::{Assignment, InventoryItem, InventoryUpdate, NewInventoryItem, PaymentStatus},
  ledger::Restock,
  repository::Repository,
};
use serde::Deserialize;

use crate::{
  AppState,
  auth::Authorized,
  error::ApiError,
  extract::{ApiJson, ApiQuery},
};

/// `GET /inventory`
pub async fn list<S>(
  State(state): State<AppState<S>>,
  auth: Authorized<AnyRole>,
) -> Result<Json<Vec<InventoryItem>>, ApiError>
where
  S: Repository + 'static,
{
  let items = state
    .store
    .list_items(auth.viewer(), None)
    .await
    .map_err(ApiError::store)?;
  Ok(Json(items))
}

/// `POST /inventory`
pub async fn create<S>(
  State(state): State<AppState<S>>,
  auth: Authorized<MerchantOrAdmin>,
  ApiJson(body): ApiJson<NewInventoryItem>,
) -> Result<impl IntoResponse, ApiError>
where
  S: Repository + 'static,
{
  let item = state
    .store
    .add_item(auth.viewer(), body)
    .await
    .map_err(ApiError::store)?;
  tracing::info!(
    item = item.id,
    store = item.store_id,
    stock = item.quantity_in_stock,
    "inventory added"
  );
  Ok((StatusCode::CREATED, Json(item)))
}

/// `GET /inventory/{id}`
pub async fn get_one<S>(
  State(state): State<AppState<S>>,
  auth: Authorized<AnyRole>,
  Path(id): Path<i64>,
) -> Result<Json<InventoryItem>, ApiError>
where
  S: Repository + 'static,
{
  let item = state
    .store
    .get_item(auth.viewer(), id)
    .await
    .map_err(ApiError::store)?
    .ok_or_else(|| ApiError::NotFound(format!("inventory item {id} not found")))?;
  Ok(Json(item))
}

/// `PUT /inventory/{id}`: any field but `quantity_in_stock`.
pub async fn update<S>(
  State(state): State<AppState<S>>,
  auth: Authorized<MerchantOrAdmin>,
  Path(id): Path<i64>,
  ApiJson(body): ApiJson<InventoryUpdate>,
) -> Result<Json<InventoryItem>, ApiError>
where
  S: Repository + 'static,
{
  let item = state
    .store
    .update_item(auth.viewer(), id, body)
    .await
    .map_err(ApiError::store)?;
  Ok(Json(item))
}

/// `DELETE /inventory/{id}`
pub async fn remove<S>(
  State(state): State<AppState<S>>,
  auth: Authorized<MerchantOrAdmin>,
  Path(id): Path<i64>,
) -> Result<StatusCode, ApiError>
where
  S: Repository + 'static,
{
  state
    .store
    .delete_item(auth.viewer(), id)
    .await
    .map_err(ApiError::store)?;
  tracing::info!(item = id, "inventory deleted");
  Ok(StatusCode::NO_CONTENT)
}

/// `POST /inventory/{id}/restock`
pub async fn restock<S>(
  State(state): State<AppState<S>>,
  auth: Authorized<MerchantOrAdmin>,
  Path(id): Path<i64>,
  ApiJson(body): ApiJson<Restock>,
) -> Result<impl IntoResponse, ApiError>
where
  S: Repository + 'static,
{
  let entry = state
    .store
    .restock(auth.viewer(), id, body)
    .await
    .map_err(ApiError::store)?;
  Ok((StatusCode::CREATED, Json(entry)))
}

/// `POST /inventory/assign`
pub async fn assign<S>(
  State(state): State<AppState<S>>,
  auth: Authorized<MerchantOrAdmin>,
  ApiJson(body): ApiJson<Assignment>,
) -> Result<Json<Vec<InventoryItem>>, ApiError>
where
  S: Repository + 'static,
{
  let items = state
    .store
    .assign_items(auth.viewer(), body)
    .await
    .map_err(ApiError::store)?;
  Ok(Json(items))
}

/// `GET /inventory/assigned`
pub async fn assigned<S>(
  State(state): State<AppState<S>>,
  auth: Authorized<ClerkOnly>,
) -> Result<Json<Vec<InventoryItem>>, ApiError>
where
  S: Repository + 'static,
{
  let items = state
    .store
    .list_items(auth.viewer(), None)
    .await
    .map_err(ApiError::store)?;
  Ok(Json(items))
}

#[derive(Debug, Deserialize)]
pub struct StatusParams {
  pub status: PaymentStatus,
}

/// `GET /inventory/payment_status?status=<paid|unpaid|pending>`
pub async fn by_payment_status<S>(
  State(state): State<AppState<S>>,
  auth: Authorized<MerchantOrAdmin>,
  ApiQuery(params): ApiQuery<StatusParams>,
) -> Result<Json<Vec<InventoryItem>>, ApiError>
where
  S: Repository + 'static,
{
  let items = state
    .store
    .list_items(auth.viewer(), Some(params.status))
    .await
    .map_err(ApiError::store)?;
  Ok(Json(items))
}
