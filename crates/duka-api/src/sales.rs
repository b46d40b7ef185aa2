//! Handlers for `/sales` endpoints.
//!
//! | Method   | Path | Roles |
//! |----------|------|-------|
//! | `GET`    | `/sales` | any |
//! | `POST`   | `/sales` | merchant, admin, clerk |
//! | `GET`    | `/sales/{id}` | any |
//! | `PUT`    | `/sales/{id}` | admin |
//! | `DELETE` | `/sales/{id}` | admin |
//!
//! Every role may record a sale; what a clerk can sell is limited to the
//! items assigned to them.

use axum::{
  Json,
  extract::{Path, State},
  http::StatusCode,
  response::IntoResponse,
};
use duka_core::{
  access::{AdminOnly, AnyRole},
  ledger::{LedgerEntry, NewSale, SaleUpdate},
  repository::Repository,
};

use crate::{AppState, auth::Authorized, error::ApiError, extract::ApiJson};

/// `GET /sales`
pub async fn list<S>(
  State(state): State<AppState<S>>,
  auth: Authorized<AnyRole>,
) -> Result<Json<Vec<LedgerEntry>>, ApiError>
where
  S: Repository + 'static,
{
  let sales = state
    .store
    .list_sales(auth.viewer())
    .await
    .map_err(ApiError::store)?;
  Ok(Json(sales))
}

/// `POST /sales`: body `{"inventory_id": 1, "quantity_sold": 4}`.
pub async fn record<S>(
  State(state): State<AppState<S>>,
  auth: Authorized<AnyRole>,
  ApiJson(body): ApiJson<NewSale>,
) -> Result<impl IntoResponse, ApiError>
where
  S: Repository + 'static,
{
  let sale = state
    .store
    .record_sale(auth.viewer(), body)
    .await
    .map_err(ApiError::store)?;
  Ok((StatusCode::CREATED, Json(sale)))
}

/// `GET /sales/{id}`
pub async fn get_one<S>(
  State(state): State<AppState<S>>,
  auth: Authorized<AnyRole>,
  Path(id): Path<i64>,
) -> Result<Json<LedgerEntry>, ApiError>
where
  S: Repository + 'static,
{
  let sale = state
    .store
    .get_sale(auth.viewer(), id)
    .await
    .map_err(ApiError::store)?
    .ok_or_else(|| ApiError::NotFound(format!("sale {id} not found")))?;
  Ok(Json(sale))
}

/// `PUT /sales/{id}`: correct the quantity sold.
pub async fn update<S>(
  State(state): State<AppState<S>>,
  auth: Authorized<AdminOnly>,
  Path(id): Path<i64>,
  ApiJson(body): ApiJson<SaleUpdate>,
) -> Result<Json<LedgerEntry>, ApiError>
where
  S: Repository + 'static,
{
  let sale = state
    .store
    .update_sale(auth.viewer(), id, body)
    .await
    .map_err(ApiError::store)?;
  tracing::info!(sale = id, quantity = sale.quantity, "sale corrected");
  Ok(Json(sale))
}

/// `DELETE /sales/{id}`
pub async fn void<S>(
  State(state): State<AppState<S>>,
  auth: Authorized<AdminOnly>,
  Path(id): Path<i64>,
) -> Result<StatusCode, ApiError>
where
  S: Repository + 'static,
{
  state
    .store
    .delete_sale(auth.viewer(), id)
    .await
    .map_err(ApiError::store)?;
  Ok(StatusCode::NO_CONTENT)
}
