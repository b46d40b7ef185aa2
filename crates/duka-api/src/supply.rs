//! Handlers for `/supply_requests` endpoints.
//!
//! | Method   | Path | Roles |
//! |----------|------|-------|
//! | `GET`    | `/supply_requests` | any (clerks: their own) |
//! | `POST`   | `/supply_requests` | clerk |
//! | `PUT`    | `/supply_requests/{id}` | merchant, admin; `{"status": "approved"}` |
//! | `DELETE` | `/supply_requests/{id}` | admin |

use axum::{
  Json,
  extract::{Path, State},
  http::StatusCode,
  response::IntoResponse,
};
use duka_core::{
  access::{AdminOnly, AnyRole, ClerkOnly, MerchantOrAdmin},
  repository::Repository,
  supply::{NewSupplyRequest, SupplyDecision, SupplyRequest},
};

use crate::{AppState, auth::Authorized, error::ApiError, extract::ApiJson};

/// `GET /supply_requests`
pub async fn list<S>(
  State(state): State<AppState<S>>,
  auth: Authorized<AnyRole>,
) -> Result<Json<Vec<SupplyRequest>>, ApiError>
where
  S: Repository + 'static,
{
  let requests = state
    .store
    .list_supply_requests(auth.viewer())
    .await
    .map_err(ApiError::store)?;
  Ok(Json(requests))
}

/// `POST /supply_requests`
pub async fn create<S>(
  State(state): State<AppState<S>>,
  auth: Authorized<ClerkOnly>,
  ApiJson(body): ApiJson<NewSupplyRequest>,
) -> Result<impl IntoResponse, ApiError>
where
  S: Repository + 'static,
{
  let request = state
    .store
    .create_supply_request(auth.viewer(), body)
    .await
    .map_err(ApiError::store)?;
  tracing::info!(
    request = request.id,
    item = request.inventory_id,
    quantity = request.quantity,
    "supply requested"
  );
  Ok((StatusCode::CREATED, Json(request)))
}

/// `PUT /supply_requests/{id}`
pub async fn decide<S>(
  State(state): State<AppState<S>>,
  auth: Authorized<MerchantOrAdmin>,
  Path(id): Path<i64>,
  ApiJson(body): ApiJson<SupplyDecision>,
) -> Result<Json<SupplyRequest>, ApiError>
where
  S: Repository + 'static,
{
  let request = state
    .store
    .decide_supply_request(auth.viewer(), id, body)
    .await
    .map_err(ApiError::store)?;
  Ok(Json(request))
}

/// `DELETE /supply_requests/{id}`
pub async fn remove<S>(
  State(state): State<AppState<S>>,
  auth: Authorized<AdminOnly>,
  Path(id): Path<i64>,
) -> Result<StatusCode, ApiError>
where
  S: Repository + 'static,
{
  state
    .store
    .delete_supply_request(auth.viewer(), id)
    .await
    .map_err(ApiError::store)?;
  Ok(StatusCode::NO_CONTENT)
}
