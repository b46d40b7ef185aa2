//! Handlers for `/payment`: supplier payments against inventory items.

use axum::{
  Json,
  extract::State,
  http::StatusCode,
  response::IntoResponse,
};
use duka_core::{
  access::MerchantOrAdmin,
  payment::{NewPayment, Payment},
  repository::Repository,
};

use crate::{AppState, auth::Authorized, error::ApiError, extract::ApiJson};

/// `GET /payment`
pub async fn list<S>(
  State(state): State<AppState<S>>,
  auth: Authorized<MerchantOrAdmin>,
) -> Result<Json<Vec<Payment>>, ApiError>
where
  S: Repository + 'static,
{
  let payments = state
    .store
    .list_payments(auth.viewer())
    .await
    .map_err(ApiError::store)?;
  Ok(Json(payments))
}

/// `POST /payment`: also sets the item's payment status.
pub async fn record<S>(
  State(state): State<AppState<S>>,
  auth: Authorized<MerchantOrAdmin>,
  ApiJson(body): ApiJson<NewPayment>,
) -> Result<impl IntoResponse, ApiError>
where
  S: Repository + 'static,
{
  let payment = state
    .store
    .record_payment(auth.viewer(), body)
    .await
    .map_err(ApiError::store)?;
  tracing::info!(
    payment = payment.id,
    item = payment.inventory_id,
    status = %payment.status,
    amount = %payment.amount,
    "payment recorded"
  );
  Ok((StatusCode::CREATED, Json(payment)))
}
