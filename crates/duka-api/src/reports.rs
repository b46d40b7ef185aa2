//! Handlers for `/report` endpoints.
//!
//! | Method | Path | Roles |
//! |--------|------|-------|
//! | `POST` | `/report` | merchant, admin |
//! | `GET`  | `/report[?store_id=]` | merchant, admin |
//! | `GET`  | `/report/store_performance/{id}` | merchant, admin |
//! | `GET`  | `/report/admin_reports[?report_type=]` | admin |
//! | `GET`  | `/report/merchant_reports[?report_type=]` | merchant |
//!
//! Figures are always recomputed from the ledger. `POST /report` also
//! records what was generated, but that history never feeds later totals.

use axum::{
  Json,
  extract::{Path, State},
  http::StatusCode,
  response::IntoResponse,
};
use chrono::{DateTime, Utc};
use duka_core::{
  access::{AdminOnly, MerchantOnly, MerchantOrAdmin},
  report::{
    NewReport,
    Period,
    Report,
    ReportData,
    ReportKind,
    StorePerformance,
    StoreSales,
    rank_stores,
  },
  repository::Repository,
};
use serde::{Deserialize, Serialize};

use crate::{
  AppState,
  auth::Authorized,
  error::ApiError,
  extract::{ApiJson, ApiQuery},
};

fn since(period: Option<Period>) -> Option<DateTime<Utc>> {
  period.map(|p| p.window_start(Utc::now()))
}

// ─── Generate ────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct GenerateBody {
  #[serde(alias = "kind")]
  pub report_type: ReportKind,
  pub store_id:    i64,
  pub period:      Option<Period>,
}

#[derive(Debug, Serialize)]
pub struct Generated {
  pub report: Report,
  pub data:   ReportData,
}

/// `POST /report`: body `{"report_type": "sales", "store_id": 1, "period": "weekly"}`.
pub async fn generate<S>(
  State(state): State<AppState<S>>,
  auth: Authorized<MerchantOrAdmin>,
  ApiJson(body): ApiJson<GenerateBody>,
) -> Result<impl IntoResponse, ApiError>
where
  S: Repository + 'static,
{
  let tenant = auth.tenant_id();
  let data = match body.report_type {
    ReportKind::Sales => ReportData::Sales(
      state
        .store
        .sales_report(tenant, body.store_id, since(body.period))
        .await
        .map_err(ApiError::store)?,
    ),
    ReportKind::Stock => ReportData::Stock(
      state
        .store
        .stock_report(tenant, body.store_id)
        .await
        .map_err(ApiError::store)?,
    ),
  };

  let report = state
    .store
    .save_report(NewReport::from_data(&data, body.store_id, body.period, auth.user.id))
    .await
    .map_err(ApiError::store)?;
  tracing::info!(
    report = report.id,
    kind = %report.kind,
    store = report.store_id,
    "report generated"
  );
  Ok((StatusCode::CREATED, Json(Generated { report, data })))
}

// ─── History ─────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct HistoryParams {
  pub store_id: Option<i64>,
}

/// `GET /report[?store_id=<id>]`
pub async fn history<S>(
  State(state): State<AppState<S>>,
  auth: Authorized<MerchantOrAdmin>,
  ApiQuery(params): ApiQuery<HistoryParams>,
) -> Result<Json<Vec<Report>>, ApiError>
where
  S: Repository + 'static,
{
  let reports = state
    .store
    .list_reports(auth.tenant_id(), params.store_id)
    .await
    .map_err(ApiError::store)?;
  Ok(Json(reports))
}

// ─── Per-store views ─────────────────────────────────────────────────────────

/// `GET /report/store_performance/{id}`
pub async fn store_performance<S>(
  State(state): State<AppState<S>>,
  auth: Authorized<MerchantOrAdmin>,
  Path(id): Path<i64>,
) -> Result<Json<StorePerformance>, ApiError>
where
  S: Repository + 'static,
{
  let perf = state
    .store
    .store_performance(auth.tenant_id(), id)
    .await
    .map_err(ApiError::store)?;
  Ok(Json(perf))
}

#[derive(Debug, Deserialize)]
pub struct PeriodParams {
  pub report_type: Option<Period>,
}

/// `GET /report/admin_reports[?report_type=weekly|monthly|annual]`: stores
/// ranked by sales in the window, highest first.
pub async fn admin_reports<S>(
  State(state): State<AppState<S>>,
  auth: Authorized<AdminOnly>,
  ApiQuery(params): ApiQuery<PeriodParams>,
) -> Result<Json<Vec<StoreSales>>, ApiError>
where
  S: Repository + 'static,
{
  let mut totals = state
    .store
    .sales_by_store(auth.tenant_id(), since(params.report_type))
    .await
    .map_err(ApiError::store)?;
  rank_stores(&mut totals);
  Ok(Json(totals))
}

/// `GET /report/merchant_reports[?report_type=...]`: every store the
/// merchant owns, in store order, including those with no sales.
pub async fn merchant_reports<S>(
  State(state): State<AppState<S>>,
  auth: Authorized<MerchantOnly>,
  ApiQuery(params): ApiQuery<PeriodParams>,
) -> Result<Json<Vec<StoreSales>>, ApiError>
where
  S: Repository + 'static,
{
  let totals = state
    .store
    .sales_by_store(auth.tenant_id(), since(params.report_type))
    .await
    .map_err(ApiError::store)?;
  Ok(Json(totals))
}
