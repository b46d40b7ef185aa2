//! Async HTTP client wrapping the MyDuka JSON API.

use std::time::Duration;

use anyhow::{Context, Result, anyhow};
use duka_core::{
  inventory::{InventoryItem, PaymentStatus},
  ledger::LedgerEntry,
  report::{Period, ReportKind, StorePerformance},
  shop::Store,
};
use reqwest::{Client, RequestBuilder, Response};
use serde::{Serialize, de::DeserializeOwned};
use serde_json::{Value, json};

/// Connection settings for the MyDuka API.
#[derive(Debug, Clone)]
pub struct ApiConfig {
  pub base_url: String,
  pub token:    Option<String>,
}

/// Async HTTP client for the MyDuka JSON API.
///
/// Cheap to clone; the inner [`reqwest::Client`] is `Arc`-based.
#[derive(Clone)]
pub struct ApiClient {
  client: Client,
  config: ApiConfig,
}

impl ApiClient {
  pub fn new(config: ApiConfig) -> Result<Self> {
    let client = Client::builder()
      .timeout(Duration::from_secs(30))
      .build()
      .context("failed to build HTTP client")?;
    Ok(Self { client, config })
  }

  fn url(&self, path: &str) -> String {
    format!("{}{}", self.config.base_url.trim_end_matches('/'), path)
  }

  fn auth(&self, req: RequestBuilder) -> RequestBuilder {
    match &self.config.token {
      Some(token) => req.bearer_auth(token),
      None => req,
    }
  }

  /// Send `req` and decode a successful body, surfacing the server's
  /// `{"error": ..}` message otherwise.
  async fn send<T: DeserializeOwned>(&self, what: &str, req: RequestBuilder) -> Result<T> {
    tracing::debug!(request = what, "sending");
    let resp = self
      .auth(req)
      .send()
      .await
      .with_context(|| format!("{what} failed"))?;
    decode(what, resp).await
  }

  async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
    self
      .send(&format!("GET {path}"), self.client.get(self.url(path)))
      .await
  }

  async fn post<T: DeserializeOwned>(&self, path: &str, body: &impl Serialize) -> Result<T> {
    self
      .send(&format!("POST {path}"), self.client.post(self.url(path)).json(body))
      .await
  }

  // ── Session ───────────────────────────────────────────────────────────────

  /// `POST /login`; returns the full login response.
  pub async fn login(&self, username: &str, password: &str) -> Result<Value> {
    self
      .post("/login", &json!({ "username": username, "password": password }))
      .await
  }

  // ── Stores and inventory ──────────────────────────────────────────────────

  /// `GET /stores`
  pub async fn list_stores(&self) -> Result<Vec<Store>> { self.get("/stores").await }

  /// `GET /inventory` or `GET /inventory/payment_status?status=<s>`
  pub async fn list_inventory(&self, status: Option<PaymentStatus>) -> Result<Vec<InventoryItem>> {
    match status {
      Some(s) => self.get(&format!("/inventory/payment_status?status={s}")).await,
      None => self.get("/inventory").await,
    }
  }

  /// `POST /sales`
  pub async fn sell(&self, inventory_id: i64, quantity_sold: i64) -> Result<LedgerEntry> {
    let body = json!({ "inventory_id": inventory_id, "quantity_sold": quantity_sold });
    self.post("/sales", &body).await
  }

  // ── Reports ───────────────────────────────────────────────────────────────

  /// `POST /report`
  pub async fn report(
    &self,
    store_id: i64,
    kind: ReportKind,
    period: Option<Period>,
  ) -> Result<Value> {
    let body = json!({ "report_type": kind, "store_id": store_id, "period": period });
    self.post("/report", &body).await
  }

  /// `GET /report/store_performance/{id}`
  pub async fn performance(&self, store_id: i64) -> Result<StorePerformance> {
    self
      .get(&format!("/report/store_performance/{store_id}"))
      .await
  }
}

async fn decode<T: DeserializeOwned>(what: &str, resp: Response) -> Result<T> {
  let status = resp.status();
  if status.is_success() {
    return resp
      .json()
      .await
      .with_context(|| format!("deserialising {what} response"));
  }
  let message = resp
    .json::<Value>()
    .await
    .ok()
    .and_then(|v| v.get("error").and_then(Value::as_str).map(str::to_owned))
    .unwrap_or_default();
  Err(anyhow!("{what} → {status} {message}"))
}
