//! [`SqliteStore`]: the SQLite implementation of [`Repository`].

use std::path::Path;

use chrono::{DateTime, Utc};
use duka_core::{
  access::{Role, Viewer},
  inventory::{Assignment, InventoryItem, InventoryUpdate, NewInventoryItem, PaymentStatus},
  ledger::{LedgerEntry, NewSale, Restock, SaleUpdate},
  payment::{NewPayment, Payment},
  report::{NewReport, Report, SalesSummary, StockSummary, StorePerformance, StoreSales},
  repository::Repository,
  shop::{NewStore, Store, StoreUpdate},
  supply::{NewSupplyRequest, SupplyDecision, SupplyRequest},
  user::{Credentials, NewUser, User},
};

use crate::{
  Error,
  Result,
  schema::SCHEMA,
  sql::{self, Outcome},
};

// ─── Store ───────────────────────────────────────────────────────────────────

/// A MyDuka store backed by a single SQLite file.
///
/// Cloning is cheap; the inner connection handle is shared. All statements
/// execute on one background thread, so writers are serialised.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store, useful for testing.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  /// Run a query function that can fail with a domain error.
  async fn run<T, F>(&self, f: F) -> Result<T>
  where
    F: FnOnce(&mut rusqlite::Connection) -> Outcome<T> + Send + 'static,
    T: Send + 'static,
  {
    let outcome = self.conn.call(move |conn| Ok(f(conn)?)).await?;
    Ok(outcome?)
  }

  /// Run a query function with no domain failure modes.
  async fn query<T, F>(&self, f: F) -> Result<T>
  where
    F: FnOnce(&rusqlite::Connection) -> rusqlite::Result<T> + Send + 'static,
    T: Send + 'static,
  {
    Ok(self.conn.call(move |conn| Ok(f(&*conn)?)).await?)
  }
}

// ─── Repository impl ─────────────────────────────────────────────────────────

impl Repository for SqliteStore {
  type Error = Error;

  // ── Users ─────────────────────────────────────────────────────────────────

  async fn create_user(&self, input: NewUser) -> Result<User> {
    let user = self.run(move |c| sql::users::create(c, input)).await?;
    tracing::info!(user = user.id, role = %user.role, "account created");
    Ok(user)
  }

  async fn get_user(&self, id: i64) -> Result<Option<User>> {
    self.query(move |c| sql::users::get(c, id)).await
  }

  async fn find_credentials(&self, login: String) -> Result<Option<Credentials>> {
    self
      .query(move |c| sql::users::find_credentials(c, &login))
      .await
  }

  async fn list_users(&self, tenant_id: i64, role: Role) -> Result<Vec<User>> {
    self.query(move |c| sql::users::list(c, tenant_id, role)).await
  }

  async fn set_user_active(
    &self,
    tenant_id: i64,
    role: Role,
    id: i64,
    active: bool,
  ) -> Result<User> {
    self
      .run(move |c| sql::users::set_active(c, tenant_id, role, id, active))
      .await
  }

  async fn delete_user(&self, tenant_id: i64, role: Role, id: i64) -> Result<()> {
    self
      .run(move |c| sql::users::delete(c, tenant_id, role, id))
      .await
  }

  // ── Stores ────────────────────────────────────────────────────────────────

  async fn create_store(&self, merchant_id: i64, input: NewStore) -> Result<Store> {
    input.validate()?;
    self
      .run(move |c| sql::stores::create(c, merchant_id, input))
      .await
  }

  async fn list_stores(&self, tenant_id: i64) -> Result<Vec<Store>> {
    self.query(move |c| sql::stores::list(c, tenant_id)).await
  }

  async fn get_store(&self, tenant_id: i64, id: i64) -> Result<Option<Store>> {
    self.query(move |c| sql::stores::get(c, tenant_id, id)).await
  }

  async fn update_store(&self, tenant_id: i64, id: i64, update: StoreUpdate) -> Result<Store> {
    update.validate()?;
    self
      .run(move |c| sql::stores::update(c, tenant_id, id, update))
      .await
  }

  async fn delete_store(&self, tenant_id: i64, id: i64) -> Result<()> {
    self.run(move |c| sql::stores::delete(c, tenant_id, id)).await
  }

  // ── Inventory ─────────────────────────────────────────────────────────────

  async fn add_item(&self, viewer: Viewer, input: NewInventoryItem) -> Result<InventoryItem> {
    input.validate()?;
    self
      .run(move |c| sql::inventory::add(c, viewer, input))
      .await
  }

  async fn list_items(
    &self,
    viewer: Viewer,
    payment_status: Option<PaymentStatus>,
  ) -> Result<Vec<InventoryItem>> {
    self
      .query(move |c| sql::inventory::list(c, viewer, payment_status))
      .await
  }

  async fn get_item(&self, viewer: Viewer, id: i64) -> Result<Option<InventoryItem>> {
    self.query(move |c| sql::inventory::get(c, viewer, id)).await
  }

  async fn update_item(
    &self,
    viewer: Viewer,
    id: i64,
    update: InventoryUpdate,
  ) -> Result<InventoryItem> {
    update.validate()?;
    self
      .run(move |c| sql::inventory::update(c, viewer, id, update))
      .await
  }

  async fn delete_item(&self, viewer: Viewer, id: i64) -> Result<()> {
    self.run(move |c| sql::inventory::delete(c, viewer, id)).await
  }

  async fn assign_items(
    &self,
    viewer: Viewer,
    assignment: Assignment,
  ) -> Result<Vec<InventoryItem>> {
    let clerk = assignment.clerk_id;
    let items = self
      .run(move |c| sql::inventory::assign(c, viewer, assignment))
      .await?;
    tracing::info!(clerk, count = items.len(), "inventory assigned");
    Ok(items)
  }

  async fn restock(&self, viewer: Viewer, id: i64, input: Restock) -> Result<LedgerEntry> {
    let entry = self
      .run(move |c| sql::ledger::restock(c, viewer, id, input))
      .await?;
    tracing::info!(item = id, quantity = entry.quantity, "item restocked");
    Ok(entry)
  }

  // ── Sales ─────────────────────────────────────────────────────────────────

  async fn record_sale(&self, viewer: Viewer, input: NewSale) -> Result<LedgerEntry> {
    let entry = self
      .run(move |c| sql::ledger::record_sale(c, viewer, input))
      .await?;
    tracing::info!(
      sale = entry.id,
      item = entry.inventory_id,
      quantity = entry.quantity,
      total = %entry.total_price,
      "sale recorded"
    );
    Ok(entry)
  }

  async fn list_sales(&self, viewer: Viewer) -> Result<Vec<LedgerEntry>> {
    self.query(move |c| sql::ledger::list_sales(c, viewer)).await
  }

  async fn get_sale(&self, viewer: Viewer, id: i64) -> Result<Option<LedgerEntry>> {
    self.query(move |c| sql::ledger::get_sale(c, viewer, id)).await
  }

  async fn update_sale(&self, viewer: Viewer, id: i64, update: SaleUpdate) -> Result<LedgerEntry> {
    self
      .run(move |c| sql::ledger::update_sale(c, viewer, id, update))
      .await
  }

  async fn delete_sale(&self, viewer: Viewer, id: i64) -> Result<()> {
    self.run(move |c| sql::ledger::delete_sale(c, viewer, id)).await?;
    tracing::info!(sale = id, "sale voided");
    Ok(())
  }

  // ── Supply requests ───────────────────────────────────────────────────────

  async fn create_supply_request(
    &self,
    viewer: Viewer,
    input: NewSupplyRequest,
  ) -> Result<SupplyRequest> {
    self
      .run(move |c| sql::supply::create(c, viewer, input))
      .await
  }

  async fn list_supply_requests(&self, viewer: Viewer) -> Result<Vec<SupplyRequest>> {
    self.query(move |c| sql::supply::list(c, viewer)).await
  }

  async fn decide_supply_request(
    &self,
    viewer: Viewer,
    id: i64,
    decision: SupplyDecision,
  ) -> Result<SupplyRequest> {
    let request = self
      .run(move |c| sql::supply::decide(c, viewer, id, decision))
      .await?;
    tracing::info!(request = id, status = %request.status, "supply request decided");
    Ok(request)
  }

  async fn delete_supply_request(&self, viewer: Viewer, id: i64) -> Result<()> {
    self.run(move |c| sql::supply::delete(c, viewer, id)).await
  }

  // ── Payments ──────────────────────────────────────────────────────────────

  async fn record_payment(&self, viewer: Viewer, input: NewPayment) -> Result<Payment> {
    self
      .run(move |c| sql::payments::record(c, viewer, input))
      .await
  }

  async fn list_payments(&self, viewer: Viewer) -> Result<Vec<Payment>> {
    self.query(move |c| sql::payments::list(c, viewer)).await
  }

  // ── Reports ───────────────────────────────────────────────────────────────

  async fn sales_report(
    &self,
    tenant_id: i64,
    store_id: i64,
    since: Option<DateTime<Utc>>,
  ) -> Result<SalesSummary> {
    self
      .run(move |c| sql::reports::sales(c, tenant_id, store_id, since))
      .await
  }

  async fn stock_report(&self, tenant_id: i64, store_id: i64) -> Result<StockSummary> {
    self
      .run(move |c| sql::reports::stock(c, tenant_id, store_id))
      .await
  }

  async fn store_performance(&self, tenant_id: i64, store_id: i64) -> Result<StorePerformance> {
    self
      .run(move |c| sql::reports::performance(c, tenant_id, store_id))
      .await
  }

  async fn sales_by_store(
    &self,
    tenant_id: i64,
    since: Option<DateTime<Utc>>,
  ) -> Result<Vec<StoreSales>> {
    self
      .run(move |c| sql::reports::by_store(c, tenant_id, since))
      .await
  }

  async fn save_report(&self, input: NewReport) -> Result<Report> {
    self.query(move |c| sql::reports::save(c, input)).await
  }

  async fn list_reports(&self, tenant_id: i64, store_id: Option<i64>) -> Result<Vec<Report>> {
    self
      .query(move |c| sql::reports::list(c, tenant_id, store_id))
      .await
  }
}
