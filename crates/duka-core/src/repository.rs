//! The `Repository` trait.
//!
//! Implemented by storage backends (e.g. `duka-store-sqlite`). The API layer
//! depends on this abstraction, not on any concrete backend.
//!
//! Every read and write below is scoped by a [`Viewer`] or a tenant id: rows
//! belonging to another merchant's stores behave exactly as if they did not
//! exist. Operations that move stock must be atomic with respect to each
//! other.

use std::future::Future;

use chrono::{DateTime, Utc};

use crate::{
  StoreError,
  access::{Role, Viewer},
  inventory::{Assignment, InventoryItem, InventoryUpdate, NewInventoryItem, PaymentStatus},
  ledger::{LedgerEntry, NewSale, Restock, SaleUpdate},
  payment::{NewPayment, Payment},
  report::{NewReport, Report, SalesSummary, StockSummary, StorePerformance, StoreSales},
  shop::{NewStore, Store, StoreUpdate},
  supply::{NewSupplyRequest, SupplyDecision, SupplyRequest},
  user::{Credentials, NewUser, User},
};

/// Abstraction over a MyDuka storage backend.
///
/// All methods return `Send` futures so the trait can be used in
/// multi-threaded async runtimes (e.g. tokio with `axum`).
pub trait Repository: Send + Sync {
  type Error: StoreError;

  // ── Users ─────────────────────────────────────────────────────────────

  /// Persist a new account. A taken username or email is a
  /// [`crate::Error::Conflict`] and writes nothing.
  fn create_user(
    &self,
    input: NewUser,
  ) -> impl Future<Output = Result<User, Self::Error>> + Send + '_;

  fn get_user(
    &self,
    id: i64,
  ) -> impl Future<Output = Result<Option<User>, Self::Error>> + Send + '_;

  /// Look an account up by username or email for password verification.
  fn find_credentials(
    &self,
    login: String,
  ) -> impl Future<Output = Result<Option<Credentials>, Self::Error>> + Send + '_;

  /// Users with `role` belonging to `tenant_id`.
  fn list_users(
    &self,
    tenant_id: i64,
    role: Role,
  ) -> impl Future<Output = Result<Vec<User>, Self::Error>> + Send + '_;

  /// Activate or deactivate a user with `role` in `tenant_id`.
  fn set_user_active(
    &self,
    tenant_id: i64,
    role: Role,
    id: i64,
    active: bool,
  ) -> impl Future<Output = Result<User, Self::Error>> + Send + '_;

  fn delete_user(
    &self,
    tenant_id: i64,
    role: Role,
    id: i64,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  // ── Stores ────────────────────────────────────────────────────────────

  fn create_store(
    &self,
    merchant_id: i64,
    input: NewStore,
  ) -> impl Future<Output = Result<Store, Self::Error>> + Send + '_;

  fn list_stores(
    &self,
    tenant_id: i64,
  ) -> impl Future<Output = Result<Vec<Store>, Self::Error>> + Send + '_;

  fn get_store(
    &self,
    tenant_id: i64,
    id: i64,
  ) -> impl Future<Output = Result<Option<Store>, Self::Error>> + Send + '_;

  fn update_store(
    &self,
    tenant_id: i64,
    id: i64,
    update: StoreUpdate,
  ) -> impl Future<Output = Result<Store, Self::Error>> + Send + '_;

  /// Fails with a conflict while the store still holds inventory.
  fn delete_store(
    &self,
    tenant_id: i64,
    id: i64,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  // ── Inventory ─────────────────────────────────────────────────────────

  fn add_item(
    &self,
    viewer: Viewer,
    input: NewInventoryItem,
  ) -> impl Future<Output = Result<InventoryItem, Self::Error>> + Send + '_;

  /// Items visible to `viewer`, optionally filtered by payment status.
  fn list_items(
    &self,
    viewer: Viewer,
    payment_status: Option<PaymentStatus>,
  ) -> impl Future<Output = Result<Vec<InventoryItem>, Self::Error>> + Send + '_;

  fn get_item(
    &self,
    viewer: Viewer,
    id: i64,
  ) -> impl Future<Output = Result<Option<InventoryItem>, Self::Error>> + Send + '_;

  fn update_item(
    &self,
    viewer: Viewer,
    id: i64,
    update: InventoryUpdate,
  ) -> impl Future<Output = Result<InventoryItem, Self::Error>> + Send + '_;

  /// Fails with a conflict while ledger rows reference the item.
  fn delete_item(
    &self,
    viewer: Viewer,
    id: i64,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  /// Assign items to a clerk in the viewer's tenant. Ids that do not name a
  /// visible item are skipped; the items actually assigned are returned.
  fn assign_items(
    &self,
    viewer: Viewer,
    assignment: Assignment,
  ) -> impl Future<Output = Result<Vec<InventoryItem>, Self::Error>> + Send + '_;

  /// Add stock outside the supply-request flow and record a restock entry.
  fn restock(
    &self,
    viewer: Viewer,
    id: i64,
    input: Restock,
  ) -> impl Future<Output = Result<LedgerEntry, Self::Error>> + Send + '_;

  // ── Sales ─────────────────────────────────────────────────────────────

  /// Atomically check and decrement stock, then append a sale entry priced
  /// at the item's selling price. A request for more than the current stock
  /// fails with [`crate::Error::InsufficientStock`] and changes nothing.
  fn record_sale(
    &self,
    viewer: Viewer,
    input: NewSale,
  ) -> impl Future<Output = Result<LedgerEntry, Self::Error>> + Send + '_;

  fn list_sales(
    &self,
    viewer: Viewer,
  ) -> impl Future<Output = Result<Vec<LedgerEntry>, Self::Error>> + Send + '_;

  fn get_sale(
    &self,
    viewer: Viewer,
    id: i64,
  ) -> impl Future<Output = Result<Option<LedgerEntry>, Self::Error>> + Send + '_;

  /// Change the quantity of a sale, moving the difference in or out of stock
  /// in the same transaction.
  fn update_sale(
    &self,
    viewer: Viewer,
    id: i64,
    update: SaleUpdate,
  ) -> impl Future<Output = Result<LedgerEntry, Self::Error>> + Send + '_;

  /// Void a sale and return its quantity to stock.
  fn delete_sale(
    &self,
    viewer: Viewer,
    id: i64,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  // ── Supply requests ───────────────────────────────────────────────────

  fn create_supply_request(
    &self,
    viewer: Viewer,
    input: NewSupplyRequest,
  ) -> impl Future<Output = Result<SupplyRequest, Self::Error>> + Send + '_;

  /// Clerks see their own requests; other roles see the whole tenant's.
  fn list_supply_requests(
    &self,
    viewer: Viewer,
  ) -> impl Future<Output = Result<Vec<SupplyRequest>, Self::Error>> + Send + '_;

  /// Approve or decline a pending request. Approval restocks the item in the
  /// same transaction.
  fn decide_supply_request(
    &self,
    viewer: Viewer,
    id: i64,
    decision: SupplyDecision,
  ) -> impl Future<Output = Result<SupplyRequest, Self::Error>> + Send + '_;

  fn delete_supply_request(
    &self,
    viewer: Viewer,
    id: i64,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  // ── Payments ──────────────────────────────────────────────────────────

  /// Record a payment and copy its status onto the item.
  fn record_payment(
    &self,
    viewer: Viewer,
    input: NewPayment,
  ) -> impl Future<Output = Result<Payment, Self::Error>> + Send + '_;

  fn list_payments(
    &self,
    viewer: Viewer,
  ) -> impl Future<Output = Result<Vec<Payment>, Self::Error>> + Send + '_;

  // ── Reports ───────────────────────────────────────────────────────────

  /// Sales for one store recorded at or after `since` (all time if `None`).
  fn sales_report(
    &self,
    tenant_id: i64,
    store_id: i64,
    since: Option<DateTime<Utc>>,
  ) -> impl Future<Output = Result<SalesSummary, Self::Error>> + Send + '_;

  fn stock_report(
    &self,
    tenant_id: i64,
    store_id: i64,
  ) -> impl Future<Output = Result<StockSummary, Self::Error>> + Send + '_;

  fn store_performance(
    &self,
    tenant_id: i64,
    store_id: i64,
  ) -> impl Future<Output = Result<StorePerformance, Self::Error>> + Send + '_;

  /// Sales totals for every store in the tenant, in store id order.
  fn sales_by_store(
    &self,
    tenant_id: i64,
    since: Option<DateTime<Utc>>,
  ) -> impl Future<Output = Result<Vec<StoreSales>, Self::Error>> + Send + '_;

  fn save_report(
    &self,
    input: NewReport,
  ) -> impl Future<Output = Result<Report, Self::Error>> + Send + '_;

  fn list_reports(
    &self,
    tenant_id: i64,
    store_id: Option<i64>,
  ) -> impl Future<Output = Result<Vec<Report>, Self::Error>> + Send + '_;
}
