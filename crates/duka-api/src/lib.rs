//! JSON REST API for MyDuka.
//!
//! Exposes an axum [`Router`] backed by any [`Repository`]. Every route
//! except registration, login and invitation acceptance requires an access
//! token; role checks run in the extractors before the body is read.
//!
//! # Mounting
//!
//! ```rust,ignore
//! let state = AppState::new(store, TokenKeys::new(secret, access_ttl, invite_ttl));
//! axum::serve(listener, duka_api::api_router(state)).await?;
//! ```

pub mod auth;
pub mod error;
pub mod extract;
pub mod inventory;
pub mod payments;
pub mod reports;
pub mod sales;
pub mod stores;
pub mod supply;
pub mod users;

use std::sync::Arc;

use axum::{
  Router,
  routing::{delete, get, patch, post, put},
};
use duka_core::repository::Repository;

pub use auth::TokenKeys;
pub use error::ApiError;

// ─── Application state ───────────────────────────────────────────────────────

/// Shared state threaded through all handlers.
pub struct AppState<S> {
  pub store:  Arc<S>,
  pub tokens: Arc<TokenKeys>,
}

impl<S> AppState<S> {
  pub fn new(store: S, tokens: TokenKeys) -> Self {
    Self {
      store:  Arc::new(store),
      tokens: Arc::new(tokens),
    }
  }
}

// Manual impl: `S` itself need not be `Clone`.
impl<S> Clone for AppState<S> {
  fn clone(&self) -> Self {
    Self {
      store:  Arc::clone(&self.store),
      tokens: Arc::clone(&self.tokens),
    }
  }
}

// ─── Router ──────────────────────────────────────────────────────────────────

/// Build a fully-materialised API router for `state`.
///
/// The returned `Router<()>` can be nested into any parent router regardless
/// of its own state type.
pub fn api_router<S>(state: AppState<S>) -> Router<()>
where
  S: Repository + 'static,
{
  Router::new()
    // Accounts
    .route("/register", post(users::register::<S>))
    .route("/register/admin/{token}", post(users::register_admin::<S>))
    .route("/login", post(users::login::<S>))
    .route("/me", get(users::me))
    .route("/users/admins/invite", post(users::invite_admin::<S>))
    .route("/users/admins", get(users::list_admins::<S>))
    .route("/users/admins/{id}", delete(users::delete_admin::<S>))
    .route("/users/admins/{id}/deactivate", patch(users::deactivate_admin::<S>))
    .route("/users/clerks", get(users::list_clerks::<S>).post(users::create_clerk::<S>))
    .route("/users/clerks/{id}", delete(users::delete_clerk::<S>))
    // Stores
    .route("/stores", get(stores::list::<S>).post(stores::create::<S>))
    .route(
      "/stores/{id}",
      get(stores::get_one::<S>)
        .put(stores::update::<S>)
        .delete(stores::remove::<S>),
    )
    // Inventory
    .route("/inventory", get(inventory::list::<S>).post(inventory::create::<S>))
    .route("/inventory/assign", post(inventory::assign::<S>))
    .route("/inventory/assigned", get(inventory::assigned::<S>))
    .route("/inventory/payment_status", get(inventory::by_payment_status::<S>))
    .route(
      "/inventory/{id}",
      get(inventory::get_one::<S>)
        .put(inventory::update::<S>)
        .delete(inventory::remove::<S>),
    )
    .route("/inventory/{id}/restock", post(inventory::restock::<S>))
    // Sales
    .route("/sales", get(sales::list::<S>).post(sales::record::<S>))
    .route(
      "/sales/{id}",
      get(sales::get_one::<S>)
        .put(sales::update::<S>)
        .delete(sales::void::<S>),
    )
    // Supply requests
    .route("/supply_requests", get(supply::list::<S>).post(supply::create::<S>))
    .route(
      "/supply_requests/{id}",
      put(supply::decide::<S>).delete(supply::remove::<S>),
    )
    // Payments
    .route("/payment", get(payments::list::<S>).post(payments::record::<S>))
    // Reports
    .route("/report", get(reports::history::<S>).post(reports::generate::<S>))
    .route("/report/store_performance/{id}", get(reports::store_performance::<S>))
    .route("/report/admin_reports", get(reports::admin_reports::<S>))
    .route("/report/merchant_reports", get(reports::merchant_reports::<S>))
    .with_state(state)
}

#[cfg(test)]
mod tests;
