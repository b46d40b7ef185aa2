//! Inventory items and their payment status.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumString};

use crate::{Error, Result, ledger::MAX_QUANTITY};

/// Largest unit price an item may carry.
pub const MAX_PRICE: i64 = 1_000_000_000_000;

/// Whether the supplier has been paid for an item.
#[derive(
  Debug,
  Clone,
  Copy,
  Default,
  PartialEq,
  Eq,
  Serialize,
  Deserialize,
  Display,
  AsRefStr,
  EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum PaymentStatus {
  Paid,
  #[default]
  Unpaid,
  Pending,
}

/// A stocked product in one store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InventoryItem {
  pub id:                i64,
  pub product_name:      String,
  pub quantity_received: i64,
  /// Never negative. Lowered only by sales, raised only by restocks.
  pub quantity_in_stock: i64,
  pub quantity_spoilt:   i64,
  pub buying_price:      Decimal,
  pub selling_price:     Decimal,
  pub payment_status:    PaymentStatus,
  pub supplier:          Option<String>,
  pub store_id:          i64,
  /// The user who added the item.
  pub admin_id:          i64,
  pub created_at:        DateTime<Utc>,
}

/// Input to [`crate::repository::Repository::add_item`].
#[derive(Debug, Clone, Deserialize)]
pub struct NewInventoryItem {
  pub product_name:      String,
  pub quantity_received: i64,
  /// Defaults to `quantity_received - quantity_spoilt`.
  pub quantity_in_stock: Option<i64>,
  #[serde(default)]
  pub quantity_spoilt:   i64,
  pub buying_price:      Decimal,
  pub selling_price:     Decimal,
  #[serde(default)]
  pub payment_status:    PaymentStatus,
  pub supplier:          Option<String>,
  pub store_id:          i64,
}

impl NewInventoryItem {
  pub fn initial_stock(&self) -> i64 {
    self
      .quantity_in_stock
      .unwrap_or(self.quantity_received - self.quantity_spoilt)
  }

  pub fn validate(&self) -> Result<()> {
    if self.product_name.trim().is_empty() {
      return Err(Error::validation("product_name must not be empty"));
    }
    validate_quantities(&[
      Some(self.quantity_received),
      Some(self.quantity_spoilt),
      self.quantity_in_stock,
    ])?;
    if self.initial_stock() < 0 {
      return Err(Error::validation("quantity_in_stock must not be negative"));
    }
    validate_prices(Some(self.buying_price), Some(self.selling_price))
  }
}

/// Partial update for an item. `quantity_in_stock` is deliberately absent:
/// stock only moves through sales and restocks.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct InventoryUpdate {
  pub product_name:      Option<String>,
  pub quantity_received: Option<i64>,
  pub quantity_spoilt:   Option<i64>,
  pub buying_price:      Option<Decimal>,
  pub selling_price:     Option<Decimal>,
  pub payment_status:    Option<PaymentStatus>,
  pub supplier:          Option<String>,
}

impl InventoryUpdate {
  pub fn validate(&self) -> Result<()> {
    if self.product_name.as_deref().is_some_and(|n| n.trim().is_empty()) {
      return Err(Error::validation("product_name must not be empty"));
    }
    validate_quantities(&[self.quantity_received, self.quantity_spoilt])?;
    validate_prices(self.buying_price, self.selling_price)
  }

  /// Apply the patch to `item` in place.
  pub fn apply(self, item: &mut InventoryItem) {
    if let Some(v) = self.product_name {
      item.product_name = v;
    }
    if let Some(v) = self.quantity_received {
      item.quantity_received = v;
    }
    if let Some(v) = self.quantity_spoilt {
      item.quantity_spoilt = v;
    }
    if let Some(v) = self.buying_price {
      item.buying_price = v;
    }
    if let Some(v) = self.selling_price {
      item.selling_price = v;
    }
    if let Some(v) = self.payment_status {
      item.payment_status = v;
    }
    if let Some(v) = self.supplier {
      item.supplier = Some(v);
    }
  }
}

fn validate_quantities(quantities: &[Option<i64>]) -> Result<()> {
  for q in quantities.iter().flatten() {
    if *q < 0 {
      return Err(Error::validation("quantities must not be negative"));
    }
    if *q > MAX_QUANTITY {
      return Err(Error::validation(format!("quantities must not exceed {MAX_QUANTITY}")));
    }
  }
  Ok(())
}

fn validate_prices(buying: Option<Decimal>, selling: Option<Decimal>) -> Result<()> {
  let max = Decimal::from(MAX_PRICE);
  for p in [buying, selling].into_iter().flatten() {
    if p.is_sign_negative() {
      return Err(Error::validation("prices must not be negative"));
    }
    if p > max {
      return Err(Error::validation(format!("prices must not exceed {MAX_PRICE}")));
    }
  }
  Ok(())
}

/// Input to [`crate::repository::Repository::assign_items`].
#[derive(Debug, Clone, Deserialize)]
pub struct Assignment {
  pub clerk_id:      i64,
  #[serde(default)]
  pub inventory_ids: Vec<i64>,
}

#[cfg(test)]
mod tests {
  use rust_decimal_macros::dec;

  use super::*;

  fn new_item() -> NewInventoryItem {
    NewInventoryItem {
      product_name:      "Sugar 1kg".into(),
      quantity_received: 10,
      quantity_in_stock: None,
      quantity_spoilt:   2,
      buying_price:      dec!(80),
      selling_price:     dec!(100),
      payment_status:    PaymentStatus::Unpaid,
      supplier:          None,
      store_id:          1,
    }
  }

  #[test]
  fn initial_stock_defaults_to_received_minus_spoilt() {
    assert_eq!(new_item().initial_stock(), 8);
    let explicit = NewInventoryItem { quantity_in_stock: Some(10), ..new_item() };
    assert_eq!(explicit.initial_stock(), 10);
  }

  #[test]
  fn rejects_negative_values() {
    assert!(new_item().validate().is_ok());
    let neg = NewInventoryItem { quantity_in_stock: Some(-1), ..new_item() };
    assert!(neg.validate().is_err());
    let price = NewInventoryItem { selling_price: dec!(-1), ..new_item() };
    assert!(price.validate().is_err());
  }

  #[test]
  fn rejects_out_of_range_values() {
    let received = NewInventoryItem { quantity_received: i64::MAX, ..new_item() };
    assert!(received.validate().is_err());
    let stock = NewInventoryItem { quantity_in_stock: Some(MAX_QUANTITY + 1), ..new_item() };
    assert!(stock.validate().is_err());
    let price = NewInventoryItem {
      selling_price: Decimal::from(MAX_PRICE) + dec!(0.01),
      ..new_item()
    };
    assert!(price.validate().is_err());

    let patch = InventoryUpdate { buying_price: Some(Decimal::MAX), ..Default::default() };
    assert!(patch.validate().is_err());
    let patch = InventoryUpdate { quantity_spoilt: Some(i64::MAX), ..Default::default() };
    assert!(patch.validate().is_err());
  }

  #[test]
  fn update_leaves_absent_fields_alone() {
    let mut item = InventoryItem {
      id:                1,
      product_name:      "Salt".into(),
      quantity_received: 5,
      quantity_in_stock: 5,
      quantity_spoilt:   0,
      buying_price:      dec!(10),
      selling_price:     dec!(15),
      payment_status:    PaymentStatus::Unpaid,
      supplier:          None,
      store_id:          1,
      admin_id:          1,
      created_at:        Utc::now(),
    };
    InventoryUpdate {
      selling_price: Some(dec!(20)),
      payment_status: Some(PaymentStatus::Paid),
      ..Default::default()
    }
    .apply(&mut item);
    assert_eq!(item.selling_price, dec!(20));
    assert_eq!(item.payment_status, PaymentStatus::Paid);
    assert_eq!(item.product_name, "Salt");
    assert_eq!(item.quantity_in_stock, 5);
  }

  #[test]
  fn payment_status_from_mixed_case() {
    assert_eq!("Paid".parse::<PaymentStatus>().unwrap(), PaymentStatus::Paid);
    assert_eq!(PaymentStatus::default(), PaymentStatus::Unpaid);
  }
}
