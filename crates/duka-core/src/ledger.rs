//! The ledger: append-mostly sale and restock rows that move stock.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumString};

use crate::{Error, Result};

#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  Serialize,
  Deserialize,
  Display,
  AsRefStr,
  EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum EntryKind {
  Sale,
  Restock,
}

/// One stock movement. `total_price` is always `quantity * unit_price`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerEntry {
  pub id:           i64,
  pub inventory_id: i64,
  pub kind:         EntryKind,
  pub quantity:     i64,
  pub unit_price:   Decimal,
  pub total_price:  Decimal,
  pub recorded_by:  i64,
  pub created_at:   DateTime<Utc>,
}

/// Largest quantity a single sale, restock or supply request may move.
pub const MAX_QUANTITY: i64 = 1_000_000_000;

/// Price of `quantity` units at `unit_price`.
pub fn line_total(quantity: i64, unit_price: Decimal) -> Result<Decimal> {
  unit_price
    .checked_mul(Decimal::from(quantity))
    .ok_or_else(|| Error::validation("line total is out of range"))
}

/// Input to [`crate::repository::Repository::record_sale`].
///
/// The total is always computed from the item's selling price; callers cannot
/// supply it.
#[derive(Debug, Clone, Deserialize)]
pub struct NewSale {
  pub inventory_id:  i64,
  #[serde(alias = "quantity")]
  pub quantity_sold: i64,
}

/// Correction to an existing sale.
#[derive(Debug, Clone, Deserialize)]
pub struct SaleUpdate {
  #[serde(alias = "quantity")]
  pub quantity_sold: i64,
}

/// Input to [`crate::repository::Repository::restock`].
#[derive(Debug, Clone, Deserialize)]
pub struct Restock {
  pub quantity: i64,
}

pub fn validate_quantity(quantity: i64) -> Result<()> {
  if quantity <= 0 {
    return Err(Error::validation("quantity must be greater than zero"));
  }
  if quantity > MAX_QUANTITY {
    return Err(Error::validation(format!("quantity must not exceed {MAX_QUANTITY}")));
  }
  Ok(())
}

#[cfg(test)]
mod tests {
  use rust_decimal_macros::dec;

  use super::*;

  #[test]
  fn totals_are_exact() {
    assert_eq!(line_total(3, dec!(10)).unwrap(), dec!(30));
    assert_eq!(line_total(3, dec!(0.10)).unwrap(), dec!(0.30));
  }

  #[test]
  fn overflowing_total_is_rejected() {
    let err = line_total(i64::MAX, Decimal::MAX).unwrap_err();
    assert!(matches!(err, Error::Validation(_)));
  }

  #[test]
  fn quantity_must_be_positive() {
    assert!(validate_quantity(1).is_ok());
    assert!(validate_quantity(0).is_err());
    assert!(validate_quantity(-4).is_err());
    assert!(validate_quantity(MAX_QUANTITY).is_ok());
    assert!(validate_quantity(MAX_QUANTITY + 1).is_err());
  }

  #[test]
  fn sale_body_accepts_either_field_name() {
    let a: NewSale =
      serde_json::from_str(r#"{"inventory_id":1,"quantity_sold":4}"#).unwrap();
    let b: NewSale =
      serde_json::from_str(r#"{"inventory_id":1,"quantity":4}"#).unwrap();
    assert_eq!(a.quantity_sold, b.quantity_sold);
  }
}
