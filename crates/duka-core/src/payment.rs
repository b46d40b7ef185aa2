//! Supplier payments against inventory items.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::{Error, Result, inventory::PaymentStatus};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Payment {
  pub id:           i64,
  pub inventory_id: i64,
  pub status:       PaymentStatus,
  pub amount:       Decimal,
  pub processed_by: i64,
  pub created_at:   DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewPayment {
  pub inventory_id: i64,
  pub status:       PaymentStatus,
  pub amount:       Decimal,
}

impl NewPayment {
  pub fn validate(&self) -> Result<()> {
    if self.amount <= Decimal::ZERO {
      return Err(Error::validation("amount must be greater than zero"));
    }
    Ok(())
  }
}

#[cfg(test)]
mod tests {
  use rust_decimal_macros::dec;

  use super::*;

  #[test]
  fn amount_must_be_positive() {
    let mut p = NewPayment {
      inventory_id: 1,
      status:       PaymentStatus::Paid,
      amount:       dec!(0.01),
    };
    assert!(p.validate().is_ok());
    p.amount = Decimal::ZERO;
    assert!(p.validate().is_err());
    p.amount = dec!(-5);
    assert!(p.validate().is_err());
  }
}
