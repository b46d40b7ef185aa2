//! Clerk-initiated supply (restock) requests.

use chrono::{DateTime, Utc};
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
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum SupplyStatus {
  Pending,
  Approved,
  Declined,
}

impl SupplyStatus {
  /// Validate a status change. Only `pending` may move, and only to a final
  /// state.
  pub fn transition(self, to: SupplyStatus) -> Result<SupplyStatus> {
    match (self, to) {
      (Self::Pending, Self::Approved | Self::Declined) => Ok(to),
      (from, to) => Err(Error::InvalidTransition {
        from: from.to_string(),
        to:   to.to_string(),
      }),
    }
  }

  pub fn is_final(self) -> bool { !matches!(self, Self::Pending) }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SupplyRequest {
  pub id:           i64,
  pub inventory_id: i64,
  pub requested_by: i64,
  pub quantity:     i64,
  pub status:       SupplyStatus,
  pub decided_by:   Option<i64>,
  pub decided_at:   Option<DateTime<Utc>>,
  pub created_at:   DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewSupplyRequest {
  pub inventory_id: i64,
  #[serde(alias = "quantity_requested")]
  pub quantity:     i64,
}

/// Body of a decision on a pending request.
#[derive(Debug, Clone, Deserialize)]
pub struct SupplyDecision {
  pub status: SupplyStatus,
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn pending_moves_to_a_final_state() {
    use SupplyStatus::*;
    assert_eq!(Pending.transition(Approved).unwrap(), Approved);
    assert_eq!(Pending.transition(Declined).unwrap(), Declined);
  }

  #[test]
  fn never_backwards_or_sideways() {
    use SupplyStatus::*;
    for from in [Approved, Declined] {
      for to in [Pending, Approved, Declined] {
        assert!(matches!(
          from.transition(to),
          Err(Error::InvalidTransition { .. })
        ));
      }
    }
    assert!(Pending.transition(Pending).is_err());
  }
}
