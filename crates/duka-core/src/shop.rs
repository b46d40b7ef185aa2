//! Stores (retail outlets) owned by merchants.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{Error, Result};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Store {
  pub id:          i64,
  pub name:        String,
  pub location:    String,
  pub merchant_id: i64,
  pub created_at:  DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewStore {
  pub name:     String,
  pub location: String,
}

/// Partial update; absent fields keep their current value.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct StoreUpdate {
  pub name:     Option<String>,
  pub location: Option<String>,
}

impl NewStore {
  pub fn validate(&self) -> Result<()> {
    if self.name.trim().is_empty() {
      return Err(Error::validation("store name must not be empty"));
    }
    if self.location.trim().is_empty() {
      return Err(Error::validation("store location must not be empty"));
    }
    Ok(())
  }
}

impl StoreUpdate {
  pub fn validate(&self) -> Result<()> {
    if self.name.as_deref().is_some_and(|n| n.trim().is_empty()) {
      return Err(Error::validation("store name must not be empty"));
    }
    Ok(())
  }
}
