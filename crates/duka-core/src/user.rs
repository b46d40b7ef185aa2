//! User accounts and tenancy.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{
  Error, Result,
  access::{Role, Viewer},
};

/// A user account. The password hash never leaves the storage layer through
/// this type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
  pub id:          i64,
  pub username:    String,
  pub email:       String,
  pub role:        Role,
  /// The merchant this account works for; `None` for merchants themselves.
  pub merchant_id: Option<i64>,
  pub active:      bool,
  pub created_at:  DateTime<Utc>,
}

impl User {
  /// The id of the merchant whose stores this user may see.
  pub fn tenant_id(&self) -> i64 { self.merchant_id.unwrap_or(self.id) }

  pub fn viewer(&self) -> Viewer {
    Viewer {
      user_id:   self.id,
      role:      self.role,
      tenant_id: self.tenant_id(),
    }
  }
}

/// Input to [`crate::repository::Repository::create_user`].
#[derive(Debug, Clone)]
pub struct NewUser {
  pub username:      String,
  pub email:         String,
  /// PHC string produced by the password hasher.
  pub password_hash: String,
  pub role:          Role,
  pub merchant_id:   Option<i64>,
}

/// A user together with the stored password hash, returned only by the
/// login lookup.
#[derive(Debug, Clone)]
pub struct Credentials {
  pub user:          User,
  pub password_hash: String,
}

/// Check the fields a caller supplies when creating an account.
pub fn validate_account(username: &str, email: &str, password: &str) -> Result<()> {
  if username.trim().is_empty() {
    return Err(Error::validation("username must not be empty"));
  }
  validate_email(email)?;
  if password.is_empty() {
    return Err(Error::validation("password must not be empty"));
  }
  Ok(())
}

/// A loose shape check: something, an `@`, and a dotted domain.
pub fn validate_email(email: &str) -> Result<()> {
  let well_formed = email
    .split_once('@')
    .is_some_and(|(local, domain)| !local.is_empty() && domain.contains('.'));
  if !well_formed {
    return Err(Error::validation(format!("invalid email address: {email:?}")));
  }
  Ok(())
}

#[cfg(test)]
mod tests {
  use super::*;

  fn user(id: i64, role: Role, merchant_id: Option<i64>) -> User {
    User {
      id,
      username: format!("u{id}"),
      email: format!("u{id}@example.com"),
      role,
      merchant_id,
      active: true,
      created_at: Utc::now(),
    }
  }

  #[test]
  fn merchant_is_its_own_tenant() {
    assert_eq!(user(4, Role::Merchant, None).tenant_id(), 4);
    assert_eq!(user(9, Role::Admin, Some(4)).tenant_id(), 4);
  }

  #[test]
  fn account_validation() {
    assert!(validate_account("m1", "m1@shop.co", "pw").is_ok());
    assert!(validate_account(" ", "m1@shop.co", "pw").is_err());
    assert!(validate_account("m1", "not-an-email", "pw").is_err());
    assert!(validate_account("m1", "@shop.co", "pw").is_err());
    assert!(validate_account("m1", "m1@shop.co", "").is_err());
  }

  #[test]
  fn serialised_user_has_no_password_field() {
    let json = serde_json::to_value(user(1, Role::Clerk, Some(2))).unwrap();
    assert!(json.get("password_hash").is_none());
    assert_eq!(json["role"], "clerk");
  }
}
