//! The access-control gate.
//!
//! Roles form a closed set with no hierarchy: an admin is not implicitly a
//! clerk, a merchant is not implicitly an admin. Every operation names the
//! exact set of roles allowed to invoke it.

use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumString};

use crate::{Error, Result};

/// The role carried by every user account.
#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  Hash,
  Serialize,
  Deserialize,
  Display,
  AsRefStr,
  EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum Role {
  Merchant,
  Admin,
  Clerk,
}

/// Permit `role` if it is a member of `allowed`.
pub fn authorize(role: Role, allowed: &[Role]) -> Result<()> {
  if allowed.contains(&role) {
    Ok(())
  } else {
    Err(Error::Forbidden { role })
  }
}

// ─── Gates ───────────────────────────────────────────────────────────────────

/// A named allowed-role set, used as a type parameter by request extractors.
pub trait Gate: Send + Sync + 'static {
  const ALLOWED: &'static [Role];
}

pub struct AnyRole;
pub struct MerchantOnly;
pub struct AdminOnly;
pub struct ClerkOnly;
pub struct MerchantOrAdmin;

impl Gate for AnyRole {
  const ALLOWED: &'static [Role] = &[Role::Merchant, Role::Admin, Role::Clerk];
}

impl Gate for MerchantOnly {
  const ALLOWED: &'static [Role] = &[Role::Merchant];
}

impl Gate for AdminOnly {
  const ALLOWED: &'static [Role] = &[Role::Admin];
}

impl Gate for ClerkOnly {
  const ALLOWED: &'static [Role] = &[Role::Clerk];
}

impl Gate for MerchantOrAdmin {
  const ALLOWED: &'static [Role] = &[Role::Merchant, Role::Admin];
}

// ─── Viewer ──────────────────────────────────────────────────────────────────

/// The identity a repository call is evaluated on behalf of.
///
/// `tenant_id` is the id of the merchant that owns every store the viewer
/// may see. Clerks are further restricted to the inventory assigned to them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Viewer {
  pub user_id:   i64,
  pub role:      Role,
  pub tenant_id: i64,
}

impl Viewer {
  /// `Some(user_id)` when visibility must be narrowed to assigned inventory.
  pub fn clerk_id(&self) -> Option<i64> {
    (self.role == Role::Clerk).then_some(self.user_id)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn member_roles_are_permitted() {
    assert!(authorize(Role::Admin, MerchantOrAdmin::ALLOWED).is_ok());
    assert!(authorize(Role::Merchant, MerchantOnly::ALLOWED).is_ok());
  }

  #[test]
  fn no_implicit_hierarchy() {
    // Merchants sit at the top of the informal hierarchy but still cannot
    // call clerk-only operations.
    assert!(matches!(
      authorize(Role::Merchant, ClerkOnly::ALLOWED),
      Err(Error::Forbidden { role: Role::Merchant })
    ));
    assert!(authorize(Role::Admin, ClerkOnly::ALLOWED).is_err());
    assert!(authorize(Role::Clerk, MerchantOnly::ALLOWED).is_err());
  }

  #[test]
  fn role_parses_case_insensitively() {
    assert_eq!("Merchant".parse::<Role>().unwrap(), Role::Merchant);
    assert_eq!("ADMIN".parse::<Role>().unwrap(), Role::Admin);
    assert_eq!(Role::Clerk.as_ref(), "clerk");
    assert!("owner".parse::<Role>().is_err());
  }

  #[test]
  fn only_clerks_are_narrowed() {
    let clerk = Viewer { user_id: 7, role: Role::Clerk, tenant_id: 1 };
    let admin = Viewer { user_id: 3, role: Role::Admin, tenant_id: 1 };
    assert_eq!(clerk.clerk_id(), Some(7));
    assert_eq!(admin.clerk_id(), None);
  }
}
