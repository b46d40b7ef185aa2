//! Synchronous query functions run on the connection thread.
//!
//! Each function takes a borrowed connection (or transaction) and returns
//! `rusqlite::Result<duka_core::Result<T>>`: the outer layer carries database
//! failures, the inner one domain outcomes such as a missing row or an
//! oversold item.

pub mod inventory;
pub mod ledger;
pub mod payments;
pub mod reports;
pub mod stores;
pub mod supply;
pub mod users;

/// Result of a query function: database errors outside, domain errors inside.
pub type Outcome<T> = rusqlite::Result<duka_core::Result<T>>;

/// Return early from a query function with a domain error.
macro_rules! reject {
  ($err:expr) => {
    return Ok(Err($err))
  };
}

pub(crate) use reject;

/// Unwrap a nested [`Outcome`], propagating a domain error unchanged.
macro_rules! domain {
  ($outcome:expr) => {
    match $outcome? {
      Ok(v) => v,
      Err(e) => return Ok(Err(e)),
    }
  };
}

pub(crate) use domain;
