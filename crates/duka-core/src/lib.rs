//! Core types and trait definitions for the MyDuka inventory backend.
//!
//! This crate is deliberately free of HTTP and database dependencies. The
//! SQLite backend and the JSON API both depend on it.

pub mod access;
pub mod error;
pub mod inventory;
pub mod ledger;
pub mod payment;
pub mod report;
pub mod repository;
pub mod shop;
pub mod supply;
pub mod user;

pub use error::{Error, Result, StoreError};
