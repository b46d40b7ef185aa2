//! Encoding and decoding helpers between Rust domain types and the plain-text
//! representations stored in SQLite columns.
//!
//! Timestamps are stored as fixed-width RFC 3339 strings (microseconds, `Z`
//! suffix) so that string comparison in SQL matches time order. Money is
//! stored as decimal strings. Enums are stored as their lowercase names.

use std::str::FromStr;

use chrono::{DateTime, SecondsFormat, Utc};
use rusqlite::{
  ErrorCode,
  types::{FromSql, FromSqlError, FromSqlResult, ToSql, ToSqlOutput, ValueRef},
};
use rust_decimal::Decimal;

// ─── DateTime<Utc> ───────────────────────────────────────────────────────────

pub fn encode_dt(dt: DateTime<Utc>) -> String {
  dt.to_rfc3339_opts(SecondsFormat::Micros, true)
}

/// Column wrapper for a UTC timestamp.
pub struct Timestamp(pub DateTime<Utc>);

impl ToSql for Timestamp {
  fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
    Ok(ToSqlOutput::from(encode_dt(self.0)))
  }
}

impl FromSql for Timestamp {
  fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
    DateTime::parse_from_rfc3339(value.as_str()?)
      .map(|dt| Timestamp(dt.with_timezone(&Utc)))
      .map_err(|e| FromSqlError::Other(Box::new(e)))
  }
}

// ─── Decimal ─────────────────────────────────────────────────────────────────

/// Column wrapper for a money amount.
pub struct Money(pub Decimal);

impl ToSql for Money {
  fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
    Ok(ToSqlOutput::from(self.0.to_string()))
  }
}

impl FromSql for Money {
  fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
    match value {
      ValueRef::Text(_) => Decimal::from_str(value.as_str()?)
        .map(Money)
        .map_err(|e| FromSqlError::Other(Box::new(e))),
      ValueRef::Integer(i) => Ok(Money(Decimal::from(i))),
      _ => Err(FromSqlError::InvalidType),
    }
  }
}

// ─── Enums ───────────────────────────────────────────────────────────────────

/// Column wrapper for any enum stored by name (`AsRef<str>` out,
/// `FromStr` in).
pub struct Label<T>(pub T);

impl<T: AsRef<str>> ToSql for Label<T> {
  fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
    Ok(ToSqlOutput::from(self.0.as_ref()))
  }
}

impl<T> FromSql for Label<T>
where
  T: FromStr,
  T::Err: std::error::Error + Send + Sync + 'static,
{
  fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
    value
      .as_str()?
      .parse()
      .map(Label)
      .map_err(|e| FromSqlError::Other(Box::new(e)))
  }
}

// ─── Constraint violations ───────────────────────────────────────────────────

/// `true` if `err` is a UNIQUE constraint failure.
pub fn is_unique_violation(err: &rusqlite::Error) -> bool {
  extended_code(err) == Some(rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE)
}

/// `true` if `err` is a FOREIGN KEY constraint failure.
pub fn is_foreign_key_violation(err: &rusqlite::Error) -> bool {
  extended_code(err) == Some(rusqlite::ffi::SQLITE_CONSTRAINT_FOREIGNKEY)
}

fn extended_code(err: &rusqlite::Error) -> Option<i32> {
  match err {
    rusqlite::Error::SqliteFailure(e, _) if e.code == ErrorCode::ConstraintViolation => {
      Some(e.extended_code)
    }
    _ => None,
  }
}

#[cfg(test)]
mod tests {
  use chrono::TimeZone;

  use super::*;

  #[test]
  fn timestamps_are_fixed_width_and_ordered() {
    let a = Utc.with_ymd_and_hms(2024, 1, 1, 9, 0, 0).unwrap();
    let b = a + chrono::Duration::microseconds(1500);
    let (ea, eb) = (encode_dt(a), encode_dt(b));
    assert_eq!(ea, "2024-01-01T09:00:00.000000Z");
    assert_eq!(ea.len(), eb.len());
    assert!(ea < eb);
  }
}
