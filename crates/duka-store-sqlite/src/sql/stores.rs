//! `stores` table.

use chrono::Utc;
use duka_core::{
  Error,
  shop::{NewStore, Store, StoreUpdate},
};
use rusqlite::{Connection, OptionalExtension as _, Row, params};

use super::{Outcome, domain, reject};
use crate::encode::{Timestamp, is_foreign_key_violation, is_unique_violation};

const COLUMNS: &str = "id, name, location, merchant_id, created_at";

fn from_row(row: &Row<'_>) -> rusqlite::Result<Store> {
  Ok(Store {
    id:          row.get(0)?,
    name:        row.get(1)?,
    location:    row.get(2)?,
    merchant_id: row.get(3)?,
    created_at:  row.get::<_, Timestamp>(4)?.0,
  })
}

fn name_taken(name: &str) -> Error {
  Error::conflict(format!("a store named {name:?} already exists"))
}

pub fn create(conn: &Connection, merchant_id: i64, input: NewStore) -> Outcome<Store> {
  let now = Utc::now();
  let inserted = conn.execute(
    "INSERT INTO stores (name, location, merchant_id, created_at) VALUES (?1, ?2, ?3, ?4)",
    params![input.name, input.location, merchant_id, Timestamp(now)],
  );
  match inserted {
    Ok(_) => {}
    Err(e) if is_unique_violation(&e) => reject!(name_taken(&input.name)),
    Err(e) => return Err(e),
  }
  Ok(Ok(Store {
    id: conn.last_insert_rowid(),
    name: input.name,
    location: input.location,
    merchant_id,
    created_at: now,
  }))
}

pub fn list(conn: &Connection, tenant_id: i64) -> rusqlite::Result<Vec<Store>> {
  let mut stmt = conn.prepare(&format!(
    "SELECT {COLUMNS} FROM stores WHERE merchant_id = ?1 ORDER BY id"
  ))?;
  let rows = stmt
    .query_map(params![tenant_id], from_row)?
    .collect::<rusqlite::Result<Vec<_>>>()?;
  Ok(rows)
}

pub fn get(conn: &Connection, tenant_id: i64, id: i64) -> rusqlite::Result<Option<Store>> {
  conn
    .query_row(
      &format!("SELECT {COLUMNS} FROM stores WHERE id = ?1 AND merchant_id = ?2"),
      params![id, tenant_id],
      from_row,
    )
    .optional()
}

/// Like [`get`], but a missing store is a domain error.
pub fn require(conn: &Connection, tenant_id: i64, id: i64) -> Outcome<Store> {
  Ok(get(conn, tenant_id, id)?.ok_or_else(|| Error::not_found(format!("store {id}"))))
}

pub fn update(
  conn: &mut Connection,
  tenant_id: i64,
  id: i64,
  update: StoreUpdate,
) -> Outcome<Store> {
  let tx = conn.transaction()?;
  let mut store = domain!(require(&tx, tenant_id, id));
  if let Some(name) = update.name {
    store.name = name;
  }
  if let Some(location) = update.location {
    store.location = location;
  }

  let updated = tx.execute(
    "UPDATE stores SET name = ?2, location = ?3 WHERE id = ?1",
    params![id, store.name, store.location],
  );
  match updated {
    Ok(_) => {}
    Err(e) if is_unique_violation(&e) => reject!(name_taken(&store.name)),
    Err(e) => return Err(e),
  }
  tx.commit()?;
  Ok(Ok(store))
}

pub fn delete(conn: &Connection, tenant_id: i64, id: i64) -> Outcome<()> {
  let deleted = conn.execute(
    "DELETE FROM stores WHERE id = ?1 AND merchant_id = ?2",
    params![id, tenant_id],
  );
  match deleted {
    Ok(0) => Ok(Err(Error::not_found(format!("store {id}")))),
    Ok(_) => Ok(Ok(())),
    Err(e) if is_foreign_key_violation(&e) => Ok(Err(Error::conflict(format!(
      "store {id} still holds inventory"
    )))),
    Err(e) => Err(e),
  }
}
