//! `ledger` table: sales and restocks, with the stock movements they imply.
//!
//! Every function that changes `quantity_in_stock` runs inside an
//! `IMMEDIATE` transaction so the check and the write cannot interleave with
//! another writer.

use chrono::Utc;
use duka_core::{
  Error,
  access::Viewer,
  inventory::InventoryItem,
  ledger::{EntryKind, LedgerEntry, NewSale, Restock, SaleUpdate, line_total, validate_quantity},
};
use rust_decimal::Decimal;
use rusqlite::{
  Connection,
  OptionalExtension as _,
  Row,
  TransactionBehavior,
  named_params,
  params,
};

use super::{Outcome, domain, inventory, reject};
use crate::encode::{Label, Money, Timestamp};

const COLUMNS: &str = "l.id, l.inventory_id, l.kind, l.quantity, l.unit_price, \
  l.total_price, l.recorded_by, l.created_at";

fn from_row(row: &Row<'_>) -> rusqlite::Result<LedgerEntry> {
  Ok(LedgerEntry {
    id:           row.get(0)?,
    inventory_id: row.get(1)?,
    kind:         row.get::<_, Label<EntryKind>>(2)?.0,
    quantity:     row.get(3)?,
    unit_price:   row.get::<_, Money>(4)?.0,
    total_price:  row.get::<_, Money>(5)?.0,
    recorded_by:  row.get(6)?,
    created_at:   row.get::<_, Timestamp>(7)?.0,
  })
}

fn append(
  conn: &Connection,
  inventory_id: i64,
  kind: EntryKind,
  quantity: i64,
  unit_price: Decimal,
  recorded_by: i64,
) -> Outcome<LedgerEntry> {
  let now = Utc::now();
  let total_price = match line_total(quantity, unit_price) {
    Ok(total) => total,
    Err(e) => reject!(e),
  };
  conn.execute(
    "INSERT INTO ledger (inventory_id, kind, quantity, unit_price, total_price, recorded_by, created_at)
     VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
    params![
      inventory_id,
      Label(kind),
      quantity,
      Money(unit_price),
      Money(total_price),
      recorded_by,
      Timestamp(now),
    ],
  )?;
  Ok(Ok(LedgerEntry {
    id: conn.last_insert_rowid(),
    inventory_id,
    kind,
    quantity,
    unit_price,
    total_price,
    recorded_by,
    created_at: now,
  }))
}

/// Remove `quantity` units from stock unless that would go negative.
fn take_stock(conn: &Connection, item: &InventoryItem, quantity: i64) -> Outcome<()> {
  let changed = conn.execute(
    "UPDATE inventory SET quantity_in_stock = quantity_in_stock - ?2
     WHERE id = ?1 AND quantity_in_stock >= ?2",
    params![item.id, quantity],
  )?;
  if changed == 0 {
    let available: i64 = conn.query_row(
      "SELECT quantity_in_stock FROM inventory WHERE id = ?1",
      params![item.id],
      |r| r.get(0),
    )?;
    reject!(Error::InsufficientStock { requested: quantity, available });
  }
  Ok(Ok(()))
}

/// Put `quantity` units back into stock. Refuses to push the counter past
/// `i64::MAX`, which SQLite would otherwise store as a REAL.
fn return_stock(conn: &Connection, inventory_id: i64, quantity: i64) -> Outcome<()> {
  let changed = conn.execute(
    "UPDATE inventory SET quantity_in_stock = quantity_in_stock + ?2
     WHERE id = ?1 AND quantity_in_stock <= ?3 - ?2",
    params![inventory_id, quantity, i64::MAX],
  )?;
  if changed == 0 {
    reject!(stock_out_of_range());
  }
  Ok(Ok(()))
}

fn stock_out_of_range() -> Error {
  Error::validation("stock would exceed the supported range")
}

/// Receive `quantity` new units of `item` and log them at its buying price.
/// The caller owns the transaction.
pub(crate) fn receive(
  conn: &Connection,
  item: &InventoryItem,
  quantity: i64,
  recorded_by: i64,
) -> Outcome<LedgerEntry> {
  let changed = conn.execute(
    "UPDATE inventory
     SET quantity_received = quantity_received + ?2,
         quantity_in_stock = quantity_in_stock + ?2
     WHERE id = ?1
       AND quantity_received <= ?3 - ?2
       AND quantity_in_stock <= ?3 - ?2",
    params![item.id, quantity, i64::MAX],
  )?;
  if changed == 0 {
    reject!(stock_out_of_range());
  }
  append(
    conn,
    item.id,
    EntryKind::Restock,
    quantity,
    item.buying_price,
    recorded_by,
  )
}

// ─── Sales ───────────────────────────────────────────────────────────────────

pub fn record_sale(conn: &mut Connection, viewer: Viewer, input: NewSale) -> Outcome<LedgerEntry> {
  if let Err(e) = validate_quantity(input.quantity_sold) {
    reject!(e);
  }
  let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
  let item = domain!(inventory::require(&tx, viewer, input.inventory_id));
  domain!(take_stock(&tx, &item, input.quantity_sold));
  let entry = domain!(append(
    &tx,
    item.id,
    EntryKind::Sale,
    input.quantity_sold,
    item.selling_price,
    viewer.user_id,
  ));
  tx.commit()?;
  Ok(Ok(entry))
}

pub fn get_sale(conn: &Connection, viewer: Viewer, id: i64) -> rusqlite::Result<Option<LedgerEntry>> {
  conn
    .query_row(
      &format!(
        "SELECT {COLUMNS} FROM ledger l JOIN inventory i ON i.id = l.inventory_id
         WHERE l.id = :id AND l.kind = 'sale' AND {}",
        inventory::VISIBLE
      ),
      named_params! {
        ":id": id,
        ":tenant": viewer.tenant_id,
        ":clerk": viewer.clerk_id(),
      },
      from_row,
    )
    .optional()
}

fn require_sale(conn: &Connection, viewer: Viewer, id: i64) -> Outcome<LedgerEntry> {
  Ok(get_sale(conn, viewer, id)?.ok_or_else(|| Error::not_found(format!("sale {id}"))))
}

pub fn list_sales(conn: &Connection, viewer: Viewer) -> rusqlite::Result<Vec<LedgerEntry>> {
  let mut stmt = conn.prepare(&format!(
    "SELECT {COLUMNS} FROM ledger l JOIN inventory i ON i.id = l.inventory_id
     WHERE l.kind = 'sale' AND {}
     ORDER BY l.id",
    inventory::VISIBLE
  ))?;
  let rows = stmt
    .query_map(
      named_params! {
        ":tenant": viewer.tenant_id,
        ":clerk": viewer.clerk_id(),
      },
      from_row,
    )?
    .collect::<rusqlite::Result<Vec<_>>>()?;
  Ok(rows)
}

/// Change a sale's quantity. The difference moves in or out of stock, and
/// the line total is recomputed from the price the sale was made at.
pub fn update_sale(
  conn: &mut Connection,
  viewer: Viewer,
  id: i64,
  update: SaleUpdate,
) -> Outcome<LedgerEntry> {
  if let Err(e) = validate_quantity(update.quantity_sold) {
    reject!(e);
  }
  let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
  let mut sale = domain!(require_sale(&tx, viewer, id));
  let item = domain!(inventory::require(&tx, viewer, sale.inventory_id));

  let delta = update.quantity_sold - sale.quantity;
  if delta > 0 {
    domain!(take_stock(&tx, &item, delta));
  } else if delta < 0 {
    domain!(return_stock(&tx, item.id, -delta));
  }

  sale.quantity = update.quantity_sold;
  sale.total_price = match line_total(sale.quantity, sale.unit_price) {
    Ok(total) => total,
    Err(e) => reject!(e),
  };
  tx.execute(
    "UPDATE ledger SET quantity = ?2, total_price = ?3 WHERE id = ?1",
    params![id, sale.quantity, Money(sale.total_price)],
  )?;
  tx.commit()?;
  Ok(Ok(sale))
}

/// Void a sale, returning its units to stock.
pub fn delete_sale(conn: &mut Connection, viewer: Viewer, id: i64) -> Outcome<()> {
  let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
  let sale = domain!(require_sale(&tx, viewer, id));
  domain!(return_stock(&tx, sale.inventory_id, sale.quantity));
  tx.execute("DELETE FROM ledger WHERE id = ?1", params![id])?;
  tx.commit()?;
  Ok(Ok(()))
}

// ─── Restocks ────────────────────────────────────────────────────────────────

pub fn restock(
  conn: &mut Connection,
  viewer: Viewer,
  id: i64,
  input: Restock,
) -> Outcome<LedgerEntry> {
  if let Err(e) = validate_quantity(input.quantity) {
    reject!(e);
  }
  let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
  let item = domain!(inventory::require(&tx, viewer, id));
  let entry = domain!(receive(&tx, &item, input.quantity, viewer.user_id));
  tx.commit()?;
  Ok(Ok(entry))
}

#[cfg(test)]
mod tests {
  use duka_core::access::Role;

  use super::*;
  use crate::schema::SCHEMA;

  /// A merchant with one store holding one item, stock pinned near `i64::MAX`.
  fn crowded_item() -> (Connection, Viewer, InventoryItem) {
    let conn = Connection::open_in_memory().unwrap();
    conn.execute_batch(SCHEMA).unwrap();
    let now = Timestamp(Utc::now());
    conn
      .execute(
        "INSERT INTO users (id, username, email, password_hash, role, created_at)
         VALUES (1, 'm1', 'm1@duka.test', 'x', 'merchant', ?1)",
        params![now],
      )
      .unwrap();
    conn
      .execute(
        "INSERT INTO stores (id, name, location, merchant_id, created_at)
         VALUES (1, 'S1', 'Nairobi', 1, ?1)",
        params![now],
      )
      .unwrap();
    conn
      .execute(
        "INSERT INTO inventory (id, product_name, quantity_received, quantity_in_stock,
           buying_price, selling_price, store_id, admin_id, created_at)
         VALUES (1, 'Milk', ?1, ?1, '6', '10', 1, 1, ?2)",
        params![i64::MAX - 5, now],
      )
      .unwrap();
    let viewer = Viewer { user_id: 1, role: Role::Merchant, tenant_id: 1 };
    let item = inventory::require(&conn, viewer, 1).unwrap().unwrap();
    (conn, viewer, item)
  }

  #[test]
  fn receiving_past_the_integer_range_is_rejected() {
    let (conn, viewer, item) = crowded_item();

    let err = receive(&conn, &item, 10, 1).unwrap().unwrap_err();
    assert!(matches!(err, Error::Validation(_)));

    let after = inventory::require(&conn, viewer, 1).unwrap().unwrap();
    assert_eq!(after.quantity_in_stock, i64::MAX - 5);
    assert_eq!(after.quantity_received, i64::MAX - 5);

    receive(&conn, &item, 5, 1).unwrap().unwrap();
    let full = inventory::require(&conn, viewer, 1).unwrap().unwrap();
    assert_eq!(full.quantity_in_stock, i64::MAX);
  }

  #[test]
  fn returning_past_the_integer_range_is_rejected() {
    let (conn, viewer, _) = crowded_item();

    let err = return_stock(&conn, 1, 6).unwrap().unwrap_err();
    assert!(matches!(err, Error::Validation(_)));
    let after = inventory::require(&conn, viewer, 1).unwrap().unwrap();
    assert_eq!(after.quantity_in_stock, i64::MAX - 5);
  }
}
