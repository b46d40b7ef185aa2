//! `inventory` and `clerk_inventory` tables.

use chrono::Utc;
use duka_core::{
  Error,
  access::{Role, Viewer},
  inventory::{Assignment, InventoryItem, InventoryUpdate, NewInventoryItem, PaymentStatus},
};
use rusqlite::{Connection, OptionalExtension as _, Row, named_params, params};

use super::{Outcome, domain, reject, stores};
use crate::encode::{Label, Money, Timestamp, is_foreign_key_violation};

pub(crate) const COLUMNS: &str = "i.id, i.product_name, i.quantity_received, \
  i.quantity_in_stock, i.quantity_spoilt, i.buying_price, i.selling_price, \
  i.payment_status, i.supplier, i.store_id, i.admin_id, i.created_at";

/// Rows of `inventory i` the viewer may see. Binds `:tenant` and `:clerk`.
pub(crate) const VISIBLE: &str = "i.store_id IN (SELECT id FROM stores WHERE merchant_id = :tenant) \
  AND (:clerk IS NULL OR i.id IN (SELECT inventory_id FROM clerk_inventory WHERE clerk_id = :clerk))";

pub(crate) fn from_row(row: &Row<'_>) -> rusqlite::Result<InventoryItem> {
  Ok(InventoryItem {
    id:                row.get(0)?,
    product_name:      row.get(1)?,
    quantity_received: row.get(2)?,
    quantity_in_stock: row.get(3)?,
    quantity_spoilt:   row.get(4)?,
    buying_price:      row.get::<_, Money>(5)?.0,
    selling_price:     row.get::<_, Money>(6)?.0,
    payment_status:    row.get::<_, Label<PaymentStatus>>(7)?.0,
    supplier:          row.get(8)?,
    store_id:          row.get(9)?,
    admin_id:          row.get(10)?,
    created_at:        row.get::<_, Timestamp>(11)?.0,
  })
}

pub fn get(conn: &Connection, viewer: Viewer, id: i64) -> rusqlite::Result<Option<InventoryItem>> {
  conn
    .query_row(
      &format!("SELECT {COLUMNS} FROM inventory i WHERE i.id = :id AND {VISIBLE}"),
      named_params! {
        ":id": id,
        ":tenant": viewer.tenant_id,
        ":clerk": viewer.clerk_id(),
      },
      from_row,
    )
    .optional()
}

/// Like [`get`], but an invisible or missing item is a domain error.
pub fn require(conn: &Connection, viewer: Viewer, id: i64) -> Outcome<InventoryItem> {
  Ok(get(conn, viewer, id)?.ok_or_else(|| Error::not_found(format!("inventory item {id}"))))
}

pub fn list(
  conn: &Connection,
  viewer: Viewer,
  payment_status: Option<PaymentStatus>,
) -> rusqlite::Result<Vec<InventoryItem>> {
  let mut stmt = conn.prepare(&format!(
    "SELECT {COLUMNS} FROM inventory i
     WHERE {VISIBLE} AND (:status IS NULL OR i.payment_status = :status)
     ORDER BY i.id"
  ))?;
  let rows = stmt
    .query_map(
      named_params! {
        ":tenant": viewer.tenant_id,
        ":clerk": viewer.clerk_id(),
        ":status": payment_status.map(Label),
      },
      from_row,
    )?
    .collect::<rusqlite::Result<Vec<_>>>()?;
  Ok(rows)
}

pub fn add(conn: &Connection, viewer: Viewer, input: NewInventoryItem) -> Outcome<InventoryItem> {
  domain!(stores::require(conn, viewer.tenant_id, input.store_id));

  let now = Utc::now();
  let stock = input.initial_stock();
  conn.execute(
    "INSERT INTO inventory (product_name, quantity_received, quantity_in_stock,
       quantity_spoilt, buying_price, selling_price, payment_status, supplier,
       store_id, admin_id, created_at)
     VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
    params![
      input.product_name,
      input.quantity_received,
      stock,
      input.quantity_spoilt,
      Money(input.buying_price),
      Money(input.selling_price),
      Label(input.payment_status),
      input.supplier,
      input.store_id,
      viewer.user_id,
      Timestamp(now),
    ],
  )?;

  Ok(Ok(InventoryItem {
    id:                conn.last_insert_rowid(),
    product_name:      input.product_name,
    quantity_received: input.quantity_received,
    quantity_in_stock: stock,
    quantity_spoilt:   input.quantity_spoilt,
    buying_price:      input.buying_price,
    selling_price:     input.selling_price,
    payment_status:    input.payment_status,
    supplier:          input.supplier,
    store_id:          input.store_id,
    admin_id:          viewer.user_id,
    created_at:        now,
  }))
}

pub fn update(
  conn: &mut Connection,
  viewer: Viewer,
  id: i64,
  update: InventoryUpdate,
) -> Outcome<InventoryItem> {
  let tx = conn.transaction()?;
  let mut item = domain!(require(&tx, viewer, id));
  update.apply(&mut item);

  tx.execute(
    "UPDATE inventory SET product_name = ?2, quantity_received = ?3,
       quantity_spoilt = ?4, buying_price = ?5, selling_price = ?6,
       payment_status = ?7, supplier = ?8
     WHERE id = ?1",
    params![
      id,
      item.product_name,
      item.quantity_received,
      item.quantity_spoilt,
      Money(item.buying_price),
      Money(item.selling_price),
      Label(item.payment_status),
      item.supplier,
    ],
  )?;
  tx.commit()?;
  Ok(Ok(item))
}

pub fn delete(conn: &mut Connection, viewer: Viewer, id: i64) -> Outcome<()> {
  let tx = conn.transaction()?;
  domain!(require(&tx, viewer, id));

  match tx.execute("DELETE FROM inventory WHERE id = ?1", params![id]) {
    Ok(_) => {}
    Err(e) if is_foreign_key_violation(&e) => reject!(Error::conflict(format!(
      "inventory item {id} has recorded sales or payments"
    ))),
    Err(e) => return Err(e),
  }
  tx.commit()?;
  Ok(Ok(()))
}

pub fn assign(
  conn: &mut Connection,
  viewer: Viewer,
  assignment: Assignment,
) -> Outcome<Vec<InventoryItem>> {
  let tx = conn.transaction()?;

  let clerk: Option<i64> = tx
    .query_row(
      "SELECT id FROM users WHERE id = ?1 AND merchant_id = ?2 AND role = ?3",
      params![assignment.clerk_id, viewer.tenant_id, Label(Role::Clerk)],
      |r| r.get(0),
    )
    .optional()?;
  let Some(clerk_id) = clerk else {
    reject!(Error::not_found(format!("clerk {}", assignment.clerk_id)));
  };

  let mut assigned = Vec::with_capacity(assignment.inventory_ids.len());
  for id in assignment.inventory_ids {
    let Some(item) = get(&tx, viewer, id)? else {
      continue;
    };
    tx.execute(
      "INSERT OR IGNORE INTO clerk_inventory (clerk_id, inventory_id) VALUES (?1, ?2)",
      params![clerk_id, item.id],
    )?;
    assigned.push(item);
  }
  tx.commit()?;
  Ok(Ok(assigned))
}
