//! `payments` table.

use chrono::Utc;
use duka_core::{
  access::Viewer,
  inventory::PaymentStatus,
  payment::{NewPayment, Payment},
};
use rusqlite::{Connection, Row, named_params, params};

use super::{Outcome, domain, inventory, reject};
use crate::encode::{Label, Money, Timestamp};

const COLUMNS: &str = "p.id, p.inventory_id, p.status, p.amount, p.processed_by, p.created_at";

fn from_row(row: &Row<'_>) -> rusqlite::Result<Payment> {
  Ok(Payment {
    id:           row.get(0)?,
    inventory_id: row.get(1)?,
    status:       row.get::<_, Label<PaymentStatus>>(2)?.0,
    amount:       row.get::<_, Money>(3)?.0,
    processed_by: row.get(4)?,
    created_at:   row.get::<_, Timestamp>(5)?.0,
  })
}

/// Record a payment against an item and mirror its status onto the item.
pub fn record(conn: &mut Connection, viewer: Viewer, input: NewPayment) -> Outcome<Payment> {
  if let Err(e) = input.validate() {
    reject!(e);
  }
  let tx = conn.transaction()?;
  let item = domain!(inventory::require(&tx, viewer, input.inventory_id));

  let now = Utc::now();
  tx.execute(
    "INSERT INTO payments (inventory_id, status, amount, processed_by, created_at)
     VALUES (?1, ?2, ?3, ?4, ?5)",
    params![
      item.id,
      Label(input.status),
      Money(input.amount),
      viewer.user_id,
      Timestamp(now),
    ],
  )?;
  let id = tx.last_insert_rowid();
  tx.execute(
    "UPDATE inventory SET payment_status = ?2 WHERE id = ?1",
    params![item.id, Label(input.status)],
  )?;
  tx.commit()?;

  Ok(Ok(Payment {
    id,
    inventory_id: item.id,
    status: input.status,
    amount: input.amount,
    processed_by: viewer.user_id,
    created_at: now,
  }))
}

pub fn list(conn: &Connection, viewer: Viewer) -> rusqlite::Result<Vec<Payment>> {
  let mut stmt = conn.prepare(&format!(
    "SELECT {COLUMNS} FROM payments p JOIN inventory i ON i.id = p.inventory_id
     WHERE {} ORDER BY p.id",
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
