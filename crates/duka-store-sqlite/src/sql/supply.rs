//! `supply_requests` table.

use chrono::Utc;
use duka_core::{
  Error,
  access::Viewer,
  ledger::validate_quantity,
  supply::{NewSupplyRequest, SupplyDecision, SupplyRequest, SupplyStatus},
};
use rusqlite::{Connection, OptionalExtension as _, Row, TransactionBehavior, named_params, params};

use super::{Outcome, domain, inventory, ledger, reject};
use crate::encode::{Label, Timestamp};

const COLUMNS: &str = "s.id, s.inventory_id, s.requested_by, s.quantity, s.status, \
  s.decided_by, s.decided_at, s.created_at";

/// Requests on the tenant's inventory; clerks only see their own.
const VISIBLE: &str = "s.inventory_id IN (
    SELECT i.id FROM inventory i JOIN stores st ON st.id = i.store_id
    WHERE st.merchant_id = :tenant)
  AND (:clerk IS NULL OR s.requested_by = :clerk)";

fn from_row(row: &Row<'_>) -> rusqlite::Result<SupplyRequest> {
  Ok(SupplyRequest {
    id:           row.get(0)?,
    inventory_id: row.get(1)?,
    requested_by: row.get(2)?,
    quantity:     row.get(3)?,
    status:       row.get::<_, Label<SupplyStatus>>(4)?.0,
    decided_by:   row.get(5)?,
    decided_at:   row.get::<_, Option<Timestamp>>(6)?.map(|t| t.0),
    created_at:   row.get::<_, Timestamp>(7)?.0,
  })
}

fn require(conn: &Connection, viewer: Viewer, id: i64) -> Outcome<SupplyRequest> {
  let found = conn
    .query_row(
      &format!("SELECT {COLUMNS} FROM supply_requests s WHERE s.id = :id AND {VISIBLE}"),
      named_params! {
        ":id": id,
        ":tenant": viewer.tenant_id,
        ":clerk": viewer.clerk_id(),
      },
      from_row,
    )
    .optional()?;
  Ok(found.ok_or_else(|| Error::not_found(format!("supply request {id}"))))
}

pub fn create(conn: &Connection, viewer: Viewer, input: NewSupplyRequest) -> Outcome<SupplyRequest> {
  if let Err(e) = validate_quantity(input.quantity) {
    reject!(e);
  }
  let item = domain!(inventory::require(conn, viewer, input.inventory_id));

  let now = Utc::now();
  conn.execute(
    "INSERT INTO supply_requests (inventory_id, requested_by, quantity, status, created_at)
     VALUES (?1, ?2, ?3, ?4, ?5)",
    params![
      item.id,
      viewer.user_id,
      input.quantity,
      Label(SupplyStatus::Pending),
      Timestamp(now),
    ],
  )?;

  Ok(Ok(SupplyRequest {
    id:           conn.last_insert_rowid(),
    inventory_id: item.id,
    requested_by: viewer.user_id,
    quantity:     input.quantity,
    status:       SupplyStatus::Pending,
    decided_by:   None,
    decided_at:   None,
    created_at:   now,
  }))
}

pub fn list(conn: &Connection, viewer: Viewer) -> rusqlite::Result<Vec<SupplyRequest>> {
  let mut stmt = conn.prepare(&format!(
    "SELECT {COLUMNS} FROM supply_requests s WHERE {VISIBLE} ORDER BY s.id"
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

/// Move a pending request to a final state. Approval receives the requested
/// quantity into stock in the same transaction.
pub fn decide(
  conn: &mut Connection,
  viewer: Viewer,
  id: i64,
  decision: SupplyDecision,
) -> Outcome<SupplyRequest> {
  let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
  let mut request = domain!(require(&tx, viewer, id));
  let status = match request.status.transition(decision.status) {
    Ok(s) => s,
    Err(e) => reject!(e),
  };

  if status == SupplyStatus::Approved {
    let item = domain!(inventory::require(&tx, viewer, request.inventory_id));
    domain!(ledger::receive(&tx, &item, request.quantity, viewer.user_id));
  }

  let now = Utc::now();
  tx.execute(
    "UPDATE supply_requests SET status = ?2, decided_by = ?3, decided_at = ?4 WHERE id = ?1",
    params![id, Label(status), viewer.user_id, Timestamp(now)],
  )?;
  tx.commit()?;

  request.status = status;
  request.decided_by = Some(viewer.user_id);
  request.decided_at = Some(now);
  Ok(Ok(request))
}

pub fn delete(conn: &mut Connection, viewer: Viewer, id: i64) -> Outcome<()> {
  let tx = conn.transaction()?;
  domain!(require(&tx, viewer, id));
  tx.execute("DELETE FROM supply_requests WHERE id = ?1", params![id])?;
  tx.commit()?;
  Ok(Ok(()))
}
