//! Report queries. Totals are always recomputed from the ledger; the
//! `reports` table only records what was generated and when.

use chrono::{DateTime, Utc};
use duka_core::report::{
  NewReport,
  Period,
  Report,
  ReportKind,
  SaleLine,
  SalesSummary,
  StockLine,
  StockSummary,
  StorePerformance,
  StoreSales,
  TOP_PRODUCTS,
  summarize_sales,
  summarize_stock,
  tally_by_store,
};
use rusqlite::{Connection, Row, params};

use super::{Outcome, domain, reject, stores};
use crate::encode::{Label, Money, Timestamp};

fn sale_lines(
  conn: &Connection,
  store_id: i64,
  since: Option<DateTime<Utc>>,
) -> rusqlite::Result<Vec<SaleLine>> {
  let mut stmt = conn.prepare(
    "SELECT i.product_name, l.quantity, l.total_price
     FROM ledger l JOIN inventory i ON i.id = l.inventory_id
     WHERE l.kind = 'sale' AND i.store_id = ?1 AND (?2 IS NULL OR l.created_at >= ?2)
     ORDER BY l.id",
  )?;
  let rows = stmt
    .query_map(params![store_id, since.map(Timestamp)], |row| {
      Ok(SaleLine {
        product:     row.get(0)?,
        quantity:    row.get(1)?,
        total_price: row.get::<_, Money>(2)?.0,
      })
    })?
    .collect::<rusqlite::Result<Vec<_>>>()?;
  Ok(rows)
}

fn stock_lines(conn: &Connection, store_id: i64) -> rusqlite::Result<Vec<StockLine>> {
  let mut stmt = conn.prepare(
    "SELECT id, product_name, quantity_in_stock FROM inventory WHERE store_id = ?1 ORDER BY id",
  )?;
  let rows = stmt
    .query_map(params![store_id], |row| {
      Ok(StockLine {
        inventory_id: row.get(0)?,
        product:      row.get(1)?,
        stock:        row.get(2)?,
      })
    })?
    .collect::<rusqlite::Result<Vec<_>>>()?;
  Ok(rows)
}

pub fn sales(
  conn: &Connection,
  tenant_id: i64,
  store_id: i64,
  since: Option<DateTime<Utc>>,
) -> Outcome<SalesSummary> {
  let store = domain!(stores::require(conn, tenant_id, store_id));
  let lines = sale_lines(conn, store.id, since)?;
  Ok(summarize_sales(&lines, TOP_PRODUCTS))
}

pub fn stock(conn: &Connection, tenant_id: i64, store_id: i64) -> Outcome<StockSummary> {
  let store = domain!(stores::require(conn, tenant_id, store_id));
  Ok(summarize_stock(stock_lines(conn, store.id)?))
}

pub fn performance(conn: &Connection, tenant_id: i64, store_id: i64) -> Outcome<StorePerformance> {
  let store = domain!(stores::require(conn, tenant_id, store_id));
  let lines = sale_lines(conn, store.id, None)?;
  let summary = match summarize_sales(&lines, TOP_PRODUCTS) {
    Ok(summary) => summary,
    Err(e) => reject!(e),
  };
  Ok(Ok(StorePerformance {
    store_id:         store.id,
    store_name:       store.name,
    total_sales:      summary.total_sales,
    top_products:     summary.top_products,
    inventory_status: stock_lines(conn, store.id)?,
  }))
}

pub fn by_store(
  conn: &Connection,
  tenant_id: i64,
  since: Option<DateTime<Utc>>,
) -> Outcome<Vec<StoreSales>> {
  let stores = stores::list(conn, tenant_id)?
    .into_iter()
    .map(|s| (s.id, s.name))
    .collect();

  let mut stmt = conn.prepare(
    "SELECT i.store_id, l.total_price
     FROM ledger l
     JOIN inventory i ON i.id = l.inventory_id
     JOIN stores st ON st.id = i.store_id
     WHERE l.kind = 'sale' AND st.merchant_id = ?1 AND (?2 IS NULL OR l.created_at >= ?2)",
  )?;
  let amounts = stmt
    .query_map(params![tenant_id, since.map(Timestamp)], |row| {
      Ok((row.get::<_, i64>(0)?, row.get::<_, Money>(1)?.0))
    })?
    .collect::<rusqlite::Result<Vec<_>>>()?;

  Ok(tally_by_store(stores, amounts))
}

// ─── History ─────────────────────────────────────────────────────────────────

const COLUMNS: &str = "r.id, r.kind, r.store_id, r.period, r.total_sales, r.total_stock, \
  r.best_selling_product, r.generated_by, r.created_at";

fn from_row(row: &Row<'_>) -> rusqlite::Result<Report> {
  Ok(Report {
    id:                   row.get(0)?,
    kind:                 row.get::<_, Label<ReportKind>>(1)?.0,
    store_id:             row.get(2)?,
    period:               row.get::<_, Option<Label<Period>>>(3)?.map(|p| p.0),
    total_sales:          row.get::<_, Option<Money>>(4)?.map(|m| m.0),
    total_stock:          row.get(5)?,
    best_selling_product: row.get(6)?,
    generated_by:         row.get(7)?,
    created_at:           row.get::<_, Timestamp>(8)?.0,
  })
}

pub fn save(conn: &Connection, input: NewReport) -> rusqlite::Result<Report> {
  let now = Utc::now();
  conn.execute(
    "INSERT INTO reports (kind, store_id, period, total_sales, total_stock,
       best_selling_product, generated_by, created_at)
     VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
    params![
      Label(input.kind),
      input.store_id,
      input.period.map(Label),
      input.total_sales.map(Money),
      input.total_stock,
      input.best_selling_product,
      input.generated_by,
      Timestamp(now),
    ],
  )?;
  Ok(Report {
    id:                   conn.last_insert_rowid(),
    kind:                 input.kind,
    store_id:             input.store_id,
    period:               input.period,
    total_sales:          input.total_sales,
    total_stock:          input.total_stock,
    best_selling_product: input.best_selling_product,
    generated_by:         input.generated_by,
    created_at:           now,
  })
}

pub fn list(
  conn: &Connection,
  tenant_id: i64,
  store_id: Option<i64>,
) -> rusqlite::Result<Vec<Report>> {
  let mut stmt = conn.prepare(&format!(
    "SELECT {COLUMNS} FROM reports r JOIN stores st ON st.id = r.store_id
     WHERE st.merchant_id = ?1 AND (?2 IS NULL OR r.store_id = ?2)
     ORDER BY r.id DESC"
  ))?;
  let rows = stmt
    .query_map(params![tenant_id, store_id], from_row)?
    .collect::<rusqlite::Result<Vec<_>>>()?;
  Ok(rows)
}
