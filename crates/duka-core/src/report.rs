//! Sales and stock report aggregation.
//!
//! Storage backends fetch raw rows ([`SaleLine`], [`StockLine`]) filtered by
//! store and time window; the functions here turn them into totals. Keeping
//! the arithmetic here makes every backend rank and tie-break identically.

use std::collections::BTreeMap;

use chrono::{DateTime, Datelike, Duration, NaiveTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumString};

use crate::{Error, Result};

/// Number of products listed in a store performance report.
pub const TOP_PRODUCTS: usize = 5;

// ─── Kinds and periods ───────────────────────────────────────────────────────

#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  Serialize,
  Deserialize,
  Display,
  AsRefStr,
  EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum ReportKind {
  Sales,
  Stock,
}

/// A coarse reporting window ending now.
#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  Serialize,
  Deserialize,
  Display,
  AsRefStr,
  EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum Period {
  Weekly,
  Monthly,
  Annual,
}

impl Period {
  /// Inclusive lower bound of the window, relative to `now`.
  ///
  /// - weekly: exactly seven days before `now`
  /// - monthly: midnight UTC on the first of the current month
  /// - annual: midnight UTC on 1 January of the current year
  pub fn window_start(self, now: DateTime<Utc>) -> DateTime<Utc> {
    let today = now.date_naive();
    let day = match self {
      Self::Weekly => return now - Duration::days(7),
      Self::Monthly => today.with_day(1),
      Self::Annual => today.with_ordinal(1),
    };
    day.unwrap_or(today).and_time(NaiveTime::MIN).and_utc()
  }
}

// ─── Sales ───────────────────────────────────────────────────────────────────

/// One sale row joined with the name of the product sold.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SaleLine {
  pub product:     String,
  pub quantity:    i64,
  pub total_price: Decimal,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductSales {
  pub product:    String,
  pub total_sold: i64,
  pub revenue:    Decimal,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SalesSummary {
  pub total_sales:          Decimal,
  pub units_sold:           i64,
  /// `None` when no sale matched the filter.
  pub best_selling_product: Option<String>,
  pub top_products:         Vec<ProductSales>,
}

/// Sum `lines` and rank products by units sold.
///
/// Products are ranked by summed quantity, highest first; ties go to the
/// product name that sorts first. `top` bounds the length of
/// `top_products`.
pub fn summarize_sales(lines: &[SaleLine], top: usize) -> Result<SalesSummary> {
  let mut by_product: BTreeMap<&str, (i64, Decimal)> = BTreeMap::new();
  let mut total_sales = Decimal::ZERO;
  let mut units_sold = 0_i64;

  for line in lines {
    total_sales = add_money(total_sales, line.total_price)?;
    units_sold = add_units(units_sold, line.quantity)?;
    let entry = by_product
      .entry(line.product.as_str())
      .or_insert((0, Decimal::ZERO));
    entry.0 = add_units(entry.0, line.quantity)?;
    entry.1 = add_money(entry.1, line.total_price)?;
  }

  // BTreeMap iteration is name-ordered; a stable sort keeps that order for
  // equal quantities.
  let mut ranked: Vec<ProductSales> = by_product
    .into_iter()
    .map(|(product, (total_sold, revenue))| ProductSales {
      product: product.to_owned(),
      total_sold,
      revenue,
    })
    .collect();
  ranked.sort_by(|a, b| b.total_sold.cmp(&a.total_sold));

  let best_selling_product = ranked.first().map(|p| p.product.clone());
  ranked.truncate(top);

  Ok(SalesSummary {
    total_sales,
    units_sold,
    best_selling_product,
    top_products: ranked,
  })
}

fn add_money(a: Decimal, b: Decimal) -> Result<Decimal> {
  a.checked_add(b)
    .ok_or_else(|| Error::validation("sales total is out of range"))
}

fn add_units(a: i64, b: i64) -> Result<i64> {
  a.checked_add(b)
    .ok_or_else(|| Error::validation("unit total is out of range"))
}

// ─── Stock ───────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StockLine {
  pub inventory_id: i64,
  pub product:      String,
  pub stock:        i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StockSummary {
  pub total_stock:      i64,
  pub inventory_status: Vec<StockLine>,
}

pub fn summarize_stock(lines: Vec<StockLine>) -> Result<StockSummary> {
  let total_stock = lines
    .iter()
    .try_fold(0, |acc, l| add_units(acc, l.stock))?;
  Ok(StockSummary {
    total_stock,
    inventory_status: lines,
  })
}

// ─── Per-store views ─────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StorePerformance {
  pub store_id:         i64,
  pub store_name:       String,
  pub total_sales:      Decimal,
  pub top_products:     Vec<ProductSales>,
  pub inventory_status: Vec<StockLine>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreSales {
  pub store_id:    i64,
  pub store_name:  String,
  pub total_sales: Decimal,
}

/// Total `(store_id, amount)` pairs per store. Every store in `stores`
/// appears in the output, in the given order, even with no sales.
pub fn tally_by_store(
  stores: Vec<(i64, String)>,
  amounts: impl IntoIterator<Item = (i64, Decimal)>,
) -> Result<Vec<StoreSales>> {
  let mut totals: BTreeMap<i64, Decimal> = BTreeMap::new();
  for (store_id, amount) in amounts {
    let total = totals.entry(store_id).or_default();
    *total = add_money(*total, amount)?;
  }
  let tallied = stores
    .into_iter()
    .map(|(store_id, store_name)| StoreSales {
      store_id,
      store_name,
      total_sales: totals.get(&store_id).copied().unwrap_or_default(),
    })
    .collect();
  Ok(tallied)
}

/// Order stores by sales, highest first; ties by ascending store id.
pub fn rank_stores(stores: &mut [StoreSales]) {
  stores.sort_by(|a, b| {
    b.total_sales
      .cmp(&a.total_sales)
      .then(a.store_id.cmp(&b.store_id))
  });
}

// ─── Persisted reports ───────────────────────────────────────────────────────

/// A generated report as recorded in the history table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Report {
  pub id:                   i64,
  pub kind:                 ReportKind,
  pub store_id:             i64,
  pub period:               Option<Period>,
  pub total_sales:          Option<Decimal>,
  pub total_stock:          Option<i64>,
  pub best_selling_product: Option<String>,
  pub generated_by:         i64,
  pub created_at:           DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewReport {
  pub kind:                 ReportKind,
  pub store_id:             i64,
  pub period:               Option<Period>,
  pub total_sales:          Option<Decimal>,
  pub total_stock:          Option<i64>,
  pub best_selling_product: Option<String>,
  pub generated_by:         i64,
}

/// The computed payload of a report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ReportData {
  Sales(SalesSummary),
  Stock(StockSummary),
}

impl NewReport {
  pub fn from_data(
    data: &ReportData,
    store_id: i64,
    period: Option<Period>,
    generated_by: i64,
  ) -> Self {
    match data {
      ReportData::Sales(s) => Self {
        kind: ReportKind::Sales,
        store_id,
        period,
        total_sales: Some(s.total_sales),
        total_stock: None,
        best_selling_product: s.best_selling_product.clone(),
        generated_by,
      },
      ReportData::Stock(s) => Self {
        kind: ReportKind::Stock,
        store_id,
        period,
        total_sales: None,
        total_stock: Some(s.total_stock),
        best_selling_product: None,
        generated_by,
      },
    }
  }
}
