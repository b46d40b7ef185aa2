//! Router-level tests driving the full API over an in-memory SQLite store.

use axum::{
  Router,
  body::Body,
  http::{Request, StatusCode, header},
};
use chrono::Duration;
use duka_store_sqlite::SqliteStore;
use serde_json::{Value, json};
use tower::ServiceExt as _;

use crate::{AppState, TokenKeys, api_router};

async fn app() -> Router {
  let store = SqliteStore::open_in_memory()
    .await
    .expect("in-memory store");
  let tokens = TokenKeys::new(b"test-secret", Duration::minutes(60), Duration::hours(24));
  api_router(AppState::new(store, tokens))
}

async fn send(
  app: &Router,
  method: &str,
  uri: &str,
  headers: Vec<(&str, String)>,
  body: Option<String>,
) -> (StatusCode, Value) {
  let mut builder = Request::builder().method(method).uri(uri);
  for (k, v) in headers {
    builder = builder.header(k, v);
  }
  let body = match body {
    Some(b) => {
      builder = builder.header(header::CONTENT_TYPE, "application/json");
      Body::from(b)
    }
    None => Body::empty(),
  };
  let resp = app
    .clone()
    .oneshot(builder.body(body).unwrap())
    .await
    .unwrap();
  let status = resp.status();
  let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
    .await
    .unwrap();
  let value = if bytes.is_empty() {
    Value::Null
  } else {
    serde_json::from_slice(&bytes).unwrap()
  };
  (status, value)
}

/// Call `uri` as the holder of `token` (or anonymously).
async fn call(
  app: &Router,
  method: &str,
  uri: &str,
  token: Option<&str>,
  body: Option<Value>,
) -> (StatusCode, Value) {
  let headers = token
    .map(|t| vec![("authorization", format!("Bearer {t}"))])
    .unwrap_or_default();
  send(app, method, uri, headers, body.map(|b| b.to_string())).await
}

async fn register(app: &Router, name: &str) -> Value {
  let (status, user) = call(
    app,
    "POST",
    "/register",
    None,
    Some(json!({ "username": name, "email": format!("{name}@duka.test"), "password": "pw" })),
  )
  .await;
  assert_eq!(status, StatusCode::CREATED, "{user}");
  user
}

async fn login(app: &Router, name: &str) -> String {
  let (status, body) = call(
    app,
    "POST",
    "/login",
    None,
    Some(json!({ "username": name, "password": "pw" })),
  )
  .await;
  assert_eq!(status, StatusCode::OK, "{body}");
  body["access_token"].as_str().unwrap().to_owned()
}

/// Create a merchant and return their token.
async fn merchant(app: &Router, name: &str) -> String {
  register(app, name).await;
  login(app, name).await
}

/// Invite and register an admin under `merchant`; returns the admin's token.
async fn admin(app: &Router, merchant: &str, name: &str) -> String {
  let (status, invite) = call(
    app,
    "POST",
    "/users/admins/invite",
    Some(merchant),
    Some(json!({ "email": format!("{name}@duka.test") })),
  )
  .await;
  assert_eq!(status, StatusCode::CREATED, "{invite}");
  let token = invite["invite_token"].as_str().unwrap();

  let (status, user) = call(
    app,
    "POST",
    &format!("/register/admin/{token}"),
    None,
    Some(json!({ "username": name, "password": "pw" })),
  )
  .await;
  assert_eq!(status, StatusCode::CREATED, "{user}");
  assert_eq!(user["role"], "admin");
  login(app, name).await
}

/// Create a clerk as `admin`; returns `(clerk id, clerk token)`.
async fn clerk(app: &Router, admin: &str, name: &str) -> (i64, String) {
  let (status, user) = call(
    app,
    "POST",
    "/users/clerks",
    Some(admin),
    Some(json!({ "username": name, "email": format!("{name}@duka.test"), "password": "pw" })),
  )
  .await;
  assert_eq!(status, StatusCode::CREATED, "{user}");
  (user["id"].as_i64().unwrap(), login(app, name).await)
}

async fn store(app: &Router, token: &str, name: &str) -> i64 {
  let (status, body) = call(
    app,
    "POST",
    "/stores",
    Some(token),
    Some(json!({ "name": name, "location": "Nairobi" })),
  )
  .await;
  assert_eq!(status, StatusCode::CREATED, "{body}");
  body["id"].as_i64().unwrap()
}

async fn item(app: &Router, token: &str, store_id: i64, name: &str, qty: i64) -> i64 {
  let (status, body) = call(
    app,
    "POST",
    "/inventory",
    Some(token),
    Some(json!({
      "product_name": name,
      "quantity_received": qty,
      "buying_price": 6,
      "selling_price": 10,
      "store_id": store_id,
    })),
  )
  .await;
  assert_eq!(status, StatusCode::CREATED, "{body}");
  body["id"].as_i64().unwrap()
}

async fn stock(app: &Router, token: &str, id: i64) -> i64 {
  let (_, body) = call(app, "GET", &format!("/inventory/{id}"), Some(token), None).await;
  body["quantity_in_stock"].as_i64().unwrap()
}

async fn sell(app: &Router, token: &str, id: i64, qty: i64) -> (StatusCode, Value) {
  call(
    app,
    "POST",
    "/sales",
    Some(token),
    Some(json!({ "inventory_id": id, "quantity_sold": qty })),
  )
  .await
}

// ─── Accounts ────────────────────────────────────────────────────────────────

#[tokio::test]
async fn duplicate_registration_is_409() {
  let app = app().await;
  register(&app, "m1").await;

  let (status, body) = call(
    &app,
    "POST",
    "/register",
    None,
    Some(json!({ "username": "m1", "email": "other@duka.test", "password": "pw" })),
  )
  .await;
  assert_eq!(status, StatusCode::CONFLICT);
  assert!(body["error"].is_string());
}

#[tokio::test]
async fn login_accepts_email_and_rejects_bad_password() {
  let app = app().await;
  register(&app, "m1").await;

  let (status, body) = call(
    &app,
    "POST",
    "/login",
    None,
    Some(json!({ "email": "m1@duka.test", "password": "pw" })),
  )
  .await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(body["token_type"], "Bearer");
  assert_eq!(body["user"]["role"], "merchant");
  assert!(body["user"].get("password_hash").is_none());

  let (status, _) = call(
    &app,
    "POST",
    "/login",
    None,
    Some(json!({ "username": "m1", "password": "nope" })),
  )
  .await;
  assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn missing_or_garbage_token_is_401() {
  let app = app().await;
  let (status, body) = call(&app, "GET", "/stores", None, None).await;
  assert_eq!(status, StatusCode::UNAUTHORIZED);
  assert!(body["error"].is_string());

  let (status, _) = call(&app, "GET", "/stores", Some("not.a.jwt"), None).await;
  assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn access_token_header_is_accepted() {
  let app = app().await;
  let token = merchant(&app, "m1").await;

  let (status, me) = send(&app, "GET", "/me", vec![("x-access-token", token)], None).await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(me["username"], "m1");
}

#[tokio::test]
async fn deactivated_admin_is_locked_out() {
  let app = app().await;
  let m = merchant(&app, "m1").await;
  let a = admin(&app, &m, "a1").await;

  let (_, admins) = call(&app, "GET", "/users/admins", Some(&m), None).await;
  let id = admins[0]["id"].as_i64().unwrap();

  let (status, body) = call(
    &app,
    "PATCH",
    &format!("/users/admins/{id}/deactivate"),
    Some(&m),
    None,
  )
  .await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(body["active"], false);

  let (status, _) = call(&app, "GET", "/me", Some(&a), None).await;
  assert_eq!(status, StatusCode::UNAUTHORIZED);
  let (status, _) = call(
    &app,
    "POST",
    "/login",
    None,
    Some(json!({ "username": "a1", "password": "pw" })),
  )
  .await;
  assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn invitation_cannot_be_used_as_access_token() {
  let app = app().await;
  let m = merchant(&app, "m1").await;
  let (_, invite) = call(
    &app,
    "POST",
    "/users/admins/invite",
    Some(&m),
    Some(json!({ "email": "a1@duka.test" })),
  )
  .await;
  let token = invite["invite_token"].as_str().unwrap();

  let (status, _) = call(&app, "GET", "/me", Some(token), None).await;
  assert_eq!(status, StatusCode::UNAUTHORIZED);

  let (status, _) = call(
    &app,
    "POST",
    &format!("/register/admin/{m}"),
    None,
    Some(json!({ "username": "a1", "password": "pw" })),
  )
  .await;
  assert_eq!(status, StatusCode::UNAUTHORIZED);
}

// ─── Authorisation ───────────────────────────────────────────────────────────

#[tokio::test]
async fn wrong_role_is_403_even_with_a_bad_body() {
  let app = app().await;
  let m = merchant(&app, "m1").await;
  let a = admin(&app, &m, "a1").await;
  let (_, c) = clerk(&app, &a, "c1").await;

  let (status, _) = send(
    &app,
    "POST",
    "/stores",
    vec![("authorization", format!("Bearer {c}"))],
    Some("{ not json".into()),
  )
  .await;
  assert_eq!(status, StatusCode::FORBIDDEN);

  // Merchants are not admins: no implicit hierarchy.
  let (status, _) = call(&app, "GET", "/users/clerks", Some(&m), None).await;
  assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn malformed_body_is_400() {
  let app = app().await;
  let m = merchant(&app, "m1").await;

  let (status, body) = send(
    &app,
    "POST",
    "/stores",
    vec![("authorization", format!("Bearer {m}"))],
    Some("{ not json".into()),
  )
  .await;
  assert_eq!(status, StatusCode::BAD_REQUEST);
  assert!(body["error"].is_string());

  let (status, _) = call(
    &app,
    "POST",
    "/stores",
    Some(&m),
    Some(json!({ "name": "", "location": "x" })),
  )
  .await;
  assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn merchants_may_reuse_each_others_store_names() {
  let app = app().await;
  let m1 = merchant(&app, "m1").await;
  let m2 = merchant(&app, "m2").await;
  store(&app, &m1, "Main Street").await;
  store(&app, &m2, "Main Street").await;

  let (status, _) = call(
    &app,
    "POST",
    "/stores",
    Some(&m1),
    Some(json!({ "name": "Main Street", "location": "Nakuru" })),
  )
  .await;
  assert_eq!(status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn other_merchants_stores_are_404() {
  let app = app().await;
  let m1 = merchant(&app, "m1").await;
  let m2 = merchant(&app, "m2").await;
  let s1 = store(&app, &m1, "S1").await;

  let (status, _) = call(&app, "GET", &format!("/stores/{s1}"), Some(&m2), None).await;
  assert_eq!(status, StatusCode::NOT_FOUND);
  let (_, list) = call(&app, "GET", "/stores", Some(&m2), None).await;
  assert_eq!(list, json!([]));
}

// ─── Sales ───────────────────────────────────────────────────────────────────

#[tokio::test]
async fn sale_then_oversell() {
  let app = app().await;
  let m = merchant(&app, "m1").await;
  let s1 = store(&app, &m, "S1").await;
  let milk = item(&app, &m, s1, "Milk", 10).await;

  let (status, sale) = sell(&app, &m, milk, 4).await;
  assert_eq!(status, StatusCode::CREATED, "{sale}");
  assert_eq!(sale["total_price"], "40");
  assert_eq!(stock(&app, &m, milk).await, 6);

  let (status, body) = sell(&app, &m, milk, 10).await;
  assert_eq!(status, StatusCode::BAD_REQUEST);
  assert!(body["error"].as_str().unwrap().contains("stock"));
  assert_eq!(stock(&app, &m, milk).await, 6);
}

#[tokio::test]
async fn out_of_range_quantities_are_400_and_the_api_stays_up() {
  let app = app().await;
  let m = merchant(&app, "m1").await;
  let s1 = store(&app, &m, "S1").await;

  let (status, body) = call(
    &app,
    "POST",
    "/inventory",
    Some(&m),
    Some(json!({
      "product_name": "Gold",
      "quantity_received": i64::MAX,
      "buying_price": 1,
      "selling_price": "79228162514264337593543950335",
      "store_id": s1,
    })),
  )
  .await;
  assert_eq!(status, StatusCode::BAD_REQUEST, "{body}");

  let milk = item(&app, &m, s1, "Milk", 10).await;
  let (status, _) = sell(&app, &m, milk, i64::MAX).await;
  assert_eq!(status, StatusCode::BAD_REQUEST);

  let (status, _) = call(
    &app,
    "POST",
    &format!("/inventory/{milk}/restock"),
    Some(&m),
    Some(json!({ "quantity": i64::MAX })),
  )
  .await;
  assert_eq!(status, StatusCode::BAD_REQUEST);

  assert_eq!(stock(&app, &m, milk).await, 10);
  let (status, _) = call(&app, "GET", "/me", Some(&m), None).await;
  assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn store_with_inventory_cannot_be_deleted() {
  let app = app().await;
  let m = merchant(&app, "m1").await;
  let s1 = store(&app, &m, "S1").await;
  item(&app, &m, s1, "Milk", 10).await;

  let (status, _) = call(&app, "DELETE", &format!("/stores/{s1}"), Some(&m), None).await;
  assert_eq!(status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn clerk_sells_only_assigned_items() {
  let app = app().await;
  let m = merchant(&app, "m1").await;
  let a = admin(&app, &m, "a1").await;
  let (clerk_id, c) = clerk(&app, &a, "c1").await;
  let s1 = store(&app, &m, "S1").await;
  let milk = item(&app, &a, s1, "Milk", 10).await;

  let (status, _) = sell(&app, &c, milk, 1).await;
  assert_eq!(status, StatusCode::NOT_FOUND);

  let (status, assigned) = call(
    &app,
    "POST",
    "/inventory/assign",
    Some(&a),
    Some(json!({ "clerk_id": clerk_id, "inventory_ids": [milk] })),
  )
  .await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(assigned.as_array().unwrap().len(), 1);

  let (_, mine) = call(&app, "GET", "/inventory/assigned", Some(&c), None).await;
  assert_eq!(mine[0]["id"], milk);

  let (status, _) = sell(&app, &c, milk, 1).await;
  assert_eq!(status, StatusCode::CREATED);
  assert_eq!(stock(&app, &a, milk).await, 9);
}

// ─── Supply requests ─────────────────────────────────────────────────────────

#[tokio::test]
async fn supply_request_approval_restocks() {
  let app = app().await;
  let m = merchant(&app, "m1").await;
  let a = admin(&app, &m, "a1").await;
  let (clerk_id, c) = clerk(&app, &a, "c1").await;
  let s1 = store(&app, &m, "S1").await;
  let milk = item(&app, &a, s1, "Milk", 2).await;
  call(
    &app,
    "POST",
    "/inventory/assign",
    Some(&a),
    Some(json!({ "clerk_id": clerk_id, "inventory_ids": [milk] })),
  )
  .await;

  let (status, req) = call(
    &app,
    "POST",
    "/supply_requests",
    Some(&c),
    Some(json!({ "inventory_id": milk, "quantity": 8 })),
  )
  .await;
  assert_eq!(status, StatusCode::CREATED, "{req}");
  assert_eq!(req["status"], "pending");
  let uri = format!("/supply_requests/{}", req["id"]);

  let (status, done) = call(&app, "PUT", &uri, Some(&a), Some(json!({ "status": "approved" }))).await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(done["status"], "approved");
  assert_eq!(stock(&app, &a, milk).await, 10);

  let (status, _) = call(&app, "PUT", &uri, Some(&a), Some(json!({ "status": "declined" }))).await;
  assert_eq!(status, StatusCode::CONFLICT);
  assert_eq!(stock(&app, &a, milk).await, 10);
}

// ─── Reports ─────────────────────────────────────────────────────────────────

#[tokio::test]
async fn weekly_sales_report_totals_the_ledger() {
  let app = app().await;
  let m = merchant(&app, "m1").await;
  let s1 = store(&app, &m, "S1").await;
  let milk = item(&app, &m, s1, "Milk", 10).await;
  sell(&app, &m, milk, 3).await;
  sell(&app, &m, milk, 2).await;

  let body = json!({ "report_type": "sales", "store_id": s1, "period": "weekly" });
  for _ in 0..2 {
    let (status, generated) = call(&app, "POST", "/report", Some(&m), Some(body.clone())).await;
    assert_eq!(status, StatusCode::CREATED, "{generated}");
    assert_eq!(generated["data"]["total_sales"], "50");
    assert_eq!(generated["data"]["best_selling_product"], "Milk");
    assert_eq!(generated["report"]["total_sales"], "50");
  }

  let (_, history) = call(&app, "GET", &format!("/report?store_id={s1}"), Some(&m), None).await;
  assert_eq!(history.as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn merchant_report_lists_every_store() {
  let app = app().await;
  let m = merchant(&app, "m1").await;
  let a = admin(&app, &m, "a1").await;
  let s1 = store(&app, &m, "S1").await;
  let s2 = store(&app, &m, "S2").await;
  let milk = item(&app, &m, s2, "Milk", 10).await;
  sell(&app, &m, milk, 2).await;

  let (status, totals) = call(
    &app,
    "GET",
    "/report/merchant_reports?report_type=monthly",
    Some(&m),
    None,
  )
  .await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(totals[0]["store_id"], s1);
  assert_eq!(totals[0]["total_sales"], "0");
  assert_eq!(totals[1]["total_sales"], "20");

  let (status, ranked) = call(
    &app,
    "GET",
    "/report/admin_reports?report_type=annual",
    Some(&a),
    None,
  )
  .await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(ranked[0]["store_id"], s2);

  let (status, _) = call(&app, "GET", "/report/admin_reports", Some(&m), None).await;
  assert_eq!(status, StatusCode::FORBIDDEN);

  let (status, _) = call(
    &app,
    "GET",
    "/report/admin_reports?report_type=daily",
    Some(&a),
    None,
  )
  .await;
  assert_eq!(status, StatusCode::BAD_REQUEST);
}
