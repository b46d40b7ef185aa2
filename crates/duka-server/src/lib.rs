//! MyDuka HTTP server: configuration and application assembly.
//!
//! The binary in `main.rs` loads a [`ServerConfig`], opens the SQLite store
//! and serves [`app`].

use std::path::PathBuf;

use axum::Router;
use chrono::Duration;
use duka_api::{AppState, TokenKeys};
use duka_core::repository::Repository;
use serde::Deserialize;
use tower_http::trace::TraceLayer;

// ─── Configuration ───────────────────────────────────────────────────────────

/// Runtime server configuration, deserialised from `config.toml` and
/// `DUKA_*` environment variables.
#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
  #[serde(default = "default_host")]
  pub host:                     String,
  #[serde(default = "default_port")]
  pub port:                     u16,
  #[serde(default = "default_database_path")]
  pub database_path:            PathBuf,
  /// HS256 signing secret for access and invitation tokens.
  pub jwt_secret:               String,
  #[serde(default = "default_access_ttl")]
  pub access_token_ttl_minutes: i64,
  #[serde(default = "default_invite_ttl")]
  pub invite_ttl_hours:         i64,
}

fn default_host() -> String { "127.0.0.1".to_owned() }
fn default_port() -> u16 { 5000 }
fn default_database_path() -> PathBuf { PathBuf::from("myduka.db") }
fn default_access_ttl() -> i64 { 60 }
fn default_invite_ttl() -> i64 { 24 }

impl ServerConfig {
  pub fn address(&self) -> String { format!("{}:{}", self.host, self.port) }

  pub fn token_keys(&self) -> TokenKeys {
    TokenKeys::new(
      self.jwt_secret.as_bytes(),
      Duration::minutes(self.access_token_ttl_minutes),
      Duration::hours(self.invite_ttl_hours),
    )
  }
}

// ─── Application ─────────────────────────────────────────────────────────────

/// The API router for `store`, wrapped in request tracing.
pub fn app<S>(store: S, config: &ServerConfig) -> Router
where
  S: Repository + 'static,
{
  duka_api::api_router(AppState::new(store, config.token_keys()))
    .layer(TraceLayer::new_for_http())
}

#[cfg(test)]
mod tests {
  use axum::{body::Body, http::{Request, StatusCode}};
  use config::{Config, File, FileFormat};
  use duka_store_sqlite::SqliteStore;
  use tower::ServiceExt as _;

  use super::*;

  fn parse(toml: &str) -> Result<ServerConfig, config::ConfigError> {
    Config::builder()
      .add_source(File::from_str(toml, FileFormat::Toml))
      .build()?
      .try_deserialize()
  }

  #[test]
  fn defaults_fill_in_everything_but_the_secret() {
    let cfg = parse(r#"jwt_secret = "s3cret""#).unwrap();
    assert_eq!(cfg.address(), "127.0.0.1:5000");
    assert_eq!(cfg.database_path, PathBuf::from("myduka.db"));
    assert_eq!(cfg.access_token_ttl_minutes, 60);
    assert_eq!(cfg.invite_ttl_hours, 24);
  }

  #[test]
  fn secret_is_required() {
    assert!(parse(r#"port = 8080"#).is_err());
  }

  #[test]
  fn file_values_override_defaults() {
    let cfg = parse(
      r#"
        host = "0.0.0.0"
        port = 8080
        database_path = "/var/lib/duka/duka.db"
        jwt_secret = "s3cret"
        access_token_ttl_minutes = 15
      "#,
    )
    .unwrap();
    assert_eq!(cfg.address(), "0.0.0.0:8080");
    assert_eq!(cfg.access_token_ttl_minutes, 15);
  }

  #[tokio::test]
  async fn assembled_app_serves_requests() {
    let cfg = parse(r#"jwt_secret = "s3cret""#).unwrap();
    let store = SqliteStore::open_in_memory().await.unwrap();
    let req = Request::builder()
      .method("POST")
      .uri("/register")
      .header("content-type", "application/json")
      .body(Body::from(
        serde_json::json!({ "username": "m1", "email": "m1@duka.test", "password": "pw" })
          .to_string(),
      ))
      .unwrap();
    let resp = app(store, &cfg).oneshot(req).await.unwrap();
    assert_eq!(resp.status(), StatusCode::CREATED);
  }
}
