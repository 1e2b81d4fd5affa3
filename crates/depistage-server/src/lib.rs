//! HTTP server for the screening campaign.
//!
//! Wires configuration, store selection and the JSON API from
//! `depistage-api` into a single axum [`Router`].

pub mod error;

pub use error::Error;

use std::{
  path::{Path, PathBuf},
  sync::Arc,
};

use axum::{Router, routing::get};
use depistage_core::{
  fallback::FallbackStore,
  memory::{MemoryStore, demo_records},
  store::RecordStore,
};
use depistage_store_sqlite::SqliteStore;
use serde::Deserialize;
use tower_http::trace::TraceLayer;

// ─── Configuration ───────────────────────────────────────────────────────────

/// Runtime server configuration, deserialised from `config.toml` and
/// `DEPISTAGE_*` environment variables.
#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
  #[serde(default = "default_host")]
  pub host:  String,
  #[serde(default = "default_port")]
  pub port:  u16,
  #[serde(default)]
  pub store: StoreConfig,
}

#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum Backend {
  #[default]
  Sqlite,
  Memory,
}

#[derive(Debug, Deserialize, Clone)]
pub struct StoreConfig {
  #[serde(default)]
  pub backend:   Backend,
  #[serde(default = "default_store_path")]
  pub path:      PathBuf,
  /// Serve from memory when the SQLite file is unavailable.
  #[serde(default = "default_true")]
  pub fallback:  bool,
  /// Seed the memory store with two sample records.
  #[serde(default)]
  pub seed_demo: bool,
}

impl Default for StoreConfig {
  fn default() -> Self {
    Self {
      backend:   Backend::default(),
      path:      default_store_path(),
      fallback:  true,
      seed_demo: false,
    }
  }
}

fn default_host() -> String { "127.0.0.1".to_string() }

fn default_port() -> u16 { 3000 }

fn default_store_path() -> PathBuf { PathBuf::from("depistage.db") }

fn default_true() -> bool { true }

/// Merge `file` with `DEPISTAGE_`-prefixed environment variables
/// (`DEPISTAGE_STORE__BACKEND=memory`).
pub fn load_config<F>(file: F) -> Result<ServerConfig, Error>
where
  F: config::Source + Send + Sync + 'static,
{
  let settings = config::Config::builder()
    .add_source(file)
    .add_source(
      config::Environment::with_prefix("DEPISTAGE")
        .prefix_separator("_")
        .separator("__")
        .try_parsing(true),
    )
    .build()?;
  Ok(settings.try_deserialize()?)
}

// ─── Store selection ─────────────────────────────────────────────────────────

fn memory_store(cfg: &StoreConfig) -> MemoryStore {
  if cfg.seed_demo {
    MemoryStore::with_records(demo_records())
  } else {
    MemoryStore::new()
  }
}

/// Open the configured store and build the application router around it.
///
/// With `fallback` enabled, a SQLite file that cannot be opened is not
/// fatal: the server starts on the memory store and says so in the log. A
/// SQLite store that opens is still wrapped in a [`FallbackStore`] so that
/// it can fail over later.
pub async fn build_app(cfg: &StoreConfig) -> Result<Router, Error> {
  match cfg.backend {
    Backend::Memory => {
      tracing::info!(seed_demo = cfg.seed_demo, "using in-memory record store");
      Ok(router(Arc::new(memory_store(cfg))))
    }
    Backend::Sqlite => {
      let path = expand_tilde(&cfg.path);
      match SqliteStore::open(&path).await {
        Ok(sqlite) if cfg.fallback => {
          tracing::info!(?path, "using SQLite record store with in-memory fallback");
          Ok(router(Arc::new(FallbackStore::new(sqlite, memory_store(cfg)))))
        }
        Ok(sqlite) => {
          tracing::info!(?path, "using SQLite record store");
          Ok(router(Arc::new(sqlite)))
        }
        Err(source) if cfg.fallback => {
          tracing::warn!(
            ?path,
            error = %source,
            "cannot open SQLite record store, serving from memory"
          );
          Ok(router(Arc::new(memory_store(cfg))))
        }
        Err(source) => Err(Error::OpenStore { path, source }),
      }
    }
  }
}

/// Expand a leading `~` to the user's home directory.
pub fn expand_tilde(path: &Path) -> PathBuf {
  let s = path.to_string_lossy();
  if let Some(rest) = s.strip_prefix("~/")
    && let Ok(home) = std::env::var("HOME")
  {
    return PathBuf::from(home).join(rest);
  }
  path.to_path_buf()
}

// ─── Router ──────────────────────────────────────────────────────────────────

/// `/health` plus the JSON API under `/api`, with request tracing.
pub fn router<S>(store: Arc<S>) -> Router
where
  S: RecordStore + 'static,
{
  Router::new()
    .route("/health", get(health))
    .nest("/api", depistage_api::api_router(store))
    .layer(TraceLayer::new_for_http())
}

async fn health() -> &'static str { "ok" }

#[cfg(test)]
mod tests {
  use axum::{
    body::Body,
    http::{Request, StatusCode, header},
  };
  use serde_json::{Value, json};
  use tower::ServiceExt as _;

  use super::*;

  fn toml(s: &'static str) -> impl config::Source + Send + Sync + 'static {
    config::File::from_str(s, config::FileFormat::Toml)
  }

  async fn oneshot_raw(
    app:    Router,
    method: &str,
    uri:    &str,
    body:   Option<Value>,
  ) -> axum::response::Response {
    let mut builder = Request::builder().method(method).uri(uri);
    let body = match body {
      Some(v) => {
        builder = builder.header(header::CONTENT_TYPE, "application/json");
        Body::from(v.to_string())
      }
      None => Body::empty(),
    };
    app.oneshot(builder.body(body).unwrap()).await.unwrap()
  }

  fn intake() -> Value {
    json!({
      "date": "2024-10-20",
      "lastName": "N'Guessan",
      "firstName": "Affoué",
      "age": 58,
      "phone": "0202020202",
      "address": "Marcory"
    })
  }

  fn unreachable_path() -> PathBuf {
    std::env::temp_dir()
      .join(format!("missing-{}", uuid::Uuid::new_v4()))
      .join("screenings.db")
  }

  // ── Configuration ─────────────────────────────────────────────────────────

  #[test]
  fn empty_config_uses_defaults() {
    let cfg = load_config(toml("")).unwrap();
    assert_eq!(cfg.host, "127.0.0.1");
    assert_eq!(cfg.port, 3000);
    assert_eq!(cfg.store.backend, Backend::Sqlite);
    assert!(cfg.store.fallback);
    assert!(!cfg.store.seed_demo);
  }

  #[test]
  fn config_file_is_read() {
    let cfg = load_config(toml(
      "port = 8080\n[store]\nbackend = \"memory\"\nseed_demo = true\nfallback = false\n",
    ))
    .unwrap();
    assert_eq!(cfg.port, 8080);
    assert_eq!(cfg.store.backend, Backend::Memory);
    assert!(cfg.store.seed_demo);
    assert!(!cfg.store.fallback);
  }

  #[test]
  fn tilde_is_expanded() {
    let Ok(home) = std::env::var("HOME") else {
      return;
    };
    assert_eq!(expand_tilde(Path::new("~/a.db")), PathBuf::from(home).join("a.db"));
    assert_eq!(expand_tilde(Path::new("/tmp/a.db")), PathBuf::from("/tmp/a.db"));
  }

  // ── Routing ───────────────────────────────────────────────────────────────

  #[tokio::test]
  async fn health_returns_ok() {
    let app = router(Arc::new(MemoryStore::new()));
    let resp = oneshot_raw(app, "GET", "/health", None).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    assert_eq!(&bytes[..], b"ok");
  }

  #[tokio::test]
  async fn api_is_nested_under_api() {
    let store = Arc::new(MemoryStore::with_records(demo_records()));
    let resp = oneshot_raw(router(store.clone()), "GET", "/api/screenings", None).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let resp = oneshot_raw(router(store), "GET", "/screenings", None).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
  }

  // ── Store selection ───────────────────────────────────────────────────────

  #[tokio::test]
  async fn memory_backend_with_demo_seed() {
    let cfg = StoreConfig { backend: Backend::Memory, seed_demo: true, ..Default::default() };
    let app = build_app(&cfg).await.unwrap();

    let resp = oneshot_raw(app, "GET", "/api/stats", None).await;
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    let stats: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(stats["total"], 2);
  }

  #[tokio::test]
  async fn unopenable_sqlite_falls_back_to_memory() {
    let cfg = StoreConfig { path: unreachable_path(), fallback: true, ..Default::default() };
    let app = build_app(&cfg).await.unwrap();

    let resp = oneshot_raw(app, "POST", "/api/screenings", Some(intake())).await;
    assert_eq!(resp.status(), StatusCode::CREATED);
  }

  #[tokio::test]
  async fn unopenable_sqlite_without_fallback_is_an_error() {
    let cfg = StoreConfig { path: unreachable_path(), fallback: false, ..Default::default() };
    assert!(matches!(build_app(&cfg).await, Err(Error::OpenStore { .. })));
  }

  #[tokio::test]
  async fn sqlite_backend_serves_requests() {
    let cfg = StoreConfig { path: PathBuf::from(":memory:"), ..Default::default() };
    let app = build_app(&cfg).await.unwrap();

    let resp = oneshot_raw(app.clone(), "POST", "/api/screenings", Some(intake())).await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let resp = oneshot_raw(app, "GET", "/api/screenings", None).await;
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    let listed: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(listed[0]["screeningNumber"], "1");
  }
}
