//! Startup errors for the server.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("failed to open record store at {path:?}: {source}")]
  OpenStore {
    path:   PathBuf,
    #[source]
    source: depistage_store_sqlite::Error,
  },

  #[error("configuration error: {0}")]
  Config(#[from] config::ConfigError),
}
