//! Error type for `depistage-store-sqlite`.

use depistage_core::{Classify, ErrorKind};
use rusqlite::ErrorCode;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("database error: {0}")]
  Database(#[from] tokio_rusqlite::Error),

  #[error("uuid parse error: {0}")]
  Uuid(#[from] uuid::Error),

  /// A column held a value the domain types cannot represent.
  #[error("cannot decode column {column}: {value:?}")]
  Decode { column: &'static str, value: String },

  #[error("screening record not found: {0}")]
  NotFound(uuid::Uuid),
}

impl Classify for Error {
  fn kind(&self) -> ErrorKind {
    match self {
      Error::Database(tokio_rusqlite::Error::ConnectionClosed) => ErrorKind::StoreUnavailable,
      Error::Database(tokio_rusqlite::Error::Rusqlite(e)) => classify_sqlite(e),
      Error::Database(tokio_rusqlite::Error::Close((_, e))) => classify_sqlite(e),
      Error::NotFound(_) => ErrorKind::NotFound,
      _ => ErrorKind::Unknown,
    }
  }
}

/// The database file could not be reached, as opposed to a bad statement or
/// a constraint violation.
fn classify_sqlite(e: &rusqlite::Error) -> ErrorKind {
  let rusqlite::Error::SqliteFailure(failure, _) = e else {
    return ErrorKind::Unknown;
  };
  match failure.code {
    ErrorCode::CannotOpen
    | ErrorCode::DatabaseBusy
    | ErrorCode::DatabaseLocked
    | ErrorCode::NotADatabase
    | ErrorCode::ReadOnly
    | ErrorCode::DiskFull
    | ErrorCode::SystemIoFailure => ErrorKind::StoreUnavailable,
    _ => ErrorKind::Unknown,
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
