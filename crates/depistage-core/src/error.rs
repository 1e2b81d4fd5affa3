//! Error types for `depistage-core`.

use thiserror::Error;
use uuid::Uuid;

use crate::record::Field;

/// The coarse taxonomy every layer maps its errors onto.
///
/// Callers decide how to react from the kind alone: validation failures never
/// reach a store, unavailability is retryable, a missing record is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
  ValidationFailed,
  StoreUnavailable,
  NotFound,
  Unknown,
}

impl ErrorKind {
  /// Whether retrying the same operation later can succeed.
  pub fn is_retryable(self) -> bool {
    matches!(self, Self::StoreUnavailable | Self::Unknown)
  }
}

/// Implemented by every store error so generic code can branch on the kind
/// without knowing the backend.
pub trait Classify {
  fn kind(&self) -> ErrorKind;
}

#[derive(Debug, Error)]
pub enum Error {
  #[error("missing required information: {}", Field::join_labels(.0))]
  ValidationFailed(Vec<Field>),

  #[error("record store unavailable")]
  StoreUnavailable,

  #[error("screening record not found: {0}")]
  NotFound(Uuid),

  #[error("{0}")]
  Unknown(String),
}

impl Classify for Error {
  fn kind(&self) -> ErrorKind {
    match self {
      Error::ValidationFailed(_) => ErrorKind::ValidationFailed,
      Error::StoreUnavailable => ErrorKind::StoreUnavailable,
      Error::NotFound(_) => ErrorKind::NotFound,
      Error::Unknown(_) => ErrorKind::Unknown,
    }
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
