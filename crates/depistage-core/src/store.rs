//! The `RecordStore` trait.
//!
//! The trait is implemented by storage backends (`depistage-store-sqlite`,
//! [`MemoryStore`](crate::memory::MemoryStore)) and by the
//! [`FallbackStore`](crate::fallback::FallbackStore) combinator. Higher layers
//! (`depistage-api`, the server binary) depend on this abstraction, not on any
//! concrete backend.

use std::future::Future;

use uuid::Uuid;

use crate::{
  Classify,
  record::{NewScreening, ScreeningRecord},
};

/// Abstraction over a screening record store.
///
/// Records are never updated in place: the only writes are [`insert`] and
/// [`delete`].
///
/// All methods return `Send` futures so the trait can be used in
/// multi-threaded async runtimes (e.g. tokio with `axum`).
///
/// [`insert`]: RecordStore::insert
/// [`delete`]: RecordStore::delete
pub trait RecordStore: Send + Sync {
  type Error: std::error::Error + Classify + Send + Sync + 'static;

  /// Cheap availability check. `Err` means the backend cannot serve requests
  /// right now; the error should classify as `StoreUnavailable`.
  fn ping(&self) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  /// All records, newest first (by `created_at`, ties broken by insertion
  /// order).
  fn list(
    &self,
  ) -> impl Future<Output = Result<Vec<ScreeningRecord>, Self::Error>> + Send + '_;

  /// Retrieve a record by id. Returns `None` if not found.
  fn get(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<ScreeningRecord>, Self::Error>> + Send + '_;

  /// Persist `input` under the caller-supplied `screening_number`. The store
  /// assigns the id and the `created_at` timestamp.
  fn insert(
    &self,
    screening_number: String,
    input: NewScreening,
  ) -> impl Future<Output = Result<ScreeningRecord, Self::Error>> + Send + '_;

  /// Delete a record. Deleting an unknown id is an error that classifies as
  /// `NotFound`.
  fn delete(&self, id: Uuid) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  /// Screening number of the most recently created record, if any.
  fn last_screening_number(
    &self,
  ) -> impl Future<Output = Result<Option<String>, Self::Error>> + Send + '_;
}
