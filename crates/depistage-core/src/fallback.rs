//! [`FallbackStore`]: route every operation to a primary store while it is
//! available, and to a secondary store otherwise.
//!
//! Routing is decided by an explicit [`RecordStore::ping`] on the primary
//! before each operation. If the primary passes the check but the operation
//! itself comes back with an error classified as `StoreUnavailable`, the
//! operation is replayed on the secondary. Any other primary error (not found,
//! constraint violation, ...) is returned as is.
//!
//! When both stores are unavailable the caller receives
//! [`Error::StoreUnavailable`].

use std::future::Future;

use uuid::Uuid;

use crate::{
  Classify, Error, ErrorKind, Result,
  record::{NewScreening, ScreeningRecord},
  store::RecordStore,
};

#[derive(Debug, Clone)]
pub struct FallbackStore<P, S> {
  primary:   P,
  secondary: S,
}

/// Which backend served (or should serve) an operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
  Primary,
  Secondary,
}

impl<P, S> FallbackStore<P, S>
where
  P: RecordStore,
  S: RecordStore,
{
  pub fn new(primary: P, secondary: S) -> Self { Self { primary, secondary } }

  pub fn primary(&self) -> &P { &self.primary }

  pub fn secondary(&self) -> &S { &self.secondary }

  /// Decide where the next operation goes.
  pub async fn route(&self) -> Route {
    match self.primary.ping().await {
      Ok(()) => Route::Primary,
      Err(e) => {
        tracing::warn!(error = %e, "primary record store unavailable, using fallback");
        Route::Secondary
      }
    }
  }

  async fn run<'a, T, FP, FS>(
    &'a self,
    id: Option<Uuid>,
    on_primary: impl FnOnce(&'a P) -> FP,
    on_secondary: impl FnOnce(&'a S) -> FS,
  ) -> Result<T>
  where
    FP: Future<Output = Result<T, P::Error>>,
    FS: Future<Output = Result<T, S::Error>>,
  {
    if self.route().await == Route::Primary {
      match on_primary(&self.primary).await {
        Ok(v) => return Ok(v),
        Err(e) if e.kind() == ErrorKind::StoreUnavailable => {
          tracing::warn!(error = %e, "primary record store failed, replaying on fallback");
        }
        Err(e) => return Err(lift(e, id)),
      }
    }

    on_secondary(&self.secondary).await.map_err(|e| {
      if e.kind() == ErrorKind::StoreUnavailable {
        tracing::error!(error = %e, "fallback record store unavailable as well");
      }
      lift(e, id)
    })
  }
}

/// Convert a backend error into the core taxonomy. `id` is the record the
/// operation targeted, if any.
fn lift<E: std::error::Error + Classify>(e: E, id: Option<Uuid>) -> Error {
  match (e.kind(), id) {
    (ErrorKind::StoreUnavailable, _) => Error::StoreUnavailable,
    (ErrorKind::NotFound, Some(id)) => Error::NotFound(id),
    _ => Error::Unknown(e.to_string()),
  }
}

impl<P, S> RecordStore for FallbackStore<P, S>
where
  P: RecordStore,
  S: RecordStore,
{
  type Error = Error;

  async fn ping(&self) -> Result<()> {
    if self.primary.ping().await.is_ok() || self.secondary.ping().await.is_ok() {
      Ok(())
    } else {
      Err(Error::StoreUnavailable)
    }
  }

  async fn list(&self) -> Result<Vec<ScreeningRecord>> {
    self.run(None, |p| p.list(), |s| s.list()).await
  }

  async fn get(&self, id: Uuid) -> Result<Option<ScreeningRecord>> {
    self.run(Some(id), |p| p.get(id), |s| s.get(id)).await
  }

  async fn insert(&self, screening_number: String, input: NewScreening) -> Result<ScreeningRecord> {
    let (number2, input2) = (screening_number.clone(), input.clone());
    self
      .run(
        None,
        move |p| p.insert(screening_number, input),
        move |s| s.insert(number2, input2),
      )
      .await
  }

  async fn delete(&self, id: Uuid) -> Result<()> {
    self.run(Some(id), |p| p.delete(id), |s| s.delete(id)).await
  }

  async fn last_screening_number(&self) -> Result<Option<String>> {
    self
      .run(None, |p| p.last_screening_number(), |s| s.last_screening_number())
      .await
  }
}
