//! JSON REST API for the screening campaign.
//!
//! Exposes an axum [`Router`] backed by any
//! [`depistage_core::store::RecordStore`]. Transport concerns (binding,
//! tracing layers, health checks) are the caller's responsibility.
//!
//! # Mounting
//!
//! ```rust,ignore
//! .nest("/api", depistage_api::api_router(store.clone()))
//! ```

pub mod error;
pub mod screenings;
pub mod stats;

use std::sync::Arc;

use axum::{Router, routing::get};
use depistage_core::store::RecordStore;

pub use error::ApiError;

/// Build a fully-materialised API router for `store`.
///
/// The returned `Router<()>` can be nested into any parent router regardless
/// of its own state type.
pub fn api_router<S>(store: Arc<S>) -> Router<()>
where
  S: RecordStore + 'static,
{
  Router::new()
    // Screenings
    .route(
      "/screenings",
      get(screenings::list::<S>).post(screenings::create::<S>),
    )
    .route("/screenings/export", get(screenings::export::<S>))
    .route(
      "/screenings/{id}",
      get(screenings::get_one::<S>).delete(screenings::delete_one::<S>),
    )
    // Dashboard
    .route("/stats", get(stats::handler::<S>))
    .with_state(store)
}

#[cfg(test)]
mod tests;
