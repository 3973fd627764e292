//! HTTP surface for Rollcall.
//!
//! Exposes an axum [`Router`] with the check-in endpoints, backed by any
//! store implementing the `rollcall-core` directory traits plus
//! [`auth::CredentialStore`].

pub mod auth;
pub mod error;
pub mod handlers;

pub use error::Error;

use std::{path::PathBuf, sync::Arc};

use axum::{
  Router,
  routing::{get, post},
};
use rollcall_core::{
  coordinator::CheckInCoordinator,
  resolver::{SourceRegistry, SourceResolver},
  source::{RsvpAttendeeSource, TicketAttendeeSource},
  store::{ActorLookup, EventDirectory},
};
use rollcall_store_sqlite::SqliteStore;
use serde::Deserialize;
use tower_http::trace::TraceLayer;

use auth::CredentialStore;

// ─── Configuration ────────────────────────────────────────────────────────────

/// Runtime server configuration, deserialised from `config.toml` and
/// `ROLLCALL_*` environment variables.
#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
  pub host:       String,
  pub port:       u16,
  pub store_path: PathBuf,
  #[serde(default)]
  pub sources:    SourcesConfig,
}

/// Which attendee sources are registered at startup.
#[derive(Debug, Deserialize, Clone, Copy)]
pub struct SourcesConfig {
  #[serde(default = "enabled")]
  pub rsvp:    bool,
  #[serde(default = "enabled")]
  pub tickets: bool,
}

impl Default for SourcesConfig {
  fn default() -> Self { Self { rsvp: true, tickets: true } }
}

fn enabled() -> bool { true }

/// Assemble the attendee sources enabled in `sources`, in the order RSVP,
/// tickets.
pub fn build_registry(
  store: &SqliteStore,
  sources: SourcesConfig,
) -> rollcall_core::Result<SourceRegistry> {
  let mut registry = SourceRegistry::new();
  if sources.rsvp {
    registry.register(Arc::new(RsvpAttendeeSource::new(store.rsvps())))?;
  }
  if sources.tickets {
    registry.register(Arc::new(TicketAttendeeSource::new(store.tickets())))?;
  }
  Ok(registry)
}

// ─── Application state ────────────────────────────────────────────────────────

/// Everything a handler's store needs to provide.
pub trait Backend:
  EventDirectory + ActorLookup + CredentialStore + Clone + Send + Sync + 'static
{
}

impl<T> Backend for T where
  T: EventDirectory + ActorLookup + CredentialStore + Clone + Send + Sync + 'static
{
}

/// Shared state threaded through all axum handlers.
#[derive(Clone)]
pub struct AppState<S> {
  pub coordinator: Arc<CheckInCoordinator<S, S>>,
  pub store:       Arc<S>,
}

impl<S: Backend> AppState<S> {
  pub fn new(store: S, registry: SourceRegistry) -> Self {
    let coordinator = CheckInCoordinator::new(
      SourceResolver::new(registry),
      store.clone(),
      store.clone(),
    );
    Self { coordinator: Arc::new(coordinator), store: Arc::new(store) }
  }
}

// ─── Router ───────────────────────────────────────────────────────────────────

/// Build the axum [`Router`] for the check-in endpoints.
pub fn router<S: Backend>(state: AppState<S>) -> Router {
  Router::new()
    .route(
      "/events/{event_id}/check-in/toggle/{attendee_id}",
      post(handlers::toggle::handler::<S>),
    )
    .route("/events/{event_id}/check-in/search", get(handlers::search::handler::<S>))
    .route("/events/{event_id}/check-in/attendees", get(handlers::attendees::list::<S>))
    .route("/events/{event_id}/check-in/summary", get(handlers::attendees::summary::<S>))
    .layer(TraceLayer::new_for_http())
    .with_state(state)
}
