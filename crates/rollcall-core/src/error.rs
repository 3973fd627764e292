//! Error types for `rollcall-core`.

use thiserror::Error;

use crate::identifier::{AttendeeId, SourceType};

#[derive(Debug, Error)]
pub enum Error {
  #[error("malformed attendee identifier: {0:?}")]
  MalformedIdentifier(String),

  #[error("attendee not found: {0}")]
  AttendeeNotFound(AttendeeId),

  #[error("actor not found: {0}")]
  ActorNotFound(u64),

  #[error("event not found: {0}")]
  EventNotFound(u64),

  #[error("entity {0} is not an event")]
  UnsupportedEvent(u64),

  #[error("an attendee source of type {0} is already registered")]
  DuplicateSourceType(SourceType),

  #[error("persistence failure: {0}")]
  Persistence(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl Error {
  /// Wrap a backing-store error.
  pub fn persistence<E>(err: E) -> Self
  where
    E: std::error::Error + Send + Sync + 'static,
  {
    Self::Persistence(Box::new(err))
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
