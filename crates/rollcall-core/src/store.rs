//! Collaborator traits for the stores this crate reads and writes through.
//!
//! The traits are implemented by storage backends (e.g.
//! `rollcall-store-sqlite`). Attendee sources and the coordinator depend on
//! these abstractions, never on a concrete backend.
//!
//! All methods return `Send` futures so implementors can be shared across a
//! multi-threaded async runtime (e.g. tokio with `axum`).

use std::future::Future;

use crate::attendee::{Actor, CheckInStamp, Event};

// ─── Rows ────────────────────────────────────────────────────────────────────

/// One attendee-like row as a registration store hands it out.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegistrationRow {
  pub numeric_id:   u64,
  pub event_id:     u64,
  /// As stored; may be empty for legacy rows.
  pub display_name: String,
  pub email:        Option<String>,
  pub check_in:     Option<CheckInStamp>,
}

// ─── Registration stores ─────────────────────────────────────────────────────

/// Free RSVP submissions, keyed by the event they were submitted against.
pub trait RsvpStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  /// Retrieve a submission by id. Returns `None` if not found.
  fn load_by_id(
    &self,
    submission_id: u64,
  ) -> impl Future<Output = Result<Option<RegistrationRow>, Self::Error>> + Send + '_;

  /// All submissions for an event, in creation order.
  fn load_all_by_event(
    &self,
    event_id: u64,
  ) -> impl Future<Output = Result<Vec<RegistrationRow>, Self::Error>> + Send + '_;

  /// Whether the event has at least one submission.
  fn has_submissions(
    &self,
    event_id: u64,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;

  /// Conditionally write the check-in state of a submission.
  ///
  /// `Some(stamp)` only touches a row that is not checked in; `None` only
  /// touches a row that is. Returns the row as it is after the write, or
  /// `None` if the submission does not exist.
  fn set_check_in(
    &self,
    submission_id: u64,
    stamp: Option<CheckInStamp>,
  ) -> impl Future<Output = Result<Option<RegistrationRow>, Self::Error>> + Send + '_;
}

/// Attendees attached to paid order line items, keyed by an event reference.
pub trait TicketStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  /// Retrieve a ticket attendee by id. Returns `None` if not found.
  fn load_by_id(
    &self,
    attendee_id: u64,
  ) -> impl Future<Output = Result<Option<RegistrationRow>, Self::Error>> + Send + '_;

  /// All ticket attendees referencing an event, in creation order.
  fn load_all_by_event(
    &self,
    event_id: u64,
  ) -> impl Future<Output = Result<Vec<RegistrationRow>, Self::Error>> + Send + '_;

  /// Whether the event has a ticket product on sale or a ticket attendee on
  /// a live order referencing it.
  fn sells_tickets(
    &self,
    event_id: u64,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;

  /// Conditionally write the check-in state of a ticket attendee; same
  /// contract as [`RsvpStore::set_check_in`].
  fn set_check_in(
    &self,
    attendee_id: u64,
    stamp: Option<CheckInStamp>,
  ) -> impl Future<Output = Result<Option<RegistrationRow>, Self::Error>> + Send + '_;
}

// ─── Directories ─────────────────────────────────────────────────────────────

/// Resolves event ids to content entities.
pub trait EventDirectory: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  /// Retrieve an entity by id. Returns `None` if not found; the entity may
  /// not be an event (see [`Event::is_event`]).
  fn load_event(
    &self,
    event_id: u64,
  ) -> impl Future<Output = Result<Option<Event>, Self::Error>> + Send + '_;
}

/// Resolves user ids to actors.
pub trait ActorLookup: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  fn load_user(
    &self,
    user_id: u64,
  ) -> impl Future<Output = Result<Option<Actor>, Self::Error>> + Send + '_;
}
