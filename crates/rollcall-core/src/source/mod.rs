//! The attendee source contract and its implementations.
//!
//! An [`AttendeeSource`] adapts one backing store of attendee-like records to
//! the canonical [`AttendeeRecord`]. Each source owns exactly one
//! [`SourceType`] and only ever mints identifiers with that prefix.

mod composite;
mod rsvp;
mod ticket;

pub use composite::CompositeSource;
pub use rsvp::RsvpAttendeeSource;
pub use ticket::TicketAttendeeSource;

use async_trait::async_trait;

use crate::{
  Result,
  attendee::{Actor, AttendeeRecord, Event},
  identifier::{AttendeeId, SourceType},
  store::RegistrationRow,
};

/// A capability-typed adapter over one backing store.
///
/// Object safe, so heterogeneous sources can live in one registry as
/// `Arc<dyn AttendeeSource>`.
#[async_trait]
pub trait AttendeeSource: Send + Sync {
  /// The identifier namespace this source owns.
  fn source_type(&self) -> SourceType;

  /// Whether this source has attendees for `event`. Read-only.
  async fn supports(&self, event: &Event) -> Result<bool>;

  /// All attendees for `event` in source order. Every call re-reads the
  /// store.
  async fn load_by_event(&self, event: &Event) -> Result<Vec<AttendeeRecord>>;

  /// Point lookup. Identifiers of another source type, unknown ids, and ids
  /// belonging to another event all yield `Ok(None)`.
  async fn load_by_identifier(
    &self,
    event: &Event,
    identifier: AttendeeId,
  ) -> Result<Option<AttendeeRecord>>;

  /// Mark the attendee as admitted. A no-op on an attendee that already is.
  async fn check_in(
    &self,
    identifier: AttendeeId,
    actor: &Actor,
  ) -> Result<AttendeeRecord>;

  /// Clear the attendee's check-in. A no-op on an attendee that is not
  /// checked in.
  async fn undo_check_in(
    &self,
    identifier: AttendeeId,
    actor: &Actor,
  ) -> Result<AttendeeRecord>;

  /// The event the identified attendee belongs to, if it exists.
  async fn locate_event(&self, identifier: AttendeeId) -> Result<Option<u64>>;
}

/// Convert a store row into a canonical record, filling in a display name
/// when the stored one is blank.
fn into_record(source_type: SourceType, row: RegistrationRow) -> Result<AttendeeRecord> {
  let identifier = AttendeeId::new(source_type, row.numeric_id)?;
  let email = row.email.filter(|e| !e.trim().is_empty());

  let display_name = match row.display_name.trim() {
    "" => email
      .clone()
      .unwrap_or_else(|| format!("Attendee {}", row.numeric_id)),
    name => name.to_owned(),
  };

  Ok(AttendeeRecord {
    identifier,
    event_id: row.event_id,
    display_name,
    email,
    check_in: row.check_in,
  })
}
