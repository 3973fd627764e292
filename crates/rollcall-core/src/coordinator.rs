//! [`CheckInCoordinator`] — the entry point for listing, searching and
//! toggling attendees.
//!
//! Callers are assumed to have authorised the request already. Each call
//! resolves the event's attendee repository afresh through the
//! [`SourceResolver`].

use serde::Serialize;

use crate::{
  Error, Result,
  attendee::{AttendeeView, Event},
  identifier::{AttendeeId, SourceType},
  resolver::SourceResolver,
  store::{ActorLookup, EventDirectory},
};

// ─── Outcomes ────────────────────────────────────────────────────────────────

/// The result of a toggle request, one variant per failure kind so the
/// transport layer can render each differently.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ToggleOutcome {
  /// The attendee's new checked-in state.
  Toggled(bool),
  /// No source owns the identifier, or it belongs to another event.
  NotFound,
  /// The owning event does not exist or is not an event.
  EventMissing,
  /// The acting user id does not resolve; nothing was written.
  ActorMissing,
  /// A backing store failed.
  PersistError(String),
}

impl ToggleOutcome {
  /// Collapse to the legacy boolean: `true` only when the attendee ended up
  /// checked in by this call.
  pub fn checked_in(&self) -> bool { matches!(self, Self::Toggled(true)) }
}

impl From<Error> for ToggleOutcome {
  fn from(err: Error) -> Self {
    match err {
      Error::MalformedIdentifier(_) | Error::AttendeeNotFound(_) => Self::NotFound,
      Error::EventNotFound(_) | Error::UnsupportedEvent(_) => Self::EventMissing,
      Error::ActorNotFound(_) => Self::ActorMissing,
      Error::Persistence(_) | Error::DuplicateSourceType(_) => {
        Self::PersistError(err.to_string())
      }
    }
  }
}

/// Attendance counters for an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CheckInSummary {
  pub total:      usize,
  pub checked_in: usize,
}

// ─── Coordinator ─────────────────────────────────────────────────────────────

pub struct CheckInCoordinator<E, A> {
  resolver: SourceResolver,
  events:   E,
  actors:   A,
}

impl<E, A> CheckInCoordinator<E, A>
where
  E: EventDirectory,
  A: ActorLookup,
{
  pub fn new(resolver: SourceResolver, events: E, actors: A) -> Self {
    Self { resolver, events, actors }
  }

  pub fn resolver(&self) -> &SourceResolver { &self.resolver }

  async fn load_event(&self, event_id: u64) -> Result<Event> {
    let event = self
      .events
      .load_event(event_id)
      .await
      .map_err(Error::persistence)?
      .ok_or(Error::EventNotFound(event_id))?;
    if !event.is_event() {
      return Err(Error::UnsupportedEvent(event_id));
    }
    Ok(event)
  }

  // ── Reads ─────────────────────────────────────────────────────────────────

  /// Every attendee of the event across all supporting sources.
  pub async fn list_attendees(&self, event_id: u64) -> Result<Vec<AttendeeView>> {
    let event = self.load_event(event_id).await?;
    let records = self.resolver.resolve(&event).await?.load_by_event(&event).await?;
    Ok(records.iter().map(AttendeeView::from).collect())
  }

  /// Attendees whose name or email contains `query`, ignoring case. A blank
  /// query returns everyone.
  pub async fn search_attendees(
    &self,
    event_id: u64,
    query: &str,
  ) -> Result<Vec<AttendeeView>> {
    let needle = query.trim().to_lowercase();
    let mut views = self.list_attendees(event_id).await?;
    if !needle.is_empty() {
      views.retain(|v| v.matches(&needle));
    }
    Ok(views)
  }

  pub async fn summarize(&self, event_id: u64) -> Result<CheckInSummary> {
    let views = self.list_attendees(event_id).await?;
    Ok(CheckInSummary {
      total:      views.len(),
      checked_in: views.iter().filter(|v| v.checked_in).count(),
    })
  }

  // ── Toggle ────────────────────────────────────────────────────────────────

  /// Flip the attendee's check-in state on behalf of `acting_user`.
  pub async fn toggle(&self, identifier: AttendeeId, acting_user: u64) -> ToggleOutcome {
    self.toggle_scoped(None, identifier, acting_user).await
  }

  /// As [`Self::toggle`], but an attendee of any other event than
  /// `event_id` is reported as [`ToggleOutcome::NotFound`].
  pub async fn toggle_in_event(
    &self,
    event_id: u64,
    identifier: AttendeeId,
    acting_user: u64,
  ) -> ToggleOutcome {
    self.toggle_scoped(Some(event_id), identifier, acting_user).await
  }

  /// Boolean form of [`Self::toggle`] for callers that only render a
  /// button state. Every failure reads as `false`.
  pub async fn toggle_check_in(
    &self,
    numeric_id: u64,
    source_type: SourceType,
    acting_user: u64,
  ) -> bool {
    match AttendeeId::new(source_type, numeric_id) {
      Ok(identifier) => self.toggle(identifier, acting_user).await.checked_in(),
      Err(e) => {
        tracing::warn!(
          operation = "toggle",
          source = %source_type,
          numeric_id,
          error = %e,
          "rejected check-in toggle"
        );
        false
      }
    }
  }

  async fn toggle_scoped(
    &self,
    scope: Option<u64>,
    identifier: AttendeeId,
    acting_user: u64,
  ) -> ToggleOutcome {
    match self.try_toggle(scope, identifier, acting_user).await {
      Ok(checked_in) => ToggleOutcome::Toggled(checked_in),
      Err(e) => {
        tracing::warn!(
          operation = "toggle",
          event_id = scope,
          identifier = %identifier,
          acting_user,
          error = %e,
          "check-in toggle failed"
        );
        ToggleOutcome::from(e)
      }
    }
  }

  async fn try_toggle(
    &self,
    scope: Option<u64>,
    identifier: AttendeeId,
    acting_user: u64,
  ) -> Result<bool> {
    // Only a type and a number come in, so find the owning event first.
    let source = self
      .resolver
      .registry()
      .source_for(identifier.source_type())
      .ok_or(Error::AttendeeNotFound(identifier))?;
    let event_id = source
      .locate_event(identifier)
      .await?
      .ok_or(Error::AttendeeNotFound(identifier))?;
    if scope.is_some_and(|expected| expected != event_id) {
      return Err(Error::AttendeeNotFound(identifier));
    }

    let event = self.load_event(event_id).await?;
    let repository = self.resolver.resolve(&event).await?;
    let record = repository
      .load_by_identifier(&event, identifier)
      .await?
      .ok_or(Error::AttendeeNotFound(identifier))?;

    let actor = self
      .actors
      .load_user(acting_user)
      .await
      .map_err(Error::persistence)?
      .ok_or(Error::ActorNotFound(acting_user))?;

    let updated = if record.is_checked_in() {
      repository.undo_check_in(identifier, &actor).await?
    } else {
      repository.check_in(identifier, &actor).await?
    };

    tracing::debug!(
      event_id,
      identifier = %identifier,
      acting_user,
      checked_in = updated.is_checked_in(),
      "check-in toggled"
    );
    Ok(updated.is_checked_in())
  }
}
