//! [`RsvpAttendeeSource`] — attendees from free RSVP submissions.

use async_trait::async_trait;

use crate::{
  Error, Result,
  attendee::{Actor, AttendeeRecord, CheckInStamp, Event},
  identifier::{AttendeeId, SourceType},
  source::{AttendeeSource, into_record},
  store::RsvpStore,
};

/// Serves attendees for events that have received at least one RSVP.
#[derive(Debug, Clone)]
pub struct RsvpAttendeeSource<S> {
  store: S,
}

impl<S: RsvpStore> RsvpAttendeeSource<S> {
  pub const SOURCE_TYPE: SourceType = SourceType::Rsvp;

  pub fn new(store: S) -> Self { Self { store } }

  /// The submission id behind `identifier`, if this source owns it.
  fn owned(identifier: AttendeeId) -> Option<u64> {
    (identifier.source_type() == Self::SOURCE_TYPE)
      .then(|| identifier.numeric_id())
  }

  async fn write(
    &self,
    identifier: AttendeeId,
    stamp: Option<CheckInStamp>,
  ) -> Result<AttendeeRecord> {
    let submission_id =
      Self::owned(identifier).ok_or(Error::AttendeeNotFound(identifier))?;

    let row = self
      .store
      .set_check_in(submission_id, stamp)
      .await
      .map_err(Error::persistence)?
      .ok_or(Error::AttendeeNotFound(identifier))?;

    into_record(Self::SOURCE_TYPE, row)
  }
}

#[async_trait]
impl<S: RsvpStore> AttendeeSource for RsvpAttendeeSource<S> {
  fn source_type(&self) -> SourceType { Self::SOURCE_TYPE }

  async fn supports(&self, event: &Event) -> Result<bool> {
    self
      .store
      .has_submissions(event.event_id)
      .await
      .map_err(Error::persistence)
  }

  async fn load_by_event(&self, event: &Event) -> Result<Vec<AttendeeRecord>> {
    self
      .store
      .load_all_by_event(event.event_id)
      .await
      .map_err(Error::persistence)?
      .into_iter()
      .map(|row| into_record(Self::SOURCE_TYPE, row))
      .collect()
  }

  async fn load_by_identifier(
    &self,
    event: &Event,
    identifier: AttendeeId,
  ) -> Result<Option<AttendeeRecord>> {
    let Some(submission_id) = Self::owned(identifier) else {
      return Ok(None);
    };

    let row = self
      .store
      .load_by_id(submission_id)
      .await
      .map_err(Error::persistence)?;

    row
      .filter(|r| r.event_id == event.event_id)
      .map(|r| into_record(Self::SOURCE_TYPE, r))
      .transpose()
  }

  async fn check_in(
    &self,
    identifier: AttendeeId,
    actor: &Actor,
  ) -> Result<AttendeeRecord> {
    self.write(identifier, Some(CheckInStamp::now(actor))).await
  }

  async fn undo_check_in(
    &self,
    identifier: AttendeeId,
    _actor: &Actor,
  ) -> Result<AttendeeRecord> {
    self.write(identifier, None).await
  }

  async fn locate_event(&self, identifier: AttendeeId) -> Result<Option<u64>> {
    let Some(submission_id) = Self::owned(identifier) else {
      return Ok(None);
    };
    let row = self
      .store
      .load_by_id(submission_id)
      .await
      .map_err(Error::persistence)?;
    Ok(row.map(|r| r.event_id))
  }
}
