//! [`CompositeSource`] — several attendee sources presented as one.

use std::sync::Arc;

use crate::{
  Error, Result,
  attendee::{Actor, AttendeeRecord, Event},
  identifier::{AttendeeId, SourceType},
  source::AttendeeSource,
};

/// Aggregates the sources that support a given event.
///
/// Reads concatenate the contained sources in the order supplied. Point
/// lookups and writes are routed by the identifier's source type straight to
/// the owning source; other sources are never consulted.
#[derive(Clone, Default)]
pub struct CompositeSource {
  sources: Vec<Arc<dyn AttendeeSource>>,
}

impl CompositeSource {
  /// Sources must have distinct source types; [`crate::resolver::SourceRegistry`]
  /// guarantees this for everything it hands out.
  pub(crate) fn new(sources: Vec<Arc<dyn AttendeeSource>>) -> Self {
    Self { sources }
  }

  /// A composite over no sources: empty reads, every lookup misses.
  pub fn empty() -> Self { Self::default() }

  pub fn sources(&self) -> &[Arc<dyn AttendeeSource>] { &self.sources }

  pub fn is_empty(&self) -> bool { self.sources.is_empty() }

  fn owner(&self, source_type: SourceType) -> Option<&Arc<dyn AttendeeSource>> {
    self.sources.iter().find(|s| s.source_type() == source_type)
  }

  pub async fn load_by_event(&self, event: &Event) -> Result<Vec<AttendeeRecord>> {
    let mut records = Vec::new();
    for source in &self.sources {
      let source_type = source.source_type();
      for record in source.load_by_event(event).await? {
        // A source may only speak for its own namespace; anything else would
        // collide with another source's identifiers.
        if record.identifier.source_type() != source_type {
          tracing::warn!(
            event_id = event.event_id,
            identifier = %record.identifier,
            source = %source_type,
            "dropping attendee outside the source's namespace"
          );
          continue;
        }
        records.push(record);
      }
    }
    Ok(records)
  }

  pub async fn load_by_identifier(
    &self,
    event: &Event,
    identifier: AttendeeId,
  ) -> Result<Option<AttendeeRecord>> {
    match self.owner(identifier.source_type()) {
      Some(source) => source.load_by_identifier(event, identifier).await,
      None => Ok(None),
    }
  }

  pub async fn check_in(
    &self,
    identifier: AttendeeId,
    actor: &Actor,
  ) -> Result<AttendeeRecord> {
    self
      .owner(identifier.source_type())
      .ok_or(Error::AttendeeNotFound(identifier))?
      .check_in(identifier, actor)
      .await
  }

  pub async fn undo_check_in(
    &self,
    identifier: AttendeeId,
    actor: &Actor,
  ) -> Result<AttendeeRecord> {
    self
      .owner(identifier.source_type())
      .ok_or(Error::AttendeeNotFound(identifier))?
      .undo_check_in(identifier, actor)
      .await
  }
}

impl std::fmt::Debug for CompositeSource {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_list()
      .entries(self.sources.iter().map(|s| s.source_type()))
      .finish()
  }
}
