//! Source registration and per-event resolution.
//!
//! The set of attendee sources is assembled explicitly at startup into a
//! [`SourceRegistry`]. For each request the [`SourceResolver`] asks every
//! registered source whether it supports the event and hands back an
//! [`AttendeeRepository`] over the ones that do. Nothing is cached between
//! calls.

use std::sync::Arc;

use crate::{
  Error, Result,
  attendee::{Actor, AttendeeRecord, Event},
  identifier::{AttendeeId, SourceType},
  source::{AttendeeSource, CompositeSource},
};

// ─── Registry ────────────────────────────────────────────────────────────────

/// The ordered set of attendee sources known to the process.
///
/// At most one source per [`SourceType`]; since sources only mint identifiers
/// in their own namespace, no two registered sources can claim the same
/// attendee.
#[derive(Clone, Default)]
pub struct SourceRegistry {
  sources: Vec<Arc<dyn AttendeeSource>>,
}

impl SourceRegistry {
  pub fn new() -> Self { Self::default() }

  /// Append `source`. Fails with [`Error::DuplicateSourceType`] if a source
  /// of the same type is already registered.
  pub fn register(&mut self, source: Arc<dyn AttendeeSource>) -> Result<()> {
    let source_type = source.source_type();
    if self.source_for(source_type).is_some() {
      return Err(Error::DuplicateSourceType(source_type));
    }
    self.sources.push(source);
    Ok(())
  }

  /// Builder form of [`Self::register`].
  pub fn with(mut self, source: Arc<dyn AttendeeSource>) -> Result<Self> {
    self.register(source)?;
    Ok(self)
  }

  /// The registered source owning `source_type`, if any.
  pub fn source_for(&self, source_type: SourceType) -> Option<&Arc<dyn AttendeeSource>> {
    self.sources.iter().find(|s| s.source_type() == source_type)
  }

  /// Sources in registration order.
  pub fn sources(&self) -> &[Arc<dyn AttendeeSource>] { &self.sources }
}

impl std::fmt::Debug for SourceRegistry {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_list()
      .entries(self.sources.iter().map(|s| s.source_type()))
      .finish()
  }
}

// ─── Repository ──────────────────────────────────────────────────────────────

/// What the resolver hands back: the one supporting source itself, or a
/// composite over zero or several.
#[derive(Clone)]
pub enum AttendeeRepository {
  Single(Arc<dyn AttendeeSource>),
  Composite(CompositeSource),
}

impl AttendeeRepository {
  pub async fn load_by_event(&self, event: &Event) -> Result<Vec<AttendeeRecord>> {
    match self {
      Self::Single(source) => source.load_by_event(event).await,
      Self::Composite(composite) => composite.load_by_event(event).await,
    }
  }

  pub async fn load_by_identifier(
    &self,
    event: &Event,
    identifier: AttendeeId,
  ) -> Result<Option<AttendeeRecord>> {
    match self {
      Self::Single(source) => source.load_by_identifier(event, identifier).await,
      Self::Composite(composite) => {
        composite.load_by_identifier(event, identifier).await
      }
    }
  }

  pub async fn check_in(
    &self,
    identifier: AttendeeId,
    actor: &Actor,
  ) -> Result<AttendeeRecord> {
    match self {
      Self::Single(source) => source.check_in(identifier, actor).await,
      Self::Composite(composite) => composite.check_in(identifier, actor).await,
    }
  }

  pub async fn undo_check_in(
    &self,
    identifier: AttendeeId,
    actor: &Actor,
  ) -> Result<AttendeeRecord> {
    match self {
      Self::Single(source) => source.undo_check_in(identifier, actor).await,
      Self::Composite(composite) => {
        composite.undo_check_in(identifier, actor).await
      }
    }
  }
}

impl std::fmt::Debug for AttendeeRepository {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    match self {
      Self::Single(source) => {
        f.debug_tuple("Single").field(&source.source_type()).finish()
      }
      Self::Composite(composite) => {
        f.debug_tuple("Composite").field(composite).finish()
      }
    }
  }
}

// ─── Resolver ────────────────────────────────────────────────────────────────

#[derive(Clone, Default)]
pub struct SourceResolver {
  registry: SourceRegistry,
}

impl SourceResolver {
  pub fn new(registry: SourceRegistry) -> Self { Self { registry } }

  pub fn registry(&self) -> &SourceRegistry { &self.registry }

  /// Pick the sources that apply to `event`.
  ///
  /// - none → an empty composite
  /// - exactly one → that source, unwrapped
  /// - several → a composite in registration order
  ///
  /// A failing support check fails the whole resolution, so a partial
  /// attendee list is never presented as complete.
  pub async fn resolve(&self, event: &Event) -> Result<AttendeeRepository> {
    let mut matching = Vec::new();
    for source in self.registry.sources() {
      let supported = source.supports(event).await.inspect_err(|e| {
        tracing::warn!(
          event_id = event.event_id,
          source = %source.source_type(),
          error = %e,
          "attendee source support check failed"
        )
      })?;
      if supported {
        matching.push(Arc::clone(source));
      }
    }

    if let [only] = matching.as_slice() {
      return Ok(AttendeeRepository::Single(Arc::clone(only)));
    }
    Ok(AttendeeRepository::Composite(CompositeSource::new(matching)))
  }
}
