//! Behavioural tests for sources, resolution and the coordinator, driven by
//! in-memory stores.

use std::sync::{
  Arc, Mutex,
  atomic::{AtomicBool, AtomicUsize, Ordering},
};

use async_trait::async_trait;

use crate::{
  Error, Result,
  attendee::{Actor, AttendeeRecord, CheckInStamp, Event},
  coordinator::{CheckInCoordinator, ToggleOutcome},
  identifier::{AttendeeId, SourceType},
  resolver::{AttendeeRepository, SourceRegistry, SourceResolver},
  source::{AttendeeSource, RsvpAttendeeSource, TicketAttendeeSource},
  store::{ActorLookup, EventDirectory, RegistrationRow, RsvpStore, TicketStore},
};

// ─── Fakes ───────────────────────────────────────────────────────────────────

#[derive(Debug, thiserror::Error)]
#[error("store offline")]
struct Offline;

#[derive(Default)]
struct Inner {
  rows:        Mutex<Vec<RegistrationRow>>,
  /// Events with a ticket product on sale.
  products:    Mutex<Vec<u64>>,
  reads:       AtomicUsize,
  writes:      AtomicUsize,
  fail_writes: AtomicBool,
}

/// One table of registration rows; serves as either an RSVP or a ticket
/// store.
#[derive(Clone, Default)]
struct MemRegistrations(Arc<Inner>);

impl MemRegistrations {
  fn with_rows(rows: &[(u64, u64, &str, &str)]) -> Self {
    let store = Self::default();
    for &(numeric_id, event_id, name, email) in rows {
      store.insert(numeric_id, event_id, name, email);
    }
    store
  }

  fn insert(&self, numeric_id: u64, event_id: u64, name: &str, email: &str) {
    self.0.rows.lock().unwrap().push(RegistrationRow {
      numeric_id,
      event_id,
      display_name: name.into(),
      email: Some(email.into()),
      check_in: None,
    });
  }

  fn sell_tickets_for(&self, event_id: u64) {
    self.0.products.lock().unwrap().push(event_id);
  }

  fn reads(&self) -> usize { self.0.reads.load(Ordering::SeqCst) }

  fn writes(&self) -> usize { self.0.writes.load(Ordering::SeqCst) }

  fn fail_writes(&self) { self.0.fail_writes.store(true, Ordering::SeqCst); }

  fn find(&self, numeric_id: u64) -> Option<RegistrationRow> {
    self.0.reads.fetch_add(1, Ordering::SeqCst);
    let rows = self.0.rows.lock().unwrap();
    rows.iter().find(|r| r.numeric_id == numeric_id).cloned()
  }

  fn by_event(&self, event_id: u64) -> Vec<RegistrationRow> {
    self.0.reads.fetch_add(1, Ordering::SeqCst);
    let rows = self.0.rows.lock().unwrap();
    rows.iter().filter(|r| r.event_id == event_id).cloned().collect()
  }

  fn write(
    &self,
    numeric_id: u64,
    stamp: Option<CheckInStamp>,
  ) -> Result<Option<RegistrationRow>, Offline> {
    if self.0.fail_writes.load(Ordering::SeqCst) {
      return Err(Offline);
    }
    self.0.writes.fetch_add(1, Ordering::SeqCst);
    let mut rows = self.0.rows.lock().unwrap();
    let Some(row) = rows.iter_mut().find(|r| r.numeric_id == numeric_id) else {
      return Ok(None);
    };
    match stamp {
      Some(stamp) if row.check_in.is_none() => row.check_in = Some(stamp),
      Some(_) => {}
      None => row.check_in = None,
    }
    Ok(Some(row.clone()))
  }
}

impl RsvpStore for MemRegistrations {
  type Error = Offline;

  async fn load_by_id(&self, id: u64) -> Result<Option<RegistrationRow>, Offline> {
    Ok(self.find(id))
  }

  async fn load_all_by_event(&self, event_id: u64) -> Result<Vec<RegistrationRow>, Offline> {
    Ok(self.by_event(event_id))
  }

  async fn has_submissions(&self, event_id: u64) -> Result<bool, Offline> {
    Ok(!self.by_event(event_id).is_empty())
  }

  async fn set_check_in(
    &self,
    id: u64,
    stamp: Option<CheckInStamp>,
  ) -> Result<Option<RegistrationRow>, Offline> {
    self.write(id, stamp)
  }
}

impl TicketStore for MemRegistrations {
  type Error = Offline;

  async fn load_by_id(&self, id: u64) -> Result<Option<RegistrationRow>, Offline> {
    Ok(self.find(id))
  }

  async fn load_all_by_event(&self, event_id: u64) -> Result<Vec<RegistrationRow>, Offline> {
    Ok(self.by_event(event_id))
  }

  async fn sells_tickets(&self, event_id: u64) -> Result<bool, Offline> {
    Ok(self.0.products.lock().unwrap().contains(&event_id))
  }

  async fn set_check_in(
    &self,
    id: u64,
    stamp: Option<CheckInStamp>,
  ) -> Result<Option<RegistrationRow>, Offline> {
    self.write(id, stamp)
  }
}

#[derive(Clone, Default)]
struct MemDirectory {
  events: Vec<Event>,
  users:  Vec<Actor>,
}

impl EventDirectory for MemDirectory {
  type Error = Offline;

  async fn load_event(&self, event_id: u64) -> Result<Option<Event>, Offline> {
    Ok(self.events.iter().find(|e| e.event_id == event_id).cloned())
  }
}

impl ActorLookup for MemDirectory {
  type Error = Offline;

  async fn load_user(&self, user_id: u64) -> Result<Option<Actor>, Offline> {
    Ok(self.users.iter().find(|u| u.user_id == user_id).cloned())
  }
}

/// A source that only answers `supports`.
struct StubSource {
  source_type: SourceType,
  supports:    Option<bool>,
}

impl StubSource {
  fn arc(source_type: SourceType, supports: bool) -> Arc<dyn AttendeeSource> {
    Arc::new(Self { source_type, supports: Some(supports) })
  }

  fn failing(source_type: SourceType) -> Arc<dyn AttendeeSource> {
    Arc::new(Self { source_type, supports: None })
  }
}

#[async_trait]
impl AttendeeSource for StubSource {
  fn source_type(&self) -> SourceType { self.source_type }

  async fn supports(&self, _event: &Event) -> Result<bool> {
    self.supports.ok_or_else(|| Error::persistence(Offline))
  }

  async fn load_by_event(&self, _event: &Event) -> Result<Vec<AttendeeRecord>> {
    Ok(Vec::new())
  }

  async fn load_by_identifier(
    &self,
    _event: &Event,
    _identifier: AttendeeId,
  ) -> Result<Option<AttendeeRecord>> {
    Ok(None)
  }

  async fn check_in(&self, identifier: AttendeeId, _actor: &Actor) -> Result<AttendeeRecord> {
    Err(Error::AttendeeNotFound(identifier))
  }

  async fn undo_check_in(
    &self,
    identifier: AttendeeId,
    _actor: &Actor,
  ) -> Result<AttendeeRecord> {
    Err(Error::AttendeeNotFound(identifier))
  }

  async fn locate_event(&self, _identifier: AttendeeId) -> Result<Option<u64>> {
    Ok(None)
  }
}

// ─── Fixtures ────────────────────────────────────────────────────────────────

const E1: u64 = 1;
const E2: u64 = 2;
const PAGE: u64 = 3;
const USER: u64 = 1;

fn event(event_id: u64) -> Event {
  Event { event_id, title: format!("Event {event_id}"), content_type: "event".into() }
}

fn directory() -> MemDirectory {
  MemDirectory {
    events: vec![
      event(E1),
      event(E2),
      Event { event_id: PAGE, title: "About".into(), content_type: "page".into() },
    ],
    users:  vec![Actor { user_id: USER, display_name: "Door Staff".into() }],
  }
}

fn id(source_type: SourceType, n: u64) -> AttendeeId {
  AttendeeId::new(source_type, n).unwrap()
}

struct Harness {
  rsvps:       MemRegistrations,
  tickets:     MemRegistrations,
  coordinator: CheckInCoordinator<MemDirectory, MemDirectory>,
}

/// E1: `rsvp:7` Ada Lovelace and `ticket:3` Alan Turing.
/// E2: `rsvp:8` John Smith, `rsvp:9` Grace Hopper (RSVP only).
fn harness() -> Harness {
  let rsvps = MemRegistrations::with_rows(&[
    (7, E1, "Ada Lovelace", "ada@example.com"),
    (8, E2, "John Smith", "js@example.com"),
    (9, E2, "Grace Hopper", "grace@navy.example.mil"),
  ]);
  let tickets = MemRegistrations::with_rows(&[(3, E1, "Alan Turing", "alan@example.com")]);
  tickets.sell_tickets_for(E1);

  let registry = SourceRegistry::new()
    .with(Arc::new(RsvpAttendeeSource::new(rsvps.clone())))
    .unwrap()
    .with(Arc::new(TicketAttendeeSource::new(tickets.clone())))
    .unwrap();

  let coordinator =
    CheckInCoordinator::new(SourceResolver::new(registry), directory(), directory());
  Harness { rsvps, tickets, coordinator }
}

// ─── Registry and resolver ───────────────────────────────────────────────────

#[test]
fn registry_rejects_a_second_source_of_the_same_type() {
  let err = SourceRegistry::new()
    .with(StubSource::arc(SourceType::Rsvp, true))
    .unwrap()
    .with(StubSource::arc(SourceType::Rsvp, true))
    .unwrap_err();
  assert!(matches!(err, Error::DuplicateSourceType(SourceType::Rsvp)));
}

#[tokio::test]
async fn resolver_with_no_supporting_source_returns_empty_composite() {
  let registry = SourceRegistry::new()
    .with(StubSource::arc(SourceType::Rsvp, false))
    .unwrap()
    .with(StubSource::arc(SourceType::Ticket, false))
    .unwrap();
  let repo = SourceResolver::new(registry).resolve(&event(E1)).await.unwrap();

  let AttendeeRepository::Composite(composite) = &repo else {
    panic!("expected composite, got {repo:?}");
  };
  assert!(composite.is_empty());
  assert!(repo.load_by_event(&event(E1)).await.unwrap().is_empty());
}

#[tokio::test]
async fn resolver_with_one_supporting_source_returns_it_unwrapped() {
  let a = StubSource::arc(SourceType::Rsvp, true);
  let b = StubSource::arc(SourceType::Ticket, false);
  let registry = SourceRegistry::new().with(a.clone()).unwrap().with(b).unwrap();

  match SourceResolver::new(registry).resolve(&event(E1)).await.unwrap() {
    AttendeeRepository::Single(source) => assert!(Arc::ptr_eq(&source, &a)),
    other => panic!("expected single source, got {other:?}"),
  }
}

#[tokio::test]
async fn resolver_with_several_supporting_sources_keeps_registration_order() {
  let a = StubSource::arc(SourceType::Ticket, true);
  let b = StubSource::arc(SourceType::Rsvp, true);
  let registry = SourceRegistry::new().with(a.clone()).unwrap().with(b.clone()).unwrap();

  let AttendeeRepository::Composite(composite) =
    SourceResolver::new(registry).resolve(&event(E1)).await.unwrap()
  else {
    panic!("expected composite");
  };
  let sources = composite.sources();
  assert_eq!(sources.len(), 2);
  assert!(Arc::ptr_eq(&sources[0], &a));
  assert!(Arc::ptr_eq(&sources[1], &b));
}

#[tokio::test]
async fn resolver_fails_when_a_support_check_fails() {
  let registry = SourceRegistry::new()
    .with(StubSource::failing(SourceType::Rsvp))
    .unwrap()
    .with(StubSource::arc(SourceType::Ticket, true))
    .unwrap();

  let result = SourceResolver::new(registry).resolve(&event(E1)).await;
  assert!(matches!(result, Err(Error::Persistence(_))));
}

#[tokio::test]
async fn resolution_is_not_cached_between_calls() {
  let h = harness();
  let resolver = h.coordinator.resolver();

  assert!(matches!(
    resolver.resolve(&event(E2)).await.unwrap(),
    AttendeeRepository::Single(_)
  ));
  h.tickets.sell_tickets_for(E2);
  assert!(matches!(
    resolver.resolve(&event(E2)).await.unwrap(),
    AttendeeRepository::Composite(_)
  ));
}

// ─── Composite ───────────────────────────────────────────────────────────────

#[tokio::test]
async fn composite_routes_lookups_to_the_owning_source_only() {
  let h = harness();
  let repo = h.coordinator.resolver().resolve(&event(E1)).await.unwrap();
  assert!(matches!(repo, AttendeeRepository::Composite(_)));

  h.tickets.insert(42, E1, "Kurt Gödel", "kurt@example.com");
  let rsvp_reads = h.rsvps.reads();

  let found = repo.load_by_identifier(&event(E1), id(SourceType::Ticket, 42)).await.unwrap();
  assert_eq!(found.unwrap().display_name, "Kurt Gödel");
  assert_eq!(h.rsvps.reads(), rsvp_reads, "rsvp store must not be touched");
}

#[tokio::test]
async fn composite_concatenates_sources_in_order() {
  let h = harness();
  let repo = h.coordinator.resolver().resolve(&event(E1)).await.unwrap();
  let ids: Vec<String> = repo
    .load_by_event(&event(E1))
    .await
    .unwrap()
    .iter()
    .map(|r| r.identifier.to_string())
    .collect();
  assert_eq!(ids, ["rsvp:7", "ticket:3"]);
}

#[tokio::test]
async fn empty_composite_fails_writes_without_touching_state() {
  let registry = SourceRegistry::new().with(StubSource::arc(SourceType::Rsvp, false)).unwrap();
  let repo = SourceResolver::new(registry).resolve(&event(E1)).await.unwrap();
  let actor = Actor { user_id: USER, display_name: "Door Staff".into() };

  let missing = id(SourceType::Rsvp, 7);
  assert!(repo.load_by_identifier(&event(E1), missing).await.unwrap().is_none());
  assert!(matches!(
    repo.check_in(missing, &actor).await,
    Err(Error::AttendeeNotFound(_))
  ));
  assert!(matches!(
    repo.undo_check_in(missing, &actor).await,
    Err(Error::AttendeeNotFound(_))
  ));
}

// ─── Sources ─────────────────────────────────────────────────────────────────

#[tokio::test]
async fn source_ignores_foreign_and_cross_event_identifiers() {
  let h = harness();
  let source = RsvpAttendeeSource::new(h.rsvps.clone());

  let foreign = source.load_by_identifier(&event(E1), id(SourceType::Ticket, 7)).await;
  assert!(foreign.unwrap().is_none());

  let other_event = source.load_by_identifier(&event(E2), id(SourceType::Rsvp, 7)).await;
  assert!(other_event.unwrap().is_none());
}

#[tokio::test]
async fn check_in_is_idempotent() {
  let h = harness();
  let source = TicketAttendeeSource::new(h.tickets.clone());
  let actor = Actor { user_id: USER, display_name: "Door Staff".into() };
  let alan = id(SourceType::Ticket, 3);

  let first = source.check_in(alan, &actor).await.unwrap();
  let second = source.check_in(alan, &actor).await.unwrap();
  assert!(first.is_checked_in());
  assert_eq!(first.checked_in_at(), second.checked_in_at());

  let undone = source.undo_check_in(alan, &actor).await.unwrap();
  let again = source.undo_check_in(alan, &actor).await.unwrap();
  assert!(!undone.is_checked_in());
  assert!(!again.is_checked_in());
}

// ─── Coordinator: toggle ─────────────────────────────────────────────────────

#[tokio::test]
async fn toggle_alternates_and_tracks_timestamp() {
  let h = harness();
  let ada = id(SourceType::Rsvp, 7);

  assert_eq!(h.coordinator.toggle(ada, USER).await, ToggleOutcome::Toggled(true));
  let view = h.coordinator.list_attendees(E1).await.unwrap().remove(0);
  assert!(view.checked_in);
  assert!(view.checked_in_at.is_some());
  assert_eq!(view.checked_in_by, Some(USER));

  assert_eq!(h.coordinator.toggle(ada, USER).await, ToggleOutcome::Toggled(false));
  let view = h.coordinator.list_attendees(E1).await.unwrap().remove(0);
  assert!(!view.checked_in);
  assert_eq!(view.checked_in_at, None);
  assert_eq!(view.checked_in_by, None);

  assert_eq!(h.coordinator.toggle(ada, USER).await, ToggleOutcome::Toggled(true));
}

#[tokio::test]
async fn toggle_with_unknown_actor_changes_nothing() {
  let h = harness();
  let outcome = h.coordinator.toggle(id(SourceType::Rsvp, 7), 999).await;
  assert_eq!(outcome, ToggleOutcome::ActorMissing);
  assert_eq!(h.rsvps.writes(), 0);
  assert!(!h.coordinator.toggle_check_in(7, SourceType::Rsvp, 999).await);
}

#[tokio::test]
async fn toggle_of_unknown_attendee_is_not_found() {
  let h = harness();
  assert_eq!(
    h.coordinator.toggle(id(SourceType::Ticket, 404), USER).await,
    ToggleOutcome::NotFound
  );
  assert!(!h.coordinator.toggle_check_in(0, SourceType::Ticket, USER).await);
}

#[tokio::test]
async fn toggle_scoped_to_another_event_is_not_found() {
  let h = harness();
  let outcome = h.coordinator.toggle_in_event(E2, id(SourceType::Rsvp, 7), USER).await;
  assert_eq!(outcome, ToggleOutcome::NotFound);
  assert_eq!(h.rsvps.writes(), 0);

  let outcome = h.coordinator.toggle_in_event(E1, id(SourceType::Rsvp, 7), USER).await;
  assert_eq!(outcome, ToggleOutcome::Toggled(true));
}

#[tokio::test]
async fn toggle_for_attendee_of_a_non_event_is_event_missing() {
  let h = harness();
  h.rsvps.insert(50, PAGE, "Lost Visitor", "lost@example.com");
  h.rsvps.insert(51, 77, "Orphan", "orphan@example.com");

  assert_eq!(
    h.coordinator.toggle(id(SourceType::Rsvp, 50), USER).await,
    ToggleOutcome::EventMissing
  );
  assert_eq!(
    h.coordinator.toggle(id(SourceType::Rsvp, 51), USER).await,
    ToggleOutcome::EventMissing
  );
}

#[tokio::test]
async fn toggle_reports_persistence_failures() {
  let h = harness();
  h.tickets.fail_writes();

  let outcome = h.coordinator.toggle(id(SourceType::Ticket, 3), USER).await;
  assert!(matches!(outcome, ToggleOutcome::PersistError(_)));
  assert!(!h.coordinator.toggle_check_in(3, SourceType::Ticket, USER).await);
}

#[tokio::test]
async fn toggle_when_source_is_not_registered_is_not_found() {
  let rsvps = MemRegistrations::with_rows(&[(7, E1, "Ada Lovelace", "ada@example.com")]);
  let registry =
    SourceRegistry::new().with(Arc::new(RsvpAttendeeSource::new(rsvps))).unwrap();
  let coordinator =
    CheckInCoordinator::new(SourceResolver::new(registry), directory(), directory());

  assert_eq!(
    coordinator.toggle(id(SourceType::Ticket, 3), USER).await,
    ToggleOutcome::NotFound
  );
}

// ─── Coordinator: reads ──────────────────────────────────────────────────────

#[tokio::test]
async fn search_is_case_insensitive_and_blank_returns_all() {
  let h = harness();

  assert_eq!(h.coordinator.search_attendees(E2, "").await.unwrap().len(), 2);
  assert_eq!(h.coordinator.search_attendees(E2, "   ").await.unwrap().len(), 2);

  let john = h.coordinator.search_attendees(E2, "JOHN").await.unwrap();
  assert_eq!(john.len(), 1);
  assert_eq!(john[0].name, "John Smith");

  let by_email = h.coordinator.search_attendees(E2, " Navy.Example ").await.unwrap();
  assert_eq!(by_email.len(), 1);
  assert_eq!(by_email[0].name, "Grace Hopper");

  assert!(h.coordinator.search_attendees(E2, "zzz").await.unwrap().is_empty());
}

#[tokio::test]
async fn listing_a_missing_or_non_event_fails() {
  let h = harness();
  assert!(matches!(
    h.coordinator.list_attendees(404).await,
    Err(Error::EventNotFound(404))
  ));
  assert!(matches!(
    h.coordinator.list_attendees(PAGE).await,
    Err(Error::UnsupportedEvent(PAGE))
  ));
}

#[tokio::test]
async fn unavailable_source_fails_reads_and_toggles() {
  let tickets = MemRegistrations::with_rows(&[(3, E1, "Alan Turing", "alan@example.com")]);
  tickets.sell_tickets_for(E1);
  let registry = SourceRegistry::new()
    .with(StubSource::failing(SourceType::Rsvp))
    .unwrap()
    .with(Arc::new(TicketAttendeeSource::new(tickets.clone())))
    .unwrap();
  let coordinator =
    CheckInCoordinator::new(SourceResolver::new(registry), directory(), directory());

  assert!(matches!(coordinator.list_attendees(E1).await, Err(Error::Persistence(_))));
  assert!(matches!(
    coordinator.search_attendees(E1, "alan").await,
    Err(Error::Persistence(_))
  ));
  assert!(matches!(
    coordinator.toggle(id(SourceType::Ticket, 3), USER).await,
    ToggleOutcome::PersistError(_)
  ));
  assert_eq!(tickets.writes(), 0);
}

#[tokio::test]
async fn summary_counts_checked_in_attendees() {
  let h = harness();
  h.coordinator.toggle(id(SourceType::Ticket, 3), USER).await;

  let summary = h.coordinator.summarize(E1).await.unwrap();
  assert_eq!(summary.total, 2);
  assert_eq!(summary.checked_in, 1);
}

#[tokio::test]
async fn end_to_end_mixed_sources() {
  let h = harness();

  let views = h.coordinator.list_attendees(E1).await.unwrap();
  let ids: Vec<String> = views.iter().map(|v| v.identifier.to_string()).collect();
  assert_eq!(ids, ["rsvp:7", "ticket:3"]);
  assert!(views.iter().all(|v| !v.checked_in));

  assert!(h.coordinator.toggle_check_in(7, SourceType::Rsvp, USER).await);

  let views = h.coordinator.list_attendees(E1).await.unwrap();
  let ada = views.iter().find(|v| v.identifier.to_string() == "rsvp:7").unwrap();
  let alan = views.iter().find(|v| v.identifier.to_string() == "ticket:3").unwrap();
  assert!(ada.checked_in);
  assert!(ada.checked_in_at.is_some());
  assert!(!alan.checked_in);
  assert_eq!(alan.checked_in_at, None);

  let json = serde_json::to_value(ada).unwrap();
  assert_eq!(json["identifier"], "rsvp:7");
  assert_eq!(json["type"], "rsvp");
  assert_eq!(json["id"], 7);
  assert_eq!(json["name"], "Ada Lovelace");
}
