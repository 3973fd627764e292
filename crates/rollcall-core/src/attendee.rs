//! Attendee records and the read-side projection handed to callers.
//!
//! Records are never stored by this crate. They are materialised from a
//! backing store on every read and only change through a source's check-in
//! operations.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::identifier::{AttendeeId, SourceType};

// ─── External entities ───────────────────────────────────────────────────────

/// A content entity that may or may not be an event. Only its id and type
/// matter here; everything else belongs to the surrounding system.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event {
  pub event_id:     u64,
  pub title:        String,
  pub content_type: String,
}

impl Event {
  /// The content type that marks an entity as an event.
  pub const CONTENT_TYPE: &'static str = "event";

  pub fn is_event(&self) -> bool { self.content_type == Self::CONTENT_TYPE }
}

/// The user performing a check-in or undo.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Actor {
  pub user_id:      u64,
  pub display_name: String,
}

// ─── Check-in state ──────────────────────────────────────────────────────────

/// When, and by whom, an attendee was admitted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckInStamp {
  pub at: DateTime<Utc>,
  /// User id of the actor; `None` for legacy rows written before attribution.
  pub by: Option<u64>,
}

impl CheckInStamp {
  pub fn now(actor: &Actor) -> Self {
    Self { at: Utc::now(), by: Some(actor.user_id) }
  }
}

// ─── Record ──────────────────────────────────────────────────────────────────

/// The canonical, source-agnostic attendee.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttendeeRecord {
  pub identifier:   AttendeeId,
  pub event_id:     u64,
  /// Never empty.
  pub display_name: String,
  pub email:        Option<String>,
  /// `Some` exactly when the attendee is checked in.
  pub check_in:     Option<CheckInStamp>,
}

impl AttendeeRecord {
  pub fn is_checked_in(&self) -> bool { self.check_in.is_some() }

  pub fn checked_in_at(&self) -> Option<DateTime<Utc>> {
    self.check_in.map(|c| c.at)
  }

  pub fn checked_in_by(&self) -> Option<u64> {
    self.check_in.and_then(|c| c.by)
  }
}

// ─── View ────────────────────────────────────────────────────────────────────

/// Flat projection of an [`AttendeeRecord`], in the shape the check-in UI
/// consumes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AttendeeView {
  pub id:            u64,
  pub identifier:    AttendeeId,
  #[serde(rename = "type")]
  pub source_type:   SourceType,
  pub name:          String,
  pub email:         String,
  pub checked_in:    bool,
  /// Unix seconds.
  pub checked_in_at: Option<i64>,
  pub checked_in_by: Option<u64>,
}

impl AttendeeView {
  /// Case-insensitive substring match on name or email. `needle` must
  /// already be lowercased.
  pub fn matches(&self, needle: &str) -> bool {
    self.name.to_lowercase().contains(needle)
      || self.email.to_lowercase().contains(needle)
  }
}

impl From<&AttendeeRecord> for AttendeeView {
  fn from(record: &AttendeeRecord) -> Self {
    Self {
      id:            record.identifier.numeric_id(),
      identifier:    record.identifier,
      source_type:   record.identifier.source_type(),
      name:          record.display_name.clone(),
      email:         record.email.clone().unwrap_or_default(),
      checked_in:    record.is_checked_in(),
      checked_in_at: record.checked_in_at().map(|at| at.timestamp()),
      checked_in_by: record.checked_in_by(),
    }
  }
}
