//! Encoding and decoding helpers between `rollcall-core` types and the plain
//! representations stored in SQLite columns.
//!
//! Timestamps are stored as RFC 3339 strings. Row ids are SQLite `INTEGER`s
//! (`i64`) and surface as `u64`.

use chrono::{DateTime, Utc};
use rollcall_core::{
  attendee::{Actor, CheckInStamp, Event},
  store::RegistrationRow,
};

use crate::{Error, Result};

// ─── Ids ─────────────────────────────────────────────────────────────────────

pub fn encode_id(id: u64) -> Result<i64> {
  i64::try_from(id).map_err(|_| Error::IdOutOfRange(id.to_string()))
}

pub fn decode_id(id: i64) -> Result<u64> {
  u64::try_from(id).map_err(|_| Error::IdOutOfRange(id.to_string()))
}

// ─── DateTime<Utc> ───────────────────────────────────────────────────────────

pub fn encode_dt(dt: DateTime<Utc>) -> String { dt.to_rfc3339() }

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(e.to_string()))
}

// ─── Order state ─────────────────────────────────────────────────────────────

/// Lifecycle of a ticket order. Attendees on canceled orders are invisible
/// to the ticket store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderState {
  Completed,
  Canceled,
}

pub fn encode_order_state(s: OrderState) -> &'static str {
  match s {
    OrderState::Completed => "completed",
    OrderState::Canceled => "canceled",
  }
}

pub fn decode_order_state(s: &str) -> Result<OrderState> {
  match s {
    "completed" => Ok(OrderState::Completed),
    "canceled" => Ok(OrderState::Canceled),
    other => Err(Error::UnknownOrderState(other.to_owned())),
  }
}

// ─── Row types ───────────────────────────────────────────────────────────────

/// Raw columns of an RSVP submission or ticket attendee, in the shared
/// column order `id, event, name, email, checked_in_at, checked_in_by`.
pub struct RawRegistration {
  pub numeric_id:    i64,
  pub event_id:      i64,
  pub display_name:  String,
  pub email:         Option<String>,
  pub checked_in_at: Option<String>,
  pub checked_in_by: Option<i64>,
}

impl RawRegistration {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      numeric_id:    row.get(0)?,
      event_id:      row.get(1)?,
      display_name:  row.get(2)?,
      email:         row.get(3)?,
      checked_in_at: row.get(4)?,
      checked_in_by: row.get(5)?,
    })
  }

  pub fn into_row(self) -> Result<RegistrationRow> {
    let check_in = self
      .checked_in_at
      .as_deref()
      .map(|at| -> Result<CheckInStamp> {
        Ok(CheckInStamp {
          at: decode_dt(at)?,
          by: self.checked_in_by.map(decode_id).transpose()?,
        })
      })
      .transpose()?;

    Ok(RegistrationRow {
      numeric_id: decode_id(self.numeric_id)?,
      event_id: decode_id(self.event_id)?,
      display_name: self.display_name,
      email: self.email,
      check_in,
    })
  }
}

/// Raw columns of an `events` row.
pub struct RawEvent {
  pub event_id:     i64,
  pub title:        String,
  pub content_type: String,
}

impl RawEvent {
  pub fn into_event(self) -> Result<Event> {
    Ok(Event {
      event_id:     decode_id(self.event_id)?,
      title:        self.title,
      content_type: self.content_type,
    })
  }
}

/// Raw `user_id, display_name` columns of a `users` row.
pub struct RawActor {
  pub user_id:      i64,
  pub display_name: String,
}

impl RawActor {
  pub fn into_actor(self) -> Result<Actor> {
    Ok(Actor { user_id: decode_id(self.user_id)?, display_name: self.display_name })
  }
}
