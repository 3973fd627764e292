//! [`SqliteRsvpStore`] and [`SqliteTicketStore`] — the two registration
//! tables behind the attendee sources.
//!
//! Both tables share a column shape, so every statement is built from a
//! [`Table`] description. Check-in writes are conditional `UPDATE`s followed
//! by a re-read on the same connection call, which makes each write a
//! compare-and-set against the current state.

use rollcall_core::{
  attendee::CheckInStamp,
  store::{RegistrationRow, RsvpStore, TicketStore},
};

use crate::{
  Result,
  encode::{RawRegistration, encode_dt, encode_id},
};

// ─── Table descriptions ──────────────────────────────────────────────────────

struct Table {
  name:    &'static str,
  key:     &'static str,
  event:   &'static str,
  /// Projection in [`RawRegistration`] column order.
  columns: &'static str,
  /// Extra row filter appended to every `WHERE`.
  filter:  &'static str,
}

static RSVP: Table = Table {
  name:    "rsvp_submissions",
  key:     "submission_id",
  event:   "event_id",
  columns: "submission_id, event_id, name, email, checked_in_at, checked_in_by",
  filter:  "",
};

static TICKET: Table = Table {
  name:    "ticket_attendees",
  key:     "attendee_id",
  event:   "event_ref",
  columns: "attendee_id, event_ref,
            TRIM(COALESCE(first_name, '') || ' ' || COALESCE(last_name, '')),
            email, checked_in_at, checked_in_by",
  filter:  "AND NOT EXISTS (
              SELECT 1 FROM ticket_orders o
              WHERE o.order_id = ticket_attendees.order_id AND o.state = 'canceled'
            )",
};

impl Table {
  fn select_by_id(&self) -> String {
    format!(
      "SELECT {} FROM {} WHERE {} = ?1 {}",
      self.columns, self.name, self.key, self.filter
    )
  }

  fn select_by_event(&self) -> String {
    format!(
      "SELECT {} FROM {} WHERE {} = ?1 {} ORDER BY created_at, {}",
      self.columns, self.name, self.event, self.filter, self.key
    )
  }

  fn check_in(&self) -> String {
    format!(
      "UPDATE {} SET checked_in_at = ?2, checked_in_by = ?3
       WHERE {} = ?1 AND checked_in_at IS NULL {}",
      self.name, self.key, self.filter
    )
  }

  fn undo_check_in(&self) -> String {
    format!(
      "UPDATE {} SET checked_in_at = NULL, checked_in_by = NULL
       WHERE {} = ?1 AND checked_in_at IS NOT NULL {}",
      self.name, self.key, self.filter
    )
  }
}

// ─── Shared queries ──────────────────────────────────────────────────────────

async fn load_by_id(
  conn: &tokio_rusqlite::Connection,
  table: &'static Table,
  id: u64,
) -> Result<Option<RegistrationRow>> {
  use rusqlite::OptionalExtension as _;

  let id = encode_id(id)?;
  let raw = conn
    .call(move |conn| {
      let raw = conn
        .query_row(&table.select_by_id(), rusqlite::params![id], |row| {
          RawRegistration::from_row(row)
        })
        .optional()?;
      Ok(raw)
    })
    .await?;

  raw.map(RawRegistration::into_row).transpose()
}

async fn load_all_by_event(
  conn: &tokio_rusqlite::Connection,
  table: &'static Table,
  event_id: u64,
) -> Result<Vec<RegistrationRow>> {
  let event_id = encode_id(event_id)?;
  let raws: Vec<RawRegistration> = conn
    .call(move |conn| {
      let mut stmt = conn.prepare(&table.select_by_event())?;
      let rows = stmt
        .query_map(rusqlite::params![event_id], |row| {
          RawRegistration::from_row(row)
        })?
        .collect::<rusqlite::Result<Vec<_>>>()?;
      Ok(rows)
    })
    .await?;

  raws.into_iter().map(RawRegistration::into_row).collect()
}

async fn set_check_in(
  conn: &tokio_rusqlite::Connection,
  table: &'static Table,
  id: u64,
  stamp: Option<CheckInStamp>,
) -> Result<Option<RegistrationRow>> {
  use rusqlite::OptionalExtension as _;

  let id = encode_id(id)?;
  let write = match stamp {
    Some(stamp) => {
      let by = stamp.by.map(encode_id).transpose()?;
      Some((encode_dt(stamp.at), by))
    }
    None => None,
  };

  let raw = conn
    .call(move |conn| {
      let tx = conn.transaction()?;
      match &write {
        Some((at, by)) => {
          tx.execute(&table.check_in(), rusqlite::params![id, at, by])?
        }
        None => tx.execute(&table.undo_check_in(), rusqlite::params![id])?,
      };
      let raw = tx
        .query_row(&table.select_by_id(), rusqlite::params![id], |row| {
          RawRegistration::from_row(row)
        })
        .optional()?;
      tx.commit()?;
      Ok(raw)
    })
    .await?;

  raw.map(RawRegistration::into_row).transpose()
}

async fn exists(
  conn: &tokio_rusqlite::Connection,
  sql: &'static str,
  event_id: u64,
) -> Result<bool> {
  let event_id = encode_id(event_id)?;
  let found = conn
    .call(move |conn| {
      let found: bool =
        conn.query_row(sql, rusqlite::params![event_id], |r| r.get(0))?;
      Ok(found)
    })
    .await?;
  Ok(found)
}

// ─── RSVP ────────────────────────────────────────────────────────────────────

/// The `rsvp_submissions` table. Cloning is cheap.
#[derive(Clone)]
pub struct SqliteRsvpStore {
  pub(crate) conn: tokio_rusqlite::Connection,
}

impl RsvpStore for SqliteRsvpStore {
  type Error = crate::Error;

  async fn load_by_id(&self, submission_id: u64) -> Result<Option<RegistrationRow>> {
    load_by_id(&self.conn, &RSVP, submission_id).await
  }

  async fn load_all_by_event(&self, event_id: u64) -> Result<Vec<RegistrationRow>> {
    load_all_by_event(&self.conn, &RSVP, event_id).await
  }

  async fn has_submissions(&self, event_id: u64) -> Result<bool> {
    exists(
      &self.conn,
      "SELECT EXISTS (SELECT 1 FROM rsvp_submissions WHERE event_id = ?1)",
      event_id,
    )
    .await
  }

  async fn set_check_in(
    &self,
    submission_id: u64,
    stamp: Option<CheckInStamp>,
  ) -> Result<Option<RegistrationRow>> {
    set_check_in(&self.conn, &RSVP, submission_id, stamp).await
  }
}

// ─── Tickets ─────────────────────────────────────────────────────────────────

/// The `ticket_attendees` table, minus attendees on canceled orders.
#[derive(Clone)]
pub struct SqliteTicketStore {
  pub(crate) conn: tokio_rusqlite::Connection,
}

impl TicketStore for SqliteTicketStore {
  type Error = crate::Error;

  async fn load_by_id(&self, attendee_id: u64) -> Result<Option<RegistrationRow>> {
    load_by_id(&self.conn, &TICKET, attendee_id).await
  }

  async fn load_all_by_event(&self, event_id: u64) -> Result<Vec<RegistrationRow>> {
    load_all_by_event(&self.conn, &TICKET, event_id).await
  }

  async fn sells_tickets(&self, event_id: u64) -> Result<bool> {
    exists(
      &self.conn,
      "SELECT EXISTS (SELECT 1 FROM ticket_products WHERE event_id = ?1)
           OR EXISTS (
             SELECT 1 FROM ticket_attendees a
             JOIN ticket_orders o ON o.order_id = a.order_id
             WHERE a.event_ref = ?1 AND o.state != 'canceled'
           )",
      event_id,
    )
    .await
  }

  async fn set_check_in(
    &self,
    attendee_id: u64,
    stamp: Option<CheckInStamp>,
  ) -> Result<Option<RegistrationRow>> {
    set_check_in(&self.conn, &TICKET, attendee_id, stamp).await
  }
}
