//! [`SqliteStore`] — connection owner, fixture writes, and the directory
//! traits ([`EventDirectory`], [`ActorLookup`]).

use std::path::Path;

use chrono::Utc;
use rollcall_core::{
  attendee::{Actor, Event},
  store::{ActorLookup, EventDirectory},
};
use rusqlite::OptionalExtension as _;

use crate::{
  Result,
  encode::{
    OrderState, RawActor, RawEvent, decode_id, decode_order_state, encode_dt,
    encode_id, encode_order_state,
  },
  registrations::{SqliteRsvpStore, SqliteTicketStore},
  schema::SCHEMA,
};

// ─── Inputs and outputs ──────────────────────────────────────────────────────

/// Input to [`SqliteStore::add_ticket_attendee`].
#[derive(Debug, Clone)]
pub struct NewTicketAttendee {
  pub order_id:   u64,
  pub product_id: Option<u64>,
  /// The event this attendee is admitted to.
  pub event_ref:  u64,
  pub first_name: Option<String>,
  pub last_name:  Option<String>,
  pub email:      Option<String>,
}

/// What the HTTP layer needs to authenticate and authorise a user.
#[derive(Debug, Clone)]
pub struct UserCredentials {
  pub user_id:       u64,
  /// argon2 PHC string.
  pub password_hash: String,
  pub can_check_in:  bool,
}

// ─── Store ───────────────────────────────────────────────────────────────────

/// The Rollcall database backed by a single SQLite file.
///
/// Cloning is cheap — the inner connection is reference-counted.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store — useful for testing.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  /// The RSVP submissions table, sharing this store's connection.
  pub fn rsvps(&self) -> SqliteRsvpStore {
    SqliteRsvpStore { conn: self.conn.clone() }
  }

  /// The ticket attendees table, sharing this store's connection.
  pub fn tickets(&self) -> SqliteTicketStore {
    SqliteTicketStore { conn: self.conn.clone() }
  }

  /// Run a single `INSERT` and return the new row id.
  async fn insert(
    &self,
    sql: &'static str,
    params: Vec<Box<dyn rusqlite::ToSql + Send>>,
  ) -> Result<u64> {
    let rowid = self
      .conn
      .call(move |conn| {
        conn.execute(sql, rusqlite::params_from_iter(params.iter()))?;
        Ok(conn.last_insert_rowid())
      })
      .await?;
    decode_id(rowid)
  }

  // ── Fixtures ──────────────────────────────────────────────────────────────

  pub async fn add_event(&self, title: &str, content_type: &str) -> Result<Event> {
    let event_id = self
      .insert(
        "INSERT INTO events (title, content_type, created_at) VALUES (?1, ?2, ?3)",
        vec![
          Box::new(title.to_owned()),
          Box::new(content_type.to_owned()),
          Box::new(encode_dt(Utc::now())),
        ],
      )
      .await?;
    Ok(Event {
      event_id,
      title: title.to_owned(),
      content_type: content_type.to_owned(),
    })
  }

  pub async fn add_user(
    &self,
    username: &str,
    display_name: &str,
    password_hash: &str,
    can_check_in: bool,
  ) -> Result<Actor> {
    let user_id = self
      .insert(
        "INSERT INTO users (username, display_name, password_hash, can_check_in, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5)",
        vec![
          Box::new(username.to_owned()),
          Box::new(display_name.to_owned()),
          Box::new(password_hash.to_owned()),
          Box::new(can_check_in),
          Box::new(encode_dt(Utc::now())),
        ],
      )
      .await?;
    Ok(Actor { user_id, display_name: display_name.to_owned() })
  }

  /// Record an RSVP and return its submission id.
  pub async fn add_rsvp(
    &self,
    event_id: u64,
    name: &str,
    email: Option<&str>,
  ) -> Result<u64> {
    self
      .insert(
        "INSERT INTO rsvp_submissions (event_id, name, email, created_at)
         VALUES (?1, ?2, ?3, ?4)",
        vec![
          Box::new(encode_id(event_id)?),
          Box::new(name.to_owned()),
          Box::new(email.map(str::to_owned)),
          Box::new(encode_dt(Utc::now())),
        ],
      )
      .await
  }

  pub async fn add_ticket_product(
    &self,
    event_id: u64,
    title: &str,
    price_cents: u32,
  ) -> Result<u64> {
    self
      .insert(
        "INSERT INTO ticket_products (event_id, title, price_cents) VALUES (?1, ?2, ?3)",
        vec![
          Box::new(encode_id(event_id)?),
          Box::new(title.to_owned()),
          Box::new(price_cents),
        ],
      )
      .await
  }

  pub async fn add_order(&self, email: Option<&str>, state: OrderState) -> Result<u64> {
    self
      .insert(
        "INSERT INTO ticket_orders (email, state, created_at) VALUES (?1, ?2, ?3)",
        vec![
          Box::new(email.map(str::to_owned)),
          Box::new(encode_order_state(state)),
          Box::new(encode_dt(Utc::now())),
        ],
      )
      .await
  }

  pub async fn add_ticket_attendee(&self, input: NewTicketAttendee) -> Result<u64> {
    self
      .insert(
        "INSERT INTO ticket_attendees (
           order_id, product_id, event_ref, first_name, last_name, email, created_at
         ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        vec![
          Box::new(encode_id(input.order_id)?),
          Box::new(input.product_id.map(encode_id).transpose()?),
          Box::new(encode_id(input.event_ref)?),
          Box::new(input.first_name),
          Box::new(input.last_name),
          Box::new(input.email),
          Box::new(encode_dt(Utc::now())),
        ],
      )
      .await
  }

  pub async fn set_order_state(&self, order_id: u64, state: OrderState) -> Result<()> {
    let order_id = encode_id(order_id)?;
    let state = encode_order_state(state);
    self
      .conn
      .call(move |conn| {
        conn.execute(
          "UPDATE ticket_orders SET state = ?2 WHERE order_id = ?1",
          rusqlite::params![order_id, state],
        )?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  pub async fn order_state(&self, order_id: u64) -> Result<Option<OrderState>> {
    let order_id = encode_id(order_id)?;
    let state: Option<String> = self
      .conn
      .call(move |conn| {
        let state = conn
          .query_row(
            "SELECT state FROM ticket_orders WHERE order_id = ?1",
            rusqlite::params![order_id],
            |r| r.get(0),
          )
          .optional()?;
        Ok(state)
      })
      .await?;
    state.as_deref().map(decode_order_state).transpose()
  }

  // ── Users ─────────────────────────────────────────────────────────────────

  /// Look up a user by login name. Returns `None` if no such user exists.
  pub async fn load_credentials(&self, username: &str) -> Result<Option<UserCredentials>> {
    let username = username.to_owned();
    let raw: Option<(i64, String, bool)> = self
      .conn
      .call(move |conn| {
        let raw = conn
          .query_row(
            "SELECT user_id, password_hash, can_check_in FROM users WHERE username = ?1",
            rusqlite::params![username],
            |r| Ok((r.get(0)?, r.get(1)?, r.get(2)?)),
          )
          .optional()?;
        Ok(raw)
      })
      .await?;

    raw
      .map(|(user_id, password_hash, can_check_in)| {
        Ok(UserCredentials { user_id: decode_id(user_id)?, password_hash, can_check_in })
      })
      .transpose()
  }
}

// ─── Directory impls ─────────────────────────────────────────────────────────

impl EventDirectory for SqliteStore {
  type Error = crate::Error;

  async fn load_event(&self, event_id: u64) -> Result<Option<Event>> {
    let event_id = encode_id(event_id)?;
    let raw = self
      .conn
      .call(move |conn| {
        let raw = conn
          .query_row(
            "SELECT event_id, title, content_type FROM events WHERE event_id = ?1",
            rusqlite::params![event_id],
            |r| {
              Ok(RawEvent {
                event_id:     r.get(0)?,
                title:        r.get(1)?,
                content_type: r.get(2)?,
              })
            },
          )
          .optional()?;
        Ok(raw)
      })
      .await?;

    raw.map(RawEvent::into_event).transpose()
  }
}

impl ActorLookup for SqliteStore {
  type Error = crate::Error;

  async fn load_user(&self, user_id: u64) -> Result<Option<Actor>> {
    let user_id = encode_id(user_id)?;
    let raw = self
      .conn
      .call(move |conn| {
        let raw = conn
          .query_row(
            "SELECT user_id, display_name FROM users WHERE user_id = ?1",
            rusqlite::params![user_id],
            |r| Ok(RawActor { user_id: r.get(0)?, display_name: r.get(1)? }),
          )
          .optional()?;
        Ok(raw)
      })
      .await?;

    raw.map(RawActor::into_actor).transpose()
  }
}
