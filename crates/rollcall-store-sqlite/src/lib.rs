//! SQLite backend for Rollcall.
//!
//! Wraps [`tokio_rusqlite`] so all database access runs on a dedicated thread
//! without blocking the async runtime. One database holds events, users, RSVP
//! submissions and ticket orders; [`SqliteStore`] hands out per-table views
//! implementing the `rollcall-core` store traits.

mod encode;
mod registrations;
mod schema;
mod store;

pub mod error;

pub use encode::OrderState;
pub use error::{Error, Result};
pub use registrations::{SqliteRsvpStore, SqliteTicketStore};
pub use store::{NewTicketAttendee, SqliteStore, UserCredentials};
