//! SQL schema for the Rollcall SQLite store.
//!
//! Executed once at connection startup. Future migrations will be gated on
//! `PRAGMA user_version`.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;

CREATE TABLE IF NOT EXISTS events (
    event_id      INTEGER PRIMARY KEY AUTOINCREMENT,
    title         TEXT NOT NULL,
    content_type  TEXT NOT NULL DEFAULT 'event',   -- only 'event' rows are events
    created_at    TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS users (
    user_id       INTEGER PRIMARY KEY AUTOINCREMENT,
    username      TEXT NOT NULL UNIQUE,
    display_name  TEXT NOT NULL,
    password_hash TEXT NOT NULL,                   -- argon2 PHC string
    can_check_in  INTEGER NOT NULL DEFAULT 0,
    created_at    TEXT NOT NULL
);

-- Free RSVPs. The check-in pair is written only through a conditional UPDATE.
CREATE TABLE IF NOT EXISTS rsvp_submissions (
    submission_id INTEGER PRIMARY KEY AUTOINCREMENT,
    event_id      INTEGER NOT NULL REFERENCES events(event_id),
    name          TEXT NOT NULL DEFAULT '',
    email         TEXT,
    created_at    TEXT NOT NULL,
    checked_in_at TEXT,
    checked_in_by INTEGER REFERENCES users(user_id),
    CHECK (checked_in_by IS NULL OR checked_in_at IS NOT NULL)
);

CREATE TABLE IF NOT EXISTS ticket_products (
    product_id    INTEGER PRIMARY KEY AUTOINCREMENT,
    event_id      INTEGER NOT NULL REFERENCES events(event_id),
    title         TEXT NOT NULL,
    price_cents   INTEGER NOT NULL CHECK (price_cents >= 0)
);

CREATE TABLE IF NOT EXISTS ticket_orders (
    order_id      INTEGER PRIMARY KEY AUTOINCREMENT,
    email         TEXT,
    state         TEXT NOT NULL DEFAULT 'completed', -- 'completed' | 'canceled'
    created_at    TEXT NOT NULL
);

-- One row per admitted person on an order line. Linked to its event through
-- event_ref, not through the product.
CREATE TABLE IF NOT EXISTS ticket_attendees (
    attendee_id   INTEGER PRIMARY KEY AUTOINCREMENT,
    order_id      INTEGER NOT NULL REFERENCES ticket_orders(order_id),
    product_id    INTEGER REFERENCES ticket_products(product_id),
    event_ref     INTEGER NOT NULL REFERENCES events(event_id),
    first_name    TEXT,
    last_name     TEXT,
    email         TEXT,
    created_at    TEXT NOT NULL,
    checked_in_at TEXT,
    checked_in_by INTEGER REFERENCES users(user_id),
    CHECK (checked_in_by IS NULL OR checked_in_at IS NOT NULL)
);

CREATE INDEX IF NOT EXISTS rsvp_event_idx     ON rsvp_submissions(event_id);
CREATE INDEX IF NOT EXISTS products_event_idx ON ticket_products(event_id);
CREATE INDEX IF NOT EXISTS ticket_event_idx   ON ticket_attendees(event_ref);

PRAGMA user_version = 1;
";
