//! Error type for `rollcall-store-sqlite`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("database error: {0}")]
  Database(#[from] tokio_rusqlite::Error),

  #[error("date/time parse error: {0}")]
  DateParse(String),

  /// A row id that does not fit the range of the other side.
  #[error("id out of range: {0}")]
  IdOutOfRange(String),

  #[error("unknown order state: {0:?}")]
  UnknownOrderState(String),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
