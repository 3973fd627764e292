//! Typed attendee identifiers.
//!
//! Every attendee is addressed as `"<source-type>:<numeric-id>"`. The prefix
//! names the source that owns the record; the set of prefixes is closed and
//! only grows with a new [`SourceType`] variant.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize, Serializer};

use crate::{Error, Result};

// ─── Source type ─────────────────────────────────────────────────────────────

/// The backing store an attendee record comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceType {
  /// Free RSVP submissions.
  Rsvp,
  /// Attendees attached to paid order line items.
  Ticket,
}

impl SourceType {
  /// The identifier prefix; must match the serde tags above.
  pub fn as_str(self) -> &'static str {
    match self {
      Self::Rsvp => "rsvp",
      Self::Ticket => "ticket",
    }
  }
}

impl fmt::Display for SourceType {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

impl FromStr for SourceType {
  type Err = Error;

  fn from_str(s: &str) -> Result<Self> {
    match s {
      "rsvp" => Ok(Self::Rsvp),
      "ticket" => Ok(Self::Ticket),
      other => Err(Error::MalformedIdentifier(other.to_owned())),
    }
  }
}

// ─── Identifier ──────────────────────────────────────────────────────────────

/// A namespaced attendee key. The numeric part is always at least 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AttendeeId {
  source_type: SourceType,
  numeric_id:  u64,
}

impl AttendeeId {
  pub fn new(source_type: SourceType, numeric_id: u64) -> Result<Self> {
    if numeric_id == 0 {
      return Err(Error::MalformedIdentifier(encode(source_type, 0)));
    }
    Ok(Self { source_type, numeric_id })
  }

  pub fn source_type(&self) -> SourceType { self.source_type }

  pub fn numeric_id(&self) -> u64 { self.numeric_id }

  pub fn encode(&self) -> String { encode(self.source_type, self.numeric_id) }

  pub fn decode(s: &str) -> Result<Self> {
    let (source_type, numeric_id) = decode(s)?;
    Ok(Self { source_type, numeric_id })
  }
}

impl fmt::Display for AttendeeId {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}:{}", self.source_type, self.numeric_id)
  }
}

impl FromStr for AttendeeId {
  type Err = Error;

  fn from_str(s: &str) -> Result<Self> { Self::decode(s) }
}

impl Serialize for AttendeeId {
  fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.collect_str(self)
  }
}

// ─── Codec ───────────────────────────────────────────────────────────────────

/// Produce `"<source_type>:<numeric_id>"`.
pub fn encode(source_type: SourceType, numeric_id: u64) -> String {
  format!("{source_type}:{numeric_id}")
}

/// Split an encoded identifier back into its parts.
///
/// Fails with [`Error::MalformedIdentifier`] when the prefix is unknown or the
/// suffix is not a positive decimal integer (signs are not accepted).
pub fn decode(s: &str) -> Result<(SourceType, u64)> {
  let malformed = || Error::MalformedIdentifier(s.to_owned());

  let (prefix, suffix) = s.split_once(':').ok_or_else(malformed)?;
  let source_type = prefix.parse::<SourceType>().map_err(|_| malformed())?;

  if suffix.is_empty() || !suffix.bytes().all(|b| b.is_ascii_digit()) {
    return Err(malformed());
  }
  let numeric_id = suffix.parse::<u64>().map_err(|_| malformed())?;
  if numeric_id == 0 {
    return Err(malformed());
  }

  Ok((source_type, numeric_id))
}
