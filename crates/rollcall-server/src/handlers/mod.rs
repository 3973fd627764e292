//! Handlers for the `/events/{event_id}/check-in` endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `POST` | `/events/{event_id}/check-in/toggle/{attendee_id}` | `?type=rsvp\|ticket`; flips check-in state |
//! | `GET`  | `/events/{event_id}/check-in/search` | `?q=`; blank returns everyone |
//! | `GET`  | `/events/{event_id}/check-in/attendees` | Full attendee list |
//! | `GET`  | `/events/{event_id}/check-in/summary` | Total and checked-in counts |

pub mod attendees;
pub mod search;
pub mod toggle;

use rollcall_core::attendee::AttendeeView;
use serde::Serialize;

/// `{"results": [...]}` envelope shared by the list endpoints.
#[derive(Debug, Serialize)]
pub struct Results {
  pub results: Vec<AttendeeView>,
}
