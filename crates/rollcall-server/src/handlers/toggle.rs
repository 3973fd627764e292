//! Handler for `POST /events/{event_id}/check-in/toggle/{attendee_id}`.

use axum::{
  Json,
  extract::{Path, Query, State},
  http::StatusCode,
  response::{IntoResponse, Response},
};
use rollcall_core::{AttendeeId, SourceType, coordinator::ToggleOutcome};
use serde::Deserialize;
use serde_json::json;

use crate::{AppState, Backend, auth::CheckInUser, error::Error};

#[derive(Debug, Deserialize)]
pub struct ToggleParams {
  /// `rsvp` or `ticket`.
  #[serde(rename = "type")]
  pub source_type: String,
}

/// Flip the attendee's check-in state.
///
/// `200 {"success": true, "checked_in": <bool>}` on success; a JSON error
/// with `"success": false` otherwise.
pub async fn handler<S: Backend>(
  State(state): State<AppState<S>>,
  CheckInUser(user_id): CheckInUser,
  Path((event_id, attendee_id)): Path<(u64, u64)>,
  Query(params): Query<ToggleParams>,
) -> Result<Response, Error> {
  let source_type = params
    .source_type
    .parse::<SourceType>()
    .map_err(|_| Error::BadRequest(format!("unknown attendee type {:?}", params.source_type)))?;

  let Ok(identifier) = AttendeeId::new(source_type, attendee_id) else {
    return Ok(failure(StatusCode::NOT_FOUND, "Attendee not found"));
  };

  let outcome = state
    .coordinator
    .toggle_in_event(event_id, identifier, user_id)
    .await;

  Ok(match outcome {
    ToggleOutcome::Toggled(checked_in) => {
      Json(json!({ "success": true, "checked_in": checked_in })).into_response()
    }
    ToggleOutcome::NotFound => failure(StatusCode::NOT_FOUND, "Attendee not found"),
    ToggleOutcome::EventMissing => failure(StatusCode::NOT_FOUND, "Event not found"),
    ToggleOutcome::ActorMissing => return Err(Error::Forbidden),
    ToggleOutcome::PersistError(_) => {
      failure(StatusCode::INTERNAL_SERVER_ERROR, "Check-in could not be saved")
    }
  })
}

fn failure(status: StatusCode, message: &str) -> Response {
  (status, Json(json!({ "success": false, "error": message }))).into_response()
}
