//! Handlers for the attendee list and attendance summary.

use axum::{
  Json,
  extract::{Path, State},
};
use rollcall_core::coordinator::CheckInSummary;

use crate::{AppState, Backend, auth::CheckInUser, error::Error, handlers::Results};

/// `GET /events/{event_id}/check-in/attendees`
pub async fn list<S: Backend>(
  State(state): State<AppState<S>>,
  _user: CheckInUser,
  Path(event_id): Path<u64>,
) -> Result<Json<Results>, Error> {
  let results = state.coordinator.list_attendees(event_id).await?;
  Ok(Json(Results { results }))
}

/// `GET /events/{event_id}/check-in/summary` — `{"total": n, "checked_in": m}`
pub async fn summary<S: Backend>(
  State(state): State<AppState<S>>,
  _user: CheckInUser,
  Path(event_id): Path<u64>,
) -> Result<Json<CheckInSummary>, Error> {
  Ok(Json(state.coordinator.summarize(event_id).await?))
}
