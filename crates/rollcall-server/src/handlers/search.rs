//! Handler for `GET /events/{event_id}/check-in/search`.

use axum::{
  Json,
  extract::{Path, Query, State},
};
use serde::Deserialize;

use crate::{AppState, Backend, auth::CheckInUser, error::Error, handlers::Results};

#[derive(Debug, Deserialize, Default)]
pub struct SearchParams {
  /// Matched case-insensitively against name and email.
  #[serde(default)]
  pub q: String,
}

/// `GET /events/{event_id}/check-in/search[?q=...]`
pub async fn handler<S: Backend>(
  State(state): State<AppState<S>>,
  _user: CheckInUser,
  Path(event_id): Path<u64>,
  Query(params): Query<SearchParams>,
) -> Result<Json<Results>, Error> {
  let results = state.coordinator.search_attendees(event_id, &params.q).await?;
  Ok(Json(Results { results }))
}
