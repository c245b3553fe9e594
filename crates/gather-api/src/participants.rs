//! Handlers for `/participants` endpoints — profile scope only; account
//! creation and authentication belong to the identity subsystem.

use axum::{
  Json,
  extract::{Path, State},
  http::StatusCode,
  response::IntoResponse,
};

use gather_core::{
  participant::{NewParticipant, Participant, ParticipantPatch},
  store::{EnrollmentStore, EventStore, ParticipantStore},
};

use crate::{AppState, error::ApiError};

/// `GET /participants`
pub async fn list<S>(
  State(state): State<AppState<S>>,
) -> Result<Json<Vec<Participant>>, ApiError>
where
  S: EventStore + EnrollmentStore + ParticipantStore + 'static,
{
  let participants = state.participants.list(&state.cancel).await?;
  Ok(Json(participants))
}

/// `POST /participants`
pub async fn create<S>(
  State(state): State<AppState<S>>,
  Json(body): Json<NewParticipant>,
) -> Result<impl IntoResponse, ApiError>
where
  S: EventStore + EnrollmentStore + ParticipantStore + 'static,
{
  let participant = state.participants.register(body, &state.cancel).await?;
  Ok((StatusCode::CREATED, Json(participant)))
}

/// `GET /participants/:id`
pub async fn get_one<S>(
  State(state): State<AppState<S>>,
  Path(id): Path<i64>,
) -> Result<Json<Participant>, ApiError>
where
  S: EventStore + EnrollmentStore + ParticipantStore + 'static,
{
  let participant = state.participants.get(id, &state.cancel).await?;
  Ok(Json(participant))
}

/// `PUT /participants/:id`
pub async fn update<S>(
  State(state): State<AppState<S>>,
  Path(id): Path<i64>,
  Json(body): Json<ParticipantPatch>,
) -> Result<Json<Participant>, ApiError>
where
  S: EventStore + EnrollmentStore + ParticipantStore + 'static,
{
  let participant = state
    .participants
    .update_profile(id, body, &state.cancel)
    .await?;
  Ok(Json(participant))
}
