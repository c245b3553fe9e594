//! Handlers for `/enrollments` endpoints.
//!
//! | Method   | Path | Notes |
//! |----------|------|-------|
//! | `GET`    | `/enrollments` | Optional `?event_id=`; unscoped = system-wide |
//! | `POST`   | `/enrollments` | 201 on admission, 409 on duplicate |
//! | `GET`    | `/enrollments/:id` | 404 if not found |
//! | `DELETE` | `/enrollments/:id` | `deleted: false` if absent |

use axum::{
  Json,
  extract::{Path, Query, State},
  http::StatusCode,
  response::IntoResponse,
};
use chrono::{DateTime, Utc};
use serde::Deserialize;

use gather_core::{
  store::{EnrollmentStore, EventStore, ParticipantStore},
  view::EnrollmentView,
};
use gather_service::EnrollmentRequest;

use crate::{AppState, Deleted, error::ApiError};

// ─── List ─────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct ListParams {
  pub event_id: Option<i64>,
}

/// `GET /enrollments[?event_id=<id>]`
pub async fn list<S>(
  State(state): State<AppState<S>>,
  Query(params): Query<ListParams>,
) -> Result<Json<Vec<EnrollmentView>>, ApiError>
where
  S: EventStore + EnrollmentStore + ParticipantStore + 'static,
{
  let views = state
    .enrollments
    .list_enrollments(params.event_id, &state.cancel)
    .await?;
  Ok(Json(views))
}

// ─── Enroll ───────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct EnrollBody {
  pub account_id:    String,
  pub event_id:      i64,
  pub registered_at: Option<DateTime<Utc>>,
}

/// `POST /enrollments` — body: `{"account_id":"...","event_id":1}`
pub async fn create<S>(
  State(state): State<AppState<S>>,
  Json(body): Json<EnrollBody>,
) -> Result<impl IntoResponse, ApiError>
where
  S: EventStore + EnrollmentStore + ParticipantStore + 'static,
{
  let view = state
    .enrollments
    .enroll(
      EnrollmentRequest {
        account_id:    body.account_id,
        event_id:      body.event_id,
        registered_at: body.registered_at,
      },
      &state.cancel,
    )
    .await?;
  Ok((StatusCode::CREATED, Json(view)))
}

// ─── Get one / cancel ────────────────────────────────────────────────────────

/// `GET /enrollments/:id`
pub async fn get_one<S>(
  State(state): State<AppState<S>>,
  Path(id): Path<i64>,
) -> Result<Json<EnrollmentView>, ApiError>
where
  S: EventStore + EnrollmentStore + ParticipantStore + 'static,
{
  let view = state.enrollments.get_enrollment(id, &state.cancel).await?;
  Ok(Json(view))
}

/// `DELETE /enrollments/:id`
pub async fn delete<S>(
  State(state): State<AppState<S>>,
  Path(id): Path<i64>,
) -> Result<Json<Deleted>, ApiError>
where
  S: EventStore + EnrollmentStore + ParticipantStore + 'static,
{
  let deleted = state
    .enrollments
    .cancel_enrollment(id, &state.cancel)
    .await?;
  Ok(Json(Deleted { deleted }))
}
