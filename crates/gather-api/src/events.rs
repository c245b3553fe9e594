//! Handlers for `/events` endpoints.
//!
//! | Method   | Path | Notes |
//! |----------|------|-------|
//! | `GET`    | `/events` | Paginated; all filters optional |
//! | `POST`   | `/events` | 201 on success |
//! | `GET`    | `/events/:id` | 404 if not found |
//! | `PUT`    | `/events/:id` | Patch body; absent fields untouched |
//! | `DELETE` | `/events/:id` | `deleted: false` if absent |
//! | `GET`    | `/events/by-account/:account_id` | Caller's registrations |

use axum::{
  Json,
  extract::{Path, Query, State},
  http::StatusCode,
  response::IntoResponse,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use gather_core::{
  event::{EventPatch, NewEvent},
  store::{EnrollmentStore, EventStore, ParticipantStore},
  view::{EnrolledEventView, EventView},
};
use gather_service::ListEventsRequest;

use crate::{AppState, Deleted, error::ApiError};

// ─── List ─────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct ListParams {
  pub page_number:    Option<u32>,
  pub page_size:      Option<u32>,
  pub start_date:     Option<DateTime<Utc>>,
  pub end_date:       Option<DateTime<Utc>>,
  pub location:       Option<String>,
  pub category:       Option<String>,
  pub name:           Option<String>,
  #[serde(default)]
  pub include_passed: bool,
}

#[derive(Debug, Serialize)]
pub struct ListResponse {
  pub events:      Vec<EventView>,
  pub total_count: u64,
  pub page_number: u32,
  pub page_size:   u32,
}

/// `GET /events[?page_number=..&page_size=..&category=..&include_passed=..]`
pub async fn list<S>(
  State(state): State<AppState<S>>,
  Query(params): Query<ListParams>,
) -> Result<Json<ListResponse>, ApiError>
where
  S: EventStore + EnrollmentStore + ParticipantStore + 'static,
{
  let defaults = ListEventsRequest::default();
  let page_number = params.page_number.unwrap_or(defaults.page_number);
  let page_size = params.page_size.unwrap_or(defaults.page_size);

  let listing = state
    .events
    .list_events(
      ListEventsRequest {
        page_number,
        page_size,
        start_date: params.start_date,
        end_date: params.end_date,
        location: params.location,
        category: params.category,
        name: params.name,
        include_passed: params.include_passed,
      },
      &state.cancel,
    )
    .await?;

  Ok(Json(ListResponse {
    events: listing.events,
    total_count: listing.total_count,
    page_number,
    page_size,
  }))
}

// ─── Single event ─────────────────────────────────────────────────────────────

/// `GET /events/:id`
pub async fn get_one<S>(
  State(state): State<AppState<S>>,
  Path(id): Path<i64>,
) -> Result<Json<EventView>, ApiError>
where
  S: EventStore + EnrollmentStore + ParticipantStore + 'static,
{
  let view = state.events.get_event(id, &state.cancel).await?;
  Ok(Json(view))
}

// ─── Create / update / delete ─────────────────────────────────────────────────

/// `POST /events`
pub async fn create<S>(
  State(state): State<AppState<S>>,
  Json(body): Json<NewEvent>,
) -> Result<impl IntoResponse, ApiError>
where
  S: EventStore + EnrollmentStore + ParticipantStore + 'static,
{
  let view = state.events.create_event(body, &state.cancel).await?;
  Ok((StatusCode::CREATED, Json(view)))
}

/// `PUT /events/:id`
pub async fn update<S>(
  State(state): State<AppState<S>>,
  Path(id): Path<i64>,
  Json(body): Json<EventPatch>,
) -> Result<Json<EventView>, ApiError>
where
  S: EventStore + EnrollmentStore + ParticipantStore + 'static,
{
  let view = state.events.update_event(id, body, &state.cancel).await?;
  Ok(Json(view))
}

/// `DELETE /events/:id`
pub async fn delete<S>(
  State(state): State<AppState<S>>,
  Path(id): Path<i64>,
) -> Result<Json<Deleted>, ApiError>
where
  S: EventStore + EnrollmentStore + ParticipantStore + 'static,
{
  let deleted = state.events.delete_event(id, &state.cancel).await?;
  Ok(Json(Deleted { deleted }))
}

// ─── Registrations by account ────────────────────────────────────────────────

/// `GET /events/by-account/:account_id`
pub async fn by_account<S>(
  State(state): State<AppState<S>>,
  Path(account_id): Path<String>,
) -> Result<Json<Vec<EnrolledEventView>>, ApiError>
where
  S: EventStore + EnrollmentStore + ParticipantStore + 'static,
{
  let views = state
    .events
    .list_events_for_account(&account_id, &state.cancel)
    .await?;
  Ok(Json(views))
}
