//! JSON HTTP boundary for the Gather engine.
//!
//! Exposes an axum [`Router`] backed by any store implementing the
//! [`gather_core::store`] traits. Authentication, TLS, and transport
//! concerns are the caller's responsibility.

pub mod enrollments;
pub mod error;
pub mod events;
pub mod participants;

pub use error::ApiError;

use std::{path::PathBuf, sync::Arc};

use axum::{Router, routing::get};
use serde::{Deserialize, Serialize};

use gather_core::{
  cancel::CancelToken,
  clock::Clock,
  store::{EnrollmentStore, EventStore, ParticipantStore},
};
use gather_service::{
  EnrollmentService, EventService, ImageCache, ParticipantService,
};

// ─── Configuration ────────────────────────────────────────────────────────────

/// Runtime server configuration, deserialised from `config.toml` (with
/// `GATHER_*` environment overrides).
#[derive(Deserialize, Clone)]
pub struct ServerConfig {
  pub host:       String,
  pub port:       u16,
  pub store_path: PathBuf,
}

// ─── Application state ────────────────────────────────────────────────────────

/// Shared state threaded through all axum handlers.
pub struct AppState<S> {
  pub events:       Arc<EventService<S>>,
  pub enrollments:  Arc<EnrollmentService<S>>,
  pub participants: Arc<ParticipantService<S>>,
  /// Fired on server shutdown; in-flight operations stop before their next
  /// write and report a cancelled outcome.
  pub cancel:       CancelToken,
}

impl<S> Clone for AppState<S> {
  fn clone(&self) -> Self {
    Self {
      events:       self.events.clone(),
      enrollments:  self.enrollments.clone(),
      participants: self.participants.clone(),
      cancel:       self.cancel.clone(),
    }
  }
}

impl<S> AppState<S>
where
  S: EventStore + EnrollmentStore + ParticipantStore + 'static,
{
  pub fn new(
    store: Arc<S>,
    cache: Arc<ImageCache>,
    clock: Arc<dyn Clock>,
    cancel: CancelToken,
  ) -> Self {
    Self {
      events:       Arc::new(EventService::new(store.clone(), cache, clock)),
      enrollments:  Arc::new(EnrollmentService::new(store.clone())),
      participants: Arc::new(ParticipantService::new(store)),
      cancel,
    }
  }
}

/// Body of every delete response; `false` means the id was already gone.
#[derive(Debug, Serialize, Deserialize)]
pub struct Deleted {
  pub deleted: bool,
}

// ─── Router ───────────────────────────────────────────────────────────────────

/// Build a fully-materialised router for `state`.
///
/// The returned `Router<()>` can be nested into any parent router
/// regardless of its own state type.
pub fn router<S>(state: AppState<S>) -> Router
where
  S: EventStore + EnrollmentStore + ParticipantStore + 'static,
{
  Router::new()
    // Events
    .route("/events", get(events::list::<S>).post(events::create::<S>))
    .route(
      "/events/{id}",
      get(events::get_one::<S>)
        .put(events::update::<S>)
        .delete(events::delete::<S>),
    )
    .route("/events/by-account/{account_id}", get(events::by_account::<S>))
    // Enrollments
    .route(
      "/enrollments",
      get(enrollments::list::<S>).post(enrollments::create::<S>),
    )
    .route(
      "/enrollments/{id}",
      get(enrollments::get_one::<S>).delete(enrollments::delete::<S>),
    )
    // Participants
    .route(
      "/participants",
      get(participants::list::<S>).post(participants::create::<S>),
    )
    .route(
      "/participants/{id}",
      get(participants::get_one::<S>).put(participants::update::<S>),
    )
    .with_state(state)
}

// ─── Integration tests ────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
  use std::sync::Arc;

  use axum::{
    body::Body,
    http::{Request, StatusCode, header},
  };
  use chrono::{Duration, Utc};
  use serde_json::{Value, json};
  use tower::ServiceExt as _;

  use gather_core::{cancel::CancelHandle, clock::SystemClock};
  use gather_service::ImageCache;
  use gather_store_sqlite::SqliteStore;

  use super::*;

  async fn make_state(cancel: CancelToken) -> AppState<SqliteStore> {
    let store = SqliteStore::open_in_memory().await.unwrap();
    AppState::new(
      Arc::new(store),
      Arc::new(ImageCache::new()),
      Arc::new(SystemClock),
      cancel,
    )
  }

  async fn live_state() -> AppState<SqliteStore> {
    make_state(CancelToken::never()).await
  }

  async fn oneshot_json(
    state: AppState<SqliteStore>,
    method: &str,
    uri: &str,
    body: Option<Value>,
  ) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    let body = match body {
      Some(v) => {
        builder = builder.header(header::CONTENT_TYPE, "application/json");
        Body::from(v.to_string())
      }
      None => Body::empty(),
    };
    let request = builder.body(body).unwrap();

    let response = router(state).oneshot(request).await.unwrap();
    let status = response.status();
    let bytes =
      axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let value = if bytes.is_empty() {
      Value::Null
    } else {
      serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
  }

  fn event_body(name: &str, days_ahead: i64) -> Value {
    json!({
      "name": name,
      "description": format!("{name} description"),
      "date": (Utc::now() + Duration::days(days_ahead)).to_rfc3339(),
      "location": "Main Hall",
      "category": "Music",
      "max_participants": 10,
    })
  }

  fn participant_body(account: &str) -> Value {
    json!({
      "first_name": "Alice",
      "last_name": "Liddell",
      "date_of_birth": "1990-04-26",
      "email": format!("{account}@example.com"),
      "account_id": account,
    })
  }

  // ── Events ──────────────────────────────────────────────────────────────────

  #[tokio::test]
  async fn create_event_returns_201_with_relevant_status() {
    let state = live_state().await;
    let (status, body) =
      oneshot_json(state, "POST", "/events", Some(event_body("Concert", 1)))
        .await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["status"], "relevant");
    assert!(body["id"].as_i64().unwrap() > 0);
  }

  #[tokio::test]
  async fn invalid_event_returns_400_with_field_list() {
    let state = live_state().await;
    let mut body = event_body("", 1);
    body["max_participants"] = json!(0);

    let (status, body) = oneshot_json(state, "POST", "/events", Some(body)).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["kind"], "validation_failed");
    assert!(!body["fields"].as_array().unwrap().is_empty());
  }

  #[tokio::test]
  async fn unknown_event_returns_404() {
    let state = live_state().await;
    let (status, body) = oneshot_json(state, "GET", "/events/99", None).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["kind"], "not_found");
  }

  #[tokio::test]
  async fn event_crud_round_trip() {
    let state = live_state().await;

    let (_, created) = oneshot_json(
      state.clone(),
      "POST",
      "/events",
      Some(event_body("Workshop", 3)),
    )
    .await;
    let id = created["id"].as_i64().unwrap();

    let (status, fetched) =
      oneshot_json(state.clone(), "GET", &format!("/events/{id}"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fetched["name"], "Workshop");

    // partial update: only the name changes
    let (status, updated) = oneshot_json(
      state.clone(),
      "PUT",
      &format!("/events/{id}"),
      Some(json!({ "name": "Rust Workshop" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["name"], "Rust Workshop");
    assert_eq!(updated["category"], "Music");

    let (status, deleted) =
      oneshot_json(state.clone(), "DELETE", &format!("/events/{id}"), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(deleted["deleted"], true);

    let (status, _) =
      oneshot_json(state.clone(), "GET", &format!("/events/{id}"), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    // idempotent delete
    let (status, deleted) =
      oneshot_json(state, "DELETE", &format!("/events/{id}"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(deleted["deleted"], false);
  }

  #[tokio::test]
  async fn image_round_trips_as_base64() {
    let state = live_state().await;
    let mut body = event_body("Pictured", 1);
    body["image"] = json!("AQID"); // [1, 2, 3]

    let (status, created) =
      oneshot_json(state.clone(), "POST", "/events", Some(body)).await;
    assert_eq!(status, StatusCode::CREATED);
    let id = created["id"].as_i64().unwrap();

    let (_, fetched) =
      oneshot_json(state, "GET", &format!("/events/{id}"), None).await;
    assert_eq!(fetched["image"], "AQID");
  }

  #[tokio::test]
  async fn listing_reports_post_filter_total_and_page_shape() {
    let state = live_state().await;
    for name in ["A", "B", "C"] {
      oneshot_json(state.clone(), "POST", "/events", Some(event_body(name, 2)))
        .await;
    }

    let (status, body) = oneshot_json(
      state,
      "GET",
      "/events?page_number=1&page_size=2&category=Music",
      None,
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["events"].as_array().unwrap().len(), 2);
    assert_eq!(body["total_count"], 3);
    assert_eq!(body["page_number"], 1);
    assert_eq!(body["page_size"], 2);
  }

  // ── Enrollments ─────────────────────────────────────────────────────────────

  async fn setup_event_and_participant(
    state: &AppState<SqliteStore>,
    account: &str,
  ) -> i64 {
    let (status, _) = oneshot_json(
      state.clone(),
      "POST",
      "/participants",
      Some(participant_body(account)),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (_, event) = oneshot_json(
      state.clone(),
      "POST",
      "/events",
      Some(event_body("Enrollable", 2)),
    )
    .await;
    event["id"].as_i64().unwrap()
  }

  #[tokio::test]
  async fn second_enrollment_returns_409() {
    let state = live_state().await;
    let event_id = setup_event_and_participant(&state, "alice").await;
    let body = json!({ "account_id": "alice", "event_id": event_id });

    let (status, view) =
      oneshot_json(state.clone(), "POST", "/enrollments", Some(body.clone()))
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(view["event_id"].as_i64().unwrap(), event_id);

    let (status, conflict) =
      oneshot_json(state, "POST", "/enrollments", Some(body)).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(conflict["kind"], "already_enrolled");
    // the display message is rendered by clients as-is
    assert!(conflict["error"].as_str().unwrap().contains("already enrolled"));
  }

  #[tokio::test]
  async fn enrolling_an_unknown_account_returns_404() {
    let state = live_state().await;
    let (_, event) = oneshot_json(
      state.clone(),
      "POST",
      "/events",
      Some(event_body("Members", 2)),
    )
    .await;

    let (status, body) = oneshot_json(
      state,
      "POST",
      "/enrollments",
      Some(json!({ "account_id": "ghost", "event_id": event["id"] })),
    )
    .await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["kind"], "participant_not_found");
  }

  #[tokio::test]
  async fn roster_carries_participant_info() {
    let state = live_state().await;
    let event_id = setup_event_and_participant(&state, "bob").await;

    oneshot_json(
      state.clone(),
      "POST",
      "/enrollments",
      Some(json!({ "account_id": "bob", "event_id": event_id })),
    )
    .await;

    let (status, roster) = oneshot_json(
      state,
      "GET",
      &format!("/enrollments?event_id={event_id}"),
      None,
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    let entries = roster.as_array().unwrap();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0]["email"], "bob@example.com");
    assert_eq!(entries[0]["account_id"], "bob");
  }

  #[tokio::test]
  async fn cancel_enrollment_is_idempotent_over_http() {
    let state = live_state().await;
    let event_id = setup_event_and_participant(&state, "carol").await;

    let (_, view) = oneshot_json(
      state.clone(),
      "POST",
      "/enrollments",
      Some(json!({ "account_id": "carol", "event_id": event_id })),
    )
    .await;
    let enrollment_id = view["enrollment_id"].as_i64().unwrap();

    let (status, first) = oneshot_json(
      state.clone(),
      "DELETE",
      &format!("/enrollments/{enrollment_id}"),
      None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(first["deleted"], true);

    let (status, second) = oneshot_json(
      state,
      "DELETE",
      &format!("/enrollments/{enrollment_id}"),
      None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(second["deleted"], false);
  }

  #[tokio::test]
  async fn registrations_by_account_are_listed() {
    let state = live_state().await;
    let event_id = setup_event_and_participant(&state, "dave").await;

    oneshot_json(
      state.clone(),
      "POST",
      "/enrollments",
      Some(json!({ "account_id": "dave", "event_id": event_id })),
    )
    .await;

    let (status, body) =
      oneshot_json(state, "GET", "/events/by-account/dave", None).await;

    assert_eq!(status, StatusCode::OK);
    let views = body.as_array().unwrap();
    assert_eq!(views.len(), 1);
    assert_eq!(views[0]["event_id"].as_i64().unwrap(), event_id);
    assert_eq!(views[0]["status"], "relevant");
  }

  // ── Cancellation ────────────────────────────────────────────────────────────

  #[tokio::test]
  async fn cancelled_server_rejects_work_with_503() {
    let (handle, token) = CancelHandle::new();
    let state = make_state(token).await;
    handle.cancel();

    let (status, body) =
      oneshot_json(state, "POST", "/events", Some(event_body("Late", 1))).await;

    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["kind"], "cancelled");
  }
}
