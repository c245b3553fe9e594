//! [`EventService`] — query orchestration and administrator mutations.
//!
//! Listing and lookup assemble [`EventView`]s: the stored row, the status
//! computed from the live enrollment count at request time, and the image
//! blob served through the [`ImageCache`]. Status is never cached; images
//! are, with write-through invalidation on every mutation.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use validator::Validate as _;

use gather_core::{
  Error, FieldError, Result,
  cancel::CancelToken,
  clock::Clock,
  event::{Event, EventPatch, NewEvent},
  store::{EnrollmentStore, EventQuery, EventStore, PageRequest},
  view::{EnrolledEventView, EventView},
};

use crate::{ImageCache, ensure_live};

// ─── Request / response types ────────────────────────────────────────────────

/// Parameters for [`EventService::list_events`]. All filters optional,
/// combined with AND; substring matching for the string filters.
#[derive(Debug, Clone)]
pub struct ListEventsRequest {
  pub page_number:    u32,
  pub page_size:      u32,
  pub start_date:     Option<DateTime<Utc>>,
  pub end_date:       Option<DateTime<Utc>>,
  pub location:       Option<String>,
  pub category:       Option<String>,
  pub name:           Option<String>,
  /// When false (the default), passed events are excluded before
  /// pagination, so `total_count` reflects the visible set.
  pub include_passed: bool,
}

impl Default for ListEventsRequest {
  fn default() -> Self {
    let page = PageRequest::default();
    Self {
      page_number:    page.number,
      page_size:      page.size,
      start_date:     None,
      end_date:       None,
      location:       None,
      category:       None,
      name:           None,
      include_passed: false,
    }
  }
}

/// One page of assembled views plus the post-filter total.
#[derive(Debug, Clone)]
pub struct EventListing {
  pub events:      Vec<EventView>,
  pub total_count: u64,
}

// ─── Service ─────────────────────────────────────────────────────────────────

pub struct EventService<S> {
  store: Arc<S>,
  cache: Arc<ImageCache>,
  clock: Arc<dyn Clock>,
}

impl<S> EventService<S>
where
  S: EventStore + EnrollmentStore + 'static,
{
  pub fn new(store: Arc<S>, cache: Arc<ImageCache>, clock: Arc<dyn Clock>) -> Self {
    Self { store, cache, clock }
  }

  /// Filtered, paginated listing with freshly computed statuses.
  pub async fn list_events(
    &self,
    request: ListEventsRequest,
    cancel: &CancelToken,
  ) -> Result<EventListing> {
    ensure_live(cancel)?;
    let now = self.clock.now();

    let query = EventQuery {
      start_date: request.start_date,
      end_date:   request.end_date,
      location:   request.location,
      category:   request.category,
      name:       request.name,
      not_before: (!request.include_passed).then_some(now),
      page:       PageRequest {
        number: request.page_number.max(1),
        size:   request.page_size.max(1),
      },
    };

    let page = self.store.list_events(&query).await.map_err(Error::store)?;

    let mut events = Vec::with_capacity(page.events.len());
    for event in page.events {
      ensure_live(cancel)?;
      events.push(self.assemble_view(event, now).await?);
    }

    Ok(EventListing { events, total_count: page.total_count })
  }

  /// Single-event lookup; [`Error::EventNotFound`] when absent.
  pub async fn get_event(&self, id: i64, cancel: &CancelToken) -> Result<EventView> {
    ensure_live(cancel)?;
    let event = self
      .store
      .get_event(id)
      .await
      .map_err(Error::store)?
      .ok_or(Error::EventNotFound(id))?;

    self.assemble_view(event, self.clock.now()).await
  }

  /// Create an event. The image cache entry for the assigned id is
  /// invalidated so a recycled id can never serve a predecessor's image.
  pub async fn create_event(
    &self,
    input: NewEvent,
    cancel: &CancelToken,
  ) -> Result<EventView> {
    ensure_live(cancel)?;
    input.validate().map_err(Error::from)?;

    let now = self.clock.now();
    if input.date < now {
      return Err(date_in_past());
    }

    ensure_live(cancel)?;
    let image = input.image.clone();
    let event = self.store.create_event(input).await.map_err(Error::store)?;
    self.cache.invalidate(event.id);
    tracing::info!(event_id = event.id, "created event");

    let status = event.status_at(0, now);
    Ok(EventView::assemble(event, image, status))
  }

  /// Apply a partial update, then invalidate the cached image so the next
  /// read reloads it from the store.
  pub async fn update_event(
    &self,
    id: i64,
    patch: EventPatch,
    cancel: &CancelToken,
  ) -> Result<EventView> {
    ensure_live(cancel)?;
    patch.validate().map_err(Error::from)?;

    if let Some(date) = patch.date
      && date < self.clock.now()
    {
      return Err(date_in_past());
    }

    ensure_live(cancel)?;
    let event = self
      .store
      .update_event(id, patch)
      .await
      .map_err(Error::store)?
      .ok_or(Error::EventNotFound(id))?;
    self.cache.invalidate(id);
    tracing::info!(event_id = id, "updated event");

    self.assemble_view(event, self.clock.now()).await
  }

  /// Idempotent delete; `false` when the id does not exist. Enrollments go
  /// with the event (store-level cascade).
  pub async fn delete_event(&self, id: i64, cancel: &CancelToken) -> Result<bool> {
    ensure_live(cancel)?;
    let deleted = self.store.delete_event(id).await.map_err(Error::store)?;
    self.cache.invalidate(id);
    if deleted {
      tracing::info!(event_id = id, "deleted event");
    }
    Ok(deleted)
  }

  /// All events the account's participant is registered for, each with a
  /// freshly computed status. No images — registration listings stay light.
  pub async fn list_events_for_account(
    &self,
    account_id: &str,
    cancel: &CancelToken,
  ) -> Result<Vec<EnrolledEventView>> {
    ensure_live(cancel)?;
    let now = self.clock.now();
    let rows = self
      .store
      .list_events_for_account(account_id)
      .await
      .map_err(Error::store)?;

    let mut views = Vec::with_capacity(rows.len());
    for (event, enrollment) in rows {
      ensure_live(cancel)?;
      let count = self
        .store
        .count_enrollments(event.id)
        .await
        .map_err(Error::store)?;
      let status = event.status_at(count, now);
      views.push(EnrolledEventView::assemble(event, enrollment, status));
    }

    Ok(views)
  }

  async fn assemble_view(&self, event: Event, now: DateTime<Utc>) -> Result<EventView> {
    let count = self
      .store
      .count_enrollments(event.id)
      .await
      .map_err(Error::store)?;
    let status = event.status_at(count, now);

    let store = self.store.clone();
    let id = event.id;
    let image = self
      .cache
      .get_or_load(id, || async move { store.event_image(id).await })
      .await
      .map_err(Error::store)?;

    Ok(EventView::assemble(event, image, status))
  }
}

fn date_in_past() -> Error {
  Error::Validation(vec![FieldError {
    field:   "date".into(),
    message: "the event date must not be in the past".into(),
  }])
}
