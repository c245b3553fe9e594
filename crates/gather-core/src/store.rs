//! Store traits and supporting query types.
//!
//! The traits are implemented by storage backends (e.g.
//! `gather-store-sqlite`). The service layer depends on these abstractions,
//! not on any concrete backend.

use std::future::Future;

use chrono::{DateTime, Utc};

use crate::{
  enrollment::{Enrollment, EnrollmentInsert, NewEnrollment},
  event::{Event, EventPatch, NewEvent},
  participant::{NewParticipant, Participant, ParticipantInsert, ParticipantPatch},
};

// ─── Query types ─────────────────────────────────────────────────────────────

/// 1-based page coordinates. Applied after filtering, so an out-of-range
/// page yields an empty slice, not an error.
#[derive(Debug, Clone, Copy)]
pub struct PageRequest {
  pub number: u32,
  pub size:   u32,
}

impl Default for PageRequest {
  fn default() -> Self {
    Self { number: 1, size: 4 }
  }
}

impl PageRequest {
  pub fn offset(&self) -> u64 {
    u64::from(self.number.saturating_sub(1)) * u64::from(self.size)
  }
}

/// Parameters for [`EventStore::list_events`]. All filters are optional and
/// combined with AND; string filters are substring matches.
#[derive(Debug, Clone, Default)]
pub struct EventQuery {
  /// Inclusive lower bound on the scheduled date.
  pub start_date: Option<DateTime<Utc>>,
  /// Inclusive upper bound on the scheduled date.
  pub end_date:   Option<DateTime<Utc>>,
  pub location:   Option<String>,
  pub category:   Option<String>,
  pub name:       Option<String>,
  /// Exclude events scheduled strictly before this instant. The service
  /// layer sets this to `now` when passed events are excluded, so both the
  /// page slice and `total_count` reflect the post-exclusion set.
  pub not_before: Option<DateTime<Utc>>,
  pub page:       PageRequest,
}

/// One page of events, date ascending, plus the size of the full filtered
/// set (not the raw table size).
#[derive(Debug, Clone)]
pub struct EventPage {
  pub events:      Vec<Event>,
  pub total_count: u64,
}

// ─── Traits ──────────────────────────────────────────────────────────────────

/// Abstraction over event persistence.
///
/// All methods return `Send` futures so the traits can be used in
/// multi-threaded async runtimes (tokio with `axum`).
pub trait EventStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  /// Persist a new event and return it with its assigned id.
  fn create_event(
    &self,
    input: NewEvent,
  ) -> impl Future<Output = Result<Event, Self::Error>> + Send + '_;

  /// Apply a partial update. Returns the updated row, or `None` if the id
  /// does not exist. The read-apply-write runs atomically in the backend.
  fn update_event(
    &self,
    id: i64,
    patch: EventPatch,
  ) -> impl Future<Output = Result<Option<Event>, Self::Error>> + Send + '_;

  /// Delete an event and, by cascade, its enrollments. Returns `false` if
  /// the id does not exist.
  fn delete_event(
    &self,
    id: i64,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;

  /// Retrieve an event by id. Returns `None` if not found.
  fn get_event(
    &self,
    id: i64,
  ) -> impl Future<Output = Result<Option<Event>, Self::Error>> + Send + '_;

  /// Fetch the image blob for an event. `None` when the event has no image
  /// or does not exist. Kept separate from row queries so listings never
  /// drag blobs through the connection.
  fn event_image(
    &self,
    id: i64,
  ) -> impl Future<Output = Result<Option<Vec<u8>>, Self::Error>> + Send + '_;

  /// Filtered, paginated listing; see [`EventQuery`].
  fn list_events<'a>(
    &'a self,
    query: &'a EventQuery,
  ) -> impl Future<Output = Result<EventPage, Self::Error>> + Send + 'a;

  /// All events the account's participant is enrolled in, joined with the
  /// enrollment records, date ascending.
  fn list_events_for_account<'a>(
    &'a self,
    account_id: &'a str,
  ) -> impl Future<Output = Result<Vec<(Event, Enrollment)>, Self::Error>> + Send + 'a;
}

/// Abstraction over enrollment persistence.
pub trait EnrollmentStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  /// Insert an enrollment. Uniqueness-constraint violations are reported as
  /// [`EnrollmentInsert::DuplicatePair`], never as a generic error — the
  /// constraint is the authoritative guard against the check-then-write
  /// race.
  fn create_enrollment(
    &self,
    input: NewEnrollment,
  ) -> impl Future<Output = Result<EnrollmentInsert, Self::Error>> + Send + '_;

  /// Idempotent delete: `false` (not an error) if the id does not exist.
  fn delete_enrollment(
    &self,
    id: i64,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;

  fn get_enrollment(
    &self,
    id: i64,
  ) -> impl Future<Output = Result<Option<Enrollment>, Self::Error>> + Send + '_;

  /// Enrollments joined with their participants; scoped to one event when
  /// `event_id` is given, system-wide otherwise.
  fn list_enrollments(
    &self,
    event_id: Option<i64>,
  ) -> impl Future<Output = Result<Vec<(Enrollment, Participant)>, Self::Error>> + Send + '_;

  /// The participant's enrollments for one event — the duplicate-check
  /// path. At most one record under the uniqueness constraint.
  fn enrollments_for_participant(
    &self,
    participant_id: i64,
    event_id: i64,
  ) -> impl Future<Output = Result<Vec<Enrollment>, Self::Error>> + Send + '_;

  /// Live enrollment count for an event, used for status computation.
  fn count_enrollments(
    &self,
    event_id: i64,
  ) -> impl Future<Output = Result<u32, Self::Error>> + Send + '_;
}

/// Abstraction over participant-profile persistence.
pub trait ParticipantStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  /// Insert a profile; a duplicate `account_id` is reported as
  /// [`ParticipantInsert::DuplicateAccount`].
  fn create_participant(
    &self,
    input: NewParticipant,
  ) -> impl Future<Output = Result<ParticipantInsert, Self::Error>> + Send + '_;

  /// Apply a partial profile update. Returns `None` if the id does not
  /// exist.
  fn update_participant(
    &self,
    id: i64,
    patch: ParticipantPatch,
  ) -> impl Future<Output = Result<Option<Participant>, Self::Error>> + Send + '_;

  fn get_participant(
    &self,
    id: i64,
  ) -> impl Future<Output = Result<Option<Participant>, Self::Error>> + Send + '_;

  /// Resolve the external account identifier to a profile.
  fn find_participant_by_account<'a>(
    &'a self,
    account_id: &'a str,
  ) -> impl Future<Output = Result<Option<Participant>, Self::Error>> + Send + 'a;

  fn list_participants(
    &self,
  ) -> impl Future<Output = Result<Vec<Participant>, Self::Error>> + Send + '_;
}
