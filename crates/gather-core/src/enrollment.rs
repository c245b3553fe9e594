//! Enrollment — a participant's registration record for an event.
//!
//! At most one enrollment exists per (participant, event) pair. The store's
//! uniqueness constraint is the authoritative guard; see
//! [`EnrollmentInsert`].

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

/// A persisted enrollment. `id` is assigned by the store.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Enrollment {
  pub id:             i64,
  pub event_id:       i64,
  pub participant_id: i64,
  /// Server-assigned when the caller does not supply one.
  pub registered_at:  DateTime<Utc>,
}

/// Input to [`crate::store::EnrollmentStore::create_enrollment`].
#[derive(Debug, Clone, Validate)]
pub struct NewEnrollment {
  #[validate(range(min = 1, message = "event id must be greater than 0"))]
  pub event_id:       i64,
  #[validate(range(min = 1, message = "participant id must be greater than 0"))]
  pub participant_id: i64,
  pub registered_at:  Option<DateTime<Utc>>,
}

/// Outcome of an enrollment insert.
///
/// Two concurrent attempts for the same pair can both pass the service-level
/// duplicate check before either writes; the store reports the loser as
/// [`DuplicatePair`](Self::DuplicatePair) by translating its
/// uniqueness-constraint violation, so the admission controller can surface
/// `AlreadyEnrolled` instead of a generic failure.
#[derive(Debug, Clone)]
pub enum EnrollmentInsert {
  Created(Enrollment),
  /// The (participant, event) pair already holds an enrollment.
  DuplicatePair,
  /// The referenced event row is gone (foreign-key violation). The
  /// participant reference was resolved just before the write, so in
  /// practice this means the event was deleted mid-flight.
  EventMissing,
}
