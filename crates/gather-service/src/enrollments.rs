//! [`EnrollmentService`] — admission control and roster queries.
//!
//! The admission pipeline resolves the caller's participant profile, runs a
//! same-event duplicate check as a fast path, validates, and performs a
//! single write. The store's uniqueness constraint on (participant, event)
//! is the authoritative guard: when two concurrent attempts both pass the
//! fast path, the losing insert comes back as a duplicate and is reported
//! as [`Error::AlreadyEnrolled`], so exactly one attempt succeeds.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use validator::Validate as _;

use gather_core::{
  Error, Result,
  cancel::CancelToken,
  enrollment::{EnrollmentInsert, NewEnrollment},
  store::{EnrollmentStore, ParticipantStore},
  view::EnrollmentView,
};

use crate::ensure_live;

/// An enrollment attempt, keyed by the caller's external account
/// identifier. `registered_at` is server-assigned when absent.
#[derive(Debug, Clone)]
pub struct EnrollmentRequest {
  pub account_id:    String,
  pub event_id:      i64,
  pub registered_at: Option<DateTime<Utc>>,
}

pub struct EnrollmentService<S> {
  store: Arc<S>,
}

impl<S> EnrollmentService<S>
where
  S: EnrollmentStore + ParticipantStore + 'static,
{
  pub fn new(store: Arc<S>) -> Self {
    Self { store }
  }

  /// Admit an enrollment or reject it with a typed error.
  pub async fn enroll(
    &self,
    request: EnrollmentRequest,
    cancel: &CancelToken,
  ) -> Result<EnrollmentView> {
    ensure_live(cancel)?;

    let participant = self
      .store
      .find_participant_by_account(&request.account_id)
      .await
      .map_err(Error::store)?
      .ok_or_else(|| Error::AccountNotRegistered(request.account_id.clone()))?;

    // Fast path only: a friendlier rejection without burning a write. The
    // unique index remains the authority under concurrent attempts.
    let existing = self
      .store
      .enrollments_for_participant(participant.id, request.event_id)
      .await
      .map_err(Error::store)?;
    if !existing.is_empty() {
      return Err(Error::AlreadyEnrolled);
    }

    let input = NewEnrollment {
      event_id:       request.event_id,
      participant_id: participant.id,
      registered_at:  request.registered_at,
    };
    input.validate().map_err(Error::from)?;

    ensure_live(cancel)?;
    match self.store.create_enrollment(input).await.map_err(Error::store)? {
      EnrollmentInsert::Created(enrollment) => {
        tracing::info!(
          enrollment_id = enrollment.id,
          event_id = enrollment.event_id,
          participant_id = enrollment.participant_id,
          "enrollment admitted"
        );
        Ok(EnrollmentView::assemble(enrollment, participant))
      }
      EnrollmentInsert::DuplicatePair => Err(Error::AlreadyEnrolled),
      EnrollmentInsert::EventMissing => Err(Error::EventNotFound(request.event_id)),
    }
  }

  /// Idempotent cancellation: `true` on the first call, `false` (not an
  /// error) on any repeat or for an unknown id.
  pub async fn cancel_enrollment(&self, id: i64, cancel: &CancelToken) -> Result<bool> {
    ensure_live(cancel)?;
    let deleted = self.store.delete_enrollment(id).await.map_err(Error::store)?;
    if deleted {
      tracing::info!(enrollment_id = id, "enrollment cancelled");
    }
    Ok(deleted)
  }

  /// Roster listing with participant info; scoped to one event when
  /// `event_id` is given, system-wide otherwise.
  pub async fn list_enrollments(
    &self,
    event_id: Option<i64>,
    cancel: &CancelToken,
  ) -> Result<Vec<EnrollmentView>> {
    ensure_live(cancel)?;
    let rows = self
      .store
      .list_enrollments(event_id)
      .await
      .map_err(Error::store)?;

    Ok(
      rows
        .into_iter()
        .map(|(enrollment, participant)| {
          EnrollmentView::assemble(enrollment, participant)
        })
        .collect(),
    )
  }

  pub async fn get_enrollment(&self, id: i64, cancel: &CancelToken) -> Result<EnrollmentView> {
    ensure_live(cancel)?;
    let enrollment = self
      .store
      .get_enrollment(id)
      .await
      .map_err(Error::store)?
      .ok_or(Error::EnrollmentNotFound(id))?;

    let participant = self
      .store
      .get_participant(enrollment.participant_id)
      .await
      .map_err(Error::store)?
      .ok_or(Error::ParticipantNotFound(enrollment.participant_id))?;

    Ok(EnrollmentView::assemble(enrollment, participant))
  }
}
