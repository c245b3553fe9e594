//! Computed read models — assembled on read, never stored.
//!
//! Each view bundles persisted fields with state derived at query time: the
//! freshly computed [`EventStatus`] and, for single-event views, the cached
//! image blob.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::{
  enrollment::Enrollment, event::Event, participant::Participant,
  status::EventStatus,
};

/// An event as returned to clients: persisted fields, cached/loaded image,
/// and the status computed for this request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventView {
  pub id:               i64,
  pub name:             String,
  pub description:      String,
  pub date:             DateTime<Utc>,
  pub location:         String,
  pub category:         String,
  pub max_participants: u32,
  #[serde(default, with = "crate::b64")]
  pub image:            Option<Vec<u8>>,
  pub status:           EventStatus,
}

impl EventView {
  pub fn assemble(
    event: Event,
    image: Option<Vec<u8>>,
    status: EventStatus,
  ) -> Self {
    Self {
      id: event.id,
      name: event.name,
      description: event.description,
      date: event.date,
      location: event.location,
      category: event.category,
      max_participants: event.max_participants,
      image,
      status,
    }
  }
}

/// A caller's registration joined with its event. No image — registration
/// listings stay light.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnrolledEventView {
  pub enrollment_id:    i64,
  pub event_id:         i64,
  pub name:             String,
  pub description:      String,
  pub date:             DateTime<Utc>,
  pub location:         String,
  pub category:         String,
  pub max_participants: u32,
  pub status:           EventStatus,
  pub registered_at:    DateTime<Utc>,
}

impl EnrolledEventView {
  pub fn assemble(
    event: Event,
    enrollment: Enrollment,
    status: EventStatus,
  ) -> Self {
    Self {
      enrollment_id: enrollment.id,
      event_id: event.id,
      name: event.name,
      description: event.description,
      date: event.date,
      location: event.location,
      category: event.category,
      max_participants: event.max_participants,
      status,
      registered_at: enrollment.registered_at,
    }
  }
}

/// A roster entry: the enrolled participant plus their registration record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnrollmentView {
  pub enrollment_id:  i64,
  pub event_id:       i64,
  pub participant_id: i64,
  pub first_name:     String,
  pub last_name:      String,
  pub date_of_birth:  NaiveDate,
  pub email:          String,
  pub account_id:     String,
  pub registered_at:  DateTime<Utc>,
}

impl EnrollmentView {
  pub fn assemble(enrollment: Enrollment, participant: Participant) -> Self {
    Self {
      enrollment_id:  enrollment.id,
      event_id:       enrollment.event_id,
      participant_id: participant.id,
      first_name:     participant.first_name,
      last_name:      participant.last_name,
      date_of_birth:  participant.date_of_birth,
      email:          participant.email,
      account_id:     participant.account_id,
      registered_at:  enrollment.registered_at,
    }
  }
}
