//! Encoding and decoding helpers between Rust domain types and the
//! plain-text representations stored in SQLite columns.
//!
//! Timestamps are stored as RFC 3339 strings, always in UTC with a fixed
//! `+00:00` offset, so SQL comparison and ordering on the column are
//! chronological. Calendar dates are stored as `YYYY-MM-DD`.

use chrono::{DateTime, NaiveDate, Utc};
use gather_core::{
  enrollment::Enrollment, event::Event, participant::Participant,
};

use crate::{Error, Result};

// ─── DateTime<Utc> ───────────────────────────────────────────────────────────

pub fn encode_dt(dt: DateTime<Utc>) -> String {
  dt.to_rfc3339()
}

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::Decode(e.to_string()))
}

// ─── NaiveDate ───────────────────────────────────────────────────────────────

pub fn encode_date(d: NaiveDate) -> String {
  d.format("%Y-%m-%d").to_string()
}

pub fn decode_date(s: &str) -> Result<NaiveDate> {
  NaiveDate::parse_from_str(s, "%Y-%m-%d")
    .map_err(|e| Error::Decode(e.to_string()))
}

// ─── Row types ───────────────────────────────────────────────────────────────

/// Raw values read directly from an `events` row. The image blob is never
/// part of row reads; it has its own query.
pub struct RawEvent {
  pub event_id:         i64,
  pub name:             String,
  pub description:      String,
  pub date:             String,
  pub location:         String,
  pub category:         String,
  pub max_participants: i64,
}

impl RawEvent {
  pub fn into_event(self) -> Result<Event> {
    let max_participants = u32::try_from(self.max_participants)
      .map_err(|_| Error::Decode(format!(
        "max_participants out of range: {}",
        self.max_participants
      )))?;

    Ok(Event {
      id: self.event_id,
      name: self.name,
      description: self.description,
      date: decode_dt(&self.date)?,
      location: self.location,
      category: self.category,
      max_participants,
    })
  }
}

/// Raw values read directly from an `enrollments` row.
pub struct RawEnrollment {
  pub enrollment_id:  i64,
  pub event_id:       i64,
  pub participant_id: i64,
  pub registered_at:  String,
}

impl RawEnrollment {
  pub fn into_enrollment(self) -> Result<Enrollment> {
    Ok(Enrollment {
      id:             self.enrollment_id,
      event_id:       self.event_id,
      participant_id: self.participant_id,
      registered_at:  decode_dt(&self.registered_at)?,
    })
  }
}

/// Raw values read directly from a `participants` row.
pub struct RawParticipant {
  pub participant_id: i64,
  pub first_name:     String,
  pub last_name:      String,
  pub date_of_birth:  String,
  pub email:          String,
  pub account_id:     String,
}

impl RawParticipant {
  pub fn into_participant(self) -> Result<Participant> {
    Ok(Participant {
      id:            self.participant_id,
      first_name:    self.first_name,
      last_name:     self.last_name,
      date_of_birth: decode_date(&self.date_of_birth)?,
      email:         self.email,
      account_id:    self.account_id,
    })
  }
}
