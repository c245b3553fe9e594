//! Derived event availability.
//!
//! Status is computed on read from the scheduled date and the live
//! enrollment count; it is never persisted and never cached. `now` is always
//! an explicit argument so the computation stays pure and testable.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::event::Event;

/// Availability classification of an event at a given instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventStatus {
  /// Open for registration.
  Relevant,
  /// The enrollment count has reached capacity.
  NoPlaces,
  /// The scheduled date is in the past.
  Passed,
}

impl EventStatus {
  /// Strict precedence: a passed event is never reported as full or open,
  /// regardless of its enrollment count.
  pub fn compute(
    date: DateTime<Utc>,
    max_participants: u32,
    enrollment_count: u32,
    now: DateTime<Utc>,
  ) -> Self {
    if date < now {
      Self::Passed
    } else if enrollment_count >= max_participants {
      Self::NoPlaces
    } else {
      Self::Relevant
    }
  }

  pub fn is_passed(&self) -> bool {
    matches!(self, Self::Passed)
  }
}

impl Event {
  /// The event's status at `now`, given the live enrollment count.
  pub fn status_at(&self, enrollment_count: u32, now: DateTime<Utc>) -> EventStatus {
    EventStatus::compute(self.date, self.max_participants, enrollment_count, now)
  }
}
