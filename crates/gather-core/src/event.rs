//! Event — the schedulable activity at the centre of the domain.
//!
//! An event row never stores derived state: availability is computed on read
//! (see [`crate::status`]) and the image blob is fetched separately through
//! [`crate::store::EventStore::event_image`] so listing queries stay cheap.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

/// A persisted event. `id` is assigned by the store.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Event {
  pub id:               i64,
  pub name:             String,
  pub description:      String,
  /// Scheduled start, UTC.
  pub date:             DateTime<Utc>,
  pub location:         String,
  pub category:         String,
  pub max_participants: u32,
}

/// Input to [`crate::store::EventStore::create_event`].
///
/// The date-not-in-the-past rule is enforced by the service (it needs a
/// clock); everything else is declared here.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct NewEvent {
  #[validate(length(min = 1, max = 70, message = "name must be between 1 and 70 characters"))]
  pub name:             String,
  #[validate(length(min = 1, message = "description is required"))]
  pub description:      String,
  pub date:             DateTime<Utc>,
  #[validate(length(min = 1, max = 70, message = "location must be between 1 and 70 characters"))]
  pub location:         String,
  #[validate(length(min = 1, max = 50, message = "category must be between 1 and 50 characters"))]
  pub category:         String,
  #[validate(range(min = 1, max = 3000, message = "capacity must be between 1 and 3000"))]
  pub max_participants: u32,
  #[serde(default, with = "crate::b64")]
  pub image:            Option<Vec<u8>>,
}

/// Partial update for an event. A field is written iff it is present; an
/// absent field leaves the stored value untouched, so legitimate empty or
/// zero values can never be dropped by accident.
///
/// A patch can replace the image but not clear it.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct EventPatch {
  #[validate(length(min = 1, max = 70, message = "name must be between 1 and 70 characters"))]
  pub name:             Option<String>,
  #[validate(length(min = 1, message = "description is required"))]
  pub description:      Option<String>,
  pub date:             Option<DateTime<Utc>>,
  #[validate(length(min = 1, max = 70, message = "location must be between 1 and 70 characters"))]
  pub location:         Option<String>,
  #[validate(length(min = 1, max = 50, message = "category must be between 1 and 50 characters"))]
  pub category:         Option<String>,
  #[validate(range(min = 1, max = 3000, message = "capacity must be between 1 and 3000"))]
  pub max_participants: Option<u32>,
  #[serde(default, with = "crate::b64")]
  pub image:            Option<Vec<u8>>,
}

impl EventPatch {
  pub fn is_empty(&self) -> bool {
    self.name.is_none()
      && self.description.is_none()
      && self.date.is_none()
      && self.location.is_none()
      && self.category.is_none()
      && self.max_participants.is_none()
      && self.image.is_none()
  }

  /// Overwrite `event` with every scalar field present in the patch. The
  /// image is not part of [`Event`]; stores apply it to the blob column
  /// directly.
  pub fn apply(&self, event: &mut Event) {
    if let Some(name) = &self.name {
      event.name = name.clone();
    }
    if let Some(description) = &self.description {
      event.description = description.clone();
    }
    if let Some(date) = self.date {
      event.date = date;
    }
    if let Some(location) = &self.location {
      event.location = location.clone();
    }
    if let Some(category) = &self.category {
      event.category = category.clone();
    }
    if let Some(max) = self.max_participants {
      event.max_participants = max;
    }
  }
}
