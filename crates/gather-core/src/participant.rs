//! Participant — the domain profile tied to an authenticated account.
//!
//! Account creation and token issuance live in the identity subsystem; this
//! crate only references accounts by their external identifier.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use validator::Validate;

/// A persisted participant profile. `id` is assigned by the store.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Participant {
  pub id:            i64,
  pub first_name:    String,
  pub last_name:     String,
  pub date_of_birth: NaiveDate,
  pub email:         String,
  /// External user-account identifier; unique per participant.
  pub account_id:    String,
}

/// Input to [`crate::store::ParticipantStore::create_participant`].
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct NewParticipant {
  #[validate(length(min = 1, message = "first name is required"))]
  pub first_name:    String,
  #[validate(length(min = 1, message = "last name is required"))]
  pub last_name:     String,
  pub date_of_birth: NaiveDate,
  #[validate(email(message = "email address is not valid"))]
  pub email:         String,
  #[validate(length(min = 1, message = "account id is required"))]
  pub account_id:    String,
}

/// Partial profile update; present fields are written, absent fields are
/// left untouched. The account reference is immutable.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct ParticipantPatch {
  #[validate(length(min = 1, message = "first name is required"))]
  pub first_name:    Option<String>,
  #[validate(length(min = 1, message = "last name is required"))]
  pub last_name:     Option<String>,
  pub date_of_birth: Option<NaiveDate>,
  #[validate(email(message = "email address is not valid"))]
  pub email:         Option<String>,
}

impl ParticipantPatch {
  pub fn is_empty(&self) -> bool {
    self.first_name.is_none()
      && self.last_name.is_none()
      && self.date_of_birth.is_none()
      && self.email.is_none()
  }

  pub fn apply(&self, participant: &mut Participant) {
    if let Some(first_name) = &self.first_name {
      participant.first_name = first_name.clone();
    }
    if let Some(last_name) = &self.last_name {
      participant.last_name = last_name.clone();
    }
    if let Some(date_of_birth) = self.date_of_birth {
      participant.date_of_birth = date_of_birth;
    }
    if let Some(email) = &self.email {
      participant.email = email.clone();
    }
  }
}

/// Outcome of a participant insert; `account_id` carries a uniqueness
/// constraint, reported as a typed variant rather than a generic error.
#[derive(Debug, Clone)]
pub enum ParticipantInsert {
  Created(Participant),
  /// A profile already exists for this account identifier.
  DuplicateAccount,
}
