//! The engine error taxonomy.
//!
//! Business-rule rejections carry a human-readable display message (the
//! `Display` impl — boundary clients render it as-is) plus a machine-checkable
//! [`Error::kind`] discriminant. Infrastructure failures are wrapped in
//! [`Error::Store`] and propagated untouched; retry policy belongs to the
//! boundary collaborator, not to this engine.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A single field-level validation failure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldError {
  pub field:   String,
  pub message: String,
}

#[derive(Debug, Error)]
pub enum Error {
  /// Client-correctable input problems, one entry per offending field.
  #[error("validation failed: {}", format_fields(.0))]
  Validation(Vec<FieldError>),

  #[error("event {0} not found")]
  EventNotFound(i64),

  #[error("enrollment {0} not found")]
  EnrollmentNotFound(i64),

  #[error("participant {0} not found")]
  ParticipantNotFound(i64),

  /// The referential gap between the identity subsystem and the participant
  /// table: the account exists but no profile was ever registered for it.
  #[error("no participant profile is registered for account {0:?}")]
  AccountNotRegistered(String),

  #[error("you are already enrolled in this event")]
  AlreadyEnrolled,

  /// The caller withdrew the operation before it completed. Never reported
  /// as a success or as a validation failure.
  #[error("the operation was cancelled")]
  Cancelled,

  /// Transient infrastructure failure from the store or cache.
  #[error("store error: {0}")]
  Store(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl Error {
  /// Wrap an arbitrary backend error.
  pub fn store<E>(e: E) -> Self
  where
    E: std::error::Error + Send + Sync + 'static,
  {
    Self::Store(Box::new(e))
  }

  /// Stable discriminant for boundary clients that switch on the error
  /// rather than parsing the display message.
  pub fn kind(&self) -> &'static str {
    match self {
      Self::Validation(_) => "validation_failed",
      Self::EventNotFound(_) | Self::EnrollmentNotFound(_) => "not_found",
      Self::ParticipantNotFound(_) | Self::AccountNotRegistered(_) => {
        "participant_not_found"
      }
      Self::AlreadyEnrolled => "already_enrolled",
      Self::Cancelled => "cancelled",
      Self::Store(_) => "infrastructure",
    }
  }

  /// The field-level entries of a validation failure, if any.
  pub fn field_errors(&self) -> Option<&[FieldError]> {
    match self {
      Self::Validation(fields) => Some(fields),
      _ => None,
    }
  }
}

impl From<validator::ValidationErrors> for Error {
  fn from(errors: validator::ValidationErrors) -> Self {
    let mut fields: Vec<FieldError> = errors
      .field_errors()
      .iter()
      .flat_map(|(field, errs)| {
        errs.iter().map(move |e| FieldError {
          field:   field.to_string(),
          message: e
            .message
            .as_ref()
            .map(|m| m.to_string())
            .unwrap_or_else(|| e.code.to_string()),
        })
      })
      .collect();
    // HashMap iteration order is unstable; keep the output deterministic.
    fields.sort_by(|a, b| a.field.cmp(&b.field));
    Self::Validation(fields)
  }
}

fn format_fields(fields: &[FieldError]) -> String {
  fields
    .iter()
    .map(|f| format!("{}: {}", f.field, f.message))
    .collect::<Vec<_>>()
    .join("; ")
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
