//! API error type and [`axum::response::IntoResponse`] implementation.
//!
//! Every error body is JSON with the human-readable display message and the
//! machine-checkable kind; validation failures also carry the field list.

use axum::{
  Json,
  http::StatusCode,
  response::{IntoResponse, Response},
};
use serde_json::json;

use gather_core::Error;

/// An engine error surfaced over HTTP.
#[derive(Debug)]
pub struct ApiError(pub Error);

impl From<Error> for ApiError {
  fn from(e: Error) -> Self {
    Self(e)
  }
}

impl IntoResponse for ApiError {
  fn into_response(self) -> Response {
    let status = match &self.0 {
      Error::Validation(_) => StatusCode::BAD_REQUEST,
      Error::EventNotFound(_)
      | Error::EnrollmentNotFound(_)
      | Error::ParticipantNotFound(_)
      | Error::AccountNotRegistered(_) => StatusCode::NOT_FOUND,
      Error::AlreadyEnrolled => StatusCode::CONFLICT,
      Error::Cancelled => StatusCode::SERVICE_UNAVAILABLE,
      Error::Store(e) => {
        tracing::error!(error = %e, "store failure");
        StatusCode::INTERNAL_SERVER_ERROR
      }
    };

    let mut body = json!({
      "error": self.0.to_string(),
      "kind":  self.0.kind(),
    });
    if let Some(fields) = self.0.field_errors() {
      body["fields"] = json!(fields);
    }

    (status, Json(body)).into_response()
  }
}
