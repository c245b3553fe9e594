//! The Gather engine: availability computation, enrollment admission
//! control, image caching, and query orchestration.
//!
//! Services are generic over the store traits in [`gather_core::store`];
//! any backend works. Every operation takes a
//! [`CancelToken`](gather_core::cancel::CancelToken) and stops before its
//! next write once the token fires.

pub mod cache;
pub mod enrollments;
pub mod events;
pub mod participants;

pub use cache::{CachePolicy, ImageCache};
pub use enrollments::{EnrollmentRequest, EnrollmentService};
pub use events::{EventListing, EventService, ListEventsRequest};
pub use participants::ParticipantService;

use gather_core::{Error, Result, cancel::CancelToken};

/// Bail out with [`Error::Cancelled`] once the token has fired. Called on
/// entry to every operation and again immediately before each write.
pub(crate) fn ensure_live(cancel: &CancelToken) -> Result<()> {
  if cancel.is_cancelled() {
    Err(Error::Cancelled)
  } else {
    Ok(())
  }
}
