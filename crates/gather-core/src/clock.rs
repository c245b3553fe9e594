//! Time source abstraction.
//!
//! Status computation takes `now` as an explicit argument; the services
//! obtain it from an injected [`Clock`] so tests control time directly
//! instead of mocking the ambient clock.

use chrono::{DateTime, Utc};

pub trait Clock: Send + Sync {
  fn now(&self) -> DateTime<Utc>;
}

/// The production clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
  fn now(&self) -> DateTime<Utc> {
    Utc::now()
  }
}
