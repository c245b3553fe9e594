//! [`ImageCache`] — a process-wide, time-bounded cache for event image
//! blobs.
//!
//! Entries expire on a 30-minute sliding window (reset on each access) or
//! one hour after population, whichever comes first. Writers to different
//! keys never block each other. Writes to the same key are linearized
//! through a per-key generation counter: [`ImageCache::invalidate`] bumps
//! the generation, and a population that loaded under an older generation
//! is discarded instead of resurrecting stale bytes.

use std::{
  future::Future,
  time::{Duration, Instant},
};

use dashmap::DashMap;

/// Expiry policy; injectable so tests can use millisecond windows.
#[derive(Debug, Clone, Copy)]
pub struct CachePolicy {
  /// Entry is stale once this long has elapsed since the last access.
  pub sliding:  Duration,
  /// Entry is stale once this long has elapsed since population,
  /// regardless of accesses.
  pub absolute: Duration,
}

impl Default for CachePolicy {
  fn default() -> Self {
    Self {
      sliding:  Duration::from_secs(30 * 60),
      absolute: Duration::from_secs(60 * 60),
    }
  }
}

struct Entry {
  /// `None` is a cached value: the event has no image. Distinct from the
  /// absence of an entry.
  image:       Option<Vec<u8>>,
  generation:  u64,
  inserted_at: Instant,
  last_access: Instant,
}

pub struct ImageCache {
  entries:     DashMap<i64, Entry>,
  generations: DashMap<i64, u64>,
  policy:      CachePolicy,
}

impl ImageCache {
  pub fn new() -> Self {
    Self::with_policy(CachePolicy::default())
  }

  pub fn with_policy(policy: CachePolicy) -> Self {
    Self {
      entries: DashMap::new(),
      generations: DashMap::new(),
      policy,
    }
  }

  fn generation(&self, event_id: i64) -> u64 {
    self.generations.get(&event_id).map(|g| *g).unwrap_or(0)
  }

  /// Return the cached blob for `event_id`, or invoke `loader` once and
  /// cache its result. Expiry is checked lazily on access.
  ///
  /// The per-key lock is never held across the loader await, so concurrent
  /// callers on other keys proceed freely.
  pub async fn get_or_load<F, Fut, E>(
    &self,
    event_id: i64,
    loader: F,
  ) -> Result<Option<Vec<u8>>, E>
  where
    F: FnOnce() -> Fut,
    Fut: Future<Output = Result<Option<Vec<u8>>, E>>,
  {
    // Read the generation before touching the entry; the reverse order
    // could deadlock against invalidate(), which locks in this order too.
    let generation = self.generation(event_id);

    if let Some(mut entry) = self.entries.get_mut(&event_id) {
      let now = Instant::now();
      let fresh = entry.generation == generation
        && now.duration_since(entry.last_access) < self.policy.sliding
        && now.duration_since(entry.inserted_at) < self.policy.absolute;
      if fresh {
        entry.last_access = now;
        return Ok(entry.image.clone());
      }
    }

    let image = loader().await?;

    // Check-and-set: discard the population if an invalidation landed
    // while the loader ran. The invalidation's data is newer.
    if self.generation(event_id) == generation {
      let now = Instant::now();
      self.entries.insert(event_id, Entry {
        image: image.clone(),
        generation,
        inserted_at: now,
        last_access: now,
      });
    }

    Ok(image)
  }

  /// Drop the entry for `event_id` and fence out any in-flight population.
  /// Called by the event service on every create, update, and delete.
  pub fn invalidate(&self, event_id: i64) {
    *self.generations.entry(event_id).or_insert(0) += 1;
    self.entries.remove(&event_id);
  }

  #[cfg(test)]
  fn contains(&self, event_id: i64) -> bool {
    self.entries.contains_key(&event_id)
  }
}

impl Default for ImageCache {
  fn default() -> Self {
    Self::new()
  }
}
