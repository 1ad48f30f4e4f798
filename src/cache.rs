//! Single-slot TTL caches for global read snapshots.
use std::sync::{Mutex, PoisonError};
use std::time::{Duration, Instant};

/// Holds at most one value; a read within `ttl` of the last store returns a
/// clone, anything older is treated as absent. Writes through the gateway
/// clear the slot outright so the next read re-fetches.
#[derive(Debug)]
pub struct Cache<T> {
    ttl: Duration,
    slot: Mutex<Option<Entry<T>>>,
}

#[derive(Debug)]
struct Entry<T> {
    stored_at: Instant,
    value: T,
}

impl<T: Clone> Cache<T> {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            slot: Mutex::new(None),
        }
    }

    pub fn get(&self) -> Option<T> {
        let slot = self.slot.lock().unwrap_or_else(PoisonError::into_inner);
        slot.as_ref()
            .filter(|e| e.stored_at.elapsed() <= self.ttl)
            .map(|e| e.value.clone())
    }

    pub fn store(&self, value: T) {
        let mut slot = self.slot.lock().unwrap_or_else(PoisonError::into_inner);
        *slot = Some(Entry {
            stored_at: Instant::now(),
            value,
        });
    }

    pub fn clear(&self) {
        let mut slot = self.slot.lock().unwrap_or_else(PoisonError::into_inner);
        *slot = None;
    }
}
