//! Per-athlete leases that serialise generation requests for the same
//! athlete within one process.

use std::{
  collections::HashMap,
  sync::{Arc, Mutex, PoisonError},
};

use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};

type Slots = HashMap<String, Arc<AsyncMutex<()>>>;

/// Registry of per-athlete locks. Cloning shares the registry.
///
/// Entries exist only while someone holds or waits for a lease, so the map
/// does not grow with the number of athletes ever seen.
#[derive(Debug, Clone, Default)]
pub struct EntityLocks {
  slots: Arc<Mutex<Slots>>,
}

/// Exclusive hold on one athlete. Released on drop.
#[derive(Debug)]
pub struct EntityLease {
  guard:     Option<OwnedMutexGuard<()>>,
  entity_id: String,
  slots:     Arc<Mutex<Slots>>,
}

impl EntityLocks {
  pub fn new() -> Self { Self::default() }

  /// Wait until no other lease for `entity_id` is held, then take it.
  pub async fn acquire(&self, entity_id: &str) -> EntityLease {
    let slot = {
      let mut slots = self.slots.lock().unwrap_or_else(PoisonError::into_inner);
      slots.entry(entity_id.to_owned()).or_default().clone()
    };
    let guard = slot.lock_owned().await;
    EntityLease {
      guard:     Some(guard),
      entity_id: entity_id.to_owned(),
      slots:     self.slots.clone(),
    }
  }

  /// Number of athletes with a live lease or waiter.
  pub fn active(&self) -> usize {
    self.slots.lock().unwrap_or_else(PoisonError::into_inner).len()
  }
}

impl Drop for EntityLease {
  fn drop(&mut self) {
    drop(self.guard.take());

    // Waiters clone the slot under the registry lock, so a count of one
    // here means the registry holds the only reference.
    let mut slots = self.slots.lock().unwrap_or_else(PoisonError::into_inner);
    if slots.get(&self.entity_id).is_some_and(|slot| Arc::strong_count(slot) == 1) {
      slots.remove(&self.entity_id);
    }
  }
}
