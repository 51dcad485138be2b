use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use chrono::NaiveDate;
use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};
use tracing::debug;
use uuid::Uuid;

type LockKey = (Uuid, NaiveDate);

/// One async mutex per (doctor, date). The overlap check and the insert of a
/// booking run while holding it, so two requests in this process can never
/// both admit overlapping intervals for the same doctor and day.
#[derive(Default)]
pub struct SchedulingLocks {
    slots: Mutex<HashMap<LockKey, Arc<AsyncMutex<()>>>>,
}

impl SchedulingLocks {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn acquire(&self, doctor_id: Uuid, date: NaiveDate) -> OwnedMutexGuard<()> {
        let lock = {
            let mut slots = self.slots.lock().unwrap_or_else(PoisonError::into_inner);
            // Entries nobody holds or waits on are dropped.
            slots.retain(|_, lock| Arc::strong_count(lock) > 1);
            Arc::clone(slots.entry((doctor_id, date)).or_default())
        };

        debug!("Waiting for scheduling lock on doctor {} / {}", doctor_id, date);
        lock.lock_owned().await
    }

    pub fn tracked_keys(&self) -> usize {
        self.slots.lock().unwrap_or_else(PoisonError::into_inner).len()
    }
}
