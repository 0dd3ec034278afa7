//! Per-table mutual exclusion
//!
//! A reservation request holds its table's guard for the whole read-decide-write sequence,
//! including both availability store calls. Requests for different tables never contend.
//! Each map entry counts the holders and waiters registered on it; the last one to leave,
//! whether it held the lock or gave up waiting, removes the entry.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};
use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};

struct Slot {
    lock: Arc<AsyncMutex<()>>,
    users: usize,
}

type LockMap = HashMap<String, Slot>;

#[derive(Clone, Default)]
pub struct TableLocks {
    locks: Arc<Mutex<LockMap>>,
}

/// Holder or waiter registered on a table's slot. Dropping it deregisters.
struct Registration {
    table_id: String,
    locks: Arc<Mutex<LockMap>>,
}

impl Drop for Registration {
    fn drop(&mut self) {
        let mut locks = self.locks.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(slot) = locks.get_mut(&self.table_id) {
            slot.users -= 1;
            if slot.users == 0 {
                locks.remove(&self.table_id);
            }
        }
    }
}

/// Exclusive hold on one table. Released on drop.
pub struct TableGuard {
    // Field order matters: unlock before deregistering.
    _guard: OwnedMutexGuard<()>,
    registration: Registration,
}

impl TableLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wait for exclusive access to `table_id`. Cancelling the wait leaves no entry behind.
    pub async fn acquire(&self, table_id: &str) -> TableGuard {
        let (lock, registration) = {
            let mut locks = self.locks.lock().unwrap_or_else(PoisonError::into_inner);
            let slot = locks.entry(table_id.to_string()).or_insert_with(|| Slot {
                lock: Arc::new(AsyncMutex::new(())),
                users: 0,
            });
            slot.users += 1;
            let registration = Registration {
                table_id: table_id.to_string(),
                locks: self.locks.clone(),
            };
            (slot.lock.clone(), registration)
        };

        TableGuard {
            _guard: lock.lock_owned().await,
            registration,
        }
    }

    /// Tables with a live lock entry (held or awaited)
    pub fn active(&self) -> usize {
        self.locks
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}

impl TableGuard {
    pub fn table_id(&self) -> &str {
        &self.registration.table_id
    }
}
