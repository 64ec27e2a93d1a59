//! The snapshot store contract (§4.D) and its in-memory default, built
//! the way `csa-lock` gives each resource its own mutual exclusion —
//! applied here to an in-process map instead of `flock`'d files.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use chrono::{DateTime, Utc};

use crate::snapshot::{Snapshot, SnapshotStatus};

/// `save`/`findById`/`remove`/`findExpired`/`updateStatus`/
/// `compareAndSetStatus` (§4.D). The store is pluggable; no assumptions
/// beyond this contract are made by the orchestrator.
pub trait ExecutionStore: Send + Sync {
    fn save(&self, snapshot: Snapshot);
    fn find_by_id(&self, id: &str) -> Option<Snapshot>;
    fn remove(&self, id: &str);
    /// Only `ACTIVE` snapshots with `createdAt < before` (§4.D).
    fn find_expired(&self, before: DateTime<Utc>) -> Vec<Snapshot>;
    fn update_status(&self, id: &str, new_status: SnapshotStatus) -> bool;
    /// Atomic; used to prevent double-resume (§4.D, §4.F step "resume" 2).
    fn compare_and_set_status(&self, id: &str, expected: SnapshotStatus, new: SnapshotStatus) -> bool;
}

/// Outer mutex serializes structural changes (insert/remove); the
/// per-entry `Arc<Mutex<_>>` gives per-id mutual exclusion for status
/// transitions, so a CAS on one execution never blocks on another's.
#[derive(Default)]
pub struct InMemoryExecutionStore {
    snapshots: Mutex<HashMap<String, Arc<Mutex<Snapshot>>>>,
}

impl InMemoryExecutionStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn entry(&self, id: &str) -> Option<Arc<Mutex<Snapshot>>> {
        self.snapshots.lock().unwrap().get(id).cloned()
    }
}

impl ExecutionStore for InMemoryExecutionStore {
    fn save(&self, snapshot: Snapshot) {
        let mut snapshots = self.snapshots.lock().unwrap();
        snapshots.insert(snapshot.execution_id.clone(), Arc::new(Mutex::new(snapshot)));
    }

    fn find_by_id(&self, id: &str) -> Option<Snapshot> {
        let entry = self.entry(id)?;
        let guard = entry.lock().unwrap();
        Some(guard.clone())
    }

    fn remove(&self, id: &str) {
        self.snapshots.lock().unwrap().remove(id);
    }

    fn find_expired(&self, before: DateTime<Utc>) -> Vec<Snapshot> {
        let snapshots = self.snapshots.lock().unwrap();
        snapshots
            .values()
            .filter_map(|entry| {
                let guard = entry.lock().unwrap();
                if guard.status == SnapshotStatus::Active && guard.created_at < before {
                    Some(guard.clone())
                } else {
                    None
                }
            })
            .collect()
    }

    fn update_status(&self, id: &str, new_status: SnapshotStatus) -> bool {
        let Some(entry) = self.entry(id) else {
            return false;
        };
        let mut guard = entry.lock().unwrap();
        guard.status = new_status;
        true
    }

    fn compare_and_set_status(&self, id: &str, expected: SnapshotStatus, new: SnapshotStatus) -> bool {
        let Some(entry) = self.entry(id) else {
            return false;
        };
        let mut guard = entry.lock().unwrap();
        if guard.status == expected {
            guard.status = new;
            true
        } else {
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use skillrt_core::types::{AwaitRequest, FieldMap};
    use std::collections::BTreeMap;

    use crate::context::ExecutionContext;

    fn snapshot_at(created_at: DateTime<Utc>) -> Snapshot {
        let ctx = ExecutionContext::new(BTreeMap::new());
        Snapshot::new(
            "skill",
            "1.0.0",
            0,
            AwaitRequest {
                message: "m".to_string(),
                input_schema: FieldMap::new(),
            },
            created_at,
            &ctx,
        )
    }

    #[test]
    fn save_then_find_round_trips() {
        let store = InMemoryExecutionStore::new();
        let snapshot = snapshot_at(Utc::now());
        let id = snapshot.execution_id.clone();
        store.save(snapshot);
        assert!(store.find_by_id(&id).is_some());
        assert!(store.find_by_id("missing").is_none());
    }

    #[test]
    fn compare_and_set_prevents_double_resume() {
        let store = InMemoryExecutionStore::new();
        let snapshot = snapshot_at(Utc::now());
        let id = snapshot.execution_id.clone();
        store.save(snapshot);

        assert!(store.compare_and_set_status(&id, SnapshotStatus::Active, SnapshotStatus::Resumed));
        assert!(!store.compare_and_set_status(&id, SnapshotStatus::Active, SnapshotStatus::Resumed));
        assert_eq!(store.find_by_id(&id).unwrap().status, SnapshotStatus::Resumed);
    }

    #[test]
    fn find_expired_only_returns_active_past_cutoff() {
        let store = InMemoryExecutionStore::new();
        let old = snapshot_at(Utc::now() - Duration::hours(2));
        let old_id = old.execution_id.clone();
        let fresh = snapshot_at(Utc::now());
        store.save(old);
        store.save(fresh);

        let expired = store.find_expired(Utc::now() - Duration::hours(1));
        assert_eq!(expired.len(), 1);
        assert_eq!(expired[0].execution_id, old_id);
    }

    #[test]
    fn expired_snapshot_not_returned_once_resumed() {
        let store = InMemoryExecutionStore::new();
        let old = snapshot_at(Utc::now() - Duration::hours(2));
        let id = old.execution_id.clone();
        store.save(old);
        store.update_status(&id, SnapshotStatus::Resumed);

        let expired = store.find_expired(Utc::now());
        assert!(expired.is_empty());
    }

    #[test]
    fn remove_deletes_entry() {
        let store = InMemoryExecutionStore::new();
        let snapshot = snapshot_at(Utc::now());
        let id = snapshot.execution_id.clone();
        store.save(snapshot);
        store.remove(&id);
        assert!(store.find_by_id(&id).is_none());
    }
}
