//! Per-execution state (§3, §4.D): `ExecutionContext`, the `Snapshot`
//! frozen at an `await` suspension, and the pluggable `ExecutionStore`.

pub mod context;
pub mod snapshot;
pub mod store;

pub use context::{new_execution_id, ExecutionContext};
pub use snapshot::{Snapshot, SnapshotStatus};
pub use store::{ExecutionStore, InMemoryExecutionStore};
