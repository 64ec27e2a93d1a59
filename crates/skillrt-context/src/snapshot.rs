//! The frozen execution state persisted across an `await` suspension
//! (§3, §4.D).

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use skillrt_core::types::{AwaitRequest, StepResult};
use skillrt_core::Value;

use crate::context::ExecutionContext;

/// `status` transitions form a DAG with sinks `{Resumed, Expired,
/// Cancelled}`; `Active → *` is the only outgoing transition from the
/// initial state (§3 invariant).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SnapshotStatus {
    Active,
    Resumed,
    Expired,
    Cancelled,
}

impl SnapshotStatus {
    /// Only `ACTIVE` snapshots are resumable (§3).
    pub fn is_resumable(self) -> bool {
        matches!(self, SnapshotStatus::Active)
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
struct ContextRecord {
    execution_id: String,
    input: BTreeMap<String, Value>,
    step_results: Vec<StepResult>,
    await_inputs: Vec<(String, BTreeMap<String, Value>)>,
}

impl From<&ExecutionContext> for ContextRecord {
    fn from(ctx: &ExecutionContext) -> Self {
        ContextRecord {
            execution_id: ctx.execution_id().to_string(),
            input: ctx.input().clone(),
            step_results: ctx.step_results().to_vec(),
            await_inputs: ctx.await_inputs().to_vec(),
        }
    }
}

/// `{executionId, skillId+version, currentStepIndex, awaitRequest,
/// createdAt, status, context}` (§3).
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Snapshot {
    pub execution_id: String,
    pub skill_id: String,
    pub skill_version: String,
    pub current_step_index: usize,
    pub await_request: AwaitRequest,
    pub created_at: DateTime<Utc>,
    pub status: SnapshotStatus,
    context: ContextRecord,
}

impl Snapshot {
    pub fn new(
        skill_id: impl Into<String>,
        skill_version: impl Into<String>,
        current_step_index: usize,
        await_request: AwaitRequest,
        created_at: DateTime<Utc>,
        ctx: &ExecutionContext,
    ) -> Self {
        Self {
            execution_id: ctx.execution_id().to_string(),
            skill_id: skill_id.into(),
            skill_version: skill_version.into(),
            current_step_index,
            await_request,
            created_at,
            status: SnapshotStatus::Active,
            context: ContextRecord::from(ctx),
        }
    }

    /// Rehydrate the `ExecutionContext` this snapshot carries.
    pub fn to_context(&self) -> ExecutionContext {
        ExecutionContext::with_id(
            self.context.execution_id.clone(),
            self.context.input.clone(),
            self.context.step_results.clone(),
            self.context.await_inputs.clone(),
        )
    }
}
