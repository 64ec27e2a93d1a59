//! The error envelope returned at the orchestrator boundary (§6).

use std::collections::BTreeMap;

use skillrt_core::types::{AwaitRequest, StepResult};
use skillrt_core::Value;

/// `{success, awaiting, executionId?, output?, error?, stepResults[],
/// totalDurationMs}` (§6). `awaiting` and `success` are never both true.
#[derive(Clone, Debug, PartialEq)]
pub struct SkillResult {
    pub success: bool,
    pub awaiting: bool,
    pub execution_id: Option<String>,
    pub output: Option<BTreeMap<String, Value>>,
    pub await_request: Option<AwaitRequest>,
    pub error: Option<String>,
    pub step_results: Vec<StepResult>,
    pub total_duration_ms: u64,
}

impl SkillResult {
    pub fn success(execution_id: String, output: BTreeMap<String, Value>, step_results: Vec<StepResult>, total_duration_ms: u64) -> Self {
        Self {
            success: true,
            awaiting: false,
            execution_id: Some(execution_id),
            output: Some(output),
            await_request: None,
            error: None,
            step_results,
            total_duration_ms,
        }
    }

    pub fn failed(execution_id: String, error: impl Into<String>, step_results: Vec<StepResult>, total_duration_ms: u64) -> Self {
        Self {
            success: false,
            awaiting: false,
            execution_id: Some(execution_id),
            output: None,
            await_request: None,
            error: Some(error.into()),
            step_results,
            total_duration_ms,
        }
    }

    pub fn awaiting(execution_id: String, await_request: AwaitRequest, step_results: Vec<StepResult>, total_duration_ms: u64) -> Self {
        Self {
            success: false,
            awaiting: true,
            execution_id: Some(execution_id),
            output: None,
            await_request: Some(await_request),
            error: None,
            step_results,
            total_duration_ms,
        }
    }

    /// For failures that never got as far as minting an `executionId`
    /// (`EXECUTION_NOT_FOUND`, a malformed `resume` call).
    pub fn failed_without_execution(error: impl Into<String>) -> Self {
        Self {
            success: false,
            awaiting: false,
            execution_id: None,
            output: None,
            await_request: None,
            error: Some(error.into()),
            step_results: Vec::new(),
            total_duration_ms: 0,
        }
    }
}
