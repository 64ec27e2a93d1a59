//! `SkillExecutor`: drives one skill pipeline end to end (§4.F).

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Instant;

use chrono::{DateTime, Utc};

use skillrt_context::{ExecutionContext, ExecutionStore, Snapshot, SnapshotStatus};
use skillrt_core::types::{AwaitRequest, Skill, Step, StepResult, StepStatus};
use skillrt_core::{validate, SkillError, Value};
use skillrt_exec::StepExecutor;

use crate::result::SkillResult;

/// Owns the store and the fixed set of step executors; stateless beyond
/// that — every call takes the `Skill` it's driving.
pub struct SkillExecutor {
    store: Arc<dyn ExecutionStore>,
    executors: Vec<Arc<dyn StepExecutor>>,
}

impl SkillExecutor {
    pub fn new(store: Arc<dyn ExecutionStore>, executors: Vec<Arc<dyn StepExecutor>>) -> Self {
        Self { store, executors }
    }

    fn executor_for(&self, step: &Step) -> Option<&Arc<dyn StepExecutor>> {
        self.executors.iter().find(|e| e.supports(step))
    }

    pub async fn execute(&self, skill: &Skill, input: BTreeMap<String, Value>) -> SkillResult {
        let ctx = ExecutionContext::new(input);
        self.run_from(skill, ctx, 0, Vec::new(), Instant::now()).await
    }

    pub async fn resume(&self, skill: &Skill, execution_id: &str, user_input: BTreeMap<String, Value>) -> SkillResult {
        let start = Instant::now();
        let Some(snapshot) = self.store.find_by_id(execution_id) else {
            return SkillResult::failed_without_execution(SkillError::ExecutionNotFound(execution_id.to_string()).to_string());
        };

        if !self.store.compare_and_set_status(execution_id, SnapshotStatus::Active, SnapshotStatus::Resumed) {
            return SkillResult::failed(
                execution_id.to_string(),
                SkillError::ExecutionAlreadyCompleted {
                    id: execution_id.to_string(),
                    status: format!("{:?}", snapshot.status).to_uppercase(),
                }
                .to_string(),
                Vec::new(),
                0,
            );
        }

        let errors = validate::validate_fields(&snapshot.await_request.input_schema, &user_input);
        if !errors.is_empty() {
            return SkillResult::failed(
                execution_id.to_string(),
                SkillError::AwaitValidation(errors.join("; ")).to_string(),
                Vec::new(),
                start.elapsed().as_millis() as u64,
            );
        }

        let Some(step) = skill.steps.get(snapshot.current_step_index) else {
            return SkillResult::failed(
                execution_id.to_string(),
                SkillError::ExecutionNotFound(format!("step index {} out of range", snapshot.current_step_index)).to_string(),
                Vec::new(),
                start.elapsed().as_millis() as u64,
            );
        };

        let mut ctx = snapshot.to_context();
        let bound = StepResult::success(
            step.name.clone(),
            Some(step.binding_name().to_string()),
            Value::Object(user_input.clone()),
            0,
        );
        ctx.bind_step_result(bound.clone());
        ctx.add_await_input(step.name.clone(), user_input);

        self.run_from(skill, ctx, snapshot.current_step_index + 1, vec![bound], start).await
    }

    pub fn cancel(&self, execution_id: &str) -> bool {
        self.store.compare_and_set_status(execution_id, SnapshotStatus::Active, SnapshotStatus::Cancelled)
    }

    /// Sweeps every `ACTIVE` snapshot older than `before` to `EXPIRED`
    /// (§4.F "Timeouts & cancellation"). Returns the number swept; never
    /// fails, matching §7's "errors within the sweeper are logged and
    /// suppressed" (there's nothing here that can raise).
    pub fn sweep_expired(&self, before: DateTime<Utc>) -> usize {
        let expired = self.store.find_expired(before);
        for snapshot in &expired {
            if !self.store.update_status(&snapshot.execution_id, SnapshotStatus::Expired) {
                tracing::warn!(execution_id = %snapshot.execution_id, "expired snapshot vanished before sweep could mark it");
                continue;
            }
            tracing::info!(execution_id = %snapshot.execution_id, skill_id = %snapshot.skill_id, "execution expired");
        }
        expired.len()
    }

    async fn run_from(
        &self,
        skill: &Skill,
        mut ctx: ExecutionContext,
        start_index: usize,
        mut step_results: Vec<StepResult>,
        total_start: Instant,
    ) -> SkillResult {
        let execution_id = ctx.execution_id().to_string();

        for (index, step) in skill.steps.iter().enumerate().skip(start_index) {
            if let Some(when) = &step.when {
                let expr = match skillrt_condition::parse(when) {
                    Ok(expr) => expr,
                    Err(err) => {
                        step_results.push(StepResult::failed(step.name.as_str(), err.to_string(), 0));
                        return SkillResult::failed(
                            execution_id,
                            err.to_string(),
                            step_results,
                            total_start.elapsed().as_millis() as u64,
                        );
                    }
                };
                if !skillrt_condition::evaluate(&expr, &ctx) {
                    step_results.push(StepResult::skipped(step.name.as_str()));
                    continue;
                }
            }

            let Some(executor) = self.executor_for(step) else {
                let error = format!("no executor registered for step '{}' (kind {})", step.name, step.kind());
                step_results.push(StepResult::failed(step.name.as_str(), error.clone(), 0));
                return SkillResult::failed(execution_id, error, step_results, total_start.elapsed().as_millis() as u64);
            };

            let result = executor.execute(step, &ctx).await;

            match result.status {
                StepStatus::Failed => {
                    let error = result.error.clone().unwrap_or_default();
                    step_results.push(result);
                    return SkillResult::failed(execution_id, error, step_results, total_start.elapsed().as_millis() as u64);
                }
                StepStatus::Awaiting => {
                    let Some(await_request) = AwaitRequest::from_value(&result.output) else {
                        let error = "await step produced a malformed AwaitRequest".to_string();
                        step_results.push(result);
                        return SkillResult::failed(execution_id, error, step_results, total_start.elapsed().as_millis() as u64);
                    };
                    let snapshot = Snapshot::new(skill.id.clone(), skill.version.clone(), index, await_request.clone(), Utc::now(), &ctx);
                    self.store.save(snapshot);
                    step_results.push(result);
                    return SkillResult::awaiting(execution_id, await_request, step_results, total_start.elapsed().as_millis() as u64);
                }
                StepStatus::Success => {
                    let bound = StepResult {
                        var_name: Some(step.binding_name().to_string()),
                        ..result
                    };
                    ctx.bind_step_result(bound.clone());
                    step_results.push(bound);
                }
                StepStatus::Skipped => {
                    // Executors never return SKIPPED themselves; only the
                    // `when` check above produces it.
                    step_results.push(result);
                }
            }
        }

        let scope = ctx.build_variable_scope();
        let errors = validate::validate_fields(&skill.output_contract.fields, &scope);
        if !errors.is_empty() {
            return SkillResult::failed(
                execution_id,
                SkillError::OutputValidation(errors.join("; ")).to_string(),
                step_results,
                total_start.elapsed().as_millis() as u64,
            );
        }

        let output = validate::project_fields(&skill.output_contract.fields, &scope);
        SkillResult::success(execution_id, output, step_results, total_start.elapsed().as_millis() as u64)
    }
}
