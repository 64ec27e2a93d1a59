//! `StepExecutor`: `supports`/`execute` per step kind (§4.E).

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Instant;

use async_trait::async_trait;

use skillrt_core::types::{AwaitRequest, Step, StepConfig, StepKind, StepResult};
use skillrt_core::{SkillError, Value};
use skillrt_context::ExecutionContext;

use crate::llm::LLMAdapterRegistry;
use crate::tool::{ToolOutputContext, ToolRegistry};

/// `supports(step) → bool` and `execute(step, ctx) → StepResult` (§4.E).
/// Every executor is pure with respect to the store; only the
/// orchestrator persists snapshots.
#[async_trait]
pub trait StepExecutor: Send + Sync {
    fn supports(&self, step: &Step) -> bool;
    async fn execute(&self, step: &Step, ctx: &ExecutionContext) -> StepResult;
}

fn duration_ms(start: Instant) -> u64 {
    start.elapsed().as_millis() as u64
}

/// Dispatches TOOL steps: looks up the tool by `toolName`, renders
/// `inputTemplate` via the template engine, and hands a
/// [`ToolOutputContext`] to the tool.
pub struct ToolStepExecutor {
    registry: Arc<ToolRegistry>,
}

impl ToolStepExecutor {
    pub fn new(registry: Arc<ToolRegistry>) -> Self {
        Self { registry }
    }
}

#[async_trait]
impl StepExecutor for ToolStepExecutor {
    fn supports(&self, step: &Step) -> bool {
        step.kind() == StepKind::Tool
    }

    async fn execute(&self, step: &Step, ctx: &ExecutionContext) -> StepResult {
        let start = Instant::now();
        let StepConfig::Tool {
            tool_name,
            input_template,
            ..
        } = &step.config
        else {
            unreachable!("ToolStepExecutor only dispatches StepConfig::Tool");
        };

        let Some(tool) = self.registry.find(tool_name) else {
            return StepResult::failed(
                step.name.as_str(),
                SkillError::ToolNotFound(tool_name.clone()).to_string(),
                duration_ms(start),
            );
        };

        let scope = ctx.to_scope();
        let rendered = match skillrt_template::render_inputs(input_template, &scope) {
            Ok(value) => value,
            Err(err) => return StepResult::failed(step.name.as_str(), err.to_string(), duration_ms(start)),
        };
        let input_map = match rendered {
            Value::Object(map) => map,
            other => {
                let mut map = BTreeMap::new();
                map.insert("value".to_string(), other);
                map
            }
        };

        let out = ToolOutputContext::new();
        if let Err(err) = tool.execute(input_map, &out).await {
            return StepResult::failed(
                step.name.as_str(),
                SkillError::ToolExecution(err.to_string()).to_string(),
                duration_ms(start),
            );
        }

        StepResult::success(step.name.as_str(), step.var_name.clone(), out.into_value(), duration_ms(start))
    }
}

/// Dispatches TEMPLATE steps: render the body against the current scope.
pub struct TemplateStepExecutor;

#[async_trait]
impl StepExecutor for TemplateStepExecutor {
    fn supports(&self, step: &Step) -> bool {
        step.kind() == StepKind::Template
    }

    async fn execute(&self, step: &Step, ctx: &ExecutionContext) -> StepResult {
        let start = Instant::now();
        let StepConfig::Template { body } = &step.config else {
            unreachable!("TemplateStepExecutor only dispatches StepConfig::Template");
        };
        let scope = ctx.to_scope();
        match skillrt_template::render(body, &scope) {
            Ok(rendered) => StepResult::success(
                step.name.as_str(),
                step.var_name.clone(),
                Value::String(rendered),
                duration_ms(start),
            ),
            Err(err) => StepResult::failed(step.name.as_str(), err.to_string(), duration_ms(start)),
        }
    }
}

/// Dispatches PROMPT steps: render the body, then call the active
/// `LLMAdapter`.
pub struct PromptStepExecutor {
    adapters: Arc<LLMAdapterRegistry>,
}

impl PromptStepExecutor {
    pub fn new(adapters: Arc<LLMAdapterRegistry>) -> Self {
        Self { adapters }
    }
}

#[async_trait]
impl StepExecutor for PromptStepExecutor {
    fn supports(&self, step: &Step) -> bool {
        step.kind() == StepKind::Prompt
    }

    async fn execute(&self, step: &Step, ctx: &ExecutionContext) -> StepResult {
        let start = Instant::now();
        let StepConfig::Prompt { body, options } = &step.config else {
            unreachable!("PromptStepExecutor only dispatches StepConfig::Prompt");
        };
        let scope = ctx.to_scope();
        let prompt = match skillrt_template::render(body, &scope) {
            Ok(rendered) => rendered,
            Err(err) => return StepResult::failed(step.name.as_str(), err.to_string(), duration_ms(start)),
        };

        let Some(adapter) = self.adapters.get_default() else {
            return StepResult::failed(
                step.name.as_str(),
                SkillError::LlmInvocation("no default LLM adapter registered".to_string()).to_string(),
                duration_ms(start),
            );
        };

        match adapter.invoke(&prompt, options.as_ref()).await {
            Ok(response) => StepResult::success(
                step.name.as_str(),
                step.var_name.clone(),
                Value::String(response),
                duration_ms(start),
            ),
            Err(err) => StepResult::failed(
                step.name.as_str(),
                SkillError::LlmInvocation(err.to_string()).to_string(),
                duration_ms(start),
            ),
        }
    }
}

/// Dispatches AWAIT steps: does not advance. Produces an `AWAITING`
/// result; the orchestrator (not this executor) persists the snapshot.
pub struct AwaitStepExecutor;

#[async_trait]
impl StepExecutor for AwaitStepExecutor {
    fn supports(&self, step: &Step) -> bool {
        step.kind() == StepKind::Await
    }

    async fn execute(&self, step: &Step, ctx: &ExecutionContext) -> StepResult {
        let start = Instant::now();
        let StepConfig::Await { message, input_schema } = &step.config else {
            unreachable!("AwaitStepExecutor only dispatches StepConfig::Await");
        };
        let scope = ctx.to_scope();
        let rendered_message = match skillrt_template::render(message, &scope) {
            Ok(rendered) => rendered,
            Err(err) => return StepResult::failed(step.name.as_str(), err.to_string(), duration_ms(start)),
        };
        let await_request = AwaitRequest {
            message: rendered_message,
            input_schema: input_schema.clone(),
        };
        StepResult::awaiting(step.name.as_str(), await_request.into_value(), duration_ms(start))
    }
}

/// The fixed set of four executors, one per [`StepKind`] (§4.E).
pub fn default_executors(
    tools: Arc<ToolRegistry>,
    adapters: Arc<LLMAdapterRegistry>,
) -> Vec<Arc<dyn StepExecutor>> {
    vec![
        Arc::new(ToolStepExecutor::new(tools)),
        Arc::new(TemplateStepExecutor),
        Arc::new(PromptStepExecutor::new(adapters)),
        Arc::new(AwaitStepExecutor),
    ]
}
