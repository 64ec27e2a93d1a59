//! End-to-end scenarios and the orchestrator-level testable properties
//! (skill documents parsed through the real parser, driven through a
//! real `SkillExecutor`).

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;

use skillrt_context::InMemoryExecutionStore;
use skillrt_core::{SkillError, Value};
use skillrt_exec::{default_executors, EchoTool, LLMAdapterRegistry, Tool, ToolOutputContext, ToolRegistry, ToolSchema};

use crate::SkillExecutor;

fn input(pairs: Vec<(&str, Value)>) -> BTreeMap<String, Value> {
    pairs.into_iter().map(|(k, v)| (k.to_string(), v)).collect()
}

fn executor_with_tools(tools: ToolRegistry) -> SkillExecutor {
    let store = Arc::new(InMemoryExecutionStore::new());
    let tools = Arc::new(tools);
    let adapters = Arc::new(LLMAdapterRegistry::new());
    SkillExecutor::new(store, default_executors(tools, adapters))
}

fn bare_executor() -> SkillExecutor {
    executor_with_tools(ToolRegistry::new())
}

#[tokio::test]
async fn pure_template_chain_computes_and_interpolates() {
    let doc = r#"---
id: sum-greeting
version: 1.0.0
output_schema:
  format: json
  msg: string
---

## s1 (template)
var: total
```
"{{a+b}}"
```

## s2 (template)
var: msg
```
"sum is {{total}}"
```
"#;
    let skill = skillrt_model::parse_skill(doc).unwrap();
    let executor = bare_executor();
    let result = executor.execute(&skill, input(vec![("a", Value::Number(2.0)), ("b", Value::Number(3.0))])).await;

    assert!(result.success);
    assert_eq!(result.output.unwrap().get("msg"), Some(&Value::String("sum is 5".to_string())));
}

#[tokio::test]
async fn tool_then_template_chain_produces_greeting() {
    let doc = r#"---
id: tool-greeting
version: 1.0.0
output_schema:
  format: json
  greeting: string
---

## s1 (tool)
var: echoed
```
{ "tool": "echo", "input": { "x": "{{name}}" } }
```

## s2 (template)
var: greeting
```
"hello {{echoed.x}}"
```
"#;
    let skill = skillrt_model::parse_skill(doc).unwrap();
    let tools = ToolRegistry::new();
    tools.register(Arc::new(EchoTool::new()));
    let executor = executor_with_tools(tools);

    let result = executor.execute(&skill, input(vec![("name", Value::String("ada".to_string()))])).await;

    assert!(result.success);
    assert_eq!(result.output.unwrap().get("greeting"), Some(&Value::String("hello ada".to_string())));
}

#[tokio::test]
async fn await_round_trip_then_rejects_second_resume() {
    let doc = r#"---
id: confirm-then-branch
version: 1.0.0
output_schema:
  format: json
  result: string
---

## s1 (await)
var: confirm
```
{ "message": "proceed?", "input_schema": { "confirm": { "type": "boolean", "required": true } } }
```

## s2 (template)
when: {{confirm}} == true
var: result
```
"ok"
```

## s3 (template)
when: {{confirm}} == false
var: result
```
"no"
```
"#;
    let skill = skillrt_model::parse_skill(doc).unwrap();
    let executor = bare_executor();

    let suspended = executor.execute(&skill, BTreeMap::new()).await;
    assert!(suspended.awaiting);
    assert!(!suspended.success);
    let execution_id = suspended.execution_id.unwrap();
    assert!(execution_id.starts_with("exec-"));

    let resumed = executor.resume(&skill, &execution_id, input(vec![("confirm", Value::Bool(true))])).await;
    assert!(resumed.success);
    assert_eq!(resumed.output.unwrap().get("result"), Some(&Value::String("ok".to_string())));

    let second_attempt = executor.resume(&skill, &execution_id, input(vec![("confirm", Value::Bool(true))])).await;
    assert!(!second_attempt.success);
    assert!(second_attempt.error.unwrap().contains("already completed"));
}

#[tokio::test]
async fn await_resumed_false_takes_the_other_branch() {
    let doc = r#"---
id: confirm-then-branch-2
version: 1.0.0
output_schema:
  format: json
  result: string
---

## s1 (await)
var: confirm
```
{ "message": "proceed?", "input_schema": { "confirm": { "type": "boolean", "required": true } } }
```

## s2 (template)
when: {{confirm}} == true
var: result
```
"ok"
```

## s3 (template)
when: {{confirm}} == false
var: result
```
"no"
```
"#;
    let skill = skillrt_model::parse_skill(doc).unwrap();
    let executor = bare_executor();

    let suspended = executor.execute(&skill, BTreeMap::new()).await;
    let execution_id = suspended.execution_id.unwrap();

    let resumed = executor.resume(&skill, &execution_id, input(vec![("confirm", Value::Bool(false))])).await;
    assert!(resumed.success);
    assert_eq!(resumed.output.unwrap().get("result"), Some(&Value::String("no".to_string())));
}

struct CountingTool {
    calls: Arc<AtomicUsize>,
    schema: ToolSchema,
}

#[async_trait]
impl Tool for CountingTool {
    fn name(&self) -> &str {
        "counter"
    }
    fn description(&self) -> &str {
        "records how many times it was invoked"
    }
    fn category(&self) -> &str {
        "test"
    }
    fn tags(&self) -> &[String] {
        &[]
    }
    fn version(&self) -> &str {
        "1.0.0"
    }
    fn input_schema(&self) -> &ToolSchema {
        &self.schema
    }
    fn output_schema(&self) -> &ToolSchema {
        &self.schema
    }

    async fn execute(&self, _input: BTreeMap<String, Value>, _out: &ToolOutputContext) -> Result<(), SkillError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

#[tokio::test]
async fn when_false_skips_the_step_without_invoking_its_tool() {
    let doc = r#"---
id: gated-tool
version: 1.0.0
---

## s1 (tool)
when: {{flag}} == true
```
{ "tool": "counter", "input": {} }
```
"#;
    let skill = skillrt_model::parse_skill(doc).unwrap();
    let calls = Arc::new(AtomicUsize::new(0));
    let tools = ToolRegistry::new();
    tools.register(Arc::new(CountingTool {
        calls: calls.clone(),
        schema: ToolSchema::new(),
    }));
    let executor = executor_with_tools(tools);

    let result = executor.execute(&skill, input(vec![("flag", Value::Bool(false))])).await;

    assert!(result.success);
    assert_eq!(calls.load(Ordering::SeqCst), 0);
    assert_eq!(result.step_results[0].status, skillrt_core::types::StepStatus::Skipped);
}

#[tokio::test]
async fn output_validation_fails_when_a_required_field_is_absent() {
    let doc = r#"---
id: incomplete-output
version: 1.0.0
output_schema:
  format: json
  report: { type: string, required: true }
---

## s1 (template)
var: note
```
"x"
```
"#;
    let skill = skillrt_model::parse_skill(doc).unwrap();
    let executor = bare_executor();

    let result = executor.execute(&skill, BTreeMap::new()).await;

    assert!(!result.success);
    assert!(!result.awaiting);
    assert!(result.error.unwrap().contains("report"));
}

#[tokio::test]
async fn output_projection_keeps_only_declared_fields() {
    let doc = r#"---
id: projected-output
version: 1.0.0
output_schema:
  format: json
  msg: string
---

## s1 (template)
var: msg
```
"hi"
```

## s2 (template)
var: scratch
```
"not part of the contract"
```
"#;
    let skill = skillrt_model::parse_skill(doc).unwrap();
    let executor = bare_executor();

    let result = executor.execute(&skill, BTreeMap::new()).await;

    let output = result.output.unwrap();
    assert_eq!(output.len(), 1);
    assert_eq!(output.get("msg"), Some(&Value::String("hi".to_string())));
}

#[tokio::test]
async fn a_failed_step_halts_the_pipeline() {
    let doc = r#"---
id: missing-tool
version: 1.0.0
---

## s1 (tool)
```
{ "tool": "nonexistent", "input": {} }
```

## s2 (template)
```
"never reached"
```
"#;
    let skill = skillrt_model::parse_skill(doc).unwrap();
    let executor = bare_executor();

    let result = executor.execute(&skill, BTreeMap::new()).await;

    assert!(!result.success);
    assert!(!result.awaiting);
    assert_eq!(result.step_results.len(), 1);
}

#[tokio::test]
async fn cancel_moves_an_active_execution_to_cancelled_and_blocks_resume() {
    let doc = r#"---
id: cancel-me
version: 1.0.0
---

## s1 (await)
```
{ "message": "wait", "input_schema": {} }
```
"#;
    let skill = skillrt_model::parse_skill(doc).unwrap();
    let executor = bare_executor();

    let suspended = executor.execute(&skill, BTreeMap::new()).await;
    let execution_id = suspended.execution_id.unwrap();

    assert!(executor.cancel(&execution_id));
    assert!(!executor.cancel(&execution_id));

    let resumed = executor.resume(&skill, &execution_id, BTreeMap::new()).await;
    assert!(!resumed.success);
    assert!(resumed.error.unwrap().contains("already completed"));
}

#[tokio::test]
async fn sweep_expires_only_stale_active_executions() {
    let doc = r#"---
id: sweep-me
version: 1.0.0
---

## s1 (await)
```
{ "message": "wait", "input_schema": {} }
```
"#;
    let skill = skillrt_model::parse_skill(doc).unwrap();
    let executor = bare_executor();

    let suspended = executor.execute(&skill, BTreeMap::new()).await;
    let execution_id = suspended.execution_id.unwrap();

    let swept = executor.sweep_expired(chrono::Utc::now() - chrono::Duration::hours(1));
    assert_eq!(swept, 0);

    let swept = executor.sweep_expired(chrono::Utc::now() + chrono::Duration::hours(1));
    assert_eq!(swept, 1);

    let resumed = executor.resume(&skill, &execution_id, BTreeMap::new()).await;
    assert!(!resumed.success);
}
