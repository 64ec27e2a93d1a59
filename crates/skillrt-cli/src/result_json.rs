//! Renders a `SkillResult` as the `serde_json::Value` printed to stdout.

use serde_json::json;

use skillrt_core::types::StepResult;
use skillrt_orchestrator::SkillResult;

fn step_result_json(step: &StepResult) -> serde_json::Value {
    json!({
        "stepName": step.step_name.clone(),
        "status": format!("{:?}", step.status).to_uppercase(),
        "output": serde_json::Value::from(step.output.clone()),
        "varName": step.var_name.clone(),
        "error": step.error.clone(),
        "durationMs": step.duration_ms,
    })
}

pub fn to_json(result: &SkillResult) -> serde_json::Value {
    json!({
        "success": result.success,
        "awaiting": result.awaiting,
        "executionId": result.execution_id.clone(),
        "output": result.output.as_ref().map(|output| {
            serde_json::Value::Object(output.iter().map(|(k, v)| (k.clone(), serde_json::Value::from(v.clone()))).collect())
        }),
        "awaitRequest": result.await_request.as_ref().map(|req| json!({
            "message": req.message.clone(),
            "inputSchema": req.input_schema.clone(),
        })),
        "error": result.error.clone(),
        "stepResults": result.step_results.iter().map(step_result_json).collect::<Vec<_>>(),
        "totalDurationMs": result.total_duration_ms,
    })
}
