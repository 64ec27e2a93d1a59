//! Reference `Tool`/`LLMAdapter` implementations used only by tests and
//! the demo CLI (§6); neither is a production tool/adapter.

use std::collections::BTreeMap;

use async_trait::async_trait;

use skillrt_core::{SkillError, Value};

use crate::llm::LLMAdapter;
use crate::tool::{Tool, ToolOutputContext, ToolSchema};

/// Copies a configured input field to an output field. The `echo` mock
/// tool used by scenario E2.
pub struct EchoTool {
    schema: ToolSchema,
}

impl EchoTool {
    pub fn new() -> Self {
        Self {
            schema: ToolSchema::new(),
        }
    }
}

impl Default for EchoTool {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Tool for EchoTool {
    fn name(&self) -> &str {
        "echo"
    }
    fn description(&self) -> &str {
        "Copies its input map verbatim to its output map."
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

    async fn execute(&self, input: BTreeMap<String, Value>, out: &ToolOutputContext) -> Result<(), SkillError> {
        for (key, value) in input {
            out.set(key, value);
        }
        Ok(())
    }
}

/// Returns a canned response, or echoes the prompt back with a prefix.
/// Exercises the PROMPT step kind without a network dependency.
pub struct StaticLlmAdapter {
    canned_response: Option<String>,
    models: Vec<String>,
}

impl StaticLlmAdapter {
    pub fn new() -> Self {
        Self {
            canned_response: None,
            models: vec!["static-v1".to_string()],
        }
    }

    pub fn with_response(response: impl Into<String>) -> Self {
        Self {
            canned_response: Some(response.into()),
            models: vec!["static-v1".to_string()],
        }
    }
}

impl Default for StaticLlmAdapter {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl LLMAdapter for StaticLlmAdapter {
    fn name(&self) -> &str {
        "static"
    }
    fn supported_models(&self) -> &[String] {
        &self.models
    }
    fn is_available(&self) -> bool {
        true
    }

    async fn invoke(&self, prompt: &str, _options: Option<&Value>) -> Result<String, SkillError> {
        match &self.canned_response {
            Some(response) => Ok(response.clone()),
            None => Ok(format!("[static] {prompt}")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn echo_tool_copies_input_to_output() {
        let tool = EchoTool::new();
        let mut input = BTreeMap::new();
        input.insert("to".to_string(), Value::String("a@b.com".into()));
        let out = ToolOutputContext::new();
        tool.execute(input, &out).await.unwrap();
        assert_eq!(
            out.into_value(),
            Value::Object(BTreeMap::from([("to".to_string(), Value::String("a@b.com".into()))]))
        );
    }

    #[tokio::test]
    async fn static_adapter_echoes_prompt_with_prefix_by_default() {
        let adapter = StaticLlmAdapter::new();
        let response = adapter.invoke("hi", None).await.unwrap();
        assert_eq!(response, "[static] hi");
    }

    #[tokio::test]
    async fn static_adapter_returns_canned_response_when_configured() {
        let adapter = StaticLlmAdapter::with_response("canned");
        assert_eq!(adapter.invoke("anything", None).await.unwrap(), "canned");
    }
}
