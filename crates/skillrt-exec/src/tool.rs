//! The `Tool` contract and registry (§6).

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, RwLock};

use async_trait::async_trait;

use skillrt_core::types::FieldType;
use skillrt_core::{SkillError, Value};

/// One parameter of a [`ToolSchema`] (§6).
#[derive(Clone, Debug, PartialEq)]
pub struct ParameterSpec {
    pub param_type: FieldType,
    pub description: Option<String>,
    pub required: bool,
    pub default_value: Option<Value>,
    pub options: Option<Vec<Value>>,
    pub example: Option<Value>,
    pub constraints: Option<Value>,
}

impl ParameterSpec {
    pub fn new(param_type: FieldType) -> Self {
        Self {
            param_type,
            description: None,
            required: false,
            default_value: None,
            options: None,
            example: None,
            constraints: None,
        }
    }

    pub fn required(mut self, required: bool) -> Self {
        self.required = required;
        self
    }
}

pub type ToolSchema = BTreeMap<String, ParameterSpec>;

/// Outcome of [`Tool::validate_input`].
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ValidationResult {
    pub errors: Vec<String>,
}

impl ValidationResult {
    pub fn ok() -> Self {
        Self::default()
    }

    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn with_error(mut self, message: impl Into<String>) -> Self {
        self.errors.push(message.into());
        self
    }
}

/// A write-only handle bound to one step's result, through which a
/// [`Tool`] reports its output (§4.E TOOL: "Tool output is written by the
/// tool through a `ToolOutputContext`").
#[derive(Clone, Default)]
pub struct ToolOutputContext {
    fields: Arc<Mutex<BTreeMap<String, Value>>>,
}

impl ToolOutputContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&self, key: impl Into<String>, value: Value) {
        self.fields.lock().unwrap().insert(key.into(), value);
    }

    /// The accumulated map, consumed once the tool call returns (§4.E).
    pub fn into_value(self) -> Value {
        Value::Object(self.fields.lock().unwrap().clone())
    }
}

/// A callable capability (§6): `name`, `description`, `category`, `tags`,
/// `version`, `inputSchema`, `outputSchema`, `validateInput`, `execute`.
#[async_trait]
pub trait Tool: Send + Sync {
    fn name(&self) -> &str;
    fn description(&self) -> &str;
    fn category(&self) -> &str;
    fn tags(&self) -> &[String];
    fn version(&self) -> &str;
    fn input_schema(&self) -> &ToolSchema;
    fn output_schema(&self) -> &ToolSchema;

    fn validate_input(&self, input: &BTreeMap<String, Value>) -> ValidationResult {
        let mut result = ValidationResult::ok();
        for (name, spec) in self.input_schema() {
            if spec.required && !input.contains_key(name) {
                result = result.with_error(format!("missing required field '{name}'"));
            }
        }
        result
    }

    async fn execute(&self, input: BTreeMap<String, Value>, out: &ToolOutputContext) -> Result<(), SkillError>;
}

/// Registers tools by name for TOOL-step dispatch (§4.E).
#[derive(Default)]
pub struct ToolRegistry {
    tools: RwLock<BTreeMap<String, Arc<dyn Tool>>>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&self, tool: Arc<dyn Tool>) {
        self.tools.write().unwrap().insert(tool.name().to_string(), tool);
    }

    pub fn find(&self, name: &str) -> Option<Arc<dyn Tool>> {
        self.tools.read().unwrap().get(name).cloned()
    }
}
