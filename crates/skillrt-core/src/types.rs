//! Shared domain types (§3): the immutable `Skill`/`Step` model and the
//! mutable per-execution `StepResult` record.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::value::Value;

/// One step kind (§3). Each carries its own type-specific configuration via
/// [`StepConfig`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StepKind {
    Tool,
    Template,
    Prompt,
    Await,
}

impl std::fmt::Display for StepKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            StepKind::Tool => "tool",
            StepKind::Template => "template",
            StepKind::Prompt => "prompt",
            StepKind::Await => "await",
        };
        write!(f, "{s}")
    }
}

/// Primitive field types accepted by [`FieldSpec`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldType {
    String,
    Number,
    Integer,
    Boolean,
    Object,
    Array,
}

/// Pattern/bounds validation attached to a [`FieldSpec`].
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ValidationRule {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pattern: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_items: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_items: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// One field of an `InputSchema`/`OutputContract` (§3).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FieldSpec {
    #[serde(rename = "type")]
    pub field_type: FieldType,
    #[serde(default)]
    pub required: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_value: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub options: Option<Vec<Value>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// UI metadata, opaque to the core.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ui: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub validation: Option<ValidationRule>,
}

impl FieldSpec {
    pub fn new(field_type: FieldType) -> Self {
        Self {
            field_type,
            required: false,
            default_value: None,
            options: None,
            description: None,
            ui: None,
            validation: None,
        }
    }

    pub fn required(mut self, required: bool) -> Self {
        self.required = required;
        self
    }
}

/// A map name → [`FieldSpec`], used for both input schemas and the field
/// portion of an output contract.
pub type FieldMap = BTreeMap<String, FieldSpec>;

/// Serialization format declared by an [`OutputContract`] (§3).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Json,
    Text,
}

/// The declared shape the final variable scope must satisfy (§3).
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct OutputContract {
    #[serde(default)]
    pub fields: FieldMap,
    #[serde(default)]
    pub format: OutputFormat,
}

/// Type-specific step configuration (§3).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum StepConfig {
    Tool {
        tool_name: String,
        input_template: Value,
        output_schema: Option<OutputContract>,
    },
    Template {
        body: String,
    },
    Prompt {
        body: String,
        options: Option<Value>,
    },
    Await {
        message: String,
        input_schema: FieldMap,
    },
}

impl StepConfig {
    pub fn kind(&self) -> StepKind {
        match self {
            StepConfig::Tool { .. } => StepKind::Tool,
            StepConfig::Template { .. } => StepKind::Template,
            StepConfig::Prompt { .. } => StepKind::Prompt,
            StepConfig::Await { .. } => StepKind::Await,
        }
    }
}

/// One step of a skill pipeline (§3).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Step {
    pub name: String,
    pub var_name: Option<String>,
    pub when: Option<String>,
    pub config: StepConfig,
}

impl Step {
    pub fn kind(&self) -> StepKind {
        self.config.kind()
    }

    /// The variable scope key this step's output binds to: `var_name` if
    /// declared, otherwise the step's own name (§4.F step 2.e).
    pub fn binding_name(&self) -> &str {
        self.var_name.as_deref().unwrap_or(&self.name)
    }
}

/// An immutable, versioned, declarative pipeline (§3).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Skill {
    pub id: String,
    pub version: String,
    pub description: Option<String>,
    pub intents: Vec<String>,
    pub input_schema: FieldMap,
    pub output_contract: OutputContract,
    pub steps: Vec<Step>,
}

impl Skill {
    /// Case-insensitive exact match against the skill's declared intents
    /// (§9 open question 4 default).
    pub fn matches_intent(&self, phrase: &str) -> bool {
        let needle = phrase.trim().to_lowercase();
        self.intents
            .iter()
            .any(|intent| intent.trim().to_lowercase() == needle)
    }

    pub fn find_step(&self, name: &str) -> Option<&Step> {
        self.steps.iter().find(|s| s.name == name)
    }
}

/// The payload of an `AWAITING` step result (§4.E): a rendered,
/// user-visible message plus the schema the eventual `resume` call's user
/// input must satisfy.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AwaitRequest {
    pub message: String,
    pub input_schema: FieldMap,
}

impl AwaitRequest {
    /// Encode as the `Value` carried by `StepResult::output`.
    pub fn into_value(self) -> Value {
        serde_json::to_value(&self)
            .map(Value::from)
            .unwrap_or(Value::Null)
    }

    /// Decode back from a `StepResult::output` (used by the orchestrator
    /// when persisting/loading a snapshot's await request).
    pub fn from_value(value: &Value) -> Option<Self> {
        let json: serde_json::Value = value.clone().into();
        serde_json::from_value(json).ok()
    }
}

/// Outcome of dispatching one step (§3).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum StepStatus {
    Success,
    Failed,
    Skipped,
    Awaiting,
}

/// The recorded result of one step's dispatch (§3).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct StepResult {
    pub step_name: String,
    pub status: StepStatus,
    #[serde(default)]
    pub output: Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub var_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub duration_ms: u64,
}

impl StepResult {
    pub fn success(step_name: impl Into<String>, var_name: Option<String>, output: Value, duration_ms: u64) -> Self {
        Self {
            step_name: step_name.into(),
            status: StepStatus::Success,
            output,
            var_name,
            error: None,
            duration_ms,
        }
    }

    pub fn failed(step_name: impl Into<String>, error: impl Into<String>, duration_ms: u64) -> Self {
        Self {
            step_name: step_name.into(),
            status: StepStatus::Failed,
            output: Value::Null,
            var_name: None,
            error: Some(error.into()),
            duration_ms,
        }
    }

    pub fn skipped(step_name: impl Into<String>) -> Self {
        Self {
            step_name: step_name.into(),
            status: StepStatus::Skipped,
            output: Value::Null,
            var_name: None,
            error: None,
            duration_ms: 0,
        }
    }

    pub fn awaiting(step_name: impl Into<String>, output: Value, duration_ms: u64) -> Self {
        Self {
            step_name: step_name.into(),
            status: StepStatus::Awaiting,
            output,
            var_name: None,
            error: None,
            duration_ms,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn binding_name_falls_back_to_step_name() {
        let step = Step {
            name: "s1".into(),
            var_name: None,
            when: None,
            config: StepConfig::Template { body: "x".into() },
        };
        assert_eq!(step.binding_name(), "s1");

        let step2 = Step {
            var_name: Some("total".into()),
            ..step
        };
        assert_eq!(step2.binding_name(), "total");
    }

    #[test]
    fn intent_match_is_case_insensitive() {
        let skill = Skill {
            id: "x".into(),
            version: "1.0.0".into(),
            description: None,
            intents: vec!["Welcome A New User".into()],
            input_schema: FieldMap::new(),
            output_contract: OutputContract::default(),
            steps: vec![],
        };
        assert!(skill.matches_intent("welcome a new user"));
        assert!(!skill.matches_intent("something else"));
    }
}
