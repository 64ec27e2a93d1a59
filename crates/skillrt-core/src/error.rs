//! The error taxonomy shared across every `skillrt-*` crate (§7).
//!
//! One enum for the whole workspace's domain errors, mirroring the
//! `AppError` pattern: a variant per distinguishable failure kind, with the
//! offending value carried in the message.

#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum SkillError {
    #[error("malformed skill document: {0}")]
    SkillParse(String),

    #[error("condition parse error at position {position}: expected {expected}, found {found}")]
    ConditionParse {
        position: usize,
        expected: String,
        found: String,
    },

    #[error("template render error in `{template}` at position {position}: {reason}")]
    TemplateRender {
        template: String,
        position: usize,
        reason: String,
    },

    #[error("tool '{0}' is not registered")]
    ToolNotFound(String),

    #[error("tool execution failed: {0}")]
    ToolExecution(String),

    #[error("LLM invocation failed: {0}")]
    LlmInvocation(String),

    #[error("user input failed await validation: {0}")]
    AwaitValidation(String),

    #[error("final output failed contract validation: {0}")]
    OutputValidation(String),

    #[error("no execution found for id '{0}'")]
    ExecutionNotFound(String),

    #[error("execution '{id}' already completed (status: {status})")]
    ExecutionAlreadyCompleted { id: String, status: String },
}

impl SkillError {
    /// The stable taxonomy tag from §7, used for machine-readable error
    /// envelopes.
    pub fn kind(&self) -> &'static str {
        match self {
            SkillError::SkillParse(_) => "SKILL_PARSE",
            SkillError::ConditionParse { .. } => "CONDITION_PARSE",
            SkillError::TemplateRender { .. } => "TEMPLATE_RENDER",
            SkillError::ToolNotFound(_) => "TOOL_NOT_FOUND",
            SkillError::ToolExecution(_) => "TOOL_EXECUTION",
            SkillError::LlmInvocation(_) => "LLM_INVOCATION",
            SkillError::AwaitValidation(_) => "AWAIT_VALIDATION",
            SkillError::OutputValidation(_) => "OUTPUT_VALIDATION",
            SkillError::ExecutionNotFound(_) => "EXECUTION_NOT_FOUND",
            SkillError::ExecutionAlreadyCompleted { .. } => "EXECUTION_ALREADY_COMPLETED",
        }
    }
}

pub type SkillResult<T> = std::result::Result<T, SkillError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_condition_parse() {
        let err = SkillError::ConditionParse {
            position: 4,
            expected: "operand".into(),
            found: "&&".into(),
        };
        assert_eq!(
            err.to_string(),
            "condition parse error at position 4: expected operand, found &&"
        );
        assert_eq!(err.kind(), "CONDITION_PARSE");
    }

    #[test]
    fn display_execution_already_completed() {
        let err = SkillError::ExecutionAlreadyCompleted {
            id: "exec-1".into(),
            status: "RESUMED".into(),
        };
        assert_eq!(
            err.to_string(),
            "execution 'exec-1' already completed (status: RESUMED)"
        );
        assert_eq!(err.kind(), "EXECUTION_ALREADY_COMPLETED");
    }

    #[test]
    fn display_tool_not_found() {
        let err = SkillError::ToolNotFound("echo".into());
        assert_eq!(err.to_string(), "tool 'echo' is not registered");
        assert_eq!(err.kind(), "TOOL_NOT_FOUND");
    }
}
