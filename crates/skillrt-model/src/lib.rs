//! The skill document parser (§4.C) and an in-memory skill repository
//! (§6 — repository contract only, no persistent backend).

pub mod frontmatter;
pub mod repository;
pub mod steps;

use skillrt_core::types::Skill;
use skillrt_core::SkillError;

/// Parse a full skill document (YAML frontmatter + `##` step sections,
/// §4.C.1) into a [`Skill`]. Rejects (`SKILL_PARSE`) a document missing
/// `id`, `version`, or any steps (§4.C point 4).
pub fn parse_skill(content: &str) -> Result<Skill, SkillError> {
    let (fm, body) = frontmatter::extract_frontmatter(content)?;
    let steps = steps::parse_steps(&body)?;

    let id = fm
        .id
        .ok_or_else(|| SkillError::SkillParse("document is missing 'id'".to_string()))?;
    let version = fm
        .version
        .ok_or_else(|| SkillError::SkillParse("document is missing 'version'".to_string()))?;
    if steps.is_empty() {
        return Err(SkillError::SkillParse("document declares no steps".to_string()));
    }

    Ok(Skill {
        id,
        version,
        description: fm.description,
        intents: fm.intents,
        input_schema: fm.input_schema,
        output_contract: fm.output_contract,
        steps,
    })
}

pub use repository::{InMemorySkillRepository, SkillRepository};

#[cfg(test)]
mod tests {
    use super::*;

    const DOC: &str = r#"---
id: send-welcome-email
version: 1.0.0
description: Send a welcome email to a new user
intents:
  - welcome a new user
  - onboard user
input_schema:
  name: string
  email: { type: string, required: true, pattern: "^.+@.+$" }
output_schema:
  format: json
  greeting: string
---

# Steps

## s1 (template)
when: null
var: greeting
```
"hello {{name}}"
```
"#;

    #[test]
    fn parses_the_reference_document_end_to_end() {
        let skill = parse_skill(DOC).unwrap();
        assert_eq!(skill.id, "send-welcome-email");
        assert_eq!(skill.version, "1.0.0");
        assert_eq!(skill.intents.len(), 2);
        assert!(skill.input_schema["email"].required);
        assert_eq!(skill.output_contract.fields.len(), 1);
        assert_eq!(skill.steps.len(), 1);
        assert_eq!(skill.steps[0].binding_name(), "greeting");
    }

    #[test]
    fn serialized_skill_deserializes_back_to_an_equivalent_model() {
        let skill = parse_skill(DOC).unwrap();
        let json = serde_json::to_string(&skill).unwrap();
        let restored: Skill = serde_json::from_str(&json).unwrap();
        assert_eq!(skill, restored);
    }

    #[test]
    fn missing_id_is_skill_parse_error() {
        let doc = "---\nversion: 1.0.0\n---\n## s1 (template)\n```\n\"x\"\n```\n";
        let err = parse_skill(doc).unwrap_err();
        assert!(matches!(err, SkillError::SkillParse(_)));
    }

    #[test]
    fn missing_steps_is_skill_parse_error() {
        let doc = "---\nid: x\nversion: 1.0.0\n---\nno steps here\n";
        let err = parse_skill(doc).unwrap_err();
        assert!(matches!(err, SkillError::SkillParse(_)));
    }
}
