//! Step-section parsing: splits the document body into `##`-level step
//! blocks and parses each into a [`Step`] (§4.C.1).

use skillrt_core::types::{FieldMap, OutputContract, Step, StepConfig};
use skillrt_core::{SkillError, Value};

struct RawSection<'a> {
    heading: &'a str,
    lines: Vec<&'a str>,
}

fn split_sections(body: &str) -> Vec<RawSection<'_>> {
    let mut sections = Vec::new();
    let mut current: Option<RawSection<'_>> = None;

    for line in body.lines() {
        if let Some(heading) = line.strip_prefix("## ") {
            if let Some(section) = current.take() {
                sections.push(section);
            }
            current = Some(RawSection {
                heading: heading.trim(),
                lines: Vec::new(),
            });
        } else if let Some(section) = current.as_mut() {
            section.lines.push(line);
        }
    }
    if let Some(section) = current.take() {
        sections.push(section);
    }
    sections
}

/// `name (type)` → `(name, type)`.
fn parse_heading(heading: &str) -> Result<(String, String), SkillError> {
    let open = heading
        .find('(')
        .ok_or_else(|| SkillError::SkillParse(format!("malformed step heading: {heading:?}")))?;
    let close = heading
        .rfind(')')
        .filter(|&p| p > open)
        .ok_or_else(|| SkillError::SkillParse(format!("malformed step heading: {heading:?}")))?;
    let name = heading[..open].trim().to_string();
    let kind = heading[open + 1..close].trim().to_string();
    if name.is_empty() {
        return Err(SkillError::SkillParse("step is missing a name".to_string()));
    }
    Ok((name, kind))
}

/// Extract the single fenced code block's content, and any `key: value`
/// annotation lines preceding it.
fn split_annotations_and_fence(lines: &[&str]) -> Result<(Vec<(String, String)>, String), SkillError> {
    let mut annotations = Vec::new();
    let mut i = 0;
    while i < lines.len() {
        let line = lines[i].trim();
        if line.is_empty() {
            i += 1;
            continue;
        }
        if line.starts_with("```") {
            break;
        }
        match line.split_once(':') {
            Some((key, value)) => annotations.push((key.trim().to_string(), value.trim().to_string())),
            None => return Err(SkillError::SkillParse(format!("malformed step annotation: {line:?}"))),
        }
        i += 1;
    }

    if i >= lines.len() || !lines[i].trim_start().starts_with("```") {
        return Err(SkillError::SkillParse(
            "step is missing its fenced config block".to_string(),
        ));
    }
    i += 1;
    let fence_start = i;
    while i < lines.len() && !lines[i].trim_start().starts_with("```") {
        i += 1;
    }
    if i >= lines.len() {
        return Err(SkillError::SkillParse("unterminated fenced code block".to_string()));
    }
    let body = lines[fence_start..i].join("\n");
    Ok((annotations, body))
}

fn lookup<'a>(annotations: &'a [(String, String)], key: &str) -> Option<&'a str> {
    annotations
        .iter()
        .find(|(k, _)| k == key)
        .map(|(_, v)| v.as_str())
}

/// Parse a JSON string payload that may be written bare (`hello {{name}}`)
/// or as a quoted JSON string literal (`"hello {{name}}"`).
fn parse_string_payload(text: &str) -> String {
    let trimmed = text.trim();
    if trimmed.starts_with('"') {
        if let Ok(s) = serde_json::from_str::<String>(trimmed) {
            return s;
        }
    }
    trimmed.to_string()
}

fn parse_json_payload(text: &str) -> Result<Value, SkillError> {
    serde_json::from_str(text.trim())
        .map_err(|e| SkillError::SkillParse(format!("invalid JSON step config: {e}")))
}

fn parse_when(annotations: &[(String, String)]) -> Option<String> {
    match lookup(annotations, "when") {
        Some("null") | None => None,
        Some(expr) => Some(expr.to_string()),
    }
}

fn parse_tool_config(payload: Value) -> Result<StepConfig, SkillError> {
    let Value::Object(map) = payload else {
        return Err(SkillError::SkillParse("tool step config must be an object".to_string()));
    };
    let tool_name = match map.get("tool") {
        Some(Value::String(s)) => s.clone(),
        _ => return Err(SkillError::SkillParse("tool step is missing its 'tool' field".to_string())),
    };
    let input_template = map.get("input").cloned().unwrap_or_else(Value::object);
    let output_schema = match map.get("output_schema") {
        Some(Value::Object(schema_fields)) => Some(parse_output_contract(schema_fields)?),
        _ => None,
    };
    Ok(StepConfig::Tool {
        tool_name,
        input_template,
        output_schema,
    })
}

fn parse_output_contract(
    fields_map: &std::collections::BTreeMap<String, Value>,
) -> Result<OutputContract, SkillError> {
    use skillrt_core::types::FieldSpec;
    let mut fields = FieldMap::new();
    for (name, spec) in fields_map {
        let field_type = match spec {
            Value::String(s) => parse_field_type(s)?,
            Value::Object(long) => match long.get("type") {
                Some(Value::String(s)) => parse_field_type(s)?,
                _ => return Err(SkillError::SkillParse(format!("field {name:?} is missing a type"))),
            },
            _ => return Err(SkillError::SkillParse(format!("malformed field spec for {name:?}"))),
        };
        let required = matches!(
            spec,
            Value::Object(long) if matches!(long.get("required"), Some(Value::Bool(true)))
        );
        fields.insert(
            name.clone(),
            FieldSpec {
                required,
                ..FieldSpec::new(field_type)
            },
        );
    }
    Ok(OutputContract {
        fields,
        format: Default::default(),
    })
}

fn parse_field_type(name: &str) -> Result<skillrt_core::types::FieldType, SkillError> {
    use skillrt_core::types::FieldType;
    match name {
        "string" => Ok(FieldType::String),
        "number" => Ok(FieldType::Number),
        "integer" => Ok(FieldType::Integer),
        "boolean" => Ok(FieldType::Boolean),
        "object" => Ok(FieldType::Object),
        "array" => Ok(FieldType::Array),
        other => Err(SkillError::SkillParse(format!("unknown field type {other:?}"))),
    }
}

/// A prompt step's fence is either a bare/quoted string (just the prompt
/// body, `options: None`) or a JSON object `{ "body": ..., "options": ... }`
/// when the adapter call needs options, mirroring how the tool step's
/// `input`/`output_schema` ride alongside `tool` in one JSON payload.
fn parse_prompt_config(fence_body: &str) -> Result<StepConfig, SkillError> {
    let trimmed = fence_body.trim();
    if trimmed.starts_with('{') {
        let Value::Object(map) = parse_json_payload(trimmed)? else {
            return Err(SkillError::SkillParse("prompt step config must be an object".to_string()));
        };
        let body = match map.get("body") {
            Some(Value::String(s)) => s.clone(),
            _ => return Err(SkillError::SkillParse("prompt step is missing its 'body' field".to_string())),
        };
        let options = map.get("options").cloned();
        Ok(StepConfig::Prompt { body, options })
    } else {
        Ok(StepConfig::Prompt {
            body: parse_string_payload(trimmed),
            options: None,
        })
    }
}

fn parse_await_config(payload: Value) -> Result<StepConfig, SkillError> {
    let Value::Object(map) = payload else {
        return Err(SkillError::SkillParse("await step config must be an object".to_string()));
    };
    let message = match map.get("message") {
        Some(Value::String(s)) => s.clone(),
        _ => return Err(SkillError::SkillParse("await step is missing its 'message' field".to_string())),
    };
    let input_schema = match map.get("input_schema") {
        Some(Value::Object(schema_fields)) => parse_output_contract(schema_fields)?.fields,
        Some(_) => return Err(SkillError::SkillParse("await input_schema must be an object".to_string())),
        None => FieldMap::new(),
    };
    Ok(StepConfig::Await { message, input_schema })
}

fn parse_section(section: &RawSection<'_>) -> Result<Step, SkillError> {
    let (name, kind) = parse_heading(section.heading)?;
    let (annotations, fence_body) = split_annotations_and_fence(&section.lines)?;
    let when = parse_when(&annotations);
    let var_name = lookup(&annotations, "var").map(|s| s.to_string());

    let config = match kind.as_str() {
        "template" => StepConfig::Template {
            body: parse_string_payload(&fence_body),
        },
        "prompt" => parse_prompt_config(&fence_body)?,
        "tool" => parse_tool_config(parse_json_payload(&fence_body)?)?,
        "await" => parse_await_config(parse_json_payload(&fence_body)?)?,
        other => return Err(SkillError::SkillParse(format!("unknown step type {other:?}"))),
    };

    Ok(Step {
        name,
        var_name,
        when,
        config,
    })
}

/// Parse every `##`-level step section in `body`, in document order.
/// Rejects (`SKILL_PARSE`) duplicate step names and unknown step types
/// (§4.C point 4).
pub fn parse_steps(body: &str) -> Result<Vec<Step>, SkillError> {
    let sections = split_sections(body);
    let mut steps = Vec::with_capacity(sections.len());
    for section in &sections {
        let step = parse_section(section)?;
        if steps.iter().any(|s: &Step| s.name == step.name) {
            return Err(SkillError::SkillParse(format!("duplicate step name {:?}", step.name)));
        }
        steps.push(step);
    }
    Ok(steps)
}
