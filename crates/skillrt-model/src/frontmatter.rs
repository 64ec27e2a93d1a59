//! YAML frontmatter extraction and `FieldSpec` normalization (§4.C.1).

use std::collections::BTreeMap;

use serde::Deserialize;

use skillrt_core::types::{FieldMap, FieldSpec, FieldType, OutputContract, OutputFormat, ValidationRule};
use skillrt_core::{SkillError, Value};

#[derive(Debug, Deserialize)]
struct FrontmatterRaw {
    id: Option<String>,
    version: Option<String>,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    intents: Vec<String>,
    #[serde(default)]
    input_schema: BTreeMap<String, FieldSpecRaw>,
    #[serde(default)]
    output_schema: OutputSchemaRaw,
}

#[derive(Debug, Default, Deserialize)]
struct OutputSchemaRaw {
    #[serde(default)]
    format: Option<OutputFormat>,
    #[serde(flatten)]
    fields: BTreeMap<String, FieldSpecRaw>,
}

/// Both FieldSpec surface forms (§4.C point 5): `field: string` or
/// `field: {type: string, required: true, ...}`.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum FieldSpecRaw {
    Short(FieldType),
    Long(FieldSpecLong),
}

#[derive(Debug, Deserialize)]
struct FieldSpecLong {
    #[serde(rename = "type")]
    field_type: FieldType,
    #[serde(default)]
    required: bool,
    #[serde(default, rename = "default")]
    default_value: Option<Value>,
    #[serde(default)]
    options: Option<Vec<Value>>,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    ui: Option<Value>,
    #[serde(default)]
    pattern: Option<String>,
    #[serde(default)]
    min: Option<f64>,
    #[serde(default)]
    max: Option<f64>,
    #[serde(default)]
    min_items: Option<usize>,
    #[serde(default)]
    max_items: Option<usize>,
    #[serde(default)]
    message: Option<String>,
}

impl From<FieldSpecRaw> for FieldSpec {
    fn from(raw: FieldSpecRaw) -> Self {
        match raw {
            FieldSpecRaw::Short(field_type) => FieldSpec::new(field_type),
            FieldSpecRaw::Long(long) => {
                let validation = if long.pattern.is_some()
                    || long.min.is_some()
                    || long.max.is_some()
                    || long.min_items.is_some()
                    || long.max_items.is_some()
                    || long.message.is_some()
                {
                    Some(ValidationRule {
                        pattern: long.pattern,
                        min: long.min,
                        max: long.max,
                        min_items: long.min_items,
                        max_items: long.max_items,
                        message: long.message,
                    })
                } else {
                    None
                };
                FieldSpec {
                    field_type: long.field_type,
                    required: long.required,
                    default_value: long.default_value,
                    options: long.options,
                    description: long.description,
                    ui: long.ui,
                    validation,
                }
            }
        }
    }
}

fn normalize_field_map(raw: BTreeMap<String, FieldSpecRaw>) -> FieldMap {
    raw.into_iter().map(|(k, v)| (k, v.into())).collect()
}

pub struct Frontmatter {
    pub id: Option<String>,
    pub version: Option<String>,
    pub description: Option<String>,
    pub intents: Vec<String>,
    pub input_schema: FieldMap,
    pub output_contract: OutputContract,
}

/// Split `content` into `(frontmatter, body)`. Supports a `---`-delimited
/// YAML block at the start of the document; a document with no leading
/// `---` has empty frontmatter and the whole document as body.
pub fn extract_frontmatter(content: &str) -> Result<(Frontmatter, String), SkillError> {
    let trimmed = content.trim_start();
    if !trimmed.starts_with("---") {
        return Ok((empty_frontmatter(), content.to_string()));
    }

    let after_open = match trimmed.find('\n') {
        Some(pos) => pos + 1,
        None => return Ok((empty_frontmatter(), content.to_string())),
    };
    let rest = &trimmed[after_open..];
    let close_pos = rest.find("\n---").ok_or_else(|| {
        SkillError::SkillParse("unclosed frontmatter delimiter".to_string())
    })?;
    let yaml_text = &rest[..close_pos];
    let after_close = close_pos + "\n---".len();
    let body_start = after_open
        + after_close
        + rest[after_close..].find('\n').map(|p| p + 1).unwrap_or(rest.len() - after_close);

    let raw: FrontmatterRaw = serde_yaml::from_str(yaml_text.trim())
        .map_err(|e| SkillError::SkillParse(format!("invalid frontmatter: {e}")))?;

    let frontmatter = Frontmatter {
        id: raw.id,
        version: raw.version,
        description: raw.description,
        intents: raw.intents,
        input_schema: normalize_field_map(raw.input_schema),
        output_contract: OutputContract {
            fields: normalize_field_map(raw.output_schema.fields),
            format: raw.output_schema.format.unwrap_or_default(),
        },
    };
    Ok((frontmatter, trimmed[body_start.min(trimmed.len())..].to_string()))
}

fn empty_frontmatter() -> Frontmatter {
    Frontmatter {
        id: None,
        version: None,
        description: None,
        intents: Vec::new(),
        input_schema: FieldMap::new(),
        output_contract: OutputContract::default(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_basic_fields() {
        let content = "---\nid: hello\nversion: 1.0.0\ndescription: Hi\nintents:\n  - greet\n---\nbody text\n";
        let (fm, body) = extract_frontmatter(content).unwrap();
        assert_eq!(fm.id.as_deref(), Some("hello"));
        assert_eq!(fm.version.as_deref(), Some("1.0.0"));
        assert_eq!(fm.intents, vec!["greet".to_string()]);
        assert_eq!(body.trim(), "body text");
    }

    #[test]
    fn short_and_long_field_forms_normalize_equal() {
        let content = "---\nid: x\nversion: 1.0.0\ninput_schema:\n  a: string\n  b: {type: string, required: true}\n---\nbody\n";
        let (fm, _) = extract_frontmatter(content).unwrap();
        assert_eq!(fm.input_schema["a"].field_type, FieldType::String);
        assert!(!fm.input_schema["a"].required);
        assert_eq!(fm.input_schema["b"].field_type, FieldType::String);
        assert!(fm.input_schema["b"].required);
    }

    #[test]
    fn no_frontmatter_yields_whole_document_as_body() {
        let content = "# Just steps\nno frontmatter here\n";
        let (fm, body) = extract_frontmatter(content).unwrap();
        assert!(fm.id.is_none());
        assert_eq!(body, content);
    }

    #[test]
    fn unclosed_frontmatter_is_skill_parse_error() {
        let content = "---\nid: x\nno closing delimiter\n";
        let err = extract_frontmatter(content).unwrap_err();
        assert!(matches!(err, SkillError::SkillParse(_)));
    }
}
