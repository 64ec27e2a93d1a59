//! Validates a flat map against a [`FieldMap`] (§6, §7): shared by the
//! orchestrator's output-contract check and its await-input check, since
//! both are "does this map satisfy this field schema" at heart.

use std::collections::BTreeMap;

use crate::types::{FieldMap, FieldType};
use crate::value::Value;

fn matches_type(value: &Value, field_type: FieldType) -> bool {
    match field_type {
        FieldType::String => matches!(value, Value::String(_)),
        FieldType::Number => matches!(value, Value::Number(_)),
        FieldType::Integer => matches!(value, Value::Number(n) if n.fract() == 0.0),
        FieldType::Boolean => matches!(value, Value::Bool(_)),
        FieldType::Object => matches!(value, Value::Object(_)),
        FieldType::Array => matches!(value, Value::Array(_)),
    }
}

/// Every error found, empty iff `data` satisfies every required/typed
/// field of `fields`. Fields declared but absent and not `required` are
/// simply skipped, not defaulted — a caller wanting defaults applies
/// `FieldSpec::default_value` itself.
pub fn validate_fields(fields: &FieldMap, data: &BTreeMap<String, Value>) -> Vec<String> {
    let mut errors = Vec::new();
    for (name, spec) in fields {
        let Some(value) = data.get(name) else {
            if spec.required {
                errors.push(format!("missing required field '{name}'"));
            }
            continue;
        };
        if !matches_type(value, spec.field_type) {
            errors.push(format!(
                "field '{name}' expected type {:?}, found a different shape",
                spec.field_type
            ));
            continue;
        }
        if let Some(options) = &spec.options {
            if !options.contains(value) {
                errors.push(format!("field '{name}' is not one of the declared options"));
            }
        }
        if let Some(rule) = &spec.validation {
            if let Some(min) = rule.min {
                if let Some(n) = value.as_f64() {
                    if n < min {
                        errors.push(format!("field '{name}' is below the minimum of {min}"));
                    }
                }
            }
            if let Some(max) = rule.max {
                if let Some(n) = value.as_f64() {
                    if n > max {
                        errors.push(format!("field '{name}' is above the maximum of {max}"));
                    }
                }
            }
            if let Some(min_items) = rule.min_items {
                if let Some(items) = value.as_array() {
                    if items.len() < min_items {
                        errors.push(format!("field '{name}' has fewer than {min_items} items"));
                    }
                }
            }
            if let Some(max_items) = rule.max_items {
                if let Some(items) = value.as_array() {
                    if items.len() > max_items {
                        errors.push(format!("field '{name}' has more than {max_items} items"));
                    }
                }
            }
        }
    }
    errors
}

/// Keep only the entries `fields` declares, in the order declared (`§4.F`
/// step 3: "projected map of declared output fields").
pub fn project_fields(fields: &FieldMap, data: &BTreeMap<String, Value>) -> BTreeMap<String, Value> {
    fields
        .keys()
        .filter_map(|name| data.get(name).map(|v| (name.clone(), v.clone())))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::FieldSpec;

    fn fields() -> FieldMap {
        let mut fields = FieldMap::new();
        fields.insert("report".to_string(), FieldSpec::new(FieldType::String).required(true));
        fields.insert("note".to_string(), FieldSpec::new(FieldType::String));
        fields
    }

    #[test]
    fn missing_required_field_is_an_error() {
        let data = BTreeMap::new();
        let errors = validate_fields(&fields(), &data);
        assert_eq!(errors.len(), 1);
        assert!(errors[0].contains("report"));
    }

    #[test]
    fn present_required_field_with_right_type_passes() {
        let mut data = BTreeMap::new();
        data.insert("report".to_string(), Value::String("done".into()));
        assert!(validate_fields(&fields(), &data).is_empty());
    }

    #[test]
    fn wrong_type_is_an_error() {
        let mut data = BTreeMap::new();
        data.insert("report".to_string(), Value::Number(1.0));
        let errors = validate_fields(&fields(), &data);
        assert_eq!(errors.len(), 1);
    }

    #[test]
    fn projection_keeps_only_declared_fields_present_in_data() {
        let mut data = BTreeMap::new();
        data.insert("report".to_string(), Value::String("done".into()));
        data.insert("extra".to_string(), Value::Bool(true));
        let projected = project_fields(&fields(), &data);
        assert_eq!(projected.len(), 1);
        assert_eq!(projected.get("report"), Some(&Value::String("done".into())));
    }
}
