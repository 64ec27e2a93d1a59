//! Top-level marker scanner: splits a template document into `TEXT`,
//! `EXPRESSION`, `FOR_START(arrayPath)`, and `FOR_END` tokens (§4.B).
//!
//! Markers are `{{ … }}`; `{{#for <var>}} … {{/for}}` begins/ends a loop
//! block.

use skillrt_core::SkillError;

#[derive(Clone, Debug, PartialEq)]
pub enum RawToken {
    Text(String),
    Expression(String),
    ForStart(String),
    ForEnd,
}

/// Split `template` into raw marker tokens. An unclosed `{{` is a parse
/// error (§4.B: "Unclosed `{{#for}}` is a parse error" — and, by the same
/// logic, any unclosed marker).
pub fn tokenize(template: &str) -> Result<Vec<RawToken>, SkillError> {
    let mut tokens = Vec::new();
    let mut rest = template;
    let mut consumed = 0usize;

    loop {
        match rest.find("{{") {
            None => {
                if !rest.is_empty() {
                    tokens.push(RawToken::Text(rest.to_string()));
                }
                break;
            }
            Some(open_rel) => {
                if open_rel > 0 {
                    tokens.push(RawToken::Text(rest[..open_rel].to_string()));
                }
                let after_open = &rest[open_rel + 2..];
                let Some(close_rel) = after_open.find("}}") else {
                    return Err(SkillError::TemplateRender {
                        template: template.to_string(),
                        position: consumed + open_rel,
                        reason: "unclosed '{{' marker".to_string(),
                    });
                };
                let marker = after_open[..close_rel].trim();
                tokens.push(classify_marker(marker));

                let marker_total_len = open_rel + 2 + close_rel + 2;
                consumed += marker_total_len;
                rest = &after_open[close_rel + 2..];
            }
        }
    }

    Ok(tokens)
}

fn classify_marker(marker: &str) -> RawToken {
    if let Some(rest) = marker.strip_prefix("#for") {
        RawToken::ForStart(rest.trim().to_string())
    } else if marker.trim_start().starts_with("/for") {
        RawToken::ForEnd
    } else {
        RawToken::Expression(marker.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_text_and_expressions() {
        let tokens = tokenize("hello {{name}}!").unwrap();
        assert_eq!(
            tokens,
            vec![
                RawToken::Text("hello ".to_string()),
                RawToken::Expression("name".to_string()),
                RawToken::Text("!".to_string()),
            ]
        );
    }

    #[test]
    fn recognizes_for_markers() {
        let tokens = tokenize("{{#for items}}{{v}}{{/for}}").unwrap();
        assert_eq!(
            tokens,
            vec![
                RawToken::ForStart("items".to_string()),
                RawToken::Expression("v".to_string()),
                RawToken::ForEnd,
            ]
        );
    }

    #[test]
    fn unclosed_marker_is_error() {
        let err = tokenize("hello {{name").unwrap_err();
        assert!(matches!(err, SkillError::TemplateRender { .. }));
    }
}
