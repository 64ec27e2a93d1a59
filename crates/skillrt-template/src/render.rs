//! Node-tree construction and rendering (§4.B).

use std::collections::{BTreeMap, BTreeSet};

use skillrt_core::{Scope, SkillError, Value, VariableResolver};

use crate::ast::{ArithOp, IndexExpr, Node, PathSegment, TemplateExpr};
use crate::parser::{parse_expr, parse_var_path};
use crate::tokenizer::{tokenize, RawToken};

/// Parse a template document into a node tree.
pub fn parse_template(template: &str) -> Result<Vec<Node>, SkillError> {
    let tokens = tokenize(template)?;
    let mut cursor = NodeBuilder {
        tokens: &tokens,
        pos: 0,
        template,
    };
    let nodes = cursor.parse_block(false)?;
    if cursor.pos != cursor.tokens.len() {
        return Err(SkillError::TemplateRender {
            template: template.to_string(),
            position: 0,
            reason: "unmatched '{{/for}}'".to_string(),
        });
    }
    Ok(nodes)
}

struct NodeBuilder<'a> {
    tokens: &'a [RawToken],
    pos: usize,
    template: &'a str,
}

impl<'a> NodeBuilder<'a> {
    fn parse_block(&mut self, in_for: bool) -> Result<Vec<Node>, SkillError> {
        let mut nodes = Vec::new();
        while self.pos < self.tokens.len() {
            match &self.tokens[self.pos] {
                RawToken::Text(text) => {
                    nodes.push(Node::Text(text.clone()));
                    self.pos += 1;
                }
                RawToken::Expression(source) => {
                    let expr = parse_expr(source, self.template)?;
                    nodes.push(Node::Expr(expr));
                    self.pos += 1;
                }
                RawToken::ForEnd => {
                    if in_for {
                        return Ok(nodes);
                    }
                    return Err(SkillError::TemplateRender {
                        template: self.template.to_string(),
                        position: 0,
                        reason: "unmatched '{{/for}}'".to_string(),
                    });
                }
                RawToken::ForStart(path_source) => {
                    let array_path = parse_var_path(path_source, self.template)?;
                    self.pos += 1;
                    let body = self.parse_block(true)?;
                    if self.pos >= self.tokens.len() {
                        return Err(SkillError::TemplateRender {
                            template: self.template.to_string(),
                            position: 0,
                            reason: "unclosed '{{#for}}' block".to_string(),
                        });
                    }
                    // consume the ForEnd
                    self.pos += 1;
                    nodes.push(Node::For { array_path, body });
                }
            }
        }
        if in_for {
            return Err(SkillError::TemplateRender {
                template: self.template.to_string(),
                position: 0,
                reason: "unclosed '{{#for}}' block".to_string(),
            });
        }
        Ok(nodes)
    }
}

/// Render a template document against a scope, producing the final string
/// (§4.B `render`).
pub fn render(template: &str, scope: &Scope) -> Result<String, SkillError> {
    let nodes = parse_template(template)?;
    let mut out = String::new();
    render_nodes(&nodes, scope, &mut out);
    Ok(out)
}

fn render_nodes(nodes: &[Node], scope: &Scope, out: &mut String) {
    for node in nodes {
        match node {
            Node::Text(text) => out.push_str(text),
            Node::Expr(expr) => out.push_str(&eval_template_expr(expr, scope).render()),
            Node::For { array_path, body } => render_for(array_path, body, scope, out),
        }
    }
}

fn render_for(array_path: &[PathSegment], body: &[Node], scope: &Scope, out: &mut String) {
    let resolved = resolve_path(array_path, scope);
    let Value::Array(items) = resolved else {
        // Not a sequence: the block produces empty text (§4.B).
        return;
    };
    for item in items {
        let mut frame = BTreeMap::new();
        frame.insert("_".to_string(), item.clone());
        if let Value::Object(map) = &item {
            for (k, v) in map {
                frame.insert(k.clone(), v.clone());
            }
        }
        let child_scope = scope.child(frame);
        render_nodes(body, &child_scope, out);
    }
}

/// Resolve a `var_access` path (field/index segments) against a scope.
fn resolve_path(segments: &[PathSegment], scope: &Scope) -> Value {
    let Some(first) = segments.first() else {
        return Value::Null;
    };
    let PathSegment::Field(root) = first else {
        return Value::Null;
    };
    let mut current = scope.resolve(&[root.clone()]);
    for segment in &segments[1..] {
        current = match segment {
            PathSegment::Field(name) => match &current {
                Value::Object(map) => map.get(name).cloned().unwrap_or(Value::Null),
                _ => Value::Null,
            },
            PathSegment::Index(idx) => {
                let index = match idx {
                    IndexExpr::Literal(n) => Some(*n),
                    IndexExpr::Variable(name) => {
                        match scope.resolve(&[name.clone()]) {
                            Value::Number(n) if n.fract() == 0.0 => Some(n as i64),
                            _ => None,
                        }
                    }
                };
                match (index, &current) {
                    (Some(i), Value::Array(items)) if i >= 0 => {
                        items.get(i as usize).cloned().unwrap_or(Value::Null)
                    }
                    _ => Value::Null,
                }
            }
        };
    }
    current
}

fn number_of(v: &Value) -> f64 {
    match v {
        Value::Number(n) => *n,
        _ => f64::NAN,
    }
}

fn eval_template_expr(expr: &TemplateExpr, scope: &Scope) -> Value {
    match expr {
        TemplateExpr::Number(n) => Value::Number(*n),
        TemplateExpr::StringLit(s) => Value::String(s.clone()),
        TemplateExpr::Current => scope.resolve(&["_".to_string()]),
        TemplateExpr::Var(path) => resolve_path(path, scope),
        TemplateExpr::Binary(op, l, r) => {
            let lv = eval_template_expr(l, scope);
            let rv = eval_template_expr(r, scope);
            if *op == ArithOp::Add && (matches!(lv, Value::String(_)) || matches!(rv, Value::String(_))) {
                return Value::String(format!("{}{}", lv.render(), rv.render()));
            }
            let ln = number_of(&lv);
            let rn = number_of(&rv);
            let result = match op {
                ArithOp::Add => ln + rn,
                ArithOp::Sub => ln - rn,
                ArithOp::Mul => ln * rn,
                ArithOp::Div => ln / rn,
            };
            Value::Number(result)
        }
    }
}

/// Recursively render every string leaf of a (possibly nested) `Value`
/// tree, preserving map/array structure; non-string leaves pass through
/// unchanged (§4.B `renderInputs`).
pub fn render_inputs(value: &Value, scope: &Scope) -> Result<Value, SkillError> {
    match value {
        Value::String(s) => Ok(Value::String(render(s, scope)?)),
        Value::Array(items) => {
            let mut out = Vec::with_capacity(items.len());
            for item in items {
                out.push(render_inputs(item, scope)?);
            }
            Ok(Value::Array(out))
        }
        Value::Object(map) => {
            let mut out = BTreeMap::new();
            for (k, v) in map {
                out.insert(k.clone(), render_inputs(v, scope)?);
            }
            Ok(Value::Object(out))
        }
        other => Ok(other.clone()),
    }
}

/// The set of free root identifiers referenced by a template (§4.B
/// `extractVariables`), used by validators.
pub fn extract_variables(template: &str) -> Result<BTreeSet<String>, SkillError> {
    let nodes = parse_template(template)?;
    let mut out = BTreeSet::new();
    collect_variables(&nodes, &mut out);
    Ok(out)
}

fn collect_variables(nodes: &[Node], out: &mut BTreeSet<String>) {
    for node in nodes {
        match node {
            Node::Text(_) => {}
            Node::Expr(expr) => collect_expr_variables(expr, out),
            Node::For { array_path, body } => {
                if let Some(PathSegment::Field(name)) = array_path.first() {
                    out.insert(name.clone());
                }
                collect_path_index_variables(array_path, out);
                collect_variables(body, out);
            }
        }
    }
}

fn collect_expr_variables(expr: &TemplateExpr, out: &mut BTreeSet<String>) {
    match expr {
        TemplateExpr::Number(_) | TemplateExpr::StringLit(_) | TemplateExpr::Current => {}
        TemplateExpr::Var(path) => {
            if let Some(PathSegment::Field(name)) = path.first() {
                out.insert(name.clone());
            }
            collect_path_index_variables(path, out);
        }
        TemplateExpr::Binary(_, l, r) => {
            collect_expr_variables(l, out);
            collect_expr_variables(r, out);
        }
    }
}

fn collect_path_index_variables(path: &[PathSegment], out: &mut BTreeSet<String>) {
    for segment in path {
        if let PathSegment::Index(IndexExpr::Variable(name)) = segment {
            out.insert(name.clone());
        }
    }
}

/// Whether a template document parses without error (§4.B `isValid`).
pub fn is_valid(template: &str) -> bool {
    parse_template(template).is_ok()
}
