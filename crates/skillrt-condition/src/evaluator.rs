//! Tree-walking evaluator for condition ASTs (§4.A).
//!
//! Evaluation never fails — only [`crate::parser::parse`] can. Type
//! mismatches on ordering operators resolve to `false` rather than raising.

use skillrt_core::{Value, VariableResolver};

use crate::ast::{BinaryOp, Expr};

/// Evaluate a parsed condition AST against a variable scope, returning the
/// boolean result.
pub fn evaluate(ast: &Expr, scope: &dyn VariableResolver) -> bool {
    eval_value(ast, scope).is_truthy()
}

/// Evaluate and also produce a human-readable trace of the comparisons
/// performed, useful for debugging a `when` that didn't fire as expected.
pub fn evaluate_with_trace(ast: &Expr, scope: &dyn VariableResolver) -> (bool, String) {
    let mut trace = String::new();
    let value = eval_traced(ast, scope, &mut trace);
    (value.is_truthy(), trace)
}

fn eval_traced(expr: &Expr, scope: &dyn VariableResolver, trace: &mut String) -> Value {
    match expr {
        Expr::Binary(op, l, r) => {
            let result = eval_binary(*op, l, r, scope);
            trace.push_str(&format!(
                "{} {} {} -> {}\n",
                describe(l, scope),
                op.as_str(),
                describe(r, scope),
                result.render()
            ));
            result
        }
        other => eval_value(other, scope),
    }
}

fn describe(expr: &Expr, scope: &dyn VariableResolver) -> String {
    eval_value(expr, scope).render()
}

fn eval_value(expr: &Expr, scope: &dyn VariableResolver) -> Value {
    match expr {
        Expr::NullLit => Value::Null,
        Expr::BoolLit(b) => Value::Bool(*b),
        Expr::NumberLit(n) => Value::Number(*n),
        Expr::StringLit(s) => Value::String(s.clone()),
        Expr::VariableRef(path) => scope.resolve(path),
        Expr::Binary(op, l, r) => eval_binary(*op, l, r, scope),
    }
}

fn eval_binary(op: BinaryOp, l: &Expr, r: &Expr, scope: &dyn VariableResolver) -> Value {
    match op {
        // Short-circuit && and || (§4.A).
        BinaryOp::And => {
            if !eval_value(l, scope).is_truthy() {
                return Value::Bool(false);
            }
            Value::Bool(eval_value(r, scope).is_truthy())
        }
        BinaryOp::Or => {
            if eval_value(l, scope).is_truthy() {
                return Value::Bool(true);
            }
            Value::Bool(eval_value(r, scope).is_truthy())
        }
        BinaryOp::Eq => Value::Bool(eval_value(l, scope) == eval_value(r, scope)),
        BinaryOp::NotEq => Value::Bool(eval_value(l, scope) != eval_value(r, scope)),
        BinaryOp::Gte | BinaryOp::Lte | BinaryOp::Gt | BinaryOp::Lt => {
            let lv = eval_value(l, scope);
            let rv = eval_value(r, scope);
            Value::Bool(compare(op, &lv, &rv))
        }
    }
}

/// `<`, `<=`, `>`, `>=`: numeric compare if both sides are numbers,
/// lexicographic if both sides are strings, otherwise `false` (§4.A: "type
/// mismatch does not raise").
fn compare(op: BinaryOp, l: &Value, r: &Value) -> bool {
    match (l, r) {
        (Value::Number(a), Value::Number(b)) => match op {
            BinaryOp::Gte => a >= b,
            BinaryOp::Lte => a <= b,
            BinaryOp::Gt => a > b,
            BinaryOp::Lt => a < b,
            _ => unreachable!(),
        },
        (Value::String(a), Value::String(b)) => match op {
            BinaryOp::Gte => a >= b,
            BinaryOp::Lte => a <= b,
            BinaryOp::Gt => a > b,
            BinaryOp::Lt => a < b,
            _ => unreachable!(),
        },
        _ => false,
    }
}
