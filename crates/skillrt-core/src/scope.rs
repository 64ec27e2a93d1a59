//! The variable scope consulted by both the condition and template engines
//! (§4.A, §4.B: "Variable resolution uses the same scope as the condition
//! engine").

use std::collections::BTreeMap;

use crate::value::Value;

/// Anything that can resolve a dotted variable path to a [`Value`].
/// Missing variables resolve to `Value::Null`, never an error (§4.A).
pub trait VariableResolver {
    fn resolve(&self, path: &[String]) -> Value;
}

/// A stack of flat frames, innermost first in lookup order. Used directly
/// as the condition/template variable scope, and as the overlay mechanism
/// for `{{#for}}` loop bodies (push a frame binding `_` and the element's
/// merged fields, pop it when the iteration ends).
#[derive(Clone, Debug, Default)]
pub struct Scope {
    frames: Vec<BTreeMap<String, Value>>,
}

impl Scope {
    pub fn new(base: BTreeMap<String, Value>) -> Self {
        Scope { frames: vec![base] }
    }

    pub fn empty() -> Self {
        Scope { frames: vec![] }
    }

    pub fn push_frame(&mut self, frame: BTreeMap<String, Value>) {
        self.frames.push(frame);
    }

    pub fn pop_frame(&mut self) {
        self.frames.pop();
    }

    /// Build a child scope with one additional innermost frame, leaving
    /// `self` untouched.
    pub fn child(&self, frame: BTreeMap<String, Value>) -> Scope {
        let mut frames = self.frames.clone();
        frames.push(frame);
        Scope { frames }
    }

    /// Flatten all frames into a single map (outer entries first, inner
    /// frames shadow outer ones) — used when a caller needs a plain map
    /// rather than resolver semantics.
    pub fn flatten(&self) -> BTreeMap<String, Value> {
        let mut out = BTreeMap::new();
        for frame in &self.frames {
            out.extend(frame.clone());
        }
        out
    }
}

impl VariableResolver for Scope {
    fn resolve(&self, path: &[String]) -> Value {
        let Some(root) = path.first() else {
            return Value::Null;
        };
        for frame in self.frames.iter().rev() {
            if let Some(value) = frame.get(root) {
                if path.len() == 1 {
                    return value.clone();
                }
                let rest: Vec<&str> = path[1..].iter().map(|s| s.as_str()).collect();
                return value.get_path(&rest).cloned().unwrap_or(Value::Null);
            }
        }
        Value::Null
    }
}
