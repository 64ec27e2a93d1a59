//! `ExecutionContext`: per-execution mutable scope (§3, §4.D).

use std::collections::BTreeMap;

use skillrt_core::types::StepResult;
use skillrt_core::{Scope, Value, VariableResolver};

/// Stable identifier format `exec-<uuid>` (§3), generated the same way
/// `cli-sub-agent`'s session manager mints session ids from a ULID.
pub fn new_execution_id() -> String {
    format!("exec-{}", ulid::Ulid::new())
}

/// Per-execution mutable scope: immutable `input`, the ordered list of
/// `StepResult`s bound so far, and the append-only `awaitInputs` map
/// (§3, §4.D).
#[derive(Clone, Debug)]
pub struct ExecutionContext {
    execution_id: String,
    input: BTreeMap<String, Value>,
    step_results: Vec<StepResult>,
    await_inputs: Vec<(String, BTreeMap<String, Value>)>,
}

impl ExecutionContext {
    pub fn new(input: BTreeMap<String, Value>) -> Self {
        Self {
            execution_id: new_execution_id(),
            input,
            step_results: Vec::new(),
            await_inputs: Vec::new(),
        }
    }

    /// Reconstruct a context with a specific id (used when a snapshot is
    /// reloaded on `resume`).
    pub fn with_id(
        execution_id: String,
        input: BTreeMap<String, Value>,
        step_results: Vec<StepResult>,
        await_inputs: Vec<(String, BTreeMap<String, Value>)>,
    ) -> Self {
        Self {
            execution_id,
            input,
            step_results,
            await_inputs,
        }
    }

    pub fn execution_id(&self) -> &str {
        &self.execution_id
    }

    pub fn input(&self) -> &BTreeMap<String, Value> {
        &self.input
    }

    pub fn step_results(&self) -> &[StepResult] {
        &self.step_results
    }

    pub fn await_inputs(&self) -> &[(String, BTreeMap<String, Value>)] {
        &self.await_inputs
    }

    /// Append a step result; replacing a prior binding overwrites both the
    /// result and the variable it's bound under (§4.D).
    pub fn bind_step_result(&mut self, result: StepResult) {
        self.step_results.push(result);
    }

    /// Last-write-wins lookup by `varName` over bound step results (§4.D).
    pub fn get_by_var_name(&self, name: &str) -> Option<&Value> {
        self.step_results
            .iter()
            .rev()
            .find(|r| r.var_name.as_deref() == Some(name))
            .map(|r| &r.output)
    }

    pub fn get_input(&self, name: &str) -> Option<&Value> {
        self.input.get(name)
    }

    pub fn add_await_input(&mut self, step_name: impl Into<String>, user_map: BTreeMap<String, Value>) {
        self.await_inputs.push((step_name.into(), user_map));
    }

    /// The one variable-resolution priority shared by every consumer of
    /// this context (§4.B: "variable resolution uses the same scope as
    /// the condition engine"): (1) prior step output matched by
    /// `varName`, (2) skill input, (3) flattened `awaitInputs` (later
    /// await entries shadowing earlier ones, matching the last-write-wins
    /// rule [`Self::get_by_var_name`] already applies to step bindings).
    /// Used directly by the template/tool/prompt/await executors via
    /// [`Self::to_scope`], by output-contract validation, and — via
    /// [`VariableResolver::resolve`] — by `when`-condition evaluation, so
    /// a `when` gate and the step body it guards can never disagree about
    /// a variable's value.
    pub fn build_variable_scope(&self) -> BTreeMap<String, Value> {
        let mut scope = BTreeMap::new();
        for (_, user_map) in &self.await_inputs {
            for (k, v) in user_map {
                scope.insert(k.clone(), v.clone());
            }
        }
        for (k, v) in &self.input {
            scope.insert(k.clone(), v.clone());
        }
        for result in &self.step_results {
            if let Some(name) = &result.var_name {
                scope.insert(name.clone(), result.output.clone());
            }
        }
        scope
    }

    /// A [`Scope`] view for the template engine, built from
    /// [`Self::build_variable_scope`].
    pub fn to_scope(&self) -> Scope {
        Scope::new(self.build_variable_scope())
    }
}

impl VariableResolver for ExecutionContext {
    /// Delegates to [`Self::build_variable_scope`] so `when`-condition
    /// evaluation and template/tool/prompt rendering never diverge on the
    /// same variable (§4.B).
    fn resolve(&self, path: &[String]) -> Value {
        let Some(root) = path.first() else {
            return Value::Null;
        };

        let scope = self.build_variable_scope();
        let Some(value) = scope.get(root) else {
            return Value::Null;
        };
        if path.len() == 1 {
            return value.clone();
        }
        let rest: Vec<&str> = path[1..].iter().map(|s| s.as_str()).collect();
        value.get_path(&rest).cloned().unwrap_or(Value::Null)
    }
}
