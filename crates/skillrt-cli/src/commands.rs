//! Command handlers: each wires a `SkillExecutor` together with the
//! file-backed snapshot demo store and prints a `SkillResult` as JSON.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use chrono::Utc;

use skillrt_context::{ExecutionStore, InMemoryExecutionStore};
use skillrt_core::types::Skill;
use skillrt_core::Value;
use skillrt_exec::{default_executors, EchoTool, LLMAdapterRegistry, StaticLlmAdapter, ToolRegistry};
use skillrt_orchestrator::{SkillExecutor, SkillResult};

use crate::config::RuntimeConfig;
use crate::{result_json, snapshot_files};

fn demo_executor(store: Arc<InMemoryExecutionStore>) -> SkillExecutor {
    let tools = Arc::new(ToolRegistry::new());
    tools.register(Arc::new(EchoTool::new()));
    let adapters = Arc::new(LLMAdapterRegistry::new());
    adapters.register(Arc::new(StaticLlmAdapter::new()));
    SkillExecutor::new(store, default_executors(tools, adapters))
}

fn load_skill(path: &Path) -> Result<Skill> {
    let content = std::fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))?;
    skillrt_model::parse_skill(&content).with_context(|| format!("failed to parse skill document {}", path.display()))
}

fn load_input(input: Option<String>, input_file: Option<PathBuf>) -> Result<BTreeMap<String, Value>> {
    let raw = match (input, input_file) {
        (Some(json), None) => json,
        (None, Some(path)) => std::fs::read_to_string(&path).with_context(|| format!("failed to read {}", path.display()))?,
        (None, None) => return Ok(BTreeMap::new()),
        (Some(_), Some(_)) => unreachable!("clap enforces --input and --input-file are mutually exclusive"),
    };
    let json: serde_json::Value = serde_json::from_str(&raw).context("input is not valid JSON")?;
    let serde_json::Value::Object(map) = json else {
        anyhow::bail!("input must be a JSON object");
    };
    Ok(map.into_iter().map(|(k, v)| (k, Value::from(v))).collect())
}

async fn run_result(cwd: &Path, skill_file: &Path, input: Option<String>, input_file: Option<PathBuf>) -> Result<SkillResult> {
    let skill = load_skill(skill_file)?;
    let input = load_input(input, input_file)?;

    let store = Arc::new(InMemoryExecutionStore::new());
    let executor = demo_executor(store.clone());
    let result = executor.execute(&skill, input).await;

    if result.awaiting {
        if let Some(execution_id) = &result.execution_id {
            if let Some(snapshot) = store.find_by_id(execution_id) {
                snapshot_files::save(cwd, &snapshot)?;
            }
        }
    }

    Ok(result)
}

pub async fn run(cwd: &Path, skill_file: PathBuf, input: Option<String>, input_file: Option<PathBuf>) -> Result<()> {
    let result = run_result(cwd, &skill_file, input, input_file).await?;
    println!("{}", serde_json::to_string_pretty(&result_json::to_json(&result))?);
    Ok(())
}

async fn resume_result(
    cwd: &Path,
    skill_file: &Path,
    execution_id: &str,
    input: Option<String>,
    input_file: Option<PathBuf>,
) -> Result<SkillResult> {
    let skill = load_skill(skill_file)?;
    let input = load_input(input, input_file)?;

    let snapshot = snapshot_files::load(cwd, execution_id)?;
    let store = Arc::new(InMemoryExecutionStore::new());
    store.save(snapshot);
    let executor = demo_executor(store.clone());

    let result = executor.resume(&skill, execution_id, input).await;

    if result.awaiting {
        if let Some(id) = &result.execution_id {
            if let Some(snapshot) = store.find_by_id(id) {
                snapshot_files::save(cwd, &snapshot)?;
            }
        }
    } else {
        snapshot_files::remove(cwd, execution_id)?;
    }

    Ok(result)
}

pub async fn resume(cwd: &Path, skill_file: PathBuf, execution_id: String, input: Option<String>, input_file: Option<PathBuf>) -> Result<()> {
    let result = resume_result(cwd, &skill_file, &execution_id, input, input_file).await?;
    println!("{}", serde_json::to_string_pretty(&result_json::to_json(&result))?);
    Ok(())
}

async fn sweep_count(cwd: &Path) -> Result<usize> {
    let config = RuntimeConfig::load(cwd)?;
    let snapshots = snapshot_files::load_all(cwd)?;

    let store = Arc::new(InMemoryExecutionStore::new());
    let ids: Vec<String> = snapshots.iter().map(|s| s.execution_id.clone()).collect();
    for snapshot in snapshots {
        store.save(snapshot);
    }
    let executor = demo_executor(store.clone());

    let cutoff = Utc::now() - chrono::Duration::seconds(config.default_await_timeout_secs as i64);
    let swept = executor.sweep_expired(cutoff);

    for id in ids {
        if let Some(snapshot) = store.find_by_id(&id) {
            snapshot_files::save(cwd, &snapshot)?;
        }
    }

    Ok(swept)
}

pub async fn sweep(cwd: &Path) -> Result<()> {
    let swept = sweep_count(cwd).await?;
    println!("{}", serde_json::json!({"swept": swept}));
    Ok(())
}

#[cfg(test)]
#[path = "commands_tests.rs"]
mod tests;
