//! Demo-only snapshot persistence: one JSON file per suspended execution
//! under `.skillrt/snapshots/`, so `run` and `resume` can be separate CLI
//! invocations. Grounded on `csa-session::manager`'s save/load-by-id
//! pattern, swapping `toml` for `serde_json` per the snapshot format.

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use skillrt_context::Snapshot;

fn snapshots_dir(root: &Path) -> PathBuf {
    root.join(".skillrt").join("snapshots")
}

fn snapshot_path(root: &Path, execution_id: &str) -> PathBuf {
    snapshots_dir(root).join(format!("{execution_id}.json"))
}

pub fn save(root: &Path, snapshot: &Snapshot) -> Result<()> {
    let dir = snapshots_dir(root);
    std::fs::create_dir_all(&dir).with_context(|| format!("failed to create {}", dir.display()))?;
    let path = snapshot_path(root, &snapshot.execution_id);
    let content = serde_json::to_string_pretty(snapshot).context("failed to serialize snapshot")?;
    std::fs::write(&path, content).with_context(|| format!("failed to write {}", path.display()))
}

pub fn load(root: &Path, execution_id: &str) -> Result<Snapshot> {
    let path = snapshot_path(root, execution_id);
    if !path.exists() {
        bail!("no suspended execution '{execution_id}' found under {}", snapshots_dir(root).display());
    }
    let content = std::fs::read_to_string(&path).with_context(|| format!("failed to read {}", path.display()))?;
    serde_json::from_str(&content).with_context(|| format!("failed to parse {}", path.display()))
}

pub fn load_all(root: &Path) -> Result<Vec<Snapshot>> {
    let dir = snapshots_dir(root);
    if !dir.exists() {
        return Ok(Vec::new());
    }
    let mut snapshots = Vec::new();
    for entry in std::fs::read_dir(&dir).with_context(|| format!("failed to read {}", dir.display()))? {
        let entry = entry?;
        if entry.path().extension().and_then(|e| e.to_str()) != Some("json") {
            continue;
        }
        let content = std::fs::read_to_string(entry.path())?;
        snapshots.push(serde_json::from_str(&content).with_context(|| format!("failed to parse {}", entry.path().display()))?);
    }
    Ok(snapshots)
}

pub fn remove(root: &Path, execution_id: &str) -> Result<()> {
    let path = snapshot_path(root, execution_id);
    if path.exists() {
        std::fs::remove_file(&path).with_context(|| format!("failed to remove {}", path.display()))?;
    }
    Ok(())
}
