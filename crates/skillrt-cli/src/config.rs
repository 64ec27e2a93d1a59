//! `RuntimeConfig`: sweep interval and default await timeout, loaded from
//! `.skillrt/config.toml` with the same "missing file ⇒ defaults, present
//! but malformed ⇒ hard error" posture as `csa-config::ProjectConfig::load`.

use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RuntimeConfig {
    #[serde(default = "default_sweep_interval_secs")]
    pub sweep_interval_secs: u64,
    #[serde(default = "default_await_timeout_secs")]
    pub default_await_timeout_secs: u64,
}

fn default_sweep_interval_secs() -> u64 {
    300
}

fn default_await_timeout_secs() -> u64 {
    3600
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            sweep_interval_secs: default_sweep_interval_secs(),
            default_await_timeout_secs: default_await_timeout_secs(),
        }
    }
}

impl RuntimeConfig {
    /// Reads `<dir>/.skillrt/config.toml`. No file at all falls back to
    /// defaults; a present-but-unparseable file is a hard error.
    pub fn load(dir: &Path) -> Result<Self> {
        let path = dir.join(".skillrt").join("config.toml");
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(&path).with_context(|| format!("failed to read {}", path.display()))?;
        toml::from_str(&content).with_context(|| format!("failed to parse {}", path.display()))
    }
}
