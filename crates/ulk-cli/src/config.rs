use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Context;
use serde::{Deserialize, Serialize};
use ulk_registry::RegistryConfig;
use ulk_transfer::BankConfig;

/// Settings for the `ulk` binary, read from an optional TOML file.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CliConfig {
    /// Where the session (registry snapshot + bank balances) lives.
    pub session_path: PathBuf,
    pub registry: RegistryConfig,
    pub bank: BankConfig,
}

impl Default for CliConfig {
    fn default() -> Self {
        Self {
            session_path: PathBuf::from("ulk-session.json"),
            registry: RegistryConfig::default(),
            bank: BankConfig::default(),
        }
    }
}

impl CliConfig {
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        toml::from_str(&text).with_context(|| format!("parsing config {}", path.display()))
    }

    /// Load `path` if given, otherwise use defaults.
    pub fn resolve(path: Option<&Path>) -> anyhow::Result<Self> {
        path.map_or_else(|| Ok(Self::default()), Self::load)
    }
}
