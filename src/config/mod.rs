use crate::services::host::{DEFAULT_INSTALLER, LSB_RELEASE_PATH};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

pub const CONFIG_PATH_VAR: &str = "CHARMHELPERS_CONFIG";
pub const TOOLS_DIR_VAR: &str = "CHARMHELPERS_TOOLS_DIR";
pub const LOG_VAR: &str = "CHARMHELPERS_LOG";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HelperConfig {
    /// Directory searched for hook tools before `PATH`
    pub tools_dir: Option<PathBuf>,
    /// Package installer command line, program first
    pub installer: Vec<String>,
    pub lsb_release_path: PathBuf,
    /// `tracing` filter directive for the CLI (e.g. `debug`)
    pub log_filter: Option<String>,
}

impl Default for HelperConfig {
    fn default() -> Self {
        Self {
            tools_dir: None,
            installer: DEFAULT_INSTALLER.iter().map(|s| s.to_string()).collect(),
            lsb_release_path: PathBuf::from(LSB_RELEASE_PATH),
            log_filter: None,
        }
    }
}

impl HelperConfig {
    /// Apply `CHARMHELPERS_*` overrides from an environment lookup
    pub fn apply_env_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(dir) = lookup(TOOLS_DIR_VAR).filter(|v| !v.is_empty()) {
            self.tools_dir = Some(PathBuf::from(dir));
        }
        if let Some(filter) = lookup(LOG_VAR).filter(|v| !v.is_empty()) {
            self.log_filter = Some(filter);
        }
    }
}

pub fn load_config_file(path: &Path) -> Result<HelperConfig> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    let config: HelperConfig = toml::from_str(&content)
        .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

    Ok(config)
}

/// Load helper configuration
///
/// Reads `.env` if present, then the file named by `path` or
/// `$CHARMHELPERS_CONFIG` (defaults when neither is set), then applies
/// environment overrides.
pub fn load_config(path: Option<&Path>) -> Result<HelperConfig> {
    dotenv::dotenv().ok();

    let from_env = std::env::var_os(CONFIG_PATH_VAR).map(PathBuf::from);
    let mut config = match path.map(Path::to_path_buf).or(from_env) {
        Some(file) => load_config_file(&file)?,
        None => HelperConfig::default(),
    };

    config.apply_env_overrides(|key| std::env::var(key).ok());
    Ok(config)
}
