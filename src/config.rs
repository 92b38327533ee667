//! Panel configuration, read from a YAML file.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{PanelError, PanelResult};
use crate::logging::DEFAULT_MAX_LOG_LINES;

pub const DEFAULT_CONFIG_PATH: &str = "/etc/syncwatch-panel.yaml";
pub const CONFIG_ENV_VAR: &str = "SYNCWATCH_PANEL_CONFIG";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct PanelConfig {
    /// syncwatch CLI that owns the job database
    pub cli_path: PathBuf,
    /// Optional privilege wrapper (e.g. `sudo`) placed in front of the CLI
    pub elevate: Option<String>,
    /// Directory label under `/` that holds the shares, e.g. `shares` for `/shares/<name>`
    pub share_root: String,
    /// Program whose presence on the host enables safe references
    pub storage_feature: String,
    /// Daemon log file shown in the log view
    pub log_file: PathBuf,
    pub max_log_lines: usize,
}

impl Default for PanelConfig {
    fn default() -> Self {
        Self {
            cli_path: PathBuf::from("/opt/syncwatch/syncwatch-cli.py"),
            elevate: None,
            share_root: "shares".to_string(),
            storage_feature: "xnas".to_string(),
            log_file: PathBuf::from("/var/log/syncwatch.log"),
            max_log_lines: DEFAULT_MAX_LOG_LINES,
        }
    }
}

impl PanelConfig {
    /// Load the configuration; a missing file means defaults.
    pub fn load(path: &Path) -> PanelResult<Self> {
        let content = match std::fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Self::default()),
            Err(e) => {
                return Err(PanelError::Config(format!(
                    "cannot read {}: {e}",
                    path.display()
                )))
            }
        };
        Self::from_yaml(&content)
            .map_err(|e| PanelError::Config(format!("{}: {e}", path.display())))
    }

    pub fn from_yaml(content: &str) -> PanelResult<Self> {
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        let config: Self =
            serde_yaml::from_str(content).map_err(|e| PanelError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Resolve the config path: explicit argument, then env var, then the default location.
    pub fn resolve_path(explicit: Option<PathBuf>) -> PathBuf {
        explicit
            .or_else(|| std::env::var_os(CONFIG_ENV_VAR).map(PathBuf::from))
            .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH))
    }

    fn validate(&self) -> PanelResult<()> {
        if self.share_root.is_empty() || self.share_root.contains('/') {
            return Err(PanelError::Config(format!(
                "shareRoot must be a single directory name, got '{}'",
                self.share_root
            )));
        }
        if self.max_log_lines == 0 {
            return Err(PanelError::Config("maxLogLines must be at least 1".to_string()));
        }
        Ok(())
    }
}
