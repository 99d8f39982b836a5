use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::logging::CONFIG_TARGET;

pub const DEFAULT_SERVER_URL: &str = "http://127.0.0.1:8000";

/// Server configuration stored locally
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub server_url: String,
    pub last_updated: chrono::DateTime<chrono::Utc>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            server_url: DEFAULT_SERVER_URL.to_string(),
            last_updated: chrono::Utc::now(),
        }
    }
}

/// Last-used universe and character, so commands can omit them
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Workspace {
    pub universe_id: Option<i64>,
    pub character_id: Option<i64>,
}

/// Configuration manager for the .tweaknow directory
pub struct ConfigManager {
    config_dir: PathBuf,
}

impl ConfigManager {
    /// Create a config manager rooted at `~/.tweaknow`
    pub fn new() -> Result<Self> {
        let home_dir = dirs::home_dir().context("Could not determine home directory")?;
        Self::with_dir(home_dir.join(".tweaknow"))
    }

    /// Create a config manager rooted at an explicit directory
    pub fn with_dir(config_dir: impl Into<PathBuf>) -> Result<Self> {
        let config_dir = config_dir.into();
        if !config_dir.exists() {
            fs::create_dir_all(&config_dir).context("Failed to create .tweaknow directory")?;
        }
        Ok(Self { config_dir })
    }

    pub fn config_dir(&self) -> &Path {
        &self.config_dir
    }

    fn server_config_file(&self) -> PathBuf {
        self.config_dir.join("server_config.json")
    }

    fn workspace_file(&self) -> PathBuf {
        self.config_dir.join("workspace.json")
    }

    /// Save server configuration
    pub fn save_server_config(&self, config: &ServerConfig) -> Result<()> {
        write_json(&self.server_config_file(), config)
            .context("Failed to write server config file")
    }

    /// Load server configuration
    pub fn load_server_config(&self) -> Result<Option<ServerConfig>> {
        read_json(&self.server_config_file()).context("Failed to read server config")
    }

    pub fn save_workspace(&self, workspace: &Workspace) -> Result<()> {
        write_json(&self.workspace_file(), workspace).context("Failed to write workspace file")
    }

    pub fn load_workspace(&self) -> Result<Workspace> {
        Ok(read_json(&self.workspace_file())
            .context("Failed to read workspace file")?
            .unwrap_or_default())
    }
}

fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value).context("Failed to serialize config")?;
    fs::write(path, json)?;
    log::debug!(target: CONFIG_TARGET, "wrote {}", path.display());
    Ok(())
}

fn read_json<T: for<'de> Deserialize<'de>>(path: &Path) -> Result<Option<T>> {
    if !path.exists() {
        return Ok(None);
    }
    let json = fs::read_to_string(path)?;
    let value = serde_json::from_str(&json).context("Failed to parse config")?;
    Ok(Some(value))
}
