use crate::config::{ConfigManager, ServerConfig, DEFAULT_SERVER_URL};
use anyhow::Result;

pub const SERVER_URL_ENV: &str = "TWEAKNOW_SERVER_URL";

/// Server configuration utility for managing server URL settings
pub struct ServerConfigManager {
    config_manager: ConfigManager,
}

impl ServerConfigManager {
    pub fn new(config_manager: ConfigManager) -> Self {
        Self { config_manager }
    }

    pub fn config_manager(&self) -> &ConfigManager {
        &self.config_manager
    }

    /// Determine the server URL to use based on priority:
    /// 1. CLI argument (highest priority)
    /// 2. Environment variable TWEAKNOW_SERVER_URL
    /// 3. Saved configuration file
    /// 4. Default local backend (lowest priority)
    pub fn determine_server_url(&self, cli_override: Option<String>) -> Result<String> {
        if let Some(url) = cli_override {
            return Ok(url);
        }

        if let Ok(url) = std::env::var(SERVER_URL_ENV) {
            if !url.trim().is_empty() {
                return Ok(url);
            }
        }

        if let Some(config) = self.config_manager.load_server_config()? {
            return Ok(config.server_url);
        }

        Ok(DEFAULT_SERVER_URL.to_string())
    }

    /// Save server URL to configuration file
    pub fn save_server_url(&self, server_url: String) -> Result<()> {
        let config = ServerConfig {
            server_url,
            last_updated: chrono::Utc::now(),
        };
        self.config_manager.save_server_config(&config)
    }

    /// Get a display-friendly description of the server in use
    pub fn get_server_description(&self, current_url: &str) -> String {
        if current_url.trim_end_matches('/') == DEFAULT_SERVER_URL {
            "Local Backend (default)".to_string()
        } else if current_url.contains("localhost") || current_url.contains("127.0.0.1") {
            "Local Backend (custom)".to_string()
        } else {
            "Custom Server".to_string()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;
    use tempfile::TempDir;

    fn manager(temp_dir: &TempDir) -> ServerConfigManager {
        ServerConfigManager::new(ConfigManager::with_dir(temp_dir.path()).unwrap())
    }

    #[test]
    fn test_server_description() {
        let temp_dir = TempDir::new().unwrap();
        let manager = manager(&temp_dir);

        assert!(manager.get_server_description("http://127.0.0.1:8000/").contains("default"));
        assert!(manager.get_server_description("http://localhost:9000").contains("custom"));
        assert_eq!(manager.get_server_description("https://tweaks.example.com"), "Custom Server");
    }

    #[test]
    fn test_cli_override_priority() {
        let temp_dir = TempDir::new().unwrap();
        let manager = manager(&temp_dir);
        manager.save_server_url("http://saved:8000".to_string()).unwrap();

        let url = manager
            .determine_server_url(Some("http://cli-override:8000".to_string()))
            .unwrap();
        assert_eq!(url, "http://cli-override:8000");
    }

    // Env var and saved-file precedence share process state, so they are
    // checked in a single test.
    #[test]
    fn test_env_then_saved_then_default() {
        let temp_dir = TempDir::new().unwrap();
        let manager = manager(&temp_dir);
        let original = env::var(SERVER_URL_ENV).ok();

        env::remove_var(SERVER_URL_ENV);
        assert_eq!(manager.determine_server_url(None).unwrap(), DEFAULT_SERVER_URL);

        manager.save_server_url("http://saved:8000".to_string()).unwrap();
        assert_eq!(manager.determine_server_url(None).unwrap(), "http://saved:8000");

        env::set_var(SERVER_URL_ENV, "http://env-override:8000");
        assert_eq!(manager.determine_server_url(None).unwrap(), "http://env-override:8000");

        match original {
            Some(value) => env::set_var(SERVER_URL_ENV, value),
            None => env::remove_var(SERVER_URL_ENV),
        }
    }
}
