use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::Path;

use loopia_dns::{BASE_URL, DEFAULT_TIMEOUT};

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default = "default_log_level")]
    pub log_level: String,
    #[serde(default)]
    pub loopia: LoopiaConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoopiaConfig {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
    #[serde(default = "default_endpoint")]
    pub endpoint: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_endpoint() -> String {
    BASE_URL.to_string()
}

fn default_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT.as_secs()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            loopia: LoopiaConfig::default(),
        }
    }
}

impl Default for LoopiaConfig {
    fn default() -> Self {
        Self {
            username: String::new(),
            password: String::new(),
            endpoint: default_endpoint(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl Config {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(config)
    }

    /// Command-line credentials take precedence over the file.
    pub fn with_credentials(mut self, username: Option<String>, password: Option<String>) -> Self {
        if let Some(username) = username {
            self.loopia.username = username;
        }
        if let Some(password) = password {
            self.loopia.password = password;
        }
        self
    }
}
