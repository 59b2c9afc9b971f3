use std::path::PathBuf;

use anyhow::{anyhow, Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};

fn default_timeout_seconds() -> u64 {
    15
}

fn default_export_timeout_seconds() -> u64 {
    90
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct AppConfig {
    pub api_base_url: String,
    pub api_token: String,
    pub timeout_seconds: u64,
    pub export_timeout_seconds: u64,
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            api_base_url: "http://localhost:8000".to_string(),
            api_token: String::new(),
            timeout_seconds: default_timeout_seconds(),
            export_timeout_seconds: default_export_timeout_seconds(),
        }
    }
}

pub fn default_config_path() -> Result<PathBuf> {
    let project_dirs = ProjectDirs::from("com", "leaddesk", "leaddesk")
        .ok_or_else(|| anyhow!("unable to resolve config directory"))?;
    Ok(project_dirs.config_dir().join("config.yml"))
}

/// Loads the config file, tolerating a missing one, then layers environment
/// overrides on top so a token never has to live on disk.
pub fn load_config(path: &PathBuf) -> Result<AppConfig> {
    let mut config = match std::fs::read_to_string(path) {
        Ok(contents) => serde_yaml::from_str::<AppConfig>(&contents)
            .with_context(|| format!("failed to parse config '{}'", path.display()))?,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => AppConfig::default(),
        Err(err) => {
            return Err(err).with_context(|| format!("failed to read config '{}'", path.display()))
        }
    };

    if let Ok(url) = std::env::var("LEADDESK_API_URL") {
        if !url.trim().is_empty() {
            config.api_base_url = url;
        }
    }
    if let Ok(token) = std::env::var("LEADDESK_API_TOKEN") {
        if !token.trim().is_empty() {
            config.api_token = token;
        }
    }

    config.api_base_url = config.api_base_url.trim_end_matches('/').to_string();
    Ok(config)
}

fn default_config_yaml() -> String {
    r#"# Leaddesk config
#
# Location (default):
#   <platform config dir>/leaddesk/config.yml

# REST API the dashboard administers
api_base_url: http://localhost:8000
api_token: ""

# HTTP
timeout_seconds: 15
export_timeout_seconds: 90
"#
    .to_string()
}

pub fn ensure_default_config_file(path: &PathBuf) -> Result<()> {
    if path.exists() {
        return Ok(());
    }
    let parent = path
        .parent()
        .ok_or_else(|| anyhow!("invalid config path '{}'", path.display()))?;
    std::fs::create_dir_all(parent)
        .with_context(|| format!("failed to create config directory '{}'", parent.display()))?;
    std::fs::write(path, default_config_yaml())
        .with_context(|| format!("failed to write config file '{}'", path.display()))?;
    Ok(())
}
