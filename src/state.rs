use std::fs;
use std::path::{Path, PathBuf};

use crate::types::Config;

/// Environment variable that overrides the configured bearer token.
pub const TOKEN_ENV_VAR: &str = "ADMINPANEL_TOKEN";

/// Directory holding adminpanel configuration (`~/.adminpanel`).
pub fn get_state_dir() -> Result<PathBuf, String> {
    let home = dirs::home_dir().ok_or("Could not find home directory")?;
    Ok(home.join(".adminpanel"))
}

/// Load configuration from `~/.adminpanel/config.json`.
pub fn load_config() -> Result<Config, String> {
    let config_path = get_state_dir()?.join("config.json");
    let mut config = load_config_from(&config_path)?;
    if let Ok(token) = std::env::var(TOKEN_ENV_VAR) {
        if !token.trim().is_empty() {
            log::debug!("Using bearer token from {}", TOKEN_ENV_VAR);
            config.token = Some(token.trim().to_string());
        }
    }
    Ok(config)
}

/// Load and validate configuration from an explicit path.
pub fn load_config_from(config_path: &Path) -> Result<Config, String> {
    if !config_path.exists() {
        return Err(format!(
            "Config file not found at {}. Create it with: {{ \"apiBaseUrl\": \"https://api.example.com/\" }}",
            config_path.display()
        ));
    }

    let content =
        fs::read_to_string(config_path).map_err(|e| format!("Failed to read config: {}", e))?;

    let config: Config =
        serde_json::from_str(&content).map_err(|e| format!("Failed to parse config: {}", e))?;

    url::Url::parse(&config.api_base_url)
        .map_err(|e| format!("Invalid apiBaseUrl '{}': {}", config.api_base_url, e))?;

    if config.page_size == 0 {
        return Err("pageSize must be greater than zero".to_string());
    }

    Ok(config)
}
