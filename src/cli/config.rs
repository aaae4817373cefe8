use std::fs;
use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::config::AppConfig;
use crate::session::FileSessionStore;

/// Persisted CLI preferences (`settings.json`)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CliSettings {
    pub api_url: Option<String>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl CliSettings {
    pub fn set_api_url(&mut self, url: String) {
        self.api_url = Some(url);
        self.updated_at = Some(Utc::now());
    }
}

pub fn get_config_dir() -> anyhow::Result<PathBuf> {
    let config_dir = if let Ok(custom_dir) = std::env::var("FOLIO_CONFIG_DIR") {
        PathBuf::from(custom_dir)
    } else {
        let home = std::env::var("HOME").map_err(|_| anyhow::anyhow!("HOME environment variable not set"))?;
        PathBuf::from(home).join(".config").join("folio").join("cli")
    };

    if !config_dir.exists() {
        fs::create_dir_all(&config_dir)?;
    }

    Ok(config_dir)
}

pub fn load_settings() -> anyhow::Result<CliSettings> {
    let config_dir = get_config_dir()?;
    let settings_file = config_dir.join("settings.json");

    if !settings_file.exists() {
        return Ok(CliSettings::default());
    }

    let content = fs::read_to_string(settings_file)?;
    let settings: CliSettings = serde_json::from_str(&content)?;
    Ok(settings)
}

pub fn save_settings(settings: &CliSettings) -> anyhow::Result<()> {
    let config_dir = get_config_dir()?;
    let settings_file = config_dir.join("settings.json");

    let content = serde_json::to_string_pretty(settings)?;
    fs::write(settings_file, content)?;
    Ok(())
}

/// Token storage shared by every `folio` invocation
pub fn session_store(config: &AppConfig) -> anyhow::Result<FileSessionStore> {
    let config_dir = get_config_dir()?;
    Ok(FileSessionStore::new(
        config_dir.join("session.json"),
        config.session.storage_key.clone(),
    ))
}

/// Environment config, then the saved server, then the `--api-url` flag
pub fn resolve_app_config(base: &AppConfig, api_url: Option<&str>) -> anyhow::Result<AppConfig> {
    let mut config = base.clone();

    if std::env::var("FOLIO_API_URL").is_err() {
        if let Some(saved) = load_settings()?.api_url {
            config.api.base_url = saved;
        }
    }
    if let Some(url) = api_url {
        config.api.base_url = url.to_string();
    }

    Ok(config)
}
