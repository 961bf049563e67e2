use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

fn default_backend_url() -> String {
    "http://127.0.0.1:5000".to_string()
}

fn default_true() -> bool {
    true
}

/// Optional color overrides, hex strings like "#FFC107"
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ThemeOverrides {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub accent: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub success: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub warning: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub danger: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text_dim: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Base URL of the backend (trailing slash is fine)
    #[serde(default = "default_backend_url")]
    pub backend_url: String,

    /// Mirror submit outcomes as desktop notifications
    #[serde(default = "default_true")]
    pub notifications: bool,

    /// Fetch /api/data once at startup instead of waiting for a keypress
    #[serde(default)]
    pub fetch_on_start: bool,

    /// Color overrides for the UI
    #[serde(skip_serializing_if = "Option::is_none")]
    pub theme: Option<ThemeOverrides>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            backend_url: default_backend_url(),
            notifications: true,
            fetch_on_start: false,
            theme: None,
        }
    }
}

impl AppConfig {
    /// Get the config file path
    fn config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find config directory"))?
            .join("madoguchi");

        if let Err(e) = std::fs::create_dir_all(&config_dir) {
            tracing::warn!("Could not create config directory: {}", e);
        }

        Ok(config_dir.join("config.toml"))
    }

    /// Load config from file, or create default
    pub fn load() -> Result<Self> {
        let path = match Self::config_path() {
            Ok(p) => p,
            Err(_) => return Ok(AppConfig::default()),
        };

        if path.exists() {
            match std::fs::read_to_string(&path) {
                Ok(content) => match toml::from_str(&content) {
                    Ok(config) => return Ok(config),
                    Err(e) => tracing::warn!("Failed to parse config: {}", e),
                },
                Err(e) => tracing::warn!("Failed to read config: {}", e),
            }
        }

        let config = AppConfig::default();
        let _ = config.save();
        Ok(config)
    }

    /// Save config to file
    pub fn save(&self) -> Result<()> {
        let path = Self::config_path()?;
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_serialization() {
        let config = AppConfig {
            backend_url: "http://localhost:8080".to_string(),
            notifications: false,
            fetch_on_start: true,
            theme: Some(ThemeOverrides {
                accent: Some("#FFC107".to_string()),
                ..Default::default()
            }),
        };

        let serialized = toml::to_string_pretty(&config).unwrap();
        let deserialized: AppConfig = toml::from_str(&serialized).unwrap();

        assert_eq!(config.backend_url, deserialized.backend_url);
        assert_eq!(config.fetch_on_start, deserialized.fetch_on_start);
        assert_eq!(
            deserialized.theme.unwrap().accent.as_deref(),
            Some("#FFC107")
        );
    }

    #[test]
    fn test_config_defaults() {
        // An empty file is a valid config
        let config: AppConfig = toml::from_str("").unwrap();
        assert_eq!(config.backend_url, "http://127.0.0.1:5000");
        assert!(config.notifications);
        assert!(!config.fetch_on_start);
        assert!(config.theme.is_none());
    }
}
