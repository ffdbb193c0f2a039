use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{PainelError, Result};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default = "default_api_url")]
    pub api_url: String,
    #[serde(default = "default_cache_ttl_secs")]
    pub cache_ttl_secs: u64,
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
    #[serde(default = "default_export_dir")]
    pub export_dir: String,
}

fn default_api_url() -> String {
    "http://localhost:5000".to_string()
}

fn default_cache_ttl_secs() -> u64 {
    300
}

fn default_request_timeout_secs() -> u64 {
    30
}

fn default_export_dir() -> String {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("Documents")
        .join("painel")
        .join("exports")
        .to_string_lossy()
        .to_string()
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            api_url: default_api_url(),
            cache_ttl_secs: default_cache_ttl_secs(),
            request_timeout_secs: default_request_timeout_secs(),
            export_dir: default_export_dir(),
        }
    }
}

impl Settings {
    /// Apply per-invocation overrides from global CLI flags.
    pub fn with_api_url(mut self, api_url: Option<&str>) -> Self {
        if let Some(url) = api_url {
            self.api_url = url.trim_end_matches('/').to_string();
        }
        self
    }

    pub fn export_path(&self) -> PathBuf {
        PathBuf::from(shellexpand_path(&self.export_dir))
    }
}

pub fn config_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".config")
        .join("painel")
}

fn settings_path() -> PathBuf {
    config_dir().join("settings.json")
}

pub fn load_settings() -> Settings {
    load_settings_from(&settings_path())
}

pub(crate) fn load_settings_from(path: &Path) -> Settings {
    if path.exists() {
        let content = std::fs::read_to_string(path).unwrap_or_default();
        match serde_json::from_str(&content) {
            Ok(s) => s,
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "ignoring unreadable settings file");
                Settings::default()
            }
        }
    } else {
        Settings::default()
    }
}

pub fn save_settings(settings: &Settings) -> Result<()> {
    save_settings_to(settings, &settings_path())
}

pub(crate) fn save_settings_to(settings: &Settings, path: &Path) -> Result<()> {
    if let Some(dir) = path.parent() {
        std::fs::create_dir_all(dir)?;
    }
    let json = serde_json::to_string_pretty(settings)
        .map_err(|e| PainelError::Settings(e.to_string()))?;
    std::fs::write(path, format!("{json}\n"))?;
    Ok(())
}

pub fn shellexpand_path(path: &str) -> String {
    if path.starts_with('~') {
        if let Some(home) = dirs::home_dir() {
            return path.replacen('~', &home.to_string_lossy(), 1);
        }
    }
    path.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_save_and_load_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        let settings = Settings {
            api_url: "http://10.0.0.5:8000".to_string(),
            cache_ttl_secs: 60,
            request_timeout_secs: 5,
            export_dir: "/tmp/exports".to_string(),
        };
        save_settings_to(&settings, &path).unwrap();
        let loaded = load_settings_from(&path);
        assert_eq!(loaded.api_url, "http://10.0.0.5:8000");
        assert_eq!(loaded.cache_ttl_secs, 60);
        assert_eq!(loaded.request_timeout_secs, 5);
        assert_eq!(loaded.export_dir, "/tmp/exports");
    }

    #[test]
    fn test_load_returns_defaults_when_missing() {
        let dir = tempfile::tempdir().unwrap();
        let s = load_settings_from(&dir.path().join("nope.json"));
        assert_eq!(s.api_url, "http://localhost:5000");
        assert_eq!(s.cache_ttl_secs, 300);
        assert!(!s.export_dir.is_empty());
    }

    #[test]
    fn test_load_merges_with_defaults() {
        let json = r#"{"api_url": "http://example.test"}"#;
        let s: Settings = serde_json::from_str(json).unwrap();
        assert_eq!(s.api_url, "http://example.test");
        assert_eq!(s.cache_ttl_secs, 300);
        assert_eq!(s.request_timeout_secs, 30);
    }

    #[test]
    fn test_corrupt_file_falls_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        std::fs::write(&path, "{not json").unwrap();
        let s = load_settings_from(&path);
        assert_eq!(s.api_url, "http://localhost:5000");
    }

    #[test]
    fn test_api_url_override_trims_trailing_slash() {
        let s = Settings::default().with_api_url(Some("http://host:1234/"));
        assert_eq!(s.api_url, "http://host:1234");
        let s = Settings::default().with_api_url(None);
        assert_eq!(s.api_url, "http://localhost:5000");
    }
}
