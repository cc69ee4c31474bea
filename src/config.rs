//! Configuration management for CodeVault.
//!
//! Handles loading and saving configuration from JSONC files.
//! Manages backend credentials, file locations and user preferences.

use crate::app::SortOrder;
use anyhow::{Context, Result};
use dirs::config_dir;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Directory name under the platform config dir.
const APP_DIR: &str = "codevault";

/// Application configuration structure.
///
/// Contains backend credentials and user preferences.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Hosted backend project URL (e.g. https://xyz.example.co)
    pub backend_url: String,
    /// Public (anon) project key
    pub anon_key: String,
    /// Name of the snippets table
    pub snippets_table: String,
    /// Session file path (relative to config dir or absolute)
    pub session_path: String,
    /// Directory receiving exported snippets
    pub export_dir: String,
    /// OAuth provider offered on the sign-in screen
    pub oauth_provider: String,
    /// Loopback address receiving the OAuth redirect
    pub oauth_redirect_addr: String,
    /// Initial sort order
    pub default_sort: SortOrder,
    /// How long toasts stay visible
    pub toast_seconds: u64,
    /// Log filter used when RUST_LOG is unset
    pub log_level: String,
    /// Log file path (relative to config dir or absolute)
    pub log_path: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            backend_url: String::new(),
            anon_key: String::new(),
            snippets_table: "snippets".to_string(),
            session_path: "session.json".to_string(),
            export_dir: ".".to_string(),
            oauth_provider: "google".to_string(),
            oauth_redirect_addr: "127.0.0.1:54321".to_string(),
            default_sort: SortOrder::Newest,
            toast_seconds: 4,
            log_level: "info".to_string(),
            log_path: "codevault.log".to_string(),
        }
    }
}

impl Config {
    /// Load configuration from file.
    ///
    /// # Arguments
    /// * `path` - Optional path to config file. If None, uses default location.
    ///
    /// # Returns
    /// * `Result<Config>` - Loaded configuration or error
    ///
    /// # Details
    /// Searches for config file in:
    /// 1. Provided path (if given)
    /// 2. `$XDG_CONFIG_HOME/codevault/config.jsonc`
    /// 3. `~/.config/codevault/config.jsonc`
    ///
    /// If no config file exists, returns default configuration.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let config_path = if let Some(p) = path {
            p.to_path_buf()
        } else {
            Self::default_config_path()?
        };

        if !config_path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(&config_path)
            .with_context(|| format!("Failed to read config file: {}", config_path.display()))?;

        let config: Config = serde_json::from_str(&strip_comments(&content))
            .with_context(|| "Failed to deserialize config")?;

        Ok(config)
    }

    /// Save configuration to file.
    ///
    /// # Details
    /// Creates config directory if it doesn't exist.
    pub fn save(&self, path: Option<&Path>) -> Result<()> {
        let config_path = if let Some(p) = path {
            p.to_path_buf()
        } else {
            Self::default_config_path()?
        };

        if let Some(parent) = config_path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }

        let json = serde_json::to_string_pretty(self).context("Failed to serialize config")?;

        fs::write(&config_path, json)
            .with_context(|| format!("Failed to write config file: {}", config_path.display()))?;

        Ok(())
    }

    /// Get default configuration file path.
    ///
    /// # Returns
    /// * `Result<PathBuf>` - `$XDG_CONFIG_HOME/codevault/config.jsonc` or error
    pub fn default_config_path() -> Result<PathBuf> {
        Ok(app_dir()?.join("config.jsonc"))
    }

    /// Get session file path.
    ///
    /// # Details
    /// If session_path is absolute, returns it as-is.
    /// Otherwise, returns path relative to config directory.
    pub fn session_file_path(&self) -> Result<PathBuf> {
        resolve(&self.session_path)
    }

    /// Get log file path, resolved like the session path.
    pub fn log_file_path(&self) -> Result<PathBuf> {
        resolve(&self.log_path)
    }

    /// Directory receiving exports. Relative paths are taken from the
    /// working directory.
    pub fn export_dir_path(&self) -> PathBuf {
        PathBuf::from(&self.export_dir)
    }

    /// Whether the backend credentials are filled in.
    pub fn has_backend(&self) -> bool {
        !self.backend_url.is_empty() && !self.anon_key.is_empty()
    }
}

fn app_dir() -> Result<PathBuf> {
    let config_dir =
        config_dir().ok_or_else(|| anyhow::anyhow!("Failed to determine config directory"))?;
    Ok(config_dir.join(APP_DIR))
}

fn resolve(path: &str) -> Result<PathBuf> {
    let path = Path::new(path);
    if path.is_absolute() {
        Ok(path.to_path_buf())
    } else {
        Ok(app_dir()?.join(path))
    }
}

/// Strip `//` line comments outside of strings.
///
/// # Details
/// Tracks string state across the line, honouring backslash escapes, so
/// URLs such as `"https://..."` survive.
fn strip_comments(content: &str) -> String {
    content
        .lines()
        .map(|line| {
            let mut in_string = false;
            let mut escaped = false;
            let bytes = line.as_bytes();
            for (i, &byte) in bytes.iter().enumerate() {
                match byte {
                    _ if escaped => escaped = false,
                    b'\\' if in_string => escaped = true,
                    b'"' => in_string = !in_string,
                    b'/' if !in_string && bytes.get(i + 1) == Some(&b'/') => {
                        return line[..i].trim_end();
                    }
                    _ => {}
                }
            }
            line
        })
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_config_default() {
        let config = Config::default();
        assert!(config.backend_url.is_empty());
        assert!(!config.has_backend());
        assert_eq!(config.snippets_table, "snippets");
        assert_eq!(config.default_sort, SortOrder::Newest);
        assert_eq!(config.toast_seconds, 4);
    }

    #[test]
    fn test_config_save_and_load() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("config.jsonc");

        let config = Config {
            backend_url: "https://demo.example.co".to_string(),
            anon_key: "anon".to_string(),
            default_sort: SortOrder::Oldest,
            ..Config::default()
        };

        config.save(Some(&config_path)).unwrap();
        assert!(config_path.exists());

        let loaded = Config::load(Some(&config_path)).unwrap();
        assert_eq!(loaded.backend_url, "https://demo.example.co");
        assert_eq!(loaded.default_sort, SortOrder::Oldest);
        assert!(loaded.has_backend());
    }

    #[test]
    fn test_config_jsonc_with_comments() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("config.jsonc");

        let jsonc_content = r#"{
            // Project URL from the backend dashboard
            "backend_url": "https://demo.example.co", // trailing comment
            "anon_key": "key\"with//quote",
            "default_sort": "oldest"
        }"#;

        fs::write(&config_path, jsonc_content).unwrap();

        let loaded = Config::load(Some(&config_path)).unwrap();
        assert_eq!(loaded.backend_url, "https://demo.example.co");
        assert_eq!(loaded.anon_key, "key\"with//quote");
        assert_eq!(loaded.default_sort, SortOrder::Oldest);
        assert_eq!(loaded.oauth_provider, "google");
    }

    #[test]
    fn test_config_missing_file_is_default() {
        let temp_dir = TempDir::new().unwrap();
        let loaded = Config::load(Some(&temp_dir.path().join("absent.jsonc"))).unwrap();
        assert_eq!(loaded.session_path, "session.json");
    }

    #[test]
    fn test_absolute_session_path() {
        let temp_dir = TempDir::new().unwrap();
        let absolute = temp_dir.path().join("s.json");
        let config = Config {
            session_path: absolute.to_string_lossy().into_owned(),
            ..Config::default()
        };
        assert_eq!(config.session_file_path().unwrap(), absolute);
    }
}
