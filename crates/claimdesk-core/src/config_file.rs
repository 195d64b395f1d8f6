use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::config::ApiConfig;

/// On-disk TOML configuration structure.
/// All fields are optional so partial configs work (merge with defaults).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfigFile {
    pub api: Option<ApiSection>,
    pub search: Option<SearchSection>,
    pub display: Option<DisplaySection>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiSection {
    pub base_url: Option<String>,
    pub timeout_secs: Option<u64>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchSection {
    pub debounce_ms: Option<u64>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DisplaySection {
    pub theme: Option<String>,
}

impl ConfigFile {
    pub fn base_url(&self) -> Option<&str> {
        self.api.as_ref().and_then(|a| a.base_url.as_deref())
    }

    pub fn debounce_ms(&self) -> Option<u64> {
        self.search.as_ref().and_then(|s| s.debounce_ms)
    }

    pub fn theme(&self) -> Option<&str> {
        self.display.as_ref().and_then(|d| d.theme.as_deref())
    }

    /// Lay the file's values over `config`.
    pub fn apply_to(&self, config: &mut ApiConfig) {
        if let Some(url) = self.base_url() {
            config.base_url = url.to_string();
        }
        if let Some(secs) = self.api.as_ref().and_then(|a| a.timeout_secs) {
            config.timeout = Duration::from_secs(secs);
        }
        if let Some(ms) = self.debounce_ms() {
            config.search_debounce = Duration::from_millis(ms);
        }
    }
}

/// Platform config directory path: `<config_dir>/claimdesk/config.toml`.
pub fn config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("claimdesk").join("config.toml"))
}

/// Load config by cascading CWD `.claimdesk.toml` over platform config.
/// CWD values override platform values.
pub fn load_config() -> ConfigFile {
    let platform = config_path().and_then(|p| load_from_path(&p));
    let cwd = load_from_path(Path::new(".claimdesk.toml"));

    match (platform, cwd) {
        (None, None) => ConfigFile::default(),
        (Some(p), None) => p,
        (None, Some(c)) => c,
        (Some(p), Some(c)) => merge(p, c),
    }
}

/// Load a config from a specific path. Returns `None` if the file doesn't
/// exist or can't be parsed.
pub fn load_from_path(path: &Path) -> Option<ConfigFile> {
    let content = std::fs::read_to_string(path).ok()?;
    match toml::from_str(&content) {
        Ok(config) => Some(config),
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "ignoring unparseable config file");
            None
        }
    }
}

/// Merge two configs: `overlay` values take precedence over `base`.
pub fn merge(base: ConfigFile, overlay: ConfigFile) -> ConfigFile {
    ConfigFile {
        api: Some(ApiSection {
            base_url: overlay
                .api
                .as_ref()
                .and_then(|a| a.base_url.clone())
                .or_else(|| base.api.as_ref().and_then(|a| a.base_url.clone())),
            timeout_secs: overlay
                .api
                .as_ref()
                .and_then(|a| a.timeout_secs)
                .or_else(|| base.api.as_ref().and_then(|a| a.timeout_secs)),
        }),
        search: Some(SearchSection {
            debounce_ms: overlay.debounce_ms().or_else(|| base.debounce_ms()),
        }),
        display: Some(DisplaySection {
            theme: overlay
                .display
                .as_ref()
                .and_then(|d| d.theme.clone())
                .or_else(|| base.display.as_ref().and_then(|d| d.theme.clone())),
        }),
    }
}

/// Save `config` to `path`, creating parent directories.
pub fn save_to_path(config: &ConfigFile, path: &Path) -> Result<(), String> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .map_err(|e| format!("Failed to create config directory: {}", e))?;
    }
    let content =
        toml::to_string_pretty(config).map_err(|e| format!("Failed to serialize config: {}", e))?;
    std::fs::write(path, content).map_err(|e| format!("Failed to write config: {}", e))
}

/// Save the current config to the platform config directory.
pub fn save_config(config: &ConfigFile) -> Result<PathBuf, String> {
    let path = config_path().ok_or_else(|| "Could not determine config directory".to_string())?;
    save_to_path(config, &path)?;
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_file_parses() {
        let parsed: ConfigFile = toml::from_str("[search]\ndebounce_ms = 250\n").unwrap();
        assert_eq!(parsed.debounce_ms(), Some(250));
        assert!(parsed.base_url().is_none());
    }

    #[test]
    fn merge_overlay_wins() {
        let base = ConfigFile {
            api: Some(ApiSection {
                base_url: Some("http://base".into()),
                timeout_secs: Some(5),
            }),
            ..Default::default()
        };
        let overlay = ConfigFile {
            api: Some(ApiSection {
                base_url: Some("http://overlay".into()),
                timeout_secs: None,
            }),
            ..Default::default()
        };
        let merged = merge(base, overlay);
        assert_eq!(merged.base_url(), Some("http://overlay"));
        assert_eq!(merged.api.unwrap().timeout_secs, Some(5));
    }

    #[test]
    fn merge_base_preserved_when_overlay_absent() {
        let base = ConfigFile {
            display: Some(DisplaySection {
                theme: Some("modern".into()),
            }),
            ..Default::default()
        };
        let merged = merge(base, ConfigFile::default());
        assert_eq!(merged.theme(), Some("modern"));
    }

    #[test]
    fn apply_to_overrides_only_set_values() {
        let file = ConfigFile {
            search: Some(SearchSection {
                debounce_ms: Some(300),
            }),
            ..Default::default()
        };
        let mut config = ApiConfig::default();
        file.apply_to(&mut config);
        assert_eq!(config.search_debounce, Duration::from_millis(300));
        assert_eq!(config.base_url, crate::config::DEFAULT_BASE_URL);
    }

    #[test]
    fn save_then_load_from_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");
        let config = ConfigFile {
            api: Some(ApiSection {
                base_url: Some("http://saved:9000".into()),
                timeout_secs: Some(3),
            }),
            ..Default::default()
        };
        save_to_path(&config, &path).unwrap();
        assert_eq!(load_from_path(&path), Some(config));
    }

    #[test]
    fn garbage_file_is_ignored() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "api = [not toml").unwrap();
        assert!(load_from_path(&path).is_none());
    }
}
