use std::time::Duration;

use claimdesk_core::ApiConfig;
use claimdesk_core::config_file::ConfigFile;

/// Values supplied on the command line or through the environment.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub api_url: Option<String>,
    pub debounce_ms: Option<u64>,
    pub theme: Option<String>,
}

/// Fully resolved runtime settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub api: ApiConfig,
    pub theme: String,
}

/// Resolve CLI/env > config file > defaults.
pub fn resolve(overrides: &Overrides, file: &ConfigFile) -> Settings {
    let mut api = ApiConfig::default();
    file.apply_to(&mut api);

    if let Some(url) = overrides.api_url.as_deref().filter(|u| !u.trim().is_empty()) {
        api.base_url = url.to_string();
    }
    if let Some(ms) = overrides.debounce_ms {
        api.search_debounce = Duration::from_millis(ms);
    }

    let theme = overrides
        .theme
        .clone()
        .or_else(|| file.theme().map(str::to_string))
        .unwrap_or_else(|| "hacker".to_string());

    Settings { api, theme }
}

/// The settings expressed as a config file, for `--save-config`.
pub fn to_config_file(settings: &Settings) -> ConfigFile {
    use claimdesk_core::config_file::{ApiSection, DisplaySection, SearchSection};

    ConfigFile {
        api: Some(ApiSection {
            base_url: Some(settings.api.base_url.clone()),
            timeout_secs: Some(settings.api.timeout.as_secs()),
        }),
        search: Some(SearchSection {
            debounce_ms: Some(settings.api.search_debounce.as_millis() as u64),
        }),
        display: Some(DisplaySection {
            theme: Some(settings.theme.clone()),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use claimdesk_core::config::{DEFAULT_BASE_URL, DEFAULT_SEARCH_DEBOUNCE};
    use claimdesk_core::config_file::{ApiSection, SearchSection};

    fn file() -> ConfigFile {
        ConfigFile {
            api: Some(ApiSection {
                base_url: Some("http://from-file:4000".into()),
                timeout_secs: Some(3),
            }),
            search: Some(SearchSection {
                debounce_ms: Some(400),
            }),
            display: None,
        }
    }

    #[test]
    fn defaults_when_nothing_set() {
        let settings = resolve(&Overrides::default(), &ConfigFile::default());
        assert_eq!(settings.api.base_url, DEFAULT_BASE_URL);
        assert_eq!(settings.api.search_debounce, DEFAULT_SEARCH_DEBOUNCE);
        assert_eq!(settings.theme, "hacker");
    }

    #[test]
    fn file_beats_defaults() {
        let settings = resolve(&Overrides::default(), &file());
        assert_eq!(settings.api.base_url, "http://from-file:4000");
        assert_eq!(settings.api.timeout, Duration::from_secs(3));
        assert_eq!(settings.api.search_debounce, Duration::from_millis(400));
    }

    #[test]
    fn overrides_beat_file() {
        let overrides = Overrides {
            api_url: Some("http://cli:1".into()),
            debounce_ms: Some(50),
            theme: Some("modern".into()),
        };
        let settings = resolve(&overrides, &file());
        assert_eq!(settings.api.base_url, "http://cli:1");
        assert_eq!(settings.api.search_debounce, Duration::from_millis(50));
        assert_eq!(settings.api.timeout, Duration::from_secs(3));
        assert_eq!(settings.theme, "modern");
    }

    #[test]
    fn blank_url_override_is_ignored() {
        let overrides = Overrides {
            api_url: Some("  ".into()),
            ..Default::default()
        };
        assert_eq!(resolve(&overrides, &file()).api.base_url, "http://from-file:4000");
    }

    #[test]
    fn saved_file_resolves_to_same_settings() {
        let settings = resolve(&Overrides::default(), &file());
        let again = resolve(&Overrides::default(), &to_config_file(&settings));
        assert_eq!(again, settings);
    }
}
