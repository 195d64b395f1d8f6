use std::time::Duration;

/// Base URL used when nothing else is configured.
pub const DEFAULT_BASE_URL: &str = "http://localhost:3001";
/// Quiescence window before a claim search fires.
pub const DEFAULT_SEARCH_DEBOUNCE: Duration = Duration::from_millis(1000);
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Environment variable carrying the API base URL.
pub const API_URL_ENV: &str = "CLAIMDESK_API_URL";
/// Environment variable overriding the debounce window in milliseconds.
pub const DEBOUNCE_ENV: &str = "CLAIMDESK_DEBOUNCE_MS";

/// Connection settings handed to [`crate::gateway::HttpGateway`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiConfig {
    pub base_url: String,
    pub timeout: Duration,
    pub search_debounce: Duration,
    pub user_agent: String,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: DEFAULT_TIMEOUT,
            search_debounce: DEFAULT_SEARCH_DEBOUNCE,
            user_agent: format!("claimdesk/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

impl ApiConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Self::default()
        }
    }

    /// Join `path` onto the base URL without doubling slashes.
    pub fn endpoint(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoint_joins_without_double_slash() {
        let config = ApiConfig::new("http://host:1234/");
        assert_eq!(
            config.endpoint("/api/claim/list"),
            "http://host:1234/api/claim/list"
        );
    }

    #[test]
    fn endpoint_keeps_trailing_slash_of_path() {
        let config = ApiConfig::new("http://host");
        assert_eq!(config.endpoint("/api/article/"), "http://host/api/article/");
    }

    #[test]
    fn defaults_use_one_second_debounce() {
        let config = ApiConfig::default();
        assert_eq!(config.search_debounce, Duration::from_millis(1000));
        assert_eq!(config.base_url, DEFAULT_BASE_URL);
    }
}
