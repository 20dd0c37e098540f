use std::env::vars;
use std::time::Duration;

use log::info;
use serde::Deserialize;
use ustr::Ustr;

/// Default number of rows per table page.
pub const DEFAULT_PAGE_SIZE: u32 = 10;

/// Quiet period before a search term is committed.
pub const DEFAULT_SEARCH_DEBOUNCE: Duration = Duration::from_millis(500);

#[derive(Debug, Clone)]
pub struct BusinessConfig {
    pub api_base_url: String,
    pub page_size: u32,
    pub search_debounce: Duration,
}

#[derive(Debug, Default, Deserialize)]
struct RawConfig {
    api_base_url: Option<String>,
    page_size: Option<u32>,
    search_debounce_ms: Option<u64>,
}

impl BusinessConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            api_base_url: base_url.into(),
            ..Self::default()
        }
    }

    /// Reads `API_BASE_URL`, `PAGE_SIZE` and `SEARCH_DEBOUNCE_MS` from the
    /// environment, falling back to the build's defaults for anything unset.
    pub fn from_env() -> anyhow::Result<Self> {
        info!("Loading business configuration from environment variables");
        let raw: RawConfig = serde_env::from_iter(vars())?;
        Self::from_raw(raw)
    }

    fn from_raw(raw: RawConfig) -> anyhow::Result<Self> {
        let defaults = Self::default();

        let page_size = raw.page_size.unwrap_or(defaults.page_size);
        if page_size == 0 {
            anyhow::bail!("PAGE_SIZE must be greater than zero");
        }

        let api_base_url = match raw.api_base_url {
            Some(url) => {
                info!("Using provided API_BASE_URL: {url}");
                url.trim_end_matches('/').to_owned()
            }
            None => defaults.api_base_url,
        };

        Ok(Self {
            api_base_url,
            page_size,
            search_debounce: raw
                .search_debounce_ms
                .map(Duration::from_millis)
                .unwrap_or(defaults.search_debounce),
        })
    }

    /// Base for every resource endpoint.
    pub fn api_url(&self) -> Ustr {
        if self.api_base_url.is_empty() {
            Ustr::from("/api")
        } else {
            Ustr::from(&format!("{}/api", self.api_base_url))
        }
    }

    /// Full URL of `path` below [`Self::api_url`].
    pub fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.api_url(), path.trim_start_matches('/'))
    }
}

impl Default for BusinessConfig {
    fn default() -> Self {
        Self {
            api_base_url: if cfg!(target_arch = "wasm32") {
                String::new()
            } else if cfg!(feature = "env_test") {
                "https://roster-test.example.com".to_owned()
            } else if cfg!(feature = "env_internal") {
                "https://roster-internal.example.com".to_owned()
            } else if cfg!(feature = "env_nightly") {
                "https://roster-nightly.example.com".to_owned()
            } else {
                "https://roster.example.com".to_owned()
            },
            page_size: DEFAULT_PAGE_SIZE,
            search_debounce: DEFAULT_SEARCH_DEBOUNCE,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_env::from_iter;

    #[test]
    fn test_environment_urls() {
        let config = BusinessConfig::default();

        if cfg!(target_arch = "wasm32") {
            assert_eq!(config.api_url(), Ustr::from("/api"));
        } else if cfg!(feature = "env_test") {
            assert_eq!(
                config.api_url(),
                Ustr::from("https://roster-test.example.com/api")
            );
        } else if cfg!(feature = "env_internal") {
            assert_eq!(
                config.api_url(),
                Ustr::from("https://roster-internal.example.com/api")
            );
        } else if cfg!(feature = "env_nightly") {
            assert_eq!(
                config.api_url(),
                Ustr::from("https://roster-nightly.example.com/api")
            );
        } else {
            assert_eq!(config.api_url(), Ustr::from("https://roster.example.com/api"));
        }
    }

    #[test]
    fn endpoint_joins_paths() {
        let config = BusinessConfig::new("http://localhost:8000");
        assert_eq!(config.endpoint("users"), "http://localhost:8000/api/users");
        assert_eq!(config.endpoint("/users/7"), "http://localhost:8000/api/users/7");
    }

    #[test]
    fn env_overrides_defaults() {
        let raw: RawConfig = from_iter(vec![
            ("API_BASE_URL", "http://localhost:8000/"),
            ("PAGE_SIZE", "25"),
            ("SEARCH_DEBOUNCE_MS", "300"),
        ])
        .expect("RawConfig should deserialize");

        let config = BusinessConfig::from_raw(raw).expect("config should build");
        assert_eq!(config.api_base_url, "http://localhost:8000");
        assert_eq!(config.page_size, 25);
        assert_eq!(config.search_debounce, Duration::from_millis(300));
    }

    #[test]
    fn missing_env_uses_defaults() {
        let raw: RawConfig = from_iter(Vec::<(&str, &str)>::new()).expect("empty env");
        let config = BusinessConfig::from_raw(raw).expect("config should build");
        assert_eq!(config.page_size, DEFAULT_PAGE_SIZE);
        assert_eq!(config.search_debounce, DEFAULT_SEARCH_DEBOUNCE);
    }

    #[test]
    fn zero_page_size_is_rejected() {
        let raw: RawConfig = from_iter(vec![("PAGE_SIZE", "0")]).expect("RawConfig");
        let err = BusinessConfig::from_raw(raw).unwrap_err();
        assert!(err.to_string().contains("PAGE_SIZE"));
    }
}
