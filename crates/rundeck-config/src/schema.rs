//! Configuration schema definitions.

use serde::{Deserialize, Serialize};

/// Root configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub provider: ProviderConfig,
}

/// Connection settings for the Rundeck server.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderConfig {
    /// Base URL of the server, without the `/api` suffix.
    #[serde(default = "default_url")]
    pub url: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub auth_token: Option<String>,

    #[serde(default = "default_api_version")]
    pub api_version: u32,

    /// Transport timeout applied to every request.
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u64,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            url: default_url(),
            auth_token: None,
            api_version: default_api_version(),
            timeout_seconds: default_timeout(),
        }
    }
}

fn default_url() -> String {
    "http://localhost:4440".to_string()
}

fn default_api_version() -> u32 {
    24
}

fn default_timeout() -> u64 {
    30
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_provider_defaults() {
        let provider = ProviderConfig::default();
        assert_eq!(provider.url, "http://localhost:4440");
        assert_eq!(provider.api_version, 24);
        assert_eq!(provider.timeout_seconds, 30);
        assert!(provider.auth_token.is_none());
    }

    #[test]
    fn test_partial_provider_table_uses_defaults() {
        let config: Config = toml::from_str(
            r#"
            [provider]
            auth_token = "secret"
        "#,
        )
        .unwrap();
        assert_eq!(config.provider.url, "http://localhost:4440");
        assert_eq!(config.provider.auth_token.as_deref(), Some("secret"));
        assert_eq!(config.provider.api_version, 24);
    }

    #[test]
    fn test_serialize_skips_missing_token() {
        let text = toml::to_string(&Config::default()).unwrap();
        assert!(!text.contains("auth_token"));
        assert!(text.contains("api_version = 24"));
    }
}
