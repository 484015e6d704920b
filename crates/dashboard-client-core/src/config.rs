use crate::session::TOKEN_STORAGE_KEY;

pub const DEFAULT_API_BASE_URL: &str = "/api";
pub const ENV_API_BASE_URL: &str = "DASHBOARD_API_BASE_URL";
pub const ENV_OMIT_NULL_BEARER: &str = "DASHBOARD_OMIT_NULL_BEARER";

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("api base url must not be empty")]
    EmptyBaseUrl,
    #[error("api base url must be an absolute path or an http(s):// url with a host")]
    InvalidBaseUrl,
    #[error("{key} must be a boolean flag, got {value:?}")]
    InvalidFlag { key: &'static str, value: String },
}

/// What the client sends as `Authorization` when the session holds no token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MissingTokenPolicy {
    /// Send the literal `Bearer null`, matching the dashboard pages the
    /// backend was built against.
    #[default]
    SendNullBearer,
    /// Leave the header off entirely.
    OmitHeader,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    pub api_base_url: String,
    pub token_storage_key: String,
    pub missing_token_policy: MissingTokenPolicy,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            token_storage_key: TOKEN_STORAGE_KEY.to_string(),
            missing_token_policy: MissingTokenPolicy::default(),
        }
    }
}

impl ClientConfig {
    pub fn with_base_url(raw: &str) -> Result<Self, ConfigError> {
        Ok(Self {
            api_base_url: normalize_base_url(raw)?,
            ..Self::default()
        })
    }

    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds a config from an arbitrary variable source. Unset or blank
    /// variables fall back to defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let read = |key: &str| {
            lookup(key)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        let mut config = Self::default();
        if let Some(base_url) = read(ENV_API_BASE_URL) {
            config.api_base_url = normalize_base_url(&base_url)?;
        }
        if let Some(raw) = read(ENV_OMIT_NULL_BEARER) {
            let omit = parse_flag(&raw).ok_or_else(|| ConfigError::InvalidFlag {
                key: ENV_OMIT_NULL_BEARER,
                value: raw.clone(),
            })?;
            if omit {
                config.missing_token_policy = MissingTokenPolicy::OmitHeader;
            }
        }
        Ok(config)
    }

    /// `Authorization` header value for the given session token.
    pub fn bearer_header_value(&self, token: Option<&str>) -> Option<String> {
        match (token, self.missing_token_policy) {
            (Some(token), _) => Some(format!("Bearer {token}")),
            (None, MissingTokenPolicy::SendNullBearer) => Some("Bearer null".to_string()),
            (None, MissingTokenPolicy::OmitHeader) => None,
        }
    }
}

pub fn normalize_base_url(raw: &str) -> Result<String, ConfigError> {
    let trimmed = raw.trim().trim_end_matches('/');
    if trimmed.is_empty() {
        return Err(ConfigError::EmptyBaseUrl);
    }
    if trimmed.starts_with('/') {
        return Ok(trimmed.to_string());
    }
    if !(trimmed.starts_with("http://") || trimmed.starts_with("https://")) {
        return Err(ConfigError::InvalidBaseUrl);
    }
    let Some((_, remainder)) = trimmed.split_once("://") else {
        return Err(ConfigError::InvalidBaseUrl);
    };
    if remainder.trim().is_empty() || remainder.starts_with('/') {
        return Err(ConfigError::InvalidBaseUrl);
    }
    Ok(trimmed.to_string())
}

fn parse_flag(raw: &str) -> Option<bool> {
    match raw.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(key, value)| ((*key).to_string(), (*value).to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn defaults_match_dashboard_pages() {
        let config = ClientConfig::default();
        assert_eq!(config.api_base_url, "/api");
        assert_eq!(config.token_storage_key, "token");
        assert_eq!(
            config.missing_token_policy,
            MissingTokenPolicy::SendNullBearer
        );
    }

    #[test]
    fn normalize_base_url_trims_and_drops_trailing_slash() {
        assert_eq!(
            normalize_base_url(" https://dashboard.example.com/api/ "),
            Ok("https://dashboard.example.com/api".to_string())
        );
        assert_eq!(normalize_base_url("/api/"), Ok("/api".to_string()));
    }

    #[test]
    fn normalize_base_url_rejects_bad_input() {
        assert_eq!(normalize_base_url("   "), Err(ConfigError::EmptyBaseUrl));
        assert_eq!(normalize_base_url("/"), Err(ConfigError::EmptyBaseUrl));
        assert_eq!(
            normalize_base_url("dashboard.example.com"),
            Err(ConfigError::InvalidBaseUrl)
        );
        assert_eq!(
            normalize_base_url("https:///api"),
            Err(ConfigError::InvalidBaseUrl)
        );
    }

    #[test]
    fn from_lookup_falls_back_to_defaults() {
        let config = ClientConfig::from_lookup(lookup_from(&[(ENV_API_BASE_URL, "  ")]))
            .expect("blank values ignored");
        assert_eq!(config, ClientConfig::default());
    }

    #[test]
    fn from_lookup_applies_overrides() {
        let config = ClientConfig::from_lookup(lookup_from(&[
            (ENV_API_BASE_URL, "http://127.0.0.1:8000/api/"),
            (ENV_OMIT_NULL_BEARER, "Yes"),
        ]))
        .expect("valid overrides");
        assert_eq!(config.api_base_url, "http://127.0.0.1:8000/api");
        assert_eq!(config.missing_token_policy, MissingTokenPolicy::OmitHeader);
    }

    #[test]
    fn from_lookup_rejects_unknown_flag_values() {
        let error = ClientConfig::from_lookup(lookup_from(&[(ENV_OMIT_NULL_BEARER, "maybe")]))
            .expect_err("invalid flag");
        assert_eq!(
            error,
            ConfigError::InvalidFlag {
                key: ENV_OMIT_NULL_BEARER,
                value: "maybe".to_string(),
            }
        );
    }

    #[test]
    fn bearer_header_follows_missing_token_policy() {
        let mut config = ClientConfig::default();
        assert_eq!(
            config.bearer_header_value(Some("abc")),
            Some("Bearer abc".to_string())
        );
        assert_eq!(
            config.bearer_header_value(None),
            Some("Bearer null".to_string())
        );

        config.missing_token_policy = MissingTokenPolicy::OmitHeader;
        assert_eq!(config.bearer_header_value(None), None);
    }
}
