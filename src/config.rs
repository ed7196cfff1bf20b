//! Runtime configuration, resolved once at startup from the environment.

use std::fmt;

/// Holds the openexchangerates.org API key
pub const APP_ID_VAR: &str = "OER_APP_ID";
/// Optional override for the API root, e.g. a local mock server
pub const BASE_URL_VAR: &str = "OER_BASE_URL";
pub const DEFAULT_BASE_URL: &str = "http://openexchangerates.org/api";

#[derive(Clone)]
pub struct Config {
    pub app_id: String,
    pub base_url: String,
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("app_id", &"<redacted>")
            .field("base_url", &self.base_url)
            .finish()
    }
}

impl Config {
    /// Build a config from any key/value lookup. An unset or empty [`APP_ID_VAR`] is an error.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, crate::ForexError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let app_id = lookup(APP_ID_VAR)
            .filter(|id| !id.trim().is_empty())
            .ok_or(crate::ForexError::MissingCredential(APP_ID_VAR))?;

        let base_url = lookup(BASE_URL_VAR)
            .filter(|url| !url.trim().is_empty())
            .map(|url| url.trim().trim_end_matches('/').to_string())
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());

        Ok(Config { app_id, base_url })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ForexError;

    fn lookup<'a>(vars: &'a [(&'a str, &'a str)]) -> impl Fn(&str) -> Option<String> + 'a {
        move |key: &str| {
            vars.iter()
                .find(|(k, _)| *k == key)
                .map(|(_, v)| v.to_string())
        }
    }

    #[test]
    fn test_defaults_to_public_endpoint() {
        let config = Config::from_lookup(lookup(&[(APP_ID_VAR, "abc123")])).unwrap();
        assert_eq!(config.app_id, "abc123");
        assert_eq!(config.base_url, DEFAULT_BASE_URL);
    }

    #[test]
    fn test_base_url_override_is_trimmed() {
        let config = Config::from_lookup(lookup(&[
            (APP_ID_VAR, "abc123"),
            (BASE_URL_VAR, "http://127.0.0.1:8080/api/"),
        ]))
        .unwrap();
        assert_eq!(config.base_url, "http://127.0.0.1:8080/api");
    }

    #[test]
    fn test_missing_or_blank_credential() {
        for vars in [&[][..], &[(APP_ID_VAR, "  ")][..]] {
            match Config::from_lookup(lookup(vars)) {
                Err(ForexError::MissingCredential(var)) => assert_eq!(var, APP_ID_VAR),
                other => panic!("expected missing credential, got {other:?}"),
            }
        }
    }
}
