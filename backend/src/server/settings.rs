//! Service settings loaded via OrthoConfig.
//!
//! Values come from CLI flags, `GW2_BUILD_*` environment variables and
//! configuration files. Every field is optional; [`AppSettings::resolve`]
//! fills defaults and validates the result once at startup.

use std::net::SocketAddr;
use std::time::Duration;

use gw2_build::domain::{BuildLookupConfig, ScopePolicy};
use gw2_build::outbound::gw2_api::DEFAULT_API_BASE_URL;
use ortho_config::OrthoConfig;
use reqwest::Url;
use serde::Deserialize;

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";
const DEFAULT_FRESHNESS_WINDOW_SECS: u64 = 30 * 60;
const DEFAULT_DEADLINE_SECS: u64 = 10;
const DEFAULT_CLIENT_MAX_AGE_SECS: u64 = 5 * 60;
const DEFAULT_UPSTREAM_TIMEOUT_SECS: u64 = 30;

/// Raw configuration values.
#[derive(Debug, Clone, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "GW2_BUILD")]
pub struct AppSettings {
    /// Listener address.
    pub bind_addr: Option<String>,
    /// PostgreSQL URL; the in-memory store is used when unset.
    pub database_url: Option<String>,
    /// Root of the game-data API.
    pub api_base_url: Option<String>,
    /// Maximum age of a stored snapshot served without refreshing.
    pub freshness_window_secs: Option<u64>,
    /// Time budget for a live assembly.
    pub deadline_secs: Option<u64>,
    /// `Cache-Control: max-age` advertised to clients.
    pub client_max_age_secs: Option<u64>,
    /// Per-request timeout for upstream HTTP calls.
    pub upstream_timeout_secs: Option<u64>,
    /// `warn` or `reject` when the equipment block is missing.
    pub scope_policy: Option<String>,
}

/// Configuration problems reported before the server starts.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SettingsError {
    #[error("invalid bind address `{value}`: {message}")]
    BindAddr { value: String, message: String },
    #[error("invalid API base URL `{value}`: {message}")]
    ApiBaseUrl { value: String, message: String },
    #[error("{field} must be greater than zero")]
    ZeroDuration { field: &'static str },
    #[error("{0}")]
    ScopePolicy(String),
}

/// Validated settings with defaults applied.
#[derive(Debug, Clone)]
pub struct ResolvedSettings {
    pub bind_addr: SocketAddr,
    pub database_url: Option<String>,
    pub api_base_url: Url,
    pub lookup: BuildLookupConfig,
    pub client_max_age: Duration,
    pub upstream_timeout: Duration,
    pub scope_policy: ScopePolicy,
}

fn positive_secs(value: Option<u64>, default: u64, field: &'static str) -> Result<Duration, SettingsError> {
    match value.unwrap_or(default) {
        0 => Err(SettingsError::ZeroDuration { field }),
        secs => Ok(Duration::from_secs(secs)),
    }
}

impl AppSettings {
    /// Apply defaults and validate every value.
    ///
    /// # Errors
    ///
    /// Returns [`SettingsError`] for an unparsable address or URL, a zero
    /// duration, or an unknown scope policy.
    pub fn resolve(self) -> Result<ResolvedSettings, SettingsError> {
        let bind_value = self
            .bind_addr
            .unwrap_or_else(|| DEFAULT_BIND_ADDR.to_owned());
        let bind_addr = bind_value
            .parse::<SocketAddr>()
            .map_err(|err| SettingsError::BindAddr {
                value: bind_value.clone(),
                message: err.to_string(),
            })?;

        let url_value = self
            .api_base_url
            .unwrap_or_else(|| DEFAULT_API_BASE_URL.to_owned());
        let api_base_url = Url::parse(&url_value).map_err(|err| SettingsError::ApiBaseUrl {
            value: url_value.clone(),
            message: err.to_string(),
        })?;

        let scope_policy = match self.scope_policy.as_deref() {
            Some(value) => value
                .parse::<ScopePolicy>()
                .map_err(|err| SettingsError::ScopePolicy(err.to_string()))?,
            None => ScopePolicy::default(),
        };

        Ok(ResolvedSettings {
            bind_addr,
            database_url: self.database_url.filter(|url| !url.trim().is_empty()),
            api_base_url,
            lookup: BuildLookupConfig {
                freshness_window: positive_secs(
                    self.freshness_window_secs,
                    DEFAULT_FRESHNESS_WINDOW_SECS,
                    "freshness_window_secs",
                )?,
                deadline: positive_secs(self.deadline_secs, DEFAULT_DEADLINE_SECS, "deadline_secs")?,
            },
            client_max_age: positive_secs(
                self.client_max_age_secs,
                DEFAULT_CLIENT_MAX_AGE_SECS,
                "client_max_age_secs",
            )?,
            upstream_timeout: positive_secs(
                self.upstream_timeout_secs,
                DEFAULT_UPSTREAM_TIMEOUT_SECS,
                "upstream_timeout_secs",
            )?,
            scope_policy,
        })
    }
}

#[cfg(test)]
mod tests {
    //! Unit tests for settings parsing and validation.

    use super::*;
    use std::ffi::OsString;

    use env_lock::lock_env;
    use rstest::rstest;

    const VARS: [&str; 8] = [
        "GW2_BUILD_BIND_ADDR",
        "GW2_BUILD_DATABASE_URL",
        "GW2_BUILD_API_BASE_URL",
        "GW2_BUILD_FRESHNESS_WINDOW_SECS",
        "GW2_BUILD_DEADLINE_SECS",
        "GW2_BUILD_CLIENT_MAX_AGE_SECS",
        "GW2_BUILD_UPSTREAM_TIMEOUT_SECS",
        "GW2_BUILD_SCOPE_POLICY",
    ];

    fn load_with(overrides: &[(&str, &str)]) -> AppSettings {
        let _guard = lock_env(VARS.map(|name| {
            let value = overrides
                .iter()
                .find(|(key, _)| *key == name)
                .map(|(_, value)| (*value).to_owned());
            (name, value)
        }));
        AppSettings::load_from_iter([OsString::from("gw2-build")]).expect("config should load")
    }

    fn empty() -> AppSettings {
        AppSettings {
            bind_addr: None,
            database_url: None,
            api_base_url: None,
            freshness_window_secs: None,
            deadline_secs: None,
            client_max_age_secs: None,
            upstream_timeout_secs: None,
            scope_policy: None,
        }
    }

    #[rstest]
    fn defaults_are_used_when_missing() {
        let resolved = load_with(&[]).resolve().expect("defaults are valid");

        assert_eq!(resolved.bind_addr, "0.0.0.0:8080".parse().expect("socket address"));
        assert!(resolved.database_url.is_none());
        assert_eq!(resolved.api_base_url.as_str(), DEFAULT_API_BASE_URL);
        assert_eq!(resolved.lookup.freshness_window, Duration::from_secs(1800));
        assert_eq!(resolved.lookup.deadline, Duration::from_secs(10));
        assert_eq!(resolved.client_max_age, Duration::from_secs(300));
        assert_eq!(resolved.upstream_timeout, Duration::from_secs(30));
        assert_eq!(resolved.scope_policy, ScopePolicy::Warn);
    }

    #[rstest]
    fn environment_overrides_are_respected() {
        let resolved = load_with(&[
            ("GW2_BUILD_BIND_ADDR", "127.0.0.1:9000"),
            ("GW2_BUILD_DATABASE_URL", "postgres://localhost/gw2"),
            ("GW2_BUILD_DEADLINE_SECS", "4"),
            ("GW2_BUILD_SCOPE_POLICY", "reject"),
        ])
        .resolve()
        .expect("overrides are valid");

        assert_eq!(resolved.bind_addr.port(), 9000);
        assert_eq!(resolved.database_url.as_deref(), Some("postgres://localhost/gw2"));
        assert_eq!(resolved.lookup.deadline, Duration::from_secs(4));
        assert_eq!(resolved.scope_policy, ScopePolicy::Reject);
    }

    #[rstest]
    fn blank_database_url_means_in_memory() {
        let settings = AppSettings {
            database_url: Some("  ".to_owned()),
            ..empty()
        };
        assert!(settings.resolve().expect("valid").database_url.is_none());
    }

    #[rstest]
    #[case::deadline(AppSettings { deadline_secs: Some(0), ..empty() }, "deadline_secs")]
    #[case::window(AppSettings { freshness_window_secs: Some(0), ..empty() }, "freshness_window_secs")]
    #[case::max_age(AppSettings { client_max_age_secs: Some(0), ..empty() }, "client_max_age_secs")]
    #[case::timeout(AppSettings { upstream_timeout_secs: Some(0), ..empty() }, "upstream_timeout_secs")]
    fn zero_durations_are_rejected(#[case] settings: AppSettings, #[case] field: &'static str) {
        assert_eq!(
            settings.resolve().map(|_| ()),
            Err(SettingsError::ZeroDuration { field })
        );
    }

    #[rstest]
    fn unparsable_values_are_reported() {
        let bad_addr = AppSettings {
            bind_addr: Some("not-an-address".to_owned()),
            ..empty()
        };
        assert!(matches!(bad_addr.resolve(), Err(SettingsError::BindAddr { .. })));

        let bad_url = AppSettings {
            api_base_url: Some("::".to_owned()),
            ..empty()
        };
        assert!(matches!(bad_url.resolve(), Err(SettingsError::ApiBaseUrl { .. })));

        let bad_policy = AppSettings {
            scope_policy: Some("ignore".to_owned()),
            ..empty()
        };
        assert!(matches!(bad_policy.resolve(), Err(SettingsError::ScopePolicy(_))));
    }
}
