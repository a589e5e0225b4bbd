//! Server settings loaded via OrthoConfig.
//!
//! Values come from `FOODGRAM_*` environment variables, a configuration file
//! or command-line flags; absent values fall back to the defaults below.

use std::net::SocketAddr;
use std::path::PathBuf;

use mockable::Env;
use ortho_config::OrthoConfig;
use pagination::{DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE};
use serde::Deserialize;

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";
const DEFAULT_MEDIA_ROOT: &str = "media";
const DEFAULT_MEDIA_BASE_URL: &str = "/media/";
/// Conventional variable consulted when `FOODGRAM_DATABASE_URL` is unset.
pub const DATABASE_URL_ENV: &str = "DATABASE_URL";

/// Errors raised while interpreting loaded settings.
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("invalid bind address '{value}': {source}")]
    BindAddr {
        value: String,
        #[source]
        source: std::net::AddrParseError,
    },
}

/// Runtime configuration for the HTTP server.
#[derive(Debug, Clone, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "FOODGRAM")]
pub struct AppSettings {
    /// Socket address to bind, e.g. `0.0.0.0:8080`.
    pub bind_addr: Option<String>,
    /// PostgreSQL URL; without one the server keeps data in memory.
    pub database_url: Option<String>,
    /// Apply pending migrations before serving.
    #[ortho_config(default = true)]
    pub run_migrations: bool,
    /// Directory uploaded images are written to.
    pub media_root: Option<PathBuf>,
    /// Public URL prefix of `media_root`.
    pub media_base_url: Option<String>,
    /// Default listing page size.
    pub page_size: Option<u32>,
}

impl AppSettings {
    /// Parsed bind address.
    ///
    /// # Errors
    ///
    /// Fails when the configured value is not a socket address.
    pub fn bind_addr(&self) -> Result<SocketAddr, SettingsError> {
        let value = self.bind_addr.as_deref().unwrap_or(DEFAULT_BIND_ADDR);
        value.parse().map_err(|source| SettingsError::BindAddr {
            value: value.to_owned(),
            source,
        })
    }

    /// Configured database URL, else `DATABASE_URL` from `env`.
    pub fn database_url(&self, env: &impl Env) -> Option<String> {
        self.database_url
            .clone()
            .or_else(|| env.string(DATABASE_URL_ENV))
            .filter(|url| !url.trim().is_empty())
    }

    pub fn media_root(&self) -> PathBuf {
        self.media_root
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_MEDIA_ROOT))
    }

    pub fn media_base_url(&self) -> &str {
        self.media_base_url
            .as_deref()
            .unwrap_or(DEFAULT_MEDIA_BASE_URL)
    }

    /// Page size clamped to `1..=MAX_PAGE_SIZE`.
    pub fn page_size(&self) -> u32 {
        self.page_size
            .unwrap_or(DEFAULT_PAGE_SIZE)
            .clamp(1, MAX_PAGE_SIZE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::ffi::OsString;

    use env_lock::lock_env;
    use mockable::MockEnv;
    use rstest::rstest;

    const VARS: [&str; 6] = [
        "FOODGRAM_BIND_ADDR",
        "FOODGRAM_DATABASE_URL",
        "FOODGRAM_RUN_MIGRATIONS",
        "FOODGRAM_MEDIA_ROOT",
        "FOODGRAM_MEDIA_BASE_URL",
        "FOODGRAM_PAGE_SIZE",
    ];

    fn load() -> AppSettings {
        AppSettings::load_from_iter([OsString::from("foodgram-backend")])
            .expect("config should load")
    }

    fn env_returning(value: Option<&'static str>) -> MockEnv {
        let mut env = MockEnv::new();
        env.expect_string()
            .times(0..)
            .returning(move |_| value.map(str::to_owned));
        env
    }

    #[rstest]
    fn defaults_apply_when_nothing_is_set() {
        let _guard = lock_env(VARS.map(|name| (name, None::<String>)));

        let settings = load();
        assert_eq!(
            settings.bind_addr().expect("bind addr"),
            "0.0.0.0:8080".parse::<SocketAddr>().expect("socket")
        );
        assert!(settings.run_migrations);
        assert_eq!(settings.media_root(), PathBuf::from("media"));
        assert_eq!(settings.media_base_url(), "/media/");
        assert_eq!(settings.page_size(), DEFAULT_PAGE_SIZE);
        assert_eq!(settings.database_url(&env_returning(None)), None);
    }

    #[rstest]
    fn environment_overrides_are_respected() {
        let _guard = lock_env([
            ("FOODGRAM_BIND_ADDR", Some("127.0.0.1:9000".to_owned())),
            (
                "FOODGRAM_DATABASE_URL",
                Some("postgres://foodgram@db/foodgram".to_owned()),
            ),
            ("FOODGRAM_RUN_MIGRATIONS", Some("false".to_owned())),
            ("FOODGRAM_MEDIA_ROOT", Some("/srv/media".to_owned())),
            (
                "FOODGRAM_MEDIA_BASE_URL",
                Some("https://cdn.example/media/".to_owned()),
            ),
            ("FOODGRAM_PAGE_SIZE", Some("10".to_owned())),
        ]);

        let settings = load();
        assert_eq!(
            settings.bind_addr().expect("bind addr").port(),
            9000
        );
        assert!(!settings.run_migrations);
        assert_eq!(settings.media_root(), PathBuf::from("/srv/media"));
        assert_eq!(settings.media_base_url(), "https://cdn.example/media/");
        assert_eq!(settings.page_size(), 10);
        assert_eq!(
            settings
                .database_url(&env_returning(Some("postgres://ignored")))
                .as_deref(),
            Some("postgres://foodgram@db/foodgram")
        );
    }

    #[rstest]
    #[case(Some("postgres://fallback/foodgram"), Some("postgres://fallback/foodgram"))]
    #[case(Some("   "), None)]
    #[case(None, None)]
    fn database_url_falls_back_to_the_conventional_variable(
        #[case] fallback: Option<&'static str>,
        #[case] expected: Option<&str>,
    ) {
        let settings = AppSettings {
            bind_addr: None,
            database_url: None,
            run_migrations: true,
            media_root: None,
            media_base_url: None,
            page_size: None,
        };
        assert_eq!(
            settings.database_url(&env_returning(fallback)).as_deref(),
            expected
        );
    }

    #[rstest]
    #[case(Some(0), 1)]
    #[case(Some(500), MAX_PAGE_SIZE)]
    #[case(None, DEFAULT_PAGE_SIZE)]
    fn page_size_is_clamped(#[case] configured: Option<u32>, #[case] expected: u32) {
        let settings = AppSettings {
            bind_addr: Some("not an address".to_owned()),
            database_url: None,
            run_migrations: false,
            media_root: None,
            media_base_url: None,
            page_size: configured,
        };
        assert_eq!(settings.page_size(), expected);
        assert!(matches!(
            settings.bind_addr(),
            Err(SettingsError::BindAddr { .. })
        ));
    }
}
