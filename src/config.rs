//! Runtime configuration read from environment variables.

use anyhow::{anyhow, Context, Result};
use std::env;
use std::path::PathBuf;
use std::str::FromStr;

use crate::catalog::{CatalogQuery, DEFAULT_CATALOG_URL, DEFAULT_SORT_FIELD};
use crate::environment::split_list;
use crate::mail::MailSettings;
use crate::popularity::{DB_THRESHOLD, PLOT_THRESHOLD};

/// Struct holding everything the daily job needs
#[derive(Debug, Clone)]
pub struct Config {
    pub catalog: CatalogQuery,
    pub database_path: String,
    pub static_dir: PathBuf,
    pub db_threshold: f64,
    pub plot_threshold: f64,
    /// SMTP account, when `EMAIL_HOST` and `EMAIL_USER` are set
    pub mail: Option<MailSettings>,
    pub notify: Vec<String>,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the configuration from any key lookup; unset keys take their defaults
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_string());

        let mail = match (lookup("EMAIL_HOST"), lookup("EMAIL_USER")) {
            (Some(host), Some(user)) => Some(MailSettings {
                host,
                port: parse_or(&lookup, "EMAIL_PORT", 465)?,
                user,
                password: get("EMAIL_PASSWORD", ""),
            }),
            _ => None,
        };

        Ok(Config {
            catalog: CatalogQuery {
                base_url: get("OHLOH_URL", DEFAULT_CATALOG_URL),
                api_key: get("OHLOH_API_KEY", ""),
                sort: get("SORT_FIELD", DEFAULT_SORT_FIELD),
            },
            database_path: get("DATABASE_PATH", "langpop.db"),
            static_dir: PathBuf::from(get("WWW_STATIC", "static")),
            db_threshold: parse_or(&lookup, "DB_THRESHOLD", DB_THRESHOLD)?,
            plot_threshold: parse_or(&lookup, "PLOT_THRESHOLD", PLOT_THRESHOLD)?,
            mail,
            notify: split_list(&get("NOTIFY_EMAILS", ""), ';'),
        })
    }

    /// Fails unless a catalog API key is configured
    pub fn require_api_key(&self) -> Result<&str> {
        if self.catalog.api_key.trim().is_empty() {
            return Err(anyhow!("OHLOH_API_KEY environment variable required"));
        }
        Ok(&self.catalog.api_key)
    }
}

fn parse_or<F, T>(lookup: &F, key: &str, default: T) -> Result<T>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match lookup(key) {
        Some(value) => value
            .trim()
            .parse()
            .with_context(|| format!("Invalid value for {}: {}", key, value)),
        None => Ok(default),
    }
}
