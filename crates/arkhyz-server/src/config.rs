use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result, bail};
use tracing::info;

use arkhyz_api::{AdminAccess, AdminCredentials, DispatchOptions};

/// Admin passwords that MUST NOT be used.
const PLACEHOLDER_PASSWORDS: &[&str] = &["change-me", "admin", "password"];

/// Where records live. Chosen once at startup.
#[derive(Debug, Clone, PartialEq)]
pub enum StorageConfig {
    Sqlite(PathBuf),
    Postgres(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct KeepAliveConfig {
    pub site_url: String,
    pub first_delay: Duration,
    pub interval: Duration,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub storage: StorageConfig,
    pub static_dir: PathBuf,
    /// Served only at the guarded `/admin.html` route, never from `static_dir`.
    pub admin_page: PathBuf,
    pub admin: AdminAccess,
    pub dispatch: DispatchOptions,
    pub keepalive: Option<KeepAliveConfig>,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build the configuration from any key lookup, so parsing is testable
    /// without touching the process environment.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let host = var("ARKHYZ_HOST").unwrap_or_else(|| "0.0.0.0".into());
        let port: u16 = parse_or(var("ARKHYZ_PORT"), "ARKHYZ_PORT", 3000)?;

        let storage = match var("ARKHYZ_DATABASE_URL") {
            Some(url) if url.starts_with("postgres://") || url.starts_with("postgresql://") => {
                StorageConfig::Postgres(url)
            }
            Some(_) => bail!("ARKHYZ_DATABASE_URL must be a postgres:// or postgresql:// URL"),
            None => StorageConfig::Sqlite(
                var("ARKHYZ_DB_PATH").unwrap_or_else(|| "database.db".into()).into(),
            ),
        };

        let static_dir: PathBuf = var("ARKHYZ_STATIC_DIR").unwrap_or_else(|| "public".into()).into();
        let admin_page: PathBuf =
            var("ARKHYZ_ADMIN_PAGE").unwrap_or_else(|| "admin/admin.html".into()).into();

        let admin = if parse_bool(var("ARKHYZ_ADMIN_ROUTES"), "ARKHYZ_ADMIN_ROUTES", true)? {
            let username = var("ARKHYZ_ADMIN_USERNAME").unwrap_or_else(|| "admin".into());
            let password = var("ARKHYZ_ADMIN_PASSWORD")
                .context("ARKHYZ_ADMIN_PASSWORD must be set when admin routes are enabled")?;
            if PLACEHOLDER_PASSWORDS.contains(&password.as_str()) {
                bail!("ARKHYZ_ADMIN_PASSWORD is still a placeholder; choose a real password");
            }
            AdminAccess::Protected(AdminCredentials::new(username, password))
        } else {
            AdminAccess::Disabled
        };

        let dispatch = DispatchOptions {
            strict_validation: parse_bool(
                var("ARKHYZ_STRICT_VALIDATION"),
                "ARKHYZ_STRICT_VALIDATION",
                true,
            )?,
            dedup_window: Duration::from_secs(parse_or(
                var("ARKHYZ_DEDUP_WINDOW_SECS"),
                "ARKHYZ_DEDUP_WINDOW_SECS",
                600,
            )?),
        };

        let keepalive = match var("ARKHYZ_KEEPALIVE_URL") {
            Some(site_url) => {
                let interval_secs: u64 = parse_or(
                    var("ARKHYZ_KEEPALIVE_INTERVAL_SECS"),
                    "ARKHYZ_KEEPALIVE_INTERVAL_SECS",
                    240,
                )?;
                if interval_secs == 0 {
                    bail!("ARKHYZ_KEEPALIVE_INTERVAL_SECS must be at least 1");
                }
                Some(KeepAliveConfig {
                    site_url,
                    first_delay: Duration::from_secs(60),
                    interval: Duration::from_secs(interval_secs),
                })
            }
            None => None,
        };

        Ok(Self {
            host,
            port,
            storage,
            static_dir,
            admin_page,
            admin,
            dispatch,
            keepalive,
        })
    }

    pub fn log_summary(&self) {
        match &self.storage {
            StorageConfig::Sqlite(path) => info!("Storage: SQLite at {}", path.display()),
            StorageConfig::Postgres(_) => info!("Storage: PostgreSQL"),
        }
        info!("Static files: {}", self.static_dir.display());
        info!("Admin page: {}", self.admin_page.display());
        match &self.admin {
            AdminAccess::Protected(creds) => info!("Admin routes protected (username: {})", creds.username),
            AdminAccess::Disabled => info!("Admin routes disabled (listings are public)"),
        }
        info!(
            "Server-side validation: {}, duplicate window: {}s",
            if self.dispatch.strict_validation { "on" } else { "off" },
            self.dispatch.dedup_window.as_secs()
        );
        if let Some(k) = &self.keepalive {
            info!("Keep-alive active (ping every {}s)", k.interval.as_secs());
        }
    }
}

fn parse_or<T>(raw: Option<String>, key: &str, default: T) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match raw {
        Some(v) => v.parse().map_err(|e| anyhow::anyhow!("Invalid {key} value '{v}': {e}")),
        None => Ok(default),
    }
}

fn parse_bool(raw: Option<String>, key: &str, default: bool) -> Result<bool> {
    match raw.as_deref().map(str::to_ascii_lowercase).as_deref() {
        None => Ok(default),
        Some("1" | "true" | "yes" | "on") => Ok(true),
        Some("0" | "false" | "no" | "off") => Ok(false),
        Some(other) => bail!("Invalid {key} value '{other}': expected true or false"),
    }
}
