//! Configuration module for the CertManager backend.
//!
//! All configuration is loaded from environment variables with sensible defaults.

use std::env;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

/// Largest accepted expiring-soon window, in days.
pub const MAX_EXPIRY_WINDOW_DAYS: i64 = 3650;

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    /// Path to the SQLite database holding the session
    pub db_path: PathBuf,
    /// Address to bind the server to
    pub bind_addr: SocketAddr,
    /// Log level (trace, debug, info, warn, error)
    pub log_level: String,
    /// Simulated load time of a listing page
    pub loading_delay: Duration,
    /// Simulated latency of sign-in and sign-up
    pub auth_delay: Duration,
    /// Days ahead in which an expiration counts as "expiring soon"
    pub expiry_window_days: i64,
    /// Notifications kept before the oldest is dropped
    pub notification_capacity: usize,
    /// Public prefix of certificate share links
    pub share_base_url: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            db_path: PathBuf::from("./data/certmanager.sqlite"),
            bind_addr: SocketAddr::from(([127, 0, 0, 1], 8080)),
            log_level: "info".to_string(),
            loading_delay: Duration::from_millis(800),
            auth_delay: Duration::from_millis(1000),
            expiry_window_days: 30,
            notification_capacity: 50,
            share_base_url: "https://certmanager.com/share".to_string(),
        }
    }
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();
        let defaults = Self::default();

        let db_path = env::var("CERTMANAGER_DB_PATH")
            .map(PathBuf::from)
            .unwrap_or(defaults.db_path);

        let bind_addr = parse_var("CERTMANAGER_BIND_ADDR", defaults.bind_addr);

        let log_level = env::var("CERTMANAGER_LOG_LEVEL").unwrap_or(defaults.log_level);

        let share_base_url =
            env::var("CERTMANAGER_SHARE_BASE_URL").unwrap_or(defaults.share_base_url);

        let loading_delay = parse_var::<u64>(
            "CERTMANAGER_LOADING_DELAY_MS",
            defaults.loading_delay.as_millis() as u64,
        );
        let auth_delay = parse_var::<u64>(
            "CERTMANAGER_AUTH_DELAY_MS",
            defaults.auth_delay.as_millis() as u64,
        );

        let mut expiry_window_days =
            parse_var("CERTMANAGER_EXPIRY_WINDOW_DAYS", defaults.expiry_window_days);
        if !(0..=MAX_EXPIRY_WINDOW_DAYS).contains(&expiry_window_days) {
            tracing::warn!(
                "CERTMANAGER_EXPIRY_WINDOW_DAYS {} outside 0..={}, using {}",
                expiry_window_days,
                MAX_EXPIRY_WINDOW_DAYS,
                defaults.expiry_window_days
            );
            expiry_window_days = defaults.expiry_window_days;
        }

        Self {
            db_path,
            bind_addr,
            log_level,
            loading_delay: Duration::from_millis(loading_delay),
            auth_delay: Duration::from_millis(auth_delay),
            expiry_window_days,
            notification_capacity: parse_var(
                "CERTMANAGER_NOTIFICATION_CAPACITY",
                defaults.notification_capacity,
            ),
            share_base_url,
        }
    }

    /// The expiring-soon window, clamped to `0..=MAX_EXPIRY_WINDOW_DAYS` days.
    pub fn expiry_window(&self) -> chrono::Duration {
        chrono::Duration::days(self.expiry_window_days.clamp(0, MAX_EXPIRY_WINDOW_DAYS))
    }
}

/// Read and parse `key`, keeping `default` when unset or invalid.
fn parse_var<T>(key: &str, default: T) -> T
where
    T: FromStr + std::fmt::Display,
{
    match env::var(key) {
        Ok(raw) => raw.trim().parse().unwrap_or_else(|_| {
            tracing::warn!("Invalid {} value {:?}, using {}", key, raw, default);
            default
        }),
        Err(_) => default,
    }
}
