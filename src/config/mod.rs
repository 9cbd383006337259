//! Configuration module for the poll server.
//!
//! All configuration is loaded from environment variables with sensible defaults.

use std::env;
use std::net::SocketAddr;
use std::path::PathBuf;

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    /// Directory holding the event registry and per-event files
    pub data_dir: PathBuf,
    /// Address to bind the server to
    pub bind_addr: SocketAddr,
    /// Base URL used when building the shareable member link
    pub public_url: String,
    /// Log level (trace, debug, info, warn, error)
    pub log_level: String,
    /// Emit log lines as JSON
    pub log_json: bool,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();

        let data_dir = env::var("DATEPOLL_DATA_DIR")
            .unwrap_or_else(|_| "./data".to_string())
            .into();

        let bind_addr: SocketAddr = env::var("DATEPOLL_BIND_ADDR")
            .unwrap_or_else(|_| "127.0.0.1:5000".to_string())
            .parse()
            .expect("Invalid DATEPOLL_BIND_ADDR format");

        let public_url = env::var("DATEPOLL_PUBLIC_URL")
            .map(|url| url.trim_end_matches('/').to_string())
            .unwrap_or_else(|_| format!("http://{}", bind_addr));

        let log_level = env::var("DATEPOLL_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());

        let log_json = env::var("DATEPOLL_LOG_JSON")
            .map(|v| matches!(v.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes"))
            .unwrap_or(false);

        Self {
            data_dir,
            bind_addr,
            public_url,
            log_level,
            log_json,
        }
    }

    /// Shareable read-only link for an event.
    pub fn member_url(&self, event_id: &str) -> String {
        format!("{}/event/{}", self.public_url, event_id)
    }
}
