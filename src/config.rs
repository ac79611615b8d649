//! Configuration loading and management.
//!
//! Settings come from three layers, later ones winning:
//! 1. Defaults
//! 2. A YAML file (`--config`, or `game-tasks.yaml` in the working directory)
//! 3. Environment variables (a `.env` file is loaded first if present)
//!
//! CLI flags are applied on top by `main`.
//!
//! ## Environment Variables
//! - `DATABASE_URL` - SQLite database path, optionally prefixed with `sqlite://`
//! - `GAME_TASKS_DB_PATH` - Database path (takes precedence over `DATABASE_URL`)
//! - `GAME_TASKS_UPLOAD_DIR` - Upload directory
//! - `GAME_TASKS_HOST` - Bind address
//! - `GAME_TASKS_PORT` - Listen port

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::{Path, PathBuf};
use tracing::warn;

/// Config file looked up in the working directory when none is given.
pub const DEFAULT_CONFIG_FILE: &str = "game-tasks.yaml";

/// Application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
}

/// Server-specific configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Path to the SQLite database file.
    #[serde(default = "default_db_path")]
    pub db_path: PathBuf,

    /// Directory holding uploaded task files.
    #[serde(default = "default_upload_dir")]
    pub upload_dir: PathBuf,

    /// Address to bind.
    #[serde(default = "default_host")]
    pub host: IpAddr,

    /// Port to listen on.
    #[serde(default = "default_port")]
    pub port: u16,

    /// Largest accepted upload request, in megabytes.
    #[serde(default = "default_max_upload_mb")]
    pub max_upload_mb: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            db_path: default_db_path(),
            upload_dir: default_upload_dir(),
            host: default_host(),
            port: default_port(),
            max_upload_mb: default_max_upload_mb(),
        }
    }
}

fn default_db_path() -> PathBuf {
    PathBuf::from("game-tasks.db")
}

fn default_upload_dir() -> PathBuf {
    PathBuf::from("uploads")
}

fn default_host() -> IpAddr {
    IpAddr::V4(Ipv4Addr::LOCALHOST)
}

fn default_port() -> u16 {
    5000
}

fn default_max_upload_mb() -> usize {
    512
}

impl ServerConfig {
    pub fn bind_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }

    pub fn max_upload_bytes(&self) -> usize {
        self.max_upload_mb.saturating_mul(1024 * 1024)
    }
}

impl Config {
    /// Load configuration from file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {:?}", path))?;
        let config: Config = serde_yaml::from_str(&content)
            .with_context(|| format!("Failed to parse config file {:?}", path))?;
        Ok(config)
    }

    /// Load from an explicit path, or the default file if it exists, then
    /// apply environment overrides.
    pub fn load_with_env(explicit: Option<&Path>) -> Result<Self> {
        // A missing .env is normal.
        let _ = dotenvy::dotenv();

        let mut config = match explicit {
            Some(path) => Self::load(path)?,
            None if Path::new(DEFAULT_CONFIG_FILE).exists() => Self::load(DEFAULT_CONFIG_FILE)?,
            None => Self::default(),
        };
        config.apply_env(|key| std::env::var(key).ok());
        Ok(config)
    }

    /// Apply environment overrides using `lookup` to read variables.
    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup("DATABASE_URL") {
            self.server.db_path = db_path_from_url(&url);
        }

        if let Some(db_path) = lookup("GAME_TASKS_DB_PATH") {
            self.server.db_path = PathBuf::from(db_path);
        }

        if let Some(dir) = lookup("GAME_TASKS_UPLOAD_DIR") {
            self.server.upload_dir = PathBuf::from(dir);
        }

        if let Some(host) = lookup("GAME_TASKS_HOST") {
            match host.parse() {
                Ok(host) => self.server.host = host,
                Err(_) => warn!("Ignoring invalid GAME_TASKS_HOST: {}", host),
            }
        }

        if let Some(port) = lookup("GAME_TASKS_PORT") {
            match port.parse() {
                Ok(port) => self.server.port = port,
                Err(_) => warn!("Ignoring invalid GAME_TASKS_PORT: {}", port),
            }
        }
    }

    /// Ensure the database and upload directories exist.
    pub fn ensure_dirs(&self) -> Result<()> {
        if let Some(parent) = self.server.db_path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        std::fs::create_dir_all(&self.server.upload_dir)?;
        Ok(())
    }
}

/// Strip a `sqlite://` or `sqlite:` scheme from a connection string.
fn db_path_from_url(url: &str) -> PathBuf {
    let path = url
        .strip_prefix("sqlite://")
        .or_else(|| url.strip_prefix("sqlite:"))
        .unwrap_or(url);
    PathBuf::from(path)
}
