//! Configuration loading and resolution
//!
//! Values resolve with the usual priority order:
//! 1. Command-line argument (applied by the binary, highest priority)
//! 2. `GTP_*` environment variable
//! 3. TOML config file
//! 4. Compiled default (fallback)
//!
//! The resolved [`GameConfig`] is built once at startup and passed by
//! reference into the services that need it; nothing reads configuration
//! through globals.

use crate::{Error, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::warn;

/// Fully resolved runtime configuration.
#[derive(Debug, Clone)]
pub struct GameConfig {
    /// SQLite database holding scraped players/transfers and built questions
    pub database_path: PathBuf,
    /// HTTP listen port for the game server
    pub port: u16,
    /// Directory of locally cached player/club images, served under /static
    pub static_root: PathBuf,
    /// Session lifetime in seconds (fixed window from creation)
    pub session_ttl_secs: u64,
    /// Interval between background sweeps of expired sessions
    pub cleanup_interval_secs: u64,
    /// Similarity score (0-100) at or above which a guess counts as correct
    pub fuzzy_match_threshold: u8,
    /// Minimum similarity score for free-text player lookup to match
    pub player_lookup_threshold: u8,
}

impl Default for GameConfig {
    fn default() -> Self {
        GameConfig {
            database_path: default_database_path(),
            port: 8000,
            static_root: PathBuf::from("./static"),
            session_ttl_secs: 6 * 60 * 60,
            cleanup_interval_secs: 300,
            fuzzy_match_threshold: 85,
            player_lookup_threshold: 70,
        }
    }
}

/// Partial configuration as read from the TOML file; every field optional.
#[derive(Debug, Default, Deserialize)]
struct FileConfig {
    database_path: Option<PathBuf>,
    port: Option<u16>,
    static_root: Option<PathBuf>,
    session_ttl_secs: Option<u64>,
    cleanup_interval_secs: Option<u64>,
    fuzzy_match_threshold: Option<u8>,
    player_lookup_threshold: Option<u8>,
}

impl GameConfig {
    /// Resolve configuration from file and environment.
    ///
    /// `config_file` is the explicit `--config` path if the user gave one;
    /// otherwise the platform config directory is probed. CLI overrides for
    /// individual fields are applied by the caller on top of the result.
    pub fn resolve(config_file: Option<&Path>) -> Result<Self> {
        let mut config = GameConfig::default();

        if let Some(file) = locate_config_file(config_file) {
            let text = std::fs::read_to_string(&file)?;
            let parsed: FileConfig = toml::from_str(&text)
                .map_err(|e| Error::Config(format!("{}: {}", file.display(), e)))?;
            config.apply_file(parsed);
        }

        config.apply_env();
        config.validate()?;
        Ok(config)
    }

    fn apply_file(&mut self, file: FileConfig) {
        if let Some(v) = file.database_path {
            self.database_path = v;
        }
        if let Some(v) = file.port {
            self.port = v;
        }
        if let Some(v) = file.static_root {
            self.static_root = v;
        }
        if let Some(v) = file.session_ttl_secs {
            self.session_ttl_secs = v;
        }
        if let Some(v) = file.cleanup_interval_secs {
            self.cleanup_interval_secs = v;
        }
        if let Some(v) = file.fuzzy_match_threshold {
            self.fuzzy_match_threshold = v;
        }
        if let Some(v) = file.player_lookup_threshold {
            self.player_lookup_threshold = v;
        }
    }

    fn apply_env(&mut self) {
        if let Ok(v) = std::env::var("GTP_DATABASE") {
            self.database_path = PathBuf::from(v);
        }
        if let Ok(v) = std::env::var("GTP_STATIC_ROOT") {
            self.static_root = PathBuf::from(v);
        }
        apply_env_number("GTP_PORT", &mut self.port);
        apply_env_number("GTP_SESSION_TTL_SECS", &mut self.session_ttl_secs);
        apply_env_number("GTP_CLEANUP_INTERVAL_SECS", &mut self.cleanup_interval_secs);
        apply_env_number("GTP_FUZZY_THRESHOLD", &mut self.fuzzy_match_threshold);
        apply_env_number("GTP_LOOKUP_THRESHOLD", &mut self.player_lookup_threshold);
    }

    fn validate(&self) -> Result<()> {
        if self.session_ttl_secs == 0 {
            return Err(Error::Config(
                "session_ttl_secs must be greater than zero".to_string(),
            ));
        }
        if self.cleanup_interval_secs == 0 {
            return Err(Error::Config(
                "cleanup_interval_secs must be greater than zero".to_string(),
            ));
        }
        if self.fuzzy_match_threshold > 100 || self.player_lookup_threshold > 100 {
            return Err(Error::Config(
                "similarity thresholds are percentages (0-100)".to_string(),
            ));
        }
        Ok(())
    }
}

fn apply_env_number<T: std::str::FromStr>(name: &str, slot: &mut T) {
    if let Ok(raw) = std::env::var(name) {
        match raw.parse() {
            Ok(v) => *slot = v,
            Err(_) => warn!("Ignoring non-numeric {}: {}", name, raw),
        }
    }
}

/// Find the config file to read, if any.
fn locate_config_file(explicit: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = explicit {
        return Some(path.to_path_buf());
    }

    if let Some(path) = dirs::config_dir().map(|d| d.join("gtp").join("config.toml")) {
        if path.exists() {
            return Some(path);
        }
    }

    if cfg!(target_os = "linux") {
        let system = PathBuf::from("/etc/gtp/config.toml");
        if system.exists() {
            return Some(system);
        }
    }

    None
}

/// OS-dependent default database location.
fn default_database_path() -> PathBuf {
    dirs::data_local_dir()
        .map(|d| d.join("gtp").join("transfers.db"))
        .unwrap_or_else(|| PathBuf::from("./gtp_data/transfers.db"))
}
