//! Bootstrap configuration loading
//!
//! Configuration file resolution priority:
//! 1. Command-line argument (highest priority)
//! 2. `WEEKLY_PLAYLIST_CONFIG` environment variable
//! 3. `<config dir>/weekly-playlist/config.toml`
//! 4. Compiled defaults (fallback)
//!
//! A missing file at (3) is not an error: we warn and run on defaults. A file
//! named explicitly through (1) or (2) must exist.

use crate::playlist_update::MAX_BATCH_SIZE;
use crate::time::DEFAULT_SHOW_HOURS;
use crate::{Error, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{info, warn};

/// Environment variable naming the config file
pub const CONFIG_ENV_VAR: &str = "WEEKLY_PLAYLIST_CONFIG";
/// Environment variable overriding `spotify.access_token`
pub const SPOTIFY_TOKEN_ENV_VAR: &str = "WEEKLY_SPOTIFY_TOKEN";
/// Environment variable overriding `facebook.access_token`
pub const FACEBOOK_TOKEN_ENV_VAR: &str = "WEEKLY_FACEBOOK_TOKEN";

/// Top-level TOML configuration
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TomlConfig {
    #[serde(default)]
    pub spotify: SpotifyConfig,

    #[serde(default)]
    pub facebook: FacebookConfig,

    #[serde(default)]
    pub tracklist: TracklistConfig,

    #[serde(default)]
    pub sync: SyncConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Music catalog / playlist API settings
#[derive(Debug, Clone, Deserialize)]
pub struct SpotifyConfig {
    /// Pre-issued bearer token (OAuth happens outside this program)
    #[serde(default)]
    pub access_token: Option<String>,

    #[serde(default = "default_spotify_api_base")]
    pub api_base: String,

    /// Market used for search and top tracks
    #[serde(default = "default_market")]
    pub market: String,

    /// Playlist owner. When unset, playlists are created for the token's user.
    #[serde(default)]
    pub user: Option<String>,
}

/// Venue event listing settings
#[derive(Debug, Clone, Deserialize)]
pub struct FacebookConfig {
    #[serde(default)]
    pub access_token: Option<String>,

    #[serde(default = "default_facebook_api_base")]
    pub api_base: String,

    /// Maximum number of event pages followed per venue
    #[serde(default = "default_max_pages")]
    pub max_pages: usize,

    /// Only events starting within this many days are kept; clamped to
    /// 1..=366
    #[serde(default = "default_horizon_days")]
    pub horizon_days: i64,
}

/// Radio tracklist API settings
#[derive(Debug, Clone, Deserialize)]
pub struct TracklistConfig {
    #[serde(default = "default_tracklist_api_base")]
    pub api_base: String,
}

/// Synchronisation behaviour
#[derive(Debug, Clone, Deserialize)]
pub struct SyncConfig {
    /// JSON file listing regions and their venues
    #[serde(default = "default_regions_file")]
    pub regions_file: PathBuf,

    #[serde(default = "default_top_tracks")]
    pub top_tracks_per_artist: usize,

    /// Ids per add/remove request; clamped to 1..=50
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,

    #[serde(default = "default_show_hours")]
    pub show_hours: u32,

    /// Delay before retrying a rate-limited catalog search
    #[serde(default = "default_rate_limit_backoff_ms")]
    pub rate_limit_backoff_ms: u64,

    #[serde(default = "default_eclectic_prefix")]
    pub eclectic_playlist_prefix: String,

    #[serde(default = "default_region_suffix")]
    pub region_playlist_suffix: String,
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Log file path (optional, logs to stderr if not specified)
    #[serde(default)]
    pub file: Option<PathBuf>,
}

fn default_spotify_api_base() -> String {
    "https://api.spotify.com/v1".to_string()
}

fn default_market() -> String {
    "US".to_string()
}

fn default_facebook_api_base() -> String {
    "https://graph.facebook.com".to_string()
}

fn default_max_pages() -> usize {
    10
}

fn default_horizon_days() -> i64 {
    7
}

fn default_tracklist_api_base() -> String {
    "http://tracklist-api.kcrw.com/Music/date".to_string()
}

fn default_regions_file() -> PathBuf {
    PathBuf::from("regions.json")
}

fn default_top_tracks() -> usize {
    3
}

fn default_batch_size() -> usize {
    MAX_BATCH_SIZE
}

fn default_show_hours() -> u32 {
    DEFAULT_SHOW_HOURS
}

fn default_rate_limit_backoff_ms() -> u64 {
    1000
}

fn default_eclectic_prefix() -> String {
    "mbe".to_string()
}

fn default_region_suffix() -> String {
    "weekly".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for SpotifyConfig {
    fn default() -> Self {
        Self {
            access_token: None,
            api_base: default_spotify_api_base(),
            market: default_market(),
            user: None,
        }
    }
}

impl Default for FacebookConfig {
    fn default() -> Self {
        Self {
            access_token: None,
            api_base: default_facebook_api_base(),
            max_pages: default_max_pages(),
            horizon_days: default_horizon_days(),
        }
    }
}

impl Default for TracklistConfig {
    fn default() -> Self {
        Self {
            api_base: default_tracklist_api_base(),
        }
    }
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            regions_file: default_regions_file(),
            top_tracks_per_artist: default_top_tracks(),
            batch_size: default_batch_size(),
            show_hours: default_show_hours(),
            rate_limit_backoff_ms: default_rate_limit_backoff_ms(),
            eclectic_playlist_prefix: default_eclectic_prefix(),
            region_playlist_suffix: default_region_suffix(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            file: None,
        }
    }
}

/// Longest event horizon accepted from configuration
pub const MAX_HORIZON_DAYS: i64 = 366;

impl FacebookConfig {
    /// Event horizon, limited to a range `chrono::Duration` can hold
    pub fn horizon(&self) -> chrono::Duration {
        chrono::Duration::days(self.horizon_days.clamp(1, MAX_HORIZON_DAYS))
    }
}

impl SyncConfig {
    pub fn rate_limit_backoff(&self) -> Duration {
        Duration::from_millis(self.rate_limit_backoff_ms)
    }

    /// Batch size the playlist API will accept
    pub fn effective_batch_size(&self) -> usize {
        self.batch_size.clamp(1, MAX_BATCH_SIZE)
    }
}

impl TomlConfig {
    /// Parse configuration from TOML text
    pub fn from_toml_str(text: &str) -> Result<Self> {
        toml::from_str(text).map_err(|e| Error::Config(format!("Failed to parse TOML: {}", e)))
    }

    /// Read and parse one configuration file
    pub fn from_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path).map_err(|e| {
            Error::Config(format!("Failed to read config file {:?}: {}", path, e))
        })?;
        let config = Self::from_toml_str(&text)?;
        info!("Loaded TOML configuration from {:?}", path);
        Ok(config)
    }

    /// Resolve, load and apply environment overrides
    pub fn load(cli_arg: Option<&Path>) -> Result<Self> {
        let mut config = match resolve_config_path(cli_arg)? {
            Some(path) => Self::from_file(&path)?,
            None => {
                warn!("No configuration file found, using built-in defaults");
                Self::default()
            }
        };
        config.apply_env_overrides();
        Ok(config)
    }

    /// Tokens from the environment win over tokens in the file
    pub fn apply_env_overrides(&mut self) {
        if let Ok(token) = std::env::var(SPOTIFY_TOKEN_ENV_VAR) {
            if !token.trim().is_empty() {
                self.spotify.access_token = Some(token);
            }
        }
        if let Ok(token) = std::env::var(FACEBOOK_TOKEN_ENV_VAR) {
            if !token.trim().is_empty() {
                self.facebook.access_token = Some(token);
            }
        }
    }
}

/// Find the configuration file to load, if any
pub fn resolve_config_path(cli_arg: Option<&Path>) -> Result<Option<PathBuf>> {
    // Priority 1: Command-line argument
    if let Some(path) = cli_arg {
        return require_exists(path.to_path_buf());
    }

    // Priority 2: Environment variable
    if let Ok(path) = std::env::var(CONFIG_ENV_VAR) {
        if !path.trim().is_empty() {
            return require_exists(PathBuf::from(path));
        }
    }

    // Priority 3: Platform config directory
    if let Some(path) = default_config_path() {
        if path.exists() {
            return Ok(Some(path));
        }
    }

    // Priority 4: compiled defaults
    Ok(None)
}

/// `<config dir>/weekly-playlist/config.toml` for the current platform
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("weekly-playlist").join("config.toml"))
}

fn require_exists(path: PathBuf) -> Result<Option<PathBuf>> {
    if path.exists() {
        Ok(Some(path))
    } else {
        Err(Error::Config(format!("Config file not found: {:?}", path)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = TomlConfig::default();
        assert_eq!(config.spotify.market, "US");
        assert_eq!(config.sync.top_tracks_per_artist, 3);
        assert_eq!(config.sync.batch_size, 50);
        assert_eq!(config.sync.show_hours, 3);
        assert_eq!(config.sync.rate_limit_backoff(), Duration::from_secs(1));
        assert_eq!(config.facebook.max_pages, 10);
        assert_eq!(config.logging.level, "info");
        assert!(config.logging.file.is_none());
    }

    #[test]
    fn test_empty_document_uses_defaults() {
        let config = TomlConfig::from_toml_str("").unwrap();
        assert_eq!(config.sync.regions_file, PathBuf::from("regions.json"));
        assert_eq!(config.sync.eclectic_playlist_prefix, "mbe");
    }

    #[test]
    fn test_partial_section_keeps_other_defaults() {
        let config = TomlConfig::from_toml_str(
            r#"
            [sync]
            top_tracks_per_artist = 5

            [spotify]
            market = "GB"
            "#,
        )
        .unwrap();
        assert_eq!(config.sync.top_tracks_per_artist, 5);
        assert_eq!(config.sync.batch_size, 50);
        assert_eq!(config.spotify.market, "GB");
        assert_eq!(config.spotify.api_base, "https://api.spotify.com/v1");
    }

    #[test]
    fn test_batch_size_is_clamped() {
        let mut sync = SyncConfig::default();
        sync.batch_size = 500;
        assert_eq!(sync.effective_batch_size(), 50);
        sync.batch_size = 0;
        assert_eq!(sync.effective_batch_size(), 1);
    }

    #[test]
    fn test_horizon_is_clamped() {
        let mut facebook = FacebookConfig::default();
        assert_eq!(facebook.horizon(), chrono::Duration::days(7));
        facebook.horizon_days = i64::MAX;
        assert_eq!(facebook.horizon(), chrono::Duration::days(MAX_HORIZON_DAYS));
        facebook.horizon_days = -3;
        assert_eq!(facebook.horizon(), chrono::Duration::days(1));
    }

    #[test]
    fn test_invalid_toml_is_config_error() {
        let err = TomlConfig::from_toml_str("sync = [").unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }
}
