//! Persisted application settings.
//!
//! The settings live in one YAML document. Every key is optional; missing
//! keys take their defaults, and an unreadable document is replaced by the
//! defaults in memory without touching the file.

use crate::error::{NoteError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::str::FromStr;
use tracing::{info, warn};

pub const CONFIG_FILE: &str = ".notedir.yml";
pub const DEFAULT_BASE_PATH: &str = "{home}/.notedir";
pub const DEFAULT_THEME: &str = "light";
pub const DEFAULT_FONT_SIZE: u32 = 20;

/// Window size as `width x height`, written as `"800x600"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Geometry {
    pub width: u32,
    pub height: u32,
}

impl Default for Geometry {
    fn default() -> Self {
        Self { width: 800, height: 600 }
    }
}

impl fmt::Display for Geometry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

impl FromStr for Geometry {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let (w, h) = s
            .trim()
            .split_once(['x', 'X'])
            .ok_or_else(|| format!("geometry must look like 800x600: {s}"))?;
        let width = w.trim().parse().map_err(|_| format!("bad width: {w}"))?;
        let height = h.trim().parse().map_err(|_| format!("bad height: {h}"))?;
        Ok(Self { width, height })
    }
}

impl TryFrom<String> for Geometry {
    type Error = String;

    fn try_from(value: String) -> std::result::Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Geometry> for String {
    fn from(g: Geometry) -> Self {
        g.to_string()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Files written before the key existed are layout v1.
    #[serde(default = "legacy_persistence_version")]
    pub persistence_version: u32,
    /// Directory holding `notes/` and `style.css`; `{home}` is expanded.
    pub base_path: String,
    pub theme: String,
    /// Shell command template; `{filename}` is replaced by the target path.
    pub screenshot_command: String,
    pub geometry: Geometry,
    pub font_size: u32,
}

fn legacy_persistence_version() -> u32 {
    1
}

impl Default for Config {
    fn default() -> Self {
        Self {
            persistence_version:
                crate::shared::migrate::CURRENT_PERSISTENCE_VERSION,
            base_path: DEFAULT_BASE_PATH.to_string(),
            theme: DEFAULT_THEME.to_string(),
            screenshot_command: default_screenshot_command(),
            geometry: Geometry::default(),
            font_size: DEFAULT_FONT_SIZE,
        }
    }
}

impl Config {
    /// `base_path` with `{home}` replaced by the user's home directory.
    pub fn resolved_base_path(&self) -> PathBuf {
        let home = dirs::home_dir().unwrap_or_else(|| PathBuf::from("."));
        PathBuf::from(
            self.base_path.replace("{home}", &home.to_string_lossy()),
        )
    }

    /// Update one setting from its textual form.
    pub fn set(&mut self, key: &str, value: &str) -> std::result::Result<(), String> {
        match key {
            "theme" => self.theme = value.to_string(),
            "screenshot_command" | "screenshot-command" => {
                self.screenshot_command = value.to_string()
            }
            "geometry" => self.geometry = value.parse()?,
            "font_size" | "font-size" => {
                self.font_size = value
                    .parse()
                    .map_err(|_| format!("font size must be a number: {value}"))?
            }
            "base_path" | "base-path" => self.base_path = value.to_string(),
            other => return Err(format!("Unknown config key: {other}")),
        }
        Ok(())
    }
}

/// Prefer `spectacle` when it is installed, otherwise `gnome-screenshot`.
pub fn default_screenshot_command() -> String {
    let has_spectacle = Command::new("spectacle")
        .arg("--version")
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .is_ok_and(|s| s.success());
    if has_spectacle {
        "spectacle -rbn -o \"{filename}\"".to_string()
    } else {
        "gnome-screenshot -a -f \"{filename}\"".to_string()
    }
}

/// Default config location: `NOTEDIR_CONFIG`, else `~/.notedir.yml`.
pub fn default_config_path() -> io::Result<PathBuf> {
    if let Ok(path) = std::env::var("NOTEDIR_CONFIG") {
        return Ok(PathBuf::from(path));
    }
    let home = dirs::home_dir().ok_or_else(|| {
        io::Error::other("home directory unknown; set NOTEDIR_CONFIG explicitly")
    })?;
    Ok(home.join(CONFIG_FILE))
}

#[derive(Debug, Clone)]
pub struct ConfigStore {
    path: PathBuf,
}

impl ConfigStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the settings file. A missing file yields `Ok(None)`.
    pub fn try_load(&self) -> Result<Option<Config>> {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        if raw.trim().is_empty() {
            return Ok(Some(Config::default()));
        }
        serde_yaml::from_str(&raw).map(Some).map_err(|source| {
            NoteError::ConfigParse { path: self.path.clone(), source }
        })
    }

    /// Load settings, writing defaults when the file is absent. Unreadable
    /// or malformed files fall back to defaults.
    pub fn load(&self) -> Config {
        match self.try_load() {
            Ok(Some(config)) => config,
            Ok(None) => {
                let config = Config::default();
                if let Err(e) = self.save(&config) {
                    warn!(path = %self.path.display(), error = %e, "could not write default config");
                }
                config
            }
            Err(e) => {
                warn!(error = %e, "using default config");
                Config::default()
            }
        }
    }

    pub fn save(&self, config: &Config) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        let yaml = serde_yaml::to_string(config).map_err(|source| {
            NoteError::ConfigParse { path: self.path.clone(), source }
        })?;
        fs::write(&self.path, yaml)?;
        info!(path = %self.path.display(), "saved config");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_geometry_parse_and_display() {
        let g: Geometry = "320x240".parse().unwrap();
        assert_eq!(g, Geometry { width: 320, height: 240 });
        assert_eq!(g.to_string(), "320x240");
        assert!("320".parse::<Geometry>().is_err());
        assert!("axb".parse::<Geometry>().is_err());
    }

    #[test]
    fn test_missing_file_writes_defaults() {
        let tmp = tempdir().unwrap();
        let store = ConfigStore::new(tmp.path().join("cfg.yml"));
        let config = store.load();
        assert_eq!(config.geometry, Geometry::default());
        assert_eq!(config.font_size, DEFAULT_FONT_SIZE);
        assert!(store.path().is_file());
        assert_eq!(store.try_load().unwrap(), Some(config));
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let tmp = tempdir().unwrap();
        let path = tmp.path().join("cfg.yml");
        fs::write(&path, "geometry: 320x240\nfont_size: 42\ntheme: my-theme\n")
            .unwrap();
        let config = ConfigStore::new(&path).load();
        assert_eq!(config.geometry, Geometry { width: 320, height: 240 });
        assert_eq!(config.font_size, 42);
        assert_eq!(config.theme, "my-theme");
        assert_eq!(config.base_path, DEFAULT_BASE_PATH);
        assert_eq!(config.persistence_version, 1);
    }

    #[test]
    fn test_new_config_is_current_version() {
        assert_eq!(
            Config::default().persistence_version,
            crate::shared::migrate::CURRENT_PERSISTENCE_VERSION
        );
    }

    #[test]
    fn test_malformed_file_falls_back_and_is_kept() {
        let tmp = tempdir().unwrap();
        let path = tmp.path().join("cfg.yml");
        fs::write(&path, "geometry: [unclosed\n").unwrap();
        let store = ConfigStore::new(&path);
        assert!(matches!(
            store.try_load(),
            Err(NoteError::ConfigParse { .. })
        ));
        let config = store.load();
        assert_eq!(config.geometry, Geometry::default());
        assert_eq!(fs::read_to_string(&path).unwrap(), "geometry: [unclosed\n");
    }

    #[test]
    fn test_bad_geometry_is_a_parse_error() {
        let tmp = tempdir().unwrap();
        let path = tmp.path().join("cfg.yml");
        fs::write(&path, "geometry: huge\n").unwrap();
        assert!(ConfigStore::new(&path).try_load().is_err());
    }

    #[test]
    fn test_save_roundtrip() {
        let tmp = tempdir().unwrap();
        let store = ConfigStore::new(tmp.path().join("nested").join("cfg.yml"));
        let mut config = Config::default();
        config.set("geometry", "640x480").unwrap();
        config.set("theme", "dark").unwrap();
        config.set("screenshot_command", "true").unwrap();
        store.save(&config).unwrap();

        let raw = fs::read_to_string(store.path()).unwrap();
        assert!(raw.contains("640x480"));
        assert_eq!(store.load(), config);
    }

    #[test]
    fn test_set_rejects_unknown_and_bad_values() {
        let mut config = Config::default();
        assert!(config.set("colour", "red").is_err());
        assert!(config.set("font_size", "big").is_err());
        assert!(config.set("geometry", "1x").is_err());
    }

    #[test]
    fn test_resolved_base_path_expands_home() {
        let config = Config {
            base_path: "/srv/notes".to_string(),
            ..Config::default()
        };
        assert_eq!(config.resolved_base_path(), PathBuf::from("/srv/notes"));
        let home_based = Config::default().resolved_base_path();
        assert!(!home_based.to_string_lossy().contains("{home}"));
    }
}
