use std::path::PathBuf;

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub library: LibraryConfig,
    #[serde(default)]
    pub player: PlayerConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LibraryConfig {
    pub root: PathBuf,
    /// Direct-file count at which a folder counts as a series (inclusive).
    #[serde(default = "default_series_file_threshold")]
    pub series_file_threshold: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlayerConfig {
    #[serde(default = "default_player_command")]
    pub command: String,
    #[serde(default = "default_player_args")]
    pub args: Vec<String>,
}

fn default_series_file_threshold() -> usize {
    10
}

fn default_player_command() -> String {
    "mpv".to_string()
}

fn default_player_args() -> Vec<String> {
    vec!["--fullscreen".to_string()]
}

impl Default for Config {
    fn default() -> Self {
        Self {
            library: LibraryConfig::default(),
            player: PlayerConfig::default(),
        }
    }
}

impl Default for LibraryConfig {
    fn default() -> Self {
        Self {
            root: PathBuf::from("~/Videos"),
            series_file_threshold: default_series_file_threshold(),
        }
    }
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            command: default_player_command(),
            args: default_player_args(),
        }
    }
}

fn project_dirs() -> Result<ProjectDirs> {
    ProjectDirs::from("", "", "shiori").ok_or(Error::NoConfigDir)
}

pub fn config_dir() -> Result<PathBuf> {
    Ok(project_dirs()?.config_dir().to_path_buf())
}

pub fn data_dir() -> Result<PathBuf> {
    Ok(project_dirs()?.data_dir().to_path_buf())
}

pub fn config_path() -> Result<PathBuf> {
    Ok(config_dir()?.join("config.toml"))
}

pub fn watch_path() -> Result<PathBuf> {
    Ok(data_dir()?.join("watch.json"))
}

impl Config {
    pub fn load() -> Result<Self> {
        let path = config_path()?;

        if !path.exists() {
            let config = Config::default();
            config.save()?;
            return Ok(config);
        }

        let content = std::fs::read_to_string(&path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    pub fn save(&self) -> Result<()> {
        let path = config_path()?;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(self)?;
        std::fs::write(&path, content)?;
        Ok(())
    }

    /// Expand ~ to the home directory in the library root
    pub fn expanded_root(&self) -> PathBuf {
        let path_str = self.library.root.to_string_lossy();
        // Support both ~/ and ~\ for generic home directory expansion
        if path_str.starts_with("~/") || path_str.starts_with("~\\") || path_str == "~" {
            if let Some(home) = dirs_home() {
                if path_str == "~" {
                    return home;
                }
                return home.join(&path_str[2..]);
            }
        }
        self.library.root.clone()
    }
}

fn dirs_home() -> Option<PathBuf> {
    directories::BaseDirs::new().map(|d| d.home_dir().to_path_buf())
}
