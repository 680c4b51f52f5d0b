use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse config: {0}")]
    ConfigParse(#[from] toml::de::Error),

    #[error("Failed to serialize config: {0}")]
    ConfigSerialize(#[from] toml::ser::Error),

    #[error("Config directory not found")]
    NoConfigDir,

    #[error("Invalid library root: {0}")]
    InvalidRoot(PathBuf),

    #[error("Failed to load catalog: {0}")]
    CatalogLoad(String),

    #[error("Failed to persist catalog: {0}")]
    CatalogPersist(String),

    #[error("Failed to load watch state: {0}")]
    WatchLoad(String),

    #[error("Failed to persist watch state: {0}")]
    WatchPersist(String),

    #[error("Player not found: {0}")]
    PlayerNotFound(String),

    #[error("Failed to launch player: {0}")]
    PlayerLaunch(String),

    #[error("Player control not supported: {0}")]
    ControlUnsupported(&'static str),
}

pub type Result<T> = std::result::Result<T, Error>;
