use thiserror::Error;

/// A request that cannot be turned into a command line. Nothing is spawned.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("image path required")]
    MissingImage,

    #[error("offset requires numeric value")]
    OffsetNotNumeric,

    #[error("entry number required")]
    EntryRequired,

    #[error("debug level must be between 0 and 2, got {0}")]
    DebugLevelOutOfRange(u8),

    #[error("unknown command: {0}")]
    UnknownCommand(String),
}

#[derive(Debug, Error)]
pub enum ExdumpError {
    #[error("Invalid request: {0}")]
    Validation(#[from] ValidationError),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Config parse error: {0}")]
    ConfigParse(#[from] toml::de::Error),

    #[error("Config serialization error: {0}")]
    ConfigSerialize(#[from] toml::ser::Error),
}
