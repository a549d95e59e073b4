use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("config not found: {0}")]
    ConfigNotFound(String),

    #[error("invalid config: {0}")]
    ConfigInvalid(String),

    #[error("unknown secret: {0}")]
    UnknownSecret(String),

    #[error("unknown repository: {0}")]
    UnknownRepo(String),

    #[error("keychain unavailable: {0}")]
    StoreUnavailable(String),

    #[error("gh CLI not found on PATH")]
    GhNotFound,

    #[error("gh command failed: {0}")]
    GhFailed(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("toml parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("prompt error: {0}")]
    Prompt(#[from] dialoguer::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
