//! Error types for project streams.

use stch_media::MediaError;
use stch_object::ObjectError;
use stch_store::StoreError;
use stch_types::TypeError;
use thiserror::Error;

/// Errors from reading, writing and building projects.
#[derive(Debug, Error)]
pub enum ProjectError {
    /// The stream is shorter than a dialect header.
    #[error("invalid project header: {}", hex::encode(.0))]
    InvalidHeader(Vec<u8>),

    /// The header names neither supported dialect.
    #[error("unknown project dialect header {0:?}")]
    UnknownDialect(String),

    /// The metadata store's root is not a dictionary.
    #[error("project info root is not a dictionary")]
    InfoNotDictionary,

    /// A stage operation was given something other than a stage record.
    #[error("stage root is not a stage record")]
    NotAStage,

    #[error("store error: {0}")]
    Store(#[from] StoreError),

    #[error("object error: {0}")]
    Object(#[from] ObjectError),

    #[error("media error: {0}")]
    Media(#[from] MediaError),

    #[error("wire error: {0}")]
    Wire(#[from] TypeError),

    /// The config file is not valid TOML for [`crate::ProjectConfig`].
    #[error("invalid config: {0}")]
    Config(#[from] toml::de::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type ProjectResult<T> = Result<T, ProjectError>;
