use std::io;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("artifact path not found: {}", path.display())]
    PathNotFound { path: PathBuf },

    #[error("no regular files found under {}", path.display())]
    EmptyArtifactSet { path: PathBuf },

    #[error("failed to digest {}: {source}", path.display())]
    Digest {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to enumerate artifacts under {}: {source}", path.display())]
    Enumerate {
        path: PathBuf,
        #[source]
        source: walkdir::Error,
    },

    #[error("missing required context field: {0}")]
    MissingContextField(String),

    #[error("definedInMaterial index {index} is out of range for {len} materials")]
    InvalidMaterialIndex { index: usize, len: usize },

    #[error("duplicate subject name: {0}")]
    DuplicateSubject(String),

    #[error("statement must have at least one subject")]
    EmptySubjects,

    #[error("digest set for {0} is empty")]
    EmptyDigestSet(String),

    #[error("serialization error: {0}")]
    Serialization(String),

    #[error("operation cancelled")]
    Cancelled,

    #[error("validation error: {0}")]
    Validation(String),

    #[error("initialization error: {0}")]
    InitializationError(String),

    #[error(transparent)]
    Io(#[from] io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
