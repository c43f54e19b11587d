pub mod commands;
pub mod handlers;
use crate::error::Error;

pub use commands::{GenerateCommands, HashAlgorithmChoice};
pub use handlers::handle_generate_command;

pub const CLI_VERSION: &str = env!("CARGO_PKG_VERSION");
pub const CLI_NAME: &str = "slsa-provenance";

pub fn format_error(error: &Error) -> String {
    match error {
        Error::PathNotFound { path } => format!("Artifact path not found: {}", path.display()),
        Error::EmptyArtifactSet { path } => {
            format!("No artifacts found: {} contains no regular files", path.display())
        }
        Error::Digest { path, source } => {
            format!("Digest error: could not read {}: {source}", path.display())
        }
        Error::Enumerate { path, source } => {
            format!("Enumeration error: {}: {source}", path.display())
        }
        Error::MissingContextField(field) => {
            format!("Context error: required field '{field}' is missing or empty")
        }
        Error::InvalidMaterialIndex { index, len } => format!(
            "Provenance error: definedInMaterial {index} does not index one of {len} materials"
        ),
        Error::DuplicateSubject(name) => format!("Provenance error: duplicate subject '{name}'"),
        Error::EmptySubjects => "Provenance error: no subjects".to_string(),
        Error::EmptyDigestSet(name) => format!("Provenance error: subject '{name}' has no digest"),
        Error::Serialization(msg) => format!("Serialization error: {msg}"),
        Error::Cancelled => "Cancelled".to_string(),
        Error::Validation(msg) => format!("Validation error: {msg}"),
        Error::InitializationError(msg) => format!("Initialization error: {msg}"),
        Error::Io(err) => format!("IO error: {err}"),
        Error::Json(err) => format!("JSON error: {err}"),
    }
}

// Shared functionality for progress indication
pub mod progress {
    use indicatif::{ProgressBar, ProgressStyle};

    pub fn create_progress_bar(len: u64) -> ProgressBar {
        let pb = ProgressBar::new(len);
        if let Ok(style) = ProgressStyle::default_bar()
            .template("[{elapsed_precise}] {bar:40.cyan/blue} {pos:>7}/{len:7} {msg}")
        {
            pb.set_style(style.progress_chars("=>-"));
        }
        pb
    }
}
