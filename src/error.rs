use std::path::PathBuf;

use crate::config::PathSlot;

#[derive(thiserror::Error, Debug)]
/// Errors raised by the configuration store, the manifest scanners and the launchers
pub enum LauncherError {
    #[error("The configuration file {0} does not exist")]
    /// Occurs when the INI file is missing at the expected path
    ///
    /// Startup treats this as fatal, no default file is created.
    ConfigNotFound(PathBuf),

    #[error("No matching path found for slot {0}")]
    /// Occurs when a path update targets a slot the current config does not have
    NoMatchingSlot(PathSlot),

    #[error("No games found in '{0}'")]
    /// Occurs when a configured manifest directory does not exist
    ScanDirectoryMissing(PathBuf),

    #[error("Skipping manifest {path}: {reason}")]
    /// Occurs when a single manifest file cannot be read or parsed
    MalformedManifestEntry { path: PathBuf, reason: String },

    #[error("Failed to launch {title}: {reason}")]
    /// Occurs when neither the game nor its platform launcher could be started
    Launch { title: String, reason: String },

    #[error(transparent)]
    /// Forwards parse errors from `rust-ini`
    ConfigParse(#[from] ini::ParseError),

    #[error(transparent)]
    /// Forwards the errors from `std::io::Error`
    Io(#[from] std::io::Error),

    #[error(transparent)]
    /// Forwards the errors from `serde_json::Error`
    Json(#[from] serde_json::Error),
}

impl From<ini::Error> for LauncherError {
    fn from(value: ini::Error) -> Self {
        match value {
            ini::Error::Io(e) => LauncherError::Io(e),
            ini::Error::Parse(e) => LauncherError::ConfigParse(e),
        }
    }
}

/// A type alias for `Result<T, LauncherError>`
pub type LauncherResult<T> = std::result::Result<T, LauncherError>;
