use std::path::PathBuf;
use thiserror::Error;

/// Central error type for the launcher backend.
/// Every fallible module returns `Result<T, LauncherError>`.
#[derive(Debug, Error)]
pub enum LauncherError {
    // ── IO ──────────────────────────────────────────────
    #[error("IO error at {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    // ── Network ─────────────────────────────────────────
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    // ── Integrity ───────────────────────────────────────
    #[error("SHA-1 mismatch for {path:?}: expected {expected}, got {actual}")]
    Sha1Mismatch {
        path: PathBuf,
        expected: String,
        actual: String,
    },

    // ── JSON ────────────────────────────────────────────
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    // ── Archive ─────────────────────────────────────────
    #[error("Zip extraction error: {0}")]
    Zip(#[from] zip::result::ZipError),

    // ── Versions ────────────────────────────────────────
    #[error("Unsupported game version: {0}")]
    UnsupportedVersion(String),

    #[error("Version {version} is not installed (missing {path:?})")]
    VersionNotInstalled { version: String, path: PathBuf },

    #[error("Version {version} is incomplete: {missing} file(s) missing, first: {first:?}")]
    MissingFiles {
        version: String,
        missing: usize,
        first: PathBuf,
    },

    // ── Java ────────────────────────────────────────────
    #[error("Java runtime unavailable: {0}")]
    RuntimeUnavailable(String),

    // ── Auth ────────────────────────────────────────────
    #[error("Cannot start authentication: {0}")]
    AuthStart(String),

    #[error("Authentication failed: {0}")]
    AuthFailed(String),

    // ── Terminal ────────────────────────────────────────
    #[error("Terminal input failed: {0}")]
    Prompt(#[from] dialoguer::Error),

    #[error("Interrupted")]
    Interrupted,

    // ── Generic ─────────────────────────────────────────
    #[error("{0}")]
    Other(String),
}

/// Convenience alias used throughout the crate.
pub type LauncherResult<T> = Result<T, LauncherError>;

impl From<std::io::Error> for LauncherError {
    fn from(source: std::io::Error) -> Self {
        LauncherError::Io {
            path: PathBuf::new(),
            source,
        }
    }
}

impl LauncherError {
    /// Attach a path to an IO error, the way every filesystem call in the crate reports it.
    pub fn io(path: impl Into<PathBuf>) -> impl FnOnce(std::io::Error) -> Self {
        let path = path.into();
        move |source| LauncherError::Io { path, source }
    }

    /// True when the user pressed Ctrl-C, inside a prompt or elsewhere.
    pub fn is_interrupt(&self) -> bool {
        match self {
            LauncherError::Interrupted => true,
            LauncherError::Prompt(dialoguer::Error::IO(err)) => {
                err.kind() == std::io::ErrorKind::Interrupted
            }
            _ => false,
        }
    }
}
