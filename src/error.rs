use std::path::PathBuf;
use thiserror::Error;

/// Errors that abort a harvest run
#[derive(Debug, Error)]
pub enum HarvestError {
    /// The catalog endpoint failed or returned an unexpected shape
    #[error("catalog fetch failed: {0}")]
    Catalog(String),

    /// A benchmark listing payload was missing a required field
    #[error("malformed document listing: {0}")]
    Documents(String),

    /// WebDriver connection, session or navigation failure
    #[error("browser session failed: {0}")]
    Browser(String),

    /// A PDF download failed
    #[error("download of {url} failed: {reason}")]
    Download { url: String, reason: String },

    /// Filesystem failure on a specific path
    #[error("{}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Invalid configuration
    #[error("invalid configuration: {0}")]
    Config(String),
}

impl HarvestError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn download(url: &str, reason: impl ToString) -> Self {
        Self::Download {
            url: url.to_string(),
            reason: reason.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, HarvestError>;
