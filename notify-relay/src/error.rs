use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum RelayError {
    #[error("Failed to read hook payload from stdin: {0}")]
    Input(#[source] std::io::Error),

    #[error("Invalid hook payload: {0}")]
    Parse(String),

    #[error("Cannot write notification log {}: {source}", path.display())]
    Resource {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Desktop notification failed: {0}")]
    Desktop(String),

    #[error("Speech synthesis failed: {0}")]
    Synthesis(String),

    #[error("Audio playback failed: {0}")]
    Playback(String),
}

impl RelayError {
    /// Whether this error must abort the relay.
    ///
    /// Only parse/input and log failures are fatal; optional announcers that
    /// fail after passing their capability check are downgraded to warnings.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            Self::Input(_) | Self::Parse(_) | Self::Resource { .. }
        )
    }
}

pub type Result<T> = std::result::Result<T, RelayError>;
