//! Error types for rdial-ctl
//!
//! One enum covers the control core and its collaborators. Only
//! [`Error::TransientIo`] has a local recovery (the single catalog-load
//! retry); everything else propagates to the control loop, which stops.

use thiserror::Error;

/// Main error type for the controller
#[derive(Error, Debug)]
pub enum Error {
    /// Connectivity hiccup talking to a collaborator (connection refused,
    /// dropped, timed out)
    #[error("Transient I/O error during {operation}: {source}")]
    TransientIo {
        operation: String,
        #[source]
        source: std::io::Error,
    },

    /// Playlist reported a missing or non-integer track duration
    #[error("Catalog integrity error in playlist '{playlist}' (track {track}): {reason}")]
    CatalogIntegrity {
        playlist: String,
        track: String,
        reason: String,
    },

    /// Playlist with zero total duration cannot be resumed into
    #[error("Playlist '{0}' has no playable duration")]
    EmptyPlaylist(String),

    /// Construction-time misconfiguration
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Logic defect: a state that valid inputs can never reach
    #[error("Internal invariant violated: {0}")]
    InternalInvariant(String),

    /// Sensor transport failed or closed
    #[error("Sensor error: {0}")]
    Sensor(String),

    /// Playback service rejected a command
    #[error("Command '{command}' rejected: {message}")]
    Command { command: String, message: String },

    /// Playback service sent a reply that does not follow the protocol
    #[error("Protocol error: {0}")]
    Protocol(String),

    /// Bootstrap configuration error from the common crate
    #[error(transparent)]
    Common(#[from] rdial_common::Error),
}

impl Error {
    /// Build a transient I/O error for the named operation
    pub fn transient(operation: impl Into<String>, source: std::io::Error) -> Self {
        Error::TransientIo {
            operation: operation.into(),
            source,
        }
    }

    /// Whether this failure is a connectivity hiccup eligible for retry
    pub fn is_transient(&self) -> bool {
        matches!(self, Error::TransientIo { .. })
    }
}

/// Convenience Result type using rdial-ctl Error
pub type Result<T> = std::result::Result<T, Error>;
