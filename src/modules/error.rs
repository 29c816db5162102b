//! Error types for driver operations.
//!
//! Every fallible operation in the crate returns a [`DriverError`]. The
//! dispatch layer recovers these into plain error-string responses; only
//! [`DriverError::CorruptState`] is allowed to abort the process, and only
//! at startup.

use thiserror::Error;

/// Unified error type for volume driver operations.
#[derive(Debug, Error)]
pub enum DriverError {
    /// The caller supplied a bad, missing, or unknown creation option.
    #[error("{0}")]
    Validation(String),

    /// The named volume does not exist in the registry.
    #[error("volume {0} not found")]
    NotFound(String),

    /// The operation conflicts with the volume's current state, e.g.
    /// removing a volume that is still attached to a container.
    #[error("{0}")]
    Conflict(String),

    /// The external mount client failed to launch or exited non-zero.
    #[error("external client failed: {0}")]
    ExternalTool(String),

    /// A filesystem or state-file I/O failure.
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// The persisted state file exists but cannot be decoded. Fatal at
    /// startup: resuming with partial state could double-mount a volume
    /// or orphan an existing mount.
    #[error("corrupt state file: {0}")]
    CorruptState(String),
}
