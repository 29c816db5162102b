//! External mount client invocation.
//!
//! The driver never shells out: argument lists built by
//! [`crate::modules::command`] are handed to [`std::process::Command`]
//! directly. The contract with the client binary is exit status 0 for
//! success and anything else for failure; stderr is captured and folded
//! into the error message, which is all the structure the client offers.

use super::command;
use super::constants::CLIENT_BINARY;
use super::error::DriverError;
use log::debug;
use std::ffi::OsString;
use std::path::Path;
use std::process::Command;

/// Capability interface for mounting and unmounting volumes through the
/// external client.
///
/// The production implementation is [`ClientExecutor`]; tests substitute
/// recording doubles to observe exactly when the driver triggers external
/// actions.
pub trait MountExecutor: Send + Sync {
    /// Runs the client with the given mount argument list.
    fn mount(&self, args: &[OsString]) -> Result<(), DriverError>;

    /// Runs the client to unmount the given mountpoint.
    fn unmount(&self, mountpoint: &Path) -> Result<(), DriverError>;
}

/// Spawns the external client binary as a child process and blocks until
/// it exits.
pub struct ClientExecutor;

impl ClientExecutor {
    fn run(&self, args: &[OsString]) -> Result<(), DriverError> {
        debug!("{} {:?}", CLIENT_BINARY, args);

        let output = Command::new(CLIENT_BINARY)
            .args(args)
            .output()
            .map_err(|err| {
                DriverError::ExternalTool(format!("failed to launch {}: {}", CLIENT_BINARY, err))
            })?;

        if output.status.success() {
            Ok(())
        } else {
            let stderr = String::from_utf8_lossy(&output.stderr);
            Err(DriverError::ExternalTool(format!(
                "{} exited with {}: {}",
                CLIENT_BINARY,
                output.status,
                stderr.trim()
            )))
        }
    }
}

impl MountExecutor for ClientExecutor {
    fn mount(&self, args: &[OsString]) -> Result<(), DriverError> {
        self.run(args)
    }

    fn unmount(&self, mountpoint: &Path) -> Result<(), DriverError> {
        self.run(&command::unmount_args(mountpoint))
    }
}
