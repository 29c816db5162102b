//! Volume lifecycle driver.
//!
//! [`VolumeDriver`] owns the in-memory registry of volumes, the state
//! store that persists it, and the executor that performs the actual
//! mounts. Every record has two logical states, unmounted
//! (`connections == 0`) and mounted (`connections > 0`); the external
//! client is invoked only on the transitions into and out of the mounted
//! state, so any number of containers can share one client mount.
//!
//! Mutating operations hold the write lock for their whole critical
//! section, including the external client invocation and the state save.
//! That serializes mount and unmount across all volumes — a deliberate
//! tradeoff: this is a control-plane path, and holding the lock keeps the
//! registry, the state file, and the external client in step with each
//! other.

use super::command;
use super::constants::{STATE_FILE, VOLUMES_DIR};
use super::error::DriverError;
use super::executor::MountExecutor;
use super::state::StateStore;
use super::volume::VolumeRecord;
use log::{debug, info};
use parking_lot::RwLock;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

/// Name and mountpoint of a tracked volume, as reported by `get` and
/// `list`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VolumeInfo {
    /// Volume name, assigned by the caller at creation.
    pub name: String,
    /// Host directory the volume mounts at.
    pub mountpoint: PathBuf,
}

/// Static driver capability descriptor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Capability {
    /// Scope of the driver; always `"local"`.
    pub scope: &'static str,
}

/// Reference-counted volume lifecycle manager.
pub struct VolumeDriver {
    volumes_root: PathBuf,
    store: StateStore,
    volumes: RwLock<HashMap<String, VolumeRecord>>,
    executor: Box<dyn MountExecutor>,
}

impl VolumeDriver {
    /// Creates a driver rooted at the given plugin directory, restoring
    /// any previously persisted registry.
    ///
    /// Fails with [`DriverError::CorruptState`] if a state file exists but
    /// cannot be decoded; the process must not start in that case.
    pub fn new(root: &Path, executor: Box<dyn MountExecutor>) -> Result<Self, DriverError> {
        debug!("new driver rooted at {}", root.display());

        let store = StateStore::new(root.join(STATE_FILE));
        let volumes = store.load()?;
        info!("restored {} volume(s) from state", volumes.len());

        Ok(Self {
            volumes_root: root.join(VOLUMES_DIR),
            store,
            volumes: RwLock::new(volumes),
            executor,
        })
    }

    /// Registers a new volume.
    ///
    /// Validates the option map, derives the mountpoint from the
    /// credentials, and persists the updated registry. No mount happens
    /// at creation time.
    pub fn create(
        &self,
        name: &str,
        options: &HashMap<String, String>,
    ) -> Result<(), DriverError> {
        debug!("create: {} {:?}", name, options);

        let mut volumes = self.volumes.write();
        if volumes.contains_key(name) {
            return Err(DriverError::Validation(format!(
                "volume {} already exists",
                name
            )));
        }

        let record = VolumeRecord::from_options(options, &self.volumes_root)?;
        volumes.insert(name.to_string(), record);
        self.store.save(&volumes)
    }

    /// Attaches a caller to a volume and returns its mountpoint.
    ///
    /// On the transition from zero connections the mountpoint directory
    /// is created if absent and the external client is invoked; if the
    /// client fails the reference count is left untouched. Subsequent
    /// mounts only increment the count.
    pub fn mount(&self, name: &str) -> Result<PathBuf, DriverError> {
        debug!("mount: {}", name);

        let mut volumes = self.volumes.write();
        let record = volumes
            .get_mut(name)
            .ok_or_else(|| DriverError::NotFound(name.to_string()))?;

        if record.connections == 0 {
            match fs::symlink_metadata(&record.mountpoint) {
                Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                    fs::create_dir_all(&record.mountpoint)?;
                }
                Err(err) => return Err(err.into()),
                Ok(meta) if !meta.is_dir() => {
                    return Err(DriverError::Conflict(format!(
                        "{} already exists and is not a directory",
                        record.mountpoint.display()
                    )));
                }
                Ok(_) => {}
            }

            self.executor.mount(&command::mount_args(record))?;
        }

        record.connections += 1;
        let mountpoint = record.mountpoint.clone();
        self.store.save(&volumes)?;
        Ok(mountpoint)
    }

    /// Detaches a caller from a volume.
    ///
    /// The reference count is decremented with a floor of zero and
    /// persisted before the external unmount runs, so a crash mid-unmount
    /// cannot resurrect the released reference. When the count reaches
    /// (or was already at) zero the external client is asked to unmount;
    /// a client failure is reported but the decrement stands, meaning a
    /// later mount treats the volume as fresh. If the unmount genuinely
    /// failed this can leave a stale client mount behind.
    pub fn unmount(&self, name: &str) -> Result<(), DriverError> {
        debug!("unmount: {}", name);

        let mut volumes = self.volumes.write();
        let (mountpoint, idle) = {
            let record = volumes
                .get_mut(name)
                .ok_or_else(|| DriverError::NotFound(name.to_string()))?;
            record.connections = record.connections.saturating_sub(1);
            (record.mountpoint.clone(), record.connections == 0)
        };

        self.store.save(&volumes)?;

        if idle {
            self.executor.unmount(&mountpoint)?;
        }
        Ok(())
    }

    /// Deletes a volume and its mountpoint directory.
    ///
    /// Refused while any container is still attached. An already-absent
    /// mountpoint directory is not an error.
    pub fn remove(&self, name: &str) -> Result<(), DriverError> {
        debug!("remove: {}", name);

        let mut volumes = self.volumes.write();
        let record = volumes
            .get(name)
            .ok_or_else(|| DriverError::NotFound(name.to_string()))?;

        if record.connections != 0 {
            return Err(DriverError::Conflict(format!(
                "volume {} is currently used by a container",
                name
            )));
        }

        match fs::remove_dir_all(&record.mountpoint) {
            Err(err) if err.kind() != std::io::ErrorKind::NotFound => return Err(err.into()),
            _ => {}
        }

        volumes.remove(name);
        self.store.save(&volumes)
    }

    /// Returns the mountpoint of a volume.
    pub fn path(&self, name: &str) -> Result<PathBuf, DriverError> {
        debug!("path: {}", name);

        let volumes = self.volumes.read();
        volumes
            .get(name)
            .map(|v| v.mountpoint.clone())
            .ok_or_else(|| DriverError::NotFound(name.to_string()))
    }

    /// Returns the descriptor of a volume.
    pub fn get(&self, name: &str) -> Result<VolumeInfo, DriverError> {
        debug!("get: {}", name);

        let volumes = self.volumes.read();
        volumes
            .get(name)
            .map(|v| VolumeInfo {
                name: name.to_string(),
                mountpoint: v.mountpoint.clone(),
            })
            .ok_or_else(|| DriverError::NotFound(name.to_string()))
    }

    /// Returns descriptors for every tracked volume.
    pub fn list(&self) -> Vec<VolumeInfo> {
        debug!("list");

        let volumes = self.volumes.read();
        volumes
            .iter()
            .map(|(name, v)| VolumeInfo {
                name: name.clone(),
                mountpoint: v.mountpoint.clone(),
            })
            .collect()
    }

    /// Returns the static capability descriptor.
    pub fn capabilities(&self) -> Capability {
        debug!("capabilities");
        Capability { scope: "local" }
    }

    #[cfg(test)]
    fn connections(&self, name: &str) -> u64 {
        self.volumes.read()[name].connections
    }
}
