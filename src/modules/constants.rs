//! Plugin constants and default values.

/// Name of the external client binary used to mount and unmount volumes.
pub const CLIENT_BINARY: &str = "nfsclient";

/// Default port of the remote filesystem provider.
pub const DEFAULT_PROVIDER_PORT: &str = "5555";

/// File name of the persisted registry snapshot, relative to the plugin root.
pub const STATE_FILE: &str = "netvol-state.json";

/// Directory under the plugin root where mountpoints are created.
pub const VOLUMES_DIR: &str = "volumes";
