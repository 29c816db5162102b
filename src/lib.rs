#![doc(html_root_url = "https://docs.rs/netvol/0.1.0")]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![deny(missing_docs)]
#![deny(rustdoc::missing_crate_level_docs)]

//! netvol: volume plugin core for mounting a remote network filesystem
//! into containers
//!
//! Tracks named logical volumes, maps each one to a host mountpoint
//! backed by an external network filesystem client, and reference-counts
//! attach/detach requests so the client is invoked exactly once per
//! mount lifetime, however many containers share the volume.
//!
//! ## Features
//!
//! - Reference-counted mount/unmount with a single client mount per
//!   credential pair
//! - Deterministic mountpoint derivation from provider host and access
//!   token
//! - Crash-safe registry persistence (atomic snapshot after every
//!   mutation)
//! - Structured client invocation, never a shell string
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use netvol::{ClientExecutor, VolumeDriver};
//! use std::collections::HashMap;
//! use std::path::Path;
//!
//! # fn main() -> anyhow::Result<()> {
//! let driver = VolumeDriver::new(Path::new("/run/docker/plugins"), Box::new(ClientExecutor))?;
//!
//! let opts: HashMap<String, String> = [("host", "provider.example.org"), ("token", "secret")]
//!     .iter()
//!     .map(|(k, v)| (k.to_string(), v.to_string()))
//!     .collect();
//!
//! driver.create("myvolume", &opts)?;
//! let mountpoint = driver.mount("myvolume")?;
//! println!("mounted at {}", mountpoint.display());
//! # Ok(())
//! # }
//! ```
//!
//! ## Lifecycle
//!
//! A volume is `Unmounted` while no container holds a reference and
//! `Mounted` otherwise. The external client runs only on the 0→1 and →0
//! connection transitions; `remove` refuses to delete a volume that is
//! still attached.

pub mod modules;

pub use modules::dispatch::Dispatcher;
pub use modules::driver::VolumeDriver;
pub use modules::executor::{ClientExecutor, MountExecutor};

// Re-export commonly used types
pub use modules::error::DriverError;
pub use modules::volume::VolumeRecord;
