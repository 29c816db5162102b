//! Plugin-protocol boundary.
//!
//! Request and response types mirror the host plugin protocol's JSON
//! shapes (capitalized field names, errors carried as a plain `Err`
//! string). The [`Dispatcher`] wraps a [`VolumeDriver`] and recovers every
//! [`DriverError`] into a response value; no error ever crosses this
//! boundary as a panic. Socket framing of the protocol is out of scope
//! and belongs to the embedding process.

use super::driver::VolumeDriver;
use super::error::DriverError;
use log::error;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Request carrying a volume name and creation options.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateRequest {
    /// Volume name.
    #[serde(rename = "Name")]
    pub name: String,
    /// String-keyed creation options.
    #[serde(rename = "Opts", default)]
    pub opts: HashMap<String, String>,
}

/// Request carrying only a volume name.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VolumeRequest {
    /// Volume name.
    #[serde(rename = "Name")]
    pub name: String,
}

/// A volume descriptor as exposed over the protocol.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Volume {
    /// Volume name.
    #[serde(rename = "Name")]
    pub name: String,
    /// Host mountpoint path.
    #[serde(rename = "Mountpoint")]
    pub mountpoint: String,
}

/// Driver capability descriptor as exposed over the protocol.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Capabilities {
    /// Driver scope.
    #[serde(rename = "Scope")]
    pub scope: String,
}

/// Response envelope shared by every operation.
///
/// Exactly the payload fields relevant to the operation are populated; a
/// failed operation populates only `err`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Response {
    /// Human-readable error message; empty on success.
    #[serde(rename = "Err", default, skip_serializing_if = "String::is_empty")]
    pub err: String,
    /// Mountpoint payload of `mount` and `path`.
    #[serde(rename = "Mountpoint", skip_serializing_if = "Option::is_none")]
    pub mountpoint: Option<String>,
    /// Volume payload of `get`.
    #[serde(rename = "Volume", skip_serializing_if = "Option::is_none")]
    pub volume: Option<Volume>,
    /// Volume list payload of `list`.
    #[serde(rename = "Volumes", skip_serializing_if = "Option::is_none")]
    pub volumes: Option<Vec<Volume>>,
    /// Capability payload of `capabilities`.
    #[serde(rename = "Capabilities", skip_serializing_if = "Option::is_none")]
    pub capabilities: Option<Capabilities>,
}

impl Response {
    fn failure(err: &DriverError) -> Self {
        error!("{}", err);
        Response {
            err: err.to_string(),
            ..Response::default()
        }
    }
}

/// Routes protocol requests to a [`VolumeDriver`] and converts results
/// into protocol responses.
pub struct Dispatcher {
    driver: VolumeDriver,
}

impl Dispatcher {
    /// Wraps a driver.
    pub fn new(driver: VolumeDriver) -> Self {
        Self { driver }
    }

    /// Handles a create request.
    pub fn create(&self, req: &CreateRequest) -> Response {
        match self.driver.create(&req.name, &req.opts) {
            Ok(()) => Response::default(),
            Err(err) => Response::failure(&err),
        }
    }

    /// Handles a remove request.
    pub fn remove(&self, req: &VolumeRequest) -> Response {
        match self.driver.remove(&req.name) {
            Ok(()) => Response::default(),
            Err(err) => Response::failure(&err),
        }
    }

    /// Handles a mount request.
    pub fn mount(&self, req: &VolumeRequest) -> Response {
        match self.driver.mount(&req.name) {
            Ok(mountpoint) => Response {
                mountpoint: Some(mountpoint.to_string_lossy().into_owned()),
                ..Response::default()
            },
            Err(err) => Response::failure(&err),
        }
    }

    /// Handles an unmount request.
    pub fn unmount(&self, req: &VolumeRequest) -> Response {
        match self.driver.unmount(&req.name) {
            Ok(()) => Response::default(),
            Err(err) => Response::failure(&err),
        }
    }

    /// Handles a path request.
    pub fn path(&self, req: &VolumeRequest) -> Response {
        match self.driver.path(&req.name) {
            Ok(mountpoint) => Response {
                mountpoint: Some(mountpoint.to_string_lossy().into_owned()),
                ..Response::default()
            },
            Err(err) => Response::failure(&err),
        }
    }

    /// Handles a get request.
    pub fn get(&self, req: &VolumeRequest) -> Response {
        match self.driver.get(&req.name) {
            Ok(info) => Response {
                volume: Some(Volume {
                    name: info.name,
                    mountpoint: info.mountpoint.to_string_lossy().into_owned(),
                }),
                ..Response::default()
            },
            Err(err) => Response::failure(&err),
        }
    }

    /// Handles a list request.
    pub fn list(&self) -> Response {
        let volumes = self
            .driver
            .list()
            .into_iter()
            .map(|info| Volume {
                name: info.name,
                mountpoint: info.mountpoint.to_string_lossy().into_owned(),
            })
            .collect();
        Response {
            volumes: Some(volumes),
            ..Response::default()
        }
    }

    /// Handles a capabilities request.
    pub fn capabilities(&self) -> Response {
        let caps = self.driver.capabilities();
        Response {
            capabilities: Some(Capabilities {
                scope: caps.scope.to_string(),
            }),
            ..Response::default()
        }
    }
}
