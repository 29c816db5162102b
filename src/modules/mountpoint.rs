//! Mountpoint derivation.
//!
//! A volume's mountpoint directory name is a pure function of its
//! connection credentials, not of the volume name. Two volumes created
//! with the same provider host and access token therefore share one
//! mountpoint; the driver relies on this to deduplicate client mounts
//! of the same remote filesystem.

use sha2::{Digest, Sha256};

/// Derives a stable, filesystem-safe directory name from connection
/// credentials.
///
/// Deterministic: the same `(host, token)` pair always yields the same
/// digest, regardless of the volume name it was created under.
pub fn derive(host: &str, token: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(host.as_bytes());
    hasher.update(token.as_bytes());
    hex::encode(hasher.finalize())
}
