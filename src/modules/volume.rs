//! Volume data model and creation-option parsing.
//!
//! A [`VolumeRecord`] describes one logical volume: the credentials used to
//! reach the remote filesystem provider, optional client tuning parameters,
//! the derived mountpoint, and the number of containers currently attached.
//! Records are keyed by volume name in the driver's registry and serialized
//! verbatim into the state file.

use super::constants::DEFAULT_PROVIDER_PORT;
use super::error::DriverError;
use super::mountpoint;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};

/// Client tuning parameters that may be set at volume creation.
///
/// Values are opaque strings passed through to the external client
/// unvalidated; an absent key means the client's built-in default. The
/// declaration order is the canonical order in which set parameters are
/// emitted on the client command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TuningParam {
    /// Number of parallel buffer scheduler threads.
    BufferSchedulerThreadCount,
    /// Number of parallel communicator threads.
    CommunicatorThreadCount,
    /// Number of parallel scheduler threads.
    SchedulerThreadCount,
    /// Number of parallel storage helper threads.
    StorageHelperThreadCount,
    /// Minimum size in bytes of the in-memory cache for input data blocks.
    ReadBufferMinSize,
    /// Maximum size in bytes of the in-memory cache for input data blocks.
    ReadBufferMaxSize,
    /// Read-ahead period in seconds for the input cache.
    ReadBufferPrefetchDuration,
    /// Minimum size in bytes of the in-memory cache for output data blocks.
    WriteBufferMinSize,
    /// Maximum size in bytes of the in-memory cache for output data blocks.
    WriteBufferMaxSize,
    /// Idle period in seconds before the output cache is flushed.
    WriteBufferFlushDelay,
}

impl TuningParam {
    /// All tuning parameters in canonical command-line order.
    pub const ALL: [TuningParam; 10] = [
        TuningParam::BufferSchedulerThreadCount,
        TuningParam::CommunicatorThreadCount,
        TuningParam::SchedulerThreadCount,
        TuningParam::StorageHelperThreadCount,
        TuningParam::ReadBufferMinSize,
        TuningParam::ReadBufferMaxSize,
        TuningParam::ReadBufferPrefetchDuration,
        TuningParam::WriteBufferMinSize,
        TuningParam::WriteBufferMaxSize,
        TuningParam::WriteBufferFlushDelay,
    ];

    /// The creation-option key for this parameter.
    pub fn key(&self) -> &'static str {
        match self {
            TuningParam::BufferSchedulerThreadCount => "buffer-scheduler-thread-count",
            TuningParam::CommunicatorThreadCount => "communicator-thread-count",
            TuningParam::SchedulerThreadCount => "scheduler-thread-count",
            TuningParam::StorageHelperThreadCount => "storage-helper-thread-count",
            TuningParam::ReadBufferMinSize => "read-buffer-min-size",
            TuningParam::ReadBufferMaxSize => "read-buffer-max-size",
            TuningParam::ReadBufferPrefetchDuration => "read-buffer-prefetch-duration",
            TuningParam::WriteBufferMinSize => "write-buffer-min-size",
            TuningParam::WriteBufferMaxSize => "write-buffer-max-size",
            TuningParam::WriteBufferFlushDelay => "write-buffer-flush-delay",
        }
    }

    /// The client command-line flag for this parameter.
    pub fn flag(&self) -> String {
        format!("--{}", self.key())
    }

    /// Looks up a tuning parameter by its creation-option key.
    pub fn from_key(key: &str) -> Option<TuningParam> {
        TuningParam::ALL.iter().copied().find(|p| p.key() == key)
    }
}

/// One logical volume tracked by the driver.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VolumeRecord {
    /// Hostname or IP address of the remote filesystem provider.
    pub provider_host: String,
    /// Port of the remote filesystem provider.
    pub provider_port: String,
    /// Access token used to authenticate against the provider.
    pub access_token: String,
    /// Skip provider certificate validation.
    pub insecure: bool,
    /// Accumulated free-form mount options, passed to the client as a
    /// single comma-joined value.
    pub mount_options: Vec<String>,
    /// Explicitly set client tuning parameters.
    pub tuning: BTreeMap<TuningParam, String>,
    /// Directory on the host where the client mounts the filesystem.
    /// Derived once at creation; never recomputed.
    pub mountpoint: PathBuf,
    /// Number of containers currently attached to this volume.
    pub connections: u64,
}

impl VolumeRecord {
    /// Builds a record from caller-supplied creation options.
    ///
    /// Recognized keys: `host`, `token`, `port`, `insecure`, `opt`, and
    /// every [`TuningParam`] key. `opt` values are split on commas and
    /// accumulated. `host` and `token` are required; everything else has
    /// a default. Any other key fails with a validation error naming it.
    ///
    /// The mountpoint is derived from host and token and placed under
    /// `volumes_root`.
    pub fn from_options(
        options: &HashMap<String, String>,
        volumes_root: &Path,
    ) -> Result<VolumeRecord, DriverError> {
        let mut record = VolumeRecord {
            provider_host: String::new(),
            provider_port: DEFAULT_PROVIDER_PORT.to_string(),
            access_token: String::new(),
            insecure: false,
            mount_options: Vec::new(),
            tuning: BTreeMap::new(),
            mountpoint: PathBuf::new(),
            connections: 0,
        };

        for (key, val) in options {
            match key.as_str() {
                "host" => record.provider_host = val.clone(),
                "token" => record.access_token = val.clone(),
                "port" => record.provider_port = val.clone(),
                "insecure" => record.insecure = val.eq_ignore_ascii_case("true"),
                "opt" => record
                    .mount_options
                    .extend(val.split(',').filter(|o| !o.is_empty()).map(String::from)),
                other => match TuningParam::from_key(other) {
                    Some(param) => {
                        record.tuning.insert(param, val.clone());
                    }
                    None => {
                        return Err(DriverError::Validation(format!(
                            "unknown option {:?}",
                            key
                        )))
                    }
                },
            }
        }

        if record.provider_host.is_empty() {
            return Err(DriverError::Validation(
                "provider host must be specified using the 'host' option".to_string(),
            ));
        }
        if record.access_token.is_empty() {
            return Err(DriverError::Validation(
                "access token must be specified using the 'token' option".to_string(),
            ));
        }

        record.mountpoint = volumes_root.join(mountpoint::derive(
            &record.provider_host,
            &record.access_token,
        ));

        Ok(record)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn options(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_minimal_options() -> Result<(), DriverError> {
        let opts = options(&[("host", "example.org"), ("token", "t0ken")]);
        let record = VolumeRecord::from_options(&opts, Path::new("/tmp/volumes"))?;

        assert_eq!(record.provider_host, "example.org");
        assert_eq!(record.access_token, "t0ken");
        assert_eq!(record.provider_port, DEFAULT_PROVIDER_PORT);
        assert!(!record.insecure);
        assert!(record.mount_options.is_empty());
        assert!(record.tuning.is_empty());
        assert_eq!(record.connections, 0);
        assert!(record.mountpoint.starts_with("/tmp/volumes"));
        Ok(())
    }

    #[test]
    fn test_mountpoint_matches_derivation() -> Result<(), DriverError> {
        let opts = options(&[("host", "example.org"), ("token", "t0ken")]);
        let record = VolumeRecord::from_options(&opts, Path::new("/tmp/volumes"))?;
        assert_eq!(
            record.mountpoint,
            Path::new("/tmp/volumes").join(mountpoint::derive("example.org", "t0ken"))
        );
        Ok(())
    }

    #[test]
    fn test_missing_host() {
        let opts = options(&[("token", "t0ken")]);
        let err = VolumeRecord::from_options(&opts, Path::new("/tmp")).unwrap_err();
        assert!(err.to_string().contains("'host'"), "got: {}", err);
    }

    #[test]
    fn test_missing_token() {
        let opts = options(&[("host", "example.org")]);
        let err = VolumeRecord::from_options(&opts, Path::new("/tmp")).unwrap_err();
        assert!(err.to_string().contains("'token'"), "got: {}", err);
    }

    #[test]
    fn test_unknown_option_names_the_key() {
        let opts = options(&[("host", "h"), ("token", "t"), ("foo", "bar")]);
        let err = VolumeRecord::from_options(&opts, Path::new("/tmp")).unwrap_err();
        assert!(err.to_string().contains("\"foo\""), "got: {}", err);
    }

    #[test]
    fn test_opt_values_accumulate() -> Result<(), DriverError> {
        let opts = options(&[("host", "h"), ("token", "t"), ("opt", "ro,noatime")]);
        let record = VolumeRecord::from_options(&opts, Path::new("/tmp"))?;
        assert_eq!(record.mount_options, vec!["ro", "noatime"]);
        Ok(())
    }

    #[test]
    fn test_insecure_is_case_insensitive() -> Result<(), DriverError> {
        let opts = options(&[("host", "h"), ("token", "t"), ("insecure", "TRUE")]);
        let record = VolumeRecord::from_options(&opts, Path::new("/tmp"))?;
        assert!(record.insecure);

        let opts = options(&[("host", "h"), ("token", "t"), ("insecure", "yes")]);
        let record = VolumeRecord::from_options(&opts, Path::new("/tmp"))?;
        assert!(!record.insecure);
        Ok(())
    }

    #[test]
    fn test_tuning_params_recognized() -> Result<(), DriverError> {
        let opts = options(&[
            ("host", "h"),
            ("token", "t"),
            ("read-buffer-max-size", "1048576"),
            ("scheduler-thread-count", "4"),
        ]);
        let record = VolumeRecord::from_options(&opts, Path::new("/tmp"))?;
        assert_eq!(
            record.tuning.get(&TuningParam::ReadBufferMaxSize),
            Some(&"1048576".to_string())
        );
        assert_eq!(
            record.tuning.get(&TuningParam::SchedulerThreadCount),
            Some(&"4".to_string())
        );
        Ok(())
    }

    #[test]
    fn test_tuning_key_roundtrip() {
        for param in TuningParam::ALL {
            assert_eq!(TuningParam::from_key(param.key()), Some(param));
        }
        assert_eq!(TuningParam::from_key("not-a-param"), None);
    }

    #[test]
    fn test_record_serde_roundtrip() -> anyhow::Result<()> {
        let opts = options(&[
            ("host", "example.org"),
            ("token", "t0ken"),
            ("insecure", "true"),
            ("opt", "ro"),
            ("write-buffer-flush-delay", "5"),
        ]);
        let record = VolumeRecord::from_options(&opts, Path::new("/tmp/volumes"))?;
        let json = serde_json::to_string(&record)?;
        let back: VolumeRecord = serde_json::from_str(&json)?;
        assert_eq!(record, back);
        Ok(())
    }
}
