//! Construction of external client invocations.
//!
//! Arguments are built as a structured list and handed to the process
//! spawner directly; no shell is involved, so option values never go
//! through word splitting or quoting.
//!
//! Flag ordering is fixed: host and token first, then port (only when it
//! differs from the default), the insecure flag (only when set), the
//! comma-joined mount options (only when non-empty), each tuning parameter
//! that was explicitly set in canonical order, and the mountpoint path
//! last. Unset optional fields omit their flag entirely.

use super::constants::DEFAULT_PROVIDER_PORT;
use super::volume::{TuningParam, VolumeRecord};
use std::ffi::OsString;
use std::path::Path;

/// Builds the argument list for mounting a volume with the external client.
pub fn mount_args(record: &VolumeRecord) -> Vec<OsString> {
    let mut args: Vec<OsString> = vec![
        "-H".into(),
        record.provider_host.clone().into(),
        "-t".into(),
        record.access_token.clone().into(),
    ];

    if record.provider_port != DEFAULT_PROVIDER_PORT {
        args.push("-P".into());
        args.push(record.provider_port.clone().into());
    }
    if record.insecure {
        args.push("-i".into());
    }
    if !record.mount_options.is_empty() {
        args.push("--opt".into());
        args.push(record.mount_options.join(",").into());
    }
    for param in TuningParam::ALL {
        if let Some(value) = record.tuning.get(&param) {
            args.push(param.flag().into());
            args.push(value.clone().into());
        }
    }

    args.push(record.mountpoint.clone().into_os_string());
    args
}

/// Builds the argument list for unmounting a mountpoint with the external
/// client.
pub fn unmount_args(mountpoint: &Path) -> Vec<OsString> {
    vec!["-u".into(), mountpoint.to_path_buf().into_os_string()]
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::path::PathBuf;

    fn record(pairs: &[(&str, &str)]) -> VolumeRecord {
        let options: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        VolumeRecord::from_options(&options, Path::new("/var/lib/netvol/volumes")).unwrap()
    }

    fn as_strings(args: &[OsString]) -> Vec<String> {
        args.iter()
            .map(|a| a.to_string_lossy().into_owned())
            .collect()
    }

    #[test]
    fn test_minimal_mount_args() {
        let v = record(&[("host", "example.org"), ("token", "t0ken")]);
        let args = as_strings(&mount_args(&v));
        assert_eq!(
            args,
            vec![
                "-H".to_string(),
                "example.org".to_string(),
                "-t".to_string(),
                "t0ken".to_string(),
                v.mountpoint.to_string_lossy().into_owned(),
            ]
        );
    }

    #[test]
    fn test_default_port_is_omitted() {
        let v = record(&[("host", "h"), ("token", "t"), ("port", "5555")]);
        assert!(!as_strings(&mount_args(&v)).contains(&"-P".to_string()));
    }

    #[test]
    fn test_non_default_port_is_emitted() {
        let v = record(&[("host", "h"), ("token", "t"), ("port", "8443")]);
        let args = as_strings(&mount_args(&v));
        let pos = args.iter().position(|a| a == "-P").unwrap();
        assert_eq!(args[pos + 1], "8443");
    }

    #[test]
    fn test_insecure_flag() {
        let v = record(&[("host", "h"), ("token", "t"), ("insecure", "true")]);
        assert!(as_strings(&mount_args(&v)).contains(&"-i".to_string()));
    }

    #[test]
    fn test_mount_options_comma_joined() {
        let v = record(&[("host", "h"), ("token", "t"), ("opt", "ro,noatime")]);
        let args = as_strings(&mount_args(&v));
        let pos = args.iter().position(|a| a == "--opt").unwrap();
        assert_eq!(args[pos + 1], "ro,noatime");
    }

    #[test]
    fn test_tuning_params_in_canonical_order() {
        // Set two params in reverse canonical order; emission order must
        // still follow the declaration order.
        let v = record(&[
            ("host", "h"),
            ("token", "t"),
            ("write-buffer-max-size", "2048"),
            ("communicator-thread-count", "8"),
        ]);
        let args = as_strings(&mount_args(&v));
        let comm = args
            .iter()
            .position(|a| a == "--communicator-thread-count")
            .unwrap();
        let wbuf = args
            .iter()
            .position(|a| a == "--write-buffer-max-size")
            .unwrap();
        assert!(comm < wbuf);
        assert_eq!(args[comm + 1], "8");
        assert_eq!(args[wbuf + 1], "2048");
    }

    #[test]
    fn test_mountpoint_is_last() {
        let v = record(&[
            ("host", "h"),
            ("token", "t"),
            ("insecure", "true"),
            ("scheduler-thread-count", "2"),
        ]);
        let args = mount_args(&v);
        assert_eq!(args.last().unwrap(), v.mountpoint.as_os_str());
    }

    #[test]
    fn test_unmount_args() {
        let path = PathBuf::from("/var/lib/netvol/volumes/abc");
        let args = as_strings(&unmount_args(&path));
        assert_eq!(args, vec!["-u".to_string(), path.to_string_lossy().into_owned()]);
    }
}
