#![no_main]
use libfuzzer_sys::fuzz_target;
use netvol::modules::volume::VolumeRecord;
use std::collections::HashMap;
use std::path::Path;

fuzz_target!(|data: &[u8]| {
    if let Ok(options_str) = std::str::from_utf8(data) {
        // Try to parse as a creation option map
        if let Ok(options) = serde_json::from_str::<HashMap<String, String>>(options_str) {
            // Parsing must reject bad options, never panic
            let _ = VolumeRecord::from_options(&options, Path::new("/tmp/fuzz_volumes"));
        }
    }
});
