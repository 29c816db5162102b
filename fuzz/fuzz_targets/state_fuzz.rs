#![no_main]
use libfuzzer_sys::fuzz_target;
use netvol::modules::state::StateStore;

fuzz_target!(|data: &[u8]| {
    // Arbitrary state-file content must load cleanly or fail with a
    // corrupt-state error, never panic
    if let Ok(dir) = tempfile::tempdir() {
        let path = dir.path().join("netvol-state.json");
        if std::fs::write(&path, data).is_ok() {
            let store = StateStore::new(path);
            let _ = store.load();
        }
    }
});
