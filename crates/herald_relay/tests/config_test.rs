//! Configuration file loading.

use herald_relay::HeraldConfig;
use std::io::Write;
use std::time::Duration;

#[test]
fn test_file_overrides_bundled_defaults() {
    let mut file = tempfile::Builder::new()
        .suffix(".toml")
        .tempfile()
        .expect("Temp file");
    writeln!(
        file,
        "[relay]\nthread_inactivity_secs = 120\n\n[logging]\njson = true"
    )
    .expect("Write config");

    let config = HeraldConfig::from_file(file.path()).expect("Valid config");
    assert_eq!(config.relay.thread_inactivity(), Duration::from_secs(120));
    assert_eq!(config.relay.auto_delete_after(), Duration::from_secs(30));
    assert_eq!(*config.relay.flush_window_ms(), 700);
    assert!(config.logging.json);
    assert_eq!(config.logging.level, "info");
}

#[test]
fn test_invalid_timing_is_rejected() {
    let mut file = tempfile::Builder::new()
        .suffix(".toml")
        .tempfile()
        .expect("Temp file");
    writeln!(file, "[relay]\nthread_inactivity_secs = 20").expect("Write config");

    let err = HeraldConfig::from_file(file.path()).unwrap_err();
    assert!(err.to_string().contains("auto_delete_secs"));
}
