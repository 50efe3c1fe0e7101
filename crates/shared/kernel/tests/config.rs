use pbx_kernel::config::{ConfigError, load_pbx_config};
use serial_test::serial;
use std::io::Write;
use std::path::PathBuf;
use tempfile::NamedTempFile;

fn write_toml(contents: &str) -> NamedTempFile {
    let mut file = tempfile::Builder::new().suffix(".toml").tempfile().expect("temp file");
    file.write_all(contents.as_bytes()).expect("write config");
    file
}

#[test]
#[serial]
fn loads_file_and_keeps_defaults_for_the_rest() {
    let file = write_toml(
        r#"
        [modules]
        dialplan_timeout_ms = 250
        disabled = ["analytics"]

        [callrouting]
        gateway = "carrier-a"

        [[contactcenter.queues]]
        name = "support"
        extension = "5000"
        "#,
    );

    let config = load_pbx_config(Some(file.path())).expect("config loads");
    assert_eq!(config.modules.dialplan_timeout_ms, 250);
    assert_eq!(config.modules.handler_timeout_ms, 2_000);
    assert_eq!(config.modules.disabled, vec!["analytics".to_owned()]);
    assert_eq!(config.callrouting.gateway.as_deref(), Some("carrier-a"));
    assert_eq!(config.contactcenter.queues[0].name, "support");
    assert_eq!(config.log.level, "info");
}

#[test]
#[serial]
fn explicit_missing_file_is_an_error() {
    let err = load_pbx_config(Some(PathBuf::from("/nonexistent/pbx-config"))).unwrap_err();
    assert!(matches!(err, ConfigError::Config { .. }));
    assert!(err.to_string().contains("Failed to build config"));
}

#[test]
#[serial]
fn defaults_apply_without_a_file() {
    let config = load_pbx_config(None::<PathBuf>).expect("defaults");
    assert_eq!(config.modules.dialplan_timeout_ms, 500);
    assert!(config.modules.disabled.is_empty());
}
