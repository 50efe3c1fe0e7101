use pbx_logger::{FileSink, LevelFilter, Logger, LoggerError, Rotation};
use serial_test::serial;
use std::fs;
use std::time::Duration;
use tempfile::tempdir;

// Each test binary owns one global subscriber, so everything that installs one lives here.
#[test]
#[serial]
fn file_sink_writes_and_second_init_fails() -> Result<(), Box<dyn std::error::Error>> {
    let tmp_dir = tempdir()?;
    let log_dir = tmp_dir.path().join("logs");

    let logger = Logger::builder("pbx-file-logging")
        .console(false)
        .level(LevelFilter::INFO)
        .file(FileSink::new(&log_dir).rotation(Rotation::NEVER).max_files(2))
        .init()?;
    assert!(logger.has_file_sink());

    tracing::info!(module = "callrouting", "hello from integration test");

    let second = Logger::builder("pbx-file-logging-second").init();
    assert!(matches!(second, Err(LoggerError::Subscriber { .. })));

    std::thread::sleep(Duration::from_millis(30));
    drop(logger);

    let log_file = fs::read_dir(&log_dir)?
        .flatten()
        .map(|entry| entry.path())
        .find(|path| path.extension().and_then(|ext| ext.to_str()) == Some("log"))
        .expect("log file should be created");

    let contents = fs::read_to_string(&log_file)?;
    assert!(contents.contains("hello from integration test"));

    Ok(())
}
