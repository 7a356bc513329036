//! Configuration feeding a real run.

use std::io::Write;
use tagcheck::Suite;
use tagcheck::config::{ConfigError, SuiteConfig};
use tempfile::NamedTempFile;

use crate::common::{API_KEY, SPACE_ID, TASK_ID, seeded_store, spawn_stub};

#[tokio::test]
async fn test_properties_file_drives_a_run() {
    let (_state, base_url) = spawn_stub(seeded_store()).await;

    let mut file = NamedTempFile::new().unwrap();
    writeln!(file, "# generated for the stub").unwrap();
    writeln!(file, "apiKey={}", API_KEY).unwrap();
    writeln!(file, "spaceId={}", SPACE_ID).unwrap();
    writeln!(file, "task_id={}", TASK_ID).unwrap();
    writeln!(file, "baseUrl={}", base_url).unwrap();

    let config = SuiteConfig::load(file.path()).unwrap();
    let report = Suite::from_config(&config).unwrap().run().await;

    assert!(report.all_passed(), "{}", report);
}

#[test]
fn test_missing_config_stops_before_any_request() {
    let dir = tempfile::tempdir().unwrap();
    let err = SuiteConfig::load(dir.path().join("config.properties")).unwrap_err();

    assert!(matches!(err, ConfigError::Read { .. }));
}
