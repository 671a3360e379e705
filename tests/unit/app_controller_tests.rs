/*!
 * Tests for application controller functionality
 */

use anyhow::Result;
use std::sync::{Arc, Mutex};
use langpack::app_controller::{Controller, PipelineStage};
use langpack::errors::PipelineError;
use crate::common;
use crate::common::mock_remote::{CopyCompiler, MockRemote, RecordingRefresher};

fn controller_with(config: langpack::Config, remote: MockRemote, refresher: RecordingRefresher) -> Controller {
    Controller::with_components(config, Box::new(remote), Box::new(CopyCompiler::default()), Box::new(refresher))
}

/// Test the stage names used in log output
#[test]
fn test_pipeline_stage_display_shouldBeReadable() {
    assert_eq!(PipelineStage::SchemaCheck.to_string(), "schema check");
    assert_eq!(PipelineStage::DownloadTranslations.to_string(), "translation download");
    assert_eq!(PipelineStage::Done.to_string(), "done");
}

/// Test that the refresh asks for subtitles older than the cutoff date
#[test]
fn test_refresh_subtitles_withDays_shouldPassCutoff() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let cutoffs = Arc::new(Mutex::new(Vec::new()));
    let refresher = RecordingRefresher { cutoffs: Arc::clone(&cutoffs), fail: false };
    let controller = controller_with(common::test_config(temp_dir.path(), "1.0"), MockRemote::default(), refresher);

    controller.refresh_subtitles(0)?;

    let today = chrono::Local::now().date_naive().format("%-m/%-d/%Y").to_string();
    assert_eq!(*cutoffs.lock().unwrap(), vec![today]);
    Ok(())
}

/// Test that a refresher failure becomes a fatal pipeline error
#[test]
fn test_refresh_subtitles_withFailingRefresher_shouldBeFatal() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let refresher = RecordingRefresher { fail: true, ..Default::default() };
    let controller = controller_with(common::test_config(temp_dir.path(), "1.0"), MockRemote::default(), refresher);

    let err = controller.refresh_subtitles(3).unwrap_err();
    assert!(matches!(err, PipelineError::SubtitleRefresh(_)));
    assert!(err.is_fatal());
    Ok(())
}

/// Test metadata generation without a download step
#[tokio::test]
async fn test_generate_metadata_withExistingLocales_shouldWriteIndex() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let config = common::test_config(temp_dir.path(), "2.1");
    std::fs::create_dir_all(config.locale_root.join("de"))?;
    let remote = MockRemote::new(None, vec![common::remote_status("de", "German", 40, 10, 25)]);
    let tracker = remote.tracker();
    let controller = controller_with(config.clone(), remote, RecordingRefresher::default());

    let index = controller.generate_metadata().await?;

    assert_eq!(index.len(), 1);
    let de = index.get("de").expect("de should be indexed");
    assert_eq!(de.software_version.as_deref(), Some("2.1"));
    assert_eq!(de.approved_translations, Some(10));
    assert_eq!(de.crowdin_version, Some(1));
    assert!(config.availability_index_path().exists());
    assert!(config.locale_root.join("de").join("de_metadata.json").exists());
    assert_eq!(tracker.lock().unwrap().status_calls, 1);
    Ok(())
}

/// Test that a controller can be built from a configuration alone
#[test]
fn test_with_config_withValidConfig_shouldKeepConfig() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let controller = Controller::with_config(common::test_config(temp_dir.path(), "0.9.3"))?;
    assert_eq!(controller.config().software_version, "0.9.3");
    assert_eq!(controller.config().crowdin.project_id, "test-project");
    Ok(())
}

/// Test that an empty locale tree still produces an index file
#[test]
fn test_generate_metadata_withEmptyLocaleRoot_shouldWriteEmptyIndex() -> Result<()> {
    common::init_test_logging();
    let temp_dir = common::create_temp_dir()?;
    let config = common::test_config(temp_dir.path(), "1.0");
    std::fs::create_dir_all(&config.locale_root)?;
    let controller = controller_with(config.clone(), MockRemote::default(), RecordingRefresher::default());

    let index = tokio_test::block_on(controller.generate_metadata())?;

    assert!(index.is_empty());
    assert_eq!(std::fs::read_to_string(config.availability_index_path())?, "[]");
    Ok(())
}
