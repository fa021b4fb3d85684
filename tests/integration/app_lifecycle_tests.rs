/*!
 * Integration tests for application lifecycle
 */

use anyhow::Result;
use std::fs;
use std::sync::Arc;
use std::sync::atomic::AtomicBool;
use topicsort::app_config::{ClassifierProvider, Config};
use topicsort::app_controller::{Controller, SortJob};
use topicsort::classification::{FixedDecider, TopicClassifier};
use topicsort::providers::mock::MockProvider;
use crate::common::{self, SAMPLE_DOCUMENT};

fn offline_controller() -> Result<Controller> {
    common::init_test_logging();
    let mut config = Config::default();
    config.classifier.provider = ClassifierProvider::Disabled;
    Controller::with_config(config)
}

/// Test that a run writes the suffixed output next to the input
#[test]
fn test_run_withFixedDecider_shouldWriteDefaultOutputPath() -> Result<()> {
    let controller = offline_controller()?;
    let temp_dir = common::create_temp_dir()?;
    let input = common::create_test_file(temp_dir.path(), "today.txt", SAMPLE_DOCUMENT)?;

    let report = tokio_test::block_on(controller.run(&SortJob::new(&input), &FixedDecider, None))?
        .expect("run should not be skipped");

    assert_eq!(report.output_path, temp_dir.path().join("today_shouldbe.txt"));
    let written = fs::read_to_string(&report.output_path)?;
    assert_eq!(written, report.outcome.document);
    assert_eq!(report.outcome.counters.final_count, 3);
    Ok(())
}

/// Test that an existing output is left alone without force overwrite
#[test]
fn test_run_existingOutput_shouldSkipWithoutForce() -> Result<()> {
    let controller = offline_controller()?;
    let temp_dir = common::create_temp_dir()?;
    let input = common::create_test_file(temp_dir.path(), "today.txt", SAMPLE_DOCUMENT)?;
    let existing = common::create_test_file(temp_dir.path(), "today_shouldbe.txt", "keep me")?;

    let report = tokio_test::block_on(controller.run(&SortJob::new(&input), &FixedDecider, None))?;

    assert!(report.is_none());
    assert_eq!(fs::read_to_string(&existing)?, "keep me");

    let job = SortJob {
        force_overwrite: true,
        ..SortJob::new(&input)
    };
    let report = tokio_test::block_on(controller.run(&job, &FixedDecider, None))?;

    assert!(report.is_some());
    assert_ne!(fs::read_to_string(&existing)?, "keep me");
    Ok(())
}

/// Test that an explicit output path is honoured
#[test]
fn test_run_explicitOutput_shouldWriteThere() -> Result<()> {
    let controller = offline_controller()?;
    let temp_dir = common::create_temp_dir()?;
    let input = common::create_test_file(temp_dir.path(), "today.txt", SAMPLE_DOCUMENT)?;
    let output = temp_dir.path().join("out").join("sorted.txt");

    let job = SortJob {
        output_path: Some(output.clone()),
        ..SortJob::new(&input)
    };
    tokio_test::block_on(controller.run(&job, &FixedDecider, None))?;

    assert!(output.exists());
    assert!(!temp_dir.path().join("today_shouldbe.txt").exists());
    Ok(())
}

/// Test that a document without titles produces no output file
#[test]
fn test_run_noTitles_shouldFailAndWriteNothing() -> Result<()> {
    let controller = offline_controller()?;
    let temp_dir = common::create_temp_dir()?;
    let input = common::create_test_file(temp_dir.path(), "plain.txt", "no titles here\n")?;

    let result = tokio_test::block_on(controller.run(&SortJob::new(&input), &FixedDecider, None));

    assert!(result.is_err());
    assert!(!temp_dir.path().join("plain_shouldbe.txt").exists());
    Ok(())
}

/// Test that a cancelled run leaves no partial file
#[test]
fn test_run_cancelled_shouldWriteNothing() -> Result<()> {
    let controller = offline_controller()?;
    let temp_dir = common::create_temp_dir()?;
    let input = common::create_test_file(temp_dir.path(), "today.txt", SAMPLE_DOCUMENT)?;
    let cancel = AtomicBool::new(true);

    let result = tokio_test::block_on(controller.run(&SortJob::new(&input), &FixedDecider, Some(&cancel)));

    assert!(result.is_err());
    assert_eq!(fs::read_dir(temp_dir.path())?.count(), 1);
    Ok(())
}

/// Test a full run through the provider-backed classifier with a header
#[tokio::test]
async fn test_run_withMockClassifier_shouldSplitAndStampHeader() -> Result<()> {
    let mut config = Config::default();
    config.sorting.include_header = true;
    let controller = Controller::with_config(config)?;
    let temp_dir = common::create_temp_dir()?;
    let input = common::create_test_file(temp_dir.path(), "today.txt", SAMPLE_DOCUMENT)?;
    let provider = Arc::new(MockProvider::scripted([
        common::multi_story_reply(2, "Politics, Weather", "2", true),
        common::single_story_reply(true),
    ]));
    let decider = TopicClassifier::new(provider, "tiny");

    let report = controller
        .run(&SortJob::new(&input), &decider, None)
        .await?
        .expect("run should not be skipped");

    let written = fs::read_to_string(&report.output_path)?;
    assert!(written.starts_with("Sorted with: mock/tiny\nSorted at: "));
    assert_eq!(report.outcome.title_count, 4);
    assert_eq!(common::count_line(&written, "--budget.jpg"), 2);
    Ok(())
}
