/*!
 * End-to-end sorting through the pipeline with scripted classifier replies
 */

use std::sync::Arc;
use std::sync::atomic::AtomicBool;
use topicsort::classification::{FixedDecider, ManualDecider, TopicClassifier};
use topicsort::errors::PipelineError;
use topicsort::pipeline::{PipelineConfig, SortingPipeline};
use topicsort::providers::mock::MockProvider;
use topicsort::segmentation::SplitUnit;
use crate::common::{self, SAMPLE_DOCUMENT};

fn classifier(replies: Vec<String>) -> (TopicClassifier, Arc<MockProvider>) {
    common::init_test_logging();
    let provider = Arc::new(MockProvider::scripted(replies));
    (TopicClassifier::new(provider.clone(), "tiny"), provider)
}

#[tokio::test]
async fn test_sort_multiStorySegment_shouldSplitAndCarryMetadata() {
    let (decider, provider) = classifier(vec![
        common::multi_story_reply(2, "Politics, Weather", "2", true),
        common::single_story_reply(true),
        common::single_story_reply(false),
    ]);

    let outcome = SortingPipeline::default()
        .run(SAMPLE_DOCUMENT, &decider, None)
        .await
        .unwrap();

    let expected = "\"Title:Politics\"
The council approved the budget. Schools get more funding.
--budget.jpg
https://example.com/budget
Timestamp: 08:15

\"Title:Weather\"
Heavy rain is expected tomorrow. Roads may flood.
--budget.jpg
https://example.com/budget
Timestamp: 08:15

\"Title:sport\"
The home team won the final.
Source: local wire
@reporter

\"Title:weather\"
Sunny spells later in the week.
cc-check the forecast
Map view: coast
";
    assert_eq!(outcome.document, expected);
    assert_eq!(outcome.counters.baseline_count, 3);
    assert_eq!(outcome.counters.final_count, 4);
    assert_eq!(outcome.counters.kept_separate_count, 3);
    assert_eq!(outcome.counters.merged_count, 0);
    assert_eq!(outcome.title_count, 4);
    assert!(outcome.defaulted_decisions.is_empty());
    assert_eq!(provider.request_count(), 3);
}

#[tokio::test]
async fn test_sort_twoSegmentsWithDefaults_shouldKeepBothSeparate() {
    let outcome = SortingPipeline::default()
        .run("\"Title:A\"\nAlpha.\n--a.jpg\n\"Title:B\"\nBeta.\n", &FixedDecider, None)
        .await
        .unwrap();

    assert_eq!(outcome.counters.baseline_count, 2);
    assert_eq!(outcome.counters.final_count, 2);
    assert_eq!(outcome.counters.kept_separate_count, 1);
    assert_eq!(outcome.counters.merged_count, 0);
}

#[tokio::test]
async fn test_sort_mergePolicyOn_shouldFoldSameTopicNeighbours() {
    let (decider, _) = classifier(vec![
        common::single_story_reply(true),
        common::single_story_reply(false),
        common::single_story_reply(false),
    ]);
    let pipeline = SortingPipeline::new(PipelineConfig::default().with_merge_on_same_topic(true));

    let outcome = pipeline.run(SAMPLE_DOCUMENT, &decider, None).await.unwrap();

    assert_eq!(outcome.counters.final_count, 2);
    assert_eq!(outcome.counters.merged_count, 1);
    assert_eq!(outcome.counters.reduction(), 1);
    assert_eq!(outcome.title_count, 2);
    assert!(!outcome.document.contains("\"Title:weather\""));
    assert!(outcome.document.contains("@reporter\nSunny spells later in the week.\ncc-check the forecast\nMap view: coast\n"));
}

#[tokio::test]
async fn test_sort_mergePolicyOff_shouldIgnoreSameTopicVerdicts() {
    let (decider, _) = classifier(vec![common::single_story_reply(false)]);

    let outcome = SortingPipeline::default().run(SAMPLE_DOCUMENT, &decider, None).await.unwrap();

    assert_eq!(outcome.counters.final_count, 3);
    assert_eq!(outcome.counters.merged_count, 0);
    assert_eq!(outcome.counters.reduction(), 0);
}

#[tokio::test]
async fn test_sort_failingClassifier_shouldDefaultEverySegment() {
    common::init_test_logging();
    let decider = TopicClassifier::new(Arc::new(MockProvider::failing()), "tiny");

    let outcome = SortingPipeline::default().run(SAMPLE_DOCUMENT, &decider, None).await.unwrap();

    assert_eq!(outcome.defaulted_decisions, vec![1, 2, 3]);
    assert_eq!(outcome.counters.final_count, 3);
    for line in ["--budget.jpg", "Source: local wire", "cc-check the forecast"] {
        assert_eq!(common::count_line(&outcome.document, line), 1);
    }
}

#[tokio::test]
async fn test_sort_lineUnit_shouldSplitAfterFirstLineForPointOne() {
    let (decider, provider) = classifier(vec![common::multi_story_reply(2, "X, Y", "1", true)]);
    let pipeline = SortingPipeline::new(PipelineConfig::default().with_split_unit(SplitUnit::Line));

    let outcome = pipeline
        .run("\"Title:A\"\nFirst line\nSecond line\nThird line\n", &decider, None)
        .await
        .unwrap();

    assert_eq!(
        outcome.document,
        "\"Title:X\"\nFirst line\n\n\"Title:Y\"\nSecond line\nThird line\n"
    );
    let prompts = provider.prompts();
    assert!(prompts[0].contains("line numbers of SEGMENT 1"));
    assert!(!prompts[0].contains("counting sentences"));
}

#[tokio::test]
async fn test_sort_repeatedTagLine_shouldBeWrittenOnce() {
    let outcome = SortingPipeline::default()
        .run("\"Title:A\"\n--a.jpg\nStory.\n--a.jpg\n", &FixedDecider, None)
        .await
        .unwrap();

    assert_eq!(outcome.document, "\"Title:A\"\n--a.jpg\nStory.\n");
    assert_eq!(common::count_line(&outcome.document, "--a.jpg"), 1);
}

#[tokio::test]
async fn test_sort_separatorLines_shouldBeConsistent() {
    let pipeline = SortingPipeline::new(PipelineConfig::default().with_separator_blank_lines(2));

    let outcome = pipeline.run(SAMPLE_DOCUMENT, &FixedDecider, None).await.unwrap();

    assert_eq!(outcome.document.matches("\n\n\n\"Title:").count(), 2);
    assert!(!outcome.document.contains("\n\n\n\n"));
}

#[tokio::test]
async fn test_sort_manualQuit_shouldCancelWithoutDocument() {
    let cancel = Arc::new(AtomicBool::new(false));
    let decider = ManualDecider::new("s\nq\n".as_bytes(), Vec::new(), cancel.clone());

    let result = SortingPipeline::default()
        .run(SAMPLE_DOCUMENT, &decider, Some(cancel.as_ref()))
        .await;

    match result {
        Err(PipelineError::Cancelled { finalized, total }) => {
            assert_eq!(finalized, 1);
            assert_eq!(total, 3);
        }
        other => panic!("expected cancellation, got {:?}", other),
    }
}
