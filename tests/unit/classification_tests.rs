/*!
 * Tests for classifier response parsing and the provider-backed classifier
 */

use std::sync::Arc;
use std::time::Duration;
use topicsort::classification::prompt::build_prompt;
use topicsort::classification::{parse_response, DecisionRequest, SegmentDecider, TopicClassifier, TopicDecision};
use topicsort::providers::mock::MockProvider;
use topicsort::segmentation::{Segment, SplitUnit};
use crate::common;

fn request<'a>(current: &'a Segment, next: Option<&'a Segment>) -> DecisionRequest<'a> {
    DecisionRequest {
        current,
        next,
        keep_same_topic: true,
        split_unit: SplitUnit::Sentence,
        segment_number: 1,
        total_segments: 2,
    }
}

#[test]
fn test_parseResponse_emptyReply_shouldApplyDocumentedDefaults() {
    let decision = parse_response("");

    assert!(!decision.different);
    assert!(!decision.multi_story);
    assert_eq!(decision.story_count, 1);
    assert!(decision.sub_topics.is_empty());
    assert!(decision.split_points.is_empty());
    assert!(decision.defaulted);
}

#[test]
fn test_parseResponse_lowercaseFields_shouldParse() {
    let decision = parse_response(
        "contains_multiple_stories: yes\nnumber_of_stories: 3\nsub_topics: [Politics, Sports, Weather]\nsplit_after: 2, 4\ndifferent: no",
    );

    assert!(decision.multi_story);
    assert_eq!(decision.story_count, 3);
    assert_eq!(decision.sub_topics, vec!["Politics", "Sports", "Weather"]);
    assert_eq!(decision.split_points, vec![2, 4]);
    assert!(!decision.different);
}

#[test]
fn test_parseResponse_malformedCount_shouldKeepDefaultCount() {
    let decision = parse_response("CONTAINS_MULTIPLE_STORIES: YES\nNUMBER_OF_STORIES: several\nDIFFERENT: YES");

    assert!(decision.multi_story);
    assert_eq!(decision.story_count, 1);
    assert!(!decision.wants_split());
    assert!(decision.different);
}

#[test]
fn test_parseResponse_multiLineReasoning_shouldStopAtBlankLine() {
    let decision = parse_response("DIFFERENT: YES\nREASONING: First line\ncontinues here.\n\nTrailing notes.");
    assert_eq!(decision.reasoning, "First line\ncontinues here.");
}

#[test]
fn test_topicClassifier_scriptedReply_shouldReturnParsedDecision() {
    let provider = Arc::new(MockProvider::scripted([common::multi_story_reply(2, "Politics, Weather", "2", true)]));
    let classifier = TopicClassifier::new(provider.clone(), "tiny");
    let current = Segment::new("\"Title:news\"", "A. B. C.");
    let next = Segment::new("\"Title:sport\"", "D.");

    let decision = tokio_test::block_on(classifier.decide(request(&current, Some(&next))));

    assert!(decision.wants_split());
    assert_eq!(decision.split_points, vec![2]);
    assert!(decision.different);
    assert_eq!(provider.request_count(), 1);

    let prompts = provider.prompts();
    assert!(prompts[0].contains("\"Title:news\"\nA. B. C."));
    assert!(prompts[0].contains("\"Title:sport\"\nD."));
}

#[test]
fn test_topicClassifier_prompt_shouldMatchBuiltPrompt() {
    let provider = Arc::new(MockProvider::same_topic());
    let classifier = TopicClassifier::new(provider.clone(), "tiny");
    let current = Segment::new("\"Title:news\"", "A.");
    let req = request(&current, None);

    tokio_test::block_on(classifier.decide(req));

    assert_eq!(provider.prompts(), vec![build_prompt(&req)]);
}

#[tokio::test]
async fn test_topicClassifier_failingProvider_shouldReturnDefaults() {
    let provider = Arc::new(MockProvider::failing());
    let classifier = TopicClassifier::new(provider, "tiny")
        .with_timeout(Duration::from_secs(1))
        .with_retries(1, 1);
    let current = Segment::new("\"Title:news\"", "A.");

    let decision = classifier.decide(request(&current, None)).await;

    assert_eq!(
        TopicDecision {
            reasoning: String::new(),
            raw_response: String::new(),
            ..decision.clone()
        },
        TopicDecision {
            reasoning: String::new(),
            defaulted: true,
            ..TopicDecision::default()
        }
    );
    assert!(decision.reasoning.starts_with("Error occurred during analysis"));
}
