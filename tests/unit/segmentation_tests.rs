/*!
 * Tests for metadata classification, extraction, splitting and reassembly
 */

use topicsort::segmentation::metadata::is_metadata;
use topicsort::segmentation::{
    extract, extract_metadata_lines, reassemble, split, split_with_labels, tokenize, ProcessedSegment, SplitUnit,
    TopicCounters,
};
use crate::common::{self, SAMPLE_DOCUMENT};

#[test]
fn test_isMetadata_documentedExamples_shouldClassify() {
    for line in ["--img.jpg", "http://x.com", "Timestamp: 3pm", "Map view: x", "Source: y", "cc-comment", "@handle"] {
        assert!(is_metadata(line), "{line} should be metadata");
    }
    assert!(!is_metadata("Hello world."));
    assert!(!is_metadata(""));
    assert!(!is_metadata("   "));
}

#[test]
fn test_extract_sampleDocument_shouldFindEveryTitle() {
    let segments = extract(SAMPLE_DOCUMENT);

    let titles: Vec<&str> = segments.iter().map(|s| s.title.as_str()).collect();
    assert_eq!(titles, vec!["\"Title:news\"", "\"Title:sport\"", "\"Title:weather\""]);
}

#[test]
fn test_extract_sampleDocument_shouldCatalogueEachMetadataLineOnce() {
    let segments = extract(SAMPLE_DOCUMENT);
    let source_metadata = extract_metadata_lines(SAMPLE_DOCUMENT);

    for line in &source_metadata {
        let owners = segments.iter().filter(|s| s.metadata_lines.contains(line)).count();
        assert_eq!(owners, 1, "{line} should belong to exactly one segment");
    }
    let catalogued: usize = segments.iter().map(|s| s.metadata_lines.len()).sum();
    assert_eq!(catalogued, source_metadata.len());
}

#[test]
fn test_extract_blankLinesInsideSegment_shouldKeepTrailingMetadata() {
    let segments = extract("\"Title:A\"\nFirst paragraph.\n\n\nSecond paragraph.\n\n--late.jpg\n");

    assert_eq!(segments.len(), 1);
    assert!(segments[0].body.contains("Second paragraph."));
    assert_eq!(segments[0].metadata_lines, vec!["--late.jpg"]);
}

#[test]
fn test_extract_noTitles_shouldReturnEmpty() {
    assert!(extract("Plain text\n--img.jpg\n").is_empty());
}

#[test]
fn test_split_emptyPoints_shouldReturnWholeContent() {
    let runs = split("\"Title:A\"", "One. Two.\n--a.jpg\nSource: x", &[], SplitUnit::Sentence);

    assert_eq!(runs.len(), 1);
    assert_eq!(runs[0].content, "One. Two.");
    assert_eq!(runs[0].metadata_lines, vec!["--a.jpg", "Source: x"]);
}

#[test]
fn test_split_pointsTwoAndFive_shouldPartitionIntoThreeRuns() {
    let body = "S1. S2. S3. S4. S5. S6. S7.\n--tag.jpg\n@someone";
    let runs = split("\"Title:A\"", body, &[5, 2, 5], SplitUnit::Sentence);

    let contents: Vec<&str> = runs.iter().map(|r| r.content.as_str()).collect();
    assert_eq!(contents, vec!["S1. S2.", "S3. S4. S5.", "S6. S7."]);

    let rejoined: Vec<String> = runs
        .iter()
        .flat_map(|r| tokenize(&r.content, SplitUnit::Sentence))
        .collect();
    assert_eq!(rejoined, tokenize("S1. S2. S3. S4. S5. S6. S7.", SplitUnit::Sentence));

    for run in &runs {
        assert_eq!(run.metadata_lines, vec!["--tag.jpg", "@someone"]);
        assert_eq!(common::count_line(&run.to_text(), "--tag.jpg"), 1);
    }
}

#[test]
fn test_split_pointsBeyondRange_shouldClampWithoutEmptyRun() {
    let runs = split("\"Title:A\"", "A. B. C.", &[2, 9, 40], SplitUnit::Sentence);

    let contents: Vec<&str> = runs.iter().map(|r| r.content.as_str()).collect();
    assert_eq!(contents, vec!["A. B.", "C."]);
}

#[test]
fn test_split_lineUnit_shouldUseZeroIndexedLines() {
    let runs = split("\"Title:A\"", "first\nsecond\n--x.jpg\nthird", &[0], SplitUnit::Line);

    let contents: Vec<&str> = runs.iter().map(|r| r.content.as_str()).collect();
    assert_eq!(contents, vec!["first", "second\nthird"]);
}

#[test]
fn test_splitWithLabels_endToEndExample_shouldMatchExpectedText() {
    let runs = split("\"Title:A\"", "Line1. Line2. Line3.\n--tag.jpg", &[1], SplitUnit::Sentence);

    assert_eq!(runs[0].to_text(), "\"Title:A\"\nLine1.\n--tag.jpg");
    assert_eq!(runs[1].to_text(), "\"Title:A\"\nLine2. Line3.\n--tag.jpg");

    let labelled = split_with_labels(
        "\"Title:A\"",
        "Line1. Line2. Line3.",
        &[1, 2],
        SplitUnit::Sentence,
        &["Economy news".to_string()],
    );
    let titles: Vec<&str> = labelled.iter().map(|r| r.title.as_str()).collect();
    assert_eq!(titles, vec!["\"Title:Economy\"", "\"Title:Part2\"", "\"Title:Part3\""]);
}

#[test]
fn test_reassemble_twice_shouldNotDuplicateMetadata() {
    let entries: Vec<ProcessedSegment> = extract(SAMPLE_DOCUMENT)
        .iter()
        .enumerate()
        .map(|(i, s)| ProcessedSegment::from_segment(i, s))
        .collect();
    let first = reassemble(&entries);

    let again: Vec<ProcessedSegment> = extract(&first)
        .iter()
        .enumerate()
        .map(|(i, s)| ProcessedSegment::from_segment(i, s))
        .collect();
    let second = reassemble(&again);

    assert_eq!(first, second);
    assert_eq!(again.len(), entries.len());
    assert_eq!(common::count_line(&second, "--budget.jpg"), 1);
}

#[test]
fn test_reassemble_missingMetadata_shouldAppendOnce() {
    let mut entry = ProcessedSegment::from_segment(0, &extract("\"Title:A\"\nText.\n--a.jpg").remove(0));
    entry.text = "\"Title:A\"\nText.".to_string();

    let output = reassemble(&[entry]);

    assert_eq!(output, "\"Title:A\"\nText.\n--a.jpg\n");
}

#[test]
fn test_topicCounters_derive_shouldCountFromEntries() {
    let segments = extract("\"Title:A\"\na\n\"Title:B\"\nb\n\"Title:C\"\nc");
    let mut first = ProcessedSegment::from_segment(0, &segments[0]);
    first.absorb(1, &segments[1]);
    let entries = vec![first, ProcessedSegment::from_segment(2, &segments[2])];

    let counters = TopicCounters::derive(segments.len(), &entries);

    assert_eq!(counters.baseline_count, 3);
    assert_eq!(counters.final_count, 2);
    assert_eq!(counters.kept_separate_count, 1);
    assert_eq!(counters.merged_count, 1);
    assert_eq!(counters.reduction(), 1);
}
