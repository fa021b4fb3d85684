/*!
 * Segment splitting.
 *
 * A segment body is divided into content units (sentences or lines) after its
 * metadata lines are set aside. Split points mark the last unit of each run;
 * every run is emitted with the parent's complete metadata set.
 *
 * Split point conventions:
 * - `SplitUnit::Sentence` (default): 1-indexed, `n` means "after the n-th sentence"
 * - `SplitUnit::Line`: 0-indexed over non-blank content lines
 *
 * Deciders always answer with 1-indexed points; `points_from_one_based` maps
 * them into the convention of the chosen unit.
 *
 * Runs are cut out of the joined content, so line breaks inside a run survive.
 */

use log::debug;
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::BTreeSet;
use std::ops::Range;

use super::metadata::{extract_metadata_lines, partition_lines};
use super::model::{SplitUnit, SubSegment};

/// Locates the label part of a title marker.
static TITLE_LABEL_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#""Title:[^"]*""#).expect("Invalid title label regex")
});

/// Split a segment body at `split_points`, keeping the parent title on every run.
pub fn split(title: &str, body: &str, split_points: &[usize], unit: SplitUnit) -> Vec<SubSegment> {
    split_with_labels(title, body, split_points, unit, &[])
}

/// Split a segment body at `split_points`, labelling each run.
///
/// With an empty `labels` slice every run keeps `title`. Otherwise run `i`
/// receives the first word of `labels[i]` substituted into the title; missing
/// labels become `Part1`, `Part2`, ... so every run is labelled.
pub fn split_with_labels(
    title: &str,
    body: &str,
    split_points: &[usize],
    unit: SplitUnit,
    labels: &[String],
) -> Vec<SubSegment> {
    let title = title.trim();
    let metadata_lines = extract_metadata_lines(body);
    let (content_lines, _) = partition_lines(body);
    let content = content_lines.join("\n");

    let units = unit_spans(&content, unit);
    let boundaries = clamp_points(split_points, unit, units.len());

    let runs: Vec<String> = if boundaries.is_empty() {
        vec![trim_blank_edges(&content).to_string()]
    } else {
        partition_units(&content, &units, &boundaries)
    };

    debug!(
        "Split into {} run(s) from {} {} unit(s) at {:?}",
        runs.len(),
        units.len(),
        unit,
        boundaries
    );

    runs.into_iter()
        .enumerate()
        .map(|(i, content)| SubSegment {
            title: if labels.is_empty() {
                title.to_string()
            } else {
                labelled_title(title, &label_for(labels, i))
            },
            content,
            metadata_lines: metadata_lines.clone(),
        })
        .collect()
}

/// Break `content` into units.
///
/// Sentences end after `.`, `!` or `?` followed by whitespace; trailing text
/// without a terminator forms the last sentence. Lines are the non-blank lines.
pub fn tokenize(content: &str, unit: SplitUnit) -> Vec<String> {
    unit_spans(content, unit)
        .into_iter()
        .map(|span| content[span].to_string())
        .collect()
}

/// Map 1-indexed points ("after unit n") into the addressing of `unit`.
pub fn points_from_one_based(points: &[usize], unit: SplitUnit) -> Vec<usize> {
    match unit {
        SplitUnit::Sentence => points.to_vec(),
        SplitUnit::Line => points.iter().map(|point| point.saturating_sub(1)).collect(),
    }
}

/// Title for a labelled run: the label replaces the text of the `"Title:..."` marker.
pub fn labelled_title(title: &str, label: &str) -> String {
    let replacement = format!("\"Title:{}\"", label);
    if TITLE_LABEL_PATTERN.is_match(title) {
        TITLE_LABEL_PATTERN
            .replace(title, regex::NoExpand(&replacement))
            .into_owned()
    } else {
        replacement
    }
}

fn label_for(labels: &[String], index: usize) -> String {
    labels
        .get(index)
        .and_then(|label| label.split_whitespace().next())
        .map(str::to_string)
        .unwrap_or_else(|| format!("Part{}", index + 1))
}

/// Convert raw points to 0-based unit indices, clamp into range, sort and dedupe.
fn clamp_points(split_points: &[usize], unit: SplitUnit, unit_count: usize) -> BTreeSet<usize> {
    if unit_count == 0 {
        return BTreeSet::new();
    }
    split_points
        .iter()
        .map(|&point| match unit {
            SplitUnit::Sentence => point.saturating_sub(1),
            SplitUnit::Line => point,
        })
        .map(|index| index.min(unit_count - 1))
        .collect()
}

/// Run i covers units (previous boundary, boundary]; the remainder forms the last run.
fn partition_units(content: &str, units: &[Range<usize>], boundaries: &BTreeSet<usize>) -> Vec<String> {
    let mut runs = Vec::with_capacity(boundaries.len() + 1);
    let mut start = 0;
    for &boundary in boundaries {
        runs.push(content[units[start].start..units[boundary].end].to_string());
        start = boundary + 1;
    }
    if let Some(last) = units.last().filter(|_| start < units.len()) {
        runs.push(content[units[start].start..last.end].to_string());
    }
    runs
}

/// Byte ranges of the units of `content`, surrounding whitespace excluded.
fn unit_spans(content: &str, unit: SplitUnit) -> Vec<Range<usize>> {
    match unit {
        SplitUnit::Sentence => sentence_spans(content),
        SplitUnit::Line => line_spans(content),
    }
}

fn sentence_spans(content: &str) -> Vec<Range<usize>> {
    let mut spans = Vec::new();
    let mut start = 0;
    let mut chars = content.char_indices().peekable();

    while let Some((idx, ch)) = chars.next() {
        let at_boundary = matches!(ch, '.' | '!' | '?')
            && chars.peek().is_some_and(|&(_, next)| next.is_whitespace());
        if at_boundary {
            let end = idx + ch.len_utf8();
            push_span(&mut spans, content, start..end);
            start = end;
        }
    }
    push_span(&mut spans, content, start..content.len());
    spans
}

fn line_spans(content: &str) -> Vec<Range<usize>> {
    let mut spans = Vec::new();
    let mut offset = 0;
    for line in content.split_inclusive('\n') {
        let text = line.trim_end();
        if !text.trim_start().is_empty() {
            spans.push(offset..offset + text.len());
        }
        offset += line.len();
    }
    spans
}

fn push_span(spans: &mut Vec<Range<usize>>, content: &str, range: Range<usize>) {
    let raw = &content[range.clone()];
    let trimmed = raw.trim();
    if !trimmed.is_empty() {
        let start = range.start + (raw.len() - raw.trim_start().len());
        spans.push(start..start + trimmed.len());
    }
}

fn trim_blank_edges(text: &str) -> &str {
    text.trim_matches(|c| c == '\n' || c == '\r')
}
