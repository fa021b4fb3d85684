/*!
 * Segment data model.
 *
 * - `Segment`: a title marker plus the verbatim body up to the next title
 * - `SubSegment`: one run of a split segment, carrying the parent's full metadata
 * - `ProcessedSegment`: an entry of the final document, ready for reassembly
 */

use serde::{Deserialize, Serialize};
use std::fmt;

use super::metadata::{contains_line, extract_metadata_lines, partition_lines};

/// A titled section of the source document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Segment {
    /// The literal title marker, e.g. `"Title:news"` (quotes included)
    pub title: String,
    /// Text between the title marker and the next marker, leading blank lines removed
    pub body: String,
    /// Distinct metadata lines found in the segment span, in order of appearance
    pub metadata_lines: Vec<String>,
}

impl Segment {
    /// Build a segment and catalogue its metadata lines.
    pub fn new(title: impl Into<String>, body: impl Into<String>) -> Self {
        let title = title.into();
        let body = body.into();
        let metadata_lines = extract_metadata_lines(&format!("{}\n{}", title, body));
        Self { title, body, metadata_lines }
    }

    /// Non-metadata lines of the body, in order.
    pub fn content_lines(&self) -> Vec<&str> {
        partition_lines(&self.body).0
    }

    /// True when the body holds no content line with visible text.
    pub fn has_no_content(&self) -> bool {
        self.content_lines().iter().all(|line| line.trim().is_empty())
    }

    /// Serialize as title line followed by the verbatim body.
    pub fn to_text(&self) -> String {
        if self.body.is_empty() {
            self.title.clone()
        } else {
            format!("{}\n{}", self.title, self.body)
        }
    }
}

/// Addressing convention for split points.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum SplitUnit {
    /// 1-indexed sentences: point `n` splits after the n-th sentence
    #[default]
    Sentence,
    /// 0-indexed non-blank content lines: point `n` splits after line `n`
    Line,
}

impl fmt::Display for SplitUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Sentence => write!(f, "sentence"),
            Self::Line => write!(f, "line"),
        }
    }
}

/// One contiguous run of a split segment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubSegment {
    /// Title for this run (parent title or label substituted into it)
    pub title: String,
    /// Joined content units of the run
    pub content: String,
    /// Every metadata line of the parent segment
    pub metadata_lines: Vec<String>,
}

impl SubSegment {
    /// Serialize as title, content, then each metadata line once.
    pub fn to_text(&self) -> String {
        let mut lines: Vec<&str> = vec![self.title.as_str()];
        if !self.content.is_empty() {
            lines.push(self.content.as_str());
        }
        lines.extend(self.metadata_lines.iter().map(String::as_str));
        lines.join("\n")
    }
}

/// Where a processed entry came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SegmentOrigin {
    /// An extracted segment kept whole (0-based source index)
    Whole(usize),
    /// Run `part` (1-based) of `of` runs split from a source segment
    Part { source_index: usize, part: usize, of: usize },
}

impl SegmentOrigin {
    /// 0-based index of the extracted segment this entry started from.
    pub fn source_index(&self) -> usize {
        match self {
            Self::Whole(index) => *index,
            Self::Part { source_index, .. } => *source_index,
        }
    }
}

/// An entry of the processed document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessedSegment {
    /// Title of the entry
    pub title: String,
    /// Serialized entry text (title line first)
    pub text: String,
    /// Metadata lines this entry must contain
    pub metadata_lines: Vec<String>,
    /// Source of the entry
    pub origin: SegmentOrigin,
    /// Source indices of segments folded into this entry under the merge policy
    pub merged_from: Vec<usize>,
}

impl ProcessedSegment {
    /// Entry for an extracted segment kept as-is.
    pub fn from_segment(source_index: usize, segment: &Segment) -> Self {
        Self {
            title: segment.title.clone(),
            text: segment.to_text(),
            metadata_lines: segment.metadata_lines.clone(),
            origin: SegmentOrigin::Whole(source_index),
            merged_from: Vec::new(),
        }
    }

    /// Entry for one run of a split segment.
    pub fn from_sub_segment(source_index: usize, part: usize, of: usize, sub: SubSegment) -> Self {
        Self {
            text: sub.to_text(),
            title: sub.title,
            metadata_lines: sub.metadata_lines,
            origin: SegmentOrigin::Part { source_index, part, of },
            merged_from: Vec::new(),
        }
    }

    /// Fold `segment` into this entry: its content lines are appended, then any
    /// of its metadata lines the entry does not already hold. The folded title is dropped.
    pub fn absorb(&mut self, source_index: usize, segment: &Segment) {
        let body = segment.body.trim();
        let (content, _) = partition_lines(body);

        while self.text.ends_with('\n') {
            self.text.pop();
        }

        if !content.is_empty() {
            self.text.push('\n');
            self.text.push_str(&content.join("\n"));
        }

        for line in &segment.metadata_lines {
            if !contains_line(&self.text, line) {
                self.text.push('\n');
                self.text.push_str(line);
            }
            if !self.metadata_lines.contains(line) {
                self.metadata_lines.push(line.clone());
            }
        }

        self.merged_from.push(source_index);
    }
}
