/*!
 * Document reassembly.
 *
 * Processed entries are serialized in order with a fixed blank-line run between
 * neighbours. Each entry is checked for its metadata lines before it is written:
 * missing lines are appended and repeated ones are dropped, so each appears once.
 */

use chrono::Local;
use log::debug;

use super::model::ProcessedSegment;

/// Default number of blank lines between two entries.
pub const DEFAULT_SEPARATOR_BLANK_LINES: usize = 1;

/// Optional two-line header naming the decision source and the run time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentHeader {
    /// Identifier of whatever made the topic decisions (e.g. `ollama/llama3.2:3b`)
    pub decision_source: String,
    /// Formatted timestamp of the run
    pub timestamp: String,
}

impl DocumentHeader {
    /// Header stamped with the current local time.
    pub fn now(decision_source: impl Into<String>) -> Self {
        Self {
            decision_source: decision_source.into(),
            timestamp: Local::now().format("%Y-%m-%d %H:%M:%S").to_string(),
        }
    }

    fn render(&self) -> String {
        format!("Sorted with: {}\nSorted at: {}", self.decision_source, self.timestamp)
    }
}

/// Formatting choices for the output document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReassemblyOptions {
    /// Blank lines between adjacent entries
    pub separator_blank_lines: usize,
    /// Header written before everything else
    pub header: Option<DocumentHeader>,
    /// Text that preceded the first title in the source, written verbatim
    pub preamble: Option<String>,
}

impl Default for ReassemblyOptions {
    fn default() -> Self {
        Self {
            separator_blank_lines: DEFAULT_SEPARATOR_BLANK_LINES,
            header: None,
            preamble: None,
        }
    }
}

/// Serialize `segments` with default options.
pub fn reassemble(segments: &[ProcessedSegment]) -> String {
    reassemble_with(segments, &ReassemblyOptions::default())
}

/// Serialize `segments` into a single document.
pub fn reassemble_with(segments: &[ProcessedSegment], options: &ReassemblyOptions) -> String {
    let mut blocks: Vec<String> = Vec::with_capacity(segments.len() + 2);

    if let Some(header) = &options.header {
        blocks.push(header.render());
    }
    if let Some(preamble) = options.preamble.as_deref().and_then(trim_blank_lines) {
        blocks.push(preamble);
    }

    let mut written = 0;
    for segment in segments {
        let Some(text) = trim_blank_lines(&segment.text) else {
            debug!("Skipping empty entry from source segment #{}", segment.origin.source_index() + 1);
            continue;
        };
        blocks.push(complete_metadata(text, &segment.metadata_lines));
        written += 1;
    }

    debug!("Reassembled {} of {} entries", written, segments.len());

    if blocks.is_empty() {
        return String::new();
    }

    let separator = "\n".repeat(options.separator_blank_lines + 1);
    let mut document = blocks.join(&separator);
    document.push('\n');
    document
}

/// Make every line of `metadata` appear exactly once in `text`.
///
/// Later repeats of a metadata line are dropped, the first occurrence keeps its
/// place, and lines that are missing entirely are appended in order.
pub fn complete_metadata(text: String, metadata: &[String]) -> String {
    let is_listed = |line: &str| metadata.iter().any(|m| m == line);

    let mut seen: Vec<&str> = Vec::new();
    let mut lines: Vec<&str> = Vec::new();
    for raw in text.split('\n') {
        let line = raw.strip_suffix('\r').unwrap_or(raw);
        if is_listed(line) {
            if seen.contains(&line) {
                continue;
            }
            seen.push(line);
        }
        lines.push(raw);
    }

    for line in metadata {
        if !seen.contains(&line.as_str()) {
            lines.push(line);
        }
    }
    lines.join("\n")
}

/// Running totals reported at the end of a run, derived from the final entry list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TopicCounters {
    /// Segments the extractor produced
    pub baseline_count: usize,
    /// Entries in the processed document
    pub final_count: usize,
    /// Entries written after the first one
    pub kept_separate_count: usize,
    /// Segments folded into a previous entry under the merge policy
    pub merged_count: usize,
}

impl TopicCounters {
    /// Compute the counters from the extracted segment count and the final entries.
    pub fn derive(baseline_count: usize, processed: &[ProcessedSegment]) -> Self {
        let final_count = processed.len();
        Self {
            baseline_count,
            final_count,
            kept_separate_count: final_count.saturating_sub(1),
            merged_count: processed.iter().map(|segment| segment.merged_from.len()).sum(),
        }
    }

    /// Segments removed relative to the baseline (zero when splitting grew the document).
    pub fn reduction(&self) -> usize {
        self.baseline_count.saturating_sub(self.final_count)
    }

    /// Reduction as a percentage of the baseline.
    pub fn reduction_percentage(&self) -> f64 {
        if self.baseline_count == 0 {
            0.0
        } else {
            self.reduction() as f64 / self.baseline_count as f64 * 100.0
        }
    }
}

/// Drop whitespace-only lines at both ends; `None` when nothing remains.
fn trim_blank_lines(text: &str) -> Option<String> {
    let lines: Vec<&str> = text.lines().collect();
    let first = lines.iter().position(|line| !line.trim().is_empty())?;
    let last = lines.iter().rposition(|line| !line.trim().is_empty())?;
    Some(lines[first..=last].join("\n"))
}
