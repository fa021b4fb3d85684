/*!
 * Segment extraction.
 *
 * Title markers are located with a line-anchored pattern; each body is then the
 * exact byte span between the end of its marker and the start of the next one.
 * Bodies are sliced by position rather than matched, so blank lines inside a
 * section can never end it early.
 */

use log::debug;
use once_cell::sync::Lazy;
use regex::Regex;

use super::model::Segment;

/// A title marker: optional indentation or blank lines, then `"Title:<text>"` on one line.
static TITLE_MARKER_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?m)^\s*"Title:[^"\r\n]+""#).expect("Invalid title marker regex")
});

/// Extract every titled segment from `document`, in document order.
///
/// Returns an empty list when the document contains no title marker.
pub fn extract(document: &str) -> Vec<Segment> {
    let markers: Vec<(usize, usize)> = TITLE_MARKER_PATTERN
        .find_iter(document)
        .map(|m| (m.start(), m.end()))
        .collect();

    let mut segments = Vec::with_capacity(markers.len());
    for (i, &(start, end)) in markers.iter().enumerate() {
        let body_end = markers.get(i + 1).map_or(document.len(), |&(next_start, _)| next_start);
        let title = document[start..end].trim();
        let body = trim_leading_blank_lines(&document[end..body_end]);
        segments.push(Segment::new(title, body));
    }

    debug!("Extracted {} segment(s) from {} bytes", segments.len(), document.len());
    segments
}

/// Non-blank text that precedes the first title marker, if any.
pub fn leading_text(document: &str) -> Option<&str> {
    let first = TITLE_MARKER_PATTERN.find(document)?;
    let preamble = trim_leading_blank_lines(&document[..first.start()]).trim_end();
    if preamble.is_empty() {
        None
    } else {
        Some(preamble)
    }
}

/// Number of title markers in `text`.
pub fn count_titles(text: &str) -> usize {
    TITLE_MARKER_PATTERN.find_iter(text).count()
}

/// Drop whole lines that contain only whitespace from the start of `text`.
fn trim_leading_blank_lines(mut text: &str) -> &str {
    loop {
        match text.find('\n') {
            Some(idx) if text[..idx].trim().is_empty() => text = &text[idx + 1..],
            Some(_) => return text,
            None if text.trim().is_empty() => return "",
            None => return text,
        }
    }
}
