/*!
 * Metadata line classification.
 *
 * A metadata line is an out-of-band tag (media reference, URL, timestamp,
 * map reference, source attribution, two-letter comment tag or mention) that
 * must travel with every derivative of the segment it came from. Extraction,
 * splitting and reassembly all call [`is_metadata`]; there is no second copy
 * of the rule anywhere in the crate.
 */

use once_cell::sync::Lazy;
use regex::Regex;

/// Literal prefixes that mark a line as metadata (checked after trimming).
pub const METADATA_PREFIXES: [&str; 6] = ["--", "http", "Timestamp:", "Map view:", "Source:", "@"];

/// Two ASCII letters followed immediately by a hyphen, e.g. `cc-`, `JJ-`.
static COMMENT_TAG_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[A-Za-z]{2}-").expect("Invalid comment tag regex")
});

/// Returns true when `line` is a metadata line.
///
/// Blank and whitespace-only lines are never metadata.
pub fn is_metadata(line: &str) -> bool {
    let line = line.trim();
    if line.is_empty() {
        return false;
    }

    if METADATA_PREFIXES.iter().any(|prefix| line.starts_with(prefix)) {
        return true;
    }

    COMMENT_TAG_PATTERN.is_match(line)
}

/// Collect the metadata lines of `text` in order of first appearance,
/// keeping each distinct line once.
pub fn extract_metadata_lines(text: &str) -> Vec<String> {
    let mut found: Vec<String> = Vec::new();
    for line in text.lines() {
        if is_metadata(line) && !found.iter().any(|existing| existing == line) {
            found.push(line.to_string());
        }
    }
    found
}

/// Exact line equality check used wherever metadata presence is verified.
pub fn contains_line(text: &str, needle: &str) -> bool {
    text.lines().any(|line| line == needle)
}

/// Split `text` into (content lines, metadata lines), preserving order in both.
pub fn partition_lines(text: &str) -> (Vec<&str>, Vec<&str>) {
    text.lines().partition(|line| !is_metadata(line))
}
