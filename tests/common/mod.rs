/*!
 * Common test utilities for the topicsort test suite
 */

use anyhow::Result;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Three segments: a multi-story one, a single story, and one with a comment tag
pub const SAMPLE_DOCUMENT: &str = "\"Title:news\"
The council approved the budget. Schools get more funding.

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

/// Routes crate logging to the test harness output; safe to call from every test
pub fn init_test_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Creates a temporary directory for test files
pub fn create_temp_dir() -> Result<TempDir> {
    Ok(TempDir::new()?)
}

/// Creates a test file with the given content in the specified directory
pub fn create_test_file(dir: &Path, filename: &str, content: &str) -> Result<PathBuf> {
    let file_path = dir.join(filename);
    fs::write(&file_path, content)?;
    Ok(file_path)
}

/// Classifier reply for a single-story segment
pub fn single_story_reply(different: bool) -> String {
    format!(
        "CONTAINS_MULTIPLE_STORIES: NO\nNUMBER_OF_STORIES: 1\nSUB_TOPICS:\nSPLIT_AFTER:\nDIFFERENT: {}\nREASONING: Single story.",
        if different { "YES" } else { "NO" }
    )
}

/// Classifier reply asking for a split
pub fn multi_story_reply(count: usize, topics: &str, split_after: &str, different: bool) -> String {
    format!(
        "CONTAINS_MULTIPLE_STORIES: YES\nNUMBER_OF_STORIES: {}\nSUB_TOPICS: {}\nSPLIT_AFTER: {}\nDIFFERENT: {}\nREASONING: Several stories.",
        count,
        topics,
        split_after,
        if different { "YES" } else { "NO" }
    )
}

/// Number of whole lines of `text` equal to `line`
pub fn count_line(text: &str, line: &str) -> usize {
    text.lines().filter(|l| *l == line).count()
}
