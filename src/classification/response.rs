/*!
 * Tolerant parsing of classifier replies.
 *
 * Replies are free text that is expected to carry `FIELD: value` lines. Field
 * names match case-insensitively and may be wrapped in markdown emphasis.
 * Reasoning blocks emitted by thinking models are discarded before parsing.
 * Missing or malformed fields fall back to the `TopicDecision` defaults.
 */

use once_cell::sync::Lazy;
use regex::Regex;

use super::{NO_REASONING, TopicDecision};

static THINK_BLOCK: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?is)<think>.*?</think>").expect("Invalid think block regex"));

static MULTIPLE_FIELD: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)CONTAINS_MULTIPLE_STORIES[*_ ]*:[*_ ]*(YES|NO)\b")
        .expect("Invalid multiple stories regex")
});

static COUNT_FIELD: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)NUMBER_OF_STORIES[*_ ]*:[*_ ]*(\d+)").expect("Invalid story count regex")
});

static TOPICS_FIELD: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)SUB_TOPICS[*_ ]*:[ \t]*([^\r\n]*)").expect("Invalid sub topics regex")
});

static SPLIT_FIELD: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)SPLIT_AFTER[*_ ]*:[ \t]*([^\r\n]*)").expect("Invalid split points regex")
});

static DIFFERENT_FIELD: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\bDIFFERENT[*_ ]*:[*_ ]*(YES|NO)\b").expect("Invalid different regex")
});

static REASONING_FIELD: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?is)REASONING[*_ ]*:[*_ ]*(.*?)(?:\n[ \t]*\n|\z)").expect("Invalid reasoning regex")
});

static TOPIC_ITEM: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#""([^"]*)"|([^,]+)"#).expect("Invalid topic item regex"));

static NUMBER: Lazy<Regex> = Lazy::new(|| Regex::new(r"\d+").expect("Invalid number regex"));

/// Remove `<think>...</think>` blocks.
pub fn strip_think_blocks(raw: &str) -> String {
    THINK_BLOCK.replace_all(raw, "").into_owned()
}

/// Parse a raw reply into a decision.
///
/// The result is marked `defaulted` when neither the DIFFERENT nor the
/// CONTAINS_MULTIPLE_STORIES field could be found.
pub fn parse_response(raw: &str) -> TopicDecision {
    let text = strip_think_blocks(raw);

    let multi_field = yes_no(&MULTIPLE_FIELD, &text);
    let different_field = yes_no(&DIFFERENT_FIELD, &text);

    let mut decision = TopicDecision {
        raw_response: raw.to_string(),
        different: different_field.unwrap_or(false),
        multi_story: multi_field.unwrap_or(false),
        reasoning: parse_reasoning(&text),
        defaulted: multi_field.is_none() && different_field.is_none(),
        ..TopicDecision::default()
    };

    if decision.multi_story {
        if let Some(count) = COUNT_FIELD.captures(&text).and_then(|c| c.get(1)) {
            // Counts too large for usize still mean "several stories"
            decision.story_count = count.as_str().parse().unwrap_or(2);
        }
        if let Some(list) = TOPICS_FIELD.captures(&text).and_then(|c| c.get(1)) {
            decision.sub_topics = parse_topic_list(list.as_str());
        }
        if let Some(list) = SPLIT_FIELD.captures(&text).and_then(|c| c.get(1)) {
            decision.split_points = parse_split_points(list.as_str());
        }
    }

    decision
}

fn yes_no(pattern: &Regex, text: &str) -> Option<bool> {
    pattern
        .captures(text)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().eq_ignore_ascii_case("yes"))
}

fn parse_reasoning(text: &str) -> String {
    REASONING_FIELD
        .captures(text)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().trim().to_string())
        .filter(|r| !r.is_empty())
        .unwrap_or_else(|| NO_REASONING.to_string())
}

/// Parse a comma separated label list, keeping the first word of each entry.
///
/// Surrounding brackets are ignored and quoted entries may contain commas.
pub fn parse_topic_list(list: &str) -> Vec<String> {
    let inner = list.trim().trim_start_matches('[').trim_end_matches(']');

    TOPIC_ITEM
        .captures_iter(inner)
        .filter_map(|caps| caps.get(1).or_else(|| caps.get(2)))
        .filter_map(|m| first_word(m.as_str()))
        .collect()
}

fn first_word(entry: &str) -> Option<String> {
    entry
        .split_whitespace()
        .next()
        .map(|word| word.trim_matches(|c: char| matches!(c, '\'' | '"' | '*' | '.' | ';')))
        .filter(|word| !word.is_empty())
        .map(str::to_string)
}

/// Every decimal number in the field, in order of appearance.
pub fn parse_split_points(list: &str) -> Vec<usize> {
    NUMBER
        .find_iter(list)
        .filter_map(|m| m.as_str().parse().ok())
        .collect()
}
