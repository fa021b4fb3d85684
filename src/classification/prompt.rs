/*!
 * Prompt construction for LLM-backed topic decisions.
 */

use super::DecisionRequest;
use crate::segmentation::SplitUnit;

/// Reply layout the response parser understands
pub const RESPONSE_FORMAT: &str = "CONTAINS_MULTIPLE_STORIES: YES/NO
NUMBER_OF_STORIES: [if YES, provide a number]
SUB_TOPICS: [if YES, provide a comma-separated list of SINGLE WORDS]
SPLIT_AFTER: [if YES, provide the numbers after which to split, e.g. \"1,3,5\"]
DIFFERENT: YES/NO
REASONING: Your explanation here";

const KEEP_SAME_TOPIC_HINT: &str = "Only answer DIFFERENT: YES for SIGNIFICANTLY different topics. \
If both segments discuss the same main topic or event, treat them as the same topic.";

const TAG_RULES: &str = "Ignore these tag lines completely; they must never influence a split or topic decision:
- Lines starting with '--' (media references)
- URLs starting with 'http' or 'https'
- Lines starting with 'Timestamp:'
- Lines starting with 'Map view:'
- Lines starting with 'Source:'
- Lines starting with '@' (mentions)
- Comment tags made of two letters and a dash (e.g. \"cc-\", \"jj-\", \"mm-\", \"CC-\", \"JJ-\", \"MM-\")";

/// Build the prompt for one decision.
pub fn build_prompt(request: &DecisionRequest<'_>) -> String {
    let (next_title, next_body) = match request.next {
        Some(next) => (next.title.as_str(), next.body.as_str()),
        None => ("None", "No more segments"),
    };

    let mut prompt = String::new();
    prompt.push_str("Analyze these two consecutive text segments.\n\n");
    prompt.push_str(&format!(
        "SEGMENT 1 (Current, {} of {}):\n{}\n{}\n\n",
        request.segment_number,
        request.total_segments,
        request.current.title,
        request.current.body.trim_end()
    ));
    prompt.push_str(&format!("SEGMENT 2 (Next):\n{}\n{}\n\n", next_title, next_body.trim_end()));

    prompt.push_str(
        "First, decide whether SEGMENT 1 itself contains several distinct news stories or topics. \
If it does, report:\n\
1. How many distinct stories SEGMENT 1 contains (a number)\n\
2. One SINGLE WORD per story describing it (e.g. \"Politics\", \"Military\", \"Economy\")\n",
    );
    prompt.push_str(split_instruction(request.split_unit));
    prompt.push_str("\n\n");
    prompt.push_str("Then decide whether SEGMENT 1 and SEGMENT 2 are about DIFFERENT topics.\n\n");

    if request.keep_same_topic {
        prompt.push_str(KEEP_SAME_TOPIC_HINT);
        prompt.push_str("\n\n");
    }

    prompt.push_str(
        "IMPORTANT: different aspects of the same news story or event are NOT different topics.\n\n",
    );
    prompt.push_str(TAG_RULES);
    prompt.push_str("\n\nFormat your response exactly like this:\n");
    prompt.push_str(RESPONSE_FORMAT);
    prompt.push('\n');
    prompt
}

fn split_instruction(unit: SplitUnit) -> &'static str {
    match unit {
        SplitUnit::Sentence => {
            "3. The sentence numbers of SEGMENT 1 after which it should be split, counting sentences from 1"
        }
        SplitUnit::Line => {
            "3. The line numbers of SEGMENT 1 after which it should be split, counting non-empty text lines \
from 1 and skipping tag lines"
        }
    }
}
