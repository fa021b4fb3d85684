/*!
 * Topic classification.
 *
 * The pipeline consults a `SegmentDecider` once per segment to learn whether
 * the segment holds several stories (and where to split it) and whether it is
 * a different topic from the segment that follows. Deciders never fail: any
 * problem is logged and answered with the documented defaults.
 *
 * - `prompt`: prompt text sent to LLM providers
 * - `response`: tolerant parser from raw reply to `TopicDecision`
 * - `service`: provider-backed decider with timeout and retry policy
 * - `manual`: operator-driven and fixed deciders
 */

use async_trait::async_trait;

use crate::segmentation::{Segment, SplitUnit};

pub mod manual;
pub mod prompt;
pub mod response;
pub mod service;

pub use manual::{FixedDecider, ManualDecider};
pub use response::parse_response;
pub use service::TopicClassifier;

/// Reasoning text used when the reply carries none
pub const NO_REASONING: &str = "No clear reasoning provided";

/// Structured answer for one segment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TopicDecision {
    /// The current segment and the next one cover different topics
    pub different: bool,
    /// Free-text explanation
    pub reasoning: String,
    /// Raw reply as received, kept for logging
    pub raw_response: String,
    /// The current segment contains more than one story
    pub multi_story: bool,
    /// Number of stories found in the current segment
    pub story_count: usize,
    /// One-word labels for the stories, in order
    pub sub_topics: Vec<String>,
    /// 1-indexed split points, in the order given
    pub split_points: Vec<usize>,
    /// Set when the decision came from defaults rather than a usable answer
    pub defaulted: bool,
}

impl Default for TopicDecision {
    fn default() -> Self {
        Self {
            different: false,
            reasoning: NO_REASONING.to_string(),
            raw_response: String::new(),
            multi_story: false,
            story_count: 1,
            sub_topics: Vec::new(),
            split_points: Vec::new(),
            defaulted: false,
        }
    }
}

impl TopicDecision {
    /// Defaults (same topic, single story) after a failure described by `reason`.
    pub fn fallback(reason: impl Into<String>) -> Self {
        let reason = reason.into();
        Self {
            reasoning: reason.clone(),
            raw_response: reason,
            defaulted: true,
            ..Self::default()
        }
    }

    /// True when the answer asks for the segment to be divided.
    pub fn wants_split(&self) -> bool {
        self.multi_story && self.story_count > 1
    }
}

/// Input for one decision.
#[derive(Debug, Clone, Copy)]
pub struct DecisionRequest<'a> {
    /// Segment being decided
    pub current: &'a Segment,
    /// Segment that follows it, if any
    pub next: Option<&'a Segment>,
    /// Treat related sub-aspects of one story as the same topic
    pub keep_same_topic: bool,
    /// Unit the decider counts split points in, always from 1
    pub split_unit: SplitUnit,
    /// 1-based position of `current` in the document
    pub segment_number: usize,
    /// Number of segments in the document
    pub total_segments: usize,
}

/// Source of per-segment topic decisions.
#[async_trait]
pub trait SegmentDecider: Send + Sync {
    /// Decide on one segment. Implementations apply defaults instead of failing.
    async fn decide(&self, request: DecisionRequest<'_>) -> TopicDecision;

    /// Identifier of the decision source, e.g. `ollama/llama3.2:3b`
    fn source_name(&self) -> String;
}
