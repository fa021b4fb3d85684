/*!
 * Pipeline state.
 *
 * One value holds everything a run accumulates: the extracted segments, the
 * processed entries built so far, the index of the next segment to decide and
 * the numbers of segments whose decisions were defaulted. Each step consumes
 * the state and returns the next one; counters are derived from the entries.
 */

use log::{info, warn};

use crate::classification::{DecisionRequest, TopicDecision};
use crate::segmentation::{
    ProcessedSegment, Segment, SplitUnit, TopicCounters, points_from_one_based, split_with_labels,
};

/// How decisions are applied to the entry list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ApplyPolicy {
    /// Unit space the split points address
    pub split_unit: SplitUnit,
    /// Fold a segment into the previous entry when the previous decision said "same topic"
    pub merge_on_same_topic: bool,
}

/// Accumulated state of one run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineState {
    segments: Vec<Segment>,
    processed: Vec<ProcessedSegment>,
    next_index: usize,
    merge_pending: bool,
    defaulted: Vec<usize>,
}

impl PipelineState {
    /// Fresh state over extracted segments.
    pub fn new(segments: Vec<Segment>) -> Self {
        Self {
            processed: Vec::with_capacity(segments.len()),
            segments,
            next_index: 0,
            merge_pending: false,
            defaulted: Vec::new(),
        }
    }

    /// Number of extracted segments
    pub fn total(&self) -> usize {
        self.segments.len()
    }

    /// Number of segments whose decision has been applied
    pub fn finalized(&self) -> usize {
        self.next_index
    }

    pub fn is_complete(&self) -> bool {
        self.next_index >= self.segments.len()
    }

    pub fn processed(&self) -> &[ProcessedSegment] {
        &self.processed
    }

    /// 1-based numbers of segments decided with defaults
    pub fn defaulted(&self) -> &[usize] {
        &self.defaulted
    }

    pub fn counters(&self) -> TopicCounters {
        TopicCounters::derive(self.segments.len(), &self.processed)
    }

    /// Request for the next undecided segment, or `None` when every segment is done.
    pub fn next_request(&self, keep_same_topic: bool, split_unit: SplitUnit) -> Option<DecisionRequest<'_>> {
        let current = self.segments.get(self.next_index)?;
        Some(DecisionRequest {
            current,
            next: self.segments.get(self.next_index + 1),
            keep_same_topic,
            split_unit,
            segment_number: self.next_index + 1,
            total_segments: self.segments.len(),
        })
    }

    /// Apply the decision for the next segment and advance.
    ///
    /// Split points in `decision` count from 1 in `policy.split_unit`.
    /// A requested split always wins: its runs become separate entries. Without
    /// a split, a pending same-topic verdict folds the segment into the last
    /// entry when the merge policy is on.
    pub fn apply(mut self, decision: TopicDecision, policy: ApplyPolicy) -> Self {
        let index = self.next_index;
        let Some(segment) = self.segments.get(index) else {
            return self;
        };
        let number = index + 1;

        if decision.defaulted {
            self.defaulted.push(number);
        }

        info!(
            "Segment #{}: {} topic from next. Reasoning: {}",
            number,
            if decision.different { "different" } else { "same" },
            decision.reasoning
        );

        let split_entries = if decision.wants_split() {
            if decision.split_points.is_empty() {
                warn!(
                    "Segment #{}: {} stories reported but no split points given, keeping it whole",
                    number, decision.story_count
                );
                None
            } else {
                let points = points_from_one_based(&decision.split_points, policy.split_unit);
                let runs = split_with_labels(
                    &segment.title,
                    &segment.body,
                    &points,
                    policy.split_unit,
                    &decision.sub_topics,
                );
                info!(
                    "Segment #{}: split into {} part(s) at {:?} ({})",
                    number,
                    runs.len(),
                    decision.split_points,
                    decision.sub_topics.join(", ")
                );
                let of = runs.len();
                Some(
                    runs.into_iter()
                        .enumerate()
                        .map(|(i, run)| ProcessedSegment::from_sub_segment(index, i + 1, of, run))
                        .collect::<Vec<_>>(),
                )
            }
        } else {
            None
        };

        match split_entries {
            Some(entries) => self.processed.extend(entries),
            None => match self.processed.last_mut() {
                Some(previous) if self.merge_pending => {
                    info!("Segment #{}: merged into previous entry", number);
                    previous.absorb(index, segment);
                }
                _ => self.processed.push(ProcessedSegment::from_segment(index, segment)),
            },
        }

        let has_next = index + 1 < self.segments.len();
        self.merge_pending = policy.merge_on_same_topic && has_next && !decision.different;
        self.next_index += 1;
        self
    }
}
