/*!
 * Pipeline driver.
 *
 * The driver runs extract, then one decide/apply step per segment, then
 * reassembly. Decisions are awaited one at a time and the cancel flag is
 * checked around every decision. No output exists until the whole document
 * has been reassembled.
 */

use log::{info, warn};
use std::sync::atomic::{AtomicBool, Ordering};

use crate::classification::SegmentDecider;
use crate::errors::{PipelineError, SegmentationError};
use crate::segmentation::reassembler::DEFAULT_SEPARATOR_BLANK_LINES;
use crate::segmentation::{
    count_titles, extract, leading_text, reassemble_with, DocumentHeader, ReassemblyOptions, SplitUnit,
    TopicCounters,
};

use super::state::{ApplyPolicy, PipelineState};

/// Configuration for the sorting pipeline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineConfig {
    /// Unit space the split points address
    pub split_unit: SplitUnit,
    /// Fold same-topic neighbours into one entry
    pub merge_on_same_topic: bool,
    /// Ask the decider to treat sub-aspects of one story as the same topic
    pub keep_same_topic: bool,
    /// Blank lines between output entries
    pub separator_blank_lines: usize,
    /// Prepend the decision-source header
    pub include_header: bool,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            split_unit: SplitUnit::Sentence,
            merge_on_same_topic: false,
            keep_same_topic: true,
            separator_blank_lines: DEFAULT_SEPARATOR_BLANK_LINES,
            include_header: false,
        }
    }
}

impl PipelineConfig {
    pub fn with_split_unit(mut self, unit: SplitUnit) -> Self {
        self.split_unit = unit;
        self
    }

    pub fn with_merge_on_same_topic(mut self, enabled: bool) -> Self {
        self.merge_on_same_topic = enabled;
        self
    }

    pub fn with_keep_same_topic(mut self, enabled: bool) -> Self {
        self.keep_same_topic = enabled;
        self
    }

    pub fn with_separator_blank_lines(mut self, lines: usize) -> Self {
        self.separator_blank_lines = lines;
        self
    }

    pub fn with_header(mut self, enabled: bool) -> Self {
        self.include_header = enabled;
        self
    }

    fn policy(&self) -> ApplyPolicy {
        ApplyPolicy {
            split_unit: self.split_unit,
            merge_on_same_topic: self.merge_on_same_topic,
        }
    }
}

/// Result of a complete run.
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineOutcome {
    /// The reassembled document
    pub document: String,
    /// Counters derived from the final entry list
    pub counters: TopicCounters,
    /// Title markers in the output document
    pub title_count: usize,
    /// 1-based numbers of segments whose decisions were defaulted
    pub defaulted_decisions: Vec<usize>,
}

/// Sequential sorting pipeline.
#[derive(Debug, Clone, Default)]
pub struct SortingPipeline {
    config: PipelineConfig,
}

impl SortingPipeline {
    pub fn new(config: PipelineConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Sort `document` with decisions from `decider`.
    pub async fn run(
        &self,
        document: &str,
        decider: &dyn SegmentDecider,
        cancel: Option<&AtomicBool>,
    ) -> Result<PipelineOutcome, PipelineError> {
        self.run_with_progress(document, decider, cancel, |_, _| {}).await
    }

    /// Sort `document`, calling `progress(done, total)` after every segment.
    pub async fn run_with_progress<F>(
        &self,
        document: &str,
        decider: &dyn SegmentDecider,
        cancel: Option<&AtomicBool>,
        mut progress: F,
    ) -> Result<PipelineOutcome, PipelineError>
    where
        F: FnMut(usize, usize) + Send,
    {
        let segments = extract(document);
        if segments.is_empty() {
            return Err(SegmentationError::NoSegments.into());
        }

        let preamble = leading_text(document).map(str::to_string);
        if preamble.is_some() {
            warn!("Text found before the first title; it will be kept at the top of the output");
        }

        info!("Found {} segments", segments.len());

        let policy = self.config.policy();
        let mut state = PipelineState::new(segments);

        loop {
            check_cancelled(cancel, &state)?;

            let decision = match state.next_request(self.config.keep_same_topic, policy.split_unit) {
                Some(request) => decider.decide(request).await,
                None => break,
            };

            check_cancelled(cancel, &state)?;

            state = state.apply(decision, policy);
            progress(state.finalized(), state.total());
        }

        let options = ReassemblyOptions {
            separator_blank_lines: self.config.separator_blank_lines,
            header: self
                .config
                .include_header
                .then(|| DocumentHeader::now(decider.source_name())),
            preamble,
        };
        let document = reassemble_with(state.processed(), &options);
        let counters = state.counters();
        let outcome = PipelineOutcome {
            title_count: count_titles(&document),
            document,
            counters,
            defaulted_decisions: state.defaulted().to_vec(),
        };

        log_summary(&outcome);
        Ok(outcome)
    }
}

fn check_cancelled(cancel: Option<&AtomicBool>, state: &PipelineState) -> Result<(), PipelineError> {
    if cancel.is_some_and(|flag| flag.load(Ordering::SeqCst)) {
        warn!("Processing cancelled after {} of {} segments", state.finalized(), state.total());
        return Err(PipelineError::Cancelled {
            finalized: state.finalized(),
            total: state.total(),
        });
    }
    Ok(())
}

fn log_summary(outcome: &PipelineOutcome) {
    let counters = &outcome.counters;
    info!("Final segment count: {}", counters.final_count);
    if counters.reduction() > 0 {
        info!(
            "Reduced from {} to {} segments ({:.1}% reduction)",
            counters.baseline_count,
            counters.final_count,
            counters.reduction_percentage()
        );
    } else {
        info!("No reduction: {} segments in, {} out", counters.baseline_count, counters.final_count);
    }
    info!(
        "Kept separate: {}, merged: {}",
        counters.kept_separate_count, counters.merged_count
    );
    if !outcome.defaulted_decisions.is_empty() {
        warn!(
            "Decisions defaulted for segment(s): {:?}",
            outcome.defaulted_decisions
        );
    }
    info!(
        "Summary: {} titles written from {} source segments",
        outcome.title_count, counters.baseline_count
    );
}
