/*!
 * Sorting pipeline.
 *
 * The pipeline turns a raw document into a sorted one:
 * 1. **Extract**: title markers split the document into segments
 * 2. **Decide**: a `SegmentDecider` answers for each segment in turn
 * 3. **Split/merge**: the answer is applied to the entry list
 * 4. **Reassemble**: entries are serialized with their metadata completed
 */

pub mod orchestrator;
pub mod state;

pub use orchestrator::{PipelineConfig, PipelineOutcome, SortingPipeline};
pub use state::{ApplyPolicy, PipelineState};
