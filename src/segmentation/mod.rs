/*!
 * Document segmentation: metadata classification, segment extraction,
 * splitting and reassembly.
 *
 * - `metadata`: the single metadata-line predicate shared by every phase
 * - `model`: segment, sub-segment and processed-entry types
 * - `extractor`: raw document to ordered segments
 * - `splitter`: one segment plus split points to contiguous runs
 * - `reassembler`: processed entries to the output document
 */

pub mod extractor;
pub mod metadata;
pub mod model;
pub mod reassembler;
pub mod splitter;

pub use extractor::{count_titles, extract, leading_text};
pub use metadata::{extract_metadata_lines, is_metadata};
pub use model::{ProcessedSegment, Segment, SegmentOrigin, SplitUnit, SubSegment};
pub use reassembler::{reassemble, reassemble_with, DocumentHeader, ReassemblyOptions, TopicCounters};
pub use splitter::{points_from_one_based, split, split_with_labels, tokenize};
