/*!
 * # topicsort - topic-aware document re-segmentation
 *
 * A Rust library for re-segmenting documents made of `"Title:..."` sections.
 *
 * ## Features
 *
 * - Extract titled segments without losing text between blank lines
 * - Split multi-story segments at sentence or line boundaries
 * - Keep every tag line (media references, URLs, timestamps, sources,
 *   comment tags, mentions) in every piece derived from its segment
 * - Ask a local LLM (Ollama), an operator, or nobody for topic decisions
 * - Optionally fold same-topic neighbours into one entry
 *
 * ## Architecture
 *
 * The library is organized in these main modules:
 * - `segmentation`: metadata predicate, extraction, splitting and reassembly
 * - `classification`: decision contract and its deciders:
 *   - `classification::service`: LLM-backed classifier with timeout and retry
 *   - `classification::manual`: operator and fixed deciders
 * - `pipeline`: sequential extract, decide, split/merge, reassemble driver
 * - `providers`: Client implementations for LLM providers:
 *   - `providers::ollama`: Ollama API client
 *   - `providers::mock`: Deterministic provider for tests
 * - `app_config`: Configuration management
 * - `file_utils`: File system operations
 * - `app_controller`: Main application controller
 * - `errors`: Custom error types for the application
 */

// Global lints configuration
#![allow(clippy::uninlined_format_args)]
#![allow(clippy::redundant_closure_for_method_calls)]

// Public modules
pub mod app_config;
pub mod app_controller;
pub mod classification;
pub mod errors;
pub mod file_utils;
pub mod pipeline;
pub mod providers;
pub mod segmentation;

// Re-export main types for easier usage
pub use app_config::Config;
pub use classification::{DecisionRequest, SegmentDecider, TopicDecision};
pub use errors::{AppError, PipelineError, ProviderError, SegmentationError};
pub use pipeline::{PipelineConfig, PipelineOutcome, SortingPipeline};
pub use segmentation::{ProcessedSegment, Segment, SplitUnit};
